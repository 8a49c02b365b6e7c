//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Heartflow demo - run the frame loop without a camera or a screen
#[derive(Parser, Debug)]
#[command(name = "heartflow-demo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON config file laid over the preset; fields it omits keep the preset's values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base configuration, optionally overridden by --config
    #[arg(short, long, value_enum, default_value_t = Preset::Default)]
    pub preset: Preset,

    /// JSON-lines landmark recording to replay instead of a synthetic performer
    #[arg(short, long)]
    pub recording: Option<PathBuf>,

    /// Synthetic performer behavior
    #[arg(long, value_enum, default_value_t = Performer::Dancing)]
    pub performer: Performer,

    /// Frames to run (a recording stops earlier when it runs out)
    #[arg(short, long, default_value_t = 600)]
    pub frames: u64,

    /// The tracker delivers a new result every N display frames
    #[arg(long, default_value_t = 1)]
    pub tracker_every: u64,

    /// Seed for the engine and the synthetic performer
    #[arg(short, long, default_value_t = 1)]
    pub seed: u64,

    /// Log a stats line every N frames (0 = only the summary)
    #[arg(long, default_value_t = 60)]
    pub report_every: u64,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Default,
    Sparse,
    Hd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Performer {
    Still,
    Dancing,
    Flaky,
}
