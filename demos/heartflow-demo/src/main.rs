//! Heartflow Demo Application
//!
//! Runs the full frame loop headless:
//! - Landmarks from a recording or a synthetic performer
//! - A tracker that publishes into the latest-frame slot
//! - A gradient test card standing in for the camera image
//! - Periodic stats in the log

mod cli;

use std::fs;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use heartflow_core::{
    parse_recording, FrameClock, HeartflowError, HeartflowResult, LandmarkFrame, LatestFrame, Region, SimConfig,
};
use heartflow_sim::{DrawList, FlowEngine, VideoFrame, VideoSampler};
use heartflow_test::{PerformerConfig, SyntheticPerformer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Performer, Preset};

const TEST_CARD_WIDTH: u32 = 64;
const TEST_CARD_HEIGHT: u32 = 48;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "heartflow demo failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Where landmark frames come from
enum Source {
    Recording(std::vec::IntoIter<Option<LandmarkFrame>>),
    Synthetic(SyntheticPerformer),
}

impl Source {
    /// `None` when the source is exhausted
    fn next(&mut self) -> Option<Option<LandmarkFrame>> {
        match self {
            Source::Recording(frames) => frames.next(),
            Source::Synthetic(performer) => Some(performer.next_frame()),
        }
    }
}

fn preset_config(preset: Preset) -> SimConfig {
    match preset {
        Preset::Default => SimConfig::default(),
        Preset::Sparse => SimConfig::sparse(),
        Preset::Hd => SimConfig::hd(),
    }
}

/// The chosen preset, with the config file (if any) laid over it
fn load_config(cli: &Cli) -> HeartflowResult<SimConfig> {
    let preset = preset_config(cli.preset);
    match &cli.config {
        Some(path) => {
            let config = preset.overlay_json(&fs::read_to_string(path)?)?;
            info!(path = %path.display(), preset = ?cli.preset, "loaded config");
            Ok(config)
        }
        None => Ok(preset),
    }
}

fn open_source(cli: &Cli) -> HeartflowResult<Source> {
    if let Some(path) = &cli.recording {
        let frames = parse_recording(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), frames = frames.len(), "loaded recording");
        return Ok(Source::Recording(frames.into_iter()));
    }

    let config = match cli.performer {
        Performer::Still => PerformerConfig::still(),
        Performer::Dancing => PerformerConfig::dancing(),
        Performer::Flaky => PerformerConfig::flaky(),
    };
    Ok(Source::Synthetic(SyntheticPerformer::new(config, cli.seed)))
}

/// Diagonal RGB gradient
fn test_card() -> HeartflowResult<VideoFrame> {
    let (w, h) = (TEST_CARD_WIDTH, TEST_CARD_HEIGHT);
    let mut pixels = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            pixels.extend_from_slice(&[
                (x * 255 / (w - 1)) as u8,
                (y * 255 / (h - 1)) as u8,
                160,
                255,
            ]);
        }
    }
    VideoFrame::new(w, h, pixels)
}

fn run(cli: &Cli) -> HeartflowResult<()> {
    let mut engine = FlowEngine::with_seed(load_config(cli)?, cli.seed)?;
    let canvas_size = engine.config().display;
    let step = Duration::try_from_secs_f32(engine.config().velocity.step_ms / 1000.0).map_err(|e| {
        HeartflowError::InvalidConfig {
            field: "velocity.step_ms",
            reason: e.to_string(),
        }
    })?;
    let mut source = open_source(cli)?;
    let feed = LatestFrame::new();
    let mut clock = FrameClock::fixed_step(step);

    let mut sampler = VideoSampler::new(canvas_size);
    sampler.load(test_card()?);
    let mut canvas = DrawList::new();

    info!(
        width = canvas_size.width,
        height = canvas_size.height,
        frames = cli.frames,
        "starting frame loop"
    );

    let tracker_every = cli.tracker_every.max(1);
    let mut ran = 0u64;
    for frame in 0..cli.frames {
        // The tracker finishes on its own schedule
        if frame % tracker_every == 0 {
            match source.next() {
                Some(result) => feed.publish(result),
                None => break,
            }
        }

        let now = clock.tick();
        canvas.clear();
        let stats = engine.tick_latest(&feed, now, &sampler, &mut canvas);
        ran += 1;

        if cli.report_every > 0 && frame % cli.report_every == 0 {
            info!(
                frame,
                live = stats.live,
                spawned = stats.spawned.total(),
                pruned = stats.pruned,
                drawn = canvas.len(),
                fresh = stats.fresh_input,
                tick_us = stats.tick_duration.as_micros() as u64,
                "frame"
            );
        }
    }

    let totals = engine.stats();
    for region in Region::all() {
        info!(%region, spawned = totals.spawned.get(*region), "region total");
    }
    info!(
        frames = ran,
        path_rebuilds = totals.path_rebuilds,
        spawned = totals.spawned.total(),
        pruned = totals.pruned,
        faulted = totals.faulted,
        peak_live = totals.peak_live,
        live = engine.pool().len(),
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("heartflow-demo").chain(args.iter().copied())).unwrap()
    }

    fn write_config(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("heartflow-demo-{}-{name}.json", std::process::id()));
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_preset_without_file() {
        let config = load_config(&cli(&["--preset", "sparse"])).unwrap();
        assert_eq!(config, SimConfig::sparse());
    }

    #[test]
    fn test_config_file_overlays_preset() {
        let path = write_config("overlay", r#"{ "mouth": { "count": 3 } }"#);
        let config = load_config(&cli(&["--preset", "hd", "--config", path.to_str().unwrap()])).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.display.width, 1920.0);
        assert_eq!(config.display.height, 1080.0);
        assert_eq!(config.mouth.count, 3);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let path = std::env::temp_dir().join("heartflow-demo-does-not-exist.json");
        assert!(matches!(
            load_config(&cli(&["--config", path.to_str().unwrap()])),
            Err(HeartflowError::Io(_))
        ));
    }
}
