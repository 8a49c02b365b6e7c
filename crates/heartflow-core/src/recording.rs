//! Landmark recordings
//!
//! A recording is JSON lines: one [`LandmarkFrame`] per line, or `null`
//! for a frame where the tracker found nothing. Blank lines are ignored.

use std::fmt::Write as _;

use crate::{HeartflowError, HeartflowResult, LandmarkFrame};

/// Parse a whole recording
pub fn parse_recording(text: &str) -> HeartflowResult<Vec<Option<LandmarkFrame>>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Option<LandmarkFrame>>(line).map_err(|e| {
                HeartflowError::MalformedRecording {
                    line: i + 1,
                    reason: e.to_string(),
                }
            })
        })
        .collect()
}

/// Serialize frames into the recording format
pub fn write_recording<'a, I>(frames: I) -> HeartflowResult<String>
where
    I: IntoIterator<Item = Option<&'a LandmarkFrame>>,
{
    let mut out = String::new();
    for (i, frame) in frames.into_iter().enumerate() {
        let line = serde_json::to_string(&frame).map_err(|e| HeartflowError::MalformedRecording {
            line: i + 1,
            reason: e.to_string(),
        })?;
        // Writing to a String cannot fail
        let _ = writeln!(out, "{line}");
    }
    Ok(out)
}
