//! Latest-frame slot
//!
//! Trackers run asynchronously and finish whenever they finish. The frame
//! loop never waits for them: it snapshots whatever result was completed
//! last. Publishing replaces the slot; reading never consumes it, so a frame
//! with no fresh detection sees the previous one again.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::LandmarkFrame;

#[derive(Debug, Default)]
struct Slot {
    frame: Option<Arc<LandmarkFrame>>,
    generation: u64,
}

/// Shared handle to the most recent tracker result
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    inner: Arc<Mutex<Slot>>,
}

/// What the frame loop read from the slot
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub frame: Option<Arc<LandmarkFrame>>,
    /// Increments on every publish; equal generations mean no new result
    pub generation: u64,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current result. `None` records an explicit "no detection".
    pub fn publish(&self, frame: Option<LandmarkFrame>) {
        let mut slot = self.inner.lock();
        slot.frame = frame.map(Arc::new);
        slot.generation += 1;
    }

    /// Read the current result without blocking on the producer
    pub fn snapshot(&self) -> FrameSnapshot {
        let slot = self.inner.lock();
        FrameSnapshot {
            frame: slot.frame.clone(),
            generation: slot.generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }
}
