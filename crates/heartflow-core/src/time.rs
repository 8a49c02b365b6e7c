//! Time primitives for Heartflow
//!
//! Frame timestamps are microseconds since the start of the session. The
//! velocity estimator works in milliseconds, so conversions to fractional
//! milliseconds are provided alongside the integer ones.

use std::ops::{Add, Sub};
use std::time::{Duration, Instant};

/// Frame timestamp - microseconds since session start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameTime(pub i64);

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        FrameTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        FrameTime(millis * 1000)
    }

    #[inline]
    pub fn from_millis_f64(millis: f64) -> Self {
        FrameTime((millis * 1000.0) as i64)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Signed milliseconds elapsed since `earlier` (negative if `earlier` is later)
    #[inline]
    pub fn millis_since(self, earlier: FrameTime) -> f64 {
        (self.0 - earlier.0) as f64 / 1000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        FrameTime(self.0.saturating_add(duration.as_micros() as i64))
    }
}

impl Add<Duration> for FrameTime {
    type Output = FrameTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        FrameTime(self.0 + rhs.as_micros() as i64)
    }
}

impl Sub<FrameTime> for FrameTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: FrameTime) -> Self::Output {
        let diff = self.0 - rhs.0;
        if diff >= 0 {
            Duration::from_micros(diff as u64)
        } else {
            Duration::ZERO
        }
    }
}

impl std::fmt::Debug for FrameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.as_millis_f64())
    }
}

/// How the frame clock advances
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockMode {
    /// Follow the OS monotonic clock, clamping large gaps
    RealTime { max_gap: Duration },
    /// Advance by a fixed step per tick (playback and tests)
    FixedStep(Duration),
}

/// Frame clock - monotonic, never jumps backwards
pub struct FrameClock {
    value: FrameTime,
    mode: ClockMode,
    last_update: Instant,
}

impl FrameClock {
    /// Real-time clock; gaps longer than 100ms (e.g. after a stall) are clamped
    pub fn real_time() -> Self {
        Self::with_mode(ClockMode::RealTime {
            max_gap: Duration::from_millis(100),
        })
    }

    /// Deterministic clock advancing by `step` on every tick
    pub fn fixed_step(step: Duration) -> Self {
        Self::with_mode(ClockMode::FixedStep(step))
    }

    pub fn with_mode(mode: ClockMode) -> Self {
        FrameClock {
            value: FrameTime::ZERO,
            mode,
            last_update: Instant::now(),
        }
    }

    /// Advance the clock and return the new frame time
    pub fn tick(&mut self) -> FrameTime {
        let advance = match self.mode {
            ClockMode::RealTime { max_gap } => {
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_update);
                self.last_update = now;
                elapsed.min(max_gap)
            }
            ClockMode::FixedStep(step) => step,
        };
        self.value = self.value.saturating_add(advance);
        self.value
    }

    pub fn now(&self) -> FrameTime {
        self.value
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::real_time()
    }
}
