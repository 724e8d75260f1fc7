//! Measurement tools
//!
//! Each tool is an independent session controller that owns its own
//! estimator or tracker state and timers. Tools never share state; the
//! host mounts one at a time and feeds it sampled input.

mod clicks;
mod dpi;
mod polling;
mod precision;
mod rate;
mod reaction;
mod rollover;
pub mod series;
mod typing;

pub use clicks::{BestScore, ClickSession, ClickSpeedTest, ClickState, TEST_DURATION_SECS};
pub use dpi::{compute_dpi, DpiError, DpiTest};
pub use polling::PollingRateTest;
pub use precision::{
    generate_targets, mean_and_std_dev, Hit, PrecisionState, PrecisionStats, PrecisionTest,
    Target, TargetArea, TARGET_COUNT,
};
pub use rate::{
    ActivityState, RateParams, SessionStats, WindowedRateEstimator, INACTIVITY_THRESHOLD,
    SERIES_CAPACITY, TIME_WINDOW, UPDATE_INTERVAL,
};
pub use reaction::{
    LatencyStats, LatencyTrial, ReactionState, ReactionTest, ReactionTimer, Response,
    MAX_STIMULUS_DELAY, MIN_STIMULUS_DELAY,
};
pub use rollover::{rollover_label, RolloverTest, NKRO_THRESHOLD};
pub use series::{ChartPoint, ClickSample, DeviationSample, LagSample, RateSample, Series};
pub use typing::{typing_stats, TypingState, TypingStats, TypingTest, PROMPTS};

use crate::input::{InputEvent, InputKind};
use std::time::Instant;

/// Common interface of every measurement tool
pub trait MeasurementTool {
    /// Name of the tool
    fn name(&self) -> &'static str;

    /// Short description
    fn description(&self) -> &'static str;

    /// Raw input kinds the tool subscribes to while mounted
    fn input_kinds(&self) -> &'static [InputKind];

    /// Called when the tool becomes the visible one
    fn mount(&mut self, _now: Instant) {}

    /// Called when the tool stops being visible. Cancels every pending timer.
    fn unmount(&mut self) {
        self.reset();
    }

    /// Process a sampled input event
    fn process_event(&mut self, event: &InputEvent);

    /// Advance timers to `now`
    fn tick(&mut self, _now: Instant) {}

    /// The tool's start/toggle command
    fn start(&mut self, _now: Instant) {}

    /// Take the pending user-facing notice, if any
    fn take_notice(&mut self) -> Option<String> {
        None
    }

    /// Get current results as display rows
    fn get_results(&self) -> Vec<TestResult>;

    /// Reset the tool
    fn reset(&mut self);
}

/// A single result row
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub label: String,
    pub value: String,
    pub status: ResultStatus,
}

impl TestResult {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }

    pub fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Ok)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Warning)
    }

    pub fn error(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Error)
    }

    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Info)
    }
}

/// Status of a result row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Warning,
    Error,
    Info,
}
