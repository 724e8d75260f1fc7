//! Pointer polling rate test

use super::rate::{ActivityState, SessionStats, WindowedRateEstimator, UPDATE_INTERVAL};
use super::series::{RateSample, Series};
use super::{MeasurementTool, ResultStatus, TestResult};
use crate::input::{InputEvent, InputKind, RawInput};
use crate::timer::Interval;
use std::time::Instant;

/// Estimates pointer polling rate from movement events
pub struct PollingRateTest {
    estimator: WindowedRateEstimator,
    /// Recalculation cadence
    ticker: Interval,
}

impl PollingRateTest {
    pub fn new() -> Self {
        Self {
            estimator: WindowedRateEstimator::default(),
            ticker: Interval::new(UPDATE_INTERVAL),
        }
    }

    pub fn snapshot(&self) -> SessionStats {
        self.estimator.stats()
    }

    pub fn series(&self) -> &Series<RateSample> {
        self.estimator.series()
    }

    pub fn state(&self) -> ActivityState {
        self.estimator.state()
    }

    /// Pause a running measurement, otherwise start measuring with a
    /// fresh time base
    pub fn toggle(&mut self, now: Instant) {
        if self.estimator.state() == ActivityState::Active {
            self.estimator.pause();
            log::debug!("polling test paused");
        } else {
            self.estimator.start(now);
            log::debug!("polling test started");
        }
    }

    fn rate_status(hz: u32) -> ResultStatus {
        if hz >= 900 {
            ResultStatus::Ok
        } else if hz >= 450 {
            ResultStatus::Warning
        } else {
            ResultStatus::Error
        }
    }
}

impl Default for PollingRateTest {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementTool for PollingRateTest {
    fn name(&self) -> &'static str {
        "Polling Rate Test"
    }

    fn description(&self) -> &'static str {
        "Move the pointer continuously to estimate how often the mouse reports"
    }

    fn input_kinds(&self) -> &'static [InputKind] {
        &[InputKind::PointerMove]
    }

    fn mount(&mut self, now: Instant) {
        self.ticker.start(now);
    }

    fn unmount(&mut self) {
        self.ticker.stop();
        self.reset();
    }

    fn process_event(&mut self, event: &InputEvent) {
        if let RawInput::PointerMove { .. } = event.input {
            // Keep the window in step with event time before counting
            self.tick(event.timestamp);
            self.estimator.record(event.timestamp);
        }
    }

    fn tick(&mut self, now: Instant) {
        while let Some(due) = self.ticker.poll(now) {
            self.estimator.tick(due);
        }
    }

    fn start(&mut self, now: Instant) {
        self.toggle(now);
    }

    fn get_results(&self) -> Vec<TestResult> {
        let stats = self.snapshot();
        let mut results = Vec::new();

        let state = match self.state() {
            ActivityState::Idle => "Move your mouse to start",
            ActivityState::Active => "Measuring",
            ActivityState::Inactive => "Inactive",
            ActivityState::Paused => "Paused",
        };
        results.push(TestResult::info("State", state));

        if stats.is_active {
            results.push(TestResult::new(
                "Current Rate",
                format!("{} Hz", stats.current),
                Self::rate_status(stats.current),
            ));
        } else {
            results.push(TestResult::info("Current Rate", "0 Hz"));
        }

        results.push(TestResult::info("Average Rate", format!("{} Hz", stats.average)));

        if stats.max > 0 {
            results.push(TestResult::new(
                "Max Rate",
                format!("{} Hz", stats.max),
                Self::rate_status(stats.max),
            ));
        } else {
            results.push(TestResult::info("Max Rate", "0 Hz"));
        }

        results.push(TestResult::info(
            "Events (this run)",
            format!("{}", self.estimator.total_events()),
        ));

        results
    }

    fn reset(&mut self) {
        self.estimator.reset();
    }
}
