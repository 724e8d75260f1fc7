//! Reaction time / input lag test
//!
//! `start` arms the test and schedules a stimulus after a random delay.
//! Responding before the stimulus is shown rejects the attempt; responding
//! after it records one trial. The stimulus timeout is owned by the timer,
//! so reset cancels it and no stimulus from an earlier run can appear.

use super::series::{LagSample, Series};
use super::{MeasurementTool, ResultStatus, TestResult};
use crate::input::{InputEvent, InputKind, MouseButton, RawInput};
use crate::timer::{Timeout, TimerToken};
use crate::utils::as_millis_f64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Shortest delay before the stimulus
pub const MIN_STIMULUS_DELAY: Duration = Duration::from_millis(1000);
/// Upper bound (exclusive) of the stimulus delay
pub const MAX_STIMULUS_DELAY: Duration = Duration::from_millis(5000);

const MAX_LAG_SAMPLES: usize = 1024;

/// State of the reaction timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionState {
    Idle,
    /// Waiting for the stimulus
    Armed,
    /// Stimulus shown at the contained instant
    Ready { stimulus_at: Instant },
}

/// One measured stimulus/response pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyTrial {
    pub stimulus_at: Instant,
    pub responded_at: Instant,
    pub lag: Duration,
}

impl LatencyTrial {
    pub fn lag_ms(&self) -> f64 {
        as_millis_f64(self.lag)
    }
}

/// Aggregate over all trials of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub average_ms: f64,
    pub best_ms: f64,
    pub worst_ms: f64,
}

/// Result of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Nothing was armed
    Ignored,
    /// Responded before the stimulus; the attempt is discarded
    TooEarly,
    Recorded(LatencyTrial),
}

/// Stimulus/response state machine
#[derive(Debug)]
pub struct ReactionTimer {
    state: ReactionState,
    stimulus: Timeout,
    pending: Option<TimerToken>,
    results: Vec<LatencyTrial>,
}

impl ReactionTimer {
    pub fn new() -> Self {
        Self {
            state: ReactionState::Idle,
            stimulus: Timeout::new(),
            pending: None,
            results: Vec::new(),
        }
    }

    pub fn state(&self) -> ReactionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != ReactionState::Idle
    }

    pub fn results(&self) -> &[LatencyTrial] {
        &self.results
    }

    /// When the pending stimulus will be shown
    pub fn stimulus_deadline(&self) -> Option<Instant> {
        self.stimulus.deadline()
    }

    /// Arm the timer and schedule the stimulus after a delay drawn
    /// uniformly from `[MIN_STIMULUS_DELAY, MAX_STIMULUS_DELAY)`.
    /// Returns `false` if a round is already in progress.
    pub fn start<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> bool {
        if self.is_active() {
            return false;
        }
        let delay = rng.gen_range(MIN_STIMULUS_DELAY..MAX_STIMULUS_DELAY);
        self.pending = Some(self.stimulus.schedule(now + delay));
        self.state = ReactionState::Armed;
        log::debug!("reaction test armed, stimulus in {} ms", delay.as_millis());
        true
    }

    /// Show the stimulus if its delay has elapsed. Returns `true` when the
    /// stimulus appeared during this call.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(token) = self.stimulus.poll(now) else {
            return false;
        };
        if self.state != ReactionState::Armed
            || self.pending != Some(token)
            || !self.stimulus.is_current(token)
        {
            return false;
        }
        self.pending = None;
        self.state = ReactionState::Ready { stimulus_at: now };
        log::debug!("stimulus shown");
        true
    }

    /// Handle a click or key response at `now`
    pub fn respond(&mut self, now: Instant) -> Response {
        match self.state {
            ReactionState::Idle => Response::Ignored,
            ReactionState::Armed => {
                self.stimulus.cancel();
                self.pending = None;
                self.state = ReactionState::Idle;
                log::warn!("response before stimulus, attempt rejected");
                Response::TooEarly
            }
            ReactionState::Ready { stimulus_at } => {
                let trial = LatencyTrial {
                    stimulus_at,
                    responded_at: now,
                    lag: now.saturating_duration_since(stimulus_at),
                };
                self.results.push(trial);
                self.state = ReactionState::Idle;
                log::info!("reaction recorded: {:.0} ms", trial.lag_ms());
                Response::Recorded(trial)
            }
        }
    }

    /// Average, best and worst lag, or `None` before the first trial
    pub fn stats(&self) -> Option<LatencyStats> {
        if self.results.is_empty() {
            return None;
        }
        let lags: Vec<f64> = self.results.iter().map(LatencyTrial::lag_ms).collect();
        let average_ms = lags.iter().sum::<f64>() / lags.len() as f64;
        let best_ms = lags.iter().copied().fold(f64::INFINITY, f64::min);
        let worst_ms = lags.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Keep best <= average <= worst despite float summation error
        Some(LatencyStats {
            average_ms: average_ms.clamp(best_ms, worst_ms),
            best_ms,
            worst_ms,
        })
    }

    /// Clear all trials and cancel any pending stimulus
    pub fn reset(&mut self) {
        self.stimulus.cancel();
        self.pending = None;
        self.state = ReactionState::Idle;
        self.results.clear();
    }
}

impl Default for ReactionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reaction test controller
pub struct ReactionTest {
    timer: ReactionTimer,
    rng: StdRng,
    series: Series<LagSample>,
    notice: Option<String>,
}

impl ReactionTest {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Use a specific random source for stimulus delays
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            timer: ReactionTimer::new(),
            rng,
            series: Series::bounded(MAX_LAG_SAMPLES),
            notice: None,
        }
    }

    pub fn timer(&self) -> &ReactionTimer {
        &self.timer
    }

    pub fn series(&self) -> &Series<LagSample> {
        &self.series
    }

    pub fn respond(&mut self, now: Instant) -> Response {
        let response = self.timer.respond(now);
        match response {
            Response::TooEarly => {
                self.notice = Some("Too early! Wait for the target before clicking.".to_string());
            }
            Response::Recorded(trial) => {
                self.series.push(LagSample {
                    attempt: self.timer.results().len(),
                    lag_ms: trial.lag_ms(),
                });
                self.notice = Some(format!("Reaction time: {:.0} ms", trial.lag_ms()));
            }
            Response::Ignored => {}
        }
        response
    }

    /// Rating of an average lag
    pub fn rating(average_ms: f64) -> &'static str {
        if average_ms < 200.0 {
            "Excellent"
        } else if average_ms < 250.0 {
            "Good"
        } else if average_ms < 300.0 {
            "Average"
        } else {
            "Slow"
        }
    }
}

impl Default for ReactionTest {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementTool for ReactionTest {
    fn name(&self) -> &'static str {
        "Reaction Test"
    }

    fn description(&self) -> &'static str {
        "Start, wait for the target, then click or press a key as fast as you can"
    }

    fn input_kinds(&self) -> &'static [InputKind] {
        &[InputKind::PointerDown, InputKind::KeyDown]
    }

    fn process_event(&mut self, event: &InputEvent) {
        match event.input {
            RawInput::PointerDown { button: MouseButton::Left, .. } => {
                self.respond(event.timestamp);
            }
            RawInput::KeyDown { repeat: false, .. } => {
                self.respond(event.timestamp);
            }
            _ => {}
        }
    }

    fn tick(&mut self, now: Instant) {
        self.timer.poll(now);
    }

    fn start(&mut self, now: Instant) {
        self.timer.start(now, &mut self.rng);
    }

    fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    fn get_results(&self) -> Vec<TestResult> {
        let mut results = Vec::new();

        let state = match self.timer.state() {
            ReactionState::Idle => "Press start",
            ReactionState::Armed => "Wait for it...",
            ReactionState::Ready { .. } => "CLICK NOW!",
        };
        let status = match self.timer.state() {
            ReactionState::Ready { .. } => ResultStatus::Ok,
            ReactionState::Armed => ResultStatus::Warning,
            ReactionState::Idle => ResultStatus::Info,
        };
        results.push(TestResult::new("State", state, status));
        results.push(TestResult::info(
            "Attempts",
            format!("{}", self.timer.results().len()),
        ));

        match self.timer.stats() {
            Some(stats) => {
                let status = if stats.average_ms < 250.0 {
                    ResultStatus::Ok
                } else if stats.average_ms < 300.0 {
                    ResultStatus::Warning
                } else {
                    ResultStatus::Error
                };
                results.push(TestResult::new(
                    "Average",
                    format!("{:.0} ms", stats.average_ms),
                    status,
                ));
                results.push(TestResult::ok("Best", format!("{:.0} ms", stats.best_ms)));
                results.push(TestResult::warning("Worst", format!("{:.0} ms", stats.worst_ms)));
                results.push(TestResult::info("Rating", Self::rating(stats.average_ms)));
            }
            None => {
                results.push(TestResult::info("Average", "-"));
                results.push(TestResult::info("Best", "-"));
                results.push(TestResult::info("Worst", "-"));
            }
        }

        results
    }

    fn reset(&mut self) {
        self.timer.reset();
        self.series.clear();
        self.notice = None;
    }
}
