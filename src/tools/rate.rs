//! Windowed event-rate estimation
//!
//! Counts events inside a trailing time window on a fixed tick cadence,
//! tracks the running maximum and the average since activity started, and
//! drops to an inactive state after a quiet period. The next event after
//! going inactive starts a fresh sub-session with a new time base.

use super::series::{RateSample, Series};
use crate::utils::{per_second, round_to, round_u32};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Trailing window for the current rate
pub const TIME_WINDOW: Duration = Duration::from_millis(1000);
/// Quiet period after which the session goes inactive
pub const INACTIVITY_THRESHOLD: Duration = Duration::from_millis(3000);
/// Tick cadence; one chart point per active tick
pub const UPDATE_INTERVAL: Duration = Duration::from_millis(200);
/// Maximum number of chart points kept
pub const SERIES_CAPACITY: usize = 50;

/// Tuning of a [`WindowedRateEstimator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateParams {
    pub window: Duration,
    pub inactivity_threshold: Duration,
    pub series_capacity: usize,
}

impl Default for RateParams {
    fn default() -> Self {
        Self {
            window: TIME_WINDOW,
            inactivity_threshold: INACTIVITY_THRESHOLD,
            series_capacity: SERIES_CAPACITY,
        }
    }
}

/// Activity state of the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityState {
    /// Nothing recorded since the last reset
    Idle,
    /// Receiving events
    Active,
    /// No event for longer than the inactivity threshold
    Inactive,
    /// Stopped by the user; events are ignored until resumed
    Paused,
}

/// Snapshot of a rate session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Events in the trailing window, scaled to Hz
    pub current: u32,
    /// Events since activity started divided by elapsed seconds
    pub average: u32,
    /// Highest `current` seen since reset
    pub max: u32,
    pub is_active: bool,
}

/// Rolling events-per-second estimator
#[derive(Debug)]
pub struct WindowedRateEstimator {
    params: RateParams,
    recent: VecDeque<Instant>,
    state: ActivityState,
    started_at: Option<Instant>,
    last_recorded: Option<Instant>,
    total_events: u64,
    stats: SessionStats,
    series: Series<RateSample>,
}

impl WindowedRateEstimator {
    pub fn new(params: RateParams) -> Self {
        Self {
            params,
            recent: VecDeque::new(),
            state: ActivityState::Idle,
            started_at: None,
            last_recorded: None,
            total_events: 0,
            stats: SessionStats::default(),
            series: Series::bounded(params.series_capacity),
        }
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn series(&self) -> &Series<RateSample> {
        &self.series
    }

    /// Events counted toward the average of the current sub-session
    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    /// Record one event. Returns `false` if the event was ignored because
    /// the estimator is paused.
    pub fn record(&mut self, ts: Instant) -> bool {
        let resumed_after_quiet = self.state == ActivityState::Active
            && self
                .last_recorded
                .is_some_and(|last| ts.saturating_duration_since(last) > self.params.inactivity_threshold);

        match self.state {
            ActivityState::Paused => return false,
            ActivityState::Active if !resumed_after_quiet => {}
            _ => self.begin_sub_session(ts),
        }

        self.recent.push_back(ts);
        self.total_events += 1;
        self.last_recorded = Some(ts);
        true
    }

    /// Recompute the rate at `now`, appending a chart point while active
    pub fn tick(&mut self, now: Instant) -> SessionStats {
        if self.state != ActivityState::Active {
            return self.stats;
        }

        let window = self.params.window;
        while let Some(&oldest) = self.recent.front() {
            if now.saturating_duration_since(oldest) > window {
                self.recent.pop_front();
            } else {
                break;
            }
        }

        // Events stamped after `now` wait for a later tick
        let pending = self.recent.iter().rev().take_while(|&&ts| ts > now).count();
        let counted = self.recent.len() - pending;

        let last_seen = if counted > 0 {
            self.recent.get(counted - 1).copied()
        } else {
            self.last_recorded
        };
        let quiet_for = last_seen
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        if quiet_for > self.params.inactivity_threshold {
            log::debug!("rate session inactive after {:?} without events", quiet_for);
            self.state = ActivityState::Inactive;
            self.recent.clear();
            self.stats.current = 0;
            self.stats.is_active = false;
            return self.stats;
        }

        let window_ms = window.as_millis().max(1) as f64;
        let current = round_u32(counted as f64 * (1000.0 / window_ms));
        let elapsed = self
            .started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();

        self.stats.current = current;
        let seen_events = self.total_events.saturating_sub(pending as u64);
        self.stats.average = round_u32(per_second(seen_events, elapsed));
        self.stats.max = self.stats.max.max(current);
        self.stats.is_active = true;

        self.series.push(RateSample {
            elapsed_secs: round_to(elapsed.as_secs_f64(), 1),
            rate_hz: current,
        });

        self.stats
    }

    /// Stop accepting events, keeping max and chart
    pub fn pause(&mut self) {
        if self.state == ActivityState::Paused {
            return;
        }
        self.state = ActivityState::Paused;
        self.recent.clear();
        self.stats.current = 0;
        self.stats.is_active = false;
    }

    /// Resume after [`pause`](Self::pause) with a new time base at `now`
    pub fn resume(&mut self, now: Instant) {
        if self.state != ActivityState::Paused {
            return;
        }
        self.state = ActivityState::Active;
        self.started_at = Some(now);
        self.last_recorded = Some(now);
        self.total_events = 0;
        self.stats.is_active = true;
    }

    /// Begin measuring at `now` unless already active. A paused session
    /// resumes with its chart; an idle or inactive one starts a fresh
    /// sub-session. Returns `false` if already active.
    pub fn start(&mut self, now: Instant) -> bool {
        match self.state {
            ActivityState::Active => return false,
            ActivityState::Paused => self.resume(now),
            ActivityState::Idle | ActivityState::Inactive => {
                self.begin_sub_session(now);
                self.last_recorded = Some(now);
            }
        }
        true
    }

    /// Clear everything, including the running maximum
    pub fn reset(&mut self) {
        self.recent.clear();
        self.state = ActivityState::Idle;
        self.started_at = None;
        self.last_recorded = None;
        self.total_events = 0;
        self.stats = SessionStats::default();
        self.series.clear();
    }

    fn begin_sub_session(&mut self, ts: Instant) {
        log::debug!("rate session (re)started");
        self.state = ActivityState::Active;
        self.started_at = Some(ts);
        self.total_events = 0;
        self.recent.clear();
        self.series.clear();
        self.stats.current = 0;
        self.stats.average = 0;
        self.stats.is_active = true;
    }
}

impl Default for WindowedRateEstimator {
    fn default() -> Self {
        Self::new(RateParams::default())
    }
}
