//! Click speed (CPS) test
//!
//! A fixed ten second countdown started by the first click. The personal
//! best lives in [`BestScore`], outside the resettable [`ClickSession`], so
//! it survives resets for as long as the test itself is alive.

use super::series::{ClickSample, Series};
use super::{MeasurementTool, ResultStatus, TestResult};
use crate::input::{InputEvent, InputKind, MouseButton, RawInput};
use crate::timer::Interval;
use crate::utils::safe_ratio;
use std::time::{Duration, Instant};

/// Length of one click-speed run
pub const TEST_DURATION_SECS: u32 = 10;

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);
const MAX_CLICK_SAMPLES: usize = 4096;

/// Lifecycle of a click-speed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickState {
    Idle,
    Running,
    Finished,
}

/// Resettable state of one run
#[derive(Debug, Clone)]
pub struct ClickSession {
    pub click_count: u32,
    pub window_secs: u32,
    pub remaining_secs: u32,
    pub final_cps: Option<f64>,
    pub series: Series<ClickSample>,
}

impl ClickSession {
    fn new() -> Self {
        Self {
            click_count: 0,
            window_secs: TEST_DURATION_SECS,
            remaining_secs: TEST_DURATION_SECS,
            final_cps: None,
            series: Series::bounded(MAX_CLICK_SAMPLES),
        }
    }

    /// Whole seconds elapsed in the run
    pub fn elapsed_secs(&self) -> u32 {
        self.window_secs - self.remaining_secs
    }
}

/// Best final CPS across runs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BestScore {
    best: f64,
}

impl BestScore {
    pub fn best(&self) -> f64 {
        self.best
    }

    /// Offer a finished score; returns `true` if it is a new best
    pub fn offer(&mut self, cps: f64) -> bool {
        if cps > self.best {
            self.best = cps;
            true
        } else {
            false
        }
    }
}

/// Click speed test controller
pub struct ClickSpeedTest {
    state: ClickState,
    session: ClickSession,
    best: BestScore,
    countdown: Interval,
    notice: Option<String>,
}

impl ClickSpeedTest {
    pub fn new() -> Self {
        Self {
            state: ClickState::Idle,
            session: ClickSession::new(),
            best: BestScore::default(),
            countdown: Interval::new(COUNTDOWN_PERIOD),
            notice: None,
        }
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    pub fn session(&self) -> &ClickSession {
        &self.session
    }

    pub fn best_cps(&self) -> f64 {
        self.best.best()
    }

    /// Begin a new run. Returns `false` (and does nothing) while a run is
    /// already in progress.
    pub fn begin(&mut self, now: Instant) -> bool {
        if self.state == ClickState::Running {
            log::debug!("click test already running, start ignored");
            return false;
        }
        self.session = ClickSession::new();
        self.state = ClickState::Running;
        self.countdown.start(now);
        log::debug!("click test started");
        true
    }

    /// Count one click. The first click while idle starts the run and
    /// counts as click number one.
    pub fn register_click(&mut self, now: Instant) -> bool {
        match self.state {
            ClickState::Idle => {
                self.begin(now);
            }
            ClickState::Running => {}
            ClickState::Finished => return false,
        }

        self.session.click_count += 1;
        self.session.series.push(ClickSample {
            time_secs: self.session.elapsed_secs(),
            clicks: self.session.click_count,
        });
        true
    }

    /// One countdown step
    pub fn on_timer_tick(&mut self) {
        if self.state != ClickState::Running {
            return;
        }
        self.session.remaining_secs = self.session.remaining_secs.saturating_sub(1);
        if self.session.remaining_secs == 0 {
            self.finish();
        }
    }

    /// End the running session and fix the final score. Only the countdown
    /// reaching zero gets here.
    fn finish(&mut self) -> Option<f64> {
        if self.state != ClickState::Running {
            return None;
        }
        let final_cps = safe_ratio(
            self.session.click_count as f64,
            self.session.window_secs as f64,
        );
        self.session.final_cps = Some(final_cps);
        self.session.remaining_secs = 0;
        self.state = ClickState::Finished;
        self.countdown.stop();

        if self.best.offer(final_cps) {
            log::info!("new best click speed: {:.1} CPS", final_cps);
            self.notice = Some(format!("New Personal Best! {:.1} clicks per second", final_cps));
        } else {
            log::info!("click test complete: {:.1} CPS", final_cps);
            self.notice = Some(format!("Test Complete: {:.1} clicks per second", final_cps));
        }
        Some(final_cps)
    }

    /// Clicks per second for display: live while running, final afterwards
    pub fn cps(&self) -> f64 {
        match self.state {
            ClickState::Idle => 0.0,
            ClickState::Running => safe_ratio(
                self.session.click_count as f64,
                self.session.elapsed_secs() as f64,
            ),
            ClickState::Finished => self.session.final_cps.unwrap_or(0.0),
        }
    }
}

impl Default for ClickSpeedTest {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementTool for ClickSpeedTest {
    fn name(&self) -> &'static str {
        "Click Speed Test"
    }

    fn description(&self) -> &'static str {
        "Click as fast as you can for ten seconds"
    }

    fn input_kinds(&self) -> &'static [InputKind] {
        &[InputKind::PointerDown]
    }

    fn process_event(&mut self, event: &InputEvent) {
        if let RawInput::PointerDown { button: MouseButton::Left, .. } = event.input {
            // A click after the deadline must not count toward the run
            self.tick(event.timestamp);
            self.register_click(event.timestamp);
        }
    }

    fn tick(&mut self, now: Instant) {
        while self.countdown.poll(now).is_some() {
            self.on_timer_tick();
        }
    }

    fn start(&mut self, now: Instant) {
        self.begin(now);
    }

    fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    fn get_results(&self) -> Vec<TestResult> {
        let mut results = Vec::new();

        let state = match self.state {
            ClickState::Idle => "Click to start".to_string(),
            ClickState::Running => format!("{}s left", self.session.remaining_secs),
            ClickState::Finished => "Finished".to_string(),
        };
        results.push(TestResult::info("State", state));

        let label = if self.state == ClickState::Finished {
            "Final CPS"
        } else {
            "Current CPS"
        };
        results.push(TestResult::info(label, format!("{:.1}", self.cps())));
        results.push(TestResult::info("Clicks", format!("{}", self.session.click_count)));

        let best = self.best.best();
        let status = if best >= 10.0 {
            ResultStatus::Ok
        } else if best >= 6.0 {
            ResultStatus::Warning
        } else {
            ResultStatus::Info
        };
        results.push(TestResult::new("Personal Best", format!("{:.1} CPS", best), status));

        results
    }

    fn reset(&mut self) {
        self.countdown.stop();
        self.session = ClickSession::new();
        self.state = ClickState::Idle;
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_at(ts: Instant) -> InputEvent {
        InputEvent::new(
            RawInput::PointerDown { x: 0, y: 0, button: MouseButton::Left },
            ts,
        )
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn run_hundred_clicks(test: &mut ClickSpeedTest, base: Instant) {
        for i in 0..100u64 {
            test.process_event(&click_at(base + ms(i * 100)));
        }
        test.tick(base + ms(10_000));
    }

    #[test]
    fn hundred_clicks_in_ten_seconds_is_ten_cps() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        run_hundred_clicks(&mut test, base);

        assert_eq!(test.state(), ClickState::Finished);
        assert_eq!(test.session().click_count, 100);
        assert_eq!(test.session().final_cps, Some(10.0));
        assert_eq!(test.best_cps(), 10.0);
    }

    #[test]
    fn first_click_starts_and_counts_once() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        test.process_event(&click_at(base));

        assert_eq!(test.state(), ClickState::Running);
        assert_eq!(test.session().click_count, 1);
        assert_eq!(test.session().series.len(), 1);
    }

    #[test]
    fn start_while_running_is_noop() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        test.process_event(&click_at(base));
        test.process_event(&click_at(base + ms(100)));

        assert!(!test.begin(base + ms(200)));
        assert_eq!(test.session().click_count, 2);
        assert_eq!(test.state(), ClickState::Running);
    }

    #[test]
    fn click_after_deadline_is_not_counted() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        test.process_event(&click_at(base));
        test.process_event(&click_at(base + ms(10_500)));

        assert_eq!(test.state(), ClickState::Finished);
        assert_eq!(test.session().click_count, 1);
        assert_eq!(test.session().final_cps, Some(0.1));
    }

    #[test]
    fn series_records_cumulative_clicks_per_whole_second() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        for t in [0, 500, 1200, 2500] {
            test.process_event(&click_at(base + ms(t)));
        }

        let points: Vec<_> = test.session().series.iter().copied().collect();
        assert_eq!(
            points,
            vec![
                ClickSample { time_secs: 0, clicks: 1 },
                ClickSample { time_secs: 0, clicks: 2 },
                ClickSample { time_secs: 1, clicks: 3 },
                ClickSample { time_secs: 2, clicks: 4 },
            ]
        );
    }

    #[test]
    fn live_cps_is_zero_before_first_second() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        test.process_event(&click_at(base));
        test.process_event(&click_at(base + ms(100)));
        assert_eq!(test.cps(), 0.0);

        test.tick(base + ms(1000));
        assert_eq!(test.cps(), 2.0);
    }

    #[test]
    fn reset_keeps_best_score() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        run_hundred_clicks(&mut test, base);
        test.reset();

        assert_eq!(test.session().click_count, 0);
        assert!(test.session().series.is_empty());
        assert_eq!(test.state(), ClickState::Idle);
        assert_eq!(test.best_cps(), 10.0);
    }

    #[test]
    fn slower_run_does_not_lower_best() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        run_hundred_clicks(&mut test, base);
        assert!(test.take_notice().unwrap().starts_with("New Personal Best"));

        let second = base + ms(20_000);
        test.begin(second);
        for i in 0..20u64 {
            test.process_event(&click_at(second + ms(i * 400)));
        }
        test.tick(second + ms(10_000));

        assert_eq!(test.session().final_cps, Some(2.0));
        assert_eq!(test.best_cps(), 10.0);
        assert!(test.take_notice().unwrap().starts_with("Test Complete"));
    }

    #[test]
    fn finish_outside_a_run_changes_nothing() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        assert_eq!(test.finish(), None);
        assert_eq!(test.state(), ClickState::Idle);
        assert_eq!(test.best_cps(), 0.0);
        assert!(test.take_notice().is_none());

        run_hundred_clicks(&mut test, base);
        test.take_notice();
        assert_eq!(test.finish(), None);
        assert_eq!(test.session().final_cps, Some(10.0));
        assert!(test.take_notice().is_none());
    }

    #[test]
    fn clicks_ignored_once_finished_until_restart() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        run_hundred_clicks(&mut test, base);

        test.process_event(&click_at(base + ms(11_000)));
        assert_eq!(test.session().click_count, 100);
    }

    #[test]
    fn right_clicks_do_not_count() {
        let base = Instant::now();
        let mut test = ClickSpeedTest::new();
        test.process_event(&InputEvent::new(
            RawInput::PointerDown { x: 0, y: 0, button: MouseButton::Right },
            base,
        ));
        assert_eq!(test.state(), ClickState::Idle);
    }
}
