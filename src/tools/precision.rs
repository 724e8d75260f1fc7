//! Sensor precision test
//!
//! A run places [`TARGET_COUNT`] random targets inside the target area and
//! shows them one at a time. Each click inside the area is scored by its
//! straight-line distance from the current target; once every target has
//! been clicked the run reports the average deviation, its standard
//! deviation (consistency) and how long the run took.

use super::series::{DeviationSample, Series};
use super::{MeasurementTool, ResultStatus, TestResult};
use crate::input::{InputEvent, InputKind, MouseButton, RawInput};
use crate::utils::safe_ratio;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Targets per run
pub const TARGET_COUNT: usize = 10;

/// Rectangle, in pointer units, where targets are placed and clicks count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetArea {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl TargetArea {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

impl Default for TargetArea {
    fn default() -> Self {
        Self::new(0, 0, 60, 20)
    }
}

/// Center of one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Target {
    pub x: i32,
    pub y: i32,
}

impl Target {
    /// Euclidean distance from the target center to `(x, y)`
    pub fn deviation(&self, x: i32, y: i32) -> f64 {
        let dx = (x - self.x) as f64;
        let dy = (y - self.y) as f64;
        dx.hypot(dy)
    }
}

/// One scored click
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub target: Target,
    pub x: i32,
    pub y: i32,
    pub deviation: f64,
}

/// Scores of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecisionStats {
    pub average_deviation: f64,
    /// Population standard deviation of the deviations
    pub consistency: f64,
    pub duration_secs: f64,
}

/// Lifecycle of a precision run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionState {
    Idle,
    Running,
    Finished,
}

/// Place `count` targets uniformly inside `area`
pub fn generate_targets<R: Rng + ?Sized>(area: TargetArea, count: usize, rng: &mut R) -> Vec<Target> {
    (0..count)
        .map(|_| Target {
            x: area.left + rng.gen_range(0..area.width),
            y: area.top + rng.gen_range(0..area.height),
        })
        .collect()
}

/// Mean and population standard deviation, `None` for an empty slice
pub fn mean_and_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = safe_ratio(values.iter().sum(), n);
    let variance = safe_ratio(values.iter().map(|v| (v - mean).powi(2)).sum(), n);
    Some((mean, variance.sqrt()))
}

/// Sensor precision test controller
pub struct PrecisionTest {
    area: TargetArea,
    targets: Vec<Target>,
    hits: Vec<Hit>,
    state: PrecisionState,
    started_at: Option<Instant>,
    duration: Option<Duration>,
    rng: StdRng,
    series: Series<DeviationSample>,
    notice: Option<String>,
}

impl PrecisionTest {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Use a specific random source for target placement
    pub fn with_rng(mut rng: StdRng) -> Self {
        let area = TargetArea::default();
        let targets = generate_targets(area, TARGET_COUNT, &mut rng);
        Self {
            area,
            targets,
            hits: Vec::with_capacity(TARGET_COUNT),
            state: PrecisionState::Idle,
            started_at: None,
            duration: None,
            rng,
            series: Series::bounded(TARGET_COUNT),
            notice: None,
        }
    }

    pub fn state(&self) -> PrecisionState {
        self.state
    }

    pub fn area(&self) -> TargetArea {
        self.area
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn series(&self) -> &Series<DeviationSample> {
        &self.series
    }

    /// Move the target area. Targets are re-placed unless a run is in
    /// progress.
    pub fn set_area(&mut self, area: TargetArea) {
        if area == self.area || self.state == PrecisionState::Running {
            return;
        }
        self.area = area;
        self.targets = generate_targets(area, TARGET_COUNT, &mut self.rng);
    }

    /// Target to click next, while running
    pub fn current_target(&self) -> Option<Target> {
        if self.state != PrecisionState::Running {
            return None;
        }
        self.targets.get(self.hits.len()).copied()
    }

    /// Begin a run with fresh targets. Returns `false` while running.
    pub fn begin(&mut self, now: Instant) -> bool {
        if self.state == PrecisionState::Running {
            return false;
        }
        self.targets = generate_targets(self.area, TARGET_COUNT, &mut self.rng);
        self.hits.clear();
        self.series.clear();
        self.duration = None;
        self.started_at = Some(now);
        self.state = PrecisionState::Running;
        log::debug!("precision test started in {:?}", self.area);
        true
    }

    /// Score a click at `(x, y)`. Clicks outside the area, or outside a
    /// run, are ignored.
    pub fn register_click(&mut self, x: i32, y: i32, now: Instant) -> Option<f64> {
        if !self.area.contains(x, y) {
            return None;
        }
        let target = self.current_target()?;
        let deviation = target.deviation(x, y);
        self.hits.push(Hit {
            target,
            x,
            y,
            deviation,
        });
        self.series.push(DeviationSample {
            click: self.hits.len(),
            deviation,
        });

        if self.hits.len() >= self.targets.len() {
            self.state = PrecisionState::Finished;
            self.duration = self.started_at.map(|start| now.saturating_duration_since(start));
            log::info!("precision test complete after {} clicks", self.hits.len());
            self.notice = Some(format!(
                "Test Complete! You clicked all {} targets.",
                self.targets.len()
            ));
        }
        Some(deviation)
    }

    /// Scores of the finished run
    pub fn stats(&self) -> Option<PrecisionStats> {
        if self.state != PrecisionState::Finished {
            return None;
        }
        let deviations: Vec<f64> = self.hits.iter().map(|hit| hit.deviation).collect();
        let (average_deviation, consistency) = mean_and_std_dev(&deviations)?;
        Some(PrecisionStats {
            average_deviation,
            consistency,
            duration_secs: self.duration.unwrap_or_default().as_secs_f64(),
        })
    }

    fn deviation_status(average: f64) -> ResultStatus {
        if average <= 1.0 {
            ResultStatus::Ok
        } else if average <= 3.0 {
            ResultStatus::Warning
        } else {
            ResultStatus::Error
        }
    }
}

impl Default for PrecisionTest {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementTool for PrecisionTest {
    fn name(&self) -> &'static str {
        "Sensor Precision Test"
    }

    fn description(&self) -> &'static str {
        "Click the center of each target as accurately as you can"
    }

    fn input_kinds(&self) -> &'static [InputKind] {
        &[InputKind::PointerDown]
    }

    fn process_event(&mut self, event: &InputEvent) {
        if let RawInput::PointerDown { x, y, button: MouseButton::Left } = event.input {
            self.register_click(x, y, event.timestamp);
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
            PrecisionState::Idle => "Press F2 to start".to_string(),
            PrecisionState::Running => {
                format!("Target {}/{}", self.hits.len() + 1, self.targets.len())
            }
            PrecisionState::Finished => "Finished".to_string(),
        };
        results.push(TestResult::info("State", state));
        results.push(TestResult::info(
            "Clicks",
            format!("{}/{}", self.hits.len(), self.targets.len()),
        ));

        match self.stats() {
            Some(stats) => {
                results.push(TestResult::new(
                    "Avg. Deviation",
                    format!("{:.2} cells", stats.average_deviation),
                    Self::deviation_status(stats.average_deviation),
                ));
                results.push(TestResult::info(
                    "Consistency (Std.Dev)",
                    format!("{:.2} cells", stats.consistency),
                ));
                results.push(TestResult::info(
                    "Time Taken",
                    format!("{:.2}s", stats.duration_secs),
                ));
            }
            None => {
                results.push(TestResult::info("Avg. Deviation", "N/A"));
                results.push(TestResult::info("Consistency (Std.Dev)", "N/A"));
                results.push(TestResult::info("Time Taken", "N/A"));
            }
        }

        results
    }

    fn reset(&mut self) {
        self.state = PrecisionState::Idle;
        self.hits.clear();
        self.series.clear();
        self.started_at = None;
        self.duration = None;
        self.notice = None;
        self.targets = generate_targets(self.area, TARGET_COUNT, &mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn seeded() -> PrecisionTest {
        PrecisionTest::with_rng(StdRng::seed_from_u64(11))
    }

    fn click_at(x: i32, y: i32, ts: Instant) -> InputEvent {
        InputEvent::new(RawInput::PointerDown { x, y, button: MouseButton::Left }, ts)
    }

    /// A point 5 cells from `target` (a 3-4-5 offset) that stays inside `area`
    fn five_away(target: Target, area: TargetArea) -> (i32, i32) {
        let x = if area.contains(target.x + 3, target.y) { target.x + 3 } else { target.x - 3 };
        let y = if area.contains(target.x, target.y + 4) { target.y + 4 } else { target.y - 4 };
        (x, y)
    }

    #[test]
    fn targets_fall_inside_area() {
        let area = TargetArea::new(10, 5, 30, 8);
        let targets = generate_targets(area, 200, &mut StdRng::seed_from_u64(3));
        assert_eq!(targets.len(), 200);
        assert!(targets.iter().all(|t| area.contains(t.x, t.y)));
    }

    #[test]
    fn degenerate_area_is_widened_to_one_cell() {
        let area = TargetArea::new(4, 4, 0, -3);
        assert_eq!((area.width, area.height), (1, 1));
        let targets = generate_targets(area, 3, &mut StdRng::seed_from_u64(3));
        assert!(targets.iter().all(|t| *t == Target { x: 4, y: 4 }));
    }

    #[test]
    fn deviation_is_euclidean() {
        let target = Target { x: 10, y: 10 };
        assert_eq!(target.deviation(13, 14), 5.0);
        assert_eq!(target.deviation(10, 10), 0.0);
    }

    #[test]
    fn std_dev_is_population() {
        let (mean, std_dev) = mean_and_std_dev(&[0.0, 5.0, 0.0, 5.0]).unwrap();
        assert_eq!(mean, 2.5);
        assert_eq!(std_dev, 2.5);
        assert!(mean_and_std_dev(&[]).is_none());
    }

    #[test]
    fn clicks_before_start_are_ignored() {
        let base = Instant::now();
        let mut test = seeded();
        test.process_event(&click_at(1, 1, base));
        assert!(test.hits().is_empty());
        assert_eq!(test.state(), PrecisionState::Idle);
    }

    #[test]
    fn exact_clicks_score_zero() {
        let base = Instant::now();
        let mut test = seeded();
        test.start(base);

        for i in 0..TARGET_COUNT as u64 {
            let target = test.current_target().unwrap();
            test.process_event(&click_at(target.x, target.y, base + ms(500 * (i + 1))));
        }

        assert_eq!(test.state(), PrecisionState::Finished);
        let stats = test.stats().unwrap();
        assert_eq!(stats.average_deviation, 0.0);
        assert_eq!(stats.consistency, 0.0);
        assert_eq!(stats.duration_secs, 5.0);
        assert!(test.take_notice().unwrap().starts_with("Test Complete"));
        assert!(test.current_target().is_none());
    }

    #[test]
    fn alternating_misses_give_mean_and_consistency() {
        let base = Instant::now();
        let mut test = seeded();
        test.begin(base);

        for i in 0..TARGET_COUNT {
            let target = test.current_target().unwrap();
            let (x, y) = if i % 2 == 0 {
                (target.x, target.y)
            } else {
                five_away(target, test.area())
            };
            test.register_click(x, y, base + ms(i as u64 * 100));
            assert!(test.stats().is_none() || i == TARGET_COUNT - 1);
        }

        let stats = test.stats().unwrap();
        assert_eq!(stats.average_deviation, 2.5);
        assert_eq!(stats.consistency, 2.5);
        assert_eq!(test.series().len(), TARGET_COUNT);
    }

    #[test]
    fn click_outside_area_is_not_scored() {
        let base = Instant::now();
        let mut test = seeded();
        test.set_area(TargetArea::new(10, 10, 20, 10));
        test.begin(base);

        assert_eq!(test.register_click(0, 0, base), None);
        assert!(test.hits().is_empty());
    }

    #[test]
    fn begin_while_running_keeps_progress() {
        let base = Instant::now();
        let mut test = seeded();
        test.begin(base);
        let target = test.current_target().unwrap();
        test.register_click(target.x, target.y, base + ms(10));

        assert!(!test.begin(base + ms(20)));
        assert_eq!(test.hits().len(), 1);
    }

    #[test]
    fn set_area_replaces_targets_only_when_not_running() {
        let mut test = seeded();
        let area = TargetArea::new(100, 50, 10, 5);
        test.set_area(area);
        assert!(test.targets().iter().all(|t| area.contains(t.x, t.y)));

        test.begin(Instant::now());
        let before = test.targets().to_vec();
        test.set_area(TargetArea::new(0, 0, 5, 5));
        assert_eq!(test.targets(), before.as_slice());
        assert_eq!(test.area(), area);
    }

    #[test]
    fn reset_returns_to_idle() {
        let base = Instant::now();
        let mut test = seeded();
        test.begin(base);
        let target = test.current_target().unwrap();
        test.register_click(target.x, target.y, base);
        test.reset();

        assert_eq!(test.state(), PrecisionState::Idle);
        assert!(test.hits().is_empty());
        assert!(test.series().is_empty());
        assert_eq!(test.targets().len(), TARGET_COUNT);
    }

    #[test]
    fn results_show_na_until_finished() {
        let mut test = seeded();
        let results = test.get_results();
        let avg = results.iter().find(|r| r.label == "Avg. Deviation").unwrap();
        assert_eq!(avg.value, "N/A");

        let base = Instant::now();
        test.begin(base);
        for _ in 0..TARGET_COUNT {
            let target = test.current_target().unwrap();
            test.register_click(target.x, target.y, base + ms(100));
        }
        let results = test.get_results();
        let avg = results.iter().find(|r| r.label == "Avg. Deviation").unwrap();
        assert_eq!(avg.value, "0.00 cells");
        assert_eq!(avg.status, ResultStatus::Ok);
    }
}
