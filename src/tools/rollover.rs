//! N-Key Rollover tracker
//!
//! Keeps the set of physically held keys from key-down/key-up pairs and the
//! largest number held at once. A key-up lost by the host (focus change,
//! keys eaten by the OS) leaves that key stuck in the set; `reset_visuals`
//! is the recovery path and keeps the peak.

use super::{MeasurementTool, ResultStatus, TestResult};
use crate::input::{get_key_info, InputEvent, InputKind, KeyCode, RawInput};
use std::collections::BTreeSet;

/// Simultaneous keys at which a board counts as NKRO
pub const NKRO_THRESHOLD: usize = 10;

/// Human label for a rollover count
pub fn rollover_label(count: usize) -> String {
    match count {
        0 => "No keys pressed".to_string(),
        n if n >= NKRO_THRESHOLD => "NKRO detected".to_string(),
        n => format!("{}-key rollover", n),
    }
}

/// Test for N-Key Rollover
pub struct RolloverTest {
    /// Currently pressed keys
    pressed_keys: BTreeSet<KeyCode>,
    /// Maximum simultaneous keys achieved
    max_simultaneous: usize,
    /// Most recent newly pressed key
    last_key: Option<KeyCode>,
    /// Total key events processed
    total_events: u64,
}

impl RolloverTest {
    pub fn new() -> Self {
        Self {
            pressed_keys: BTreeSet::new(),
            max_simultaneous: 0,
            last_key: None,
            total_events: 0,
        }
    }

    /// Record a key press. Repeats of a key already held do not count as a
    /// new press.
    pub fn on_key_down(&mut self, code: KeyCode) {
        if self.pressed_keys.insert(code) {
            self.last_key = Some(code);
        }
        self.max_simultaneous = self.max_simultaneous.max(self.pressed_keys.len());
    }

    /// Record a key release; releasing a key that is not held is a no-op
    pub fn on_key_up(&mut self, code: KeyCode) {
        self.pressed_keys.remove(&code);
    }

    /// Currently held keys in key code order
    pub fn current_pressed(&self) -> Vec<KeyCode> {
        self.pressed_keys.iter().copied().collect()
    }

    pub fn current_count(&self) -> usize {
        self.pressed_keys.len()
    }

    /// Maximum simultaneous keys since reset
    pub fn max_observed(&self) -> usize {
        self.max_simultaneous
    }

    pub fn last_key(&self) -> Option<KeyCode> {
        self.last_key
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    /// Forget held keys (e.g. after a lost key-up) but keep the peak
    pub fn reset_visuals(&mut self) {
        if !self.pressed_keys.is_empty() {
            log::debug!("clearing {} held keys", self.pressed_keys.len());
        }
        self.pressed_keys.clear();
    }
}

impl Default for RolloverTest {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementTool for RolloverTest {
    fn name(&self) -> &'static str {
        "N-Key Rollover Test"
    }

    fn description(&self) -> &'static str {
        "Hold down as many keys as you can at once"
    }

    fn input_kinds(&self) -> &'static [InputKind] {
        &[InputKind::KeyDown, InputKind::KeyUp]
    }

    fn process_event(&mut self, event: &InputEvent) {
        match event.input {
            RawInput::KeyDown { code, .. } => {
                self.total_events += 1;
                self.on_key_down(code);
            }
            RawInput::KeyUp { code } => {
                self.total_events += 1;
                self.on_key_up(code);
            }
            _ => {}
        }
    }

    fn get_results(&self) -> Vec<TestResult> {
        let mut results = Vec::new();

        results.push(TestResult::info(
            "Currently Pressed",
            format!("{} keys", self.current_count()),
        ));

        let status = match self.max_simultaneous {
            0 => ResultStatus::Info,
            1..=2 => ResultStatus::Error,
            3..=5 => ResultStatus::Warning,
            _ => ResultStatus::Ok,
        };
        results.push(TestResult::new(
            "Max Rollover",
            rollover_label(self.max_simultaneous),
            status,
        ));

        if let Some(code) = self.last_key {
            let info = get_key_info(code);
            results.push(TestResult::info(
                "Last Key",
                format!("{} ({})", info.label, info.code_name),
            ));
        }

        if !self.pressed_keys.is_empty() {
            let key_names: Vec<&str> = self
                .pressed_keys
                .iter()
                .map(|k| get_key_info(*k).label)
                .collect();
            results.push(TestResult::info("Active Keys", key_names.join(" + ")));
        }

        results.push(TestResult::info(
            "Total Events",
            format!("{}", self.total_events),
        ));

        results
    }

    fn reset(&mut self) {
        self.pressed_keys.clear();
        self.max_simultaneous = 0;
        self.last_key = None;
        self.total_events = 0;
    }
}
