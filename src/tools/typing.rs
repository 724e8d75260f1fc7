//! Typing speed test
//!
//! The first typed character starts the clock. Speed counts only characters
//! that match the prompt at their position (five characters per word), and
//! the run ends once the typed text is as long as the prompt.

use super::{MeasurementTool, ResultStatus, TestResult};
use crate::input::{InputEvent, InputKind, KeyCode, RawInput};
use crate::timer::Interval;
use crate::utils::{round_u32, safe_ratio};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Prompts a run picks from
pub const PROMPTS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog.",
    "Pack my box with five dozen liquor jugs before the movers arrive.",
    "A steady rhythm beats frantic bursts when you want clean keystrokes.",
    "Mechanical switches register a press long before the key bottoms out.",
    "Measure twice and cut once, then check the measurement again anyway.",
];

const CHARS_PER_WORD: f64 = 5.0;
const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Lifecycle of a typing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Idle,
    Running,
    Finished,
}

/// Speed and accuracy of the text typed so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypingStats {
    pub elapsed_secs: f64,
    pub wpm: u32,
    pub cpm: u32,
    /// Percentage of typed characters that match the prompt
    pub accuracy: f64,
    pub errors: usize,
    pub correct_chars: usize,
}

/// Score `typed` against `prompt` after `elapsed`
pub fn typing_stats(prompt: &str, typed: &str, elapsed: Duration) -> TypingStats {
    let typed_len = typed.chars().count();
    let correct_chars = prompt
        .chars()
        .zip(typed.chars())
        .filter(|(want, got)| want == got)
        .count();
    let minutes = elapsed.as_secs_f64() / 60.0;

    TypingStats {
        elapsed_secs: elapsed.as_secs_f64(),
        wpm: round_u32(safe_ratio(correct_chars as f64 / CHARS_PER_WORD, minutes)),
        cpm: round_u32(safe_ratio(correct_chars as f64, minutes)),
        accuracy: safe_ratio(correct_chars as f64 * 100.0, typed_len as f64),
        errors: typed_len - correct_chars,
        correct_chars,
    }
}

/// Typing speed test controller
pub struct TypingTest {
    prompt: &'static str,
    typed: String,
    state: TypingState,
    started_at: Option<Instant>,
    stats: TypingStats,
    clock: Interval,
    rng: StdRng,
    notice: Option<String>,
}

impl TypingTest {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Use a specific random source for prompt selection
    pub fn with_rng(mut rng: StdRng) -> Self {
        let prompt = Self::pick_prompt(&mut rng);
        Self {
            prompt,
            typed: String::new(),
            state: TypingState::Idle,
            started_at: None,
            stats: TypingStats::default(),
            clock: Interval::new(CLOCK_PERIOD),
            rng,
            notice: None,
        }
    }

    fn pick_prompt(rng: &mut StdRng) -> &'static str {
        PROMPTS[rng.gen_range(0..PROMPTS.len())]
    }

    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn state(&self) -> TypingState {
        self.state
    }

    pub fn stats(&self) -> TypingStats {
        self.stats
    }

    /// Append one character. The first character starts the run; nothing
    /// is accepted once the run has finished.
    pub fn type_char(&mut self, ch: char, now: Instant) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.state {
            TypingState::Finished => return false,
            TypingState::Idle => {
                self.state = TypingState::Running;
                self.started_at = Some(now);
                self.clock.start(now);
                log::debug!("typing test started");
            }
            TypingState::Running => {}
        }

        self.typed.push(ch);
        if self.typed.chars().count() >= self.prompt.chars().count() {
            self.finish(now);
        } else {
            self.refresh(now);
        }
        true
    }

    /// Remove the last typed character while running
    pub fn backspace(&mut self, now: Instant) -> bool {
        if self.state != TypingState::Running || self.typed.pop().is_none() {
            return false;
        }
        self.refresh(now);
        true
    }

    fn refresh(&mut self, now: Instant) {
        let elapsed = self
            .started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        self.stats = typing_stats(self.prompt, &self.typed, elapsed);
    }

    fn finish(&mut self, now: Instant) {
        self.refresh(now);
        self.state = TypingState::Finished;
        self.clock.stop();
        log::info!(
            "typing test complete: {} WPM, {:.1}% accuracy",
            self.stats.wpm,
            self.stats.accuracy
        );
        self.notice = Some(format!(
            "Test Complete: {} WPM at {:.1}% accuracy",
            self.stats.wpm, self.stats.accuracy
        ));
    }

    fn speed_status(wpm: u32) -> ResultStatus {
        if wpm >= 60 {
            ResultStatus::Ok
        } else if wpm >= 30 {
            ResultStatus::Warning
        } else {
            ResultStatus::Info
        }
    }
}

impl Default for TypingTest {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementTool for TypingTest {
    fn name(&self) -> &'static str {
        "Typing Speed Test"
    }

    fn description(&self) -> &'static str {
        "Type the prompt as quickly and accurately as you can"
    }

    fn input_kinds(&self) -> &'static [InputKind] {
        &[InputKind::Text, InputKind::KeyDown]
    }

    fn process_event(&mut self, event: &InputEvent) {
        match event.input {
            RawInput::Text { ch } => {
                self.tick(event.timestamp);
                self.type_char(ch, event.timestamp);
            }
            RawInput::KeyDown { code: KeyCode::BACKSPACE, .. } => {
                self.backspace(event.timestamp);
            }
            _ => {}
        }
    }

    fn tick(&mut self, now: Instant) {
        while let Some(due) = self.clock.poll(now) {
            self.refresh(due);
        }
    }

    /// Restart with a new prompt
    fn start(&mut self, _now: Instant) {
        self.reset();
    }

    fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    fn get_results(&self) -> Vec<TestResult> {
        let stats = self.stats;
        let state = match self.state {
            TypingState::Idle => "Start typing",
            TypingState::Running => "Typing",
            TypingState::Finished => "Finished",
        };
        let accuracy_status = if self.typed.is_empty() {
            ResultStatus::Info
        } else if stats.accuracy >= 95.0 {
            ResultStatus::Ok
        } else if stats.accuracy >= 85.0 {
            ResultStatus::Warning
        } else {
            ResultStatus::Error
        };

        vec![
            TestResult::info("State", state),
            TestResult::info("Time", format!("{:.1}s", stats.elapsed_secs)),
            TestResult::new("WPM", format!("{}", stats.wpm), Self::speed_status(stats.wpm)),
            TestResult::info("CPM", format!("{}", stats.cpm)),
            TestResult::new("Accuracy", format!("{:.1}%", stats.accuracy), accuracy_status),
            TestResult::info("Errors", format!("{}", stats.errors)),
        ]
    }

    fn reset(&mut self) {
        self.clock.stop();
        self.typed.clear();
        self.state = TypingState::Idle;
        self.started_at = None;
        self.stats = TypingStats::default();
        self.notice = None;
        self.prompt = Self::pick_prompt(&mut self.rng);
    }
}
