//! Pointer DPI analyzer
//!
//! Press the left button, move the pointer across a known physical
//! distance, release. The horizontal distance in pointer units divided by
//! the distance in inches gives the effective DPI.

use super::{MeasurementTool, ResultStatus, TestResult};
use crate::input::{get_key_info, InputEvent, InputKind, KeyCode, MouseButton, RawInput};
use thiserror::Error;

const CM_PER_INCH: f64 = 2.54;
const MAX_DISTANCE_CHARS: usize = 8;

/// Reasons a DPI value cannot be computed
#[derive(Debug, Error, PartialEq)]
pub enum DpiError {
    #[error("distance '{0}' is not a number")]
    NotANumber(String),

    #[error("distance must be a positive number of centimetres, got {0}")]
    NonPositive(f64),
}

/// Parse a user-entered distance in centimetres
fn parse_distance(input: &str) -> Result<f64, DpiError> {
    let cm: f64 = input
        .trim()
        .parse()
        .map_err(|_| DpiError::NotANumber(input.to_string()))?;
    if !cm.is_finite() || cm <= 0.0 {
        return Err(DpiError::NonPositive(cm));
    }
    Ok(cm)
}

/// DPI for a pointer travel of `pixels` over `cm` centimetres
pub fn compute_dpi(pixels: u32, cm: f64) -> Result<u32, DpiError> {
    if !cm.is_finite() || cm <= 0.0 {
        return Err(DpiError::NonPositive(cm));
    }
    let inches = cm / CM_PER_INCH;
    Ok((pixels as f64 / inches).round() as u32)
}

/// DPI analyzer controller
pub struct DpiTest {
    distance_input: String,
    start_x: Option<i32>,
    current_x: Option<i32>,
    result: Option<u32>,
    last_error: Option<DpiError>,
}

impl DpiTest {
    pub fn new(default_distance_cm: f64) -> Self {
        Self {
            distance_input: format_distance(default_distance_cm),
            start_x: None,
            current_x: None,
            result: None,
            last_error: None,
        }
    }

    pub fn distance_input(&self) -> &str {
        &self.distance_input
    }

    pub fn set_distance(&mut self, input: impl Into<String>) {
        self.distance_input = input.into();
    }

    /// Apply a key typed into the distance field. Returns `true` if the key
    /// edited the field.
    pub fn edit_distance(&mut self, code: KeyCode) -> bool {
        if code == KeyCode::BACKSPACE {
            return self.distance_input.pop().is_some();
        }
        if self.distance_input.len() >= MAX_DISTANCE_CHARS {
            return false;
        }
        let info = get_key_info(code);
        let ch = match info.code_name {
            "Period" => '.',
            name if name.starts_with("Digit") => match info.label.chars().next() {
                Some(c) => c,
                None => return false,
            },
            _ => return false,
        };
        self.distance_input.push(ch);
        true
    }

    pub fn is_tracking(&self) -> bool {
        self.start_x.is_some()
    }

    /// Horizontal travel since the press
    pub fn pixels_moved(&self) -> u32 {
        match (self.start_x, self.current_x) {
            (Some(start), Some(current)) => current.abs_diff(start),
            _ => 0,
        }
    }

    pub fn result(&self) -> Option<u32> {
        self.result
    }

    pub fn last_error(&self) -> Option<&DpiError> {
        self.last_error.as_ref()
    }

    fn begin(&mut self, x: i32) {
        self.start_x = Some(x);
        self.current_x = Some(x);
        self.last_error = None;
    }

    fn finish(&mut self) {
        if !self.is_tracking() {
            return;
        }
        let pixels = self.pixels_moved();
        self.start_x = None;
        self.current_x = None;

        match parse_distance(&self.distance_input).and_then(|cm| compute_dpi(pixels, cm)) {
            Ok(dpi) => {
                log::info!("measured {} DPI over {} px", dpi, pixels);
                self.result = Some(dpi);
                self.last_error = None;
            }
            Err(e) => {
                log::warn!("DPI not computed: {}", e);
                self.last_error = Some(e);
            }
        }
    }
}

impl Default for DpiTest {
    fn default() -> Self {
        Self::new(10.0)
    }
}

fn format_distance(cm: f64) -> String {
    if cm.fract() == 0.0 {
        format!("{}", cm as i64)
    } else {
        format!("{}", cm)
    }
}

impl MeasurementTool for DpiTest {
    fn name(&self) -> &'static str {
        "DPI Analyzer"
    }

    fn description(&self) -> &'static str {
        "Hold the left button and move the mouse exactly the entered distance"
    }

    fn input_kinds(&self) -> &'static [InputKind] {
        &[InputKind::PointerDown, InputKind::PointerMove, InputKind::PointerUp]
    }

    fn process_event(&mut self, event: &InputEvent) {
        match event.input {
            RawInput::PointerDown { x, button: MouseButton::Left, .. } => self.begin(x),
            RawInput::PointerMove { x, .. } if self.is_tracking() => {
                self.current_x = Some(x);
            }
            RawInput::PointerUp { x, button: MouseButton::Left, .. } if self.is_tracking() => {
                self.current_x = Some(x);
                self.finish();
            }
            _ => {}
        }
    }

    fn get_results(&self) -> Vec<TestResult> {
        let mut results = Vec::new();

        results.push(TestResult::info(
            "Distance",
            format!("{} cm", self.distance_input),
        ));

        let state = if self.is_tracking() {
            "Tracking"
        } else {
            "Press and drag"
        };
        results.push(TestResult::info("State", state));
        results.push(TestResult::info(
            "Moved",
            format!("{} px", self.pixels_moved()),
        ));

        match self.result {
            Some(dpi) => results.push(TestResult::ok("DPI", format!("{}", dpi))),
            None => results.push(TestResult::info("DPI", "-")),
        }

        if let Some(err) = &self.last_error {
            results.push(TestResult::new("Error", err.to_string(), ResultStatus::Error));
        }

        results
    }

    fn reset(&mut self) {
        self.start_x = None;
        self.current_x = None;
        self.result = None;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn pointer(input: RawInput) -> InputEvent {
        InputEvent::new(input, Instant::now())
    }

    fn drag(test: &mut DpiTest, from: i32, to: i32) {
        test.process_event(&pointer(RawInput::PointerDown {
            x: from,
            y: 0,
            button: MouseButton::Left,
        }));
        test.process_event(&pointer(RawInput::PointerMove { x: (from + to) / 2, y: 0 }));
        test.process_event(&pointer(RawInput::PointerUp {
            x: to,
            y: 0,
            button: MouseButton::Left,
        }));
    }

    #[test]
    fn compute_dpi_converts_centimetres() {
        assert_eq!(compute_dpi(800, 2.54), Ok(800));
        assert_eq!(compute_dpi(3150, 10.0), Ok(800));
        assert_eq!(compute_dpi(0, 10.0), Ok(0));
    }

    #[test]
    fn compute_dpi_rejects_degenerate_distance() {
        assert_eq!(compute_dpi(100, 0.0), Err(DpiError::NonPositive(0.0)));
        assert!(compute_dpi(100, -1.0).is_err());
        assert!(compute_dpi(100, f64::NAN).is_err());
    }

    #[test]
    fn drag_computes_dpi_from_horizontal_travel() {
        let mut test = DpiTest::new(2.54);
        drag(&mut test, 900, 100);
        assert_eq!(test.result(), Some(800));
        assert!(!test.is_tracking());
    }

    #[test]
    fn invalid_distance_keeps_prior_result() {
        let mut test = DpiTest::new(2.54);
        drag(&mut test, 0, 400);
        assert_eq!(test.result(), Some(400));

        test.set_distance("abc");
        drag(&mut test, 0, 800);
        assert_eq!(test.result(), Some(400));
        assert_eq!(test.last_error(), Some(&DpiError::NotANumber("abc".into())));

        test.set_distance("0");
        drag(&mut test, 0, 800);
        assert_eq!(test.result(), Some(400));
        assert_eq!(test.last_error(), Some(&DpiError::NonPositive(0.0)));
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut test = DpiTest::default();
        test.process_event(&pointer(RawInput::PointerMove { x: 50, y: 0 }));
        assert_eq!(test.pixels_moved(), 0);
        assert!(!test.is_tracking());
    }

    #[test]
    fn edits_distance_field() {
        let mut test = DpiTest::new(10.0);
        assert_eq!(test.distance_input(), "10");

        assert!(test.edit_distance(KeyCode::BACKSPACE));
        assert!(test.edit_distance(KeyCode(52)));
        assert!(test.edit_distance(KeyCode(6)));
        assert_eq!(test.distance_input(), "1.5");

        // Letters do not edit the field
        assert!(!test.edit_distance(KeyCode(30)));
        assert_eq!(test.distance_input(), "1.5");
    }

    #[test]
    fn fractional_default_distance_is_shown_as_is() {
        assert_eq!(DpiTest::new(7.5).distance_input(), "7.5");
    }

    #[test]
    fn reset_clears_result() {
        let mut test = DpiTest::new(2.54);
        drag(&mut test, 0, 400);
        test.reset();
        assert_eq!(test.result(), None);
        assert_eq!(test.distance_input(), "2.54");
    }
}
