//! Main application state and logic
//!
//! The app hosts one measurement tool at a time. Switching views unmounts
//! the old tool (dropping its subscription and cancelling its timers) and
//! mounts the new one with a fresh subscription, so exactly one tool is
//! ever subscribed to input.

use crate::config::Config;
use crate::input::{EventBus, KeyDisposition, RawInput, Subscription};
use crate::report::{entries, SessionReport, SessionSummary, ToolResults};
use crate::tools::{
    ClickSpeedTest, DpiTest, MeasurementTool, PollingRateTest, PrecisionState, PrecisionTest,
    ReactionTest, RolloverTest, TargetArea, TestResult, TypingState, TypingTest,
};
use crossterm::event::KeyCode as TermKey;
use std::path::Path;
use std::time::Instant;

/// Current view/tab in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Polling,
    Clicks,
    Reaction,
    Precision,
    Rollover,
    Typing,
    Dpi,
    Help,
}

impl AppView {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Polling => "Polling",
            Self::Clicks => "CPS",
            Self::Reaction => "Reaction",
            Self::Precision => "Precision",
            Self::Rollover => "NKRO",
            Self::Typing => "Typing",
            Self::Dpi => "DPI",
            Self::Help => "Help",
        }
    }

    pub fn all() -> &'static [AppView] {
        &[
            Self::Polling,
            Self::Clicks,
            Self::Reaction,
            Self::Precision,
            Self::Rollover,
            Self::Typing,
            Self::Dpi,
            Self::Help,
        ]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::all().get(index).copied().unwrap_or(Self::Help)
    }
}

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Quitting,
}

/// Host commands bound to function keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Start,
    PrevView,
    NextView,
    Reset,
    TogglePause,
    ClearKeys,
    Export,
    Quit,
}

impl Command {
    /// Command bound to a terminal key. Bound keys are never forwarded to
    /// the tools.
    pub fn from_key(key: TermKey) -> Option<Self> {
        let command = match key {
            TermKey::F(1) => Self::Help,
            TermKey::F(2) => Self::Start,
            TermKey::F(3) => Self::PrevView,
            TermKey::F(4) => Self::NextView,
            TermKey::F(5) => Self::Reset,
            TermKey::F(6) => Self::TogglePause,
            TermKey::F(7) => Self::ClearKeys,
            TermKey::F(8) => Self::Export,
            TermKey::Esc => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Data for the chart of the current view
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<(f64, f64)>,
}

/// Main application
pub struct App {
    /// Current view
    pub view: AppView,
    /// Application state
    pub state: AppState,
    /// Configuration
    pub config: Config,
    pub polling_test: PollingRateTest,
    pub click_test: ClickSpeedTest,
    pub reaction_test: ReactionTest,
    pub precision_test: PrecisionTest,
    pub rollover_test: RolloverTest,
    pub typing_test: TypingTest,
    pub dpi_test: DpiTest,
    bus: EventBus,
    /// Subscription of the mounted tool
    subscription: Option<Subscription>,
    /// Application start time
    pub start_time: Instant,
    /// Events delivered to tools
    pub total_events: u64,
    status_message: Option<String>,
    status_time: Option<Instant>,
}

impl App {
    pub fn new(config: Config, now: Instant) -> Self {
        let dpi_test = DpiTest::new(config.dpi.default_distance_cm);
        let mut app = Self {
            view: AppView::Help,
            state: AppState::Running,
            config,
            polling_test: PollingRateTest::new(),
            click_test: ClickSpeedTest::new(),
            reaction_test: ReactionTest::new(),
            precision_test: PrecisionTest::new(),
            rollover_test: RolloverTest::new(),
            typing_test: TypingTest::new(),
            dpi_test,
            bus: EventBus::new(),
            subscription: None,
            start_time: now,
            total_events: 0,
            status_message: None,
            status_time: None,
        };
        app.set_view(AppView::Polling, now);
        app
    }

    fn tool(&self, view: AppView) -> Option<&dyn MeasurementTool> {
        match view {
            AppView::Polling => Some(&self.polling_test),
            AppView::Clicks => Some(&self.click_test),
            AppView::Reaction => Some(&self.reaction_test),
            AppView::Precision => Some(&self.precision_test),
            AppView::Rollover => Some(&self.rollover_test),
            AppView::Typing => Some(&self.typing_test),
            AppView::Dpi => Some(&self.dpi_test),
            AppView::Help => None,
        }
    }

    fn tool_mut(&mut self, view: AppView) -> Option<&mut dyn MeasurementTool> {
        match view {
            AppView::Polling => Some(&mut self.polling_test),
            AppView::Clicks => Some(&mut self.click_test),
            AppView::Reaction => Some(&mut self.reaction_test),
            AppView::Precision => Some(&mut self.precision_test),
            AppView::Rollover => Some(&mut self.rollover_test),
            AppView::Typing => Some(&mut self.typing_test),
            AppView::Dpi => Some(&mut self.dpi_test),
            AppView::Help => None,
        }
    }

    /// The mounted tool, if the view has one
    pub fn current_tool(&self) -> Option<&dyn MeasurementTool> {
        self.tool(self.view)
    }

    /// Number of live input subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Unmount the current tool and mount the one behind `view`
    pub fn set_view(&mut self, view: AppView, now: Instant) {
        if view == self.view && (self.subscription.is_some() || view == AppView::Help) {
            return;
        }

        // Release the subscription before the tool tears down
        self.subscription = None;
        let old = self.view;
        if let Some(tool) = self.tool_mut(old) {
            tool.unmount();
        }

        self.view = view;
        let kinds = self.tool_mut(view).map(|tool| {
            tool.mount(now);
            tool.input_kinds()
        });
        if let Some(kinds) = kinds {
            self.subscription = Some(self.bus.subscribe(kinds));
        }
        log::debug!("view {} -> {}", old.name(), view.name());
    }

    /// Switch to the next view
    pub fn next_view(&mut self, now: Instant) {
        let next = (self.view.index() + 1) % AppView::all().len();
        self.set_view(AppView::from_index(next), now);
    }

    /// Switch to the previous view
    pub fn prev_view(&mut self, now: Instant) {
        let current = self.view.index();
        let prev = if current == 0 {
            AppView::all().len() - 1
        } else {
            current - 1
        };
        self.set_view(AppView::from_index(prev), now);
    }

    /// Whether keyboard focus is on an editable field
    pub fn target_editable(&self) -> bool {
        matches!(self.view, AppView::Dpi | AppView::Typing)
    }

    /// Place precision targets inside `area`, in terminal cells
    pub fn set_target_area(&mut self, area: TargetArea) {
        self.precision_test.set_area(area);
    }

    /// Route one raw input through the bus to the mounted tool.
    ///
    /// Returns whether the key's native action (navigation, typing) should
    /// still happen. Typing into the DPI distance field is applied here.
    pub fn handle_input(&mut self, input: RawInput, now: Instant) -> KeyDisposition {
        if self.state != AppState::Running {
            return KeyDisposition::PassThrough;
        }

        let editable = self.target_editable();
        let dispatch = self.bus.dispatch(input, now, editable);

        let events = self
            .subscription
            .as_ref()
            .map(Subscription::drain)
            .unwrap_or_default();
        self.total_events += events.len() as u64;
        let view = self.view;
        if let Some(tool) = self.tool_mut(view) {
            for event in &events {
                tool.process_event(event);
            }
        }

        if view == AppView::Dpi && dispatch.disposition == KeyDisposition::PassThrough {
            if let RawInput::KeyDown { code, .. } = input {
                self.dpi_test.edit_distance(code);
            }
        }

        self.collect_notice();
        dispatch.disposition
    }

    /// Advance the mounted tool's timers
    pub fn tick(&mut self, now: Instant) {
        let view = self.view;
        if let Some(tool) = self.tool_mut(view) {
            tool.tick(now);
        }
        self.collect_notice();
    }

    fn collect_notice(&mut self) {
        let view = self.view;
        if let Some(notice) = self.tool_mut(view).and_then(|tool| tool.take_notice()) {
            self.set_status(notice);
        }
    }

    /// Run a host command
    pub fn execute(&mut self, command: Command, now: Instant) {
        match command {
            Command::Help => self.set_view(AppView::Help, now),
            Command::Start => self.start_current(now),
            Command::PrevView => self.prev_view(now),
            Command::NextView => self.next_view(now),
            Command::Reset => self.reset_current(),
            Command::TogglePause => {
                if self.view == AppView::Polling {
                    self.polling_test.toggle(now);
                    self.set_status(format!("Polling test {:?}", self.polling_test.state()));
                }
            }
            Command::ClearKeys => {
                if self.view == AppView::Rollover {
                    self.rollover_test.reset_visuals();
                    self.set_status("Held keys cleared");
                }
            }
            Command::Export => {
                let filename = format!(
                    "rig_report_{}.json",
                    chrono::Utc::now().format("%Y%m%d_%H%M%S")
                );
                if let Err(e) = self.export_report(&filename, now) {
                    log::warn!("report export failed: {}", e);
                    self.set_status(format!("Export failed: {}", e));
                }
            }
            Command::Quit => self.quit(),
        }
    }

    /// Start (or toggle) the mounted tool
    pub fn start_current(&mut self, now: Instant) {
        let view = self.view;
        if let Some(tool) = self.tool_mut(view) {
            tool.start(now);
        }
        self.collect_notice();
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Reset the mounted tool
    pub fn reset_current(&mut self) {
        let view = self.view;
        if let Some(tool) = self.tool_mut(view) {
            tool.reset();
            let name = tool.name();
            self.set_status(format!("{} reset", name));
        }
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Get status message if still within the configured duration
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed() < self.config.status_duration() => Some(msg),
            _ => None,
        }
    }

    /// Get results for current view
    pub fn current_results(&self) -> Vec<TestResult> {
        self.current_tool()
            .map(|tool| tool.get_results())
            .unwrap_or_default()
    }

    /// Chart for the current view
    pub fn chart(&self) -> Option<ChartData> {
        let chart = match self.view {
            AppView::Polling => ChartData {
                title: "Polling Rate",
                x_label: "s",
                y_label: "Hz",
                points: self.polling_test.series().xy(),
            },
            AppView::Clicks => ChartData {
                title: "Clicks per Second",
                x_label: "s",
                y_label: "CPS",
                points: self.click_test.session().series.xy(),
            },
            AppView::Reaction => ChartData {
                title: "Reaction Time",
                x_label: "attempt",
                y_label: "ms",
                points: self.reaction_test.series().xy(),
            },
            AppView::Precision if self.precision_test.state() == PrecisionState::Finished => {
                ChartData {
                    title: "Deviation per Click",
                    x_label: "click",
                    y_label: "cells",
                    points: self.precision_test.series().xy(),
                }
            }
            _ => return None,
        };
        Some(chart)
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self, now: Instant) -> String {
        let secs = now.saturating_duration_since(self.start_time).as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Generate a session report
    pub fn generate_report(&self, now: Instant) -> SessionReport {
        let summary = SessionSummary {
            total_events: self.total_events,
            max_polling_rate_hz: self.polling_test.snapshot().max,
            best_cps: self.click_test.best_cps(),
            reaction_average_ms: self.reaction_test.timer().stats().map(|s| s.average_ms),
            max_rollover: self.rollover_test.max_observed(),
            dpi: self.dpi_test.result(),
            precision_avg_deviation: self.precision_test.stats().map(|s| s.average_deviation),
            typing_wpm: (self.typing_test.state() == TypingState::Finished)
                .then(|| self.typing_test.stats().wpm),
            issues_detected: 0,
        };
        let tests = ToolResults {
            polling: entries(&self.polling_test.get_results()),
            clicks: entries(&self.click_test.get_results()),
            reaction: entries(&self.reaction_test.get_results()),
            rollover: entries(&self.rollover_test.get_results()),
            dpi: entries(&self.dpi_test.get_results()),
            precision: entries(&self.precision_test.get_results()),
            typing: entries(&self.typing_test.get_results()),
        };
        SessionReport::new(now.saturating_duration_since(self.start_time), summary, tests)
    }

    /// Export session report to JSON file
    pub fn export_report(&mut self, filename: &str, now: Instant) -> Result<String, std::io::Error> {
        let report = self.generate_report(now);
        report.export_json(Path::new(filename))?;
        let msg = format!("Exported to {}", filename);
        log::info!("{}", msg);
        self.set_status(msg.clone());
        Ok(msg)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default(), Instant::now())
    }
}
