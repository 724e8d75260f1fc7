//! Session report and export functionality

use crate::tools::{ResultStatus, TestResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary statistics
    pub summary: SessionSummary,
    /// Result rows by tool
    pub tests: ToolResults,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
}

/// Session summary statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Input events delivered to the tools
    pub total_events: u64,
    /// Highest polling rate seen in the current polling run
    pub max_polling_rate_hz: u32,
    /// Best click-speed score of the session
    pub best_cps: f64,
    /// Average reaction time, if any trial was recorded
    pub reaction_average_ms: Option<f64>,
    /// Maximum simultaneous keys pressed
    pub max_rollover: usize,
    /// Last DPI measurement
    pub dpi: Option<u32>,
    /// Average click deviation of a finished precision run
    pub precision_avg_deviation: Option<f64>,
    /// Words per minute of a finished typing run
    pub typing_wpm: Option<u32>,
    /// Number of warning and error rows
    pub issues_detected: u32,
}

/// Result rows of every tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolResults {
    pub polling: Vec<ResultEntry>,
    pub clicks: Vec<ResultEntry>,
    pub reaction: Vec<ResultEntry>,
    pub rollover: Vec<ResultEntry>,
    pub dpi: Vec<ResultEntry>,
    pub precision: Vec<ResultEntry>,
    pub typing: Vec<ResultEntry>,
}

impl ToolResults {
    fn all(&self) -> impl Iterator<Item = &ResultEntry> {
        self.polling
            .iter()
            .chain(&self.clicks)
            .chain(&self.reaction)
            .chain(&self.rollover)
            .chain(&self.dpi)
            .chain(&self.precision)
            .chain(&self.typing)
    }
}

/// Single result entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub label: String,
    pub value: String,
    pub status: String,
}

impl ResultEntry {
    fn is_issue(&self) -> bool {
        self.status == "warning" || self.status == "error"
    }
}

impl From<&TestResult> for ResultEntry {
    fn from(result: &TestResult) -> Self {
        let status = match result.status {
            ResultStatus::Ok => "ok",
            ResultStatus::Warning => "warning",
            ResultStatus::Error => "error",
            ResultStatus::Info => "info",
        };
        Self {
            label: result.label.clone(),
            value: result.value.clone(),
            status: status.to_string(),
        }
    }
}

/// Convert a tool's rows for the report
pub fn entries(results: &[TestResult]) -> Vec<ResultEntry> {
    results.iter().map(ResultEntry::from).collect()
}

impl SessionReport {
    /// Create a report; `issues_detected` is counted from the result rows
    pub fn new(duration: Duration, mut summary: SessionSummary, tests: ToolResults) -> Self {
        let now: DateTime<Utc> = Utc::now();
        summary.issues_detected = tests.all().filter(|e| e.is_issue()).count() as u32;

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs: duration.as_secs_f64(),
            },
            summary,
            tests,
        }
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
