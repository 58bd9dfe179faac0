// crates/augur-cli/src/output.rs
//
// Output formatting utilities for the augur CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

use augur_core::{Score, ScoreKind};

use crate::runner::{RoundReport, RoundStatus};

/// Output format for CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// One stored score as a table row.
#[derive(Debug, Tabled)]
pub struct ScoreRow {
    #[tabled(rename = "Kind")]
    pub kind: ScoreKind,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Score")]
    pub score: String,
}

impl ScoreRow {
    pub fn new(kind: ScoreKind, score: &Score) -> Self {
        Self {
            kind,
            address: score.address.to_string(),
            score: format!("{:.6}", score.score),
        }
    }
}

/// One stored score in JSON output, tagged with the table it came from.
#[derive(Debug, Serialize)]
pub struct ScoreRecord<'a> {
    pub kind: ScoreKind,
    #[serde(flatten)]
    pub score: &'a Score,
}

/// One round report as a table row.
#[derive(Debug, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "Round")]
    pub label: String,
    #[tabled(rename = "Topic")]
    pub topic_id: u64,
    #[tabled(rename = "Block")]
    pub block_height: i64,
    #[tabled(rename = "Result")]
    pub result: String,
}

impl From<&RoundReport> for ReportRow {
    fn from(report: &RoundReport) -> Self {
        let result = match &report.status {
            RoundStatus::Scored {
                reputers,
                inferers,
                forecasters,
                excluded,
            } => format!(
                "scored: {} reputers ({} excluded), {} inferers, {} forecasters",
                reputers, excluded, inferers, forecasters
            ),
            RoundStatus::Unscored { reason } => format!("UNSCORED: {}", reason),
        };
        Self {
            label: report.label.clone(),
            topic_id: report.topic_id,
            block_height: report.block_height,
            result,
        }
    }
}
