//! Rendering of query outcomes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ScoredAppointment;
use crate::scorer::QueryOutcome;

/// Report errors.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

const HEADERS: [&str; 6] = ["MRN", "APPT_ID", "Date", "Time", "No Show", "Prob"];

/// Output surface for results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Comma-separated values
    Csv,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Render an outcome for display.
pub fn render(outcome: &QueryOutcome, format: OutputFormat) -> ReportResult<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(outcome)?);
    }

    if let Some(message) = outcome.no_appointments_message() {
        return Ok(format!("{message}\n"));
    }

    let QueryOutcome::Scored {
        clinic,
        appointments,
        ..
    } = outcome
    else {
        return Ok(String::new());
    };

    Ok(match format {
        OutputFormat::Csv => to_csv(appointments),
        _ => format!(
            "Predicted No-Show Appointments for {}:\n{}",
            clinic,
            to_table(appointments)
        ),
    })
}

fn cells(appt: &ScoredAppointment) -> [String; 6] {
    [
        appt.mrn.clone(),
        appt.appt_id.clone(),
        appt.date.format("%Y-%m-%d").to_string(),
        appt.time.format("%H:%M:%S").to_string(),
        appt.label.code().to_string(),
        format!("{:.4}", appt.probability),
    ]
}

/// Aligned plain-text table.
pub fn to_table(appointments: &[ScoredAppointment]) -> String {
    let rows: Vec<[String; 6]> = appointments.iter().map(cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}", w = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// CSV with a header row.
pub fn to_csv(appointments: &[ScoredAppointment]) -> String {
    let mut csv = HEADERS.join(",");
    csv.push('\n');
    for appt in appointments {
        let line: Vec<String> = cells(appt).iter().map(|c| escape_csv(c)).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }
    csv
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
