//! Interactive query form.
//!
//! Mirrors a small web form in the terminal: a clinic selector, start and end
//! date fields that keep their last value, and a submit confirmation. One
//! submitted form is one query. `q` or end of input closes the session.

use std::io::{self, BufRead, Write};

use strsim::jaro_winkler;
use tracing::warn;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::models::INVALID_DATE_MESSAGE;
use crate::report::{render, OutputFormat};
use crate::scorer::{run_query, QueryError};

pub const TITLE: &str = "CHLA No-Show Appointment Predictor";

const USAGE: &str =
    "Use the prompts below to filter appointments and view predictions. Enter q to quit.";

/// Minimum similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Forms submitted (including ones rejected for bad dates)
    pub submitted: usize,
    /// Queries that produced an outcome
    pub completed: usize,
}

enum Field {
    Value(String),
    Quit,
}

/// A terminal session over any line-oriented input and output.
pub struct Session<'a, R, W> {
    ctx: &'a AppContext,
    input: R,
    output: W,
    format: OutputFormat,
    clinic: usize,
    start: String,
    end: String,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Create a session with field defaults from `config`.
    pub fn new(ctx: &'a AppContext, config: &AppConfig, input: R, output: W) -> Self {
        Self {
            ctx,
            input,
            output,
            format: config.output_format,
            clinic: 0,
            start: config.default_start.clone(),
            end: config.default_end.clone(),
        }
    }

    /// Run until the user quits or input ends.
    pub fn run(&mut self) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        let clinics: Vec<String> = self
            .ctx
            .table()
            .clinics()
            .into_iter()
            .map(str::to_string)
            .collect();

        writeln!(self.output, "{TITLE}")?;
        writeln!(self.output, "{USAGE}")?;

        if clinics.is_empty() {
            writeln!(self.output, "No clinics available in the appointment feed.")?;
            return Ok(summary);
        }

        writeln!(self.output)?;
        writeln!(self.output, "Clinics:")?;
        for (i, clinic) in clinics.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, clinic)?;
        }

        loop {
            writeln!(self.output)?;

            let label = format!("Clinic Name [{}]: ", clinics[self.clinic]);
            let Field::Value(choice) = self.prompt(&label)? else {
                break;
            };
            if !choice.is_empty() {
                match select_clinic(&clinics, &choice) {
                    Ok(idx) => self.clinic = idx,
                    Err(hint) => {
                        writeln!(self.output, "{hint}")?;
                        continue;
                    }
                }
            }

            let label = format!("Start Date (mm/dd/yyyy) [{}]: ", self.start);
            let Field::Value(start) = self.prompt(&label)? else {
                break;
            };
            if !start.is_empty() {
                self.start = start;
            }

            let label = format!("End Date (mm/dd/yyyy) [{}]: ", self.end);
            let Field::Value(end) = self.prompt(&label)? else {
                break;
            };
            if !end.is_empty() {
                self.end = end;
            }

            let Field::Value(submit) = self.prompt("Submit? [Y/n]: ")? else {
                break;
            };
            if submit.eq_ignore_ascii_case("n") || submit.eq_ignore_ascii_case("no") {
                writeln!(self.output, "Query discarded.")?;
                continue;
            }

            summary.submitted += 1;
            let clinic = &clinics[self.clinic];
            match run_query(self.ctx, clinic, &self.start, &self.end) {
                Ok(outcome) => match render(&outcome, self.format) {
                    Ok(text) => {
                        summary.completed += 1;
                        write!(self.output, "{text}")?;
                        if !text.ends_with('\n') {
                            writeln!(self.output)?;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to render outcome");
                        writeln!(self.output, "Error: {e}")?;
                    }
                },
                Err(QueryError::InvalidDate(_)) => {
                    writeln!(self.output, "{INVALID_DATE_MESSAGE}")?;
                }
                Err(e) => {
                    warn!(error = %e, "query failed");
                    writeln!(self.output, "Error: {e}")?;
                }
            }
        }

        writeln!(self.output, "Goodbye.")?;
        Ok(summary)
    }

    fn prompt(&mut self, label: &str) -> io::Result<Field> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(Field::Quit);
        }
        let value = line.trim();
        if value.eq_ignore_ascii_case("q") {
            return Ok(Field::Quit);
        }
        Ok(Field::Value(value.to_string()))
    }
}

/// Resolve a typed clinic choice (list number or exact name).
///
/// On failure returns the message to show, with a closest-name hint when one
/// is similar enough.
pub fn select_clinic(clinics: &[String], choice: &str) -> Result<usize, String> {
    if let Ok(n) = choice.parse::<usize>() {
        if (1..=clinics.len()).contains(&n) {
            return Ok(n - 1);
        }
    }
    if let Some(idx) = clinics.iter().position(|c| c == choice) {
        return Ok(idx);
    }

    let lowered = choice.to_lowercase();
    let best = clinics
        .iter()
        .map(|c| (c, jaro_winkler(&lowered, &c.to_lowercase())))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    Err(match best {
        Some((name, score)) if score >= SUGGESTION_THRESHOLD => {
            format!("Unknown clinic '{choice}'. Did you mean '{name}'?")
        }
        _ => format!("Unknown clinic '{choice}'."),
    })
}
