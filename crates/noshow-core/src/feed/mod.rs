//! Appointment feed loading.
//!
//! The feed is a headed CSV file read once at startup. Loading is fail-fast:
//! any row with a bad APPT_DATE aborts the load instead of being dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{parse_feed_timestamp, AppointmentRecord, AppointmentTable};

pub const CLINIC_COLUMN: &str = "CLINIC";
pub const APPT_DATE_COLUMN: &str = "APPT_DATE";
pub const MRN_COLUMN: &str = "MRN";
pub const APPT_ID_COLUMN: &str = "APPT_ID";

/// Feed errors.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid APPT_DATE {value:?} on line {line}")]
    InvalidTimestamp { line: u64, value: String },
}

pub type FeedResult<T> = Result<T, FeedError>;

/// Column positions of the fields the scorer needs.
struct RequiredColumns {
    clinic: usize,
    appt_date: usize,
    mrn: usize,
    appt_id: usize,
}

impl RequiredColumns {
    fn locate(headers: &[String]) -> FeedResult<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(FeedError::MissingColumn(name))
        };
        Ok(Self {
            clinic: find(CLINIC_COLUMN)?,
            appt_date: find(APPT_DATE_COLUMN)?,
            mrn: find(MRN_COLUMN)?,
            appt_id: find(APPT_ID_COLUMN)?,
        })
    }
}

/// Load the feed from a CSV file.
pub fn load_feed<P: AsRef<Path>>(path: P) -> FeedResult<AppointmentTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = read_feed(file)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        clinics = table.clinics().len(),
        "appointment feed loaded"
    );
    Ok(table)
}

/// Read the feed from any CSV source.
pub fn read_feed<R: Read>(reader: R) -> FeedResult<AppointmentTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let required = RequiredColumns::locate(&columns)?;
    debug!(columns = columns.len(), "feed header parsed");

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let raw_date = &row[required.appt_date];
        let appt_date =
            parse_feed_timestamp(raw_date).ok_or_else(|| FeedError::InvalidTimestamp {
                line,
                value: raw_date.to_string(),
            })?;

        records.push(AppointmentRecord::new(
            &row[required.mrn],
            &row[required.appt_id],
            &row[required.clinic],
            appt_date,
            row.iter().map(str::to_string).collect(),
        ));
    }

    Ok(AppointmentTable::new(columns, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FEED: &str = "\
MRN,APPT_ID,CLINIC,APPT_DATE,LEAD_TIME
100,A1,ORTHO,1/5/24 9:30,14
101,A2,CARDIO,1/15/24 13:00,3
102,A3,ORTHO,2/1/24 8:15,
";

    #[test]
    fn test_read_feed() {
        let table = read_feed(FEED.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.columns(),
            &["MRN", "APPT_ID", "CLINIC", "APPT_DATE", "LEAD_TIME"]
        );

        let first = &table.records()[0];
        assert_eq!(first.mrn, "100");
        assert_eq!(first.appt_id, "A1");
        assert_eq!(first.clinic, "ORTHO");
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(first.values[4], "14");
        assert_eq!(table.records()[2].values[4], "");
    }

    #[test]
    fn test_missing_required_column() {
        let feed = "MRN,APPT_ID,APPT_DATE\n1,A1,1/5/24 9:30\n";
        let err = read_feed(feed.as_bytes()).unwrap_err();
        assert!(matches!(err, FeedError::MissingColumn("CLINIC")));
    }

    #[test]
    fn test_bad_timestamp_fails_whole_load() {
        let feed = "MRN,APPT_ID,CLINIC,APPT_DATE\n1,A1,ORTHO,1/5/24 9:30\n2,A2,ORTHO,tomorrow\n";
        let err = read_feed(feed.as_bytes()).unwrap_err();
        match err {
            FeedError::InvalidTimestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "tomorrow");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ragged_row_is_error() {
        let feed = "MRN,APPT_ID,CLINIC,APPT_DATE\n1,A1,ORTHO\n";
        let err = read_feed(feed.as_bytes()).unwrap_err();
        assert!(matches!(err, FeedError::Csv(_)));
    }

    #[test]
    fn test_load_feed_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        std::fs::write(&path, FEED).unwrap();

        let table = load_feed(&path).unwrap();
        assert_eq!(table.clinics(), vec!["ORTHO", "CARDIO"]);
    }

    #[test]
    fn test_load_feed_missing_file() {
        let err = load_feed("/no/such/feed.csv").unwrap_err();
        assert!(matches!(err, FeedError::Io(_)));
    }
}
