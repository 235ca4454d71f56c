//! Appointment filter and scorer.
//!
//! Pipeline: parse bounds → filter by clinic and date → classify → label

use noshow_model::{Classifier, ClassifierError, FeatureFrame};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::context::AppContext;
use crate::models::{
    AppointmentRecord, AppointmentTable, DateRange, InvalidDate, NoShowLabel, ScoredAppointment,
};

/// Query errors. None of these are fatal to the session.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    InvalidDate(#[from] InvalidDate),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Classifier returned {found} probabilities for {expected} rows")]
    OutputLength { expected: usize, found: usize },

    #[error("Classifier returned invalid probability {value} for row {row}")]
    InvalidProbability { row: usize, value: f64 },
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Result of one submitted query.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Nothing matched; the classifier was not called.
    NoAppointments { clinic: String, range: DateRange },
    /// Matching appointments in feed order.
    Scored {
        clinic: String,
        range: DateRange,
        appointments: Vec<ScoredAppointment>,
    },
}

impl QueryOutcome {
    /// Scored rows, or an empty slice.
    pub fn appointments(&self) -> &[ScoredAppointment] {
        match self {
            QueryOutcome::NoAppointments { .. } => &[],
            QueryOutcome::Scored { appointments, .. } => appointments,
        }
    }

    /// The empty-result message, if nothing matched.
    pub fn no_appointments_message(&self) -> Option<String> {
        match self {
            QueryOutcome::NoAppointments { clinic, range } => Some(format!(
                "No appointments found for the selected criteria: Clinic {}, Start date {}, and End date {}",
                clinic, range.start, range.end
            )),
            QueryOutcome::Scored { .. } => None,
        }
    }
}

/// Records of `clinic` whose calendar date is within `range`, in table order.
pub fn filter_appointments<'a>(
    table: &'a AppointmentTable,
    clinic: &str,
    range: &DateRange,
) -> Vec<&'a AppointmentRecord> {
    table
        .records()
        .iter()
        .filter(|r| r.clinic == clinic && range.contains(r.date()))
        .collect()
}

/// Label for a probability (strictly greater than 0.5 is a no-show).
pub fn label_for(probability: f64) -> NoShowLabel {
    NoShowLabel::from_probability(probability)
}

/// Copy the records into a frame with every feed column except `excluded`.
pub fn build_frame(
    columns: &[String],
    records: &[&AppointmentRecord],
    excluded: &[String],
) -> FeatureFrame {
    let keep: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !excluded.contains(c))
        .map(|(i, _)| i)
        .collect();

    let mut frame = FeatureFrame::new(keep.iter().map(|&i| columns[i].clone()).collect());
    for record in records {
        frame.push_row(
            keep.iter()
                .map(|&i| record.values.get(i).cloned().unwrap_or_default())
                .collect(),
        );
    }
    frame
}

/// Score `records` with one classifier call and attach labels.
pub fn score_appointments(
    columns: &[String],
    records: &[&AppointmentRecord],
    classifier: &dyn Classifier,
    excluded: &[String],
) -> QueryResult<Vec<ScoredAppointment>> {
    let frame = build_frame(columns, records, excluded);
    let probabilities = classifier.predict_probability(&frame)?;

    if probabilities.len() != records.len() {
        return Err(QueryError::OutputLength {
            expected: records.len(),
            found: probabilities.len(),
        });
    }

    records
        .iter()
        .zip(probabilities)
        .enumerate()
        .map(|(row, (record, probability))| {
            if !(0.0..=1.0).contains(&probability) {
                return Err(QueryError::InvalidProbability {
                    row,
                    value: probability,
                });
            }
            Ok(ScoredAppointment {
                mrn: record.mrn.clone(),
                appt_id: record.appt_id.clone(),
                date: record.date(),
                time: record.time(),
                label: label_for(probability),
                probability,
            })
        })
        .collect()
}

/// Run a query with an already parsed range.
pub fn execute(ctx: &AppContext, clinic: &str, range: DateRange) -> QueryResult<QueryOutcome> {
    let query_id = Uuid::new_v4();
    let span = info_span!("query", %query_id, clinic, start = %range.start, end = %range.end);
    let _guard = span.enter();

    if range.is_inverted() {
        debug!("start date is after end date");
    }

    let filtered = filter_appointments(ctx.table(), clinic, &range);
    if filtered.is_empty() {
        info!("no matching appointments");
        return Ok(QueryOutcome::NoAppointments {
            clinic: clinic.to_string(),
            range,
        });
    }

    let appointments = score_appointments(
        ctx.table().columns(),
        &filtered,
        ctx.classifier(),
        ctx.excluded_columns(),
    )?;
    let predicted = appointments
        .iter()
        .filter(|a| a.label == NoShowLabel::Yes)
        .count();
    info!(rows = appointments.len(), predicted, "appointments scored");

    Ok(QueryOutcome::Scored {
        clinic: clinic.to_string(),
        range,
        appointments,
    })
}

/// Parse the user's date bounds and run the query.
pub fn run_query(
    ctx: &AppContext,
    clinic: &str,
    start_input: &str,
    end_input: &str,
) -> QueryResult<QueryOutcome> {
    let range = DateRange::parse(start_input, end_input)?;
    execute(ctx, clinic, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use noshow_model::{ClassifierResult, MockClassifier};
    use proptest::prelude::*;

    fn ymd(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn record(mrn: &str, clinic: &str, m: u32, d: u32) -> AppointmentRecord {
        let appt_date = ymd(m, d).and_hms_opt(23, 59, 0).unwrap();
        let appt_id = format!("A-{mrn}");
        AppointmentRecord::new(
            mrn,
            appt_id.clone(),
            clinic,
            appt_date,
            vec![
                mrn.to_string(),
                appt_id,
                clinic.to_string(),
                appt_date.format("%m/%d/%y %H:%M").to_string(),
                "1".to_string(),
            ],
        )
    }

    fn columns() -> Vec<String> {
        ["MRN", "APPT_ID", "CLINIC", "APPT_DATE", "NO_SHOW"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn table() -> AppointmentTable {
        AppointmentTable::new(
            columns(),
            vec![
                record("1", "Ortho", 1, 5),
                record("2", "Cardio", 1, 10),
                record("3", "Ortho", 1, 15),
                record("4", "Ortho", 2, 1),
            ],
        )
    }

    fn january() -> DateRange {
        DateRange::new(ymd(1, 1), ymd(1, 31))
    }

    #[test]
    fn test_filter_by_clinic_and_range() {
        let table = table();
        let filtered = filter_appointments(&table, "Ortho", &january());
        let mrns: Vec<&str> = filtered.iter().map(|r| r.mrn.as_str()).collect();
        assert_eq!(mrns, vec!["1", "3"]);
    }

    #[test]
    fn test_filter_ignores_time_of_day_at_bounds() {
        let table = table();
        let range = DateRange::new(ymd(1, 15), ymd(1, 15));
        let filtered = filter_appointments(&table, "Ortho", &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].mrn, "3");
    }

    #[test]
    fn test_filter_clinic_is_exact() {
        let table = table();
        assert!(filter_appointments(&table, "ortho", &january()).is_empty());
        assert!(filter_appointments(&table, "Ortho ", &january()).is_empty());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let table = table();
        let range = DateRange::new(ymd(1, 31), ymd(1, 1));
        assert!(filter_appointments(&table, "Ortho", &range).is_empty());
    }

    #[test]
    fn test_build_frame_drops_excluded_columns() {
        let table = table();
        let filtered = filter_appointments(&table, "Ortho", &january());
        let frame = build_frame(table.columns(), &filtered, &["NO_SHOW".to_string()]);
        assert_eq!(frame.columns(), &["MRN", "APPT_ID", "CLINIC", "APPT_DATE"]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.value(1, "MRN"), Some("3"));
    }

    #[test]
    fn test_score_preserves_order_and_labels() {
        let table = table();
        let filtered = filter_appointments(&table, "Ortho", &january());
        let classifier = MockClassifier::new(vec![0.5, 0.75]);
        let scored = score_appointments(table.columns(), &filtered, &classifier, &[]).unwrap();

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].mrn, "1");
        assert_eq!(scored[0].label, NoShowLabel::No);
        assert_eq!(scored[0].probability, 0.5);
        assert_eq!(scored[1].mrn, "3");
        assert_eq!(scored[1].label, NoShowLabel::Yes);
        assert_eq!(scored[1].date, ymd(1, 15));
    }

    struct ShortClassifier;

    impl Classifier for ShortClassifier {
        fn predict_probability(&self, _frame: &FeatureFrame) -> ClassifierResult<Vec<f64>> {
            Ok(vec![0.2])
        }

        fn describe(&self) -> String {
            "short".into()
        }
    }

    #[test]
    fn test_output_length_mismatch() {
        let table = table();
        let filtered = filter_appointments(&table, "Ortho", &january());
        let err = score_appointments(table.columns(), &filtered, &ShortClassifier, &[]).unwrap_err();
        assert!(matches!(err, QueryError::OutputLength { expected: 2, found: 1 }));
    }

    #[test]
    fn test_out_of_range_probability() {
        let table = table();
        let filtered = filter_appointments(&table, "Ortho", &january());
        let classifier = MockClassifier::new(vec![0.1, 1.5]);
        let err = score_appointments(table.columns(), &filtered, &classifier, &[]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidProbability { row: 1, .. }));
    }

    #[test]
    fn test_nan_probability_rejected() {
        let table = table();
        let filtered = filter_appointments(&table, "Ortho", &january());
        let classifier = MockClassifier::constant(f64::NAN);
        let err = score_appointments(table.columns(), &filtered, &classifier, &[]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidProbability { row: 0, .. }));
    }

    #[test]
    fn test_no_appointments_message() {
        let outcome = QueryOutcome::NoAppointments {
            clinic: "Ortho".into(),
            range: january(),
        };
        assert_eq!(
            outcome.no_appointments_message().unwrap(),
            "No appointments found for the selected criteria: Clinic Ortho, Start date 2024-01-01, and End date 2024-01-31"
        );
        assert!(outcome.appointments().is_empty());
    }

    proptest! {
        #[test]
        fn prop_label_is_strict_threshold(p in 0.0f64..=1.0) {
            prop_assert_eq!(label_for(p) == NoShowLabel::Yes, p > 0.5);
        }

        #[test]
        fn prop_filter_is_pure_and_ordered(
            days in proptest::collection::vec((1u32..=2, 1u32..=28, any::<bool>()), 0..40),
            start in 1u32..=28,
            end in 1u32..=28,
        ) {
            let records: Vec<AppointmentRecord> = days
                .iter()
                .enumerate()
                .map(|(i, (m, d, ortho))| {
                    record(&i.to_string(), if *ortho { "Ortho" } else { "Cardio" }, *m, *d)
                })
                .collect();
            let table = AppointmentTable::new(columns(), records);
            let range = DateRange::new(ymd(1, start), ymd(2, end));

            let first = filter_appointments(&table, "Ortho", &range);
            let _other = filter_appointments(&table, "Cardio", &january());
            let second = filter_appointments(&table, "Ortho", &range);
            prop_assert_eq!(&first, &second);

            let positions: Vec<usize> = first
                .iter()
                .map(|r| r.mrn.parse::<usize>().unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(first.iter().all(|r| r.clinic == "Ortho" && range.contains(r.date())));
        }
    }
}
