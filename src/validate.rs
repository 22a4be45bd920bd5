use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::db::PlayRecord;
use crate::extract::PlayRow;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("primary key check violated: duplicate played_at_time {0:?}")]
    PrimaryKeyViolation(Option<String>),
    #[error("null value found in row {0}")]
    NullValue(usize),
    #[error("row dated {found} is not within the expected day {expected}")]
    RecencyViolation { found: String, expected: NaiveDate },
}

/// Outcome of a passing batch check. An empty batch is a negative but
/// non-exceptional result: the run ends gracefully without touching
/// storage. Data-quality problems travel on the error channel instead.
#[derive(Debug)]
pub enum Checked {
    Empty,
    Valid(Vec<PlayRecord>),
}

/// Apply the four batch rules in order, short-circuiting on the first
/// violation:
///
/// 1. zero rows ends the run (`Checked::Empty`);
/// 2. `played_at_time` must be unique within the batch;
/// 3. no cell in any column may be absent;
/// 4. every row's day-level timestamp must equal the calendar day
///    before `today`.
///
/// One bad row rejects the whole batch; there is no partial acceptance.
pub fn check_batch(
    rows: &[PlayRow],
    today: NaiveDate,
) -> Result<Checked, ValidationError> {
    if rows.is_empty() {
        return Ok(Checked::Empty);
    }

    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.played_at_time.as_deref()) {
            return Err(ValidationError::PrimaryKeyViolation(
                row.played_at_time.clone(),
            ));
        }
    }

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let record = row
            .clone()
            .into_record()
            .ok_or(ValidationError::NullValue(index))?;
        records.push(record);
    }

    let yesterday = today - Days::new(1);
    for record in &records {
        let day = NaiveDate::parse_from_str(&record.time_stamp, "%Y-%m-%d");
        if day != Ok(yesterday) {
            return Err(ValidationError::RecencyViolation {
                found: record.time_stamp.clone(),
                expected: yesterday,
            });
        }
    }

    Ok(Checked::Valid(records))
}

impl PlayRow {
    fn into_record(self) -> Option<PlayRecord> {
        Some(PlayRecord {
            song_name: self.song_name?,
            artist_name: self.artist_name?,
            played_at_time: self.played_at_time?,
            time_stamp: self.time_stamp?,
        })
    }
}
