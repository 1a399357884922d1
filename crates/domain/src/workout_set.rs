use chrono::{NaiveDateTime, Timelike};

use crate::{
    Advice, CreateError, ExerciseName, Group, GroupBy, NameError, ReadError, Reps, RepsError,
    Session, Weight, WeightError, group,
};

pub trait WorkoutService {
    fn get_workout_sets(&self) -> Result<ReadReport, ReadError>;
    fn log_workout_sets(
        &self,
        exercise: &ExerciseName,
        sets: &[(Weight, Reps)],
        session: Option<&Session>,
        timestamp: NaiveDateTime,
    ) -> Result<LoggedBatch, CreateError>;

    fn get_history(
        &self,
        by: GroupBy,
        exercise: Option<&ExerciseName>,
    ) -> Result<History, ReadError> {
        let report = self.get_workout_sets()?;
        let skipped = report.skipped();
        let records = report
            .records
            .into_iter()
            .filter(|set| exercise.is_none_or(|e| set.exercise == *e))
            .collect::<Vec<_>>();
        Ok(History {
            groups: group(&records, by),
            skipped,
        })
    }
}

pub trait WorkoutRepository {
    fn read_workout_sets(&self) -> Result<ReadReport, ReadError>;
    fn append_workout_sets(&self, sets: &[WorkoutSet]) -> Result<Vec<WorkoutSet>, CreateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSet {
    pub timestamp: NaiveDateTime,
    pub session: Option<String>,
    pub exercise: ExerciseName,
    pub weight: Weight,
    pub reps: Reps,
}

impl WorkoutSet {
    #[must_use]
    pub fn new(
        timestamp: NaiveDateTime,
        session: Option<&Session>,
        exercise: ExerciseName,
        weight: Weight,
        reps: Reps,
    ) -> Self {
        Self {
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
            session: session.map(Session::label),
            exercise,
            weight,
            reps,
        }
    }
}

/// Sets written by a single logging action and the advice derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedBatch {
    pub sets: Vec<WorkoutSet>,
    pub advice: Advice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub groups: Vec<Group>,
    pub skipped: usize,
}

/// Column layout of a stored workout log.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RowFormat {
    /// `timestamp,exercise,weight,reps` with minute precision
    Legacy,
    /// `timestamp,session_label,exercise,weight,reps` with second precision
    #[default]
    Session,
}

impl RowFormat {
    #[must_use]
    pub fn field_count(self) -> usize {
        match self {
            RowFormat::Legacy => 4,
            RowFormat::Session => 5,
        }
    }

    #[must_use]
    pub fn timestamp_format(self) -> &'static str {
        match self {
            RowFormat::Legacy => "%Y-%m-%d %H:%M",
            RowFormat::Session => "%Y-%m-%d %H:%M:%S",
        }
    }

    #[must_use]
    pub fn from_field_count(count: usize) -> Option<Self> {
        match count {
            4 => Some(RowFormat::Legacy),
            5 => Some(RowFormat::Session),
            _ => None,
        }
    }
}

/// What to do with rows that are written in another row format than the configured one.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LegacyRowPolicy {
    #[default]
    Drop,
    Migrate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    Record(WorkoutSet),
    Malformed(MalformedRow),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRow {
    /// 1-based line in the store
    pub line: u64,
    pub reason: MalformedReason,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MalformedReason {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid timestamp \"{0}\"")]
    Timestamp(String),
    #[error("invalid exercise: {0}")]
    Exercise(NameError),
    #[error("invalid weight: {0}")]
    Weight(WeightError),
    #[error("invalid reps: {0}")]
    Reps(RepsError),
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// Outcome of reading the whole workout log.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReadReport {
    pub records: Vec<WorkoutSet>,
    pub malformed: Vec<MalformedRow>,
}

impl ReadReport {
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.malformed.len()
    }
}

impl FromIterator<ParsedRow> for ReadReport {
    fn from_iter<T: IntoIterator<Item = ParsedRow>>(iter: T) -> Self {
        let mut report = ReadReport::default();
        for row in iter {
            match row {
                ParsedRow::Record(set) => report.records.push(set),
                ParsedRow::Malformed(row) => report.malformed.push(row),
            }
        }
        report
    }
}
