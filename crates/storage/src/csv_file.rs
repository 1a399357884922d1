use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, Timelike};
use log::debug;
use overload_domain::{
    self as domain, ExerciseName, LegacyRowPolicy, MalformedReason, MalformedRow, ParsedRow,
    ReadReport, Reps, RowFormat, Weight,
};

use crate::io_error;

/// Append-only workout log in CSV format without a header row.
pub struct CsvFile {
    path: PathBuf,
    format: RowFormat,
    legacy_rows: LegacyRowPolicy,
}

impl CsvFile {
    pub fn new(path: impl Into<PathBuf>, format: RowFormat, legacy_rows: LegacyRowPolicy) -> Self {
        Self {
            path: path.into(),
            format,
            legacy_rows,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses every row of the log.
    ///
    /// Rows that cannot be decoded are reported as malformed. Only a failure of the
    /// underlying reader aborts the parse.
    pub fn parse<R: Read>(&self, reader: R) -> Result<ReadReport, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        reader
            .records()
            .enumerate()
            .map(|(i, record)| {
                let fallback_line = i as u64 + 1;
                match record {
                    Ok(record) => Ok(self.parse_record(
                        &record,
                        record.position().map_or(fallback_line, csv::Position::line),
                    )),
                    Err(err) if err.is_io_error() => Err(err),
                    Err(err) => Ok(ParsedRow::Malformed(MalformedRow {
                        line: err.position().map_or(fallback_line, csv::Position::line),
                        reason: MalformedReason::Unreadable(err.to_string()),
                    })),
                }
            })
            .collect()
    }

    fn parse_record(&self, record: &csv::StringRecord, line: u64) -> ParsedRow {
        match self.parse_fields(record) {
            Ok(set) => ParsedRow::Record(set),
            Err(reason) => ParsedRow::Malformed(MalformedRow { line, reason }),
        }
    }

    fn parse_fields(&self, record: &csv::StringRecord) -> Result<domain::WorkoutSet, MalformedReason> {
        let format = match RowFormat::from_field_count(record.len()) {
            Some(format) if format == self.format => format,
            Some(RowFormat::Legacy)
                if self.format == RowFormat::Session
                    && self.legacy_rows == LegacyRowPolicy::Migrate =>
            {
                RowFormat::Legacy
            }
            _ => {
                return Err(MalformedReason::FieldCount {
                    expected: self.format.field_count(),
                    found: record.len(),
                });
            }
        };

        let field = |i: usize| record.get(i).unwrap_or_default();
        let (timestamp, session, rest) = match format {
            RowFormat::Legacy => (field(0), "", 1),
            RowFormat::Session => (field(0), field(1), 2),
        };

        let timestamp = NaiveDateTime::parse_from_str(timestamp.trim(), format.timestamp_format())
            .map_err(|_| MalformedReason::Timestamp(timestamp.to_string()))?;
        let exercise = ExerciseName::new(field(rest)).map_err(MalformedReason::Exercise)?;
        let weight = Weight::try_from(field(rest + 1)).map_err(MalformedReason::Weight)?;
        let reps = Reps::try_from(field(rest + 2)).map_err(MalformedReason::Reps)?;
        let session = session.trim();

        Ok(domain::WorkoutSet {
            timestamp,
            session: (!session.is_empty()).then(|| session.to_string()),
            exercise,
            weight,
            reps,
        })
    }

    /// Writes the sets and returns them as they will be read back.
    pub fn write<W: Write>(
        &self,
        writer: W,
        sets: &[domain::WorkoutSet],
    ) -> Result<Vec<domain::WorkoutSet>, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        for set in sets {
            let timestamp = set
                .timestamp
                .format(self.format.timestamp_format())
                .to_string();
            match self.format {
                RowFormat::Legacy => writer.serialize(LegacyRow::from_set(timestamp, set))?,
                RowFormat::Session => writer.serialize(SessionRow::from_set(timestamp, set))?,
            }
        }

        writer.flush()?;

        Ok(sets.iter().map(|set| self.stored(set)).collect())
    }

    fn stored(&self, set: &domain::WorkoutSet) -> domain::WorkoutSet {
        match self.format {
            RowFormat::Legacy => domain::WorkoutSet {
                timestamp: set
                    .timestamp
                    .with_second(0)
                    .and_then(|t| t.with_nanosecond(0))
                    .unwrap_or(set.timestamp),
                session: None,
                ..set.clone()
            },
            RowFormat::Session => domain::WorkoutSet {
                timestamp: set.timestamp.with_nanosecond(0).unwrap_or(set.timestamp),
                session: set.session.clone().filter(|s| !s.trim().is_empty()),
                ..set.clone()
            },
        }
    }
}

impl domain::WorkoutRepository for CsvFile {
    fn read_workout_sets(&self) -> Result<ReadReport, domain::ReadError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet", self.path.display());
                return Ok(ReadReport::default());
            }
            Err(err) => return Err(io_error(&self.path, err).into()),
        };
        self.parse(file).map_err(|err| match err.into_kind() {
            csv::ErrorKind::Io(err) => io_error(&self.path, err).into(),
            kind => domain::ReadError::Other(format!("{kind:?}").into()),
        })
    }

    fn append_workout_sets(
        &self,
        sets: &[domain::WorkoutSet],
    ) -> Result<Vec<domain::WorkoutSet>, domain::CreateError> {
        if sets.is_empty() {
            return Err(domain::CreateError::Empty);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| io_error(&self.path, err))?;

        self.write(file, sets).map_err(|err| match err.into_kind() {
            csv::ErrorKind::Io(err) => io_error(&self.path, err).into(),
            kind => domain::CreateError::Other(format!("{kind:?}").into()),
        })
    }
}

#[derive(serde::Serialize)]
struct LegacyRow<'a> {
    timestamp: String,
    exercise: &'a str,
    weight: f32,
    reps: u32,
}

impl<'a> LegacyRow<'a> {
    fn from_set(timestamp: String, set: &'a domain::WorkoutSet) -> Self {
        Self {
            timestamp,
            exercise: set.exercise.as_str(),
            weight: f32::from(set.weight),
            reps: u32::from(set.reps),
        }
    }
}

#[derive(serde::Serialize)]
struct SessionRow<'a> {
    timestamp: String,
    session: Option<&'a str>,
    exercise: &'a str,
    weight: f32,
    reps: u32,
}

impl<'a> SessionRow<'a> {
    fn from_set(timestamp: String, set: &'a domain::WorkoutSet) -> Self {
        Self {
            timestamp,
            session: set.session.as_deref(),
            exercise: set.exercise.as_str(),
            weight: f32::from(set.weight),
            reps: u32::from(set.reps),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::tests::data::{
        LEGACY_LOG, SESSION_LOG, SQUAT_SETS, session, timestamp, workout_set,
    };

    use super::*;
    use domain::WorkoutRepository;

    fn csv_file(dir: &tempfile::TempDir, format: RowFormat) -> CsvFile {
        CsvFile::new(
            dir.path().join("workouts.csv"),
            format,
            LegacyRowPolicy::Drop,
        )
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(
            csv_file(&dir, RowFormat::Session)
                .read_workout_sets()
                .unwrap(),
            ReadReport::default()
        );
    }

    #[test]
    fn test_read_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let csv_file = CsvFile::new(dir.path(), RowFormat::Session, LegacyRowPolicy::Drop);

        assert!(matches!(
            csv_file.read_workout_sets(),
            Err(domain::ReadError::Storage(domain::StorageError::Io { .. }))
        ));
    }

    #[rstest]
    #[case(RowFormat::Legacy)]
    #[case(RowFormat::Session)]
    fn test_append_read(#[case] format: RowFormat) {
        let dir = tempfile::tempdir().unwrap();
        let csv_file = csv_file(&dir, format);
        let sets = SQUAT_SETS.clone();

        let stored = csv_file.append_workout_sets(&sets).unwrap();
        let report = csv_file.read_workout_sets().unwrap();

        assert_eq!(report.records, stored);
        assert_eq!(report.skipped(), 0);
        for (read, written) in report.records.iter().zip(&sets) {
            assert_eq!(read.exercise, written.exercise);
            assert_eq!(read.weight, written.weight);
            assert_eq!(read.reps, written.reps);
        }
    }

    #[test]
    fn test_append_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv_file = csv_file(&dir, RowFormat::Session);

        csv_file
            .append_workout_sets(&[workout_set("Squat", 100.0, 8, Some(&session()))])
            .unwrap();
        csv_file
            .append_workout_sets(&[workout_set("Curl", 20.0, 12, None)])
            .unwrap();

        assert_eq!(
            fs::read_to_string(csv_file.path()).unwrap(),
            "2024-03-05 18:30:15,2024-03-05 18:00:00 | Legs,Squat,100.0,8\n\
             2024-03-05 18:30:15,,Curl,20.0,12\n"
        );
        assert_eq!(csv_file.read_workout_sets().unwrap().records.len(), 2);
    }

    #[test]
    fn test_append_legacy_format() {
        let dir = tempfile::tempdir().unwrap();
        let csv_file = csv_file(&dir, RowFormat::Legacy);

        let stored = csv_file
            .append_workout_sets(&[workout_set("Squat", 102.5, 8, Some(&session()))])
            .unwrap();

        assert_eq!(
            fs::read_to_string(csv_file.path()).unwrap(),
            "2024-03-05 18:30,Squat,102.5,8\n"
        );
        assert_eq!(stored[0].timestamp, timestamp().with_second(0).unwrap());
        assert_eq!(stored[0].session, None);
    }

    #[test]
    fn test_append_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let csv_file = csv_file(&dir, RowFormat::Session);

        assert!(matches!(
            csv_file.append_workout_sets(&[]),
            Err(domain::CreateError::Empty)
        ));
        assert!(!csv_file.path().exists());
    }

    #[test]
    fn test_append_to_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let csv_file = CsvFile::new(dir.path(), RowFormat::Session, LegacyRowPolicy::Drop);

        assert!(matches!(
            csv_file.append_workout_sets(&SQUAT_SETS),
            Err(domain::CreateError::Storage(domain::StorageError::Io { .. }))
        ));
    }

    #[test]
    fn test_parse_session_log() {
        let csv_file = CsvFile::new("unused", RowFormat::Session, LegacyRowPolicy::Drop);

        let report = csv_file.parse(SESSION_LOG.as_bytes()).unwrap();

        assert_eq!(
            report
                .records
                .iter()
                .map(|s| (s.exercise.to_string(), s.session.clone(), u32::from(s.reps)))
                .collect::<Vec<_>>(),
            vec![
                (
                    "Squat".to_string(),
                    Some("2024-03-01 09:00:00 | Legs".to_string()),
                    8
                ),
                ("Bench Press".to_string(), None, 10),
                ("Curl".to_string(), None, 12),
            ]
        );
        assert_eq!(
            report.malformed,
            vec![
                MalformedRow {
                    line: 2,
                    reason: MalformedReason::FieldCount {
                        expected: 5,
                        found: 4
                    }
                },
                MalformedRow {
                    line: 3,
                    reason: MalformedReason::Weight(domain::WeightError::ParseError)
                },
                MalformedRow {
                    line: 5,
                    reason: MalformedReason::Timestamp("yesterday".to_string())
                },
                MalformedRow {
                    line: 6,
                    reason: MalformedReason::Reps(domain::RepsError::OutOfRange)
                },
                MalformedRow {
                    line: 7,
                    reason: MalformedReason::Exercise(domain::NameError::Empty)
                },
            ]
        );
    }

    #[rstest]
    #[case::heaviest("2024-03-02 10:00:00,,Squat,9999.5,999\n", Ok((9999.5, 999)))]
    #[case::too_heavy(
        "2024-03-02 10:00:00,,Squat,10000,8\n",
        Err(MalformedReason::Weight(domain::WeightError::OutOfRange))
    )]
    #[case::too_many_reps(
        "2024-03-02 10:00:00,,Squat,100,1000\n",
        Err(MalformedReason::Reps(domain::RepsError::OutOfRange))
    )]
    fn test_parse_value_bounds(
        #[case] log: &str,
        #[case] expected: Result<(f32, u32), MalformedReason>,
    ) {
        let csv_file = CsvFile::new("unused", RowFormat::Session, LegacyRowPolicy::Drop);

        let report = csv_file.parse(log.as_bytes()).unwrap();

        match expected {
            Ok(values) => {
                assert_eq!(report.skipped(), 0);
                assert_eq!(
                    (f32::from(report.records[0].weight), u32::from(report.records[0].reps)),
                    values
                );
            }
            Err(reason) => {
                assert!(report.records.is_empty());
                assert_eq!(report.malformed, vec![MalformedRow { line: 1, reason }]);
            }
        }
    }

    #[rstest]
    #[case(LegacyRowPolicy::Drop, 3, 5)]
    #[case(LegacyRowPolicy::Migrate, 4, 4)]
    fn test_parse_legacy_row_policy(
        #[case] policy: LegacyRowPolicy,
        #[case] records: usize,
        #[case] skipped: usize,
    ) {
        let csv_file = CsvFile::new("unused", RowFormat::Session, policy);

        let report = csv_file.parse(SESSION_LOG.as_bytes()).unwrap();

        assert_eq!(report.records.len(), records);
        assert_eq!(report.skipped(), skipped);
    }

    #[test]
    fn test_parse_legacy_log() {
        let csv_file = CsvFile::new("unused", RowFormat::Legacy, LegacyRowPolicy::Migrate);

        let report = csv_file.parse(LEGACY_LOG.as_bytes()).unwrap();

        assert_eq!(
            report
                .records
                .iter()
                .map(|s| (s.timestamp.to_string(), s.exercise.to_string()))
                .collect::<Vec<_>>(),
            vec![
                ("2024-01-02 07:15:00".to_string(), "Deadlift".to_string()),
                ("2024-01-02 07:20:00".to_string(), "Deadlift".to_string()),
            ]
        );
        assert_eq!(
            report.malformed,
            vec![MalformedRow {
                line: 2,
                reason: MalformedReason::FieldCount {
                    expected: 4,
                    found: 5
                }
            }]
        );
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let csv_file = CsvFile::new("unused", RowFormat::Legacy, LegacyRowPolicy::Drop);

        let report = csv_file.parse(&b"2024-01-02 07:15,Squat,100,5\n2024-01-02 07:16,Squ\xffat,100,5\n2024-01-02 07:17,Squat,100,5\n"[..]).unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.malformed.len(), 1);
        assert_eq!(report.malformed[0].line, 2);
        assert!(matches!(
            report.malformed[0].reason,
            MalformedReason::Unreadable(_)
        ));
    }
}
