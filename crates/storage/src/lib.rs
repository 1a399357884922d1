#![warn(clippy::pedantic)]

use std::path::Path;

use overload_domain as domain;

pub mod csv_file;
pub mod session_file;

pub use csv_file::CsvFile;
pub use session_file::SessionFile;

/// Workout log and session side file, used together as the repository of the service.
pub struct FileStorage {
    pub workouts: CsvFile,
    pub session: SessionFile,
}

impl domain::WorkoutRepository for FileStorage {
    fn read_workout_sets(&self) -> Result<domain::ReadReport, domain::ReadError> {
        domain::WorkoutRepository::read_workout_sets(&self.workouts)
    }

    fn append_workout_sets(
        &self,
        sets: &[domain::WorkoutSet],
    ) -> Result<Vec<domain::WorkoutSet>, domain::CreateError> {
        domain::WorkoutRepository::append_workout_sets(&self.workouts, sets)
    }
}

impl domain::SessionRepository for FileStorage {
    fn read_current_session(&self) -> Result<Option<domain::Session>, domain::ReadError> {
        domain::SessionRepository::read_current_session(&self.session)
    }

    fn write_current_session(
        &self,
        session: &domain::Session,
    ) -> Result<domain::Session, domain::UpdateError> {
        domain::SessionRepository::write_current_session(&self.session, session)
    }

    fn delete_current_session(&self) -> Result<(), domain::DeleteError> {
        domain::SessionRepository::delete_current_session(&self.session)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> domain::StorageError {
    domain::StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use domain::{SessionRepository, WorkoutRepository};

    use super::*;

    pub mod data;

    #[test]
    fn test_file_storage_delegates_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage {
            workouts: CsvFile::new(
                dir.path().join("workouts.csv"),
                domain::RowFormat::Session,
                domain::LegacyRowPolicy::Drop,
            ),
            session: SessionFile::new(dir.path().join("current_session.txt")),
        };

        let stored = storage.append_workout_sets(&data::SQUAT_SETS).unwrap();
        assert_eq!(storage.read_workout_sets().unwrap().records, stored);

        assert_eq!(storage.read_current_session().unwrap(), None);
        storage.write_current_session(&data::session()).unwrap();
        assert_eq!(
            storage.read_current_session().unwrap(),
            Some(data::session())
        );
        storage.delete_current_session().unwrap();
        assert_eq!(storage.read_current_session().unwrap(), None);
    }
}
