use chrono::NaiveDateTime;
use log::{debug, error, warn};

use crate::{
    CreateError, DeleteError, ExerciseClassifier, ExerciseName, LiftKind, LoggedBatch,
    ProgressionSettings, ReadError, ReadReport, Reps, Session, SessionRepository, SessionService,
    UpdateError, Weight, WorkoutRepository, WorkoutService, WorkoutSet, advise,
};

pub struct Service<R> {
    repository: R,
    classifier: ExerciseClassifier,
    progression: ProgressionSettings,
}

impl<R> Service<R> {
    pub fn new(
        repository: R,
        classifier: ExerciseClassifier,
        progression: ProgressionSettings,
    ) -> Self {
        Self {
            repository,
            classifier,
            progression,
        }
    }

    #[must_use]
    pub fn classify(&self, exercise: &ExerciseName) -> (LiftKind, Reps) {
        (
            self.classifier.classify(exercise.as_str()),
            self.classifier.target_reps(exercise.as_str()),
        )
    }
}

macro_rules! log_on_error {
    ($func: expr, $action: literal, $entity: literal) => {{
        let result = $func;
        if let Err(ref err) = result {
            error!("failed to {} {}: {err}", $action, $entity);
        }
        result
    }};
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    fn get_workout_sets(&self) -> Result<ReadReport, ReadError> {
        let report = log_on_error!(self.repository.read_workout_sets(), "get", "workout sets")?;
        for row in &report.malformed {
            warn!("skipped malformed row on line {}: {}", row.line, row.reason);
        }
        Ok(report)
    }

    fn log_workout_sets(
        &self,
        exercise: &ExerciseName,
        sets: &[(Weight, Reps)],
        session: Option<&Session>,
        timestamp: NaiveDateTime,
    ) -> Result<LoggedBatch, CreateError> {
        let Some(advice) = advise(&self.classifier, &self.progression, exercise.as_str(), sets)
        else {
            return Err(CreateError::Empty);
        };
        let sets = sets
            .iter()
            .map(|(weight, reps)| {
                WorkoutSet::new(timestamp, session, exercise.clone(), *weight, *reps)
            })
            .collect::<Vec<_>>();
        let sets = log_on_error!(
            self.repository.append_workout_sets(&sets),
            "create",
            "workout sets"
        )?;
        debug!("logged {} sets of {exercise}", sets.len());
        Ok(LoggedBatch { sets, advice })
    }
}

impl<R: SessionRepository> SessionService for Service<R> {
    fn get_current_session(&self) -> Result<Option<Session>, ReadError> {
        log_on_error!(
            self.repository.read_current_session(),
            "get",
            "current session"
        )
    }

    fn start_session(&self, title: &str, start: NaiveDateTime) -> Result<Session, UpdateError> {
        if let Some(current) = self.get_current_session()? {
            return Err(UpdateError::Conflict(format!(
                "session \"{current}\" is still open"
            )));
        }
        let session =
            Session::new(title, start).map_err(|err| UpdateError::Other(Box::new(err)))?;
        let session = log_on_error!(
            self.repository.write_current_session(&session),
            "start",
            "session"
        )?;
        debug!("started session {session}");
        Ok(session)
    }

    fn end_session(&self) -> Result<Session, DeleteError> {
        let Some(current) = self.get_current_session()? else {
            return Err(DeleteError::NotFound);
        };
        log_on_error!(
            self.repository.delete_current_session(),
            "end",
            "session"
        )?;
        debug!("ended session {current}");
        Ok(current)
    }
}
