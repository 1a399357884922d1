use std::io::Write;

use anyhow::bail;
use chrono::NaiveDateTime;
use log::warn;
use overload_domain::{
    self as domain, DeleteError, ExerciseName, GroupBy, Guidance, Reps, Service, SessionService,
    Weight, WorkoutService,
};
use overload_storage::{CsvFile, FileStorage, SessionFile};

use crate::{
    cli::{Command, LogArgs, SessionAction},
    settings::Settings,
};

pub fn run<W: Write>(
    command: Command,
    settings: &Settings,
    now: NaiveDateTime,
    out: &mut W,
) -> anyhow::Result<()> {
    let service = Service::new(
        FileStorage {
            workouts: CsvFile::new(
                &settings.data_file,
                settings.row_format,
                settings.legacy_rows,
            ),
            session: SessionFile::new(&settings.session_file),
        },
        settings.classifier()?,
        settings.progression,
    );
    let unit = settings.weight_unit.as_str();

    match command {
        Command::Log(args) => log_sets(&service, &args, now, unit, out),
        Command::History {
            by,
            exercise,
            limit,
        } => history(&service, by, exercise.as_deref(), limit, unit, out),
        Command::Session { action } => session(&service, &action, now, out),
        Command::Target { exercise } => {
            let exercise = ExerciseName::new(&exercise)?;
            let (kind, target_reps) = service.classify(&exercise);
            writeln!(out, "{exercise}: {kind} lift, target {target_reps} reps")?;
            Ok(())
        }
    }
}

fn log_sets<R, W>(
    service: &Service<R>,
    args: &LogArgs,
    now: NaiveDateTime,
    unit: &str,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: domain::WorkoutRepository + domain::SessionRepository,
    W: Write,
{
    let exercise = ExerciseName::new(&args.exercise)?;
    let sets = valid_sets(args);

    if sets.is_empty() {
        bail!("no valid sets given, nothing was logged");
    }

    let session = service.get_current_session()?;
    let logged = service.log_workout_sets(&exercise, &sets, session.as_ref(), now)?;
    let advice = logged.advice;

    let count = logged.sets.len();
    let sets = if count == 1 { "set" } else { "sets" };
    match &session {
        Some(session) => writeln!(out, "Logged {count} {sets} of {exercise} in session {session}")?,
        None => writeln!(out, "Logged {count} {sets} of {exercise}")?,
    }
    writeln!(
        out,
        "Average {:.1} reps at up to {} {unit}, target {} reps",
        advice.avg_reps, advice.top_weight, advice.target_reps
    )?;
    match advice.guidance {
        Guidance::Increase(weight) => writeln!(
            out,
            "You hit your target reps ({}) for {exercise}! Next session: increase to {weight} {unit}",
            advice.target_reps
        )?,
        Guidance::Hold(weight) => writeln!(
            out,
            "Keep going, aim for {} reps before increasing weight. Next session: hold weight at {weight} {unit}",
            advice.target_reps
        )?,
        Guidance::Reduce(weight) => writeln!(
            out,
            "Well below {} reps. Next session: reduce weight to {weight} {unit}",
            advice.target_reps
        )?,
    }

    Ok(())
}

/// Collects the valid sets of the arguments and warns about the others.
fn valid_sets(args: &LogArgs) -> Vec<(Weight, Reps)> {
    let parsed = match (&args.weight, &args.reps) {
        (Some(weight), Some(reps)) => (0..args.count)
            .map(|_| parse_pair(weight, reps))
            .collect::<Vec<_>>(),
        _ => args.sets.iter().map(|set| parse_set(set)).collect(),
    };

    parsed
        .into_iter()
        .filter_map(|result| match result {
            Ok(set) => Some(set),
            Err(err) => {
                warn!("skipping set: {err}");
                None
            }
        })
        .collect()
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetError {
    #[error("\"{0}\" must have the form WEIGHTxREPS")]
    Format(String),
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
    #[error(transparent)]
    Reps(#[from] domain::RepsError),
}

pub fn parse_set(value: &str) -> Result<(Weight, Reps), SetError> {
    let Some((weight, reps)) = value.split_once(['x', 'X', '×']) else {
        return Err(SetError::Format(value.to_string()));
    };
    parse_pair(weight, reps)
}

fn parse_pair(weight: &str, reps: &str) -> Result<(Weight, Reps), SetError> {
    Ok((Weight::try_from(weight)?, Reps::try_from(reps)?))
}

fn history<R, W>(
    service: &Service<R>,
    by: GroupBy,
    exercise: Option<&str>,
    limit: Option<usize>,
    unit: &str,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: domain::WorkoutRepository,
    W: Write,
{
    let exercise = exercise.map(ExerciseName::new).transpose()?;
    let history = service.get_history(by, exercise.as_ref())?;

    if history.groups.is_empty() {
        writeln!(out, "No workouts logged yet!")?;
    }

    for group in history.groups.iter().take(limit.unwrap_or(usize::MAX)) {
        writeln!(out, "--- {} ---", group.key)?;
        for set in &group.sets {
            writeln!(
                out,
                "{} | {}: {} {unit} × {} reps",
                set.timestamp.format(domain::SESSION_TIMESTAMP_FORMAT),
                set.exercise,
                set.weight,
                set.reps
            )?;
        }
    }

    if history.skipped > 0 {
        writeln!(out, "({} malformed rows skipped)", history.skipped)?;
    }

    Ok(())
}

fn session<R, W>(
    service: &Service<R>,
    action: &SessionAction,
    now: NaiveDateTime,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: domain::SessionRepository,
    W: Write,
{
    match action {
        SessionAction::Start { title } => {
            let session = service.start_session(&title.join(" "), now)?;
            writeln!(out, "Started session {session}")?;
        }
        SessionAction::End => match service.end_session() {
            Ok(session) => writeln!(out, "Ended session {session}")?,
            Err(DeleteError::NotFound) => writeln!(out, "No open session")?,
            Err(err) => return Err(err.into()),
        },
        SessionAction::Status => match service.get_current_session()? {
            Some(session) => writeln!(out, "Open session: {session}")?,
            None => writeln!(out, "No open session")?,
        },
    }
    Ok(())
}
