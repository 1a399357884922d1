use std::{collections::HashMap, fmt};

use chrono::{NaiveDate, NaiveDateTime};

use crate::{ExerciseName, WorkoutSet};

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
pub enum GroupBy {
    #[default]
    Session,
    Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Session(String),
    ExerciseDay(ExerciseName, NaiveDate),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GroupKey::Session(label) => write!(f, "{label}"),
            GroupKey::ExerciseDay(exercise, date) => write!(f, "{date} | {exercise}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: GroupKey,
    pub sets: Vec<WorkoutSet>,
}

impl Group {
    /// Timestamp of the first set logged in this group.
    #[must_use]
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.sets.first().map(|s| s.timestamp)
    }
}

#[must_use]
pub fn group(records: &[WorkoutSet], by: GroupBy) -> Vec<Group> {
    match by {
        GroupBy::Session => group_by_session(records),
        GroupBy::Day => group_by_exercise_day(records),
    }
}

/// Groups sets by session label, falling back to exercise and date for sets without a session.
#[must_use]
pub fn group_by_session(records: &[WorkoutSet]) -> Vec<Group> {
    group_by_key(records, |set| match &set.session {
        Some(label) if !label.is_empty() => GroupKey::Session(label.clone()),
        _ => exercise_day(set),
    })
}

#[must_use]
pub fn group_by_exercise_day(records: &[WorkoutSet]) -> Vec<Group> {
    group_by_key(records, exercise_day)
}

fn exercise_day(set: &WorkoutSet) -> GroupKey {
    GroupKey::ExerciseDay(set.exercise.clone(), set.timestamp.date())
}

fn group_by_key(records: &[WorkoutSet], key: impl Fn(&WorkoutSet) -> GroupKey) -> Vec<Group> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for set in records {
        let key = key(set);
        if let Some(&i) = index.get(&key) {
            groups[i].sets.push(set.clone());
        } else {
            index.insert(key.clone(), groups.len());
            groups.push(Group {
                key,
                sets: vec![set.clone()],
            });
        }
    }

    // stable, so groups with equal timestamps stay in order of first appearance
    groups.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    groups
}
