use std::collections::BTreeSet;

use crate::Reps;

pub const COMPOUND_LIFTS: &[&str] = &[
    "Bench Press",
    "Bench",
    "Bp",
    "Incline Bench",
    "Incline",
    "Ibp",
    "Overhead Press",
    "Shoulder Press",
    "Ohp",
    "Push Press",
    "Pushpress",
    "Dips",
    "Close Grip Bench",
    "Cgbp",
    "Barbell Row",
    "Row",
    "Bbrow",
    "Pull Up",
    "Pullup",
    "Pu",
    "Chin Up",
    "Chinup",
    "Cu",
    "T-Bar Row",
    "Tbar",
    "Trow",
    "Lat Pulldown",
    "Lat",
    "Lpd",
    "Deadlift",
    "Dead",
    "Dl",
    "Squat",
    "Sq",
    "Front Squat",
    "Front",
    "Fsq",
    "Hack Squat",
    "Hack",
    "Leg Press",
    "Press",
    "Lp",
    "Romanian Deadlift",
    "Rdl",
    "Sumo Deadlift",
    "Sumo",
    "Lunge",
    "Lunges",
    "Bulgarian Split Squat",
    "Bulgarian",
    "Bss",
    "Power Clean",
    "Clean",
    "Pcln",
    "Snatch",
    "Pendlay Row",
    "Pendlay",
    "Hip Thrust",
    "Thrust",
    "Ht",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LiftKind {
    Compound,
    Isolation,
}

/// Maps exercise names to a lift kind by exact, case-insensitive lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseClassifier {
    compound_lifts: BTreeSet<String>,
    compound_target: Reps,
    isolation_target: Reps,
}

impl ExerciseClassifier {
    pub fn new<I, S>(compound_lifts: I, compound_target: Reps, isolation_target: Reps) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            compound_lifts: compound_lifts
                .into_iter()
                .map(|name| normalize(name.as_ref()))
                .filter(|name| !name.is_empty())
                .collect(),
            compound_target,
            isolation_target,
        }
    }

    #[must_use]
    pub fn classify(&self, exercise: &str) -> LiftKind {
        if self.compound_lifts.contains(&normalize(exercise)) {
            LiftKind::Compound
        } else {
            LiftKind::Isolation
        }
    }

    #[must_use]
    pub fn target_reps(&self, exercise: &str) -> Reps {
        match self.classify(exercise) {
            LiftKind::Compound => self.compound_target,
            LiftKind::Isolation => self.isolation_target,
        }
    }
}

impl Default for ExerciseClassifier {
    fn default() -> Self {
        Self::new(COMPOUND_LIFTS, Reps::EIGHT, Reps::TWELVE)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
