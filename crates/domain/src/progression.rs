use std::fmt;

use crate::{ExerciseClassifier, Reps, Weight};

/// Tie-break applied when a weight lies exactly between two steps.
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RoundingMode {
    #[default]
    HalfAwayFromZero,
    HalfEven,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProgressionSettings {
    pub increase_factor: f32,
    pub decrease_factor: f32,
    pub hold_threshold: f32,
    pub step: f32,
    pub rounding: RoundingMode,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            increase_factor: 1.025,
            decrease_factor: 0.95,
            hold_threshold: 0.8,
            step: 0.5,
            rounding: RoundingMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Guidance {
    Increase(Weight),
    Hold(Weight),
    Reduce(Weight),
}

impl fmt::Display for Guidance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Guidance::Increase(weight) => write!(f, "increase to {weight}"),
            Guidance::Hold(weight) => write!(f, "hold weight at {weight}"),
            Guidance::Reduce(weight) => write!(f, "reduce weight to {weight}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advice {
    pub target_reps: Reps,
    pub avg_reps: f32,
    pub top_weight: Weight,
    pub guidance: Guidance,
}

/// Compares the reps of a freshly logged batch against the target of the exercise.
///
/// Returns `None` for an empty batch.
#[must_use]
pub fn advise(
    classifier: &ExerciseClassifier,
    settings: &ProgressionSettings,
    exercise: &str,
    sets: &[(Weight, Reps)],
) -> Option<Advice> {
    if sets.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let avg_reps = (sets.iter().map(|(_, r)| u64::from(u32::from(*r))).sum::<u64>() as f64
        / sets.len() as f64) as f32;
    let top_weight = sets
        .iter()
        .map(|(w, _)| *w)
        .fold(sets[0].0, |max, w| if w > max { w } else { max });
    let target_reps = classifier.target_reps(exercise);
    #[allow(clippy::cast_precision_loss)]
    let target = u32::from(target_reps) as f32;

    let guidance = if avg_reps >= target {
        Guidance::Increase(adjust(top_weight, settings.increase_factor, settings))
    } else if avg_reps >= settings.hold_threshold * target {
        Guidance::Hold(top_weight)
    } else {
        Guidance::Reduce(adjust(top_weight, settings.decrease_factor, settings))
    };

    Some(Advice {
        target_reps,
        avg_reps,
        top_weight,
        guidance,
    })
}

fn adjust(weight: Weight, factor: f32, settings: &ProgressionSettings) -> Weight {
    let rounded = round_to_step(f32::from(weight) * factor, settings.step, settings.rounding);
    Weight::new(rounded.max(settings.step)).unwrap_or(weight)
}

#[must_use]
pub fn round_to_step(value: f32, step: f32, mode: RoundingMode) -> f32 {
    if step <= 0.0 {
        return value;
    }

    let steps = value / step;
    let rounded = match mode {
        RoundingMode::HalfAwayFromZero => steps.round(),
        RoundingMode::HalfEven => steps.round_ties_even(),
    };
    rounded * step
}
