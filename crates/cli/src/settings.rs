use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::LevelFilter;
use overload_domain::{
    COMPOUND_LIFTS, ExerciseClassifier, LegacyRowPolicy, ProgressionSettings, Reps, RowFormat,
};

pub const DEFAULT_CONFIG_FILE: &str = "overload.json";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub data_file: PathBuf,
    pub session_file: PathBuf,
    pub row_format: RowFormat,
    pub legacy_rows: LegacyRowPolicy,
    pub compound_lifts: Vec<String>,
    pub compound_target_reps: u32,
    pub isolation_target_reps: u32,
    pub progression: ProgressionSettings,
    pub log_level: LevelFilter,
    pub weight_unit: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("workouts.csv"),
            session_file: PathBuf::from("current_session.txt"),
            row_format: RowFormat::default(),
            legacy_rows: LegacyRowPolicy::default(),
            compound_lifts: COMPOUND_LIFTS.iter().map(ToString::to_string).collect(),
            compound_target_reps: u32::from(Reps::EIGHT),
            isolation_target_reps: u32::from(Reps::TWELVE),
            progression: ProgressionSettings::default(),
            log_level: LevelFilter::Warn,
            weight_unit: "lbs".to_string(),
        }
    }
}

impl Settings {
    /// Reads the given config file, or the default one if it exists.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::read(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn classifier(&self) -> anyhow::Result<ExerciseClassifier> {
        let compound_target =
            Reps::new(self.compound_target_reps).context("invalid compound_target_reps")?;
        let isolation_target =
            Reps::new(self.isolation_target_reps).context("invalid isolation_target_reps")?;
        Ok(ExerciseClassifier::new(
            &self.compound_lifts,
            compound_target,
            isolation_target,
        ))
    }
}
