use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;
use overload_domain::GroupBy;

#[derive(Parser, Debug)]
#[command(name = "overload", version, about = "Log workouts and get progressive overload advice")]
pub struct Cli {
    /// Config file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workout log (CSV)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// File holding the open session
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    #[must_use]
    pub fn log_level(&self, configured: LevelFilter) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => configured,
            1 => configured.max(LevelFilter::Info),
            2 => configured.max(LevelFilter::Debug),
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log sets of an exercise and show the suggested next weight
    Log(LogArgs),

    /// Show logged sets, most recent first
    History {
        /// Group by session or by exercise and day
        #[arg(long, default_value_t = GroupBy::Session)]
        by: GroupBy,

        /// Only show this exercise
        #[arg(long)]
        exercise: Option<String>,

        /// Maximum number of groups
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Start, end or show the current session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show the target reps of an exercise
    Target { exercise: String },
}

const MAX_SETS: i64 = 100;

#[derive(Args, Debug)]
pub struct LogArgs {
    pub exercise: String,

    /// Set as WEIGHTxREPS, e.g. 100x8 (repeatable)
    #[arg(long = "set", value_name = "WEIGHTxREPS", conflicts_with_all = ["weight", "reps"])]
    pub sets: Vec<String>,

    /// Weight of every set
    #[arg(long, requires = "reps")]
    pub weight: Option<String>,

    /// Reps of every set
    #[arg(long, requires = "weight")]
    pub reps: Option<String>,

    /// Number of sets with --weight and --reps
    #[arg(
        long,
        default_value_t = 1,
        requires = "weight",
        value_parser = clap::value_parser!(u32).range(1..=MAX_SETS)
    )]
    pub count: u32,
}

#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// Open a new session; sets logged afterwards carry its label
    Start {
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Close the open session
    End,
    /// Show the open session
    Status,
}
