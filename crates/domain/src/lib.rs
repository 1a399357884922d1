#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod aggregation;
mod classifier;
mod error;
mod name;
mod progression;
mod service;
mod session;
mod training;
mod workout_set;

pub use aggregation::*;
pub use classifier::*;
pub use error::*;
pub use name::*;
pub use progression::*;
pub use service::*;
pub use session::*;
pub use training::*;
pub use workout_set::*;
