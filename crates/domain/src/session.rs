use std::{fmt, str::FromStr};

use chrono::{NaiveDateTime, Timelike};

use crate::{DeleteError, Name, NameError, ReadError, UpdateError};

pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SEPARATOR: &str = " | ";

pub trait SessionService {
    fn get_current_session(&self) -> Result<Option<Session>, ReadError>;
    fn start_session(&self, title: &str, start: NaiveDateTime) -> Result<Session, UpdateError>;
    fn end_session(&self) -> Result<Session, DeleteError>;
}

pub trait SessionRepository {
    fn read_current_session(&self) -> Result<Option<Session>, ReadError>;
    fn write_current_session(&self, session: &Session) -> Result<Session, UpdateError>;
    fn delete_current_session(&self) -> Result<(), DeleteError>;
}

/// A labelled group of sets, started at a point in time.
///
/// The label written into each logged set is `"<start> | <title>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub start: NaiveDateTime,
    pub title: Name,
}

impl Session {
    pub fn new(title: &str, start: NaiveDateTime) -> Result<Self, SessionError> {
        Ok(Self {
            start: start.with_nanosecond(0).unwrap_or(start),
            title: Name::new(title)?,
        })
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}",
            self.start.format(SESSION_TIMESTAMP_FORMAT),
            self.title
        )
    }
}

impl FromStr for Session {
    type Err = SessionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((start, title)) = value.trim().split_once(SEPARATOR.trim()) else {
            return Err(SessionError::MissingSeparator);
        };
        let start = NaiveDateTime::parse_from_str(start.trim(), SESSION_TIMESTAMP_FORMAT)
            .map_err(|_| SessionError::InvalidTimestamp(start.trim().to_string()))?;
        Session::new(title, start)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Session must have the form \"<timestamp> | <title>\"")]
    MissingSeparator,
    #[error("Invalid session timestamp: {0}")]
    InvalidTimestamp(String),
    #[error(transparent)]
    Title(#[from] NameError),
}
