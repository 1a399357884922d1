use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use overload_domain::{self as domain, Session};

use crate::io_error;

/// Side file holding the currently open session as `"<start> | <title>"`.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl domain::SessionRepository for SessionFile {
    fn read_current_session(&self) -> Result<Option<Session>, domain::ReadError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&self.path, err).into()),
        };

        if content.trim().is_empty() {
            debug!("ignoring empty session file {}", self.path.display());
            return Ok(None);
        }

        content
            .parse::<Session>()
            .map(Some)
            .map_err(|err| domain::ReadError::Corrupt {
                entity: "session",
                reason: err.to_string(),
            })
    }

    fn write_current_session(&self, session: &Session) -> Result<Session, domain::UpdateError> {
        fs::write(&self.path, format!("{session}\n")).map_err(|err| io_error(&self.path, err))?;
        Ok(session.clone())
    }

    fn delete_current_session(&self) -> Result<(), domain::DeleteError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&self.path, err).into()),
        }
    }
}
