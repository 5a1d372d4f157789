//! Result records reported by catalog actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Ok,
    NotNeeded,
    Impossible,
    Error,
}

impl Status {
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Impossible | Self::Error)
    }
}

/// One outcome of an action, e.g. `catalog add(ok): /data/cat [Metadata items ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: String,
    pub path: PathBuf,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    pub fn new(action: impl Into<String>, path: impl Into<PathBuf>, status: Status) -> Self {
        Self { action: action.into(), path: path.into(), status, message: None }
    }

    pub fn ok(action: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(action, path, Status::Ok)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.action, self.status, self.path.display())?;
        if let Some(message) = &self.message {
            write!(f, " [{message}]")?;
        }
        Ok(())
    }
}
