//! Checkpoint state persisted between extraction runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// `last_run` timestamp layout: UTC, millisecond field always zero.
pub const STATE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// State written after a run and read back by the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,
}

impl ExtractionState {
    /// State recording a run at `time`.
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            last_run: Some(time.format(STATE_TIMESTAMP_FORMAT).to_string()),
        }
    }

    /// State recording a run now.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// The checkpoint to continue from, if a previous run left one.
    pub fn last_run(&self) -> Option<&str> {
        self.last_run
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load state from `path`. A missing file means a first run.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no state file, starting a full extraction");
            return Ok(Self::default());
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
