// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer command templates.

use crate::error::PlaybackError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder replaced by the staged file path
pub const FILE_PLACEHOLDER: &str = "%f";

/// A viewer command line: one argument per line, the first being the program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerTemplate(String);

impl ViewerTemplate {
    /// Wrap a template string
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Raw template text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Program and arguments for playing `path`.
    ///
    /// Each line is trimmed on its own; blank lines are ignored.
    pub fn command(&self, path: &Path) -> Result<(String, Vec<String>), PlaybackError> {
        let path = path.to_string_lossy();
        let mut args = self
            .0
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.replace(FILE_PLACEHOLDER, &path));
        let program = args.next().ok_or(PlaybackError::EmptyViewerCommand)?;
        Ok((program, args.collect()))
    }
}

impl Default for ViewerTemplate {
    fn default() -> Self {
        Self::new("vlc\n%f")
    }
}
