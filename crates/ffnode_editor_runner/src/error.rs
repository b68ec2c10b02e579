// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for subprocess orchestration.

use std::time::Duration;

/// Error while previewing a graph
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// A subprocess could not be started
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The staging directory could not be prepared
    #[error("Failed to prepare staged output: {0}")]
    Staging(#[from] std::io::Error),

    /// The transcoder exited before producing output
    #[error("Transcoder failed (exit code {code:?}): {diagnostics}")]
    TranscoderFailure {
        /// Exit code, `None` if killed by a signal
        code: Option<i32>,
        /// Captured diagnostic output
        diagnostics: String,
    },

    /// The transcoder produced no output before the startup deadline
    #[error("Transcoder produced no output after {waited:?}: {diagnostics}")]
    StartupTimeout {
        /// Time spent waiting
        waited: Duration,
        /// Captured diagnostic output
        diagnostics: String,
    },

    /// The viewer exited unsuccessfully
    #[error("Viewer failed (exit code {code:?})")]
    ViewerFailure {
        /// Exit code, `None` if killed by a signal
        code: Option<i32>,
    },

    /// The viewer template has no program line
    #[error("Viewer command is empty")]
    EmptyViewerCommand,
}

/// Error from the structured media probe
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The prober could not be started
    #[error("Failed to start prober: {0}")]
    Spawn(#[from] std::io::Error),

    /// The prober exited unsuccessfully
    #[error("Prober exited with code {0:?}")]
    Failed(Option<i32>),

    /// The prober's report could not be parsed
    #[error("Malformed probe report: {0}")]
    Json(#[from] serde_json::Error),
}
