// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor-level errors.

use ffnode_editor_graph::{CatalogError, CompileError, DocumentError};
use ffnode_editor_runner::PlaybackError;

/// Error surfaced by an editor command
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The filter catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A graph document could not be read or written
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The graph could not be compiled
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Preview failed
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Preferences could not be read or written
    #[error("Preferences error: {0}")]
    Preferences(#[source] std::io::Error),

    /// Save requested before the graph has a file
    #[error("Graph has no document path, use save-as")]
    NoDocument,
}
