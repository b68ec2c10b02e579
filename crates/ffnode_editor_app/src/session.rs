// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session: one graph, the catalog it is built from, and its file.

use crate::error::EditorError;
use ffnode_editor_graph::{Catalog, CompiledGraph, FilterGraph, GraphDocument, LoadReport, NodeId};
use ffnode_editor_runner::{PlaybackOutcome, Runner};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An open graph document
pub struct EditorSession {
    catalog: Arc<Catalog>,
    runner: Arc<Runner>,
    graph: FilterGraph,
    path: Option<PathBuf>,
}

impl EditorSession {
    /// Start with an empty, unsaved graph
    pub fn new(catalog: Arc<Catalog>, runner: Arc<Runner>) -> Self {
        let graph = FilterGraph::new("Untitled", runner.clone());
        Self {
            catalog,
            runner,
            graph,
            path: None,
        }
    }

    /// Filter catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current graph
    pub fn graph(&self) -> &FilterGraph {
        &self.graph
    }

    /// Current graph, for editing
    pub fn graph_mut(&mut self) -> &mut FilterGraph {
        &mut self.graph
    }

    /// File the graph was opened from or last saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace the current graph with the document at `path`
    pub fn open(&mut self, path: &Path) -> Result<LoadReport, EditorError> {
        let document = GraphDocument::load(path)?;
        let report = self.graph.load_document(&document, &self.catalog);
        if !report.is_clean() {
            tracing::warn!("Opened {:?} with problems: {:?}", path, report);
        }
        self.path = Some(path.to_path_buf());
        Ok(report)
    }

    /// Save to the current document path
    pub fn save(&self) -> Result<(), EditorError> {
        let path = self.path.as_deref().ok_or(EditorError::NoDocument)?;
        self.graph.to_document().save(path)?;
        Ok(())
    }

    /// Save to `path` and make it the document path
    pub fn save_as(&mut self, path: &Path) -> Result<(), EditorError> {
        self.graph.to_document().save(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Compile the graph, or only what `root` depends on
    pub fn compile(&self, root: Option<NodeId>) -> Result<CompiledGraph, EditorError> {
        Ok(self.graph.compile(root)?)
    }

    /// Compile and preview in the viewer
    pub fn play(&self, root: Option<NodeId>) -> Result<PlaybackOutcome, EditorError> {
        let compiled = self.compile(root)?;
        Ok(self.runner.play(&compiled)?)
    }
}
