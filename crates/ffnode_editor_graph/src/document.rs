// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph documents: the JSON form a graph is saved to and restored from.
//!
//! Loading replays the document through the normal editing operations
//! (place node, set options, link) so sockets are re-derived by the
//! resolver exactly as they were when the graph was edited. Socket ids
//! stored in the file are remapped positionally onto the fresh ids.

use crate::catalog::Catalog;
use crate::graph::{FilterGraph, NodeOrder};
use crate::node::{NodeId, SocketId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A saved option value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Option name
    pub key: String,
    /// Option value
    pub value: String,
}

/// A saved link into one of the node's inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEntry {
    /// Producing socket
    pub src: SocketId,
    /// Consuming socket (one of the node's inputs)
    pub dest: SocketId,
}

/// A saved node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Node id at save time
    pub id: NodeId,
    /// Catalog filter name
    pub filter: String,
    /// Display name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Explicitly set options
    #[serde(default)]
    pub options: Vec<OptionEntry>,
    /// Input socket ids at save time
    #[serde(default)]
    pub inputs: Vec<SocketId>,
    /// Output socket ids at save time
    #[serde(default)]
    pub outputs: Vec<SocketId>,
    /// Incoming links
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
}

/// A saved graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Graph name
    #[serde(default)]
    pub name: String,
    /// Nodes in id order
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
}

impl GraphDocument {
    /// Read a document from disk
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the document to disk
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("Saved graph {:?} to {:?}", self.name, path);
        Ok(())
    }
}

/// A node skipped on load because its filter is unknown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Filter `{filter}` (node {node}) is not in the catalog")]
pub struct CatalogLookupFailure {
    /// Missing filter name
    pub filter: String,
    /// Id of the skipped node in the document
    pub node: NodeId,
}

/// What could not be restored when loading a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Nodes whose filter is missing from the catalog
    pub missing_filters: Vec<CatalogLookupFailure>,
    /// Options the filter no longer has
    pub unknown_options: Vec<String>,
    /// Links that could not be re-established
    pub dropped_links: Vec<EdgeEntry>,
}

impl LoadReport {
    /// Check if everything was restored
    pub fn is_clean(&self) -> bool {
        self.missing_filters.is_empty()
            && self.unknown_options.is_empty()
            && self.dropped_links.is_empty()
    }
}

/// Error reading or writing a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// File could not be read or written
    #[error("Document I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid graph document
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilterGraph {
    /// Snapshot the graph as a document
    pub fn to_document(&self) -> GraphDocument {
        let nodes = self
            .nodes(NodeOrder::Default)
            .map(|(id, node)| {
                let filter = node.filter();
                NodeEntry {
                    id,
                    filter: filter.name.clone(),
                    name: if node.name == filter.name {
                        String::new()
                    } else {
                        node.name.clone()
                    },
                    options: node
                        .options()
                        .filter_map(|(i, value)| {
                            Some(OptionEntry {
                                key: filter.option(i)?.name.clone(),
                                value: value.to_string(),
                            })
                        })
                        .collect(),
                    inputs: node.input_ids().to_vec(),
                    outputs: node.output_ids().to_vec(),
                    edges: self
                        .input_sockets(id)
                        .filter_map(|input| {
                            Some(EdgeEntry {
                                src: input.upstream?,
                                dest: input.id,
                            })
                        })
                        .collect(),
                }
            })
            .collect();
        GraphDocument {
            name: self.name().to_string(),
            nodes,
        }
    }

    /// Replace the graph's contents with a document
    pub fn load_document(&mut self, document: &GraphDocument, catalog: &Catalog) -> LoadReport {
        self.clear();
        self.set_name(document.name.clone());

        let mut report = LoadReport::default();
        let mut remap: HashMap<SocketId, SocketId> = HashMap::new();

        for entry in &document.nodes {
            let Some(filter) = catalog.get(&entry.filter) else {
                tracing::warn!("Skipping node {}: unknown filter {}", entry.id, entry.filter);
                report.missing_filters.push(CatalogLookupFailure {
                    filter: entry.filter.clone(),
                    node: entry.id,
                });
                continue;
            };
            let id = self.add_node(filter.clone());
            if !entry.name.is_empty() {
                self.rename_node(id, entry.name.clone());
            }
            for option in &entry.options {
                match filter.option_index(&option.key) {
                    Some(index) => {
                        self.set_option(id, index, option.value.clone());
                    }
                    None => {
                        tracing::warn!("Filter {} has no option {}", filter.name, option.key);
                        report
                            .unknown_options
                            .push(format!("{}.{}", entry.filter, option.key));
                    }
                }
            }
            if let Some(node) = self.node(id) {
                remap.extend(entry.inputs.iter().copied().zip(node.input_ids().iter().copied()));
                remap.extend(entry.outputs.iter().copied().zip(node.output_ids().iter().copied()));
            }
        }

        for edge in document.nodes.iter().flat_map(|n| &n.edges) {
            let linked = match (remap.get(&edge.src), remap.get(&edge.dest)) {
                (Some(&src), Some(&dest)) => self.add_link(src, dest).is_valid(),
                _ => false,
            };
            if !linked {
                tracing::warn!("Dropping link {} -> {}", edge.src, edge.dest);
                report.dropped_links.push(*edge);
            }
        }

        tracing::info!(
            "Loaded graph {:?}: {} nodes, {} links",
            self.name(),
            self.node_count(),
            self.link_count()
        );
        report
    }
}
