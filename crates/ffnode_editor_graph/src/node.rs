// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the filter graph.

use crate::catalog::Filter;
use crate::socket::Socket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Handle to a graph vertex: a placed node or one of its sockets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Socket handles share the vertex id space with nodes
pub type SocketId = NodeId;

impl NodeId {
    /// Sentinel for "no vertex"
    pub const INVALID: NodeId = NodeId(0);

    pub(crate) fn from_vertex(vertex: usize) -> Self {
        Self(vertex as u32 + 1)
    }

    pub(crate) fn vertex(self) -> Option<usize> {
        self.0.checked_sub(1).map(|v| v as usize)
    }

    /// Check for the sentinel
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A filter placed in the graph
#[derive(Debug, Clone)]
pub struct FilterNode {
    filter: Arc<Filter>,
    /// Display name (defaults to the filter name)
    pub name: String,
    /// Explicitly set option values by option index
    pub(crate) options: BTreeMap<usize, String>,
    /// Socket vertices, positionally matching [`FilterNode::inputs`]
    pub(crate) input_ids: Vec<SocketId>,
    /// Socket vertices, positionally matching [`FilterNode::outputs`]
    pub(crate) output_ids: Vec<SocketId>,
    input_override: Option<Vec<Socket>>,
    output_override: Option<Vec<Socket>>,
}

impl FilterNode {
    /// Create a new node from a catalog entry
    pub fn new(filter: Arc<Filter>) -> Self {
        let input_override = filter.dynamic_input.then(Vec::new);
        let output_override = filter.dynamic_output.then(Vec::new);
        Self {
            name: filter.name.clone(),
            filter,
            options: BTreeMap::new(),
            input_ids: Vec::new(),
            output_ids: Vec::new(),
            input_override,
            output_override,
        }
    }

    /// The catalog entry this node was placed from
    pub fn filter(&self) -> &Arc<Filter> {
        &self.filter
    }

    /// Effective input sockets
    pub fn inputs(&self) -> &[Socket] {
        self.input_override.as_deref().unwrap_or(&self.filter.inputs)
    }

    /// Effective output sockets
    pub fn outputs(&self) -> &[Socket] {
        self.output_override.as_deref().unwrap_or(&self.filter.outputs)
    }

    /// Socket vertex ids for the inputs
    pub fn input_ids(&self) -> &[SocketId] {
        &self.input_ids
    }

    /// Socket vertex ids for the outputs
    pub fn output_ids(&self) -> &[SocketId] {
        &self.output_ids
    }

    /// Explicitly set option values, ordered by option index
    pub fn options(&self) -> impl Iterator<Item = (usize, &str)> {
        self.options.iter().map(|(i, v)| (*i, v.as_str()))
    }

    /// Value of an option if it was set
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(&index).map(String::as_str)
    }

    /// Value of an option looked up by name
    pub fn option_by_name(&self, name: &str) -> Option<&str> {
        self.filter.option_index(name).and_then(|i| self.option(i))
    }

    pub(crate) fn set_inputs(&mut self, sockets: Vec<Socket>) {
        self.input_override = Some(sockets);
    }

    pub(crate) fn set_outputs(&mut self, sockets: Vec<Socket>) {
        self.output_override = Some(sockets);
    }
}
