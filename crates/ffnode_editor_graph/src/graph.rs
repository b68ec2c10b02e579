// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes, sockets and links.
//!
//! Every node and every one of its sockets owns a vertex in a single
//! append-only arena. A node vertex has an edge to each of its output
//! sockets and an edge from each of its input sockets; a link is an edge
//! from an output socket straight to an input socket of another node.
//! Vertex ids are never reused: deletion only clears the validity bit, so
//! ids held by saved files or UI selections stay stable.

use crate::catalog::Filter;
use crate::link::{Link, LinkId};
use crate::node::{FilterNode, NodeId, SocketId};
use crate::resolver::{MediaProbe, NoProbe};
use crate::socket::{MediaKind, Socket};
use std::sync::Arc;

/// Iteration order for [`FilterGraph::node_ids`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeOrder {
    /// Valid nodes in vertex id order
    #[default]
    Default,
    /// Upstream dependencies before the nodes that consume them,
    /// optionally restricted to the dependency closure of `root`
    Topological {
        /// Node whose dependency closure is walked (whole graph if `None`)
        root: Option<NodeId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SocketSlot {
    pub(crate) input: bool,
    pub(crate) index: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub(crate) valid: bool,
    /// `None` for node vertices
    pub(crate) socket: Option<SocketSlot>,
    pub(crate) node_index: usize,
    pub(crate) adj: Vec<usize>,
    pub(crate) rev_adj: Vec<usize>,
}

/// Vertex arena shared by nodes and sockets
#[derive(Debug, Clone, Default)]
pub(crate) struct GraphState {
    pub(crate) vertices: Vec<Vertex>,
    /// Node vertex for each entry of `FilterGraph::nodes`
    pub(crate) node_vertices: Vec<usize>,
}

impl GraphState {
    fn get(&self, id: NodeId) -> Option<(usize, &Vertex)> {
        let v = id.vertex()?;
        self.vertices.get(v).map(|vertex| (v, vertex))
    }

    pub(crate) fn add_vertex(&mut self, node_index: usize, socket: Option<SocketSlot>) -> usize {
        self.vertices.push(Vertex {
            valid: true,
            socket,
            node_index,
            adj: Vec::new(),
            rev_adj: Vec::new(),
        });
        self.vertices.len() - 1
    }

    fn add_edge(&mut self, u: usize, v: usize) -> bool {
        if self.vertices[v].rev_adj.contains(&u) {
            return false;
        }
        self.vertices[v].rev_adj.push(u);
        self.vertices[u].adj.push(v);
        true
    }

    fn delete_edge(&mut self, u: usize, v: usize) {
        self.vertices[v].rev_adj.retain(|&x| x != u);
        self.vertices[u].adj.retain(|&x| x != v);
    }

    /// Invalidate a vertex; a node vertex takes all its sockets with it
    pub(crate) fn delete_vertex(&mut self, u: usize) {
        if self.vertices[u].socket.is_none() {
            let sockets: Vec<usize> = self.vertices[u]
                .adj
                .iter()
                .chain(&self.vertices[u].rev_adj)
                .copied()
                .collect();
            for s in sockets {
                self.delete_vertex(s);
            }
        }
        for v in std::mem::take(&mut self.vertices[u].adj) {
            self.vertices[v].rev_adj.retain(|&x| x != u);
        }
        for v in std::mem::take(&mut self.vertices[u].rev_adj) {
            self.vertices[v].adj.retain(|&x| x != u);
        }
        self.vertices[u].valid = false;
    }

    /// Positionally reconcile a socket list, returning the new socket ids.
    ///
    /// Position `i` keeps its vertex (and link) when both lists have a socket
    /// there of the same kind. Otherwise a fresh vertex is created for the new
    /// socket and the old one is torn down. Reordering same-kind sockets is
    /// therefore invisible here.
    pub(crate) fn update_socket_ids(
        &mut self,
        node_index: usize,
        node_vertex: usize,
        new: &[Socket],
        old: &[Socket],
        old_ids: &[SocketId],
        input: bool,
    ) -> Vec<SocketId> {
        let mut ids = Vec::with_capacity(new.len());
        for i in 0..new.len().max(old.len()) {
            let old_vertex = old.get(i).and(old_ids.get(i)).and_then(|id| id.vertex());
            if let (Some(n), Some(o), Some(_)) = (new.get(i), old.get(i), old_vertex) {
                if n.kind == o.kind {
                    ids.push(old_ids[i]);
                    continue;
                }
            }
            if i < new.len() {
                let s = self.add_vertex(node_index, Some(SocketSlot { input, index: i }));
                if input {
                    self.add_edge(s, node_vertex);
                } else {
                    self.add_edge(node_vertex, s);
                }
                ids.push(NodeId::from_vertex(s));
            }
            if let Some(o) = old_vertex {
                self.delete_vertex(o);
            }
        }
        ids
    }
}

/// An input socket together with its upstream producer
#[derive(Debug, Clone, Copy)]
pub struct InputSocket<'a> {
    /// Position among the node's inputs
    pub index: usize,
    /// Socket definition
    pub socket: &'a Socket,
    /// Socket vertex id
    pub id: SocketId,
    /// Producing output socket, if linked
    pub upstream: Option<SocketId>,
}

/// An output socket of a node
#[derive(Debug, Clone, Copy)]
pub struct OutputSocket<'a> {
    /// Position among the node's outputs
    pub index: usize,
    /// Socket definition
    pub socket: &'a Socket,
    /// Socket vertex id
    pub id: SocketId,
}

/// A filter graph
#[derive(Clone)]
pub struct FilterGraph {
    name: String,
    pub(crate) nodes: Vec<FilterNode>,
    pub(crate) state: GraphState,
    pub(crate) probe: Arc<dyn MediaProbe>,
}

impl std::fmt::Debug for FilterGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterGraph")
            .field("name", &self.name)
            .field("nodes", &self.node_count())
            .field("vertices", &self.state.vertices.len())
            .finish_non_exhaustive()
    }
}

impl FilterGraph {
    /// Create a new empty graph that probes media with `probe`
    pub fn new(name: impl Into<String>, probe: Arc<dyn MediaProbe>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            state: GraphState::default(),
            probe,
        }
    }

    /// Graph name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the graph
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Place a node for `filter` and return its id
    pub fn add_node(&mut self, filter: Arc<Filter>) -> NodeId {
        let node_index = self.nodes.len();
        let node = FilterNode::new(filter.clone());
        let inputs = node.inputs().to_vec();
        let outputs = node.outputs().to_vec();
        self.nodes.push(node);

        let vertex = self.state.add_vertex(node_index, None);
        self.state.node_vertices.push(vertex);
        let input_ids = self.state.update_socket_ids(node_index, vertex, &inputs, &[], &[], true);
        let output_ids = self.state.update_socket_ids(node_index, vertex, &outputs, &[], &[], false);
        self.nodes[node_index].input_ids = input_ids;
        self.nodes[node_index].output_ids = output_ids;

        let id = NodeId::from_vertex(vertex);
        tracing::debug!("Added node {} ({})", id, filter.name);

        if let Some(index) = filter.self_named_option() {
            let default = filter.options[index].default_value.clone();
            self.nodes[node_index].options.insert(index, default.clone());
            self.resolve_sockets(id, index, &default);
        }
        id
    }

    /// Remove a node, its sockets and every link touching them
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some(v) = self.node_vertex(id) else {
            return false;
        };
        self.state.delete_vertex(v);
        tracing::debug!("Deleted node {}", id);
        true
    }

    /// Check if a link between two sockets would be accepted (direction-agnostic)
    pub fn can_add_link(&self, u: SocketId, v: SocketId) -> bool {
        self.orient(u, v).is_some()
    }

    /// Link two sockets; returns [`LinkId::INVALID`] when refused
    pub fn add_link(&mut self, u: SocketId, v: SocketId) -> LinkId {
        let Some((src, dest)) = self.orient(u, v) else {
            return LinkId::INVALID;
        };
        if !self.state.add_edge(src, dest) {
            return LinkId::INVALID;
        }
        let id = LinkId::pack(src, dest);
        tracing::debug!("Linked {} -> {}", NodeId::from_vertex(src), NodeId::from_vertex(dest));
        id
    }

    /// Remove a link
    pub fn delete_link(&mut self, id: LinkId) -> bool {
        let Some((src, dest)) = id.unpack() else {
            return false;
        };
        let linked = self
            .state
            .vertices
            .get(dest)
            .is_some_and(|vertex| vertex.socket.is_some() && vertex.rev_adj.contains(&src))
            && self.state.vertices.get(src).is_some_and(|vertex| vertex.socket.is_some());
        if !linked {
            return false;
        }
        self.state.delete_edge(src, dest);
        true
    }

    /// Resolve the producer/consumer orientation of a prospective link
    fn orient(&self, u: SocketId, v: SocketId) -> Option<(usize, usize)> {
        let (mut u, uv) = self.state.get(u)?;
        let (mut v, vv) = self.state.get(v)?;
        if uv.node_index == vv.node_index {
            return None;
        }
        let us = self.socket_at(u)?;
        let vs = self.socket_at(v)?;
        let (u_slot, v_slot) = (uv.socket?, vv.socket?);
        if u_slot.input == v_slot.input || !us.can_connect(vs) {
            return None;
        }
        if u_slot.input {
            std::mem::swap(&mut u, &mut v);
        }
        if !self.state.vertices[v].rev_adj.is_empty() {
            return None;
        }
        Some((u, v))
    }

    fn socket_at(&self, v: usize) -> Option<&Socket> {
        let vertex = self.state.vertices.get(v)?;
        if !vertex.valid {
            return None;
        }
        let slot = vertex.socket?;
        let node = &self.nodes[vertex.node_index];
        if slot.input {
            node.inputs().get(slot.index)
        } else {
            node.outputs().get(slot.index)
        }
    }

    /// Vertex of a valid node (not a socket)
    pub(crate) fn node_vertex(&self, id: NodeId) -> Option<usize> {
        let (v, vertex) = self.state.get(id)?;
        (vertex.valid && vertex.socket.is_none()).then_some(v)
    }

    /// Check if an id refers to a live node or socket
    pub fn is_valid(&self, id: NodeId) -> bool {
        self.state.get(id).is_some_and(|(_, vertex)| vertex.valid)
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&FilterNode> {
        let v = self.node_vertex(id)?;
        self.nodes.get(self.state.vertices[v].node_index)
    }

    /// Rename a node
    pub fn rename_node(&mut self, id: NodeId, name: impl Into<String>) -> bool {
        let Some(v) = self.node_vertex(id) else {
            return false;
        };
        let index = self.state.vertices[v].node_index;
        self.nodes[index].name = name.into();
        true
    }

    /// Socket definition behind a socket id
    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        self.socket_at(id.vertex()?)
    }

    /// Media kind of a socket
    pub fn socket_kind(&self, id: SocketId) -> Option<MediaKind> {
        self.socket(id).map(|s| s.kind)
    }

    /// Node owning a socket
    pub fn owner(&self, id: SocketId) -> Option<NodeId> {
        let (_, vertex) = self.state.get(id)?;
        vertex.socket?;
        if !vertex.valid {
            return None;
        }
        let v = *self.state.node_vertices.get(vertex.node_index)?;
        Some(NodeId::from_vertex(v))
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.state
            .vertices
            .iter()
            .filter(|v| v.valid && v.socket.is_none())
            .count()
    }

    /// Number of links
    pub fn link_count(&self) -> usize {
        self.links().count()
    }

    /// Set an option value and re-derive the node's sockets
    pub fn set_option(&mut self, id: NodeId, index: usize, value: impl Into<String>) -> bool {
        let Some(v) = self.node_vertex(id) else {
            return false;
        };
        let node = &mut self.nodes[self.state.vertices[v].node_index];
        if node.filter().option(index).is_none() {
            return false;
        }
        let value = value.into();
        node.options.insert(index, value.clone());
        self.resolve_sockets(id, index, &value);
        true
    }

    /// Unset an option and re-derive the node's sockets from its default
    pub fn clear_option(&mut self, id: NodeId, index: usize) -> bool {
        let Some(v) = self.node_vertex(id) else {
            return false;
        };
        let node = &mut self.nodes[self.state.vertices[v].node_index];
        let Some(default) = node.filter().option(index).map(|o| o.default_value.clone()) else {
            return false;
        };
        node.options.remove(&index);
        self.resolve_sockets(id, index, &default);
        true
    }

    /// Node ids in the requested order
    pub fn node_ids(&self, order: NodeOrder) -> Vec<NodeId> {
        match order {
            NodeOrder::Default => self
                .state
                .vertices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.valid && v.socket.is_none())
                .map(|(i, _)| NodeId::from_vertex(i))
                .collect(),
            NodeOrder::Topological { root } => self.topological_order(root),
        }
    }

    /// Nodes in the requested order
    pub fn nodes(&self, order: NodeOrder) -> impl Iterator<Item = (NodeId, &FilterNode)> {
        self.node_ids(order)
            .into_iter()
            .filter_map(move |id| self.node(id).map(|node| (id, node)))
    }

    fn topological_order(&self, root: Option<NodeId>) -> Vec<NodeId> {
        let mut marked = vec![false; self.state.vertices.len()];
        let mut order = Vec::new();
        let starts = match root {
            Some(root) => match root.vertex() {
                Some(v) if v < marked.len() => v..v + 1,
                _ => return order,
            },
            None => 0..marked.len(),
        };
        for v in starts {
            if !marked[v] {
                self.visit(v, &mut marked, &mut order);
            }
        }
        order
    }

    fn visit(&self, v: usize, marked: &mut [bool], order: &mut Vec<NodeId>) {
        marked[v] = true;
        let vertex = &self.state.vertices[v];
        if !vertex.valid {
            return;
        }
        // Visit everything this vertex depends on first
        for &u in &vertex.rev_adj {
            if !marked[u] {
                self.visit(u, marked, order);
            }
        }
        if vertex.socket.is_none() {
            order.push(NodeId::from_vertex(v));
        }
    }

    /// All links, ordered by consuming socket
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.state
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, vertex)| vertex.valid && vertex.socket.is_some())
            .flat_map(move |(dest, vertex)| {
                vertex
                    .rev_adj
                    .iter()
                    .filter(move |&&src| self.state.vertices[src].socket.is_some())
                    .map(move |&src| Link {
                        id: LinkId::pack(src, dest),
                        src: NodeId::from_vertex(src),
                        dest: NodeId::from_vertex(dest),
                    })
            })
    }

    /// Input sockets of a node with their upstream producers
    pub fn input_sockets(&self, id: NodeId) -> impl Iterator<Item = InputSocket<'_>> {
        let node = self.node(id);
        node.into_iter().flat_map(move |node| {
            node.inputs()
                .iter()
                .zip(node.input_ids())
                .enumerate()
                .map(move |(index, (socket, &sid))| InputSocket {
                    index,
                    socket,
                    id: sid,
                    upstream: sid
                        .vertex()
                        .and_then(|v| self.state.vertices[v].rev_adj.first())
                        .map(|&u| NodeId::from_vertex(u)),
                })
        })
    }

    /// Output sockets of a node
    pub fn output_sockets(&self, id: NodeId) -> impl Iterator<Item = OutputSocket<'_>> {
        let node = self.node(id);
        node.into_iter().flat_map(|node| {
            node.outputs()
                .iter()
                .zip(node.output_ids())
                .enumerate()
                .map(|(index, (socket, &sid))| OutputSocket { index, socket, id: sid })
        })
    }

    /// Remove every node and link
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.state = GraphState::default();
    }
}

impl Default for FilterGraph {
    fn default() -> Self {
        Self::new("Untitled", Arc::new(NoProbe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, FilterOption};

    fn catalog() -> Catalog {
        let mut scale = Filter::new("scale", "Scale the input video size");
        scale.inputs.push(Socket::new("default", MediaKind::Video));
        scale.outputs.push(Socket::new("default", MediaKind::Video));
        scale.options.push(FilterOption::new("width", "", "string"));

        let mut overlay = Filter::new("overlay", "Overlay a video source on top of the input");
        overlay.inputs.push(Socket::new("main", MediaKind::Video));
        overlay.inputs.push(Socket::new("overlay", MediaKind::Video));
        overlay.outputs.push(Socket::new("default", MediaKind::Video));

        let mut volume = Filter::new("volume", "Change input volume");
        volume.inputs.push(Socket::new("default", MediaKind::Audio));
        volume.outputs.push(Socket::new("default", MediaKind::Audio));

        let mut testsrc = Filter::new("testsrc", "Generate test pattern");
        testsrc.outputs.push(Socket::new("default", MediaKind::Video));

        Catalog::from_filters(vec![scale, overlay, volume, testsrc])
    }

    fn add(graph: &mut FilterGraph, catalog: &Catalog, name: &str) -> NodeId {
        graph.add_node(catalog.get(name).unwrap().clone())
    }

    fn input(graph: &FilterGraph, id: NodeId, i: usize) -> SocketId {
        graph.node(id).unwrap().input_ids()[i]
    }

    fn output(graph: &FilterGraph, id: NodeId, i: usize) -> SocketId {
        graph.node(id).unwrap().output_ids()[i]
    }

    #[test]
    fn test_add_node_allocates_socket_vertices() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let scale = add(&mut graph, &catalog, "scale");
        assert_eq!(scale, NodeId(1));
        assert_eq!(input(&graph, scale, 0), NodeId(2));
        assert_eq!(output(&graph, scale, 0), NodeId(3));
        assert_eq!(graph.owner(NodeId(2)), Some(scale));
        assert!(graph.node(NodeId(2)).is_none());
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_link_is_direction_agnostic() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let src = add(&mut graph, &catalog, "testsrc");
        let scale = add(&mut graph, &catalog, "scale");

        let out = output(&graph, src, 0);
        let inp = input(&graph, scale, 0);
        assert!(graph.can_add_link(inp, out));
        let id = graph.add_link(inp, out);
        assert!(id.is_valid());

        let links: Vec<_> = graph.links().collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].src, out);
        assert_eq!(links[0].dest, inp);
        assert_eq!(links[0].id, id);
    }

    #[test]
    fn test_single_producer_per_consumer() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let a = add(&mut graph, &catalog, "testsrc");
        let b = add(&mut graph, &catalog, "testsrc");
        let scale = add(&mut graph, &catalog, "scale");
        let inp = input(&graph, scale, 0);

        assert!(graph.add_link(output(&graph, a, 0), inp).is_valid());
        assert!(!graph.can_add_link(output(&graph, b, 0), inp));
        assert_eq!(graph.add_link(output(&graph, b, 0), inp), LinkId::INVALID);
        assert_eq!(graph.link_count(), 1);
        let upstream: Vec<_> = graph.input_sockets(scale).map(|s| s.upstream).collect();
        assert_eq!(upstream, vec![Some(output(&graph, a, 0))]);
    }

    #[test]
    fn test_output_fans_out() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let src = add(&mut graph, &catalog, "testsrc");
        let overlay = add(&mut graph, &catalog, "overlay");
        let out = output(&graph, src, 0);
        assert!(graph.add_link(out, input(&graph, overlay, 0)).is_valid());
        assert!(graph.add_link(out, input(&graph, overlay, 1)).is_valid());
        assert_eq!(graph.link_count(), 2);
    }

    #[test]
    fn test_link_refusals() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let scale = add(&mut graph, &catalog, "scale");
        let other = add(&mut graph, &catalog, "scale");
        let volume = add(&mut graph, &catalog, "volume");

        // same node
        assert!(!graph.can_add_link(output(&graph, scale, 0), input(&graph, scale, 0)));
        // two inputs
        assert!(!graph.can_add_link(input(&graph, other, 0), input(&graph, scale, 0)));
        // kind mismatch
        assert!(!graph.can_add_link(output(&graph, scale, 0), input(&graph, volume, 0)));
        // node vertices are not sockets
        assert!(!graph.can_add_link(scale, other));
        // unknown ids
        assert!(!graph.can_add_link(NodeId::INVALID, NodeId(999)));
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_delete_link() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let src = add(&mut graph, &catalog, "testsrc");
        let scale = add(&mut graph, &catalog, "scale");
        let id = graph.add_link(output(&graph, src, 0), input(&graph, scale, 0));

        assert!(graph.delete_link(id));
        assert_eq!(graph.link_count(), 0);
        assert!(!graph.delete_link(id));
        assert!(!graph.delete_link(LinkId::INVALID));
        // consumer accepts a new producer again
        assert!(graph.can_add_link(output(&graph, src, 0), input(&graph, scale, 0)));
    }

    #[test]
    fn test_delete_node_cascades() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let src = add(&mut graph, &catalog, "testsrc");
        let scale = add(&mut graph, &catalog, "scale");
        let sink = add(&mut graph, &catalog, "scale");
        let scale_in = input(&graph, scale, 0);
        let scale_out = output(&graph, scale, 0);
        graph.add_link(output(&graph, src, 0), scale_in);
        graph.add_link(scale_out, input(&graph, sink, 0));

        assert!(graph.delete_node(scale));
        assert!(!graph.delete_node(scale));
        assert_eq!(graph.link_count(), 0);
        assert!(!graph.is_valid(scale));
        assert!(!graph.is_valid(scale_in));
        assert!(!graph.is_valid(scale_out));
        assert_eq!(graph.node_ids(NodeOrder::Default), vec![src, sink]);
        let topo = graph.node_ids(NodeOrder::Topological { root: None });
        assert!(!topo.contains(&scale));
        assert_eq!(graph.input_sockets(sink).next().unwrap().upstream, None);

        // ids are not reused
        let again = add(&mut graph, &catalog, "scale");
        assert!(again.0 > sink.0);
    }

    #[test]
    fn test_topological_order_respects_dependencies() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        // Add consumers before producers so id order differs from dependency order
        let overlay = add(&mut graph, &catalog, "overlay");
        let scale = add(&mut graph, &catalog, "scale");
        let a = add(&mut graph, &catalog, "testsrc");
        let b = add(&mut graph, &catalog, "testsrc");
        graph.add_link(output(&graph, a, 0), input(&graph, scale, 0));
        graph.add_link(output(&graph, scale, 0), input(&graph, overlay, 0));
        graph.add_link(output(&graph, b, 0), input(&graph, overlay, 1));

        let order = graph.node_ids(NodeOrder::Topological { root: None });
        assert_eq!(order.len(), 4);
        let pos = |id| order.iter().position(|&x| x == id).unwrap();
        for link in graph.links() {
            let producer = graph.owner(link.src).unwrap();
            let consumer = graph.owner(link.dest).unwrap();
            assert!(pos(producer) < pos(consumer));
        }
    }

    #[test]
    fn test_topological_root_closure() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let a = add(&mut graph, &catalog, "testsrc");
        let scale = add(&mut graph, &catalog, "scale");
        let unrelated = add(&mut graph, &catalog, "testsrc");
        graph.add_link(output(&graph, a, 0), input(&graph, scale, 0));

        let order = graph.node_ids(NodeOrder::Topological { root: Some(scale) });
        assert_eq!(order, vec![a, scale]);
        assert!(!order.contains(&unrelated));
        assert!(graph
            .node_ids(NodeOrder::Topological { root: Some(NodeId(999)) })
            .is_empty());
    }

    #[test]
    fn test_clear() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        add(&mut graph, &catalog, "scale");
        graph.clear();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(add(&mut graph, &catalog, "scale"), NodeId(1));
    }
}
