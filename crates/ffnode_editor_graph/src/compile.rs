// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compilation of a graph into transcoder arguments.
//!
//! Nodes are visited in dependency order. Source nodes contribute `-i`
//! inputs whose streams are addressed as `[file:stream]`; every other
//! filter becomes one `filter@name{seq}=k=v:k=v` clause whose outputs get
//! synthetic `[sN]` labels (N being the output socket id). Sink nodes
//! emit nothing and instead bind the labels they consume to a file.

use crate::catalog::FILENAME_OPTION;
use crate::graph::{FilterGraph, NodeOrder};
use crate::node::{FilterNode, NodeId, SocketId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A stream label inside the filter expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadLabel {
    /// Stream `socket` of input file `input`
    Stream {
        /// Index of the `-i` argument
        input: usize,
        /// Stream index within that file
        socket: usize,
    },
    /// Output of a filter clause, keyed by the producing socket
    Synthetic(SocketId),
}

impl PadLabel {
    /// Argument for `-map`
    pub fn map_arg(&self) -> String {
        match self {
            Self::Stream { input, socket } => format!("{input}:{socket}"),
            Self::Synthetic(_) => self.to_string(),
        }
    }
}

impl fmt::Display for PadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream { input, socket } => write!(f, "[{input}:{socket}]"),
            Self::Synthetic(id) => write!(f, "[s{id}]"),
        }
    }
}

/// Where a final stream goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMapping {
    /// Stream to map
    pub label: PadLabel,
    /// Destination file; `None` for dangling outputs (previewed)
    pub path: Option<String>,
}

/// Transcoder invocation pieces for a graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledGraph {
    /// Input file paths, in `-i` order
    pub inputs: Vec<String>,
    /// The `-filter_complex` expression (empty if there are no filters)
    pub filter_graph: String,
    /// Final streams
    pub outputs: Vec<OutputMapping>,
}

impl CompiledGraph {
    /// Labels with no destination file
    pub fn preview_outputs(&self) -> impl Iterator<Item = &OutputMapping> {
        self.outputs.iter().filter(|o| o.path.is_none())
    }

    /// Transcoder arguments writing every file-bound stream to its file
    pub fn render_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.clone());
        }
        if !self.filter_graph.is_empty() {
            args.push("-filter_complex".to_string());
            args.push(self.filter_graph.clone());
        }
        let mut files: Vec<&str> = Vec::new();
        for path in self.outputs.iter().filter_map(|o| o.path.as_deref()) {
            if !files.contains(&path) {
                files.push(path);
            }
        }
        for file in files {
            for output in self.outputs.iter().filter(|o| o.path.as_deref() == Some(file)) {
                args.push("-map".to_string());
                args.push(output.label.map_arg());
            }
            args.push(file.to_string());
        }
        args
    }
}

/// Error while compiling a graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// An input socket has no producer
    #[error("Input `{socket}` of node `{node}` is not connected")]
    MissingInput {
        /// Socket name or position
        socket: String,
        /// Node name
        node: String,
    },

    /// A source node has no file to read
    #[error("Node `{node}` has no filename")]
    MissingFilename {
        /// Node name
        node: String,
    },

    /// A producer was reached after its consumer
    #[error("Graph contains a cycle through node `{node}`")]
    Cycle {
        /// Node name
        node: String,
    },

    /// Requested root is not a node of the graph
    #[error("Node {0} does not exist")]
    UnknownRoot(NodeId),
}

impl FilterGraph {
    /// Compile the whole graph, or only what `root` depends on
    pub fn compile(&self, root: Option<NodeId>) -> Result<CompiledGraph, CompileError> {
        if let Some(root) = root {
            if self.node(root).is_none() {
                return Err(CompileError::UnknownRoot(root));
            }
        }

        let mut compiled = CompiledGraph::default();
        let mut labels: HashMap<SocketId, PadLabel> = HashMap::new();
        let mut dangling: BTreeMap<SocketId, PadLabel> = BTreeMap::new();
        let mut clauses = Vec::new();

        for (id, node) in self.nodes(NodeOrder::Topological { root }) {
            let filter = node.filter();
            let mut consumed = Vec::new();
            for input in self.input_sockets(id) {
                // Sink inputs are optional stream slots
                if input.upstream.is_none() && filter.is_output() {
                    continue;
                }
                let Some(src) = input.upstream else {
                    let socket = if input.socket.name.is_empty() {
                        format!("#{}", input.index)
                    } else {
                        input.socket.name.clone()
                    };
                    return Err(CompileError::MissingInput {
                        socket,
                        node: node.name.clone(),
                    });
                };
                let Some(&label) = labels.get(&src) else {
                    return Err(CompileError::Cycle {
                        node: node.name.clone(),
                    });
                };
                dangling.remove(&src);
                consumed.push(label);
            }

            if filter.is_input() {
                let path = node
                    .option_by_name(FILENAME_OPTION)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| CompileError::MissingFilename {
                        node: node.name.clone(),
                    })?;
                let input = compiled.inputs.len();
                compiled.inputs.push(path.to_string());
                for output in self.output_sockets(id) {
                    labels.insert(
                        output.id,
                        PadLabel::Stream {
                            input,
                            socket: output.index,
                        },
                    );
                }
            } else if filter.is_output() {
                let path = node
                    .option_by_name(FILENAME_OPTION)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);
                compiled
                    .outputs
                    .extend(consumed.into_iter().map(|label| OutputMapping {
                        label,
                        path: path.clone(),
                    }));
            } else {
                let mut clause: String = consumed.iter().map(PadLabel::to_string).collect();
                clause.push_str(&filter_clause(node, clauses.len() + 1));
                for output in self.output_sockets(id) {
                    let label = PadLabel::Synthetic(output.id);
                    labels.insert(output.id, label);
                    dangling.insert(output.id, label);
                    clause.push_str(&label.to_string());
                }
                clauses.push(clause);
            }
        }

        compiled.filter_graph = clauses.join(";");
        compiled
            .outputs
            .extend(dangling.into_values().map(|label| OutputMapping { label, path: None }));
        tracing::info!(
            "Compiled {} inputs, {} clauses, {} outputs",
            compiled.inputs.len(),
            clauses.len(),
            compiled.outputs.len()
        );
        Ok(compiled)
    }
}

/// `filter@name{seq}` followed by `=k=v:k=v` when options are set.
///
/// `seq` is the clause's 1-based position, so the first `scale` node
/// named `scale` becomes `scale@scale1` whatever its vertex id is.
fn filter_clause(node: &FilterNode, seq: usize) -> String {
    let filter = node.filter();
    let mut clause = format!("{}@{}{}", filter.name, instance_name(node), seq);
    let args: Vec<String> = node
        .options()
        .filter_map(|(i, value)| {
            let option = filter.option(i)?;
            Some(format!("{}={}", option.name, escape_value(value)))
        })
        .collect();
    if !args.is_empty() {
        clause.push('=');
        clause.push_str(&escape_description(&args.join(":")));
    }
    clause
}

/// Display name reduced to characters valid in a filter instance id
fn instance_name(node: &FilterNode) -> String {
    let name = if node.name.is_empty() { &node.filter().name } else { &node.name };
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// First escaping level: a single option value
fn escape_value(value: &str) -> String {
    escape(value, &['\\', '\'', ':'])
}

/// Second escaping level: the argument list inside the graph description
fn escape_description(args: &str) -> String {
    escape(args, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
