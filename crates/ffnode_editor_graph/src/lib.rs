// SPDX-License-Identifier: MIT OR Apache-2.0
//! Filter graph model for the ffnode editor.
//!
//! This crate provides the editable graph behind the editor:
//! - The filter catalog nodes are placed from
//! - Nodes with typed sockets, linked output to input
//! - Socket resolution for filters whose sockets depend on options
//! - Compilation into transcoder command-line pieces
//! - Saving and restoring graphs as JSON documents
//!
//! ## Architecture
//!
//! Nodes and sockets share one append-only vertex arena. Ids are handed
//! out once and never reused, so they can be stored in documents and UI
//! state. Media probing is abstracted behind [`MediaProbe`] so the graph
//! never spawns processes itself.

pub mod catalog;
pub mod compile;
pub mod document;
pub mod graph;
pub mod link;
pub mod node;
pub mod resolver;
pub mod socket;

pub use catalog::{Catalog, CatalogError, Filter, FilterOption, OptionKind};
pub use compile::{CompileError, CompiledGraph, OutputMapping, PadLabel};
pub use document::{CatalogLookupFailure, DocumentError, GraphDocument, LoadReport};
pub use graph::{FilterGraph, InputSocket, NodeOrder, OutputSocket};
pub use link::{Link, LinkId};
pub use node::{FilterNode, NodeId, SocketId};
pub use resolver::{MediaProbe, NoProbe, MAX_DYNAMIC_SOCKETS};
pub use socket::{MediaKind, Socket};
