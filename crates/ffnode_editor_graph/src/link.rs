// SPDX-License-Identifier: MIT OR Apache-2.0
//! Link (edge) definitions for the graph.
//!
//! A [`LinkId`] packs the ordered pair of socket vertices it joins, so a
//! link can be deleted from its id alone without a side table.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

const LINK_ID_SHIFT: u32 = u32::BITS;
const LINK_ID_MASK: u64 = (1 << LINK_ID_SHIFT) - 1;

/// Unique identifier for a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u64);

impl LinkId {
    /// Sentinel returned when a link is refused
    pub const INVALID: LinkId = LinkId(0);

    /// Encode the producer/consumer vertex pair
    pub(crate) fn pack(src: usize, dest: usize) -> Self {
        Self(((src as u64) << LINK_ID_SHIFT) + dest as u64 + 1)
    }

    /// Decode back to the producer/consumer vertex pair
    pub(crate) fn unpack(self) -> Option<(usize, usize)> {
        let raw = self.0.checked_sub(1)?;
        Some(((raw >> LINK_ID_SHIFT) as usize, (raw & LINK_ID_MASK) as usize))
    }

    /// Check for the refusal sentinel
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

/// A link between two sockets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link ID
    pub id: LinkId,
    /// Producing (output-side) socket
    pub src: NodeId,
    /// Consuming (input-side) socket
    pub dest: NodeId,
}
