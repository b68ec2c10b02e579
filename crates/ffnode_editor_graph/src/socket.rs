// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};

/// Kind of media that flows through a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Video frames
    Video,
    /// Audio samples
    Audio,
    /// Subtitle events
    Subtitle,
}

impl MediaKind {
    /// Get the color for this media kind (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Video => [255, 0, 0],
            Self::Audio => [0, 255, 0],
            Self::Subtitle => [0, 0, 255],
        }
    }

    /// Infer the kind from a filter name: audio filters carry a leading `a`
    pub fn from_filter_name(name: &str) -> Self {
        if name
            .chars()
            .next()
            .is_some_and(|c| c.eq_ignore_ascii_case(&'a'))
        {
            Self::Audio
        } else {
            Self::Video
        }
    }

    /// Lowercase name as used by the transcoder's stream listings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed connection point on a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socket {
    /// Socket name (may be empty for computed sockets)
    #[serde(default)]
    pub name: String,
    /// Media kind
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

impl Socket {
    /// Create a new socket
    pub fn new(name: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create an unnamed socket
    pub fn unnamed(kind: MediaKind) -> Self {
        Self::new(String::new(), kind)
    }

    /// Build `count` unnamed sockets of one kind
    pub fn repeat(count: usize, kind: MediaKind) -> Vec<Self> {
        vec![Self::unnamed(kind); count]
    }

    /// Check if a link between this socket and another is type-compatible
    pub fn can_connect(&self, other: &Socket) -> bool {
        self.kind == other.kind
    }
}
