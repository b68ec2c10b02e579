// SPDX-License-Identifier: MIT OR Apache-2.0
//! Media probing: list the streams of a file as sockets.
//!
//! The structured prober is tried first. If it is missing or fails, the
//! transcoder's own `-i` banner is scanned for the stream listing instead.

use crate::error::ProbeError;
use crate::runner::Runner;
use crate::scan::ScanStream;
use ffnode_editor_graph::{MediaKind, MediaProbe, Socket};
use serde::Deserialize;
use std::process::{Command, Stdio};

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: String,
    #[serde(default)]
    codec_name: String,
}

fn kind_from_codec_type(codec_type: &str) -> Option<MediaKind> {
    match codec_type {
        "video" => Some(MediaKind::Video),
        "audio" => Some(MediaKind::Audio),
        "subtitle" => Some(MediaKind::Subtitle),
        _ => None,
    }
}

/// Sockets for the streams in a JSON probe report
pub fn parse_probe_report(json: &str) -> Result<Vec<Socket>, ProbeError> {
    let report: ProbeReport = serde_json::from_str(json)?;
    Ok(report
        .streams
        .into_iter()
        .filter_map(|s| Some(Socket::new(s.codec_name, kind_from_codec_type(&s.codec_type)?)))
        .collect())
}

/// Collects streams from the transcoder's human-readable input listing
#[derive(Debug, Default)]
pub struct StreamListing {
    seen_input: bool,
    in_streams: bool,
    sockets: Vec<Socket>,
}

impl StreamListing {
    /// Create an empty listing
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns `false` once the listing is complete
    pub fn feed(&mut self, line: &str) -> bool {
        if !self.seen_input {
            self.seen_input = line.starts_with("Input #0");
            return true;
        }
        if line.starts_with("  Stream #0") {
            self.in_streams = true;
            let kind = if line.contains("Video:") {
                Some(MediaKind::Video)
            } else if line.contains("Audio:") {
                Some(MediaKind::Audio)
            } else if line.contains("Subtitle:") {
                Some(MediaKind::Subtitle)
            } else {
                None
            };
            if let Some(kind) = kind {
                self.sockets.push(Socket::unnamed(kind));
            }
            return true;
        }
        // Stream details are indented below their stream line
        !(self.in_streams && !line.starts_with("  "))
    }

    /// Sockets found so far
    pub fn finish(self) -> Vec<Socket> {
        self.sockets
    }
}

impl Runner {
    /// List the streams of the media at `path`
    pub fn get_info(&self, path: &str) -> Vec<Socket> {
        match self.probe_structured(path) {
            Ok(sockets) => {
                tracing::info!("Probed {} streams in {}", sockets.len(), path);
                sockets
            }
            Err(e) => {
                tracing::debug!("Structured probe of {} failed: {}", path, e);
                let sockets = self.probe_listing(path);
                tracing::info!("Found {} streams in {} from transcoder output", sockets.len(), path);
                sockets
            }
        }
    }

    fn probe_structured(&self, path: &str) -> Result<Vec<Socket>, ProbeError> {
        let output = Command::new(&self.config().prober)
            .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(ProbeError::Failed(output.status.code()));
        }
        parse_probe_report(&String::from_utf8_lossy(&output.stdout))
    }

    fn probe_listing(&self, path: &str) -> Vec<Socket> {
        let mut listing = StreamListing::new();
        // The transcoder exits non-zero here because no output is given
        if let Err(e) = self.line_scanner(["-hide_banner", "-i", path], ScanStream::Stderr, |line| {
            listing.feed(line)
        }) {
            tracing::warn!("Failed to probe {}: {}", path, e);
        }
        listing.finish()
    }
}

impl MediaProbe for Runner {
    fn probe(&self, path: &str) -> Vec<Socket> {
        self.get_info(path)
    }
}
