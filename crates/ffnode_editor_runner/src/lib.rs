// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subprocess orchestration for previewing filter graphs.
//!
//! The [`Runner`] drives an external transcoder and media viewer:
//! - Renders a compiled graph to a staged temporary file
//! - Starts the viewer once output appears
//! - Stops the transcoder with a graduated quit/kill sequence
//! - Probes media files for their stream layout

pub mod error;
pub mod probe;
pub mod runner;
pub mod scan;
pub mod staging;
pub mod stop;
pub mod viewer;
pub mod wait;

pub use error::{PlaybackError, ProbeError};
pub use probe::{parse_probe_report, StreamListing};
pub use runner::{PlaybackOutcome, Runner, RunnerConfig};
pub use scan::{scan_lines, ScanStream};
pub use staging::StagedFile;
pub use stop::{StopOutcome, StopPolicy};
pub use viewer::ViewerTemplate;
pub use wait::{Clock, ManualClock, PollPolicy, SystemClock};
