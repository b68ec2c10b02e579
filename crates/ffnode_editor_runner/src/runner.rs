// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback orchestration.
//!
//! A preview runs as:
//! 1. Start the transcoder writing to a staged file
//! 2. Poll until the file has content (or the transcoder exits)
//! 3. Start the viewer on the staged file and wait for it
//! 4. Stop the transcoder and remove the staged file
//!
//! The transcoder's diagnostics are drained on a background thread for the
//! whole run so it never blocks on a full pipe.

use crate::error::PlaybackError;
use crate::scan::{scan_lines, ScanStream};
use crate::staging::{container_extension, StagedFile};
use crate::stop::{StopOutcome, StopPolicy};
use crate::viewer::ViewerTemplate;
use crate::wait::{Clock, PollPolicy, SystemClock};
use ffnode_editor_graph::CompiledGraph;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Diagnostic lines kept per run
const MAX_DIAGNOSTIC_LINES: usize = 500;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Transcoder executable
    pub transcoder: PathBuf,
    /// Structured prober executable
    pub prober: PathBuf,
    /// Viewer command template
    pub viewer: ViewerTemplate,
    /// Startup polling
    pub poll: PollPolicy,
    /// Transcoder shutdown
    pub stop: StopPolicy,
    /// Optional cap on the rendered duration
    pub time_limit: Option<Duration>,
    /// Directory for staged files
    pub staging_dir: PathBuf,
    /// Container format of the staged file
    pub container: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            transcoder: PathBuf::from("ffmpeg"),
            prober: PathBuf::from("ffprobe"),
            viewer: ViewerTemplate::default(),
            poll: PollPolicy::default(),
            stop: StopPolicy::default(),
            time_limit: None,
            staging_dir: std::env::temp_dir(),
            container: "matroska".to_string(),
        }
    }
}

/// Result of a completed preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackOutcome {
    /// How the transcoder was stopped
    pub transcoder: StopOutcome,
    /// Diagnostic output captured from the transcoder
    pub diagnostics: String,
}

/// Why the startup poll ended
enum Startup {
    Staged,
    Exited(ExitStatus),
}

/// Drives the transcoder and viewer subprocesses
pub struct Runner {
    config: RunnerConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Create a runner using the wall clock
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a runner with a custom time source
    pub fn with_clock(config: RunnerConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the transcoder with `args`, calling `callback` per output line
    pub fn line_scanner<I, S, F>(
        &self,
        args: I,
        stream: ScanStream,
        callback: F,
    ) -> Result<Option<i32>, PlaybackError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
        F: FnMut(&str) -> bool,
    {
        scan_lines(&self.config.transcoder, args, stream, callback)
    }

    /// Transcoder arguments rendering the preview streams of `compiled` to `staged`
    pub fn transcoder_args(&self, compiled: &CompiledGraph, staged: &Path) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-v", "error", "-y"]
            .map(String::from)
            .to_vec();
        for input in &compiled.inputs {
            args.push("-i".to_string());
            args.push(input.clone());
        }
        if !compiled.filter_graph.is_empty() {
            args.push("-filter_complex".to_string());
            args.push(compiled.filter_graph.clone());
        }
        // Preview dangling streams; fall back to what the sinks would write
        let mut previewed: Vec<_> = compiled.preview_outputs().collect();
        if previewed.is_empty() {
            previewed = compiled.outputs.iter().collect();
        }
        for output in previewed {
            args.push("-map".to_string());
            args.push(output.label.map_arg());
        }
        if let Some(limit) = self.config.time_limit {
            args.push("-t".to_string());
            args.push(format!("{:.3}", limit.as_secs_f64()));
        }
        args.push("-f".to_string());
        args.push(self.config.container.clone());
        args.push(staged.to_string_lossy().into_owned());
        args
    }

    /// Render `compiled` to a staged file and show it in the viewer
    pub fn play(&self, compiled: &CompiledGraph) -> Result<PlaybackOutcome, PlaybackError> {
        let staged = StagedFile::create(
            &self.config.staging_dir,
            container_extension(&self.config.container),
        )?;
        let (viewer, viewer_args) = self.config.viewer.command(staged.path())?;
        let args = self.transcoder_args(compiled, staged.path());

        tracing::info!("Starting transcoder {:?} {:?}", self.config.transcoder, args);
        let mut transcoder = Command::new(&self.config.transcoder)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                program: self.config.transcoder.to_string_lossy().into_owned(),
                source,
            })?;
        let diagnostics = Diagnostics::default();
        let drain = transcoder.stderr.take().map(|stderr| diagnostics.drain(stderr));

        let startup = self.config.poll.poll_until(&*self.clock, || {
            match transcoder.try_wait() {
                Ok(Some(status)) => return Some(Startup::Exited(status)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to query transcoder: {}", e),
            }
            staged.is_ready().then_some(Startup::Staged)
        });

        match startup {
            Ok(Startup::Staged) => {}
            Ok(Startup::Exited(status)) if status.success() && staged.is_ready() => {
                tracing::info!("Transcoder finished before the viewer started");
            }
            Ok(Startup::Exited(status)) => {
                let diagnostics = diagnostics.finish(drain);
                tracing::info!("Transcoder exited with {:?} before producing output", status);
                return Err(PlaybackError::TranscoderFailure {
                    code: status.code(),
                    diagnostics,
                });
            }
            Err(waited) => {
                self.stop_transcoder(&mut transcoder);
                let diagnostics = diagnostics.finish(drain);
                return Err(PlaybackError::StartupTimeout {
                    waited,
                    diagnostics,
                });
            }
        }

        tracing::info!("Starting viewer {} {:?}", viewer, viewer_args);
        let viewed = Command::new(&viewer)
            .args(&viewer_args)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| PlaybackError::Spawn {
                program: viewer.clone(),
                source,
            });

        let stopped = self.stop_transcoder(&mut transcoder);
        let diagnostics = diagnostics.finish(drain);

        let status = viewed?;
        if !status.success() {
            return Err(PlaybackError::ViewerFailure {
                code: status.code(),
            });
        }
        Ok(PlaybackOutcome {
            transcoder: stopped,
            diagnostics,
        })
    }

    fn stop_transcoder(&self, transcoder: &mut Child) -> StopOutcome {
        let outcome = self.config.stop.stop(transcoder, &*self.clock);
        tracing::info!("Transcoder stopped: {:?}", outcome);
        outcome
    }
}

/// Bounded buffer of a subprocess's diagnostic lines, filled from a drain thread
#[derive(Debug, Clone, Default)]
struct Diagnostics {
    lines: Arc<parking_lot::Mutex<VecDeque<String>>>,
}

impl Diagnostics {
    fn drain<R: Read + Send + 'static>(&self, reader: R) -> JoinHandle<()> {
        let lines = self.lines.clone();
        std::thread::spawn(move || {
            crate::scan::for_each_line(reader, |line| {
                tracing::trace!("transcoder: {}", line);
                let mut lines = lines.lock();
                if lines.len() == MAX_DIAGNOSTIC_LINES {
                    lines.pop_front();
                }
                lines.push_back(line.to_string());
                true
            });
        })
    }

    /// Wait for the drain thread and return everything captured
    fn finish(&self, drain: Option<JoinHandle<()>>) -> String {
        if let Some(handle) = drain {
            if handle.join().is_err() {
                tracing::warn!("Diagnostics drain thread panicked");
            }
        }
        let lines = self.lines.lock();
        lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}
