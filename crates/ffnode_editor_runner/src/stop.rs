// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graduated shutdown of the transcoder.

use crate::wait::{Clock, PollPolicy};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::Child;
use std::time::Duration;

/// Interval between exit checks while stopping
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Command the transcoder reads from stdin as a request to finish
const QUIT_COMMAND: &[u8] = b"q";

/// Timeouts of the three stop stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopPolicy {
    /// Wait for a natural exit
    pub grace: Duration,
    /// Wait after asking the process to quit
    pub terminate: Duration,
    /// Wait after killing the process
    pub kill: Duration,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            grace: Duration::ZERO,
            terminate: Duration::from_secs(3),
            kill: Duration::from_secs(2),
        }
    }
}

/// How the process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Exited on its own
    Exited(Option<i32>),
    /// Exited after the quit request
    Quit(Option<i32>),
    /// Exited after being killed
    Killed(Option<i32>),
    /// Still running after every stage
    Unresponsive,
}

impl StopPolicy {
    /// Stop `child`: wait, ask it to quit, then kill it
    pub fn stop(&self, child: &mut Child, clock: &dyn Clock) -> StopOutcome {
        if let Some(code) = wait_exit(child, self.grace, clock) {
            return StopOutcome::Exited(code);
        }

        tracing::debug!("Asking process {} to quit", child.id());
        if let Some(mut stdin) = child.stdin.take() {
            // A closed pipe means the process is already on its way out
            let _ = stdin.write_all(QUIT_COMMAND).and_then(|()| stdin.flush());
        }
        if let Some(code) = wait_exit(child, self.terminate, clock) {
            return StopOutcome::Quit(code);
        }

        tracing::warn!("Process {} ignored quit request, killing it", child.id());
        if let Err(e) = child.kill() {
            tracing::warn!("Failed to kill process {}: {}", child.id(), e);
        }
        match wait_exit(child, self.kill, clock) {
            Some(code) => StopOutcome::Killed(code),
            None => StopOutcome::Unresponsive,
        }
    }
}

/// Wait up to `timeout` for the process to exit, returning its exit code
fn wait_exit(child: &mut Child, timeout: Duration, clock: &dyn Clock) -> Option<Option<i32>> {
    PollPolicy::fixed(EXIT_POLL_INTERVAL, timeout)
        .poll_until(clock, || match child.try_wait() {
            Ok(Some(status)) => Some(Some(status.code())),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to query process {}: {}", child.id(), e);
                Some(None)
            }
        })
        .ok()
        .flatten()
}
