// SPDX-License-Identifier: MIT OR Apache-2.0
//! Staged output files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STAGED: AtomicU64 = AtomicU64::new(0);

/// A uniquely named file the transcoder writes the preview to.
///
/// The file itself is created by the transcoder; the guard only reserves
/// the name and removes whatever ended up at that path when dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Reserve a new name in `dir`, creating the directory if needed
    pub fn create(dir: &Path, extension: &str) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let counter = NEXT_STAGED.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!(
            "ffnode-{}-{}.{}",
            std::process::id(),
            counter,
            extension
        ));
        tracing::debug!("Staging output at {:?}", path);
        Ok(Self { path })
    }

    /// Path of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file exists and has content
    pub fn is_ready(&self) -> bool {
        std::fs::metadata(&self.path).is_ok_and(|m| m.len() > 0)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed staged output {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove staged output {:?}: {}", self.path, e),
        }
    }
}

/// File extension for a transcoder container format name
pub fn container_extension(container: &str) -> &str {
    match container {
        "matroska" => "mkv",
        "mpegts" => "ts",
        "mov" | "mp4" | "webm" | "nut" | "avi" | "ogg" | "flac" | "wav" => container,
        _ => "out",
    }
}
