// SPDX-License-Identifier: MIT OR Apache-2.0
//! User preferences.
//!
//! This module handles:
//! - External program locations (transcoder, prober, viewer)
//! - The filter catalog location
//! - Playback timing and staging settings
//!
//! Preferences are stored as RON in the platform config directory.

use directories::ProjectDirs;
use ffnode_editor_runner::{PollPolicy, RunnerConfig, StopPolicy, ViewerTemplate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current preferences format version
pub const PREFERENCES_FORMAT_VERSION: u32 = 1;

/// Preferences file name
pub const PREFERENCES_FILE_NAME: &str = "prefs.ron";

/// Catalog file name used when no catalog path is configured
pub const DEFAULT_CATALOG_FILE_NAME: &str = "filters.json";

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Startup polling
    pub poll: PollPolicy,
    /// Optional cap on the rendered duration
    pub time_limit: Option<Duration>,
    /// Transcoder shutdown
    pub stop: StopPolicy,
    /// Directory for staged files (system temp dir if unset)
    pub staging_dir: Option<PathBuf>,
    /// Container format of the staged file
    pub container: String,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            time_limit: None,
            stop: StopPolicy::default(),
            staging_dir: None,
            container: "matroska".to_string(),
        }
    }
}

/// Complete user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Preferences format version
    pub version: u32,
    /// Transcoder executable
    pub transcoder: PathBuf,
    /// Structured prober executable
    pub prober: PathBuf,
    /// Viewer command template
    pub viewer: ViewerTemplate,
    /// Filter catalog (next to the preferences file if unset)
    pub catalog: Option<PathBuf>,
    /// Playback settings
    pub playback: PlaybackSettings,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_FORMAT_VERSION,
            transcoder: PathBuf::from("ffmpeg"),
            prober: PathBuf::from("ffprobe"),
            viewer: ViewerTemplate::default(),
            catalog: None,
            playback: PlaybackSettings::default(),
        }
    }
}

impl Preferences {
    /// Platform location of the preferences file
    pub fn default_path() -> PathBuf {
        match ProjectDirs::from("", "", "ffnode-editor") {
            Some(dirs) => dirs.config_dir().join(PREFERENCES_FILE_NAME),
            None => {
                tracing::warn!("Could not determine config directory, using ./{}", PREFERENCES_FILE_NAME);
                PathBuf::from(PREFERENCES_FILE_NAME)
            }
        }
    }

    /// Load preferences from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let prefs: Preferences = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        // Version check
        if prefs.version > PREFERENCES_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Preferences version {} is newer than supported version {}",
                    prefs.version, PREFERENCES_FORMAT_VERSION
                ),
            ));
        }

        Ok(prefs)
    }

    /// Load preferences, falling back to defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> std::io::Result<Self> {
        match Self::load(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No preferences at {:?}, using defaults", path);
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Save preferences to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    /// Catalog location, resolved against the preferences file
    pub fn catalog_path(&self, prefs_path: &Path) -> PathBuf {
        self.catalog.clone().unwrap_or_else(|| {
            prefs_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(DEFAULT_CATALOG_FILE_NAME)
        })
    }

    /// Runner configuration for these preferences
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            transcoder: self.transcoder.clone(),
            prober: self.prober.clone(),
            viewer: self.viewer.clone(),
            poll: self.playback.poll,
            stop: self.playback.stop,
            time_limit: self.playback.time_limit,
            staging_dir: self
                .playback
                .staging_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            container: self.playback.container.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = Preferences::default();
        assert_eq!(prefs.version, PREFERENCES_FORMAT_VERSION);
        assert_eq!(prefs.viewer.as_str(), "vlc\n%f");
        let config = prefs.runner_config();
        assert_eq!(config.transcoder, PathBuf::from("ffmpeg"));
        assert_eq!(config.container, "matroska");
        assert_eq!(config.staging_dir, std::env::temp_dir());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(PREFERENCES_FILE_NAME);
        let mut prefs = Preferences::default();
        prefs.viewer = ViewerTemplate::new("mpv\n--really-quiet\n%f");
        prefs.playback.time_limit = Some(Duration::from_secs(20));
        prefs.playback.staging_dir = Some(dir.path().to_path_buf());
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.runner_config().time_limit, Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_or_default(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_malformed_and_newer_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE_NAME);
        std::fs::write(&path, "(version: ").unwrap();
        let err = Preferences::load_or_default(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

        std::fs::write(&path, "(version: 99)").unwrap();
        let err = Preferences::load(&path).unwrap_err();
        assert!(err.to_string().contains("newer"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE_NAME);
        std::fs::write(&path, r#"(version: 1, transcoder: "/opt/ffmpeg/bin/ffmpeg")"#).unwrap();
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.transcoder, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(prefs.prober, PathBuf::from("ffprobe"));
    }

    #[test]
    fn test_catalog_path() {
        let prefs = Preferences::default();
        let path = prefs.catalog_path(Path::new("/home/u/.config/ffnode-editor/prefs.ron"));
        assert_eq!(path, PathBuf::from("/home/u/.config/ffnode-editor/filters.json"));
        let prefs = Preferences {
            catalog: Some(PathBuf::from("/data/filters.json")),
            ..Preferences::default()
        };
        assert_eq!(prefs.catalog_path(Path::new("prefs.ron")), PathBuf::from("/data/filters.json"));
    }
}
