// SPDX-License-Identifier: MPL-2.0

use crate::backend::firebase::FirebaseConfig;
use crate::calendar::ScheduleView;
use crate::config::{APP_ID, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which backend the app talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendSettings {
    Firebase {
        api_key: String,
        project_id: String,
        storage_bucket: String,
    },
    /// Embedded SQLite store; `path` defaults to the data directory.
    Local {
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings::Local { path: None }
    }
}

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub schedule_view: ScheduleView,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Keep the session in the keyring between runs
    #[serde(default = "default_true")]
    pub persist_session: bool,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_true() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            schedule_view: ScheduleView::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            persist_session: true,
        }
    }
}

impl AppSettings {
    /// ~/.config/pe.edu.unsch.Connect/settings.json
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(APP_ID);
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, or return defaults if not found. Environment
    /// overrides are applied on top.
    pub fn load() -> Self {
        let settings = match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        settings.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// `UNSCH_FIREBASE_*` switch to (or adjust) the Firebase backend;
    /// `UNSCH_POLL_INTERVAL_MS` tunes live query polling.
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = var("UNSCH_FIREBASE_API_KEY");
        let project_id = var("UNSCH_FIREBASE_PROJECT_ID");
        let bucket = var("UNSCH_FIREBASE_STORAGE_BUCKET");

        if api_key.is_some() || project_id.is_some() || bucket.is_some() {
            let (mut key, mut project, mut storage) = match self.backend {
                BackendSettings::Firebase {
                    api_key,
                    project_id,
                    storage_bucket,
                } => (api_key, project_id, storage_bucket),
                BackendSettings::Local { .. } => Default::default(),
            };
            if let Some(v) = api_key {
                key = v;
            }
            if let Some(v) = project_id {
                project = v;
            }
            storage = bucket.unwrap_or_else(|| {
                if storage.is_empty() {
                    format!("{}.appspot.com", project)
                } else {
                    storage
                }
            });
            self.backend = BackendSettings::Firebase {
                api_key: key,
                project_id: project,
                storage_bucket: storage,
            };
        }

        if let Some(ms) = var("UNSCH_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.poll_interval_ms = ms;
        }
        self
    }

    /// Firebase client configuration, when that backend is selected.
    pub fn firebase_config(&self) -> Option<FirebaseConfig> {
        match &self.backend {
            BackendSettings::Firebase {
                api_key,
                project_id,
                storage_bucket,
            } => {
                let mut config = FirebaseConfig::new(api_key, project_id, storage_bucket);
                config.poll_interval_ms = self.poll_interval_ms;
                Some(config)
            }
            BackendSettings::Local { .. } => None,
        }
    }
}
