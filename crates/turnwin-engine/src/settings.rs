//! Visibility settings and their persistence
//!
//! Stored settings are a loose [`SettingsPatch`]; anything missing falls back
//! to the defaults and numeric values are clamped once, when merged.

use crate::platform::PlatformId;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_MESSAGES: usize = 10;
pub const DEFAULT_SHOW_MORE_COUNT: usize = 5;
pub const MAX_MESSAGES_LIMIT: usize = 10_000;
pub const SHOW_MORE_LIMIT: usize = 5_000;

/// Effective settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilitySettings {
    pub is_enabled: bool,
    pub hide_empty: bool,
    pub max_messages: usize,
    pub show_more_count: usize,
    /// Keyed by platform id (`chatgpt`, `claude`, ...)
    pub enabled_sites: BTreeMap<String, bool>,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            is_enabled: true,
            hide_empty: true,
            max_messages: DEFAULT_MAX_MESSAGES,
            show_more_count: DEFAULT_SHOW_MORE_COUNT,
            enabled_sites: PlatformId::ALL
                .iter()
                .map(|id| (id.as_str().to_string(), true))
                .collect(),
        }
    }
}

impl VisibilitySettings {
    /// Defaults overlaid with `patch`
    pub fn from_patch(patch: &SettingsPatch) -> Self {
        Self::default().merged(patch)
    }

    /// Overlay `patch`, clamping numeric fields. Site flags merge per key.
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.is_enabled {
            next.is_enabled = v;
        }
        if let Some(v) = patch.hide_empty {
            next.hide_empty = v;
        }
        if let Some(v) = patch.max_messages {
            next.max_messages = clamp(v, MAX_MESSAGES_LIMIT);
        }
        if let Some(v) = patch.show_more_count {
            next.show_more_count = clamp(v, SHOW_MORE_LIMIT);
        }
        if let Some(sites) = &patch.enabled_sites {
            next.enabled_sites
                .extend(sites.iter().map(|(k, v)| (k.clone(), *v)));
        }
        next
    }

    /// Is the engine allowed to run on `platform`? Unknown sites are off.
    pub fn is_site_enabled(&self, platform: PlatformId) -> bool {
        self.enabled_sites
            .get(platform.as_str())
            .copied()
            .unwrap_or(false)
    }

    /// Engine enabled globally and for `platform`
    pub fn is_active_for(&self, platform: PlatformId) -> bool {
        self.is_enabled && self.is_site_enabled(platform)
    }

    /// Full patch for persisting these settings
    pub fn to_patch(&self) -> SettingsPatch {
        SettingsPatch {
            is_enabled: Some(self.is_enabled),
            hide_empty: Some(self.hide_empty),
            max_messages: Some(self.max_messages as i64),
            show_more_count: Some(self.show_more_count as i64),
            enabled_sites: Some(self.enabled_sites.clone()),
        }
    }
}

fn clamp(value: i64, max: usize) -> usize {
    value.clamp(1, max as i64) as usize
}

/// Partial settings, as stored or sent by the settings UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_empty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_messages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_more_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_sites: Option<BTreeMap<String, bool>>,
}

/// Key-value settings persistence
pub trait SettingsStore {
    fn get(&self) -> Result<SettingsPatch>;
    fn set(&mut self, patch: &SettingsPatch) -> Result<()>;
}

/// In-memory store. Can be switched offline to exercise fallbacks.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    patch: SettingsPatch,
    offline: bool,
}

impl MemoryStore {
    pub fn new(patch: SettingsPatch) -> Self {
        Self {
            patch,
            offline: false,
        }
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn stored(&self) -> &SettingsPatch {
        &self.patch
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self) -> Result<SettingsPatch> {
        if self.offline {
            return Err(EngineError::StoreUnavailable("memory store offline".into()));
        }
        Ok(self.patch.clone())
    }

    fn set(&mut self, patch: &SettingsPatch) -> Result<()> {
        if self.offline {
            return Err(EngineError::StoreUnavailable("memory store offline".into()));
        }
        self.patch = patch.clone();
        Ok(())
    }
}

/// Settings persisted as a JSON file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self) -> Result<SettingsPatch> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SettingsPatch::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, patch: &SettingsPatch) -> Result<()> {
        let json = serde_json::to_string_pretty(patch)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!("settings written to {}", self.path.display());
        Ok(())
    }
}
