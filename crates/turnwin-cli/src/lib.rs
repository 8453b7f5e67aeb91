//! turnwin - offline driver for the windowing engine
//!
//! Loads a saved chat page, runs the optimizer over it and reports what it
//! did. Snapshots can be re-read as they change, emulating a live page.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use turnwin_dom::Document;
use turnwin_engine::stats::UNKNOWN_PLATFORM;
use turnwin_engine::{
    DetailedStats, JsonFileStore, MemoryStore, Optimizer, SettingsPatch, SettingsStore, Summary,
    SystemClock,
};

/// What one run reports on stdout
#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed: Option<DetailedStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_more: Option<String>,
}

/// Where the page comes from and how to treat it
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub snapshot: PathBuf,
    /// Page URL; decides the platform
    pub url: String,
    /// Persisted settings file. In-memory defaults when absent.
    pub settings_file: Option<PathBuf>,
    /// Applied on top of the stored settings, never written back
    pub overrides: SettingsPatch,
}

/// One loaded page and the optimizer driving it
pub struct Session {
    config: SessionConfig,
    doc: Document,
    optimizer: Option<Optimizer>,
    loaded_at: Option<SystemTime>,
}

impl Session {
    pub fn open(config: SessionConfig) -> Result<Self> {
        let mut session = Self {
            config,
            doc: Document::empty("about:blank"),
            optimizer: None,
            loaded_at: None,
        };
        session.load()?;
        Ok(session)
    }

    /// Parse the snapshot and (re)start the optimizer on it
    fn load(&mut self) -> Result<()> {
        let path = &self.config.snapshot;
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        self.loaded_at = modified(path);

        if let Some(old) = self.optimizer.as_mut() {
            old.destroy(&mut self.doc);
        }
        self.doc = turnwin_html::parse_document(&html, &self.config.url)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let store = self.store();
        self.optimizer = Optimizer::start(&mut self.doc, store, Box::new(SystemClock::new()));
        match self.optimizer.as_mut() {
            Some(optimizer) => {
                if self.config.overrides != SettingsPatch::default() {
                    optimizer.override_settings(&mut self.doc, &self.config.overrides);
                }
                let hidden = optimizer.reconcile(&mut self.doc);
                tracing::info!(
                    "{}: loaded {}, {} hidden",
                    optimizer.platform().display_name,
                    path.display(),
                    hidden
                );
            }
            None => tracing::warn!("{} is not a supported chat page", self.config.url),
        }
        Ok(())
    }

    fn store(&self) -> Box<dyn SettingsStore> {
        match &self.config.settings_file {
            Some(path) => Box::new(JsonFileStore::new(path)),
            None => Box::new(MemoryStore::default()),
        }
    }

    /// Reload the snapshot if it changed on disk. Returns true on reload.
    pub fn refresh(&mut self) -> Result<bool> {
        let current = modified(&self.config.snapshot);
        if current.is_none() || current == self.loaded_at {
            return Ok(false);
        }
        tracing::debug!("snapshot changed, reloading");
        self.load()?;
        Ok(true)
    }

    /// Run due timers. Returns how many tasks ran.
    pub fn tick(&mut self) -> usize {
        self.optimizer
            .as_mut()
            .map_or(0, |optimizer| optimizer.tick(&mut self.doc))
    }

    /// Reveal `batches` rounds of hidden messages
    pub fn reveal_more(&mut self, batches: usize) -> usize {
        let Some(optimizer) = self.optimizer.as_mut() else {
            return 0;
        };
        let mut hidden = turnwin_engine::VisibilityEngine::hidden_count(&self.doc);
        for _ in 0..batches {
            if hidden == 0 {
                break;
            }
            hidden = optimizer.show_more(&mut self.doc);
        }
        hidden
    }

    pub fn report(&mut self, detailed: bool) -> Report {
        let Some(optimizer) = self.optimizer.as_mut() else {
            return Report {
                summary: Summary::new(0, 0, UNKNOWN_PLATFORM),
                detailed: detailed.then(|| DetailedStats::empty(UNKNOWN_PLATFORM)),
                show_more: None,
            };
        };
        let indicator = optimizer.indicator();
        Report {
            summary: optimizer.stats(&self.doc),
            detailed: detailed.then(|| optimizer.detailed_stats(&mut self.doc)),
            show_more: indicator.is_visible().then(|| indicator.label()),
        }
    }

    /// Annotated page with the marker stylesheet injected into `<head>`
    pub fn render(&mut self) -> Result<String> {
        let css = turnwin_engine::marker_css().context("failed to build marker stylesheet")?;
        let head = self
            .doc
            .first_by_tag("head")
            .or_else(|| self.doc.document_element())
            .context("snapshot has no document element")?;
        let style = self.doc.create_element("style");
        let text = self.doc.create_text(&css);
        self.doc.append_child(style, text)?;
        self.doc.append_child(head, style)?;
        let html = turnwin_html::to_html(&self.doc);
        self.doc.remove(style);
        Ok(html)
    }

    /// Milliseconds until the optimizer next needs a tick
    pub fn next_wake(&self) -> Option<u64> {
        let optimizer = self.optimizer.as_ref()?;
        let deadline = optimizer.next_deadline()?;
        Some(deadline.saturating_sub(optimizer.now()))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn optimizer(&self) -> Option<&Optimizer> {
        self.optimizer.as_ref()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(optimizer) = self.optimizer.as_mut() {
            optimizer.destroy(&mut self.doc);
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
