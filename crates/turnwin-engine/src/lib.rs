//! turnwin engine
//!
//! Keeps long AI chat transcripts responsive by hiding the oldest turns past
//! a cap. The engine only annotates the host document with classes and
//! attributes; the host's stylesheet does the actual hiding.
//!
//! [`Optimizer`] is the per-page composition root. Everything below it is
//! usable on its own against a [`turnwin_dom::Document`].

pub mod classifier;
pub mod control;
pub mod detector;
pub mod locator;
pub mod observer;
pub mod optimizer;
pub mod platform;
pub mod registry;
pub mod scheduler;
pub mod settings;
pub mod stats;
pub mod validator;
pub mod visibility;

pub use classifier::{Classification, MessageClassifier, Role};
pub use control::{ControlRequest, ControlResponse, ScrollOutcome, ShowMoreOutcome};
pub use observer::ChangeObserver;
pub use optimizer::{Optimizer, ShowMoreIndicator};
pub use platform::{Platform, PlatformId, PlatformSelectors, ValidationPolicy};
pub use registry::PlatformRegistry;
pub use scheduler::{Clock, Due, ManualClock, Millis, Scheduler, SystemClock, Task, TimerId};
pub use settings::{JsonFileStore, MemoryStore, SettingsPatch, SettingsStore, VisibilitySettings};
pub use stats::{DetailedStats, MessageSummary, Summary};
pub use visibility::VisibilityEngine;

/// Class marking a hidden message
pub const HIDDEN_CLASS: &str = "universal-ai-fixer-hidden";
/// Class marking a hidden message with no meaningful text
pub const EMPTY_HIDDEN_CLASS: &str = "universal-ai-fixer-empty-hidden";
/// Synthetic message id attribute
pub const ID_ATTR: &str = "data-ai-optimizer-id";
/// Protection marker attribute
pub const PROTECTED_ATTR: &str = "data-ai-optimizer-protected";
/// Prefix of synthetic message ids
pub const ID_PREFIX: &str = "ai-optimizer-msg-";

/// Text shorter than this (trimmed, in chars) is trivial
pub const MIN_MEANINGFUL_CHARS: usize = 3;

/// Placeholder texts chat sites render while a reply streams in
pub const LOADING_TOKENS: &[&str] = &[
    "typing...",
    "loading...",
    "thinking...",
    "generating...",
    "processing...",
    "...",
];

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("settings store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Minified stylesheet that makes both hidden markers take effect
pub fn marker_css() -> std::result::Result<String, turnwin_css::StylesheetError> {
    turnwin_css::marker_stylesheet([HIDDEN_CLASS, EMPTY_HIDDEN_CLASS])
}
