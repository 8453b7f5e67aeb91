//! Per-page optimizer
//!
//! Composition root tying detection, settings, the visibility engine, change
//! observation and the scheduler together for one page. It never owns the
//! document; every entry point borrows it mutably, so passes cannot
//! interleave.

use crate::classifier::MessageClassifier;
use crate::control::{ControlRequest, ControlResponse, ScrollOutcome, ShowMoreOutcome};
use crate::locator::{chat_container, find_messages};
use crate::observer::ChangeObserver;
use crate::platform::Platform;
use crate::registry::PlatformRegistry;
use crate::scheduler::{Clock, Millis, Scheduler, Task};
use crate::settings::{SettingsPatch, SettingsStore, VisibilitySettings};
use crate::stats::{DetailedStats, MessageSummary, Summary};
use crate::visibility::{PROTECT_DURATION, VisibilityEngine};
use crate::ID_ATTR;
use std::collections::HashMap;
use turnwin_dom::{Document, NodeId, ScrollAlignment};

/// Delay before the first pass, giving the page time to render
pub const INITIAL_RECONCILE_DELAY: Millis = 1000;
/// Delay between revealing everything and scrolling to a message
pub const SCROLL_DELAY: Millis = 500;
/// How long a scrolled-to message stays highlighted
pub const HIGHLIGHT_DURATION: Millis = 3000;

const HIGHLIGHT_STYLE: &[(&str, &str)] = &[
    ("transition", "all 0.3s ease"),
    ("background", "#fff3cd"),
    ("border", "2px solid #ffc107"),
    ("border-radius", "8px"),
    ("box-shadow", "0 0 20px rgba(255, 193, 7, 0.5)"),
];

/// State of the floating "Show More" control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShowMoreIndicator {
    hidden: usize,
    suppressed: bool,
}

impl ShowMoreIndicator {
    /// Message-level platforms load older turns themselves and never show
    /// the control
    pub fn for_platform(platform: &Platform) -> Self {
        Self {
            hidden: 0,
            suppressed: platform.message_level,
        }
    }

    pub fn update(&mut self, hidden: usize) {
        self.hidden = hidden;
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn label(&self) -> String {
        format!("Show More ({})", self.hidden)
    }

    pub fn is_visible(&self) -> bool {
        !self.suppressed && self.hidden > 0
    }
}

/// Saved inline style values, restored when a highlight ends
type SavedStyle = Vec<(&'static str, Option<String>)>;

/// Message windowing for one page
pub struct Optimizer {
    registry: PlatformRegistry,
    platform: Platform,
    store: Box<dyn SettingsStore>,
    clock: Box<dyn Clock>,
    engine: VisibilityEngine,
    observer: ChangeObserver,
    scheduler: Scheduler,
    classifier: MessageClassifier,
    indicator: ShowMoreIndicator,
    highlights: HashMap<NodeId, SavedStyle>,
    running: bool,
}

impl Optimizer {
    /// Start on a page. Returns `None` (dormant) when no platform serves the
    /// page's host.
    pub fn start(
        doc: &mut Document,
        store: Box<dyn SettingsStore>,
        clock: Box<dyn Clock>,
    ) -> Option<Self> {
        Self::start_with_registry(doc, PlatformRegistry::builtin(), store, clock)
    }

    pub fn start_with_registry(
        doc: &mut Document,
        registry: PlatformRegistry,
        store: Box<dyn SettingsStore>,
        clock: Box<dyn Clock>,
    ) -> Option<Self> {
        let Some(platform) = registry.detect(&doc.hostname()).cloned() else {
            tracing::info!("unsupported page {}, staying dormant", doc.url());
            return None;
        };
        let settings = load_settings(store.as_ref(), &VisibilitySettings::default());
        let indicator = ShowMoreIndicator::for_platform(&platform);

        let mut optimizer = Self {
            registry,
            platform,
            store,
            clock,
            engine: VisibilityEngine::new(settings),
            observer: ChangeObserver::new(),
            scheduler: Scheduler::new(),
            classifier: MessageClassifier::new(),
            indicator,
            highlights: HashMap::new(),
            running: false,
        };
        let now = optimizer.clock.now();
        optimizer.init(doc, now);
        Some(optimizer)
    }

    fn init(&mut self, doc: &mut Document, now: Millis) {
        let name = self.platform.display_name;
        if !self.engine.settings().is_site_enabled(self.platform.id) {
            tracing::info!("{} is disabled in settings", name);
            return;
        }
        tracing::info!("initializing for {}", name);
        self.running = true;
        let container = chat_container(doc, &self.platform);
        self.observer
            .watch_messages(doc, container, self.platform.selectors.lazy.clone());
        self.observer.watch_navigation(doc, &mut self.scheduler, now);
        self.scheduler
            .schedule_once(now, INITIAL_RECONCILE_DELAY, Task::Reconcile);
    }

    /// Undo everything done to the page and stop all timers
    fn teardown(&mut self, doc: &mut Document) {
        let revealed = VisibilityEngine::reveal_all(doc);
        self.engine.clear_all_protections(doc, &mut self.scheduler);
        let highlighted: Vec<_> = self.highlights.keys().copied().collect();
        for node in highlighted {
            self.clear_highlight(doc, node);
        }
        self.observer.stop(doc, &mut self.scheduler);
        self.scheduler.clear();
        self.indicator.update(0);
        self.running = false;
        tracing::debug!("torn down, {} messages revealed", revealed);
    }

    /// Reveal everything, drop protections and stop observing. Idempotent.
    pub fn destroy(&mut self, doc: &mut Document) {
        tracing::info!("destroying optimizer for {}", self.platform.display_name);
        self.teardown(doc);
    }

    // === Driving ===

    /// Process observed mutations and run every task that is due
    pub fn tick(&mut self, doc: &mut Document) -> usize {
        let now = self.clock.now();
        if self.running {
            self.observer.pump(doc, &mut self.scheduler, now);
        }
        let mut ran = 0;
        while let Some(due) = self.scheduler.pop_due(now) {
            self.run_task(doc, due.at, due.task);
            ran += 1;
        }
        ran
    }

    fn run_task(&mut self, doc: &mut Document, at: Millis, task: Task) {
        match task {
            Task::Reconcile => {
                self.reconcile(doc);
            }
            Task::PollNavigation => {
                self.observer.poll_navigation(doc, &mut self.scheduler, at);
            }
            Task::NavigationSettled => self.handle_navigation(doc, at),
            Task::Unprotect(node) => self.engine.expire(doc, node),
            Task::ScrollTo(node) => {
                if doc.scroll_into_view(node, ScrollAlignment::Center) {
                    self.highlight(doc, node);
                    self.scheduler
                        .schedule_once(at, HIGHLIGHT_DURATION, Task::ClearHighlight(node));
                }
            }
            Task::ClearHighlight(node) => self.clear_highlight(doc, node),
        }
    }

    fn handle_navigation(&mut self, doc: &mut Document, now: Millis) {
        let detected = self.registry.detect(&doc.hostname()).cloned();
        match detected {
            Some(next) if next.id != self.platform.id => {
                tracing::info!("platform changed to {}", next.display_name);
                self.teardown(doc);
                self.indicator = ShowMoreIndicator::for_platform(&next);
                self.platform = next;
                let settings = load_settings(self.store.as_ref(), self.engine.settings());
                self.engine.set_settings(settings);
                self.init(doc, now);
            }
            _ if self.running => {
                let container = chat_container(doc, &self.platform);
                self.observer
                    .watch_messages(doc, container, self.platform.selectors.lazy.clone());
                self.reconcile(doc);
            }
            _ => {}
        }
    }

    // === Operations ===

    /// Apply the window now. Returns the hidden count.
    pub fn reconcile(&mut self, doc: &mut Document) -> usize {
        let hidden = self.engine.reconcile(doc, &self.platform);
        self.indicator.update(hidden);
        hidden
    }

    /// Reveal the next batch of hidden messages. Returns how many remain.
    pub fn show_more(&mut self, doc: &mut Document) -> usize {
        let hidden = self.engine.reveal_more(doc);
        self.indicator.update(hidden);
        hidden
    }

    /// Merge new settings, persist them and re-apply the window from scratch
    pub fn update_settings(&mut self, doc: &mut Document, patch: &SettingsPatch) {
        let next = self.engine.settings().merged(patch);
        if let Err(e) = self.store.set(&next.to_patch()) {
            tracing::warn!("failed to persist settings: {}", e);
        }
        self.apply_settings(doc, next);
    }

    /// Like [`Self::update_settings`], but the store is left untouched
    pub fn override_settings(&mut self, doc: &mut Document, patch: &SettingsPatch) {
        let next = self.engine.settings().merged(patch);
        tracing::debug!("applying settings override without persisting");
        self.apply_settings(doc, next);
    }

    fn apply_settings(&mut self, doc: &mut Document, next: VisibilitySettings) {
        let now = self.clock.now();
        self.engine.clear_all_protections(doc, &mut self.scheduler);
        VisibilityEngine::reveal_all(doc);

        let enabled = next.is_site_enabled(self.platform.id);
        self.engine.set_settings(next);

        match (enabled, self.running) {
            (true, false) => self.init(doc, now),
            (false, true) => self.teardown(doc),
            _ => {}
        }
        self.reconcile(doc);
    }

    /// Reveal everything and bring one message into view
    pub fn scroll_to_message(&mut self, doc: &mut Document, message_id: &str) -> ScrollOutcome {
        let target = doc
            .elements()
            .find(|n| doc.attribute(*n, ID_ATTR) == Some(message_id));
        let Some(target) = target.filter(|_| self.running) else {
            tracing::debug!("scroll target {} not found", message_id);
            return ScrollOutcome::not_found();
        };

        let now = self.clock.now();
        let revealed = VisibilityEngine::reveal_all(doc);
        self.indicator.update(0);
        self.engine
            .protect(doc, &mut self.scheduler, now, target, PROTECT_DURATION);
        self.scheduler
            .schedule_once(now, SCROLL_DELAY, Task::ScrollTo(target));

        ScrollOutcome {
            success: true,
            found: true,
            revealed_count: Some(revealed),
            new_hidden_count: Some(0),
        }
    }

    fn highlight(&mut self, doc: &mut Document, node: NodeId) {
        if !self.highlights.contains_key(&node) {
            let saved = HIGHLIGHT_STYLE
                .iter()
                .map(|(prop, _)| (*prop, doc.style_property(node, prop)))
                .collect();
            self.highlights.insert(node, saved);
        }
        for (prop, value) in HIGHLIGHT_STYLE {
            doc.set_style_property(node, prop, value);
        }
    }

    fn clear_highlight(&mut self, doc: &mut Document, node: NodeId) {
        let Some(saved) = self.highlights.remove(&node) else {
            return;
        };
        for (prop, value) in saved {
            doc.set_style_property(node, prop, value.as_deref().unwrap_or(""));
        }
    }

    pub fn stats(&self, doc: &Document) -> Summary {
        let name = self.platform.display_name;
        if !self.running {
            return Summary::new(0, 0, name);
        }
        let total = find_messages(doc, &self.platform).len();
        Summary::new(total, VisibilityEngine::hidden_count(doc), name)
    }

    /// Classify every located message. Assigns synthetic ids as a side effect.
    pub fn detailed_stats(&mut self, doc: &mut Document) -> DetailedStats {
        let name = self.platform.display_name;
        if !self.running {
            return DetailedStats::empty(name);
        }
        let messages = find_messages(doc, &self.platform);
        let rows = messages
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| {
                self.classifier
                    .classify(doc, m, i, &self.platform)
                    .map(|c| MessageSummary::from_classification(i, c))
            })
            .collect();
        DetailedStats::from_messages(messages.len(), rows, name)
    }

    /// Answer a control request
    pub fn handle(&mut self, doc: &mut Document, request: &ControlRequest) -> ControlResponse {
        match request {
            ControlRequest::PageLoaded => ControlResponse::ack(true),
            ControlRequest::UpdateSettings { settings } => {
                self.update_settings(doc, settings);
                ControlResponse::ack(true)
            }
            ControlRequest::GetStats => ControlResponse::Summary(self.stats(doc)),
            ControlRequest::GetDetailedStats => {
                ControlResponse::Detailed(self.detailed_stats(doc))
            }
            ControlRequest::ShowMore => ControlResponse::ShowMore(ShowMoreOutcome {
                success: true,
                hidden: self.show_more(doc),
            }),
            ControlRequest::ScrollToMessage { message_id } => {
                ControlResponse::Scroll(self.scroll_to_message(doc, message_id))
            }
        }
    }

    // === Accessors ===

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn settings(&self) -> &VisibilitySettings {
        self.engine.settings()
    }

    pub fn indicator(&self) -> ShowMoreIndicator {
        self.indicator
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Earliest pending timer, for hosts that sleep between ticks
    pub fn next_deadline(&self) -> Option<Millis> {
        self.scheduler.next_deadline()
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }
}

/// Read settings, falling back to `fallback` when the store is unreachable
fn load_settings(store: &dyn SettingsStore, fallback: &VisibilitySettings) -> VisibilitySettings {
    match store.get() {
        Ok(patch) => VisibilitySettings::from_patch(&patch),
        Err(e) => {
            tracing::warn!("settings store unavailable, keeping last known settings: {}", e);
            fallback.clone()
        }
    }
}
