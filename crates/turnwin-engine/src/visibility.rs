//! Visibility engine
//!
//! Owns the hidden/visible partition of located messages. The partition lives
//! entirely in the document as marker classes; this type only remembers the
//! expiry timers of protected elements.

use crate::locator::find_messages;
use crate::platform::Platform;
use crate::scheduler::{Millis, Scheduler, Task, TimerId};
use crate::settings::VisibilitySettings;
use crate::validator;
use crate::{EMPTY_HIDDEN_CLASS, HIDDEN_CLASS, PROTECTED_ATTR};
use std::collections::{HashMap, HashSet};
use turnwin_dom::{Document, NodeId};

/// Default protection window
pub const PROTECT_DURATION: Millis = 30_000;

/// Hidden/visible partition manager
#[derive(Debug)]
pub struct VisibilityEngine {
    settings: VisibilitySettings,
    protections: HashMap<NodeId, TimerId>,
}

impl VisibilityEngine {
    pub fn new(settings: VisibilitySettings) -> Self {
        Self {
            settings,
            protections: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &VisibilitySettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: VisibilitySettings) {
        self.settings = settings;
    }

    /// Apply the sliding window. Returns the number of hidden elements.
    pub fn reconcile(&mut self, doc: &mut Document, platform: &Platform) -> usize {
        if !self.settings.is_active_for(platform.id) {
            return 0;
        }

        let messages = find_messages(doc, platform);
        let max = self.settings.max_messages;
        if messages.len() <= max {
            let revealed = Self::reveal_all(doc);
            tracing::debug!(
                "{}: {} messages within cap {}, revealed {}",
                platform.display_name,
                messages.len(),
                max,
                revealed
            );
            return 0;
        }

        let hide_count = messages.len() - max;
        for (index, &message) in messages.iter().enumerate() {
            if index < hide_count && !Self::is_protected(doc, message) {
                let empty = self.settings.hide_empty && validator::is_empty(doc, message);
                Self::mark(doc, message, empty);
            } else {
                Self::unmark(doc, message);
            }
        }

        let located: HashSet<_> = messages.iter().copied().collect();
        let stragglers: Vec<_> = Self::hidden_elements(doc)
            .into_iter()
            .filter(|n| !located.contains(n))
            .collect();
        for node in &stragglers {
            Self::unmark(doc, *node);
        }

        let hidden = Self::hidden_count(doc);
        tracing::debug!(
            "{}: {} hidden of {} (cap {}, {} stragglers revealed)",
            platform.display_name,
            hidden,
            messages.len(),
            max,
            stragglers.len()
        );
        hidden
    }

    /// Reveal the `showMoreCount` hidden elements closest to the visible
    /// window. Returns how many remain hidden.
    pub fn reveal_more(&mut self, doc: &mut Document) -> usize {
        let hidden = Self::hidden_elements(doc);
        let keep = hidden.len().saturating_sub(self.settings.show_more_count);
        for node in &hidden[keep..] {
            Self::unmark(doc, *node);
        }
        tracing::debug!("revealed {} messages, {} still hidden", hidden.len() - keep, keep);
        keep
    }

    /// Remove every hidden marker. Returns how many elements were revealed.
    pub fn reveal_all(doc: &mut Document) -> usize {
        let hidden = Self::hidden_elements(doc);
        for node in &hidden {
            Self::unmark(doc, *node);
        }
        hidden.len()
    }

    /// Keep `element` visible for `duration`. Protecting again restarts the
    /// window.
    pub fn protect(
        &mut self,
        doc: &mut Document,
        scheduler: &mut Scheduler,
        now: Millis,
        element: NodeId,
        duration: Millis,
    ) -> bool {
        if !doc.is_connected(element) {
            return false;
        }
        if let Some(old) = self.protections.remove(&element) {
            scheduler.cancel(old);
        }
        doc.set_attribute(element, PROTECTED_ATTR, "true");
        let timer = scheduler.schedule_once(now, duration, Task::Unprotect(element));
        self.protections.insert(element, timer);
        true
    }

    /// Drop protection early
    pub fn unprotect(&mut self, doc: &mut Document, scheduler: &mut Scheduler, element: NodeId) {
        if let Some(timer) = self.protections.remove(&element) {
            scheduler.cancel(timer);
        }
        doc.remove_attribute(element, PROTECTED_ATTR);
    }

    /// Protection window ran out; its timer has already fired
    pub fn expire(&mut self, doc: &mut Document, element: NodeId) {
        self.protections.remove(&element);
        doc.remove_attribute(element, PROTECTED_ATTR);
    }

    /// Unprotect every marked element and forget all timers
    pub fn clear_all_protections(&mut self, doc: &mut Document, scheduler: &mut Scheduler) {
        for (_, timer) in self.protections.drain() {
            scheduler.cancel(timer);
        }
        let marked: Vec<_> = doc
            .elements()
            .filter(|n| doc.has_attribute(*n, PROTECTED_ATTR))
            .collect();
        for node in marked {
            doc.remove_attribute(node, PROTECTED_ATTR);
        }
    }

    pub fn is_protected(doc: &Document, element: NodeId) -> bool {
        doc.has_attribute(element, PROTECTED_ATTR)
    }

    pub fn protection_count(&self) -> usize {
        self.protections.len()
    }

    pub fn is_empty(doc: &Document, element: NodeId) -> bool {
        validator::is_empty(doc, element)
    }

    pub fn is_hidden(doc: &Document, element: NodeId) -> bool {
        doc.has_class(element, HIDDEN_CLASS) || doc.has_class(element, EMPTY_HIDDEN_CLASS)
    }

    /// Connected elements carrying a hidden marker, in document order
    pub fn hidden_elements(doc: &Document) -> Vec<NodeId> {
        doc.elements().filter(|n| Self::is_hidden(doc, *n)).collect()
    }

    pub fn hidden_count(doc: &Document) -> usize {
        doc.elements().filter(|n| Self::is_hidden(doc, *n)).count()
    }

    fn mark(doc: &mut Document, element: NodeId, empty: bool) {
        let (wanted, other) = if empty {
            (EMPTY_HIDDEN_CLASS, HIDDEN_CLASS)
        } else {
            (HIDDEN_CLASS, EMPTY_HIDDEN_CLASS)
        };
        doc.remove_class(element, other);
        doc.add_class(element, wanted);
    }

    fn unmark(doc: &mut Document, element: NodeId) {
        doc.remove_class(element, HIDDEN_CLASS);
        doc.remove_class(element, EMPTY_HIDDEN_CLASS);
    }
}
