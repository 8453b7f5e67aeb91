//! Change observation
//!
//! Turns document mutations and URL changes into scheduled tasks. Records are
//! pulled from the document with [`ChangeObserver::pump`]; URL polling runs
//! as a scheduler interval.

use crate::scheduler::{Millis, Scheduler, Task, TimerId};
use turnwin_css::{ElementQuery, SelectorList};
use turnwin_dom::{Document, MutationObserverInit, MutationType, NodeId, ObserverId};

/// Debounce window for reconciles triggered by new content
pub const RECONCILE_DEBOUNCE: Millis = 500;
/// Shorter window when lazily loaded turns appear
pub const LAZY_DEBOUNCE: Millis = 300;
/// URL polling period
pub const URL_POLL_INTERVAL: Millis = 1000;
/// Delay between a URL change and acting on it
pub const NAVIGATION_SETTLE: Millis = 1000;

/// Watches the chat container and the page URL
#[derive(Debug, Default)]
pub struct ChangeObserver {
    subscription: Option<ObserverId>,
    container: Option<NodeId>,
    lazy: Option<SelectorList>,
    poll_timer: Option<TimerId>,
    settle_timers: Vec<TimerId>,
    last_url: Option<String>,
}

impl ChangeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `container`'s subtree for added content. Any previous
    /// subscription is torn down first.
    pub fn watch_messages(
        &mut self,
        doc: &mut Document,
        container: Option<NodeId>,
        lazy: Option<SelectorList>,
    ) {
        self.unwatch_messages(doc);
        let Some(container) = container else {
            tracing::debug!("no chat container to observe");
            return;
        };
        let options = MutationObserverInit {
            child_list: true,
            subtree: true,
            ..Default::default()
        };
        self.subscription = Some(doc.observe(container, options));
        self.container = Some(container);
        self.lazy = lazy;
        tracing::debug!("observing container {:?}", container);
    }

    fn unwatch_messages(&mut self, doc: &mut Document) {
        if let Some(id) = self.subscription.take() {
            doc.disconnect(id);
        }
        self.container = None;
    }

    /// Start polling the document URL
    pub fn watch_navigation(&mut self, doc: &Document, scheduler: &mut Scheduler, now: Millis) {
        if let Some(timer) = self.poll_timer.take() {
            scheduler.cancel(timer);
        }
        self.last_url = Some(doc.url().to_string());
        self.poll_timer =
            Some(scheduler.schedule_interval(now, URL_POLL_INTERVAL, Task::PollNavigation));
    }

    /// One URL poll. A change schedules a single settle task.
    pub fn poll_navigation(&mut self, doc: &Document, scheduler: &mut Scheduler, now: Millis) -> bool {
        if self.last_url.as_deref() == Some(doc.url()) {
            return false;
        }
        tracing::info!("navigation detected: {}", doc.url());
        self.last_url = Some(doc.url().to_string());
        self.settle_timers.retain(|t| scheduler.is_pending(*t));
        self.settle_timers
            .push(scheduler.schedule_once(now, NAVIGATION_SETTLE, Task::NavigationSettled));
        true
    }

    /// Drain pending mutation records and debounce a reconcile if new
    /// content arrived. Returns true if one was scheduled.
    pub fn pump(&mut self, doc: &mut Document, scheduler: &mut Scheduler, now: Millis) -> bool {
        let Some(id) = self.subscription else {
            return false;
        };
        let records = doc.take_records(id);
        let added: Vec<NodeId> = records
            .iter()
            .filter(|r| r.mutation_type == MutationType::ChildList)
            .flat_map(|r| r.added_nodes.iter().copied())
            .filter(|n| doc.is_connected(*n) && doc.is_element(*n))
            .filter(|n| !doc.text_content(*n).trim().is_empty())
            .collect();
        if added.is_empty() {
            return false;
        }

        let lazy_hit = self.lazy.as_ref().is_some_and(|lazy| {
            added
                .iter()
                .any(|n| doc.matches(*n, lazy) || doc.has_descendant(*n, lazy))
        });
        let delay = if lazy_hit { LAZY_DEBOUNCE } else { RECONCILE_DEBOUNCE };
        scheduler.debounce(now, delay, Task::Reconcile);
        tracing::debug!("{} new nodes, reconcile in {}ms", added.len(), delay);
        true
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    pub fn is_watching(&self) -> bool {
        self.subscription.is_some() || self.poll_timer.is_some()
    }

    /// Tear everything down. Safe to call repeatedly.
    pub fn stop(&mut self, doc: &mut Document, scheduler: &mut Scheduler) {
        self.unwatch_messages(doc);
        if let Some(timer) = self.poll_timer.take() {
            scheduler.cancel(timer);
        }
        for timer in self.settle_timers.drain(..) {
            scheduler.cancel(timer);
        }
        scheduler.cancel_task(Task::Reconcile);
    }
}
