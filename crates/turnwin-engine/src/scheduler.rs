//! Cooperative timer scheduler
//!
//! Stands in for the page's setTimeout/setInterval. Nothing runs by itself:
//! the owner calls [`Scheduler::pop_due`] (or [`Scheduler::advance_to`]) with
//! the current time and executes whatever comes back.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Instant;
use turnwin_dom::NodeId;

/// Milliseconds on the scheduler's clock
pub type Millis = u64;

/// Timer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Work the optimizer schedules for later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Reconcile,
    PollNavigation,
    NavigationSettled,
    Unprotect(NodeId),
    ScrollTo(NodeId),
    ClearHighlight(NodeId),
}

/// A task whose deadline has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub id: TimerId,
    pub at: Millis,
    pub task: Task,
}

#[derive(Debug, Clone)]
struct Timer {
    deadline: Millis,
    period: Option<Millis>,
    task: Task,
}

/// Timer queue
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: BTreeMap<TimerId, Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, timer);
        id
    }

    /// Run `task` once, `delay` after `now`
    pub fn schedule_once(&mut self, now: Millis, delay: Millis, task: Task) -> TimerId {
        self.insert(Timer {
            deadline: now + delay,
            period: None,
            task,
        })
    }

    /// Run `task` every `period`, first at `now + period`
    pub fn schedule_interval(&mut self, now: Millis, period: Millis, task: Task) -> TimerId {
        let period = period.max(1);
        self.insert(Timer {
            deadline: now + period,
            period: Some(period),
            task,
        })
    }

    /// Schedule `task` once, replacing any pending one-shot timer for the same
    /// task. Repeated calls inside the window keep pushing the deadline out.
    pub fn debounce(&mut self, now: Millis, delay: Millis, task: Task) -> TimerId {
        self.timers.retain(|_, t| !(t.period.is_none() && t.task == task));
        self.schedule_once(now, delay, task)
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Cancel every timer carrying `task`
    pub fn cancel_task(&mut self, task: Task) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, t| t.task != task);
        before - self.timers.len()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Is any timer pending for `task`?
    pub fn has_task(&self, task: Task) -> bool {
        self.timers.values().any(|t| t.task == task)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.values().map(|t| t.deadline).min()
    }

    /// Take the earliest task due at `now`. Ties go to the older timer.
    /// Intervals are re-armed one period after the deadline they fired for.
    pub fn pop_due(&mut self, now: Millis) -> Option<Due> {
        let (&id, timer) = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(id, t)| (t.deadline, **id))?;

        let due = Due {
            id,
            at: timer.deadline,
            task: timer.task,
        };
        let period = timer.period;
        match period {
            Some(period) => {
                if let Some(t) = self.timers.get_mut(&id) {
                    t.deadline += period;
                }
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some(due)
    }

    /// Drain every task due at `now`, in deadline order
    pub fn advance_to(&mut self, now: Millis) -> Vec<Task> {
        std::iter::from_fn(|| self.pop_due(now)).map(|d| d.task).collect()
    }
}

/// Time source
pub trait Clock {
    fn now(&self) -> Millis;
}

/// Wall clock, counting from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Millis) -> Millis {
        let now = self.now.get() + by;
        self.now.set(now);
        now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}
