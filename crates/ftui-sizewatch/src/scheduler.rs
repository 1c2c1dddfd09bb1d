#![forbid(unsafe_code)]

//! Timer facilities that drive periodic measurement.
//!
//! The observer never sleeps or spawns threads. It registers an interval
//! callback with a [`Scheduler`] and the host decides when that callback
//! runs:
//!
//! - [`IntervalScheduler`]: fixed-period timers stepped by the host with
//!   monotonic timestamps, the same way the WASM runner is stepped from an
//!   animation frame or the native loop computes its poll timeout.
//! - [`ResizeSignal`]: push-based. Registered callbacks run whenever the host
//!   reports a native resize event; the period is ignored.
//!
//! # Invariants
//!
//! 1. Callbacks run synchronously on the thread that steps the scheduler.
//! 2. A cleared timer never fires again, even when it is cleared by another
//!    callback during the same step.
//! 3. No scheduler borrow is held while a callback runs, so callbacks may
//!    register or clear timers.
//! 4. `IntervalScheduler` fires each timer at most once per step; ticks
//!    missed during a long gap are coalesced, not replayed.
//! 5. A tick that finds its own callback still running (the callback stepped
//!    the scheduler) is skipped, not deferred.
//! 6. Cleared callbacks are dropped after the timer table is released, so a
//!    callback owning an observer on the same scheduler may be cleared.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

/// Callback registered with a [`Scheduler`].
pub type TimerCallback = Box<dyn FnMut()>;

type SharedCallback = Rc<RefCell<TimerCallback>>;

/// Smallest period an [`IntervalScheduler`] timer may use.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Opaque handle to a registered interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// "Run this repeatedly every `period`" plus cancellation.
pub trait Scheduler {
    /// Register `callback` to run every `period`. The first run happens one
    /// period after registration, never inside this call.
    fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a registration. Unknown or already-cleared ids are ignored.
    fn clear_interval(&self, id: TimerId);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerId {
        (**self).set_interval(period, callback)
    }

    fn clear_interval(&self, id: TimerId) {
        (**self).clear_interval(id);
    }
}

/// Run a shared callback unless it is already on the stack.
///
/// A callback that steps its own scheduler would otherwise re-enter itself.
fn invoke(callback: &SharedCallback) -> bool {
    match callback.try_borrow_mut() {
        Ok(mut f) => {
            (*f)();
            true
        }
        Err(_) => {
            trace!("re-entrant tick skipped");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// IntervalScheduler
// ---------------------------------------------------------------------------

struct IntervalTimer {
    id: TimerId,
    period: Duration,
    next_due: Duration,
    callback: SharedCallback,
}

#[derive(Default)]
struct IntervalState {
    /// Monotonic host time of the latest step.
    now: Duration,
    next_id: u64,
    timers: Vec<IntervalTimer>,
}

/// Deterministic interval timers stepped by the host clock.
///
/// Cloning shares the same timer table.
///
/// ```
/// use ftui_sizewatch::{IntervalScheduler, Scheduler};
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// let scheduler = IntervalScheduler::new();
/// let ticks = Rc::new(Cell::new(0));
/// let ticks_clone = Rc::clone(&ticks);
/// scheduler.set_interval(
///     Duration::from_millis(100),
///     Box::new(move || ticks_clone.set(ticks_clone.get() + 1)),
/// );
///
/// scheduler.advance(Duration::from_millis(250));
/// assert_eq!(ticks.get(), 1); // missed ticks are coalesced
/// scheduler.advance(Duration::from_millis(50));
/// assert_eq!(ticks.get(), 2);
/// ```
#[derive(Clone, Default)]
pub struct IntervalScheduler {
    state: Rc<RefCell<IntervalState>>,
}

impl IntervalScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Host time of the most recent step.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of registered timers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.borrow().timers.len()
    }

    #[must_use]
    pub fn is_active(&self, id: TimerId) -> bool {
        self.state.borrow().timers.iter().any(|t| t.id == id)
    }

    /// Earliest pending deadline, for hosts that block until the next tick.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.borrow().timers.iter().map(|t| t.next_due).min()
    }

    /// Step the clock forward by `elapsed`. Returns the number of callbacks run.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let now = self.now().saturating_add(elapsed);
        self.advance_to(now)
    }

    /// Step the clock to `now` and run every timer due at or before it, in
    /// deadline order (ties broken by registration order).
    ///
    /// Timestamps earlier than the current time run nothing.
    pub fn advance_to(&self, now: Duration) -> usize {
        let mut fired = 0;
        loop {
            let callback = {
                let mut state = self.state.borrow_mut();
                let Some(timer) = state
                    .timers
                    .iter_mut()
                    .filter(|t| t.next_due <= now)
                    .min_by_key(|t| (t.next_due, t.id))
                else {
                    break;
                };
                let due = timer.next_due;
                let behind = now.saturating_sub(due).as_nanos() / timer.period.as_nanos();
                let skip = u32::try_from(behind + 1).unwrap_or(u32::MAX);
                timer.next_due = due.saturating_add(timer.period.saturating_mul(skip));
                let callback = Rc::clone(&timer.callback);
                state.now = state.now.max(due);
                callback
            };
            if invoke(&callback) {
                fired += 1;
            }
        }

        let mut state = self.state.borrow_mut();
        state.now = state.now.max(now);
        fired
    }
}

impl Scheduler for IntervalScheduler {
    fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerId {
        let period = period.max(MIN_PERIOD);
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let next_due = state.now.saturating_add(period);
        state.timers.push(IntervalTimer {
            id,
            period,
            next_due,
            callback: Rc::new(RefCell::new(callback)),
        });
        trace!(timer = id.0, period_ms = period.as_millis() as u64, "interval registered");
        id
    }

    fn clear_interval(&self, id: TimerId) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let index = state.timers.iter().position(|t| t.id == id);
            index.map(|index| state.timers.remove(index))
        };
        if removed.is_some() {
            trace!(timer = id.0, "interval cleared");
        }
        // Dropping the callback may re-enter this scheduler.
        drop(removed);
    }
}

impl std::fmt::Debug for IntervalScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("IntervalScheduler")
            .field("now", &state.now)
            .field("timer_count", &state.timers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ResizeSignal
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SignalState {
    next_id: u64,
    listeners: Vec<(TimerId, SharedCallback)>,
}

/// Push-based [`Scheduler`]: callbacks run when the host calls [`fire`].
///
/// Use this where the host has a native resize notification; the observer
/// keeps its change filtering and still accepts explicit `observe` calls.
///
/// [`fire`]: ResizeSignal::fire
#[derive(Clone, Default)]
pub struct ResizeSignal {
    state: Rc<RefCell<SignalState>>,
}

impl ResizeSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Run every registered callback once, in registration order.
    pub fn fire(&self) -> usize {
        let ids: Vec<TimerId> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|(id, _)| *id)
            .collect();

        let mut fired = 0;
        for id in ids {
            let callback = {
                let state = self.state.borrow();
                state
                    .listeners
                    .iter()
                    .find(|(listener, _)| *listener == id)
                    .map(|(_, cb)| Rc::clone(cb))
            };
            // Cleared by an earlier listener in this round.
            let Some(callback) = callback else {
                continue;
            };
            if invoke(&callback) {
                fired += 1;
            }
        }
        fired
    }
}

impl Scheduler for ResizeSignal {
    fn set_interval(&self, _period: Duration, callback: TimerCallback) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, Rc::new(RefCell::new(callback))));
        trace!(listener = id.0, "resize listener registered");
        id
    }

    fn clear_interval(&self, id: TimerId) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let index = state.listeners.iter().position(|(listener, _)| *listener == id);
            index.map(|index| state.listeners.remove(index))
        };
        if removed.is_some() {
            trace!(listener = id.0, "resize listener cleared");
        }
        // Dropping the callback may re-enter this signal.
        drop(removed);
    }
}

impl std::fmt::Debug for ResizeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeSignal")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
