#![forbid(unsafe_code)]

//! Size observer with change-filtered notification.
//!
//! # Design
//!
//! [`SizeObserver`] keeps the last measured size of a [`Surface`] in shared
//! storage (`Rc<RefCell<..>>`). A *measurement pass* samples the surface (or
//! takes an explicit [`Dimension`]), clamps it to the configured floor,
//! compares it with the stored value and, on a difference, stores it and
//! calls the change callback.
//!
//! Passes are triggered three ways:
//!
//! | Trigger | Callback |
//! |---------|----------|
//! | construction | never (silent first pass) |
//! | [`observe`](SizeObserver::observe) | on change |
//! | scheduler tick after [`start_observing`](SizeObserver::start_observing) | on change |
//!
//! # Invariants
//!
//! 1. Construction never invokes the callback.
//! 2. A recorded dimension is never below the clamp floor.
//! 3. A pass that measures the stored size never invokes the callback.
//! 4. At most one scheduler registration exists per observer.
//! 5. After [`dispose`](SizeObserver::dispose) no pass runs and no callback
//!    fires; accessors keep returning the last recorded size.
//!
//! # Failure Modes
//!
//! - **Re-entrancy**: no internal borrow is held while the callback runs, so
//!   the callback may read sizes, call `observe`, stop polling or dispose.
//! - **Missing surface**: measures as `(0, 0)` and records the floor.
//! - **Leaked registration**: the timer closure holds a `Weak`, so a
//!   scheduler that outlives the observer only runs no-op ticks until the
//!   registration is cleared (which `Drop` does).

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::ObserverConfig;
use crate::dimension::Dimension;
use crate::scheduler::{IntervalScheduler, Scheduler, TimerId};
use crate::surface::Surface;

type ChangeCallback = Rc<dyn Fn()>;

/// Raw size for one pass, clamped to `floor`.
fn sample(
    surface: Option<&Rc<dyn Surface>>,
    explicit: Option<Dimension>,
    floor: u32,
) -> Dimension {
    let raw = match (explicit, surface) {
        (Some(dimension), _) => dimension,
        (None, Some(surface)) => surface.rendered_size(),
        (None, None) => Dimension::ZERO,
    };
    raw.clamp_min(floor)
}

struct ObserverState {
    surface: Option<Rc<dyn Surface>>,
    on_change: Option<ChangeCallback>,
    /// Recorded by the silent pass at construction, so always clamped.
    size: Dimension,
    poll: Option<TimerId>,
    min_size: u32,
    disposed: bool,
}

impl ObserverState {
    /// Run one callback-enabled pass. Returns the callback to invoke, if
    /// any, so the caller can release its borrow first.
    fn measure(state: &RefCell<Self>, explicit: Option<Dimension>) -> Option<ChangeCallback> {
        let (surface, floor) = {
            let state = state.borrow();
            if state.disposed {
                return None;
            }
            (state.surface.clone(), state.min_size)
        };

        let observed = sample(surface.as_ref(), explicit, floor);

        let mut state = state.borrow_mut();
        // The surface read may have disposed us.
        if state.disposed || state.size == observed {
            return None;
        }
        trace!(%observed, previous = %state.size, "size changed");
        state.size = observed;
        state.on_change.clone()
    }

    fn pass(state: &RefCell<Self>, explicit: Option<Dimension>) {
        if let Some(callback) = Self::measure(state, explicit) {
            callback();
        }
    }
}

/// Tracks the rendered size of a surface and reports changes.
///
/// # Example
///
/// ```
/// use ftui_sizewatch::{Dimension, IntervalScheduler, SizeObserver, Surface};
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// let surface = Rc::new(Cell::new(Dimension::new(200, 100)));
/// let changes = Rc::new(Cell::new(0));
/// let changes_clone = Rc::clone(&changes);
/// let scheduler = IntervalScheduler::new();
///
/// let observer = SizeObserver::new(
///     Some(surface.clone() as Rc<dyn Surface>),
///     move || changes_clone.set(changes_clone.get() + 1),
///     scheduler.clone(),
/// );
/// observer.start_observing();
///
/// surface.set(Dimension::new(200, 150));
/// scheduler.advance(Duration::from_millis(100));
/// assert_eq!(changes.get(), 1);
/// assert_eq!(observer.height(), 150);
/// ```
pub struct SizeObserver<S: Scheduler = IntervalScheduler> {
    state: Rc<RefCell<ObserverState>>,
    scheduler: S,
    poll_interval: Duration,
}

impl<S: Scheduler> SizeObserver<S> {
    /// Create an observer with the default configuration and measure once,
    /// silently.
    pub fn new(
        surface: Option<Rc<dyn Surface>>,
        on_change: impl Fn() + 'static,
        scheduler: S,
    ) -> Self {
        Self::with_config(surface, on_change, scheduler, ObserverConfig::default())
    }

    /// Create an observer with an explicit configuration and measure once,
    /// silently.
    pub fn with_config(
        surface: Option<Rc<dyn Surface>>,
        on_change: impl Fn() + 'static,
        scheduler: S,
        config: ObserverConfig,
    ) -> Self {
        let min_size = config.min_size.max(1);
        // Silent first pass: there is no previous size to differ from.
        let size = sample(surface.as_ref(), None, min_size);
        let state = Rc::new(RefCell::new(ObserverState {
            surface,
            on_change: Some(Rc::new(on_change)),
            size,
            poll: None,
            min_size,
            disposed: false,
        }));
        Self {
            state,
            scheduler,
            poll_interval: config.poll_interval,
        }
    }

    /// Start periodic measurement. No-op if already polling or disposed.
    pub fn start_observing(&self) {
        {
            let state = self.state.borrow();
            if state.poll.is_some() || state.disposed {
                return;
            }
        }

        let weak: Weak<RefCell<ObserverState>> = Rc::downgrade(&self.state);
        let id = self.scheduler.set_interval(
            self.poll_interval,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    ObserverState::pass(&state, None);
                }
            }),
        );
        self.state.borrow_mut().poll = Some(id);
        debug!(
            interval_ms = self.poll_interval.as_millis() as u64,
            "size polling started"
        );
    }

    /// Stop periodic measurement. No-op if not polling.
    pub fn stop_observing(&self) {
        let id = self.state.borrow_mut().poll.take();
        if let Some(id) = id {
            self.scheduler.clear_interval(id);
            debug!("size polling stopped");
        }
    }

    /// Measure now, from `dimension` if given, otherwise from the surface.
    /// Invokes the callback if the recorded size changes. No-op after
    /// disposal.
    pub fn observe(&self, dimension: Option<Dimension>) {
        ObserverState::pass(&self.state, dimension);
    }

    /// Last recorded width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.size().width
    }

    /// Last recorded height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.size().height
    }

    /// Last recorded size.
    #[must_use]
    pub fn size(&self) -> Dimension {
        self.state.borrow().size
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.state.borrow().poll.is_some()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// A weak, read-only view of the recorded size.
    ///
    /// Useful inside the change callback, which receives no arguments.
    #[must_use]
    pub fn handle(&self) -> SizeHandle {
        SizeHandle {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Stop polling and release the surface and callback. Idempotent.
    pub fn dispose(&self) {
        self.stop_observing();
        let (surface, callback) = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (state.surface.take(), state.on_change.take())
        };
        // Dropped outside the borrow: captured state may call back in.
        drop(surface);
        drop(callback);
        debug!("size observer disposed");
    }
}

impl<S: Scheduler> Drop for SizeObserver<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<S: Scheduler> std::fmt::Debug for SizeObserver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SizeObserver")
            .field("size", &state.size)
            .field("observing", &state.poll.is_some())
            .field("disposed", &state.disposed)
            .field("has_surface", &state.surface.is_some())
            .finish()
    }
}

/// Weak read-only view of a [`SizeObserver`]'s recorded size.
#[derive(Clone)]
pub struct SizeHandle {
    state: Weak<RefCell<ObserverState>>,
}

impl SizeHandle {
    /// The recorded size, or `None` once the observer is dropped.
    #[must_use]
    pub fn size(&self) -> Option<Dimension> {
        self.state.upgrade().map(|state| state.borrow().size)
    }
}

impl std::fmt::Debug for SizeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeHandle").field("size", &self.size()).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
