#![forbid(unsafe_code)]

//! Size observation for rendered surfaces.
//!
//! # Role in FrankenTUI
//! Hosts do not always deliver a reliable resize notification for an
//! arbitrary element (an embedded canvas, a pane inside a web page, a
//! terminal without `SIGWINCH` delivery). `ftui-sizewatch` samples the size
//! itself and reports changes to a single subscriber.
//!
//! # Primary responsibilities
//! - **SizeObserver**: measure, clamp to a floor, compare, notify on change.
//! - **Surface**: anything that reports its rendered size on demand.
//! - **Scheduler**: the timer facility driving periodic measurement, either
//!   fixed-interval ([`IntervalScheduler`]) or push-based ([`ResizeSignal`]).
//!
//! # Example
//!
//! ```
//! use ftui_sizewatch::{Dimension, IntervalScheduler, SizeObserver};
//!
//! let observer = SizeObserver::new(None, || {}, IntervalScheduler::new());
//! observer.observe(Some(Dimension::new(2, 300)));
//! assert_eq!(observer.size(), Dimension::new(5, 300));
//! ```

pub mod config;
pub mod dimension;
pub mod logging;
pub mod observer;
pub mod scheduler;
pub mod surface;

pub use config::ObserverConfig;
pub use dimension::{Dimension, MIN_DIMENSION};
pub use observer::{SizeHandle, SizeObserver};
pub use scheduler::{IntervalScheduler, ResizeSignal, Scheduler, TimerCallback, TimerId};
pub use surface::{Surface, SurfaceFn};

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
pub use surface::TerminalSurface;
