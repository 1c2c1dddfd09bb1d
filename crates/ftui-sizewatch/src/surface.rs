#![forbid(unsafe_code)]

//! Measurable surfaces.
//!
//! A [`Surface`] is anything that can report its current rendered size
//! synchronously. The observer borrows surfaces through `Rc<dyn Surface>`;
//! it never owns them.
//!
//! Provided implementations:
//!
//! - `Cell<Dimension>`: a size slot the host updates from its own layout code.
//! - [`SurfaceFn`]: adapts a closure.
//! - `TerminalSurface` (feature `crossterm`): the controlling terminal's
//!   size in cells.

use std::cell::Cell;

use crate::dimension::Dimension;

/// A visual element whose rendered size can be read on demand.
pub trait Surface {
    /// Current rendered content size. Must not block.
    fn rendered_size(&self) -> Dimension;
}

impl Surface for Cell<Dimension> {
    fn rendered_size(&self) -> Dimension {
        self.get()
    }
}

/// Closure-backed [`Surface`].
///
/// ```
/// use ftui_sizewatch::{Dimension, Surface, SurfaceFn};
///
/// let surface = SurfaceFn(|| Dimension::new(120, 40));
/// assert_eq!(surface.rendered_size(), Dimension::new(120, 40));
/// ```
#[derive(Clone, Copy)]
pub struct SurfaceFn<F>(pub F);

impl<F: Fn() -> Dimension> Surface for SurfaceFn<F> {
    fn rendered_size(&self) -> Dimension {
        (self.0)()
    }
}

impl<F> std::fmt::Debug for SurfaceFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceFn").finish_non_exhaustive()
    }
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
pub use terminal::TerminalSurface;

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
mod terminal {
    use super::Surface;
    use crate::dimension::Dimension;
    use tracing::warn;

    /// The controlling terminal, measured in cells via crossterm.
    ///
    /// A failed size query degrades to [`Dimension::ZERO`] so the observer
    /// records its clamp floor instead of failing.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TerminalSurface;

    impl Surface for TerminalSurface {
        fn rendered_size(&self) -> Dimension {
            match crossterm::terminal::size() {
                Ok(size) => Dimension::from(size),
                Err(err) => {
                    warn!(error = %err, "terminal size query failed");
                    Dimension::ZERO
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn cell_surface_tracks_updates() {
        let cell = Cell::new(Dimension::new(10, 20));
        assert_eq!(cell.rendered_size(), Dimension::new(10, 20));
        cell.set(Dimension::new(30, 40));
        assert_eq!(cell.rendered_size(), Dimension::new(30, 40));
    }

    #[test]
    fn fn_surface_is_queried_each_time() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        let surface = SurfaceFn(move || {
            calls_clone.set(calls_clone.get() + 1);
            Dimension::new(1, 1)
        });

        surface.rendered_size();
        surface.rendered_size();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn surfaces_coerce_to_trait_objects() {
        let cell: Rc<dyn Surface> = Rc::new(Cell::new(Dimension::new(7, 8)));
        let func: Rc<dyn Surface> = Rc::new(SurfaceFn(|| Dimension::new(9, 10)));
        assert_eq!(cell.rendered_size(), Dimension::new(7, 8));
        assert_eq!(func.rendered_size(), Dimension::new(9, 10));
    }
}
