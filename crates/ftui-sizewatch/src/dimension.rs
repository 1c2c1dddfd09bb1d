#![forbid(unsafe_code)]

//! Width/height pairs as measured from a surface.

/// Default clamp floor applied to every recorded dimension.
///
/// Downstream layout divides by these values, so a recorded size is never
/// allowed to collapse to zero.
pub const MIN_DIMENSION: u32 = 5;

/// A rendered size in surface units (cells, CSS pixels, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    /// The empty size reported when there is nothing to measure.
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Raise each component to at least `floor`.
    #[must_use]
    pub const fn clamp_min(self, floor: u32) -> Self {
        Self {
            width: if self.width < floor { floor } else { self.width },
            height: if self.height < floor {
                floor
            } else {
                self.height
            },
        }
    }
}

impl From<(u32, u32)> for Dimension {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl From<(u16, u16)> for Dimension {
    fn from((width, height): (u16, u16)) -> Self {
        Self::new(u32::from(width), u32::from(height))
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
