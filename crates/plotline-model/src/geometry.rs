//! Canvas geometry
//!
//! Positions are top-left anchored, in canvas space, with `y` growing down.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg};

/// Point on the infinite canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create new position
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Canvas origin
    #[inline]
    #[must_use]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Position moved by `offset`
    #[inline]
    #[must_use]
    pub fn translated(self, offset: Offset) -> Self {
        Self {
            x: self.x + offset.dx,
            y: self.y + offset.dy,
        }
    }

    /// Both coordinates are finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Offset that carries `self` onto `other`
    #[inline]
    #[must_use]
    pub fn offset_to(self, other: Position) -> Offset {
        Offset::new(other.x - self.x, other.y - self.y)
    }
}

impl Add<Offset> for Position {
    type Output = Position;

    fn add(self, rhs: Offset) -> Self::Output {
        self.translated(rhs)
    }
}

/// Translation applied to positions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    /// Create new offset
    #[inline]
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Pure vertical offset
    #[inline]
    #[must_use]
    pub const fn vertical(dy: f64) -> Self {
        Self { dx: 0.0, dy }
    }

    /// Pure horizontal offset
    #[inline]
    #[must_use]
    pub const fn horizontal(dx: f64) -> Self {
        Self { dx, dy: 0.0 }
    }

    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }

    /// Check for the identity translation
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Self::Output {
        Offset::new(-self.dx, -self.dy)
    }
}

/// Rendered size reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create new size
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Finite and non-negative in both dimensions
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}
