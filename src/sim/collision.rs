//! Collision bounds and overlap tests
//!
//! Entities expose either an axis-aligned box or a circle. The presentation
//! layer may substitute its own physics overlap test, but the geometric test
//! here is the default.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision shape in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    /// Axis-aligned box given by its center and half extents
    Rect { center: Vec2, half: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

impl Bounds {
    pub fn rect(center: Vec2, size: Vec2) -> Self {
        Bounds::Rect {
            center,
            half: size * 0.5,
        }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Bounds::Circle { center, radius }
    }

    /// Leftmost x covered by the shape
    pub fn left(&self) -> f32 {
        match *self {
            Bounds::Rect { center, half } => center.x - half.x,
            Bounds::Circle { center, radius } => center.x - radius,
        }
    }

    /// Rightmost x covered by the shape
    pub fn right(&self) -> f32 {
        match *self {
            Bounds::Rect { center, half } => center.x + half.x,
            Bounds::Circle { center, radius } => center.x + radius,
        }
    }

    pub fn top(&self) -> f32 {
        match *self {
            Bounds::Rect { center, half } => center.y - half.y,
            Bounds::Circle { center, radius } => center.y - radius,
        }
    }

    pub fn bottom(&self) -> f32 {
        match *self {
            Bounds::Rect { center, half } => center.y + half.y,
            Bounds::Circle { center, radius } => center.y + radius,
        }
    }

    /// True if the shape lies entirely outside a `width x height` screen
    pub fn is_outside(&self, width: f32, height: f32) -> bool {
        self.right() < 0.0 || self.left() > width || self.bottom() < 0.0 || self.top() > height
    }

    /// Overlap predicate; touching edges count as overlap
    pub fn overlaps(&self, other: &Bounds) -> bool {
        match (*self, *other) {
            (Bounds::Rect { center: a, half: ha }, Bounds::Rect { center: b, half: hb }) => {
                let d = (a - b).abs();
                d.x <= ha.x + hb.x && d.y <= ha.y + hb.y
            }
            (Bounds::Circle { center: a, radius: ra }, Bounds::Circle { center: b, radius: rb }) => {
                a.distance_squared(b) <= (ra + rb) * (ra + rb)
            }
            (Bounds::Rect { center, half }, Bounds::Circle { center: c, radius })
            | (Bounds::Circle { center: c, radius }, Bounds::Rect { center, half }) => {
                rect_circle_overlap(center, half, c, radius)
            }
        }
    }
}

/// Closest-point test between a box and a circle
fn rect_circle_overlap(center: Vec2, half: Vec2, circle: Vec2, radius: f32) -> bool {
    let closest = circle.clamp(center - half, center + half);
    closest.distance_squared(circle) <= radius * radius
}
