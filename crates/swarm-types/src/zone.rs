//! Boundary zones: shapes and roles consumed by the boundary manager.

use serde::{Deserialize, Serialize};

use crate::geom::Point2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoneShape {
    Rectangle { min: Point2, max: Point2 },
    Circle { center: Point2, radius: f64 },
}

impl ZoneShape {
    pub fn contains(&self, p: Point2) -> bool {
        match *self {
            ZoneShape::Rectangle { min, max } => {
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            }
            ZoneShape::Circle { center, radius } => center.distance(p) <= radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneRole {
    Safe,
    Restricted,
    Charging,
    Mission,
    Spawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub shape: ZoneShape,
    pub role: ZoneRole,
}

impl Zone {
    pub fn new(shape: ZoneShape, role: ZoneRole) -> Self {
        Self { shape, role }
    }

    pub fn contains(&self, p: Point2) -> bool {
        self.shape.contains(p)
    }
}
