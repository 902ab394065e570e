//! Polygon zones - extruded footprints used for shop areas.
//!
//! A zone is a polygon in the XZ plane with a vertical band `[min_y, max_y]`.
//! Containment is the usual even-odd ray cast on the footprint plus a band check.

use bevy::prelude::*;

/// Vertical half-height of a shop zone around its first vertex.
pub const ZONE_HALF_HEIGHT: f32 = 2.5;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct PolygonZone {
    /// Footprint in world XZ coords
    pub footprint: Vec<Vec2>,
    pub min_y: f32,
    pub max_y: f32,
}

impl PolygonZone {
    /// Build a zone from world-space vertices, banded around the first vertex's height.
    /// Returns `None` when there are no vertices.
    pub fn from_vertices(vertices: &[Vec3], half_height: f32) -> Option<Self> {
        let first = vertices.first()?;
        Some(Self {
            footprint: vertices.iter().map(|v| Vec2::new(v.x, v.z)).collect(),
            min_y: first.y - half_height,
            max_y: first.y + half_height,
        })
    }

    pub fn contains(&self, point: Vec3) -> bool {
        if point.y < self.min_y || point.y > self.max_y {
            return false;
        }
        point_in_polygon(Vec2::new(point.x, point.z), &self.footprint)
    }
}

/// Even-odd test. Degenerate footprints (fewer than 3 points) contain nothing.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
