//! Axis-aligned bounds in object-local space

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl LocalBounds {
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let extents = extents.abs();
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Tight bounds around `points`; `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for &p in &points[1..] {
            bounds.update(p);
        }
        Some(bounds)
    }

    /// Grow bounds to include a point
    pub fn update(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Inclusive containment; non-finite points are never contained
    pub fn contains(&self, p: Vec3) -> bool {
        p.is_finite() && p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let bounds = LocalBounds::from_center_extents(Vec3::ZERO, Vec3::ONE);
        assert!(bounds.contains(Vec3::new(1.0, -1.0, 0.0)));
        assert!(!bounds.contains(Vec3::new(1.0001, 0.0, 0.0)));
        assert!(!bounds.contains(Vec3::new(f32::NAN, 0.0, 0.0)));
    }

    #[test]
    fn from_points_tracks_extremes() {
        let bounds = LocalBounds::from_points(&[
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-1.0, 5.0, 0.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 5.0, 3.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 3.5, 1.5));
        assert!(LocalBounds::from_points(&[]).is_none());
    }
}
