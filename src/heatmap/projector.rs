//! World gaze hit to heatmap surface coordinate.

use glam::{Quat, Vec2, Vec3};

use crate::capture::{GazeRay, SurfaceRaycaster, TrackedObject};
use crate::geometry::ObjectTransform;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

pub struct SurfaceProjector {
    raycaster: Box<dyn SurfaceRaycaster>,
    use_surface_lookup: bool,
}

impl SurfaceProjector {
    pub fn new(raycaster: Box<dyn SurfaceRaycaster>, use_surface_lookup: bool) -> Self {
        Self {
            raycaster,
            use_surface_lookup,
        }
    }

    pub fn set_surface_lookup(&mut self, enabled: bool) {
        self.use_surface_lookup = enabled;
    }

    /// Surface coordinate in `[0, 1]²` for a gaze hit on `object`, or `None`
    /// when this frame should not paint.
    ///
    /// With surface lookup on, the ray is cast again so the collider's
    /// interpolated UV can be used. A hit on another target, or no hit at
    /// all, paints nothing. A hit without a UV falls back to the box
    /// projection of `world_hit`.
    pub fn project(&self, world_hit: Vec3, ray: &GazeRay, object: &TrackedObject) -> Option<Vec2> {
        if !self.use_surface_lookup {
            return box_projection(world_hit, &object.transform);
        }

        let hit = self.raycaster.raycast(ray)?;
        if hit.target != object.id {
            log_debug!("lookup ray hit {} instead of {}", hit.target, object.id);
            return None;
        }
        match hit.texture_coord {
            Some(uv) if uv.is_finite() => Some(uv),
            Some(_) => None,
            None => box_projection(world_hit, &object.transform),
        }
    }
}

/// Project a world point onto the object's front face, treating the object
/// as a box of its scale: undo yaw, then pitch, clamp to the half extents
/// and rescale to `[0, 1]`.
pub fn box_projection(world_hit: Vec3, transform: &ObjectTransform) -> Option<Vec2> {
    let half = transform.scale.abs() * 0.5;
    if !(half.x > 0.0 && half.y > 0.0) || !half.is_finite() {
        return None;
    }

    let yaw = Quat::from_rotation_y(-transform.rotation_degrees.y.to_radians());
    let pitch = Quat::from_rotation_x(-transform.rotation_degrees.x.to_radians());
    let local = pitch * (yaw * (world_hit - transform.position));

    let uv = Vec2::new(
        (local.x.clamp(-half.x, half.x) + half.x) / (2.0 * half.x),
        (local.y.clamp(-half.y, half.y) + half.y) / (2.0 * half.y),
    );
    uv.is_finite().then_some(uv)
}
