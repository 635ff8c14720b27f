use glam::Vec3;

use crate::geometry::to_authoring_space;

use super::{GazeRay, GazeSample, HeadPose, TrackedObject, TrackingProvider, NO_TARGET};

/// What one sampling tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    pub sample: GazeSample,
    /// Authoring-space point, when the hit landed inside the object's bounds.
    pub accepted: Option<Vec3>,
    /// World hit and ray to feed the surface projector, when the studied
    /// object was hit.
    pub paint: Option<(Vec3, GazeRay)>,
}

pub struct GazeSampler {
    tracker: Box<dyn TrackingProvider>,
}

impl GazeSampler {
    pub fn new(tracker: Box<dyn TrackingProvider>) -> Self {
        Self { tracker }
    }

    pub fn head_pose(&self) -> HeadPose {
        self.tracker.head_pose()
    }

    pub fn sample(&self, timestamp: f64, object: &TrackedObject) -> SampleOutcome {
        let head = self.tracker.head_pose();
        let eye = self.tracker.eye_ray();
        let hit = self.tracker.gaze_hit();

        let (eye_origin, eye_direction) = eye.map_or((Vec3::ZERO, Vec3::ZERO), |ray| (ray.origin, ray.direction));

        let on_object = hit.as_ref().filter(|hit| hit.target == object.id);
        let local_hit = on_object.map_or(Vec3::ZERO, |hit| {
            object.transform.inverse_transform_point(hit.point)
        });

        let accepted = on_object
            .filter(|_| object.bounds.contains(local_hit))
            .map(|_| to_authoring_space(local_hit, object.authored_rotation()));

        let paint = on_object.map(|hit| {
            let ray = eye.unwrap_or_else(|| {
                GazeRay::new(head.position, hit.point - head.position)
            });
            (hit.point, ray)
        });

        SampleOutcome {
            sample: GazeSample {
                timestamp,
                head_position: head.position,
                head_forward: head.forward,
                eye_origin,
                eye_direction,
                world_hit: hit.as_ref().map(|hit| hit.point),
                local_hit,
                target_id: hit.map_or_else(|| NO_TARGET.to_string(), |hit| hit.target),
            },
            accepted,
            paint,
        }
    }
}
