use glam::{Vec2, Vec3};
use serde::Serialize;

/// Target id recorded when the gaze hits nothing.
pub const NO_TARGET: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Default for HeadPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl GazeRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Where the tracker says the gaze landed this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GazeHit {
    pub target: String,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Result of a physics raycast against the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceHit {
    pub target: String,
    pub point: Vec3,
    /// Interpolated mesh UV; only present for mesh colliders.
    pub texture_coord: Option<Vec2>,
}

/// One frame of gaze data. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GazeSample {
    /// Seconds since the session started.
    pub timestamp: f64,
    pub head_position: Vec3,
    pub head_forward: Vec3,
    pub eye_origin: Vec3,
    pub eye_direction: Vec3,
    pub world_hit: Option<Vec3>,
    /// Object-local hit, zero when the studied object was not hit.
    pub local_hit: Vec3,
    pub target_id: String,
}

/// Mono or interleaved PCM samples in `[-1, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioClip {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl AudioClip {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        if self.channels == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (f32::from(self.channels) * self.sample_rate as f32)
    }
}
