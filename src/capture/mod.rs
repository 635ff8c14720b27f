//! Capture side of a session: the engine services the crate depends on and
//! the objects and samples they produce.
//!
//! Tracking, raycasts, rendering, microphone input and prompt display are
//! owned by the host engine. They reach the crate as the traits below,
//! handed to constructors; nothing here looks services up globally.

pub mod object;
pub mod sampler;
pub mod synthetic;
pub mod types;

use anyhow::Result;

use crate::heatmap::HeatmapBuffer;

pub use object::TrackedObject;
pub use sampler::{GazeSampler, SampleOutcome};
pub use types::{AudioClip, GazeHit, GazeRay, GazeSample, HeadPose, SurfaceHit, NO_TARGET};

/// Head and eye tracking.
pub trait TrackingProvider: Send {
    fn head_pose(&self) -> HeadPose;

    /// Eye gaze ray, when eye tracking is available and calibrated.
    fn eye_ray(&self) -> Option<GazeRay>;

    /// Current gaze hit, when the gaze lands on any collider.
    fn gaze_hit(&self) -> Option<GazeHit>;
}

/// Physics raycast against the scene colliders.
pub trait SurfaceRaycaster: Send {
    fn raycast(&self, ray: &GazeRay) -> Option<SurfaceHit>;
}

/// Microphone recording of a single clip.
pub trait AudioCapture: Send {
    fn start(&mut self, sample_rate: u32, max_secs: u32) -> Result<()>;

    /// Ends the recording. `None` when nothing was being recorded.
    fn stop(&mut self) -> Option<AudioClip>;
}

/// Renderer-side texture that mirrors a heatmap buffer.
pub trait HeatmapSink: Send {
    fn upload(&mut self, object_id: &str, buffer: &HeatmapBuffer);
}

/// Floating text shown to the participant.
pub trait PromptSurface: Send {
    fn set_text(&mut self, text: &str);
    fn set_pose(&mut self, position: glam::Vec3, rotation: glam::Quat);
}
