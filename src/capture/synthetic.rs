//! Stand-in engine services for running the capture pipeline without a
//! headset: a random-walk gaze over each object's front face, an analytic
//! box raycaster, a tone generator in place of the microphone, and sinks
//! that only log.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::f32::consts::TAU;
use std::time::Instant;

use anyhow::{bail, Result};
use glam::{Quat, Vec2, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::geometry::ObjectTransform;
use crate::heatmap::HeatmapBuffer;

use super::{
    AudioCapture, AudioClip, GazeHit, GazeRay, HeadPose, HeatmapSink, PromptSurface, SurfaceHit,
    SurfaceRaycaster, TrackingProvider,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Axis-aligned box in an object's local frame.
#[derive(Debug, Clone)]
pub struct SceneBox {
    pub id: String,
    pub transform: ObjectTransform,
    pub half_extents: Vec3,
}

impl SceneBox {
    /// Distance along `ray` to the box surface, using the slab test in local space.
    fn intersect(&self, ray: &GazeRay) -> Option<f32> {
        let rotation = self.transform.rotation().inverse();
        let origin = self.transform.inverse_transform_point(ray.origin);
        let direction = (rotation * ray.direction) / self.transform.scale;

        let inv = direction.recip();
        let t0 = (-self.half_extents - origin) * inv;
        let t1 = (self.half_extents - origin) * inv;
        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element();

        if !(near <= far) || far < 0.0 {
            return None;
        }
        Some(if near >= 0.0 { near } else { far })
    }
}

/// The objects of a study and which one is currently on display. Hidden
/// objects are neither hit by rays nor looked at.
#[derive(Debug)]
pub struct Stage {
    boxes: Vec<SceneBox>,
    shown: AtomicUsize,
}

impl Stage {
    pub fn new(boxes: Vec<SceneBox>) -> Result<Arc<Self>> {
        if boxes.is_empty() {
            bail!("stage needs at least one object");
        }
        Ok(Arc::new(Self {
            boxes,
            shown: AtomicUsize::new(0),
        }))
    }

    pub fn show(&self, index: usize) {
        if index < self.boxes.len() {
            self.shown.store(index, Ordering::Relaxed);
        }
    }

    pub fn shown_index(&self) -> usize {
        self.shown.load(Ordering::Relaxed)
    }

    pub fn shown(&self) -> &SceneBox {
        &self.boxes[self.shown_index()]
    }

    pub fn boxes(&self) -> &[SceneBox] {
        &self.boxes
    }
}

pub struct BoxRaycaster {
    stage: Arc<Stage>,
}

impl BoxRaycaster {
    pub fn new(stage: Arc<Stage>) -> Self {
        Self { stage }
    }
}

impl SurfaceRaycaster for BoxRaycaster {
    fn raycast(&self, ray: &GazeRay) -> Option<SurfaceHit> {
        let target = self.stage.shown();
        target.intersect(ray).map(|t| SurfaceHit {
            target: target.id.clone(),
            point: ray.at(t),
            texture_coord: None,
        })
    }
}

struct WalkState {
    rng: StdRng,
    offset: Vec2,
    current: Option<Vec3>,
    walking: usize,
}

/// Head parked in front of the object on display; the gaze wanders over its
/// front face and now and then drifts off it.
pub struct RandomWalkTracker {
    stage: Arc<Stage>,
    step: f32,
    miss_chance: f64,
    state: RefCell<WalkState>,
}

impl RandomWalkTracker {
    pub fn new(stage: Arc<Stage>, seed: u64) -> Self {
        Self {
            step: 0.05,
            miss_chance: 0.1,
            state: RefCell::new(WalkState {
                rng: StdRng::seed_from_u64(seed),
                offset: Vec2::ZERO,
                current: None,
                walking: stage.shown_index(),
            }),
            stage,
        }
    }
}

impl TrackingProvider for RandomWalkTracker {
    fn head_pose(&self) -> HeadPose {
        let target = self.stage.shown().transform.position;
        let position = target + Vec3::new(0.0, 0.3, -2.0);
        let forward = (target - position).normalize_or_zero();
        let right = Vec3::Y.cross(forward).normalize_or_zero();
        HeadPose {
            position,
            forward,
            right,
            up: forward.cross(right),
        }
    }

    fn eye_ray(&self) -> Option<GazeRay> {
        let current = self.state.borrow().current?;
        let head = self.head_pose().position;
        Some(GazeRay::new(head, (current - head).normalize_or_zero()))
    }

    fn gaze_hit(&self) -> Option<GazeHit> {
        let target = self.stage.shown();
        let mut state = self.state.borrow_mut();
        let half = target.half_extents;

        if state.walking != self.stage.shown_index() {
            state.walking = self.stage.shown_index();
            state.offset = Vec2::ZERO;
        }

        if state.rng.gen_bool(self.miss_chance) {
            state.current = None;
            return None;
        }

        let jitter = Vec2::new(
            state.rng.gen_range(-self.step..=self.step),
            state.rng.gen_range(-self.step..=self.step),
        );
        state.offset = (state.offset + jitter).clamp(-half.truncate(), half.truncate());

        let local = Vec3::new(state.offset.x, state.offset.y, -half.z);
        let point = target.transform.transform_point(local);
        state.current = Some(point);

        Some(GazeHit {
            target: target.id.clone(),
            point,
            normal: target.transform.rotation() * Vec3::NEG_Z,
        })
    }
}

/// Records a sine tone for as long as capture runs, up to the buffer length.
pub struct ToneCapture {
    frequency: f32,
    started: Option<(Instant, u32, u32)>,
}

impl ToneCapture {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            started: None,
        }
    }
}

impl AudioCapture for ToneCapture {
    fn start(&mut self, sample_rate: u32, max_secs: u32) -> Result<()> {
        if self.started.is_some() {
            bail!("tone capture already running");
        }
        self.started = Some((Instant::now(), sample_rate, max_secs));
        Ok(())
    }

    fn stop(&mut self) -> Option<AudioClip> {
        let (started, sample_rate, max_secs) = self.started.take()?;
        let secs = started.elapsed().as_secs_f32().min(max_secs as f32);
        let count = (secs * sample_rate as f32) as usize;
        let samples = (0..count)
            .map(|i| 0.25 * (TAU * self.frequency * i as f32 / sample_rate as f32).sin())
            .collect();

        Some(AudioClip {
            channels: 1,
            sample_rate,
            samples,
        })
    }
}

/// Audio device that is never available.
pub struct NullAudioCapture;

impl AudioCapture for NullAudioCapture {
    fn start(&mut self, _sample_rate: u32, _max_secs: u32) -> Result<()> {
        bail!("no microphone available")
    }

    fn stop(&mut self) -> Option<AudioClip> {
        None
    }
}

#[derive(Default)]
pub struct LoggingSink {
    uploads: u64,
}

impl LoggingSink {
    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

impl HeatmapSink for LoggingSink {
    fn upload(&mut self, object_id: &str, buffer: &HeatmapBuffer) {
        self.uploads += 1;
        log_debug!(
            "uploaded {}x{} heatmap for {object_id} (upload #{})",
            buffer.width(),
            buffer.height(),
            self.uploads
        );
    }
}

#[derive(Default)]
pub struct LoggingPrompt {
    text: String,
}

impl PromptSurface for LoggingPrompt {
    fn set_text(&mut self, text: &str) {
        // Countdown text changes every frame; only log whole seconds.
        let whole = |s: &str| s.rsplit_once('.').map(|(head, _)| head.to_string());
        if whole(text) != whole(&self.text) {
            log_info!("prompt: {text}");
        }
        self.text = text.to_string();
    }

    fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        log_debug!("prompt pose {position:?} {rotation:?}");
    }
}
