//! One explicit frame of the capture loop.
//!
//! Order per frame: operator commands, gaze sampling, projection into the
//! heatmap paint queue, one step of every paint queue, upload of dirty
//! heatmaps, then the phase tick (which may export).

use anyhow::{anyhow, bail, Result};
use serde::Serialize;

use crate::capture::{GazeSampler, HeatmapSink, TrackedObject};
use crate::export::SessionArchive;
use crate::heatmap::SurfaceProjector;
use crate::session::{PhaseEvent, PhaseSnapshot, SessionPhaseController};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Operator input gathered since the previous frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub dt: f32,
    pub answer_key: Option<char>,
    pub start: bool,
    pub reset: bool,
}

impl FrameInput {
    pub fn tick(dt: f32) -> Self {
        Self {
            dt,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSnapshot {
    pub session: PhaseSnapshot,
    pub stamp: String,
    pub current_object: String,
    pub object_index: usize,
    pub object_count: usize,
    pub recorded: Vec<String>,
    pub live_display: bool,
    pub last_error: Option<String>,
}

pub struct CaptureRuntime {
    objects: Vec<TrackedObject>,
    current: usize,
    archive: SessionArchive,
    sampler: GazeSampler,
    projector: SurfaceProjector,
    sink: Box<dyn HeatmapSink>,
    controller: SessionPhaseController,
    live_display: bool,
    auto_advance: bool,
    last_error: Option<String>,
}

impl CaptureRuntime {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        objects: Vec<TrackedObject>,
        archive: SessionArchive,
        sampler: GazeSampler,
        projector: SurfaceProjector,
        sink: Box<dyn HeatmapSink>,
        controller: SessionPhaseController,
        live_display: bool,
        auto_advance: bool,
    ) -> Result<Self> {
        if objects.is_empty() {
            bail!("capture runtime needs at least one object");
        }
        Ok(Self {
            objects,
            current: 0,
            archive,
            sampler,
            projector,
            sink,
            controller,
            live_display,
            auto_advance,
            last_error: None,
        })
    }

    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub fn current_object(&self) -> &TrackedObject {
        &self.objects[self.current]
    }

    pub fn controller(&self) -> &SessionPhaseController {
        &self.controller
    }

    pub fn archive(&self) -> &SessionArchive {
        &self.archive
    }

    pub fn frame(&mut self, input: FrameInput) -> Result<Vec<PhaseEvent>> {
        let mut events = Vec::new();

        if input.reset {
            events.extend(self.reset());
        }
        if input.start {
            // A rejected start must not cost the running session its frame.
            match self.start() {
                Ok(event) => events.push(event),
                Err(err) => {
                    log_warn!("start ignored: {err:#}");
                    self.last_error = Some(format!("{err:#}"));
                }
            }
        }

        if self.controller.is_sampling() {
            self.sample();
        }

        for object in &mut self.objects {
            object.painter.step(&mut object.heatmap);
        }

        if self.live_display {
            for object in &mut self.objects {
                if object.heatmap.take_dirty() {
                    self.sink.upload(&object.id, &object.heatmap);
                }
            }
        }

        let head = self.sampler.head_pose();
        let ticked = self
            .controller
            .tick(input.dt, input.answer_key, &head, &self.objects[self.current]);
        let ticked = match ticked {
            Ok(ticked) => ticked,
            Err(err) => {
                log_error!("{err:#}");
                self.last_error = Some(format!("{err:#}"));
                return Err(err);
            }
        };

        let recorded = ticked
            .iter()
            .any(|event| matches!(event, PhaseEvent::Recorded { .. }));
        events.extend(ticked);

        if recorded {
            self.objects[self.current].recorded = true;
            if self.auto_advance && self.current + 1 < self.objects.len() {
                self.select_object(self.current + 1)?;
            }
        }

        Ok(events)
    }

    fn sample(&mut self) {
        let object = &self.objects[self.current];
        let outcome = self.sampler.sample(self.controller.elapsed(), object);

        if self.controller.live_heatmap() {
            if let Some((hit, ray)) = outcome.paint {
                if let Some(uv) = self.projector.project(hit, &ray, object) {
                    let object = &mut self.objects[self.current];
                    object.painter.enqueue(&object.heatmap, uv.x, uv.y);
                }
            }
        }

        self.controller.record_sample(outcome.sample, outcome.accepted);
    }

    /// Open a session on the current object. An object already recorded in
    /// this session group must wait for [`Self::select_session`].
    pub fn start(&mut self) -> Result<PhaseEvent> {
        let object = &self.objects[self.current];
        if object.recorded {
            bail!(
                "{} is already recorded under {}; start a new session group to record it again",
                object.id,
                self.archive.stamp()
            );
        }
        let dir = self.archive.object_dir(&object.id);
        let event = self.controller.start(&object.id, dir)?;
        self.last_error = None;
        Ok(event)
    }

    /// Abort any running session and wipe the current heatmap.
    pub fn reset(&mut self) -> Option<PhaseEvent> {
        let event = self.controller.abort();
        self.objects[self.current].clear_heatmap();
        event
    }

    pub fn select_object(&mut self, index: usize) -> Result<()> {
        if self.controller.phase().is_active() {
            bail!("cannot switch objects while a session is running");
        }
        if index >= self.objects.len() {
            return Err(anyhow!(
                "object index {index} out of range ({} objects)",
                self.objects.len()
            ));
        }

        self.objects[self.current].clear_heatmap();
        self.current = index;
        self.objects[self.current].clear_heatmap();
        log_info!("now showing {}", self.objects[self.current].id);
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        if self.current + 1 >= self.objects.len() {
            log_warn!("already at the last object");
            return Ok(());
        }
        self.select_object(self.current + 1)
    }

    pub fn previous(&mut self) -> Result<()> {
        if self.current == 0 {
            log_warn!("already at the first object");
            return Ok(());
        }
        self.select_object(self.current - 1)
    }

    /// Start a new session group: new stamp, first object, clean heatmaps.
    pub fn select_session(&mut self) {
        self.controller.abort();
        self.archive.renew();
        for object in &mut self.objects {
            object.clear_heatmap();
            object.recorded = false;
        }
        self.current = 0;
        self.last_error = None;
        log_info!("new session group {}", self.archive.stamp());
    }

    pub fn set_live_display(&mut self, enabled: bool) {
        self.live_display = enabled;
    }

    pub fn live_display(&self) -> bool {
        self.live_display
    }

    pub fn snapshot(&self) -> RuntimeSnapshot {
        RuntimeSnapshot {
            session: self.controller.snapshot(),
            stamp: self.archive.stamp().to_string(),
            current_object: self.objects[self.current].id.clone(),
            object_index: self.current,
            object_count: self.objects.len(),
            recorded: self
                .objects
                .iter()
                .filter(|o| o.recorded)
                .map(|o| o.id.clone())
                .collect(),
            live_display: self.live_display,
            last_error: self.last_error.clone(),
        }
    }
}
