use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use glam::Vec3;
use serde::Serialize;

use crate::capture::{AudioCapture, GazeSample, HeadPose, PromptSurface, TrackedObject};
use crate::export::{ExportSummary, SessionExporter};
use crate::settings::CaptureSettings;

use super::{AnswerTable, Phase, PhaseTimer, PromptFollower, QuestionnaireAnswer, SessionRecord, Window};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone, PartialEq)]
pub enum PhaseEvent {
    Started { object_id: String },
    AnswerLatched { object_id: String, answer: String },
    SpeakingStarted { object_id: String },
    Exported(ExportSummary),
    /// The object has a finished archive; navigation may move on.
    Recorded { object_id: String },
    Aborted { object_id: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSnapshot {
    pub phase: Phase,
    pub object_id: Option<String>,
    pub remaining_secs: f32,
    pub samples: usize,
    pub accepted: usize,
    pub answered: bool,
}

/// Drives one object at a time through viewing, speaking and export.
pub struct SessionPhaseController {
    timer: PhaseTimer,
    phase: Phase,
    record: Option<SessionRecord>,
    elapsed: f64,
    audio: Box<dyn AudioCapture>,
    sample_rate: u32,
    buffer_secs: u32,
    speaking_started: bool,
    capture_running: bool,
    live_heatmap: bool,
    answers: AnswerTable,
    question: String,
    prompt: Box<dyn PromptSurface>,
    follower: PromptFollower,
    exporter: SessionExporter,
}

impl SessionPhaseController {
    pub fn new(
        settings: &CaptureSettings,
        audio: Box<dyn AudioCapture>,
        prompt: Box<dyn PromptSurface>,
    ) -> Self {
        Self {
            timer: PhaseTimer::new(settings.protocol.view_secs, settings.protocol.speak_secs),
            phase: Phase::Idle,
            record: None,
            elapsed: 0.0,
            audio,
            sample_rate: settings.audio.sample_rate,
            buffer_secs: settings.audio.buffer_secs,
            speaking_started: false,
            capture_running: false,
            live_heatmap: false,
            answers: AnswerTable::new(settings.answers.clone()),
            question: settings.protocol.question.clone(),
            prompt,
            follower: PromptFollower::new(settings.prompt.clone()),
            exporter: SessionExporter::new(settings.heatmap.export_png),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds since the current session started.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    /// Whether the next tick falls in the viewing window.
    pub fn is_sampling(&self) -> bool {
        self.record.is_some() && self.timer.window() == Window::Viewing
    }

    pub fn live_heatmap(&self) -> bool {
        self.live_heatmap
    }

    pub fn snapshot(&self) -> PhaseSnapshot {
        PhaseSnapshot {
            phase: self.phase,
            object_id: self.record.as_ref().map(|r| r.object_id.clone()),
            remaining_secs: if self.record.is_some() {
                self.timer.remaining().max(0.0)
            } else {
                0.0
            },
            samples: self.record.as_ref().map_or(0, |r| r.gaze_samples.len()),
            accepted: self.record.as_ref().map_or(0, |r| r.point_cloud.len()),
            answered: self
                .record
                .as_ref()
                .is_some_and(|r| r.questionnaire_answer.is_some()),
        }
    }

    pub fn start(&mut self, object_id: &str, session_path: PathBuf) -> Result<PhaseEvent> {
        if let Some(record) = &self.record {
            bail!(
                "cannot start {object_id}: {} is still recording",
                record.object_id
            );
        }

        self.record = Some(SessionRecord::new(object_id, session_path));
        self.timer.reset();
        self.elapsed = 0.0;
        self.phase = Phase::Viewing;
        self.speaking_started = false;
        self.live_heatmap = true;

        log_info!("session started for {object_id}");
        Ok(PhaseEvent::Started {
            object_id: object_id.to_string(),
        })
    }

    pub fn record_sample(&mut self, sample: GazeSample, accepted: Option<Vec3>) {
        if let Some(record) = self.record.as_mut() {
            record.push_sample(sample, accepted);
        }
    }

    /// Advance the countdown by `dt`. `answer_key` is the key pressed this frame.
    ///
    /// Returns the transitions that happened. An export failure returns the
    /// controller to idle and surfaces the error.
    pub fn tick(
        &mut self,
        dt: f32,
        answer_key: Option<char>,
        head: &HeadPose,
        object: &TrackedObject,
    ) -> Result<Vec<PhaseEvent>> {
        let Some(object_id) = self.record.as_ref().map(|r| r.object_id.clone()) else {
            return Ok(Vec::new());
        };

        let remaining = self.timer.remaining();
        let mut events = Vec::new();

        match self.timer.advance(dt) {
            Window::Viewing => {
                self.prompt
                    .set_text(&format!("VIEWING TIME: {:.1}", remaining - self.timer.speak_secs()));
                if let Some(key) = answer_key {
                    if let Some(event) = self.latch_answer(key, &object_id) {
                        events.push(event);
                    }
                }
            }
            Window::Speaking => {
                if !self.speaking_started {
                    self.begin_speaking(&object_id, head);
                    events.push(PhaseEvent::SpeakingStarted {
                        object_id: object_id.clone(),
                    });
                }
                self.prompt
                    .set_text(&format!("{}TIME: {remaining:.1}", self.question));
                let (position, rotation) = self.follower.update(dt, head);
                self.prompt.set_pose(position, rotation);
            }
            Window::Finished => {
                let summary = self
                    .finish(object)
                    .with_context(|| format!("Failed to export session for {object_id}"))?;
                events.push(PhaseEvent::Exported(summary));
                events.push(PhaseEvent::Recorded { object_id });
            }
        }

        self.elapsed += f64::from(dt);
        Ok(events)
    }

    /// Drop the open session without writing anything.
    pub fn abort(&mut self) -> Option<PhaseEvent> {
        if self.capture_running {
            let _ = self.audio.stop();
        }
        self.reset_state();
        self.prompt.set_text("");

        let record = self.record.take()?;
        log_info!(
            "session for {} aborted, {} samples discarded",
            record.object_id,
            record.gaze_samples.len()
        );
        Some(PhaseEvent::Aborted {
            object_id: record.object_id,
        })
    }

    fn latch_answer(&mut self, key: char, object_id: &str) -> Option<PhaseEvent> {
        let Some(label) = self.answers.label(key) else {
            log_debug!("ignoring unmapped key {key:?}");
            return None;
        };
        let record = self.record.as_mut()?;
        let answer = QuestionnaireAnswer {
            timestamp: self.elapsed,
            answer_text: label.to_string(),
            estimated_local_position: record.last_accepted().unwrap_or(Vec3::ZERO),
        };
        if !record.latch_answer(answer) {
            log_debug!("answer already latched, ignoring {key:?}");
            return None;
        }

        self.phase = Phase::Reacting;
        log_info!("answer {label:?} latched for {object_id}");
        Some(PhaseEvent::AnswerLatched {
            object_id: object_id.to_string(),
            answer: label.to_string(),
        })
    }

    fn begin_speaking(&mut self, object_id: &str, head: &HeadPose) {
        self.speaking_started = true;
        self.live_heatmap = false;
        self.phase = Phase::Speaking;
        self.follower.place(head);

        match self.audio.start(self.sample_rate, self.buffer_secs) {
            Ok(()) => {
                self.capture_running = true;
                log_info!("audio capture started for {object_id}");
            }
            Err(err) => {
                log_warn!("audio capture unavailable for {object_id}: {err:#}");
            }
        }
    }

    fn finish(&mut self, object: &TrackedObject) -> Result<ExportSummary> {
        self.phase = Phase::Exporting;
        let clip = if self.capture_running {
            self.audio.stop()
        } else {
            None
        };
        self.prompt.set_text("");

        let record = self.record.take();
        self.reset_state();

        match record {
            Some(record) => self.exporter.export(record, object, clip),
            None => bail!("no open session to export"),
        }
    }

    fn reset_state(&mut self) {
        self.phase = Phase::Idle;
        self.capture_running = false;
        self.speaking_started = false;
        self.live_heatmap = false;
        self.timer.reset();
    }
}
