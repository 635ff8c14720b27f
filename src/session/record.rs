use std::path::PathBuf;

use glam::Vec3;
use serde::Serialize;

use crate::capture::GazeSample;

/// Accepted gaze point in authoring space, with the sample it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudPoint {
    pub position: Vec3,
    pub sample: GazeSample,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireAnswer {
    pub timestamp: f64,
    pub answer_text: String,
    pub estimated_local_position: Vec3,
}

/// Everything captured for one object during one phase cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub object_id: String,
    pub session_path: PathBuf,
    pub gaze_samples: Vec<GazeSample>,
    pub point_cloud: Vec<CloudPoint>,
    pub questionnaire_answer: Option<QuestionnaireAnswer>,
    pub audio_chunks: Vec<String>,
}

impl SessionRecord {
    pub fn new(object_id: impl Into<String>, session_path: PathBuf) -> Self {
        Self {
            object_id: object_id.into(),
            session_path,
            gaze_samples: Vec::new(),
            point_cloud: Vec::new(),
            questionnaire_answer: None,
            audio_chunks: Vec::new(),
        }
    }

    pub fn push_sample(&mut self, sample: GazeSample, accepted: Option<Vec3>) {
        if let Some(position) = accepted {
            self.point_cloud.push(CloudPoint {
                position,
                sample: sample.clone(),
            });
        }
        self.gaze_samples.push(sample);
    }

    pub fn last_accepted(&self) -> Option<Vec3> {
        self.point_cloud.last().map(|p| p.position)
    }

    /// Stores the answer unless one is already latched. Returns whether it was stored.
    pub fn latch_answer(&mut self, answer: QuestionnaireAnswer) -> bool {
        if self.questionnaire_answer.is_some() {
            return false;
        }
        self.questionnaire_answer = Some(answer);
        true
    }
}
