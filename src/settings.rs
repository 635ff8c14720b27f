use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    /// Kernel spread in texels; larger values widen the blob.
    pub spread: f32,
    /// Divisor applied to the kernel; larger values need more looks to saturate.
    pub intensity: f32,
    /// Contributions below this stop a quadrant sweep.
    pub min_delta: f32,
    pub texture_size: usize,
    /// Prefer the raycast texture coordinate over the box projection.
    pub use_surface_lookup: bool,
    /// Push flushed buffers to the rendering sink while viewing.
    pub live_display: bool,
    pub max_pending_paints: usize,
    pub export_png: bool,
    /// Image whose first row is used as the colour lookup strip.
    pub lookup_table: Option<PathBuf>,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            spread: 1500.0,
            intensity: 30.0,
            min_delta: 0.001,
            texture_size: 1024,
            use_surface_lookup: true,
            live_display: true,
            max_pending_paints: 32,
            export_png: true,
            lookup_table: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolSettings {
    pub view_secs: f32,
    pub speak_secs: f32,
    pub frame_interval_ms: u64,
    /// Move to the next object once the current one has been exported.
    pub auto_advance: bool,
    pub question: String,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            view_secs: 60.0,
            speak_secs: 45.0,
            frame_interval_ms: 16,
            auto_advance: true,
            question: "Describe your overall or partial impression of this object \
                       as concretely as you can within 45 seconds. "
                .into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub buffer_secs: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            buffer_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    pub rotation_speed: f32,
    pub rotation_threshold_degrees: f32,
    pub move_speed: f32,
    pub follow_distance: f32,
    pub horizontal_offset: f32,
    pub vertical_offset: f32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 5.0,
            rotation_threshold_degrees: 1.0,
            move_speed: 5.0,
            follow_distance: 1.5,
            horizontal_offset: 0.0,
            vertical_offset: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerChoice {
    pub key: char,
    pub label: String,
}

fn default_answers() -> Vec<AnswerChoice> {
    [
        ('4', "Interesting / intriguing shape"),
        ('6', "Beautiful / artistic"),
        ('8', "Mysterious / incomprehensible"),
        ('2', "Eerie / unsettling / frightening"),
        ('5', "No particular feeling"),
    ]
    .into_iter()
    .map(|(key, label)| AnswerChoice {
        key,
        label: label.into(),
    })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub output_root: PathBuf,
    pub heatmap: HeatmapSettings,
    pub protocol: ProtocolSettings,
    pub audio: AudioSettings,
    pub prompt: PromptSettings,
    pub answers: Vec<AnswerChoice>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("sessions"),
            heatmap: HeatmapSettings::default(),
            protocol: ProtocolSettings::default(),
            audio: AudioSettings::default(),
            prompt: PromptSettings::default(),
            answers: default_answers(),
        }
    }
}

impl CaptureSettings {
    pub fn validate(&self) -> Result<()> {
        let heatmap = &self.heatmap;
        if !(heatmap.spread > 0.0) {
            bail!("heatmap.spread must be positive, got {}", heatmap.spread);
        }
        if !(heatmap.intensity > 0.0) {
            bail!("heatmap.intensity must be positive, got {}", heatmap.intensity);
        }
        if !(heatmap.min_delta > 0.0) {
            bail!("heatmap.min_delta must be positive, got {}", heatmap.min_delta);
        }
        if heatmap.texture_size == 0 {
            bail!("heatmap.texture_size must be non-zero");
        }
        if !(self.protocol.view_secs > 0.0) || !(self.protocol.speak_secs > 0.0) {
            bail!(
                "protocol durations must be positive (view {}, speak {})",
                self.protocol.view_secs,
                self.protocol.speak_secs
            );
        }
        if self.protocol.frame_interval_ms == 0 {
            bail!("protocol.frame_interval_ms must be non-zero");
        }
        if self.audio.sample_rate == 0 || self.audio.buffer_secs == 0 {
            bail!("audio sample rate and buffer length must be non-zero");
        }
        for (i, answer) in self.answers.iter().enumerate() {
            if self.answers[..i].iter().any(|a| a.key == answer.key) {
                bail!("answer key '{}' is mapped twice", answer.key);
            }
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<CaptureSettings>,
}

impl SettingsStore {
    /// Loads settings from `path`, writing the defaults there when the file
    /// does not exist yet so operators have something to edit.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data: CaptureSettings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings in {}", path.display()))?
        } else {
            let defaults = CaptureSettings::default();
            persist(&path, &defaults)?;
            defaults
        };

        data.validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> CaptureSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

fn persist(path: &PathBuf, data: &CaptureSettings) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(store.settings().heatmap.texture_size, 1024);
        assert_eq!(store.settings().answers.len(), 5);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "protocol": { "view_secs": 10.0 } }"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().settings();
        assert_eq!(settings.protocol.view_secs, 10.0);
        assert_eq!(settings.protocol.speak_secs, 45.0);
        assert_eq!(settings.heatmap.spread, 1500.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "heatmap": { "intensity": 0.0 } }"#).unwrap();
        assert!(SettingsStore::new(path).is_err());

        let mut settings = CaptureSettings::default();
        settings.answers.push(AnswerChoice {
            key: '4',
            label: "again".into(),
        });
        assert!(settings.validate().is_err());
    }
}
