//! Writes a finished session to disk.
//!
//! Files are staged in a hidden sibling directory. Once every one of them
//! has been written the staging directory replaces the object directory as a
//! whole, so a failed export never leaves a partial archive behind and a
//! re-export never mixes in files from an earlier one.

pub mod archive;
pub mod csv;
pub mod obj;
pub mod wav;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::capture::{AudioClip, TrackedObject};
use crate::session::SessionRecord;

pub use archive::SessionArchive;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const POINT_CLOUD_FILE: &str = "pointcloud.csv";
pub const MODEL_FILE: &str = "model.obj";
pub const FILE_LIST: &str = "filelist.txt";
pub const QA_FILE: &str = "qa.csv";
pub const HEATMAP_FILE: &str = "heatmap.png";

pub fn audio_chunk_name(index: usize) -> String {
    format!("session_audio_{index}.wav")
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub dir: PathBuf,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionExporter {
    export_png: bool,
}

impl SessionExporter {
    pub fn new(export_png: bool) -> Self {
        Self { export_png }
    }

    /// Write `record` to its session path.
    pub fn export(
        &self,
        mut record: SessionRecord,
        object: &TrackedObject,
        clip: Option<AudioClip>,
    ) -> Result<ExportSummary> {
        let dir = record.session_path.clone();
        let staging = hidden_sibling(&dir, "partial")?;

        if staging.exists() {
            fs::remove_dir_all(&staging)
                .with_context(|| format!("Failed to remove stale {}", staging.display()))?;
        }
        fs::create_dir_all(&staging)
            .with_context(|| format!("Failed to create {}", staging.display()))?;

        let files = match self.stage(&mut record, object, clip, &staging) {
            Ok(files) => files,
            Err(err) => {
                discard(&staging);
                return Err(err);
            }
        };

        if let Err(err) = publish(&staging, &dir) {
            discard(&staging);
            return Err(err);
        }

        log_info!(
            "exported {} ({} gaze points, {} files) to {}",
            record.object_id,
            record.point_cloud.len(),
            files.len(),
            dir.display()
        );
        Ok(ExportSummary { dir, files })
    }

    fn stage(
        &self,
        record: &mut SessionRecord,
        object: &TrackedObject,
        clip: Option<AudioClip>,
        staging: &Path,
    ) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let mut write = |name: &str, bytes: &[u8]| -> Result<()> {
            let path = staging.join(name);
            fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            files.push(name.to_string());
            Ok(())
        };

        write(POINT_CLOUD_FILE, csv::point_cloud(&record.point_cloud)?.as_bytes())?;
        write(
            MODEL_FILE,
            obj::mesh_to_obj(&object.mesh, object.authored_rotation()).as_bytes(),
        )?;

        if let Some(clip) = clip.filter(|clip| !clip.is_empty()) {
            let name = audio_chunk_name(record.audio_chunks.len());
            let bytes = wav::encode(&clip).context("Failed to encode audio")?;
            write(&name, &bytes)?;
            record.audio_chunks.push(name);
        }

        let list: String = record
            .audio_chunks
            .iter()
            .map(|name| format!("file '{name}'\n"))
            .collect();
        write(FILE_LIST, list.as_bytes())?;

        if let Some(answer) = &record.questionnaire_answer {
            write(QA_FILE, csv::questionnaire(answer)?.as_bytes())?;
        }

        if self.export_png {
            let heatmap = &object.heatmap;
            let image = image::RgbaImage::from_raw(
                heatmap.width() as u32,
                heatmap.height() as u32,
                heatmap.to_rgba8(),
            )
            .ok_or_else(|| anyhow!("heatmap buffer does not match its dimensions"))?;
            let path = staging.join(HEATMAP_FILE);
            image
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            files.push(HEATMAP_FILE.to_string());
        }

        Ok(files)
    }
}

/// Hidden sibling of `dir`, e.g. `<stamp>/.vase.partial`.
fn hidden_sibling(dir: &Path, suffix: &str) -> Result<PathBuf> {
    let name = dir
        .file_name()
        .ok_or_else(|| anyhow!("export path {} has no object name", dir.display()))?;
    let parent = dir.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(format!(".{}.{suffix}", name.to_string_lossy())))
}

/// Move the staging directory to `dir`, replacing any earlier archive.
///
/// The earlier archive is set aside first and restored if the final rename
/// fails.
fn publish(staging: &Path, dir: &Path) -> Result<()> {
    let previous = hidden_sibling(dir, "previous")?;
    if previous.exists() {
        fs::remove_dir_all(&previous)
            .with_context(|| format!("Failed to remove stale {}", previous.display()))?;
    }

    let replacing = dir.exists();
    if replacing {
        fs::rename(dir, &previous)
            .with_context(|| format!("Failed to set aside {}", dir.display()))?;
        log_warn!("replacing earlier archive at {}", dir.display());
    }

    if let Err(err) = fs::rename(staging, dir) {
        if replacing {
            if let Err(restore) = fs::rename(&previous, dir) {
                log_warn!("failed to restore {}: {restore}", dir.display());
            }
        }
        return Err(err).with_context(|| format!("Failed to move archive into {}", dir.display()));
    }

    if replacing {
        discard(&previous);
    }
    Ok(())
}

fn discard(dir: &Path) {
    if dir.exists() {
        if let Err(err) = fs::remove_dir_all(dir) {
            log_warn!("failed to remove {}: {err}", dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, ObjectTransform};
    use crate::session::QuestionnaireAnswer;
    use crate::settings::HeatmapSettings;
    use glam::Vec3;

    fn object() -> TrackedObject {
        let settings = HeatmapSettings {
            texture_size: 8,
            ..Default::default()
        };
        TrackedObject::new("cup", ObjectTransform::default(), Mesh::cuboid(Vec3::ONE), &settings, None)
            .unwrap()
    }

    #[test]
    fn export_without_answer_or_audio() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("stamp").join("cup");
        let record = SessionRecord::new("cup", dir.clone());

        let summary = SessionExporter::new(false)
            .export(record, &object(), None)
            .unwrap();

        assert_eq!(summary.files, [POINT_CLOUD_FILE, MODEL_FILE, FILE_LIST]);
        assert_eq!(fs::read_to_string(dir.join(FILE_LIST)).unwrap(), "");
        assert!(!dir.join(QA_FILE).exists());
        assert!(!root.path().join("stamp").join(".cup.partial").exists());
    }

    #[test]
    fn audio_chunk_is_listed() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("cup");
        let clip = AudioClip {
            channels: 1,
            sample_rate: 8_000,
            samples: vec![0.1; 800],
        };

        let summary = SessionExporter::new(true)
            .export(SessionRecord::new("cup", dir.clone()), &object(), Some(clip))
            .unwrap();

        assert!(summary.files.contains(&"session_audio_0.wav".to_string()));
        assert_eq!(
            fs::read_to_string(dir.join(FILE_LIST)).unwrap(),
            "file 'session_audio_0.wav'\n"
        );
        assert_eq!(fs::metadata(dir.join("session_audio_0.wav")).unwrap().len(), 44 + 1_600);
        let png = image::open(dir.join(HEATMAP_FILE)).unwrap();
        assert_eq!(png.width(), 8);
    }

    #[test]
    fn failed_export_leaves_nothing() {
        let root = tempfile::tempdir().unwrap();
        // A file where the session directory should go blocks the export.
        let blocker = root.path().join("stamp");
        fs::write(&blocker, "not a directory").unwrap();
        let dir = blocker.join("cup");

        let result = SessionExporter::new(false).export(SessionRecord::new("cup", dir.clone()), &object(), None);
        assert!(result.is_err());
        assert!(!dir.exists());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn re_export_replaces_the_whole_archive() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("stamp").join("cup");
        let exporter = SessionExporter::new(false);

        let mut answered = SessionRecord::new("cup", dir.clone());
        answered.latch_answer(QuestionnaireAnswer {
            timestamp: 0.5,
            answer_text: "Beautiful / artistic".into(),
            estimated_local_position: Vec3::ZERO,
        });
        let clip = AudioClip {
            channels: 1,
            sample_rate: 8_000,
            samples: vec![0.1; 80],
        };
        exporter.export(answered, &object(), Some(clip)).unwrap();
        assert!(dir.join(QA_FILE).exists());
        assert!(dir.join("session_audio_0.wav").exists());

        let summary = exporter
            .export(SessionRecord::new("cup", dir.clone()), &object(), None)
            .unwrap();

        let mut on_disk: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        on_disk.sort();
        let mut expected = summary.files.clone();
        expected.sort();
        assert_eq!(on_disk, expected);
        assert_eq!(fs::read_to_string(dir.join(FILE_LIST)).unwrap(), "");

        let siblings: Vec<_> = fs::read_dir(root.path().join("stamp")).unwrap().collect();
        assert_eq!(siblings.len(), 1);
    }
}
