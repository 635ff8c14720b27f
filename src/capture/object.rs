use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::geometry::{AuthoredRotation, LocalBounds, Mesh, ObjectTransform};
use crate::heatmap::{ColorLut, HeatKernel, HeatmapBuffer, PaintQueue};
use crate::settings::HeatmapSettings;

/// An artifact shown to the participant, with its own heatmap.
pub struct TrackedObject {
    pub id: String,
    pub transform: ObjectTransform,
    /// Local-space volume a gaze point must fall in to join the point cloud.
    pub bounds: LocalBounds,
    pub mesh: Mesh,
    pub heatmap: HeatmapBuffer,
    pub painter: PaintQueue,
    /// Set once a session for this object has been exported.
    pub recorded: bool,
}

impl TrackedObject {
    pub fn new(
        id: impl Into<String>,
        transform: ObjectTransform,
        mesh: Mesh,
        settings: &HeatmapSettings,
        lut: Option<Arc<ColorLut>>,
    ) -> Result<Self> {
        let id = id.into();
        mesh.validate()
            .with_context(|| format!("Invalid mesh for object {id}"))?;
        let bounds = mesh
            .bounds()
            .ok_or_else(|| anyhow!("object {id} has an empty mesh"))?;

        let size = settings.texture_size;
        Ok(Self {
            id,
            transform,
            bounds,
            mesh,
            heatmap: HeatmapBuffer::new(size, size, HeatKernel::from_settings(settings), lut),
            painter: PaintQueue::new(settings.max_pending_paints),
            recorded: false,
        })
    }

    pub fn with_bounds(mut self, bounds: LocalBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn authored_rotation(&self) -> AuthoredRotation {
        self.transform.authored_rotation()
    }

    /// Drop pending paints and wipe the heatmap.
    pub fn clear_heatmap(&mut self) {
        self.painter.cancel_all();
        self.heatmap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn bounds_come_from_mesh() {
        let settings = HeatmapSettings {
            texture_size: 32,
            ..Default::default()
        };
        let object = TrackedObject::new(
            "vase",
            ObjectTransform::default(),
            Mesh::cuboid(Vec3::new(0.5, 1.0, 0.5)),
            &settings,
            None,
        )
        .unwrap();

        assert_eq!(object.bounds.max, Vec3::new(0.5, 1.0, 0.5));
        assert_eq!(object.heatmap.width(), 32);
        assert!(!object.recorded);
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let result = TrackedObject::new(
            "empty",
            ObjectTransform::default(),
            Mesh::default(),
            &HeatmapSettings::default(),
            None,
        );
        assert!(result.is_err());
    }
}
