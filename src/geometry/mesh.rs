//! Triangle mesh of a tracked object, in object-local space.

use anyhow::{bail, Result};
use glam::{Vec2, Vec3};

use super::bounds::LocalBounds;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    /// Per-vertex normals; empty when the source mesh carries none.
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Triangle index lists, one per submesh.
    pub submeshes: Vec<Vec<u32>>,
}

impl Mesh {
    /// Axis-aligned box centred on the origin, four vertices per face so each
    /// face gets its own normal and a full 0..1 UV square.
    pub fn cuboid(half_extents: Vec3) -> Self {
        const FACES: [(Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::Z),
            (Vec3::NEG_Y, Vec3::Z),
            (Vec3::Z, Vec3::X),
            (Vec3::NEG_Z, Vec3::X),
        ];
        const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut mesh = Mesh::default();
        let mut triangles = Vec::with_capacity(36);

        for (normal, tangent) in FACES {
            let bitangent = normal.cross(tangent);
            let base = mesh.vertices.len() as u32;
            for (s, t) in CORNERS {
                let corner = normal + tangent * s + bitangent * t;
                mesh.vertices.push(corner * half_extents);
                mesh.normals.push(normal);
                mesh.uvs.push(Vec2::new((s + 1.0) * 0.5, (t + 1.0) * 0.5));
            }
            triangles.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh.submeshes.push(triangles);
        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|t| t.len() / 3).sum()
    }

    pub fn bounds(&self) -> Option<LocalBounds> {
        LocalBounds::from_points(&self.vertices)
    }

    /// Every index list must hold whole triangles referencing existing vertices.
    pub fn validate(&self) -> Result<()> {
        for (i, triangles) in self.submeshes.iter().enumerate() {
            if triangles.len() % 3 != 0 {
                bail!(
                    "submesh {i} has {} indices, not a multiple of 3",
                    triangles.len()
                );
            }
            if let Some(&bad) = triangles
                .iter()
                .find(|&&index| index as usize >= self.vertices.len())
            {
                bail!(
                    "submesh {i} references vertex {bad} but the mesh has {}",
                    self.vertices.len()
                );
            }
        }
        if !self.normals.is_empty() && self.normals.len() != self.vertices.len() {
            bail!(
                "mesh has {} normals for {} vertices",
                self.normals.len(),
                self.vertices.len()
            );
        }
        if !self.uvs.is_empty() && self.uvs.len() != self.vertices.len() {
            bail!(
                "mesh has {} uvs for {} vertices",
                self.uvs.len(),
                self.vertices.len()
            );
        }
        Ok(())
    }

    /// Area-weighted vertex normals from the current triangle winding.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for triangles in &self.submeshes {
            for tri in triangles.chunks_exact(3) {
                let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
                let face = (self.vertices[b] - self.vertices[a])
                    .cross(self.vertices[c] - self.vertices[a]);
                normals[a] += face;
                normals[b] += face;
                normals[c] += face;
            }
        }
        self.normals = normals.into_iter().map(Vec3::normalize_or_zero).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_faces_wind_outward() {
        let mesh = Mesh::cuboid(Vec3::new(1.0, 2.0, 0.5));
        mesh.validate().unwrap();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);

        let mut recalculated = mesh.clone();
        recalculated.recalculate_normals();
        for (stored, computed) in mesh.normals.iter().zip(&recalculated.normals) {
            assert!((*stored - *computed).length() < 1e-6);
        }

        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -0.5));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn validate_rejects_dangling_index() {
        let mut mesh = Mesh::cuboid(Vec3::ONE);
        mesh.submeshes[0].push(99);
        assert!(mesh.validate().is_err());
        mesh.submeshes[0].extend_from_slice(&[0, 1]);
        assert!(mesh.validate().is_err());
    }
}
