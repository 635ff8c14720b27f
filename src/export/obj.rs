//! Wavefront OBJ writer for the viewed mesh.

use std::fmt::Write;

use crate::export::csv::fixed6;
use crate::geometry::{to_authoring_space, AuthoredRotation, Mesh};

pub const OBJ_HEADER: &str = "# Exported Gaze Object";

fn fmt(value: f32) -> String {
    fixed6(f64::from(value))
}

/// Serialize `mesh` in authoring space.
///
/// Vertices and normals go through the same transform as the point cloud.
/// The X mirror flips handedness, so each triangle is written with its first
/// and third index swapped to keep faces pointing outward.
pub fn mesh_to_obj(mesh: &Mesh, rotation: AuthoredRotation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{OBJ_HEADER}");

    let mut exported = Mesh {
        vertices: mesh
            .vertices
            .iter()
            .map(|&v| to_authoring_space(v, rotation))
            .collect(),
        normals: mesh
            .normals
            .iter()
            .map(|&n| to_authoring_space(n, rotation).normalize_or_zero())
            .collect(),
        uvs: mesh.uvs.clone(),
        submeshes: mesh
            .submeshes
            .iter()
            .map(|triangles| {
                triangles
                    .chunks_exact(3)
                    .flat_map(|tri| [tri[2], tri[1], tri[0]])
                    .collect()
            })
            .collect(),
    };
    if exported.normals.len() != exported.vertices.len() {
        exported.recalculate_normals();
    }

    for v in &exported.vertices {
        let _ = writeln!(out, "v {} {} {}", fmt(v.x), fmt(v.y), fmt(v.z));
    }
    for n in &exported.normals {
        let _ = writeln!(out, "vn {} {} {}", fmt(n.x), fmt(n.y), fmt(n.z));
    }
    for uv in &exported.uvs {
        let _ = writeln!(out, "vt {} {}", fmt(uv.x), fmt(uv.y));
    }
    for triangles in &exported.submeshes {
        for tri in triangles.chunks_exact(3) {
            let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
            let _ = writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}");
        }
    }

    out
}
