//! Mapping between world, object-local and authoring space.
//!
//! Point-cloud rows, questionnaire estimates and exported mesh vertices all
//! go through [`to_authoring_space`] with the same rotation so the files share
//! one right-handed frame.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rotation applied when moving local points into authoring space.
///
/// Built from Euler degrees composed X, then Y, then Z. Kept as a quaternion
/// because the inverse of a compound rotation is not another X/Y/Z triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthoredRotation {
    quat: Quat,
}

impl Default for AuthoredRotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AuthoredRotation {
    pub const IDENTITY: Self = Self {
        quat: Quat::IDENTITY,
    };

    pub fn from_euler_degrees(angles: Vec3) -> Self {
        let x = Quat::from_rotation_x(angles.x.to_radians());
        let y = Quat::from_rotation_y(angles.y.to_radians());
        let z = Quat::from_rotation_z(angles.z.to_radians());
        Self { quat: z * y * x }
    }

    pub fn from_quat(quat: Quat) -> Self {
        Self {
            quat: quat.normalize(),
        }
    }

    pub fn quat(&self) -> Quat {
        self.quat
    }

    /// The rotation that undoes [`to_authoring_space`] for `self`.
    ///
    /// The X mirror conjugates the inverse rotation: reflecting across the YZ
    /// plane keeps the X component of the quaternion axis and flips Y and Z.
    pub fn inverted(&self) -> Self {
        let inverse = self.quat.inverse();
        Self {
            quat: Quat::from_xyzw(inverse.x, -inverse.y, -inverse.z, inverse.w),
        }
    }
}

/// Rotate `point` by the authored rotation and mirror the X axis.
pub fn to_authoring_space(point: Vec3, rotation: AuthoredRotation) -> Vec3 {
    let rotated = rotation.quat * point;
    Vec3::new(-rotated.x, rotated.y, rotated.z)
}

/// Placement of a tracked object in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTransform {
    pub position: Vec3,
    /// Euler angles in degrees, composed X then Y then Z.
    pub rotation_degrees: Vec3,
    pub scale: Vec3,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_degrees: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl ObjectTransform {
    pub fn authored_rotation(&self) -> AuthoredRotation {
        AuthoredRotation::from_euler_degrees(self.rotation_degrees)
    }

    pub fn rotation(&self) -> Quat {
        self.authored_rotation().quat()
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation() * (local * self.scale)
    }

    /// World point to object-local point. A zero scale component yields
    /// non-finite coordinates, which callers treat as "outside".
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        (self.rotation().inverse() * (world - self.position)) / self.scale
    }
}
