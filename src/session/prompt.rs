//! Keeps the speaking prompt in front of the participant and facing them.

use glam::{Mat3, Quat, Vec3};

use crate::capture::HeadPose;
use crate::settings::PromptSettings;

/// Small lift so the prompt tilts slightly towards the eyes.
const LOOK_DISPLACEMENT: Vec3 = Vec3::new(0.0, 0.005, 0.0);

#[derive(Debug, Clone)]
pub struct PromptFollower {
    settings: PromptSettings,
    position: Vec3,
    rotation: Quat,
}

impl PromptFollower {
    pub fn new(settings: PromptSettings) -> Self {
        Self {
            settings,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Jump straight to the resting spot in front of `head`.
    pub fn place(&mut self, head: &HeadPose) {
        self.position = self.anchor(head);
        if let Some(target) = look_rotation(self.position - head.position - LOOK_DISPLACEMENT) {
            self.rotation = target;
        }
    }

    /// Move and turn towards the head by one frame's worth of `dt`.
    pub fn update(&mut self, dt: f32, head: &HeadPose) -> (Vec3, Quat) {
        let anchor = self.anchor(head);
        let move_t = (self.settings.move_speed * dt).clamp(0.0, 1.0);
        self.position = self.position.lerp(anchor, move_t);

        if let Some(target) = look_rotation(self.position - head.position - LOOK_DISPLACEMENT) {
            let previous = self.rotation;
            let turn_t = (self.settings.rotation_speed * dt).clamp(0.0, 1.0);
            self.rotation = previous.slerp(target, turn_t);
            if previous.angle_between(target).to_degrees() < self.settings.rotation_threshold_degrees {
                self.rotation = target;
            }
        }

        (self.position, self.rotation)
    }

    fn anchor(&self, head: &HeadPose) -> Vec3 {
        head.position
            + head.forward * self.settings.follow_distance
            + head.right * self.settings.horizontal_offset
            + head.up * self.settings.vertical_offset
    }
}

/// Rotation whose +Z axis points along `forward` with +Y kept up.
fn look_rotation(forward: Vec3) -> Option<Quat> {
    let z = forward.try_normalize()?;
    let x = Vec3::Y.cross(z).try_normalize()?;
    let y = z.cross(x);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)))
}
