//! Logistic interest kernel used by the heatmap sweeps

use crate::settings::HeatmapSettings;

/// `-ln` of the smallest positive subnormal `f32` (1.4e-45). The kernel raises
/// that value to `-2d`, which is `e^(2 * SUBNORMAL_LN_ABS * d)`.
const SUBNORMAL_LN_ABS: f32 = 103.278_93;

/// Kernel steepness applied to the normalised distance
const STEEPNESS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatKernel {
    pub spread: f32,
    pub intensity: f32,
    pub min_delta: f32,
}

impl Default for HeatKernel {
    fn default() -> Self {
        Self::from_settings(&HeatmapSettings::default())
    }
}

impl HeatKernel {
    pub fn from_settings(settings: &HeatmapSettings) -> Self {
        Self {
            spread: settings.spread,
            intensity: settings.intensity,
            min_delta: settings.min_delta,
        }
    }

    /// Alpha added to a texel `distance` texels away from the gaze centre.
    /// Equals `0.5 / intensity` at the centre and decays towards zero.
    pub fn delta_at(&self, distance: f32) -> f32 {
        let d = distance / self.spread;
        let interest = 1.0 / (1.0 + (STEEPNESS * SUBNORMAL_LN_ABS * d).exp());
        interest / self.intensity
    }

    /// `None` once the contribution is too small to keep sweeping
    pub fn contribution(&self, distance: f32) -> Option<f32> {
        let delta = self.delta_at(distance);
        (delta >= self.min_delta).then_some(delta)
    }
}
