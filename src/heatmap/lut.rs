//! One-dimensional colour lookup for heatmap texels

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Hue used when no lookup table is configured
pub const FIXED_HUE: [f32; 3] = [0.0, 0.0, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub struct ColorLut {
    colors: Vec<[f32; 3]>,
}

impl ColorLut {
    pub fn from_colors(colors: Vec<[f32; 3]>) -> Result<Self> {
        if colors.is_empty() {
            bail!("colour lookup table needs at least one entry");
        }
        Ok(Self { colors })
    }

    /// Reads the first row of any image format the `image` crate understands
    pub fn from_image(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Failed to open lookup table {}", path.display()))?
            .to_rgb32f();

        let colors = (0..image.width())
            .map(|x| image.get_pixel(x, 0).0)
            .collect::<Vec<_>>();

        Self::from_colors(colors)
            .with_context(|| format!("Lookup table {} is empty", path.display()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour for a normalised interest value; truncates like a texel fetch
    pub fn sample(&self, interest: f32) -> [f32; 3] {
        let last = self.colors.len() - 1;
        let index = (interest.clamp(0.0, 1.0) * last as f32) as usize;
        self.colors[index.min(last)]
    }
}

/// Lookup colour for `interest`, or the fixed hue when there is no table
pub fn color_for(lut: Option<&ColorLut>, interest: f32) -> [f32; 3] {
    lut.map_or(FIXED_HUE, |lut| lut.sample(interest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_cover_both_ends() {
        let lut = ColorLut::from_colors(vec![
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
        ])
        .unwrap();

        assert_eq!(lut.sample(0.0), [0.0, 0.0, 1.0]);
        assert_eq!(lut.sample(0.49), [0.0, 0.0, 1.0]);
        assert_eq!(lut.sample(0.5), [0.0, 1.0, 0.0]);
        assert_eq!(lut.sample(1.0), [1.0, 0.0, 0.0]);
        assert_eq!(lut.sample(7.0), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_table_uses_fixed_hue() {
        assert_eq!(color_for(None, 0.7), FIXED_HUE);
        assert!(ColorLut::from_colors(Vec::new()).is_err());
    }

    #[test]
    fn loads_strip_from_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lut.png");
        let mut strip = image::RgbImage::new(2, 1);
        strip.put_pixel(0, 0, image::Rgb([0, 0, 255]));
        strip.put_pixel(1, 0, image::Rgb([255, 0, 0]));
        strip.save(&path).unwrap();

        let lut = ColorLut::from_image(&path).unwrap();
        assert_eq!(lut.len(), 2);
        assert_eq!(lut.sample(1.0), [1.0, 0.0, 0.0]);
    }
}
