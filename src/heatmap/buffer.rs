//! Per-object interest buffer painted by gaze.
//!
//! A gaze point is spread over nearby texels by four quadrant sweeps that walk
//! outward from the centre texel and stop as soon as the kernel contribution
//! drops under the cutoff, so one update touches a neighbourhood whose size
//! depends on the kernel and not on the buffer resolution. Updates only ever
//! add (saturating at 1), which makes overlapping updates order-independent.

use std::ops::Index;
use std::sync::Arc;

use super::kernel::HeatKernel;
use super::lut::{color_for, ColorLut};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Texel {
    pub color: [f32; 3],
    pub alpha: f32,
}

impl Texel {
    pub const CLEAR: Texel = Texel {
        color: [0.0; 3],
        alpha: 0.0,
    };
}

/// One of the four sweep directions around the centre texel.
///
/// Start offsets are chosen so the quadrants partition the plane: the centre
/// row and column belong to the positive sweeps only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    PosXPosY,
    PosXNegY,
    NegXPosY,
    NegXNegY,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::PosXPosY,
        Quadrant::PosXNegY,
        Quadrant::NegXPosY,
        Quadrant::NegXNegY,
    ];

    fn signs(self) -> (i64, i64) {
        match self {
            Quadrant::PosXPosY => (1, 1),
            Quadrant::PosXNegY => (1, -1),
            Quadrant::NegXPosY => (-1, 1),
            Quadrant::NegXNegY => (-1, -1),
        }
    }

    fn start(self) -> (i64, i64) {
        let (sx, sy) = self.signs();
        (i64::from(sx < 0), i64::from(sy < 0))
    }
}

/// Integer texel a surface coordinate maps to. May lie outside the buffer;
/// the sweeps reject out-of-range texels individually.
///
/// Components are bounded by [`CENTER_LIMIT`] so sweep offsets cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexelCenter {
    pub x: i64,
    pub y: i64,
}

/// Far enough outside any buffer that no sweep reaches it, small enough that
/// `center ± dx` stays well inside `i64`.
pub const CENTER_LIMIT: f32 = 1.0e12;

pub struct HeatmapBuffer {
    width: usize,
    height: usize,
    texels: Vec<Texel>,
    kernel: HeatKernel,
    lut: Option<Arc<ColorLut>>,
    never_painted: bool,
    dirty: bool,
}

impl HeatmapBuffer {
    pub fn new(width: usize, height: usize, kernel: HeatKernel, lut: Option<Arc<ColorLut>>) -> Self {
        Self {
            width,
            height,
            texels: vec![Texel::CLEAR; width * height],
            kernel,
            lut,
            never_painted: true,
            dirty: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn kernel(&self) -> &HeatKernel {
        &self.kernel
    }

    pub fn never_painted(&self) -> bool {
        self.never_painted
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    pub fn texel(&self, x: usize, y: usize) -> Option<&Texel> {
        self.index_of(x, y).map(|i| &self.texels[i])
    }

    pub fn alpha(&self, x: usize, y: usize) -> f32 {
        self.texel(x, y).map_or(0.0, |t| t.alpha)
    }

    /// Overwrite one texel. Returns false when `(x, y)` is outside the buffer.
    pub fn set_texel(&mut self, x: usize, y: usize, texel: Texel) -> bool {
        match self.index_of(x, y) {
            Some(i) => {
                self.texels[i] = texel;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, texel: Texel) {
        self.texels.fill(texel);
        self.dirty = true;
    }

    /// `None` for a non-finite coordinate.
    pub fn texel_center(&self, u: f32, v: f32) -> Option<TexelCenter> {
        let axis = |t: f32, size: usize| -> Option<i64> {
            let scaled = (t * size as f32).floor();
            scaled
                .is_finite()
                .then(|| scaled.clamp(-CENTER_LIMIT, CENTER_LIMIT) as i64)
        };
        Some(TexelCenter {
            x: axis(u, self.width)?,
            y: axis(v, self.height)?,
        })
    }

    /// Zero the buffer if nothing has been painted since the last clear.
    pub fn prepare_paint(&mut self) {
        if self.never_painted {
            self.texels.fill(Texel::CLEAR);
            self.never_painted = false;
        }
    }

    /// Spread interest around `(u, v)`. Returns the number of texels visited.
    pub fn accumulate(&mut self, u: f32, v: f32) -> usize {
        let Some(center) = self.texel_center(u, v) else {
            return 0;
        };
        self.prepare_paint();
        let visited: usize = Quadrant::ALL
            .iter()
            .map(|&quadrant| self.sweep(center, quadrant))
            .sum();
        self.mark_dirty();
        visited
    }

    /// Walk one quadrant outward from `center`, column by column.
    ///
    /// A column stops at the first texel under the cutoff or outside the
    /// buffer. When the column's nearest texel already fails, every later
    /// column is farther away and the quadrant is done.
    pub fn sweep(&mut self, center: TexelCenter, quadrant: Quadrant) -> usize {
        let (sx, sy) = quadrant.signs();
        let (start_x, start_y) = quadrant.start();
        let (width, height) = (self.width as i64, self.height as i64);
        let mut visited = 0;

        for dx in start_x..width {
            let tx = center.x + dx * sx;
            if tx < 0 || tx >= width {
                break;
            }

            let mut column_painted = false;
            for dy in start_y..height {
                let ty = center.y + dy * sy;
                if ty < 0 || ty >= height {
                    break;
                }
                visited += 1;

                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                let Some(delta) = self.kernel.contribution(distance) else {
                    break;
                };
                self.add_interest(tx as usize, ty as usize, delta);
                column_painted = true;
            }

            if !column_painted {
                break;
            }
        }

        visited
    }

    fn add_interest(&mut self, x: usize, y: usize, delta: f32) {
        let i = y * self.width + x;
        let alpha = (self.texels[i].alpha + delta).clamp(0.0, 1.0);
        self.texels[i] = Texel {
            color: color_for(self.lut.as_deref(), alpha),
            alpha,
        };
    }

    /// Reset every texel to transparent and re-arm the lazy clear.
    pub fn clear(&mut self) {
        self.texels.fill(Texel::CLEAR);
        self.never_painted = true;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether a flush is pending and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Row-major RGBA8, row 0 first.
    pub fn to_rgba8(&self) -> Vec<u8> {
        fn channel(value: f32) -> u8 {
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        self.texels
            .iter()
            .flat_map(|t| {
                [
                    channel(t.color[0]),
                    channel(t.color[1]),
                    channel(t.color[2]),
                    channel(t.alpha),
                ]
            })
            .collect()
    }

    fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

impl Index<(usize, usize)> for HeatmapBuffer {
    type Output = Texel;

    fn index(&self, (x, y): (usize, usize)) -> &Texel {
        &self.texels[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(size: usize) -> HeatmapBuffer {
        HeatmapBuffer::new(size, size, HeatKernel::default(), None)
    }

    #[test]
    fn centre_texel_is_painted_once() {
        let mut heatmap = buffer(256);
        heatmap.accumulate(0.5, 0.5);

        let expected = heatmap.kernel().delta_at(0.0);
        assert_eq!(heatmap.alpha(128, 128), expected);
        // Neighbours on each side of the centre come from different quadrants.
        let side = heatmap.kernel().delta_at(1.0);
        for (x, y) in [(129, 128), (127, 128), (128, 129), (128, 127)] {
            assert_eq!(heatmap.alpha(x, y), side);
        }
    }

    #[test]
    fn painting_uses_fixed_hue_without_lut() {
        let mut heatmap = buffer(64);
        heatmap.accumulate(0.5, 0.5);
        assert_eq!(heatmap[(32, 32)].color, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn lut_colours_follow_alpha() {
        let lut = ColorLut::from_colors(vec![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]).unwrap();
        let mut heatmap = HeatmapBuffer::new(64, 64, HeatKernel::default(), Some(Arc::new(lut)));
        for _ in 0..80 {
            heatmap.accumulate(0.5, 0.5);
        }
        assert_eq!(heatmap.alpha(32, 32), 1.0);
        assert_eq!(heatmap[(32, 32)].color, [1.0, 0.0, 0.0]);
        assert_eq!(heatmap[(0, 0)], Texel::CLEAR);
    }

    #[test]
    fn corner_point_stays_in_bounds() {
        let mut heatmap = buffer(64);
        let visited = heatmap.accumulate(0.0, 0.0);
        assert!(visited > 0);
        assert!(heatmap.alpha(0, 0) > 0.0);

        let visited = heatmap.accumulate(1.0, 1.0);
        assert!(visited > 0);
        assert!(heatmap.alpha(63, 63) > 0.0);
    }

    #[test]
    fn far_outside_point_paints_nothing() {
        let mut heatmap = buffer(64);
        assert_eq!(heatmap.accumulate(3.0, -2.0), 0);
        assert!(heatmap.texels().iter().all(|t| t.alpha == 0.0));
    }

    #[test]
    fn huge_or_broken_coordinates_paint_nothing() {
        let mut heatmap = buffer(64);
        for (u, v) in [
            (-1.0e30, 0.5),
            (0.5, 1.0e30),
            (f32::MAX, f32::MIN),
            (f32::NEG_INFINITY, 0.5),
            (f32::NAN, 0.5),
        ] {
            assert_eq!(heatmap.accumulate(u, v), 0, "({u}, {v})");
        }
        assert!(heatmap.texels().iter().all(|t| t.alpha == 0.0));
        assert!(heatmap.texel_center(f32::NAN, 0.0).is_none());
        assert_eq!(
            heatmap.texel_center(-1.0e30, 0.5),
            Some(TexelCenter { x: -CENTER_LIMIT as i64, y: 32 })
        );
    }

    #[test]
    fn first_paint_after_clear_zeroes_stale_texels() {
        let mut heatmap = buffer(64);
        heatmap.clear();
        heatmap.set_texel(
            2,
            2,
            Texel {
                color: [1.0; 3],
                alpha: 0.8,
            },
        );
        assert!(heatmap.never_painted());

        heatmap.accumulate(0.75, 0.75);
        assert!(!heatmap.never_painted());
        assert_eq!(heatmap[(2, 2)], Texel::CLEAR);

        // Later paints leave untouched texels alone.
        heatmap.set_texel(2, 2, Texel { color: [1.0; 3], alpha: 0.8 });
        heatmap.accumulate(0.75, 0.75);
        assert_eq!(heatmap.alpha(2, 2), 0.8);
    }

    #[test]
    fn dirty_flag_is_taken_once() {
        let mut heatmap = buffer(16);
        assert!(!heatmap.take_dirty());
        heatmap.accumulate(0.5, 0.5);
        assert!(heatmap.take_dirty());
        assert!(!heatmap.take_dirty());
    }

    #[test]
    fn rgba_export_matches_texels() {
        let mut heatmap = buffer(4);
        heatmap.set_texel(1, 0, Texel { color: [1.0, 0.5, 0.0], alpha: 1.0 });
        let bytes = heatmap.to_rgba8();
        assert_eq!(bytes.len(), 4 * 4 * 4);
        assert_eq!(&bytes[4..8], &[255, 128, 0, 255]);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
    }
}
