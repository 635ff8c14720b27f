pub mod buffer;
pub mod kernel;
pub mod lut;
pub mod painter;
pub mod projector;

pub use buffer::{HeatmapBuffer, Quadrant, Texel, TexelCenter};
pub use kernel::HeatKernel;
pub use lut::{color_for, ColorLut, FIXED_HUE};
pub use painter::{PaintQueue, PaintStep};
pub use projector::{box_projection, SurfaceProjector};
