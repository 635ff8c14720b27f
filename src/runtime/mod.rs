pub mod controller;
pub mod frame;

pub use controller::RuntimeController;
pub use frame::{CaptureRuntime, FrameInput, RuntimeSnapshot};
