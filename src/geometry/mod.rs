pub mod bounds;
pub mod mesh;
pub mod transform;

pub use bounds::LocalBounds;
pub use mesh::Mesh;
pub use transform::{to_authoring_space, AuthoredRotation, ObjectTransform};
