pub mod loader;
pub mod transform;
pub mod vertex;
pub mod cpu;
pub mod gpu;

pub use transform::compose;
pub use vertex::UmbraVertexAttributeKind;
