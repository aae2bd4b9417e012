pub mod mesh;
pub mod material;
pub mod scene;

pub use mesh::UmbraGpuPrimitive;
pub use material::UmbraResolvedMaterial;
pub use scene::{
  UmbraBindingEntry,
  UmbraBindingTable,
};
