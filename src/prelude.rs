pub use crate::error::UmbraViewerError;
pub use crate::camera::UmbraCamera;
pub use crate::renderer::UmbraRenderer;
pub use crate::scene::cpu::UmbraScene;
pub use crate::scene::cpu::light::UmbraPointLight;
pub use crate::scene::gpu::UmbraBindingTable;
