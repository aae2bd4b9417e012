pub mod prelude;
pub mod error;
pub mod camera;
pub mod shader;
pub mod shadow_pass;
pub mod scene_pass;
pub mod renderer;
pub mod scene;
