pub mod node;
pub mod material;
pub mod image_data;
pub mod mesh;
pub mod light;
pub mod scene;

pub use scene::{
  UmbraScene,
  UmbraDrawRef,
};
