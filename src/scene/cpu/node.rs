use glam::{
  Mat4,
  Quat,
  Vec3,
};

use crate::scene::transform;

/// A node is a collection of optional transform components and object references.
pub struct UmbraNode {
  pub name: String,
  pub translation: Option<Vec3>,
  pub rotation: Option<Quat>,
  pub scale: Option<Vec3>,

  pub mesh_index: Option<u32>,
  pub light_index: Option<u32>,
}

/// The default implementation of the node.
impl Default for UmbraNode {
  fn default() -> Self {
    Self {
      name: String::new(),
      translation: None,
      rotation: None,
      scale: None,
      mesh_index: None,
      light_index: None,
    }
  }
}

/// The implementation of the node.
impl UmbraNode {
  /// Compose the world transform of this node from its components.
  /// return: The world matrix.
  pub fn world_transform(&self) -> Mat4 {
    transform::compose(self.translation, self.rotation, self.scale)
  }
}
