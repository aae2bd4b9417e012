use glam::{
  Vec2,
  Vec3,
};

/// One drawable geometry unit within a mesh.
/// The normal and texture coordinate streams are zero-filled when the source
/// document omits them, so the three streams always share the vertex count.
pub struct UmbraPrimitive {
  pub indices: Vec<u32>,
  pub positions: Vec<Vec3>,
  pub normals: Vec<Vec3>,
  pub tex_coords: Vec<Vec2>,
  pub topology: wgpu::PrimitiveTopology,
  pub material_index: Option<u32>,
}

/// A mesh is an ordered collection of primitives.
pub struct UmbraMesh {
  pub primitives: Vec<UmbraPrimitive>,
}
