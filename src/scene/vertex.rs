/// The recognized per-vertex attribute kinds.
/// Unrecognized semantics keep their source name for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UmbraVertexAttributeKind {
  Position,
  Normal,
  TexCoord0,
  Unrecognized(String),
}

impl UmbraVertexAttributeKind {
  pub fn from_semantic(semantic: &gltf::Semantic) -> Self {
    match semantic {
      gltf::Semantic::Positions => Self::Position,
      gltf::Semantic::Normals => Self::Normal,
      gltf::Semantic::TexCoords(0) => Self::TexCoord0,
      other => Self::Unrecognized(other.to_string()),
    }
  }
}

/// The vertex buffer slot of each recognized attribute.
pub const POSITION_SLOT: u32 = 0;
pub const NORMAL_SLOT: u32 = 1;
pub const TEX_COORD_SLOT: u32 = 2;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const TEX_COORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];

/// The vertex buffer layout of the position attribute.
pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
  wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &POSITION_ATTRIBUTES,
  }
}

/// The vertex buffer layout of the normal attribute.
pub fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
  wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &NORMAL_ATTRIBUTES,
  }
}

/// The vertex buffer layout of the texture coordinate attribute.
pub fn tex_coord_layout() -> wgpu::VertexBufferLayout<'static> {
  wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &TEX_COORD_ATTRIBUTES,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recognized_semantics_map_to_closed_variants() {
    assert_eq!(
      UmbraVertexAttributeKind::from_semantic(&gltf::Semantic::Positions),
      UmbraVertexAttributeKind::Position
    );
    assert_eq!(
      UmbraVertexAttributeKind::from_semantic(&gltf::Semantic::Normals),
      UmbraVertexAttributeKind::Normal
    );
    assert_eq!(
      UmbraVertexAttributeKind::from_semantic(&gltf::Semantic::TexCoords(0)),
      UmbraVertexAttributeKind::TexCoord0
    );
  }

  #[test]
  fn unknown_semantics_keep_their_name() {
    let kind = UmbraVertexAttributeKind::from_semantic(&gltf::Semantic::TexCoords(1));
    match kind {
      UmbraVertexAttributeKind::Unrecognized(name) => assert_eq!(name, "TEXCOORD_1"),
      other => panic!("Expected an unrecognized attribute, got {:?}.", other),
    }
  }
}
