use glam::Vec3;

/// A material for drawable primitives.
/// Texture presence wins over the flat factor at render time.
pub struct UmbraMaterial {
  pub name: String,
  pub base_color_texture_index: Option<u32>,
  pub base_color_factor: Vec3,
}

/// A texture couples an image with an optional sampler.
pub struct UmbraTextureRef {
  pub image_index: u32,
  pub sampler_index: Option<u32>,
}

/// The sampling state of a texture.
/// Unset filters fall back to the graphics-device default at upload time.
pub struct UmbraSamplerDesc {
  pub mag_filter: Option<wgpu::FilterMode>,
  pub min_filter: Option<wgpu::FilterMode>,
  pub wrap_u: wgpu::AddressMode,
  pub wrap_v: wgpu::AddressMode,
}

/// The default implementation of the sampler state.
impl Default for UmbraSamplerDesc {
  fn default() -> Self {
    Self {
      mag_filter: None,
      min_filter: None,
      wrap_u: wgpu::AddressMode::Repeat,
      wrap_v: wgpu::AddressMode::Repeat,
    }
  }
}
