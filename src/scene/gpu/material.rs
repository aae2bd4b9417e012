use glam::Vec3;

/// The shading parameters of a material, uploaded as one uniform block.
/// The layout mirrors the WGSL `Material` struct of the lit shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UmbraMaterialUniform {
  pub base_color: [f32; 3],
  pub textured: u32,
}

/// A material resolved to GPU resources: its uniform block, the base color
/// texture (or the shared white fallback) and the sampler, bound as one group.
pub struct UmbraResolvedMaterial {
  pub base_color: Vec3,
  pub textured: bool,
  pub bind_group: wgpu::BindGroup,
}

/// The Drop implementation of the resolved material.
impl Drop for UmbraResolvedMaterial {
  fn drop(&mut self) {
    log::debug!("A UmbraResolvedMaterial dropped.");
  }
}
