/// The GPU resources of one primitive: an index buffer plus one vertex
/// buffer per attribute stream, split so the depth-only pass can bind
/// positions alone.
pub struct UmbraGpuPrimitive {
  pub position_buffer: wgpu::Buffer,
  pub normal_buffer: wgpu::Buffer,
  pub tex_coord_buffer: wgpu::Buffer,
  pub index_buffer: wgpu::Buffer,
  pub index_count: u32,
}

/// The Drop implementation of the GPU primitive.
impl Drop for UmbraGpuPrimitive {
  fn drop(&mut self) {
    log::debug!("A UmbraGpuPrimitive dropped.");
  }
}
