use glam::{
  Mat4,
  Vec3,
  Vec4,
};

use crate::error::UmbraViewerError;
use crate::scene::gpu::UmbraBindingTable;
use crate::scene::vertex;

/// The edge length of each cubemap face in texels.
pub const SHADOW_MAP_SIZE: u32 = 1024;
/// The near plane of the light frustum.
pub const SHADOW_NEAR_PLANE: f32 = 1.0;
/// The far plane of the light frustum. Fragments farther from the light than
/// this are treated as unshadowed.
pub const SHADOW_FAR_PLANE: f32 = 25.0;

/// The per face uniform block of the depth pass. The light position carries
/// the far plane in its w component.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct UmbraShadowFaceUniform {
  view_proj: [[f32; 4]; 4],
  light_position_far: [f32; 4],
}

/// The depth-only pass that renders the scene six times into a cubemap,
/// once per face, storing the fragment's distance to the light normalized
/// by the far plane.
pub struct UmbraShadowPass {
  pipeline: wgpu::RenderPipeline,
  face_views: [wgpu::TextureView; 6],
  cube_view: wgpu::TextureView,
  face_uniform_buffer: wgpu::Buffer,
  face_bind_group: wgpu::BindGroup,
  face_stride: u32,
}

/// The Drop implementation of the shadow pass.
impl Drop for UmbraShadowPass {
  fn drop(&mut self) {
    log::debug!("A UmbraShadowPass dropped.");
  }
}

/// The implementation of the shadow pass.
impl UmbraShadowPass {
  /// Create a new shadow pass.
  /// param device: The device.
  /// param shader: The depth shader module.
  /// param object_bind_group_layout: The shared per object uniform layout.
  /// return: The shadow pass.
  pub fn new(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    object_bind_group_layout: &wgpu::BindGroupLayout,
  ) -> Result<Self, UmbraViewerError> {
    let cubemap = device.create_texture(&wgpu::TextureDescriptor {
      label: Some("umbra_shadow_cubemap"),
      size: wgpu::Extent3d {
        width: SHADOW_MAP_SIZE,
        height: SHADOW_MAP_SIZE,
        depth_or_array_layers: 6,
      },
      mip_level_count: 1,
      sample_count: 1,
      dimension: wgpu::TextureDimension::D2,
      format: wgpu::TextureFormat::Depth32Float,
      usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
      view_formats: &[],
    });

    let face_views = std::array::from_fn(|face| {
      cubemap.create_view(&wgpu::TextureViewDescriptor {
        label: Some(&format!("umbra_shadow_face_{}", face)),
        dimension: Some(wgpu::TextureViewDimension::D2),
        base_array_layer: face as u32,
        array_layer_count: Some(1),
        ..Default::default()
      })
    });
    let cube_view = cubemap.create_view(&wgpu::TextureViewDescriptor {
      label: Some("umbra_shadow_cube_view"),
      dimension: Some(wgpu::TextureViewDimension::Cube),
      ..Default::default()
    });

    // One slot per face, selected with a dynamic offset so the whole frame
    // needs a single buffer write.
    let face_stride = crate::renderer::align_uniform_stride(
      device,
      std::mem::size_of::<UmbraShadowFaceUniform>() as u32,
    );
    let face_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
      label: Some("umbra_shadow_face_uniforms"),
      size: face_stride as u64 * 6,
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
      mapped_at_creation: false,
    });

    let face_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      label: Some("umbra_shadow_face_layout"),
      entries: &[wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
          ty: wgpu::BufferBindingType::Uniform,
          has_dynamic_offset: true,
          min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<UmbraShadowFaceUniform>() as u64),
        },
        count: None,
      }],
    });
    let face_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      label: Some("umbra_shadow_face_bind_group"),
      layout: &face_bind_group_layout,
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
          buffer: &face_uniform_buffer,
          offset: 0,
          size: wgpu::BufferSize::new(std::mem::size_of::<UmbraShadowFaceUniform>() as u64),
        }),
      }],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("umbra_shadow_pipeline_layout"),
      bind_group_layouts: &[object_bind_group_layout, &face_bind_group_layout],
      push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
      label: Some("umbra_shadow_pipeline"),
      layout: Some(&pipeline_layout),
      vertex: wgpu::VertexState {
        module: shader,
        entry_point: Some("vs_main"),
        compilation_options: Default::default(),
        buffers: &[vertex::position_layout()],
      },
      fragment: Some(wgpu::FragmentState {
        module: shader,
        entry_point: Some("fs_main"),
        compilation_options: Default::default(),
        targets: &[],
      }),
      primitive: wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        cull_mode: None,
        ..Default::default()
      },
      depth_stencil: Some(wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
      }),
      multisample: wgpu::MultisampleState::default(),
      multiview: None,
      cache: None,
    });

    log::debug!("A UmbraShadowPass created.");
    Ok(Self {
      pipeline,
      face_views,
      cube_view,
      face_uniform_buffer,
      face_bind_group,
      face_stride,
    })
  }

  /// The cubemap view the lit pass samples.
  pub fn cube_view(&self) -> &wgpu::TextureView {
    &self.cube_view
  }

  /// The view-projection matrix of each cubemap face for a light at the
  /// given position. Faces follow the cubemap layer order +X, -X, +Y, -Y,
  /// +Z, -Z with the conventional per face up vectors.
  /// param light_position: The light position in world space.
  /// return: The six face matrices.
  pub fn face_view_projections(light_position: Vec3) -> [Mat4; 6] {
    let projection = Mat4::perspective_rh(
      90.0f32.to_radians(),
      1.0,
      SHADOW_NEAR_PLANE,
      SHADOW_FAR_PLANE,
    );
    let faces = [
      (Vec3::X, Vec3::new(0.0, -1.0, 0.0)),
      (Vec3::NEG_X, Vec3::new(0.0, -1.0, 0.0)),
      (Vec3::Y, Vec3::new(0.0, 0.0, 1.0)),
      (Vec3::NEG_Y, Vec3::new(0.0, 0.0, -1.0)),
      (Vec3::Z, Vec3::new(0.0, -1.0, 0.0)),
      (Vec3::NEG_Z, Vec3::new(0.0, -1.0, 0.0)),
    ];
    faces.map(|(target, up)| {
      projection * Mat4::look_at_rh(light_position, light_position + target, up)
    })
  }

  /// Write the six face uniform slots for this frame's light.
  /// param queue: The queue.
  /// param light_position: The light position in world space.
  pub fn prepare(&self, queue: &wgpu::Queue, light_position: Vec3) {
    let matrices = Self::face_view_projections(light_position);
    for (face, view_proj) in matrices.iter().enumerate() {
      let uniform = UmbraShadowFaceUniform {
        view_proj: view_proj.to_cols_array_2d(),
        light_position_far: Vec4::from((light_position, SHADOW_FAR_PLANE)).to_array(),
      };
      queue.write_buffer(
        &self.face_uniform_buffer,
        face as u64 * self.face_stride as u64,
        bytemuck::bytes_of(&uniform),
      );
    }
  }

  /// Render all six faces. The caller skips this entirely when the scene has
  /// no point light.
  /// param encoder: The command encoder.
  /// param table: The binding table.
  /// param object_bind_group: The shared per object uniform bind group.
  /// param object_stride: The aligned per object uniform stride.
  pub fn render(
    &self,
    encoder: &mut wgpu::CommandEncoder,
    table: &UmbraBindingTable,
    object_bind_group: &wgpu::BindGroup,
    object_stride: u32,
  ) {
    for (face, face_view) in self.face_views.iter().enumerate() {
      let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("umbra_shadow_pass"),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
          view: face_view,
          depth_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(1.0),
            store: wgpu::StoreOp::Store,
          }),
          stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
      });

      pass.set_pipeline(&self.pipeline);
      pass.set_bind_group(1, &self.face_bind_group, &[face as u32 * self.face_stride]);
      for (entry_index, entry) in table.entries.iter().enumerate() {
        pass.set_bind_group(0, object_bind_group, &[entry_index as u32 * object_stride]);
        pass.set_vertex_buffer(0, entry.geometry.position_buffer.slice(..));
        pass.set_index_buffer(entry.geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..entry.geometry.index_count, 0, 0..1);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn six_faces_share_one_far_plane() {
    let matrices = UmbraShadowPass::face_view_projections(Vec3::new(2.0, 4.0, 1.0));
    assert_eq!(matrices.len(), 6);
    // A point at the far plane distance straight down each axis projects to
    // depth 1 in every face.
    let light = Vec3::new(2.0, 4.0, 1.0);
    let axes = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
    for (matrix, axis) in matrices.iter().zip(axes.iter()) {
      let far_point = light + *axis * SHADOW_FAR_PLANE;
      let clip = *matrix * Vec4::from((far_point, 1.0));
      assert!((clip.z / clip.w - 1.0).abs() < 1e-4, "axis {:?}", axis);
    }
  }

  #[test]
  fn faces_look_down_their_own_axis() {
    let light = Vec3::ZERO;
    let matrices = UmbraShadowPass::face_view_projections(light);
    let axes = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
    for (matrix, axis) in matrices.iter().zip(axes.iter()) {
      // A point on the face axis lands at the center of that face.
      let clip = *matrix * Vec4::from((*axis * 10.0, 1.0));
      assert!((clip.x / clip.w).abs() < 1e-4);
      assert!((clip.y / clip.w).abs() < 1e-4);
      assert!(clip.w > 0.0);
    }
  }

  #[test]
  fn faces_move_with_the_light() {
    let a = UmbraShadowPass::face_view_projections(Vec3::ZERO);
    let b = UmbraShadowPass::face_view_projections(Vec3::new(0.0, 3.0, 0.0));
    assert_ne!(a[0], b[0]);
  }
}
