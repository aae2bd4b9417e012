use glam::{
  Vec3,
  Vec4,
};

use crate::error::UmbraViewerError;
use crate::scene::gpu::UmbraBindingTable;
use crate::scene::vertex;
use crate::shadow_pass::SHADOW_FAR_PLANE;

/// The background color of the lit pass.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
  r: 0.2,
  g: 0.2,
  b: 0.2,
  a: 1.0,
};

/// The per frame uniform block of the lit pass, mirroring the WGSL `Frame`
/// struct. When `shadows_enabled` is zero the shader skips the cubemap
/// lookup and every fragment is lit.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UmbraFrameUniform {
  pub light_position: [f32; 4],
  pub light_color: [f32; 4],
  pub camera_position: [f32; 4],
  pub far_plane: f32,
  pub shadows_enabled: u32,
  pub _padding: [u32; 2],
}

impl UmbraFrameUniform {
  /// Build the frame uniform for a lit, shadowed frame.
  pub fn lit(light_position: Vec3, light_color: Vec3, camera_position: Vec3) -> Self {
    Self {
      light_position: Vec4::from((light_position, 1.0)).to_array(),
      light_color: Vec4::from((light_color, 1.0)).to_array(),
      camera_position: Vec4::from((camera_position, 1.0)).to_array(),
      far_plane: SHADOW_FAR_PLANE,
      shadows_enabled: 1,
      _padding: [0; 2],
    }
  }

  /// Build the frame uniform for a scene without a point light.
  pub fn unshadowed(camera_position: Vec3) -> Self {
    Self {
      light_position: [0.0; 4],
      light_color: [1.0, 1.0, 1.0, 1.0],
      camera_position: Vec4::from((camera_position, 1.0)).to_array(),
      far_plane: SHADOW_FAR_PLANE,
      shadows_enabled: 0,
      _padding: [0; 2],
    }
  }
}

/// The forward pass that shades every drawable with its material, the point
/// light and the shadow cubemap written by the depth pass.
pub struct UmbraScenePass {
  pipeline: wgpu::RenderPipeline,
  material_bind_group_layout: wgpu::BindGroupLayout,
  frame_uniform_buffer: wgpu::Buffer,
  frame_bind_group: wgpu::BindGroup,
}

/// The Drop implementation of the scene pass.
impl Drop for UmbraScenePass {
  fn drop(&mut self) {
    log::debug!("A UmbraScenePass dropped.");
  }
}

/// The implementation of the scene pass.
impl UmbraScenePass {
  /// Create a new scene pass.
  /// param device: The device.
  /// param shader: The lit shader module.
  /// param surface_format: The surface texture format.
  /// param object_bind_group_layout: The shared per object uniform layout.
  /// param shadow_cube_view: The shadow cubemap view to sample.
  /// return: The scene pass.
  pub fn new(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    object_bind_group_layout: &wgpu::BindGroupLayout,
    shadow_cube_view: &wgpu::TextureView,
  ) -> Result<Self, UmbraViewerError> {
    let material_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      label: Some("umbra_material_layout"),
      entries: &[
        wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
          },
          count: None,
        },
        wgpu::BindGroupLayoutEntry {
          binding: 1,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
          },
          count: None,
        },
        wgpu::BindGroupLayoutEntry {
          binding: 2,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
          count: None,
        },
      ],
    });

    let frame_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      label: Some("umbra_frame_layout"),
      entries: &[
        wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<UmbraFrameUniform>() as u64),
          },
          count: None,
        },
        wgpu::BindGroupLayoutEntry {
          binding: 1,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: wgpu::TextureViewDimension::Cube,
            multisampled: false,
          },
          count: None,
        },
        wgpu::BindGroupLayoutEntry {
          binding: 2,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
          count: None,
        },
      ],
    });

    let frame_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
      label: Some("umbra_frame_uniform"),
      size: std::mem::size_of::<UmbraFrameUniform>() as u64,
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
      mapped_at_creation: false,
    });

    // The cubemap stores distances, not hardware depth, so it is sampled
    // with plain nearest lookups instead of a comparison sampler.
    let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
      label: Some("umbra_shadow_sampler"),
      address_mode_u: wgpu::AddressMode::ClampToEdge,
      address_mode_v: wgpu::AddressMode::ClampToEdge,
      address_mode_w: wgpu::AddressMode::ClampToEdge,
      mag_filter: wgpu::FilterMode::Nearest,
      min_filter: wgpu::FilterMode::Nearest,
      ..Default::default()
    });

    let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      label: Some("umbra_frame_bind_group"),
      layout: &frame_bind_group_layout,
      entries: &[
        wgpu::BindGroupEntry {
          binding: 0,
          resource: frame_uniform_buffer.as_entire_binding(),
        },
        wgpu::BindGroupEntry {
          binding: 1,
          resource: wgpu::BindingResource::TextureView(shadow_cube_view),
        },
        wgpu::BindGroupEntry {
          binding: 2,
          resource: wgpu::BindingResource::Sampler(&shadow_sampler),
        },
      ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("umbra_scene_pipeline_layout"),
      bind_group_layouts: &[
        object_bind_group_layout,
        &material_bind_group_layout,
        &frame_bind_group_layout,
      ],
      push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
      label: Some("umbra_scene_pipeline"),
      layout: Some(&pipeline_layout),
      vertex: wgpu::VertexState {
        module: shader,
        entry_point: Some("vs_main"),
        compilation_options: Default::default(),
        buffers: &[
          vertex::position_layout(),
          vertex::normal_layout(),
          vertex::tex_coord_layout(),
        ],
      },
      fragment: Some(wgpu::FragmentState {
        module: shader,
        entry_point: Some("fs_main"),
        compilation_options: Default::default(),
        targets: &[Some(wgpu::ColorTargetState {
          format: surface_format,
          blend: Some(wgpu::BlendState::REPLACE),
          write_mask: wgpu::ColorWrites::ALL,
        })],
      }),
      primitive: wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        cull_mode: Some(wgpu::Face::Back),
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

    log::debug!("A UmbraScenePass created.");
    Ok(Self {
      pipeline,
      material_bind_group_layout,
      frame_uniform_buffer,
      frame_bind_group,
    })
  }

  /// The bind group layout material bind groups are created against.
  pub fn material_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
    &self.material_bind_group_layout
  }

  /// Write this frame's lighting and camera state.
  /// param queue: The queue.
  /// param uniform: The frame uniform.
  pub fn prepare(&self, queue: &wgpu::Queue, uniform: &UmbraFrameUniform) {
    queue.write_buffer(&self.frame_uniform_buffer, 0, bytemuck::bytes_of(uniform));
  }

  /// Render every binding-table entry to the surface.
  /// param encoder: The command encoder.
  /// param surface_view: The surface texture view.
  /// param depth_view: The window depth buffer view.
  /// param table: The binding table.
  /// param object_bind_group: The shared per object uniform bind group.
  /// param object_stride: The aligned per object uniform stride.
  pub fn render(
    &self,
    encoder: &mut wgpu::CommandEncoder,
    surface_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    table: &UmbraBindingTable,
    object_bind_group: &wgpu::BindGroup,
    object_stride: u32,
  ) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
      label: Some("umbra_scene_pass"),
      color_attachments: &[Some(wgpu::RenderPassColorAttachment {
        view: surface_view,
        depth_slice: None,
        resolve_target: None,
        ops: wgpu::Operations {
          load: wgpu::LoadOp::Clear(CLEAR_COLOR),
          store: wgpu::StoreOp::Store,
        },
      })],
      depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
        view: depth_view,
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
    pass.set_bind_group(2, &self.frame_bind_group, &[]);
    for (entry_index, entry) in table.entries.iter().enumerate() {
      pass.set_bind_group(0, object_bind_group, &[entry_index as u32 * object_stride]);
      pass.set_bind_group(1, &entry.material.bind_group, &[]);
      pass.set_vertex_buffer(vertex::POSITION_SLOT, entry.geometry.position_buffer.slice(..));
      pass.set_vertex_buffer(vertex::NORMAL_SLOT, entry.geometry.normal_buffer.slice(..));
      pass.set_vertex_buffer(vertex::TEX_COORD_SLOT, entry.geometry.tex_coord_buffer.slice(..));
      pass.set_index_buffer(entry.geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
      pass.draw_indexed(0..entry.geometry.index_count, 0, 0..1);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unshadowed_frames_disable_the_cubemap_lookup() {
    let uniform = UmbraFrameUniform::unshadowed(Vec3::new(3.0, 5.0, 13.0));
    assert_eq!(uniform.shadows_enabled, 0);
    assert_eq!(uniform.camera_position[..3], [3.0, 5.0, 13.0]);
  }

  #[test]
  fn lit_frames_carry_the_light_and_far_plane() {
    let uniform = UmbraFrameUniform::lit(Vec3::Y, Vec3::ONE, Vec3::Z);
    assert_eq!(uniform.shadows_enabled, 1);
    assert_eq!(uniform.light_position[..3], [0.0, 1.0, 0.0]);
    assert_eq!(uniform.far_plane, SHADOW_FAR_PLANE);
  }
}
