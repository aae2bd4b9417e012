use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::error::UmbraViewerError;
use super::super::{
  cpu::scene::UmbraScene,
  cpu::material::UmbraSamplerDesc,
  gpu::mesh::UmbraGpuPrimitive,
  gpu::material::{UmbraMaterialUniform, UmbraResolvedMaterial},
  gpu::scene::{UmbraBindingEntry, UmbraBindingTable},
};

/// The scene GPU uploader.
pub struct UmbraSceneGPUUploader;

/// The implementation of the scene GPU uploader.
impl UmbraSceneGPUUploader {
  /// Upload the scene to the GPU and build the binding table.
  /// param device: The device.
  /// param queue: The queue.
  /// param material_bind_group_layout: The material bind group layout of the lit pipeline.
  /// param supports_16bit_norm: Whether the device supports 16 bit normalized texture formats.
  /// param scene: The CPU scene.
  /// return: The binding table.
  pub fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    material_bind_group_layout: &wgpu::BindGroupLayout,
    supports_16bit_norm: bool,
    scene: &UmbraScene,
  ) -> Result<UmbraBindingTable, UmbraViewerError> {
    // Upload every image once, entries resolve into this list by index.
    let mut image_views = Vec::new();
    for (index, image) in scene.images.iter().enumerate() {
      if image.needs_16bit_norm() && !supports_16bit_norm {
        return Err(UmbraViewerError::new(
          &format!("Image {} uses a 16 bit format the device does not support.", index),
          None));
      }
      image_views.push(Self::upload_image(device, queue, index, image));
    }

    let mut samplers = Vec::new();
    for desc in scene.samplers.iter() {
      samplers.push(Self::create_sampler(device, desc));
    }
    let default_sampler = Self::create_sampler(device, &UmbraSamplerDesc::default());

    // Untextured materials sample a 1x1 white pixel so one pipeline covers
    // both paths.
    let white_view = Self::create_white_fallback(device, queue);

    let mut entries = Vec::new();
    for draw_ref in scene.draw_order() {
      let primitive = &scene.meshes[draw_ref.mesh_index as usize]
        .primitives[draw_ref.primitive_index as usize];

      let geometry = Self::upload_primitive(device, primitive);
      let material = Self::resolve_material(
        device,
        material_bind_group_layout,
        scene,
        primitive.material_index,
        &image_views,
        &samplers,
        &default_sampler,
        &white_view,
      );

      entries.push(UmbraBindingEntry {
        draw_ref,
        geometry,
        material,
      });
    }

    log::debug!("A UmbraBindingTable with {} entries created.", entries.len());
    Ok(UmbraBindingTable { entries })
  }

  /// Upload one primitive's index and vertex streams.
  fn upload_primitive(device: &wgpu::Device, primitive: &super::super::cpu::mesh::UmbraPrimitive) -> UmbraGpuPrimitive {
    let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("umbra_positions"),
      contents: bytemuck::cast_slice(primitive.positions.as_slice()),
      usage: wgpu::BufferUsages::VERTEX,
    });
    let normal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("umbra_normals"),
      contents: bytemuck::cast_slice(primitive.normals.as_slice()),
      usage: wgpu::BufferUsages::VERTEX,
    });
    let tex_coord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("umbra_tex_coords"),
      contents: bytemuck::cast_slice(primitive.tex_coords.as_slice()),
      usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("umbra_indices"),
      contents: bytemuck::cast_slice(primitive.indices.as_slice()),
      usage: wgpu::BufferUsages::INDEX,
    });

    UmbraGpuPrimitive {
      position_buffer,
      normal_buffer,
      tex_coord_buffer,
      index_buffer,
      index_count: primitive.indices.len() as u32,
    }
  }

  /// Upload one image as a 2D texture and return its view.
  fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    index: usize,
    image: &super::super::cpu::image_data::UmbraImageData,
  ) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
      label: Some(&format!("umbra_image_{}", index)),
      size: wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
      },
      mip_level_count: 1,
      sample_count: 1,
      dimension: wgpu::TextureDimension::D2,
      format: image.format,
      usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
      view_formats: &[],
    });
    queue.write_texture(
      wgpu::TexelCopyTextureInfo {
        texture: &texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
      },
      image.pixels.as_slice(),
      wgpu::TexelCopyBufferLayout {
        offset: 0,
        bytes_per_row: Some(image.width * image.bytes_per_pixel()),
        rows_per_image: Some(image.height),
      },
      wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
      },
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
  }

  /// Create a sampler from the loaded description. Absent filters fall back
  /// to linear, the glTF default behavior.
  fn create_sampler(device: &wgpu::Device, desc: &UmbraSamplerDesc) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
      label: Some("umbra_material_sampler"),
      address_mode_u: desc.wrap_u,
      address_mode_v: desc.wrap_v,
      address_mode_w: wgpu::AddressMode::ClampToEdge,
      mag_filter: desc.mag_filter.unwrap_or(wgpu::FilterMode::Linear),
      min_filter: desc.min_filter.unwrap_or(wgpu::FilterMode::Linear),
      ..Default::default()
    })
  }

  /// Create the 1x1 white fallback texture.
  fn create_white_fallback(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
      label: Some("umbra_white_fallback"),
      size: wgpu::Extent3d {
        width: 1,
        height: 1,
        depth_or_array_layers: 1,
      },
      mip_level_count: 1,
      sample_count: 1,
      dimension: wgpu::TextureDimension::D2,
      format: wgpu::TextureFormat::Rgba8UnormSrgb,
      usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
      view_formats: &[],
    });
    queue.write_texture(
      wgpu::TexelCopyTextureInfo {
        texture: &texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
      },
      &[255u8, 255, 255, 255],
      wgpu::TexelCopyBufferLayout {
        offset: 0,
        bytes_per_row: Some(4),
        rows_per_image: Some(1),
      },
      wgpu::Extent3d {
        width: 1,
        height: 1,
        depth_or_array_layers: 1,
      },
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
  }

  /// Resolve one primitive's material into a bind group. A missing material
  /// index resolves to untextured white.
  #[allow(clippy::too_many_arguments)]
  fn resolve_material(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    scene: &UmbraScene,
    material_index: Option<u32>,
    image_views: &[wgpu::TextureView],
    samplers: &[wgpu::Sampler],
    default_sampler: &wgpu::Sampler,
    white_view: &wgpu::TextureView,
  ) -> UmbraResolvedMaterial {
    let (base_color, texture_index) = match material_index {
      Some(index) => {
        let material = &scene.materials[index as usize];
        (material.base_color_factor, material.base_color_texture_index)
      },
      None => (Vec3::ONE, None),
    };

    let (view, sampler, textured) = match texture_index {
      Some(index) => {
        let texture_ref = &scene.textures[index as usize];
        let sampler = texture_ref.sampler_index
          .map(|sampler_index| &samplers[sampler_index as usize])
          .unwrap_or(default_sampler);
        (&image_views[texture_ref.image_index as usize], sampler, true)
      },
      None => (white_view, default_sampler, false),
    };

    let uniform = UmbraMaterialUniform {
      base_color: base_color.to_array(),
      textured: textured as u32,
    };
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("umbra_material_uniform"),
      contents: bytemuck::bytes_of(&uniform),
      usage: wgpu::BufferUsages::UNIFORM,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      label: Some("umbra_material_bind_group"),
      layout,
      entries: &[
        wgpu::BindGroupEntry {
          binding: 0,
          resource: uniform_buffer.as_entire_binding(),
        },
        wgpu::BindGroupEntry {
          binding: 1,
          resource: wgpu::BindingResource::TextureView(view),
        },
        wgpu::BindGroupEntry {
          binding: 2,
          resource: wgpu::BindingResource::Sampler(sampler),
        },
      ],
    });

    UmbraResolvedMaterial {
      base_color,
      textured,
      bind_group,
    }
  }
}
