use std::path::Path;
use std::sync::Arc;

use winit::window::Window;

use crate::camera::UmbraCamera;
use crate::error::UmbraViewerError;
use crate::scene::cpu::scene::UmbraScene;
use crate::scene::gpu::UmbraBindingTable;
use crate::scene::loader::UmbraSceneGPUUploader;
use crate::scene_pass::{UmbraFrameUniform, UmbraScenePass};
use crate::shader::load_shader;
use crate::shadow_pass::UmbraShadowPass;

/// The file name snapshots are written to.
pub const SNAPSHOT_FILE_NAME: &str = "out.png";

/// Round a uniform block size up to the device's dynamic offset alignment.
/// param device: The device.
/// param size: The unaligned block size in bytes.
/// return: The aligned stride.
pub fn align_uniform_stride(device: &wgpu::Device, size: u32) -> u32 {
  let alignment = device.limits().min_uniform_buffer_offset_alignment;
  size.div_ceil(alignment) * alignment
}

/// The per object uniform block, one aligned slot per binding-table entry,
/// shared by the depth pass and the lit pass. The layout mirrors the WGSL
/// `Object` struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct UmbraObjectUniform {
  mvp: [[f32; 4]; 4],
  model: [[f32; 4]; 4],
  normal_matrix: [[f32; 4]; 4],
}

/// The renderer: owns the GPU connection, the two passes and the binding
/// table of the current scene, and drives one frame per call.
pub struct UmbraRenderer {
  surface: wgpu::Surface<'static>,
  device: wgpu::Device,
  queue: wgpu::Queue,
  config: wgpu::SurfaceConfiguration,
  depth_view: wgpu::TextureView,
  supports_16bit_norm: bool,

  object_bind_group_layout: wgpu::BindGroupLayout,
  object_uniform_buffer: wgpu::Buffer,
  object_bind_group: wgpu::BindGroup,
  object_stride: u32,
  object_capacity: u32,

  shadow_pass: UmbraShadowPass,
  scene_pass: UmbraScenePass,
  table: Option<UmbraBindingTable>,
  snapshot_requested: bool,
}

/// The Drop implementation of the renderer.
impl Drop for UmbraRenderer {
  fn drop(&mut self) {
    log::debug!("A UmbraRenderer dropped.");
  }
}

/// The implementation of the renderer.
impl UmbraRenderer {
  /// Create a new renderer for the given window.
  /// param window: The window to present to.
  /// param shader_dir: The directory holding the WGSL shader files.
  /// return: The renderer.
  pub fn new<P: AsRef<Path>>(window: Arc<Window>, shader_dir: P) -> Result<Self, UmbraViewerError> {
    let size = window.inner_size();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let surface = instance.create_surface(window)
      .map_err(|err| UmbraViewerError::new("Create surface failed.", Some(Box::new(err))))?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
      power_preference: wgpu::PowerPreference::HighPerformance,
      compatible_surface: Some(&surface),
      force_fallback_adapter: false,
    })).map_err(|err| UmbraViewerError::new("No suitable GPU adapter found.", Some(Box::new(err))))?;
    log::info!("Using adapter \"{}\".", adapter.get_info().name);

    // 16 bit normalized texture support is optional, request it only when
    // the adapter has it and remember the outcome for scene uploads.
    let supports_16bit_norm = adapter.features().contains(wgpu::Features::TEXTURE_FORMAT_16BIT_NORM);
    let required_features = if supports_16bit_norm {
      wgpu::Features::TEXTURE_FORMAT_16BIT_NORM
    } else {
      wgpu::Features::empty()
    };
    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
      label: Some("umbra_device"),
      required_features,
      ..Default::default()
    })).map_err(|err| UmbraViewerError::new("Request device failed.", Some(Box::new(err))))?;

    // COPY_SRC on the surface enables snapshot readback.
    let caps = surface.get_capabilities(&adapter);
    let format = caps.formats.iter().copied()
      .find(|format| format.is_srgb())
      .unwrap_or(caps.formats[0]);
    let config = wgpu::SurfaceConfiguration {
      usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
      format,
      width: size.width.max(1),
      height: size.height.max(1),
      present_mode: wgpu::PresentMode::Fifo,
      alpha_mode: caps.alpha_modes[0],
      view_formats: vec![],
      desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    let depth_view = Self::create_depth_view(&device, config.width, config.height);

    let object_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      label: Some("umbra_object_layout"),
      entries: &[wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
          ty: wgpu::BufferBindingType::Uniform,
          has_dynamic_offset: true,
          min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<UmbraObjectUniform>() as u64),
        },
        count: None,
      }],
    });
    let object_stride = align_uniform_stride(&device, std::mem::size_of::<UmbraObjectUniform>() as u32);
    let object_capacity = 1u32;
    let (object_uniform_buffer, object_bind_group) = Self::create_object_uniforms(
      &device, &object_bind_group_layout, object_stride, object_capacity);

    let shader_dir = shader_dir.as_ref();
    let shadow_shader = load_shader(&device, shader_dir.join("shadow_depth.wgsl"))?;
    let scene_shader = load_shader(&device, shader_dir.join("scene.wgsl"))?;

    let shadow_pass = UmbraShadowPass::new(&device, &shadow_shader, &object_bind_group_layout)?;
    let scene_pass = UmbraScenePass::new(
      &device,
      &scene_shader,
      config.format,
      &object_bind_group_layout,
      shadow_pass.cube_view(),
    )?;

    log::debug!("A UmbraRenderer created.");
    Ok(Self {
      surface,
      device,
      queue,
      config,
      depth_view,
      supports_16bit_norm,
      object_bind_group_layout,
      object_uniform_buffer,
      object_bind_group,
      object_stride,
      object_capacity,
      shadow_pass,
      scene_pass,
      table: None,
      snapshot_requested: false,
    })
  }

  fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
      label: Some("umbra_window_depth"),
      size: wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
      },
      mip_level_count: 1,
      sample_count: 1,
      dimension: wgpu::TextureDimension::D2,
      format: wgpu::TextureFormat::Depth32Float,
      usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
      view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
  }

  fn create_object_uniforms(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u32,
    capacity: u32,
  ) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
      label: Some("umbra_object_uniforms"),
      size: stride as u64 * capacity as u64,
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
      mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      label: Some("umbra_object_bind_group"),
      layout,
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
          buffer: &buffer,
          offset: 0,
          size: wgpu::BufferSize::new(std::mem::size_of::<UmbraObjectUniform>() as u64),
        }),
      }],
    });
    (buffer, bind_group)
  }

  /// Upload the scene and make it the current one.
  /// param scene: The CPU scene.
  /// return: The result.
  pub fn set_scene(&mut self, scene: &UmbraScene) -> Result<(), UmbraViewerError> {
    let table = UmbraSceneGPUUploader::upload(
      &self.device,
      &self.queue,
      self.scene_pass.material_bind_group_layout(),
      self.supports_16bit_norm,
      scene,
    )?;

    // Grow the object uniform buffer to one slot per entry.
    let needed = (table.len() as u32).max(1);
    if needed > self.object_capacity {
      let (buffer, bind_group) = Self::create_object_uniforms(
        &self.device, &self.object_bind_group_layout, self.object_stride, needed);
      self.object_uniform_buffer = buffer;
      self.object_bind_group = bind_group;
      self.object_capacity = needed;
    }

    log::info!("Scene uploaded, {} drawable(s).", table.len());
    self.table = Some(table);
    Ok(())
  }

  /// Resize the surface and the window depth buffer.
  /// param width: The new width in pixels.
  /// param height: The new height in pixels.
  pub fn resize(&mut self, width: u32, height: u32) {
    self.config.width = width.max(1);
    self.config.height = height.max(1);
    self.surface.configure(&self.device, &self.config);
    self.depth_view = Self::create_depth_view(&self.device, self.config.width, self.config.height);
  }

  /// Ask the next frame to be written to disk after presentation.
  pub fn request_snapshot(&mut self) {
    self.snapshot_requested = true;
  }

  /// Render one frame.
  /// param scene: The CPU scene the current binding table was built from.
  /// param camera: The camera.
  /// return: The result.
  pub fn render(&mut self, scene: &UmbraScene, camera: &UmbraCamera) -> Result<(), UmbraViewerError> {
    let Some(table) = self.table.as_ref() else {
      return Err(UmbraViewerError::new("No scene set before rendering.", None));
    };
    debug_assert_eq!(
      table.entries.iter().map(|entry| entry.draw_ref).collect::<Vec<_>>(),
      scene.draw_order(),
    );

    let frame = match self.surface.get_current_texture() {
      Ok(frame) => frame,
      Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
        self.surface.configure(&self.device, &self.config);
        self.surface.get_current_texture()
          .map_err(|err| UmbraViewerError::new("Acquire surface texture failed.", Some(Box::new(err))))?
      },
      Err(err) => {
        return Err(UmbraViewerError::new("Acquire surface texture failed.", Some(Box::new(err))));
      },
    };
    let surface_view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

    // One aligned slot per entry, written in draw order.
    let view_proj = camera.projection * camera.view;
    for (entry_index, entry) in table.entries.iter().enumerate() {
      let model = scene.nodes[entry.draw_ref.node_index as usize].world_transform();
      let uniform = UmbraObjectUniform {
        mvp: (view_proj * model).to_cols_array_2d(),
        model: model.to_cols_array_2d(),
        normal_matrix: model.inverse().transpose().to_cols_array_2d(),
      };
      self.queue.write_buffer(
        &self.object_uniform_buffer,
        entry_index as u64 * self.object_stride as u64,
        bytemuck::bytes_of(&uniform),
      );
    }

    let light = scene.locate_point_light();
    let frame_uniform = match light {
      Some(light) => UmbraFrameUniform::lit(light.position, light.color, camera.position),
      None => UmbraFrameUniform::unshadowed(camera.position),
    };
    self.scene_pass.prepare(&self.queue, &frame_uniform);
    if let Some(light) = light {
      self.shadow_pass.prepare(&self.queue, light.position);
    }

    let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
      label: Some("umbra_frame_encoder"),
    });

    if light.is_some() {
      self.shadow_pass.render(&mut encoder, table, &self.object_bind_group, self.object_stride);
    }
    self.scene_pass.render(
      &mut encoder,
      &surface_view,
      &self.depth_view,
      table,
      &self.object_bind_group,
      self.object_stride,
    );

    let snapshot = if self.snapshot_requested {
      self.snapshot_requested = false;
      Some(self.encode_snapshot_copy(&mut encoder, &frame.texture))
    } else {
      None
    };

    self.queue.submit(Some(encoder.finish()));

    if let Some((buffer, padded_bytes_per_row)) = snapshot {
      self.write_snapshot(&buffer, padded_bytes_per_row)?;
    }

    frame.present();
    Ok(())
  }

  /// Encode the surface-to-buffer copy for a snapshot. Rows are padded to
  /// the copy alignment and unpacked on read.
  fn encode_snapshot_copy(
    &self,
    encoder: &mut wgpu::CommandEncoder,
    texture: &wgpu::Texture,
  ) -> (wgpu::Buffer, u32) {
    let unpadded_bytes_per_row = self.config.width * 4;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(alignment) * alignment;

    let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
      label: Some("umbra_snapshot_buffer"),
      size: padded_bytes_per_row as u64 * self.config.height as u64,
      usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
      mapped_at_creation: false,
    });

    encoder.copy_texture_to_buffer(
      wgpu::TexelCopyTextureInfo {
        texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
      },
      wgpu::TexelCopyBufferInfo {
        buffer: &buffer,
        layout: wgpu::TexelCopyBufferLayout {
          offset: 0,
          bytes_per_row: Some(padded_bytes_per_row),
          rows_per_image: Some(self.config.height),
        },
      },
      wgpu::Extent3d {
        width: self.config.width,
        height: self.config.height,
        depth_or_array_layers: 1,
      },
    );

    (buffer, padded_bytes_per_row)
  }

  /// Map the snapshot buffer and write it out as RGB. Surface rows come
  /// back top to bottom, so no vertical flip is needed.
  fn write_snapshot(&self, buffer: &wgpu::Buffer, padded_bytes_per_row: u32) -> Result<(), UmbraViewerError> {
    let slice = buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
      let _ = sender.send(result);
    });
    self.device.poll(wgpu::PollType::wait_indefinitely())
      .map_err(|err| UmbraViewerError::new("Wait for snapshot readback failed.", Some(Box::new(err))))?;
    receiver.recv()
      .map_err(|err| UmbraViewerError::new("Snapshot readback channel closed.", Some(Box::new(err))))?
      .map_err(|err| UmbraViewerError::new("Map snapshot buffer failed.", Some(Box::new(err))))?;

    let bgra = matches!(
      self.config.format,
      wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    );

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity(self.config.width as usize * self.config.height as usize * 3);
    for row in data.chunks_exact(padded_bytes_per_row as usize) {
      for texel in row[..self.config.width as usize * 4].chunks_exact(4) {
        if bgra {
          pixels.extend_from_slice(&[texel[2], texel[1], texel[0]]);
        } else {
          pixels.extend_from_slice(&[texel[0], texel[1], texel[2]]);
        }
      }
    }
    drop(data);
    buffer.unmap();

    let image = image::RgbImage::from_raw(self.config.width, self.config.height, pixels)
      .ok_or(UmbraViewerError::new("Assemble snapshot image failed.", None))?;
    image.save(SNAPSHOT_FILE_NAME)
      .map_err(|err| UmbraViewerError::new(&format!("Write \"{}\" failed.", SNAPSHOT_FILE_NAME), Some(Box::new(err))))?;

    log::info!("Snapshot written to \"{}\".", SNAPSHOT_FILE_NAME);
    Ok(())
  }
}
