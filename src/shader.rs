use std::path::Path;

use crate::error::UmbraViewerError;

/// Load a WGSL shader module from the given path.
/// A validation error in the source is fatal: the viewer cannot draw anything
/// meaningful with a broken pipeline, so startup aborts instead of limping on.
/// param device: The device.
/// param path: The path of the WGSL file.
/// return: The shader module.
pub fn load_shader<P: AsRef<Path>>(device: &wgpu::Device, path: P) -> Result<wgpu::ShaderModule, UmbraViewerError> {
  let path = path.as_ref();
  let source = std::fs::read_to_string(path)
    .map_err(|err| UmbraViewerError::new(&format!("Read shader file \"{:?}\" failed.", path), Some(Box::new(err))))?;

  device.push_error_scope(wgpu::ErrorFilter::Validation);
  let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
    label: path.to_str(),
    source: wgpu::ShaderSource::Wgsl(source.into()),
  });
  if let Some(err) = pollster::block_on(device.pop_error_scope()) {
    return Err(UmbraViewerError::new(&format!("Compile shader \"{:?}\" failed: {}", path, err), None));
  }

  log::debug!("Shader \"{:?}\" loaded.", path);
  Ok(module)
}
