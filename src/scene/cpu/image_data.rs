use crate::error::UmbraViewerError;

/// The decoded pixel data of one image, ready for GPU upload.
pub struct UmbraImageData {
  pub format: wgpu::TextureFormat,
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<u8>,
}

/// The implementation of the image data.
impl UmbraImageData {
  /// Create image data from a decoded glTF image.
  /// The GPU format is derived from the channel count and bit depth. Three
  /// channel data is expanded to four channels because RGB-only formats are
  /// not uploadable. Unsupported channel and bit depth combinations are a
  /// load-time error, never silently coerced.
  /// param data: The decoded glTF image.
  /// return: The image data.
  pub fn from_gltf(data: &gltf::image::Data) -> Result<Self, UmbraViewerError> {
    let (format, pixels) = match data.format {
      gltf::image::Format::R8 => (wgpu::TextureFormat::R8Unorm, data.pixels.clone()),
      gltf::image::Format::R8G8 => (wgpu::TextureFormat::Rg8Unorm, data.pixels.clone()),
      gltf::image::Format::R8G8B8 => (
        wgpu::TextureFormat::Rgba8UnormSrgb,
        Self::expand_rgb8_to_rgba8(&data.pixels),
      ),
      gltf::image::Format::R8G8B8A8 => (wgpu::TextureFormat::Rgba8UnormSrgb, data.pixels.clone()),
      gltf::image::Format::R16 => (wgpu::TextureFormat::R16Unorm, data.pixels.clone()),
      gltf::image::Format::R16G16 => (wgpu::TextureFormat::Rg16Unorm, data.pixels.clone()),
      gltf::image::Format::R16G16B16 => (
        wgpu::TextureFormat::Rgba16Unorm,
        Self::expand_rgb16_to_rgba16(&data.pixels),
      ),
      gltf::image::Format::R16G16B16A16 => (wgpu::TextureFormat::Rgba16Unorm, data.pixels.clone()),
      unsupported => {
        return Err(UmbraViewerError::new(
          &format!("Unsupported image pixel format {:?}.", unsupported),
          None,
        ))
      },
    };

    Ok(Self {
      format,
      width: data.width,
      height: data.height,
      pixels,
    })
  }

  /// The number of bytes of one pixel in the derived format.
  pub fn bytes_per_pixel(&self) -> u32 {
    match self.format {
      wgpu::TextureFormat::R8Unorm => 1,
      wgpu::TextureFormat::Rg8Unorm | wgpu::TextureFormat::R16Unorm => 2,
      wgpu::TextureFormat::Rgba8UnormSrgb | wgpu::TextureFormat::Rg16Unorm => 4,
      wgpu::TextureFormat::Rgba16Unorm => 8,
      _ => unreachable!("Image data is only constructed with the formats above."),
    }
  }

  /// Whether the derived format needs 16 bit normalized texture support.
  pub fn needs_16bit_norm(&self) -> bool {
    matches!(
      self.format,
      wgpu::TextureFormat::R16Unorm | wgpu::TextureFormat::Rg16Unorm | wgpu::TextureFormat::Rgba16Unorm
    )
  }

  fn expand_rgb8_to_rgba8(pixels: &[u8]) -> Vec<u8> {
    let mut expanded = Vec::with_capacity(pixels.len() / 3 * 4);
    for rgb in pixels.chunks_exact(3) {
      expanded.extend_from_slice(rgb);
      expanded.push(u8::MAX);
    }
    expanded
  }

  fn expand_rgb16_to_rgba16(pixels: &[u8]) -> Vec<u8> {
    let mut expanded = Vec::with_capacity(pixels.len() / 6 * 8);
    for rgb in pixels.chunks_exact(6) {
      expanded.extend_from_slice(rgb);
      expanded.extend_from_slice(&u16::MAX.to_le_bytes());
    }
    expanded
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn image(format: gltf::image::Format, pixels: Vec<u8>) -> gltf::image::Data {
    gltf::image::Data {
      format,
      width: 1,
      height: 1,
      pixels,
    }
  }

  #[test]
  fn rgb8_is_expanded_to_rgba8() {
    let data = UmbraImageData::from_gltf(&image(gltf::image::Format::R8G8B8, vec![10, 20, 30])).unwrap();
    assert_eq!(data.format, wgpu::TextureFormat::Rgba8UnormSrgb);
    assert_eq!(data.pixels, vec![10, 20, 30, 255]);
    assert_eq!(data.bytes_per_pixel(), 4);
  }

  #[test]
  fn single_channel_16bit_maps_to_short_samples() {
    let data = UmbraImageData::from_gltf(&image(gltf::image::Format::R16, vec![0x34, 0x12])).unwrap();
    assert_eq!(data.format, wgpu::TextureFormat::R16Unorm);
    assert!(data.needs_16bit_norm());
  }

  #[test]
  fn float_pixels_are_rejected() {
    let result = UmbraImageData::from_gltf(&image(
      gltf::image::Format::R32G32B32A32FLOAT,
      vec![0; 16],
    ));
    assert!(result.is_err());
  }
}
