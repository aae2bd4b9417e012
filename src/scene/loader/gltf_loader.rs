use std::path::Path;

use glam::{
  Vec2,
  Vec3,
  Vec4,
  Quat,
  Vec4Swizzles,
};

use crate::error::UmbraViewerError;
use crate::scene::vertex::UmbraVertexAttributeKind;
use super::super::{
  cpu::scene::UmbraScene,
  cpu::node::UmbraNode,
  cpu::material::{UmbraMaterial, UmbraTextureRef, UmbraSamplerDesc},
  cpu::image_data::UmbraImageData,
  cpu::mesh::{UmbraPrimitive, UmbraMesh},
  cpu::light::{UmbraLightKind, UmbraLight},
};

/// The glTF loader.
pub struct UmbraGltfLoader;

/// The implementation of the glTF loader.
impl UmbraGltfLoader {
  /// Load the glTF file from the given path.
  /// param path: The path of the glTF file.
  /// return: The loaded scene.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<UmbraScene, UmbraViewerError> {
    let path = path.as_ref();
    let (gltf, mesh_data, image_data) = gltf::import(path)
      .map_err(|err| UmbraViewerError::new(&format!("Load glTF file \"{:?}\" failed.", path), Some(Box::new(err))))?;

    // Load all nodes. The node storage is index aligned with the document so
    // that scene roots and light references resolve without remapping.
    let mut loaded_nodes = Vec::new();
    for node in gltf.nodes() {
      loaded_nodes.push(Self::load_node(&node));
    }

    // Only the default scene's root nodes are drawn.
    let scenes = gltf.scenes();
    if scenes.len() == 0 {
      return Err(UmbraViewerError::new(&format!("No scene in glTF file \"{:?}\".", path), None));
    } else if scenes.len() > 1 {
      log::warn!("More than one scene in glTF file \"{:?}\". Only the default scene will be drawn.", path);
    }
    let default_scene = gltf.default_scene()
      .or_else(|| gltf.scenes().next())
      .ok_or(UmbraViewerError::new(&format!("No scene in glTF file \"{:?}\".", path), None))?;
    log::debug!("Loading scene \"{}\".", default_scene.name().unwrap_or("<Unnamed>"));
    let roots = default_scene.nodes().map(|node| node.index() as u32).collect::<Vec<_>>();

    // Load all meshes.
    let mut loaded_meshes = Vec::new();
    for mesh in gltf.meshes() {
      loaded_meshes.push(Self::load_mesh(&mesh, &mesh_data)?);
    }

    // Load all materials.
    let mut loaded_materials = Vec::new();
    for material in gltf.materials() {
      loaded_materials.push(Self::load_material(&material));
    }

    // Load all textures and samplers.
    let mut loaded_textures = Vec::new();
    for texture in gltf.textures() {
      loaded_textures.push(UmbraTextureRef {
        image_index: texture.source().index() as u32,
        sampler_index: texture.sampler().index().map(|index| index as u32),
      });
    }
    let mut loaded_samplers = Vec::new();
    for sampler in gltf.samplers() {
      loaded_samplers.push(Self::load_sampler(&sampler));
    }

    // Load all images.
    let mut loaded_images = Vec::new();
    for data in image_data.iter() {
      loaded_images.push(UmbraImageData::from_gltf(data)?);
    }

    // Load all lights.
    let mut loaded_lights = Vec::new();
    if let Some(lights) = gltf.lights() {
      for light in lights {
        loaded_lights.push(Self::load_light(&light));
      }
    }

    Ok(UmbraScene {
      nodes: loaded_nodes,
      roots,
      meshes: loaded_meshes,
      materials: loaded_materials,
      textures: loaded_textures,
      samplers: loaded_samplers,
      images: loaded_images,
      lights: loaded_lights,
    })
  }

  /// Load the node.
  /// param node: The gltf node.
  /// return: The loaded node.
  fn load_node(node: &gltf::Node) -> UmbraNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    UmbraNode {
      name: node.name().unwrap_or("<Unnamed>").to_owned(),
      translation: Some(Vec3::from(translation)),
      rotation: Some(Quat::from_array(rotation)),
      scale: Some(Vec3::from(scale)),
      mesh_index: node.mesh().map(|mesh| mesh.index() as u32),
      light_index: node.light().map(|light| light.index() as u32),
    }
  }

  /// Load the mesh.
  /// param mesh: The gltf mesh.
  /// param buffers: The gltf buffers.
  /// return: The loaded mesh.
  fn load_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<UmbraMesh, UmbraViewerError> {
    let mesh_name = mesh.name().unwrap_or("<Unnamed>");
    log::debug!("Loading mesh \"{}\".", mesh_name);
    let primitives = mesh.primitives();

    let mut loaded_primitives = Vec::new();
    for primitive in primitives {
      log::debug!("Loading primitive {} from mesh \"{}\".", primitive.index(), mesh_name);

      let topology = match primitive.mode() {
        gltf::mesh::Mode::Triangles => wgpu::PrimitiveTopology::TriangleList,
        mode => return Err(UmbraViewerError::new(
          &format!("Unsupported primitive mode {:?} in mesh \"{}\".", mode, mesh_name), None)),
      };

      // Attributes outside the supported set are skipped, not fatal.
      for (semantic, _) in primitive.attributes() {
        if let UmbraVertexAttributeKind::Unrecognized(name) = UmbraVertexAttributeKind::from_semantic(&semantic) {
          log::debug!("Skipping attribute \"{}\" of mesh \"{}\".", name, mesh_name);
        }
      }

      let reader = primitive.reader(|i| Some(&buffers[i.index()]));

      let indices = reader.read_indices()
        .ok_or(UmbraViewerError::new(&format!("Read indices from mesh \"{}\" failed.", mesh_name), None))?
        .into_u32().collect::<Vec<_>>();
      let positions = reader.read_positions()
        .ok_or(UmbraViewerError::new(&format!("Read positions from mesh \"{}\" failed.", mesh_name), None))?
        .map(Vec3::from).collect::<Vec<_>>();
      let normals = if let Some(normals) = reader.read_normals() {
        normals.map(Vec3::from).collect::<Vec<_>>()
      } else {
        log::debug!("Mesh \"{}\" has no normals, filling with zero.", mesh_name);
        vec![Vec3::ZERO; positions.len()]
      };
      let tex_coords = if let Some(tex_coords) = reader.read_tex_coords(0) {
        tex_coords.into_f32().map(Vec2::from).collect::<Vec<_>>()
      } else {
        log::debug!("Mesh \"{}\" has no tex coords, filling with zero.", mesh_name);
        vec![Vec2::ZERO; positions.len()]
      };

      loaded_primitives.push(UmbraPrimitive {
        indices,
        positions,
        normals,
        tex_coords,
        topology,
        material_index: primitive.material().index().map(|index| index as u32),
      });
    }

    Ok(UmbraMesh {
      primitives: loaded_primitives,
    })
  }

  /// Load the material.
  /// param material: The gltf material.
  /// return: The loaded material.
  fn load_material(material: &gltf::Material) -> UmbraMaterial {
    log::debug!("Loading material \"{}\".", material.name().unwrap_or("<Unnamed>"));
    let pbr = material.pbr_metallic_roughness();

    let base_color: Vec4 = pbr.base_color_factor().into();
    let base_color_texture_index = pbr.base_color_texture()
      .map(|texture| texture.texture().index() as u32);

    UmbraMaterial {
      name: material.name().unwrap_or("<Unnamed>").to_owned(),
      base_color_texture_index,
      base_color_factor: base_color.xyz(),
    }
  }

  /// Load the sampler.
  /// param sampler: The gltf sampler.
  /// return: The loaded sampler description.
  fn load_sampler(sampler: &gltf::texture::Sampler) -> UmbraSamplerDesc {
    UmbraSamplerDesc {
      mag_filter: sampler.mag_filter().map(|filter| match filter {
        gltf::texture::MagFilter::Nearest => wgpu::FilterMode::Nearest,
        gltf::texture::MagFilter::Linear => wgpu::FilterMode::Linear,
      }),
      min_filter: sampler.min_filter().map(|filter| match filter {
        gltf::texture::MinFilter::Nearest
        | gltf::texture::MinFilter::NearestMipmapNearest
        | gltf::texture::MinFilter::NearestMipmapLinear => wgpu::FilterMode::Nearest,
        gltf::texture::MinFilter::Linear
        | gltf::texture::MinFilter::LinearMipmapNearest
        | gltf::texture::MinFilter::LinearMipmapLinear => wgpu::FilterMode::Linear,
      }),
      wrap_u: match sampler.wrap_s() {
        gltf::texture::WrappingMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        gltf::texture::WrappingMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        gltf::texture::WrappingMode::Repeat => wgpu::AddressMode::Repeat,
      },
      wrap_v: match sampler.wrap_t() {
        gltf::texture::WrappingMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        gltf::texture::WrappingMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        gltf::texture::WrappingMode::Repeat => wgpu::AddressMode::Repeat,
      },
    }
  }

  /// Load the light.
  /// param light: The gltf light.
  /// return: The loaded light.
  fn load_light(light: &gltf::khr_lights_punctual::Light) -> UmbraLight {
    log::debug!("Loading light \"{}\".", light.name().unwrap_or("<Unnamed>"));

    let kind = match light.kind() {
      gltf::khr_lights_punctual::Kind::Directional => UmbraLightKind::DIRECTIONAL,
      gltf::khr_lights_punctual::Kind::Point => UmbraLightKind::POINT,
      gltf::khr_lights_punctual::Kind::Spot { .. } => UmbraLightKind::SPOT,
    };

    UmbraLight {
      name: light.name().unwrap_or("<Unnamed>").to_owned(),
      color: Vec3::from(light.color()),
      intensity: light.intensity(),
      kind,
    }
  }
}
