use std::path::Path;

use glam::Vec4Swizzles;

use crate::error::UmbraViewerError;
use super::node::UmbraNode;
use super::mesh::UmbraMesh;
use super::material::{
  UmbraMaterial,
  UmbraTextureRef,
  UmbraSamplerDesc,
};
use super::image_data::UmbraImageData;
use super::light::{
  UmbraLight,
  UmbraLightKind,
  UmbraPointLight,
};
use super::super::loader::UmbraGltfLoader;

/// One entry of the canonical traversal: the originating node, its mesh and
/// the primitive within that mesh. Binding-table entries carry this identity
/// so the load-time and render-time orders can be cross-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UmbraDrawRef {
  pub node_index: u32,
  pub mesh_index: u32,
  pub primitive_index: u32,
}

/// A scene is a collection of nodes, meshes, materials, images and lights.
pub struct UmbraScene {
  pub nodes: Vec<UmbraNode>,
  pub roots: Vec<u32>,
  pub meshes: Vec<UmbraMesh>,
  pub materials: Vec<UmbraMaterial>,
  pub textures: Vec<UmbraTextureRef>,
  pub samplers: Vec<UmbraSamplerDesc>,
  pub images: Vec<UmbraImageData>,
  pub lights: Vec<UmbraLight>,
}

/// The Drop implementation of the scene.
impl Drop for UmbraScene {
  fn drop(&mut self) {
    log::debug!("A UmbraScene dropped.");
  }
}

/// The implementation of the scene.
impl UmbraScene {
  /// Create a new scene from a glTF file.
  /// param path: The path to the glTF file.
  /// return: The scene.
  pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, UmbraViewerError> {
    // Check the file extension.
    let path = path.as_ref();
    let extension = path.extension()
      .ok_or(UmbraViewerError::new(&format!("Get file \"{:?}\" extension failed.", path), None))?;
    let scene = match extension.to_str() {
      Some("gltf") | Some("glb") => UmbraGltfLoader::load(path),
      _ => Err(UmbraViewerError::new(&format!("Unsupported file \"{:?}\".", path), None)),
    }?;
    scene.validate()?;

    log::debug!("A UmbraScene created.");
    Ok(scene)
  }

  /// Check if the scene has any light.
  /// return: True if the scene has a light, false otherwise.
  pub fn has_light(&self) -> bool {
    !self.lights.is_empty()
  }

  /// Validate every cross reference in the scene.
  /// An out-of-range index indicates structural corruption of the asset and
  /// fails the load before any GPU resource is created.
  /// return: The result.
  pub fn validate(&self) -> Result<(), UmbraViewerError> {
    for &root in self.roots.iter() {
      if root as usize >= self.nodes.len() {
        return Err(UmbraViewerError::new(
          &format!("Scene root references node {} but only {} nodes exist.", root, self.nodes.len()),
          None));
      }
    }
    for (node_index, node) in self.nodes.iter().enumerate() {
      if let Some(mesh_index) = node.mesh_index {
        if mesh_index as usize >= self.meshes.len() {
          return Err(UmbraViewerError::new(
            &format!("Node {} references mesh {} but only {} meshes exist.", node_index, mesh_index, self.meshes.len()),
            None));
        }
      }
      if let Some(light_index) = node.light_index {
        if light_index as usize >= self.lights.len() {
          return Err(UmbraViewerError::new(
            &format!("Node {} references light {} but only {} lights exist.", node_index, light_index, self.lights.len()),
            None));
        }
      }
    }
    for (mesh_index, mesh) in self.meshes.iter().enumerate() {
      for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
        if let Some(material_index) = primitive.material_index {
          if material_index as usize >= self.materials.len() {
            return Err(UmbraViewerError::new(
              &format!(
                "Primitive {} of mesh {} references material {} but only {} materials exist.",
                primitive_index, mesh_index, material_index, self.materials.len()),
              None));
          }
        }
      }
    }
    for (material_index, material) in self.materials.iter().enumerate() {
      if let Some(texture_index) = material.base_color_texture_index {
        if texture_index as usize >= self.textures.len() {
          return Err(UmbraViewerError::new(
            &format!("Material {} references texture {} but only {} textures exist.", material_index, texture_index, self.textures.len()),
            None));
        }
      }
    }
    for (texture_index, texture) in self.textures.iter().enumerate() {
      if texture.image_index as usize >= self.images.len() {
        return Err(UmbraViewerError::new(
          &format!("Texture {} references image {} but only {} images exist.", texture_index, texture.image_index, self.images.len()),
          None));
      }
      if let Some(sampler_index) = texture.sampler_index {
        if sampler_index as usize >= self.samplers.len() {
          return Err(UmbraViewerError::new(
            &format!("Texture {} references sampler {} but only {} samplers exist.", texture_index, sampler_index, self.samplers.len()),
            None));
        }
      }
    }
    Ok(())
  }

  /// The canonical drawable traversal: root nodes of the default scene in
  /// index order, skipping light-carrying nodes, then the primitives of the
  /// node's mesh in storage order. The GPU binder and every frame's pass
  /// drivers all consume exactly this sequence.
  /// return: The ordered draw references.
  pub fn draw_order(&self) -> Vec<UmbraDrawRef> {
    let mut order = Vec::new();
    for &root in self.roots.iter() {
      let node = &self.nodes[root as usize];
      // Lights are not drawable.
      if node.light_index.is_some() {
        continue;
      }
      let Some(mesh_index) = node.mesh_index else {
        continue;
      };
      let mesh = &self.meshes[mesh_index as usize];
      for primitive_index in 0..mesh.primitives.len() {
        order.push(UmbraDrawRef {
          node_index: root,
          mesh_index,
          primitive_index: primitive_index as u32,
        });
      }
    }
    order
  }

  /// Locate the active point light: walk all nodes, resolve the world
  /// transform of every light-carrying node, and keep the last point light
  /// in traversal order (the documented single-light limitation). Other
  /// light kinds are recognized but never contribute a shadow position.
  /// return: The located light, or none when shadowing must be disabled.
  pub fn locate_point_light(&self) -> Option<UmbraPointLight> {
    let mut located = None;
    for node in self.nodes.iter() {
      let Some(light_index) = node.light_index else {
        continue;
      };
      let light = &self.lights[light_index as usize];
      if light.kind != UmbraLightKind::POINT {
        continue;
      }
      let position = (node.world_transform() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0)).xyz();
      located = Some(UmbraPointLight {
        position,
        color: light.color,
      });
    }
    located
  }
}

#[cfg(test)]
mod tests {
  use glam::Vec3;

  use super::*;
  use super::super::mesh::UmbraPrimitive;

  fn flat_primitive(material_index: Option<u32>) -> UmbraPrimitive {
    UmbraPrimitive {
      indices: vec![0, 1, 2],
      positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
      normals: vec![Vec3::Z; 3],
      tex_coords: vec![glam::Vec2::ZERO; 3],
      topology: wgpu::PrimitiveTopology::TriangleList,
      material_index,
    }
  }

  fn scene_with(nodes: Vec<UmbraNode>, roots: Vec<u32>, meshes: Vec<UmbraMesh>, lights: Vec<UmbraLight>) -> UmbraScene {
    UmbraScene {
      nodes,
      roots,
      meshes,
      materials: vec![UmbraMaterial {
        name: String::new(),
        base_color_texture_index: None,
        base_color_factor: Vec3::new(0.8, 0.1, 0.1),
      }],
      textures: Vec::new(),
      samplers: Vec::new(),
      images: Vec::new(),
      lights,
    }
  }

  fn point_light() -> UmbraLight {
    UmbraLight {
      name: String::new(),
      color: Vec3::ONE,
      intensity: 1.0,
      kind: UmbraLightKind::POINT,
    }
  }

  fn directional_light() -> UmbraLight {
    UmbraLight {
      name: String::new(),
      color: Vec3::ONE,
      intensity: 1.0,
      kind: UmbraLightKind::DIRECTIONAL,
    }
  }

  #[test]
  fn draw_order_visits_roots_then_primitives_in_storage_order() {
    let scene = scene_with(
      vec![
        UmbraNode { mesh_index: Some(1), ..Default::default() },
        UmbraNode { mesh_index: Some(0), ..Default::default() },
      ],
      vec![0, 1],
      vec![
        UmbraMesh { primitives: vec![flat_primitive(Some(0))] },
        UmbraMesh { primitives: vec![flat_primitive(Some(0)), flat_primitive(Some(0))] },
      ],
      Vec::new(),
    );

    let order = scene.draw_order();
    assert_eq!(order, vec![
      UmbraDrawRef { node_index: 0, mesh_index: 1, primitive_index: 0 },
      UmbraDrawRef { node_index: 0, mesh_index: 1, primitive_index: 1 },
      UmbraDrawRef { node_index: 1, mesh_index: 0, primitive_index: 0 },
    ]);
    // The traversal is deterministic across calls.
    assert_eq!(order, scene.draw_order());
  }

  #[test]
  fn draw_order_skips_light_carrying_nodes() {
    let scene = scene_with(
      vec![
        UmbraNode { mesh_index: Some(0), light_index: Some(0), ..Default::default() },
        UmbraNode { mesh_index: Some(0), ..Default::default() },
      ],
      vec![0, 1],
      vec![UmbraMesh { primitives: vec![flat_primitive(Some(0))] }],
      vec![point_light()],
    );

    let order = scene.draw_order();
    assert_eq!(order.len(), 1);
    assert_eq!(order[0].node_index, 1);
  }

  #[test]
  fn locate_point_light_applies_the_node_transform() {
    let scene = scene_with(
      vec![UmbraNode {
        translation: Some(Vec3::new(3.0, 4.0, 2.0)),
        light_index: Some(0),
        ..Default::default()
      }],
      vec![0],
      Vec::new(),
      vec![point_light()],
    );

    let located = scene.locate_point_light().unwrap();
    assert_eq!(located.position, Vec3::new(3.0, 4.0, 2.0));
    assert_eq!(located.color, Vec3::ONE);
  }

  #[test]
  fn locate_point_light_without_lights_disables_shadowing() {
    let scene = scene_with(
      vec![UmbraNode { mesh_index: Some(0), ..Default::default() }],
      vec![0],
      vec![UmbraMesh { primitives: vec![flat_primitive(Some(0))] }],
      Vec::new(),
    );
    assert!(scene.locate_point_light().is_none());
  }

  #[test]
  fn directional_lights_never_contribute_a_shadow_position() {
    let scene = scene_with(
      vec![UmbraNode {
        translation: Some(Vec3::new(1.0, 1.0, 1.0)),
        light_index: Some(0),
        ..Default::default()
      }],
      vec![0],
      Vec::new(),
      vec![directional_light()],
    );
    assert!(scene.locate_point_light().is_none());
  }

  #[test]
  fn last_point_light_in_traversal_order_wins() {
    let scene = scene_with(
      vec![
        UmbraNode { translation: Some(Vec3::X), light_index: Some(0), ..Default::default() },
        UmbraNode { translation: Some(Vec3::Y), light_index: Some(1), ..Default::default() },
      ],
      vec![0, 1],
      Vec::new(),
      vec![point_light(), point_light()],
    );

    let located = scene.locate_point_light().unwrap();
    assert_eq!(located.position, Vec3::Y);
  }

  #[test]
  fn out_of_range_material_index_fails_validation() {
    let scene = scene_with(
      vec![UmbraNode { mesh_index: Some(0), ..Default::default() }],
      vec![0],
      vec![UmbraMesh { primitives: vec![flat_primitive(Some(5))] }],
      Vec::new(),
    );
    assert!(scene.validate().is_err());
  }

  #[test]
  fn out_of_range_mesh_index_fails_validation() {
    let scene = scene_with(
      vec![UmbraNode { mesh_index: Some(7), ..Default::default() }],
      vec![0],
      Vec::new(),
      Vec::new(),
    );
    assert!(scene.validate().is_err());
  }
}
