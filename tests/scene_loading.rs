use glam::Vec3;

use umbra_viewer::prelude::*;
use umbra_viewer::scene::cpu::light::UmbraLightKind;

fn data_path(name: &str) -> std::path::PathBuf {
  std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("data")
    .join(name)
}

#[test]
fn load_a_flat_color_scene() {
  let scene = UmbraScene::new(data_path("flat_triangle.gltf")).unwrap();

  assert_eq!(scene.nodes.len(), 2);
  assert_eq!(scene.meshes.len(), 1);
  assert_eq!(scene.materials.len(), 1);
  assert_eq!(scene.lights.len(), 1);
  assert!(scene.has_light());

  let primitive = &scene.meshes[0].primitives[0];
  assert_eq!(primitive.indices, vec![0, 1, 2]);
  assert_eq!(primitive.positions.len(), 3);
  assert_eq!(primitive.normals.len(), 3);
  assert_eq!(primitive.tex_coords.len(), 3);
  assert_eq!(primitive.material_index, Some(0));

  let material = &scene.materials[0];
  assert!(material.base_color_texture_index.is_none());
  assert!((material.base_color_factor - Vec3::new(0.1, 0.8, 0.2)).length() < 1e-6);
}

#[test]
fn light_nodes_are_excluded_from_the_draw_order() {
  let scene = UmbraScene::new(data_path("flat_triangle.gltf")).unwrap();

  let order = scene.draw_order();
  assert_eq!(order.len(), 1);
  assert_eq!(order[0].node_index, 0);
  assert_eq!(order[0].mesh_index, 0);
  assert_eq!(order[0].primitive_index, 0);
}

#[test]
fn the_point_light_is_located_at_its_node() {
  let scene = UmbraScene::new(data_path("flat_triangle.gltf")).unwrap();

  let light = scene.locate_point_light().unwrap();
  assert!((light.position - Vec3::new(1.0, 4.0, 2.0)).length() < 1e-6);
  assert_eq!(light.color, Vec3::ONE);
}

#[test]
fn directional_lights_are_loaded_but_cast_no_shadows() {
  let scene = UmbraScene::new(data_path("directional_only.gltf")).unwrap();

  assert_eq!(scene.lights.len(), 1);
  assert_eq!(scene.lights[0].kind, UmbraLightKind::DIRECTIONAL);
  assert!(scene.has_light());
  assert!(scene.locate_point_light().is_none());
}

#[test]
fn the_bundled_sample_scene_loads_and_validates() {
  let scene = UmbraScene::new(
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join("sample.gltf"),
  ).unwrap();

  assert!(scene.validate().is_ok());
  assert_eq!(scene.draw_order().len(), 3);
  assert!(scene.locate_point_light().is_some());
}

#[test]
fn non_triangle_primitive_modes_fail_the_load() {
  let result = UmbraScene::new(data_path("line_mode.gltf"));
  assert!(result.is_err());
}

#[test]
fn unknown_extensions_are_rejected() {
  let result = UmbraScene::new(data_path("missing.txt"));
  assert!(result.is_err());
}
