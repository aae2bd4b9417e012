use glam::Vec3;

/// The kind of a light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UmbraLightKind(u8);
impl UmbraLightKind {
  pub const POINT: Self = Self(0);
  pub const DIRECTIONAL: Self = Self(1);
  pub const SPOT: Self = Self(2);
}

/// A light source in the scene.
/// Only point lights contribute to shadow casting; other kinds are carried
/// for completeness and excluded during light location.
pub struct UmbraLight {
  pub name: String,
  pub color: Vec3,
  pub intensity: f32,
  pub kind: UmbraLightKind,
}

/// The located point light of a frame: the world position derived from the
/// owning node's transform, and the light color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UmbraPointLight {
  pub position: Vec3,
  pub color: Vec3,
}
