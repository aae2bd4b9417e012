use glam::{
  Mat4,
  Quat,
  Vec3,
};

/// Compose a world matrix from optional translation, rotation and scale components.
/// The result is translate * rotate * scale, applied right to left to a column vector.
/// Absent components fall back to identity translation, identity quaternion and unit scale.
/// A zero quaternion is never constructed from absent data.
/// param translation: The translation component.
/// param rotation: The rotation component.
/// param scale: The scale component.
/// return: The composed matrix.
pub fn compose(translation: Option<Vec3>, rotation: Option<Quat>, scale: Option<Vec3>) -> Mat4 {
  let translation_mtx = match translation {
    Some(t) => Mat4::from_translation(t),
    None => Mat4::IDENTITY,
  };
  let rotation_mtx = match rotation {
    Some(r) => Mat4::from_quat(r),
    None => Mat4::from_quat(Quat::IDENTITY),
  };
  let scale_mtx = match scale {
    Some(s) => Mat4::from_scale(s),
    None => Mat4::IDENTITY,
  };
  translation_mtx * rotation_mtx * scale_mtx
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn all_default_components_compose_to_identity() {
    assert_eq!(compose(None, None, None), Mat4::IDENTITY);
  }

  #[test]
  fn translation_only_moves_the_origin() {
    let mtx = compose(Some(Vec3::new(1.0, 2.0, 3.0)), None, None);
    let p = mtx.transform_point3(Vec3::ZERO);
    assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
  }

  #[test]
  fn scale_applies_before_rotation_and_translation() {
    // A point on +X, scaled by 2, rotated 90 degrees around +Y, then translated.
    let mtx = compose(
      Some(Vec3::new(0.0, 0.0, 5.0)),
      Some(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
      Some(Vec3::splat(2.0)),
    );
    let p = mtx.transform_point3(Vec3::X);
    assert!((p - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
  }

  #[test]
  fn absent_rotation_behaves_as_identity_quaternion() {
    let with_identity = compose(None, Some(Quat::IDENTITY), None);
    let with_absent = compose(None, None, None);
    assert_eq!(with_identity, with_absent);
  }
}
