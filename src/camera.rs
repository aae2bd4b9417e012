use glam::{
  Mat4,
  Quat,
  Vec3,
};

/// Degrees of rotation per pixel of cursor travel.
const CURSOR_SENSITIVITY: f32 = 8e-2;

/// The fly camera: a position and a free look direction, steered by the
/// keyboard and the cursor.
#[derive(Debug, Clone, Copy)]
pub struct UmbraCamera {
  pub position: Vec3,
  pub direction: Vec3,
  pub up: Vec3,
  pub view: Mat4,
  pub projection: Mat4,
  pub fov: f32,
  pub speed: f32,
}

/// The implementation of the camera.
impl UmbraCamera {
  /// Create a new camera.
  /// param eye: The camera position in world space.
  /// param look_at: The point looked at.
  /// param up: The up vector.
  /// param width: The viewport width in pixels.
  /// param height: The viewport height in pixels.
  /// return: The camera.
  pub fn new(eye: Vec3, look_at: Vec3, up: Vec3, width: u32, height: u32) -> Self {
    let fov = 45.0f32;
    let mut camera = Self {
      position: eye,
      direction: look_at - eye,
      up,
      view: Mat4::IDENTITY,
      projection: Self::gen_projection(fov, width, height),
      fov,
      speed: 0.01,
    };
    camera.update_view_matrix();
    camera
  }

  fn gen_projection(fov: f32, width: u32, height: u32) -> Mat4 {
    Mat4::perspective_rh(fov.to_radians(), width as f32 / height.max(1) as f32, 0.01, 1000.0)
  }

  /// Rebuild the projection matrix after a window resize.
  pub fn on_resize(&mut self, width: u32, height: u32) {
    self.projection = Self::gen_projection(self.fov, width, height);
  }

  /// Rebuild the view matrix from the current position and direction.
  pub fn update_view_matrix(&mut self) {
    self.view = Mat4::look_at_rh(self.position, self.position + self.direction, self.up);
  }

  pub fn move_forward(&mut self) {
    self.position += self.direction * self.speed;
  }

  pub fn move_backward(&mut self) {
    self.position -= self.direction * self.speed;
  }

  pub fn move_left(&mut self) {
    self.position -= self.direction.cross(self.up) * self.speed;
  }

  pub fn move_right(&mut self) {
    self.position += self.direction.cross(self.up) * self.speed;
  }

  /// Steer the look direction by a cursor delta, given in pixels as
  /// (previous - current). Yaw rotates about the up vector, pitch about the
  /// camera's right vector, and both are composed before being applied so a
  /// diagonal drag behaves the same as two separate ones.
  /// param delta_x: The horizontal cursor delta in pixels.
  /// param delta_y: The vertical cursor delta in pixels.
  pub fn process_cursor_delta(&mut self, delta_x: f32, delta_y: f32) {
    let yaw = delta_x * CURSOR_SENSITIVITY;
    let pitch = delta_y * CURSOR_SENSITIVITY;

    let yaw_quat = Quat::from_axis_angle(self.up, yaw.to_radians());
    let pitch_quat = Quat::from_axis_angle(self.direction.cross(self.up), pitch.to_radians());

    self.direction = (yaw_quat * pitch_quat).normalize() * self.direction;
    self.update_view_matrix();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_camera() -> UmbraCamera {
    UmbraCamera::new(
      Vec3::new(3.0, 5.0, 13.0),
      Vec3::ZERO,
      Vec3::Y,
      800,
      600,
    )
  }

  #[test]
  fn direction_points_from_eye_to_target() {
    let camera = test_camera();
    assert_eq!(camera.direction, Vec3::new(-3.0, -5.0, -13.0));
  }

  #[test]
  fn zero_cursor_delta_keeps_the_direction() {
    let mut camera = test_camera();
    let before = camera.direction;
    camera.process_cursor_delta(0.0, 0.0);
    assert!((camera.direction - before).length() < 1e-6);
  }

  #[test]
  fn forward_then_backward_returns_to_the_start() {
    let mut camera = test_camera();
    let start = camera.position;
    camera.move_forward();
    assert_ne!(camera.position, start);
    camera.move_backward();
    assert!((camera.position - start).length() < 1e-6);
  }

  #[test]
  fn strafe_is_perpendicular_to_the_view_direction() {
    let mut camera = test_camera();
    let start = camera.position;
    camera.move_right();
    let offset = camera.position - start;
    assert!(offset.dot(camera.direction).abs() < 1e-4);
  }

  #[test]
  fn yaw_preserves_the_direction_length() {
    let mut camera = test_camera();
    let before = camera.direction.length();
    camera.process_cursor_delta(25.0, 0.0);
    assert!((camera.direction.length() - before).abs() < 1e-3);
  }

  #[test]
  fn resize_changes_only_the_projection() {
    let mut camera = test_camera();
    let view = camera.view;
    let projection = camera.projection;
    camera.on_resize(1920, 1080);
    assert_eq!(camera.view, view);
    assert_ne!(camera.projection, projection);
  }
}
