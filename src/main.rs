use std::collections::HashSet;
use std::sync::Arc;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use umbra_viewer::prelude::*;

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;

const EYE: Vec3 = Vec3::new(3.0, 5.0, 13.0);
const LOOK_AT: Vec3 = Vec3::ZERO;
const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// The viewer application: window, renderer, camera and input state.
struct ViewerApp {
  scene: UmbraScene,
  window: Option<Arc<Window>>,
  renderer: Option<UmbraRenderer>,
  camera: Option<UmbraCamera>,
  pressed_keys: HashSet<KeyCode>,
  last_cursor: Option<(f64, f64)>,
}

impl ViewerApp {
  fn new(scene: UmbraScene) -> Self {
    Self {
      scene,
      window: None,
      renderer: None,
      camera: None,
      pressed_keys: HashSet::new(),
      last_cursor: None,
    }
  }

  /// Apply all held movement keys, one step per frame per key.
  fn apply_movement(&mut self) {
    let Some(camera) = self.camera.as_mut() else {
      return;
    };
    if self.pressed_keys.contains(&KeyCode::KeyW) {
      camera.move_forward();
    }
    if self.pressed_keys.contains(&KeyCode::KeyS) {
      camera.move_backward();
    }
    if self.pressed_keys.contains(&KeyCode::KeyA) {
      camera.move_left();
    }
    if self.pressed_keys.contains(&KeyCode::KeyD) {
      camera.move_right();
    }
    camera.update_view_matrix();
  }
}

impl ApplicationHandler for ViewerApp {
  fn resumed(&mut self, event_loop: &ActiveEventLoop) {
    if self.window.is_some() {
      return;
    }

    let attributes = Window::default_attributes()
      .with_title("umbra-viewer")
      .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
    let window = match event_loop.create_window(attributes) {
      Ok(window) => Arc::new(window),
      Err(err) => {
        log::error!("Create window failed: {}", err);
        event_loop.exit();
        return;
      },
    };

    let mut renderer = match UmbraRenderer::new(window.clone(), "shaders") {
      Ok(renderer) => renderer,
      Err(err) => {
        log::error!("Create renderer failed: {}", err);
        event_loop.exit();
        return;
      },
    };
    if let Err(err) = renderer.set_scene(&self.scene) {
      log::error!("Upload scene failed: {}", err);
      event_loop.exit();
      return;
    }

    let size = window.inner_size();
    self.camera = Some(UmbraCamera::new(EYE, LOOK_AT, UP, size.width, size.height));
    self.renderer = Some(renderer);
    self.window = Some(window);
  }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
    match event {
      WindowEvent::CloseRequested => {
        event_loop.exit();
      },
      WindowEvent::Resized(size) => {
        if let Some(renderer) = self.renderer.as_mut() {
          renderer.resize(size.width, size.height);
        }
        if let Some(camera) = self.camera.as_mut() {
          camera.on_resize(size.width, size.height);
        }
      },
      WindowEvent::CursorMoved { position, .. } => {
        if let Some((last_x, last_y)) = self.last_cursor {
          if let Some(camera) = self.camera.as_mut() {
            camera.process_cursor_delta(
              (last_x - position.x) as f32,
              (last_y - position.y) as f32,
            );
          }
        }
        self.last_cursor = Some((position.x, position.y));
      },
      WindowEvent::KeyboardInput { event, .. } => {
        let PhysicalKey::Code(code) = event.physical_key else {
          return;
        };
        match event.state {
          ElementState::Pressed => {
            match code {
              KeyCode::Escape => {
                event_loop.exit();
                return;
              },
              KeyCode::KeyO => {
                if !event.repeat {
                  if let Some(renderer) = self.renderer.as_mut() {
                    renderer.request_snapshot();
                  }
                }
              },
              _ => {},
            }
            self.pressed_keys.insert(code);
          },
          ElementState::Released => {
            self.pressed_keys.remove(&code);
          },
        }
      },
      WindowEvent::RedrawRequested => {
        self.apply_movement();
        if let (Some(renderer), Some(camera)) = (self.renderer.as_mut(), self.camera.as_ref()) {
          if let Err(err) = renderer.render(&self.scene, camera) {
            log::error!("Render frame failed: {}", err);
            event_loop.exit();
          }
        }
      },
      _ => {},
    }
  }

  fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
    if let Some(window) = self.window.as_ref() {
      window.request_redraw();
    }
  }
}

fn run() -> Result<(), UmbraViewerError> {
  let scene_path = std::env::args().nth(1)
    .unwrap_or_else(|| "assets/sample.gltf".to_owned());
  log::info!("Loading scene \"{}\".", scene_path);
  let scene = UmbraScene::new(&scene_path)?;
  if !scene.has_light() {
    log::warn!("Scene \"{}\" has no light, shadows are disabled.", scene_path);
  }

  let event_loop = EventLoop::new()
    .map_err(|err| UmbraViewerError::new("Create event loop failed.", Some(Box::new(err))))?;
  event_loop.set_control_flow(ControlFlow::Poll);

  let mut app = ViewerApp::new(scene);
  event_loop.run_app(&mut app)
    .map_err(|err| UmbraViewerError::new("Event loop failed.", Some(Box::new(err))))?;
  Ok(())
}

fn main() {
  env_logger::init();

  if let Err(err) = run() {
    log::error!("{}", err);
    std::process::exit(1);
  }
}
