use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::scene_camera::SceneCamera;

/// Mouse-driven orbit controls for inspecting the scene
///
/// Left drag orbits the eye around the scene centre, the wheel zooms and
/// `R` puts the camera back where it was when the controller was created.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    is_mouse_pressed: bool,
    home: Option<SceneCamera>,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            is_mouse_pressed: false,
            home: None,
        }
    }

    /// Remembers the pose `R` resets to
    pub fn set_home(&mut self, camera: SceneCamera) {
        self.home = Some(camera);
    }

    pub fn process_events(&mut self, event: &DeviceEvent, window: &Window, camera: &mut SceneCamera) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 * 0.1
                    }
                };
                camera.zoom(scroll_amount * self.zoom_speed);
                window.request_redraw();
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    camera.orbit(
                        -delta.0 as f32 * self.rotate_speed,
                        delta.1 as f32 * self.rotate_speed,
                    );
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut SceneCamera) {
        if let KeyEvent {
            physical_key: PhysicalKey::Code(KeyCode::KeyR),
            state: ElementState::Pressed,
            ..
        } = event
        {
            if let Some(home) = self.home {
                log::debug!("Resetting camera to home position");
                *camera = home;
            }
        }
    }
}
