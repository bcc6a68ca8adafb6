use crate::core::camera::Camera;
use crate::core::manipulator::Manipulator;
use crate::core::Rectangle;
use glutin::event::VirtualKeyCode;

/// A named rectangular render target within the window, paired with a
/// camera and at most one input manipulator.
pub struct View {
    name: String,
    viewport: Rectangle,
    camera: Camera,
    manipulator: Option<Manipulator>,
}

impl View {
    pub fn new(name: &str, camera: Camera) -> Self {
        Self {
            name: String::from(name),
            viewport: Rectangle::new(0, 0, 1, 1),
            camera,
            manipulator: None,
        }
    }

    pub fn with_manipulator(name: &str, camera: Camera, manipulator: Manipulator) -> Self {
        Self {
            manipulator: Some(manipulator),
            ..Self::new(name, camera)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn viewport(&self) -> Rectangle {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn manipulator(&self) -> Option<&Manipulator> {
        self.manipulator.as_ref()
    }

    pub fn manipulator_mut(&mut self) -> Option<&mut Manipulator> {
        self.manipulator.as_mut()
    }

    /// Resizes the view. The manipulator and the camera projection track
    /// the viewport.
    pub fn set_viewport(&mut self, viewport: Rectangle) {
        self.viewport = viewport;
        self.camera.set_aspect_ratio(viewport.aspect_ratio());
        if let Some(manipulator) = self.manipulator.as_mut() {
            manipulator.set_viewport(viewport.width as u32, viewport.height as u32);
        }
    }

    pub fn intersects(&self, x: i32, y: i32) -> bool {
        self.viewport.contains(x, y)
    }

    /// Advances the manipulator and re-aims the camera from its frame.
    pub fn tick(&mut self, dt: f32) {
        if let Some(manipulator) = self.manipulator.as_mut() {
            manipulator.update(dt);
            let (eye, center, up) = manipulator.get_look_at();
            self.camera.look_at(eye, center, up);
        }
    }

    pub fn mouse_down(&mut self, strafe: bool, x: i32, y: i32) {
        if let Some(manipulator) = self.manipulator.as_mut() {
            let local = (x - self.viewport.x, y - self.viewport.y);
            manipulator.grab_begin(local.0 as f32, local.1 as f32, strafe);
        }
    }

    pub fn mouse_up(&mut self, _x: i32, _y: i32) {
        if let Some(manipulator) = self.manipulator.as_mut() {
            manipulator.grab_end();
        }
    }

    pub fn mouse_moved(&mut self, x: i32, y: i32) {
        if let Some(manipulator) = self.manipulator.as_mut() {
            let local = (x - self.viewport.x, y - self.viewport.y);
            manipulator.grab_update(local.0 as f32, local.1 as f32);
        }
    }

    pub fn mouse_wheel(&mut self, x: i32, y: i32, delta: f32) {
        if let Some(manipulator) = self.manipulator.as_mut() {
            let local = (x - self.viewport.x, y - self.viewport.y);
            manipulator.scroll(local.0 as f32, local.1 as f32, delta);
        }
    }

    pub fn key_down(&mut self, keycode: VirtualKeyCode) {
        if let Some(manipulator) = self.manipulator.as_mut() {
            if let Some(key) = Manipulator::key_from_keycode(keycode) {
                manipulator.key_down(key);
            }
        }
    }

    pub fn key_up(&mut self, keycode: VirtualKeyCode) {
        if let Some(manipulator) = self.manipulator.as_mut() {
            if let Some(key) = Manipulator::key_from_keycode(keycode) {
                manipulator.key_up(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vec3;

    #[test]
    fn input_is_a_no_op_without_a_manipulator() {
        let mut view = View::new("ui", Camera::with_fov(45.0, 0.1, 100.0));
        view.set_viewport(Rectangle::new(0, 0, 640, 480));

        view.mouse_down(false, 10, 10);
        view.mouse_moved(100, 100);
        view.mouse_wheel(10, 10, 1.0);
        view.key_down(VirtualKeyCode::W);
        view.tick(1.0);
    }

    #[test]
    fn tick_aims_the_camera_from_the_manipulator() {
        let manipulator = Manipulator::builder()
            .home_position(Vec3::new(0.0, 0.0, 4.0))
            .build();
        let mut view =
            View::with_manipulator("main", Camera::with_lens(28.0, 0.1, 100.0), manipulator);
        view.set_viewport(Rectangle::new(0, 0, 640, 480));

        view.tick(1.0);
        assert!((view.camera().position() - Vec3::new(0.0, 0.0, 4.0)).norm() < 1e-4);
    }

    #[test]
    fn mouse_coordinates_are_made_viewport_local() {
        let manipulator = Manipulator::builder().build();
        let mut view =
            View::with_manipulator("main", Camera::with_lens(28.0, 0.1, 100.0), manipulator);
        view.set_viewport(Rectangle::new(100, 0, 640, 480));

        assert!(!view.intersects(99, 10));
        assert!(view.intersects(100, 10));

        // A drag fully inside the view rotates the camera off the z axis.
        view.mouse_down(false, 420, 240);
        view.mouse_moved(260, 240);
        view.mouse_up(260, 240);
        view.tick(1.0);
        view.tick(1.0);
        assert!(view.camera().position().x.abs() > 1e-3);
    }
}
