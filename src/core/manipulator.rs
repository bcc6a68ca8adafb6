use crate::core::math::{self, Vec2, Vec3};
use crate::core::CameraMode;
use glutin::event::VirtualKeyCode;

/// Keys understood by the manipulator, mapped from raw keycodes with
/// [`Manipulator::key_from_keycode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Forward,
    Left,
    Backward,
    Right,
    Up,
    Down,
}

impl Key {
    const COUNT: usize = 6;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Grab {
    Rotate,
    Track,
}

/// Translates raw cursor, scroll and key input into a smoothed look-at
/// frame for one camera.
///
/// In `Orbit` mode a grab rotates the eye around the target and a strafe
/// grab pans the target in the view plane. In `Map` mode a grab drags the
/// ground plane point under the cursor. In `FreeFlight` mode the keys fly
/// the eye around and a grab steers.
pub struct Manipulator {
    mode: CameraMode,
    viewport: Vec2,
    up: Vec3,
    fov_deg: f32,
    orbit_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    ground_height: f32,
    flight_speed: f32,
    damping: f32,

    // Raw gesture targets; the presented frame eases towards these.
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,

    current_target: Vec3,
    current_yaw: f32,
    current_pitch: f32,
    current_distance: f32,

    // Free flight state.
    eye: Vec3,
    velocity: Vec3,
    keys_down: [bool; Key::COUNT],

    grab: Option<Grab>,
    last_cursor: Vec2,
    grab_point: Vec3,
}

impl Manipulator {
    const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.001;

    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Maps a raw keycode to a manipulator key (WASD plus E/Q for up/down).
    pub fn key_from_keycode(keycode: VirtualKeyCode) -> Option<Key> {
        match keycode {
            VirtualKeyCode::W => Some(Key::Forward),
            VirtualKeyCode::A => Some(Key::Left),
            VirtualKeyCode::S => Some(Key::Backward),
            VirtualKeyCode::D => Some(Key::Right),
            VirtualKeyCode::E => Some(Key::Up),
            VirtualKeyCode::Q => Some(Key::Down),
            _ => None,
        }
    }

    pub fn grab_begin(&mut self, x: f32, y: f32, strafe: bool) {
        self.grab = Some(if strafe { Grab::Track } else { Grab::Rotate });
        self.last_cursor = Vec2::new(x, y);

        if self.mode == CameraMode::Map {
            if let Some(point) = self.raycast_ground(x, y) {
                self.grab_point = point;
            }
        }
    }

    pub fn grab_update(&mut self, x: f32, y: f32) {
        let grab = match self.grab {
            Some(grab) => grab,
            None => return,
        };

        let cursor = Vec2::new(x, y);
        let delta = cursor - self.last_cursor;
        self.last_cursor = cursor;

        match (self.mode, grab) {
            (CameraMode::Orbit, Grab::Rotate) => {
                self.yaw -= delta.x * self.orbit_speed;
                self.pitch = math::clamp_scalar(
                    self.pitch + delta.y * self.orbit_speed,
                    -Self::MAX_PITCH,
                    Self::MAX_PITCH,
                );
            }
            (CameraMode::Orbit, Grab::Track) => {
                // Keep the grabbed point under the cursor: one pixel of
                // drag moves the target one pixel's worth of view plane.
                let units_per_pixel =
                    2.0 * self.distance * (self.fov_deg.to_radians() * 0.5).tan() / self.viewport.y;
                let (right, upward) = self.view_plane_axes();
                self.target += (right * -delta.x + upward * delta.y) * units_per_pixel;
            }
            (CameraMode::Map, _) => {
                if let Some(point) = self.raycast_ground(x, y) {
                    let correction = self.grab_point - point;
                    self.target += Vec3::new(correction.x, 0.0, correction.z);
                }
            }
            (CameraMode::FreeFlight, _) => {
                self.yaw -= delta.x * self.orbit_speed;
                self.pitch = math::clamp_scalar(
                    self.pitch - delta.y * self.orbit_speed,
                    -Self::MAX_PITCH,
                    Self::MAX_PITCH,
                );
            }
        }
    }

    pub fn grab_end(&mut self) {
        self.grab = None;
    }

    pub fn scroll(&mut self, x: f32, y: f32, delta: f32) {
        match self.mode {
            CameraMode::Map => {
                // Zoom towards the ground point under the cursor.
                if let Some(point) = self.raycast_ground(x, y) {
                    let toward = point - self.target;
                    self.target += toward * (delta * self.zoom_speed * 0.1).min(1.0);
                }
                self.dolly(delta);
            }
            _ => self.dolly(delta),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        self.keys_down[key as usize] = true;
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys_down[key as usize] = false;
    }

    /// Advances the damped state. Total: with no pending input the frame
    /// converges on the last gesture targets.
    pub fn update(&mut self, dt: f32) {
        let t = math::clamp_scalar(dt * self.damping, 0.0, 1.0);

        self.current_yaw = math::lerp_scalar(self.current_yaw, self.yaw, t);
        self.current_pitch = math::lerp_scalar(self.current_pitch, self.pitch, t);
        self.current_distance = math::lerp_scalar(self.current_distance, self.distance, t);
        self.current_target = math::vec3_lerp(&self.current_target, &self.target, t);

        if self.mode == CameraMode::FreeFlight {
            let desired = self.desired_flight_velocity();
            self.velocity = math::vec3_lerp(&self.velocity, &desired, t);
            self.eye += self.velocity * dt;
        }
    }

    /// The current camera frame as `(eye, center, up)`.
    pub fn get_look_at(&self) -> (Vec3, Vec3, Vec3) {
        match self.mode {
            CameraMode::FreeFlight => {
                let center = self.eye - self.orbit_direction();
                (self.eye, center, self.up)
            }
            _ => {
                let eye = self.current_target + self.orbit_direction() * self.current_distance;
                (eye, self.current_target, self.up)
            }
        }
    }

    fn dolly(&mut self, delta: f32) {
        self.distance = math::clamp_scalar(
            self.distance - delta * self.zoom_speed * self.distance * 0.1,
            self.min_distance,
            self.max_distance,
        );
    }

    /// Unit vector from the target towards the eye.
    fn orbit_direction(&self) -> Vec3 {
        let (yaw, pitch) = (self.current_yaw, self.current_pitch);
        Vec3::new(
            yaw.sin() * pitch.cos(),
            pitch.sin(),
            yaw.cos() * pitch.cos(),
        )
    }

    fn view_plane_axes(&self) -> (Vec3, Vec3) {
        let forward = -self.orbit_direction();
        let right = forward.cross(&self.up).normalize();
        let upward = right.cross(&forward).normalize();
        (right, upward)
    }

    /// Intersects the ray under the cursor with the ground plane.
    fn raycast_ground(&self, x: f32, y: f32) -> Option<Vec3> {
        let (eye, center, _) = self.get_look_at();
        let forward = (center - eye).normalize();
        let (right, upward) = self.view_plane_axes();

        // Cursor offset from the viewport center in view plane units.
        let tan_half_fov = (self.fov_deg.to_radians() * 0.5).tan();
        let u = (2.0 * x / self.viewport.x - 1.0) * tan_half_fov * self.viewport.x
            / self.viewport.y;
        let v = (2.0 * y / self.viewport.y - 1.0) * tan_half_fov;

        let direction = (forward + right * u + upward * v).normalize();
        math::raycast_plane(&eye, &direction, self.ground_height)
            .map(|t| eye + direction * t)
    }

    fn desired_flight_velocity(&self) -> Vec3 {
        let forward = -self.orbit_direction();
        let (right, _) = self.view_plane_axes();

        let mut direction = Vec3::new(0.0, 0.0, 0.0);
        if self.keys_down[Key::Forward as usize] {
            direction += forward;
        }
        if self.keys_down[Key::Backward as usize] {
            direction -= forward;
        }
        if self.keys_down[Key::Right as usize] {
            direction += right;
        }
        if self.keys_down[Key::Left as usize] {
            direction -= right;
        }
        if self.keys_down[Key::Up as usize] {
            direction += self.up;
        }
        if self.keys_down[Key::Down as usize] {
            direction -= self.up;
        }

        if direction.norm_squared() > 0.0 {
            direction.normalize() * self.flight_speed
        } else {
            direction
        }
    }
}

pub struct Builder {
    mode: CameraMode,
    viewport: Vec2,
    target: Vec3,
    home_position: Vec3,
    up: Vec3,
    fov_deg: f32,
    orbit_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    ground_height: f32,
    flight_speed: f32,
    damping: f32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            mode: CameraMode::Orbit,
            viewport: Vec2::new(1.0, 1.0),
            target: Vec3::new(0.0, 0.0, 0.0),
            home_position: Vec3::new(0.0, 0.0, 4.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_deg: 33.0,
            orbit_speed: 0.01,
            zoom_speed: 1.0,
            min_distance: 0.1,
            max_distance: 1000.0,
            ground_height: 0.0,
            flight_speed: 10.0,
            damping: 12.0,
        }
    }
}

impl Builder {
    pub fn mode(mut self, mode: CameraMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        self
    }

    pub fn target_position(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    pub fn home_position(mut self, position: Vec3) -> Self {
        self.home_position = position;
        self
    }

    pub fn up_vector(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    pub fn fov_degrees(mut self, fov: f32) -> Self {
        self.fov_deg = fov;
        self
    }

    pub fn orbit_speed(mut self, speed: f32) -> Self {
        self.orbit_speed = speed;
        self
    }

    pub fn zoom_speed(mut self, speed: f32) -> Self {
        self.zoom_speed = speed;
        self
    }

    pub fn distance_range(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    pub fn ground_height(mut self, height: f32) -> Self {
        self.ground_height = height;
        self
    }

    pub fn flight_speed(mut self, speed: f32) -> Self {
        self.flight_speed = speed;
        self
    }

    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn build(self) -> Manipulator {
        let offset = self.home_position - self.target;
        let distance = math::clamp_scalar(offset.norm(), self.min_distance, self.max_distance);

        // Recover yaw/pitch from the home offset; a degenerate offset
        // falls back to looking down negative z.
        let (yaw, pitch) = if offset.norm_squared() > 0.0 {
            let dir = offset.normalize();
            (dir.x.atan2(dir.z), dir.y.asin())
        } else {
            (0.0, 0.0)
        };

        Manipulator {
            mode: self.mode,
            viewport: self.viewport,
            up: self.up,
            fov_deg: self.fov_deg,
            orbit_speed: self.orbit_speed,
            zoom_speed: self.zoom_speed,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            ground_height: self.ground_height,
            flight_speed: self.flight_speed,
            damping: self.damping,
            target: self.target,
            yaw,
            pitch,
            distance,
            current_target: self.target,
            current_yaw: yaw,
            current_pitch: pitch,
            current_distance: distance,
            eye: self.home_position,
            velocity: Vec3::new(0.0, 0.0, 0.0),
            keys_down: [false; Key::COUNT],
            grab: None,
            last_cursor: Vec2::new(0.0, 0.0),
            grab_point: Vec3::new(0.0, 0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!((a - b).norm() < 1e-4, "{:?} != {:?}", a, b);
    }

    fn settled(manipulator: &mut Manipulator) {
        for _ in 0..8 {
            manipulator.update(1.0);
        }
    }

    #[test]
    fn default_frame_is_the_home_position() {
        let manipulator = Manipulator::builder()
            .viewport(640, 480)
            .home_position(Vec3::new(0.0, 0.0, 4.0))
            .build();

        let (eye, center, up) = manipulator.get_look_at();
        assert_vec3_eq(eye, Vec3::new(0.0, 0.0, 4.0));
        assert_vec3_eq(center, Vec3::new(0.0, 0.0, 0.0));
        assert_vec3_eq(up, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn orbit_grab_rotates_around_the_target() {
        let mut manipulator = Manipulator::builder().viewport(640, 480).build();

        // Drag a quarter turn's worth of pixels to the left.
        let quarter_turn = std::f32::consts::FRAC_PI_2 / 0.01;
        manipulator.grab_begin(320.0, 240.0, false);
        manipulator.grab_update(320.0 - quarter_turn, 240.0);
        manipulator.grab_end();
        settled(&mut manipulator);

        let (eye, center, _) = manipulator.get_look_at();
        assert_vec3_eq(center, Vec3::new(0.0, 0.0, 0.0));
        assert_vec3_eq(eye, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn pitch_never_reaches_the_poles() {
        let mut manipulator = Manipulator::builder().viewport(640, 480).build();

        manipulator.grab_begin(320.0, 240.0, false);
        manipulator.grab_update(320.0, 240.0 + 1.0e6);
        manipulator.grab_end();
        settled(&mut manipulator);

        let (eye, center, up) = manipulator.get_look_at();
        let forward = (center - eye).normalize();
        assert!(forward.cross(&up).norm() > 1e-4);
    }

    #[test]
    fn dolly_is_clamped_to_the_distance_range() {
        let mut manipulator = Manipulator::builder()
            .viewport(640, 480)
            .home_position(Vec3::new(0.0, 0.0, 4.0))
            .distance_range(1.0, 8.0)
            .build();

        for _ in 0..100 {
            manipulator.scroll(320.0, 240.0, 10.0);
        }
        settled(&mut manipulator);
        let (eye, center, _) = manipulator.get_look_at();
        assert!((eye - center).norm() >= 1.0 - 1e-4);

        for _ in 0..100 {
            manipulator.scroll(320.0, 240.0, -10.0);
        }
        settled(&mut manipulator);
        let (eye, center, _) = manipulator.get_look_at();
        assert!((eye - center).norm() <= 8.0 + 1e-4);
    }

    #[test]
    fn strafe_grab_pans_eye_and_target_together() {
        let mut manipulator = Manipulator::builder().viewport(640, 480).build();

        manipulator.grab_begin(320.0, 240.0, true);
        manipulator.grab_update(220.0, 240.0);
        manipulator.grab_end();
        settled(&mut manipulator);

        let (eye, center, _) = manipulator.get_look_at();
        // The whole frame translated along the view plane x axis.
        assert!(center.x > 0.0);
        assert!((eye.x - center.x).abs() < 1e-4);
        assert!((center.y).abs() < 1e-4);
        assert!(((eye - center).norm() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn map_grab_keeps_the_ground_point_under_the_cursor() {
        let mut manipulator = Manipulator::builder()
            .mode(CameraMode::Map)
            .viewport(640, 480)
            .home_position(Vec3::new(0.0, 10.0, 0.01))
            .build();

        let before = manipulator.raycast_ground(320.0, 240.0).unwrap();
        manipulator.grab_begin(320.0, 240.0, false);
        manipulator.grab_update(400.0, 240.0);
        manipulator.grab_end();
        settled(&mut manipulator);

        let after = manipulator.raycast_ground(400.0, 240.0).unwrap();
        assert!((after - before).norm() < 0.5, "{:?} vs {:?}", after, before);
    }

    #[test]
    fn flight_keys_move_the_eye() {
        let mut manipulator = Manipulator::builder()
            .mode(CameraMode::FreeFlight)
            .viewport(640, 480)
            .home_position(Vec3::new(0.0, 0.0, 4.0))
            .build();

        let (start, ..) = manipulator.get_look_at();
        manipulator.key_down(Key::Forward);
        for _ in 0..10 {
            manipulator.update(0.1);
        }
        manipulator.key_up(Key::Forward);

        let (eye, ..) = manipulator.get_look_at();
        assert!(eye.z < start.z, "eye should fly forward: {:?}", eye);

        // Releasing the key bleeds the velocity off.
        for _ in 0..10 {
            manipulator.update(1.0);
        }
        let (rest, ..) = manipulator.get_look_at();
        let (later, ..) = {
            manipulator.update(1.0);
            manipulator.get_look_at()
        };
        assert!((later - rest).norm() < 1e-3);
    }

    #[test]
    fn keycodes_map_to_manipulator_keys() {
        assert_eq!(
            Manipulator::key_from_keycode(VirtualKeyCode::W),
            Some(Key::Forward)
        );
        assert_eq!(
            Manipulator::key_from_keycode(VirtualKeyCode::Q),
            Some(Key::Down)
        );
        assert_eq!(Manipulator::key_from_keycode(VirtualKeyCode::Escape), None);
    }
}
