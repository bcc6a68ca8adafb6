use gl::types::*;
use gl_bindings as gl;

use crate::core::camera::Camera;
use crate::core::manipulator::Manipulator;
use crate::core::math::Vec3;
use crate::core::view::View;
use crate::core::{Config, Rectangle, WindowMode};
use glutin::{
    dpi::LogicalSize,
    event::VirtualKeyCode,
    event_loop::EventLoop,
    window::{Fullscreen, WindowBuilder},
    Api, ContextBuilder, ContextWrapper, GlProfile, GlRequest, PossiblyCurrent,
};
use log::{error, warn};
use std::collections::HashMap;
use std::ffi::CStr;
use std::ptr;

/// Viewport rectangles for every view, origin at the bottom left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLayout {
    pub main: Rectangle,
    pub depth: Rectangle,
    pub god: Rectangle,
    pub ortho: Rectangle,
    pub ui: Rectangle,
}

/// Splits the drawable area between the views: the UI covers the window,
/// the scene views share what remains right of the sidebar. In split view
/// the scene area is divided into quadrants.
pub fn compute_layout(width: i32, height: i32, sidebar: i32, split_view: bool) -> ViewLayout {
    let sidebar = sidebar.clamp(0, width);
    let content_width = width - sidebar;
    let ui = Rectangle::new(0, 0, width, height);

    if !split_view {
        let main = Rectangle::new(sidebar, 0, content_width, height);
        return ViewLayout {
            main,
            depth: main,
            god: main,
            ortho: main,
            ui,
        };
    }

    let half_width = content_width / 2;
    let half_height = height / 2;

    ViewLayout {
        main: Rectangle::new(sidebar, half_height, half_width, height - half_height),
        depth: Rectangle::new(sidebar, 0, half_width, half_height),
        god: Rectangle::new(
            sidebar + half_width,
            half_height,
            content_width - half_width,
            height - half_height,
        ),
        ortho: Rectangle::new(
            sidebar + half_width,
            0,
            content_width - half_width,
            half_height,
        ),
        ui,
    }
}

/// The native window, its GL context, and the views rendered into it.
///
/// Owns input routing: a mouse press latches the view under the cursor as
/// the drag target until release, and each pressed key remembers which view
/// received it so the release reaches the same view.
pub struct Window {
    context: ContextWrapper<PossiblyCurrent, glutin::window::Window>,

    views: Vec<View>,
    main_index: usize,
    ui_index: usize,
    split_indices: Option<(usize, usize, usize)>,

    width: i32,
    height: i32,
    dpi_scale: f32,
    split_view: bool,

    last_x: i32,
    last_y: i32,
    mouse_event_target: Option<usize>,
    key_event_target: HashMap<VirtualKeyCode, usize>,
}

impl Window {
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self, String> {
        let api = config.graphics_api_version;
        assert!(
            api.major == 4 && api.minor >= 5,
            "OpenGL 4.5 or newer is required"
        );

        let mut window_builder = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.window_size.x, config.window_size.y))
            .with_resizable(config.resizeable)
            // A hidden window still pumps events, which headless runs need.
            .with_visible(!config.headless);

        if let WindowMode::Fullscreen = config.window_mode {
            let monitor = event_loop.available_monitors().next();
            let video_mode = monitor.and_then(|m| m.video_modes().next());
            if let Some(video_mode) = video_mode {
                window_builder = window_builder.with_fullscreen(Some(Fullscreen::Exclusive(video_mode)));
            }
        }

        let context = ContextBuilder::new()
            .with_double_buffer(Some(true))
            .with_gl_profile(GlProfile::Core)
            .with_srgb(true)
            .with_multisampling(config.msaa.samples())
            .with_vsync(config.vsync)
            .with_gl(GlRequest::Specific(
                Api::OpenGl,
                (api.major as u8, api.minor as u8),
            ))
            .build_windowed(window_builder, event_loop)
            .map_err(|e| e.to_string())?;

        let context = unsafe { context.make_current().map_err(|(_, e)| e.to_string())? };

        gl::load_with(|s| context.get_proc_address(s) as *const _);

        let physical = context.window().inner_size();
        let dpi_scale = context.window().scale_factor() as f32;

        unsafe {
            gl::Enable(gl::DEPTH_TEST);
            gl::Enable(gl::CULL_FACE);
            gl::Enable(gl::MULTISAMPLE);
            gl::Enable(gl::FRAMEBUFFER_SRGB);
            gl::Enable(gl::TEXTURE_CUBE_MAP_SEAMLESS);

            gl::Viewport(0, 0, physical.width as i32, physical.height as i32);

            if cfg!(debug_assertions) {
                gl::Enable(gl::DEBUG_OUTPUT);
                gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
                gl::DebugMessageCallback(Some(Self::debug_callback), ptr::null());
            }
        }

        let mut window = Self {
            context,
            views: Vec::new(),
            main_index: 0,
            ui_index: 0,
            split_indices: None,
            width: physical.width as i32,
            height: physical.height as i32,
            dpi_scale,
            split_view: config.split_view,
            last_x: 0,
            last_y: 0,
            mouse_event_target: None,
            key_event_target: HashMap::new(),
        };
        window.create_views(config);
        window.configure_cameras(0, 28.0);

        Ok(window)
    }

    fn create_views(&mut self, config: &Config) {
        let mut main_camera = Camera::with_lens(28.0, 0.1, 100.0);
        main_camera.set_exposure(16.0, 1.0 / 125.0, 100.0);

        let main_manipulator = Manipulator::builder()
            .mode(config.camera_mode)
            .target_position(Vec3::new(0.0, 0.0, 0.0))
            .home_position(Vec3::new(0.0, 0.0, 4.0))
            .build();

        self.main_index = self.views.len();
        self.views.push(View::with_manipulator(
            "main",
            main_camera,
            main_manipulator,
        ));

        if self.split_view {
            let depth_camera = Camera::with_lens(28.0, 0.1, 100.0);
            let depth_index = self.views.len();
            self.views.push(View::new("depth", depth_camera));

            let god_manipulator = Manipulator::builder()
                .target_position(Vec3::new(0.0, 0.0, 0.0))
                .home_position(Vec3::new(0.0, 4.0, 16.0))
                .build();
            let god_index = self.views.len();
            self.views.push(View::with_manipulator(
                "god",
                Camera::with_fov(45.0, 0.1, 1000.0),
                god_manipulator,
            ));

            let mut ortho_camera = Camera::with_ortho(3.0, -100.0, 100.0);
            ortho_camera.look_at(
                Vec3::new(0.0, 10.0, 0.01),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            );
            let ortho_index = self.views.len();
            self.views.push(View::new("ortho", ortho_camera));

            self.split_indices = Some((depth_index, god_index, ortho_index));
        }

        self.ui_index = self.views.len();
        self.views
            .push(View::new("ui", Camera::with_fov(45.0, 0.1, 1.0)));
    }

    /// Distributes viewports and projections after a resize or a change of
    /// the sidebar width or focal length. The sidebar width is in logical
    /// pixels and scales with the DPI factor.
    pub fn configure_cameras(&mut self, sidebar_width: i32, focal_length_mm: f32) {
        let sidebar = (sidebar_width as f32 * self.dpi_scale) as i32;
        let layout = compute_layout(self.width, self.height, sidebar, self.split_view);

        let main_view = &mut self.views[self.main_index];
        main_view.set_viewport(layout.main);
        main_view.camera_mut().set_focal_length(focal_length_mm);

        if let Some((depth, god, ortho)) = self.split_indices {
            self.views[depth].set_viewport(layout.depth);
            self.views[depth]
                .camera_mut()
                .set_focal_length(focal_length_mm);
            self.views[god].set_viewport(layout.god);
            self.views[ortho].set_viewport(layout.ortho);
        }

        self.views[self.ui_index].set_viewport(layout.ui);
    }

    /// Advances every manipulator-backed view, then mirrors the main camera
    /// pose into the depth view so both render the same frame.
    pub fn tick_views(&mut self, dt: f32) {
        for view in &mut self.views {
            view.tick(dt);
        }

        if let Some((depth, ..)) = self.split_indices {
            if let Some((eye, center, up)) = self.views[self.main_index]
                .manipulator()
                .map(|m| m.get_look_at())
            {
                self.views[depth].camera_mut().look_at(eye, center, up);
            }
        }
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn main_view(&self) -> &View {
        &self.views[self.main_index]
    }

    pub fn main_view_mut(&mut self) -> &mut View {
        &mut self.views[self.main_index]
    }

    pub fn ui_view(&self) -> &View {
        &self.views[self.ui_index]
    }

    pub fn depth_view_index(&self) -> Option<usize> {
        self.split_indices.map(|(depth, ..)| depth)
    }

    pub fn god_view(&self) -> Option<&View> {
        self.split_indices.map(|(_, god, _)| &self.views[god])
    }

    pub fn window(&self) -> &glutin::window::Window {
        self.context.window()
    }

    pub fn get_proc_address(&self, symbol: &str) -> *const std::ffi::c_void {
        self.context.get_proc_address(symbol)
    }

    pub fn drawable_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn dpi_scale(&self) -> f32 {
        self.dpi_scale
    }

    /// Highest refresh rate the current monitor reports.
    pub fn refresh_rate(&self) -> Option<u16> {
        self.context
            .window()
            .current_monitor()
            .and_then(|monitor| monitor.video_modes().map(|mode| mode.refresh_rate()).max())
    }

    pub fn swap_buffers(&mut self) {
        if let Err(e) = self.context.swap_buffers() {
            error!("Failed to swap buffers: {}", e);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32, sidebar_width: i32, focal_length_mm: f32) {
        self.context
            .resize(glutin::dpi::PhysicalSize::new(width, height));
        self.width = width as i32;
        self.height = height as i32;
        self.dpi_scale = self.context.window().scale_factor() as f32;
        unsafe { gl::Viewport(0, 0, self.width, self.height) };
        self.configure_cameras(sidebar_width, focal_length_mm);
    }

    pub fn mouse_down(&mut self, strafe: bool, x: i32, y: i32) {
        let (x, y) = self.flip_y(x, y);
        self.last_x = x;
        self.last_y = y;
        if let Some(index) = self.view_index_at(x, y) {
            self.mouse_event_target = Some(index);
            self.views[index].mouse_down(strafe, x, y);
        }
    }

    pub fn mouse_up(&mut self, x: i32, y: i32) {
        let (x, y) = self.flip_y(x, y);
        if let Some(index) = self.mouse_event_target.take() {
            self.views[index].mouse_up(x, y);
        }
    }

    pub fn mouse_moved(&mut self, x: i32, y: i32) {
        let (x, y) = self.flip_y(x, y);
        self.last_x = x;
        self.last_y = y;
        if let Some(index) = self.mouse_event_target {
            self.views[index].mouse_moved(x, y);
        }
    }

    pub fn mouse_wheel(&mut self, delta: f32) {
        let (x, y) = (self.last_x, self.last_y);
        if let Some(index) = self.view_index_at(x, y) {
            self.views[index].mouse_wheel(x, y, delta);
        }
    }

    pub fn key_down(&mut self, keycode: VirtualKeyCode) {
        // Tolerate a key down arriving while the key is already tracked
        // (focus changes can drop the release).
        if self.key_event_target.contains_key(&keycode) {
            return;
        }

        let index = self
            .view_index_at(self.last_x, self.last_y)
            .unwrap_or(self.main_index);
        self.key_event_target.insert(keycode, index);
        self.views[index].key_down(keycode);
    }

    pub fn key_up(&mut self, keycode: VirtualKeyCode) {
        if let Some(index) = self.key_event_target.remove(&keycode) {
            self.views[index].key_up(keycode);
        }
    }

    /// First view whose viewport contains the point; the UI view is
    /// skipped since it covers the entire window and takes no scene input.
    fn view_index_at(&self, x: i32, y: i32) -> Option<usize> {
        self.views
            .iter()
            .enumerate()
            .find(|(index, view)| *index != self.ui_index && view.intersects(x, y))
            .map(|(index, _)| index)
    }

    /// Window events use a top left origin; views and GL use bottom left.
    fn flip_y(&self, x: i32, y: i32) -> (i32, i32) {
        (x, self.height - y)
    }

    extern "system" fn debug_callback(
        _source: GLenum,
        message_type: GLenum,
        _id: GLuint,
        severity: GLenum,
        _length: GLsizei,
        message: *const GLchar,
        _user_param: *mut GLvoid,
    ) {
        let msg = unsafe { CStr::from_ptr(message) };

        if message_type == gl::DEBUG_TYPE_ERROR {
            error!("GL ({}): {:?}", Self::severity_to_str(severity), msg);
        } else if severity != gl::DEBUG_SEVERITY_NOTIFICATION {
            warn!("GL ({}): {:?}", Self::severity_to_str(severity), msg);
        }
    }

    fn severity_to_str(severity: GLenum) -> &'static str {
        match severity {
            gl::DEBUG_SEVERITY_HIGH => "HIGH",
            gl::DEBUG_SEVERITY_MEDIUM => "MEDIUM",
            gl::DEBUG_SEVERITY_LOW => "LOW",
            gl::DEBUG_SEVERITY_NOTIFICATION => "NOTIFICATION",
            _ => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_view_layout_insets_by_the_sidebar() {
        let layout = compute_layout(1280, 768, 300, false);

        assert_eq!(layout.ui, Rectangle::new(0, 0, 1280, 768));
        assert_eq!(layout.main, Rectangle::new(300, 0, 980, 768));
    }

    #[test]
    fn split_layout_partitions_into_quadrants() {
        let layout = compute_layout(1280, 768, 0, true);

        assert_eq!(layout.main, Rectangle::new(0, 384, 640, 384));
        assert_eq!(layout.depth, Rectangle::new(0, 0, 640, 384));
        assert_eq!(layout.god, Rectangle::new(640, 384, 640, 384));
        assert_eq!(layout.ortho, Rectangle::new(640, 0, 640, 384));
        assert_eq!(layout.ui, Rectangle::new(0, 0, 1280, 768));
    }

    #[test]
    fn split_layout_with_odd_sizes_covers_every_pixel() {
        let layout = compute_layout(1281, 769, 201, true);

        assert_eq!(layout.main.x, 201);
        assert_eq!(layout.depth.width + layout.ortho.width, 1281 - 201);
        assert_eq!(layout.main.height + layout.depth.height, 769);
        // No overlap between the left and right columns.
        assert_eq!(layout.god.x, layout.main.x + layout.main.width);
    }

    #[test]
    fn sidebar_wider_than_the_window_is_clamped() {
        let layout = compute_layout(640, 480, 900, false);
        assert_eq!(layout.main.width, 0);
        assert_eq!(layout.main.x, 640);
    }
}
