use glutin::window::Window as GlutinWindow;
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use log::warn;
use std::fs;
use std::path::Path;

pub use ::imgui::*;

/// The UI overlay bundle: context, winit platform glue and the GL draw
/// list renderer.
pub struct ImGui {
    context: imgui::Context,
    platform: WinitPlatform,
    renderer: imgui_opengl_renderer::Renderer,
}

impl ImGui {
    pub fn new<F>(window: &GlutinWindow, font_path: &Path, scale: f32, load_fn: F) -> Self
    where
        F: FnMut(&'static str) -> *const ::std::os::raw::c_void,
    {
        let mut context = imgui::Context::create();
        context.set_ini_filename(None);

        // An unreadable font silently falls back to the built-in bitmap
        // font the atlas ships with.
        match fs::read(font_path) {
            Ok(data) => {
                context.fonts().add_font(&[FontSource::TtfData {
                    data: &data,
                    size_pixels: 16.0,
                    config: None,
                }]);
            }
            Err(e) => warn!(
                "Could not load the UI font {}: {}",
                font_path.display(),
                e
            ),
        }
        context.io_mut().font_global_scale = scale;

        let mut platform = WinitPlatform::init(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Default);

        let renderer = imgui_opengl_renderer::Renderer::new(&mut context, load_fn);

        Self {
            context,
            platform,
            renderer,
        }
    }

    /// The overlay sees every event before the scene views do.
    pub fn handle_event(&mut self, window: &GlutinWindow, event: &glutin::event::Event<()>) {
        self.platform
            .handle_event(self.context.io_mut(), window, event);
    }

    /// `(mouse, keyboard)` capture flags used to gate scene input.
    pub fn wants_capture(&self) -> (bool, bool) {
        let io = self.context.io();
        (io.want_capture_mouse, io.want_capture_keyboard)
    }

    pub fn render_frame<F>(&mut self, window: &GlutinWindow, dt: f32, build: F)
    where
        F: FnOnce(&Ui),
    {
        let io = self.context.io_mut();
        io.delta_time = dt.max(f32::EPSILON);

        if let Err(e) = self.platform.prepare_frame(io, window) {
            warn!("Failed to prepare the UI frame: {:?}", e);
            return;
        }

        let ui = self.context.frame();
        build(&ui);

        self.platform.prepare_render(&ui, window);
        self.renderer.render(ui);
    }
}

pub trait Gui {
    fn gui(&mut self, ui: &Ui);
}
