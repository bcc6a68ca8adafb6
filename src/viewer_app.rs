use sceneview::color;
use sceneview::core::driver::{App, Controls};
use sceneview::core::math::{self, Axes, Mat4, Vec4};
use sceneview::core::Context;
use sceneview::imgui::{im_str, CollapsingHeader, Condition, Gui, Ui};
use sceneview::rendering::renderer::{Ground, Scene};
use sceneview::rendering::capture_framebuffer;
use sceneview::viewer::automation::{AutomationEngine, AutomationSpec, TickAction};
use sceneview::viewer::model::Model;
use sceneview::viewer::settings::ViewerSettings;
use log::{error, info, warn};
use std::path::PathBuf;

const SIDEBAR_WIDTH: i32 = 300;

/// The sample application: loads a model and its lighting, drives the
/// side panel, the turntable animation and the automation engine.
pub struct ViewerApp {
    settings: ViewerSettings,
    automation: AutomationEngine,
    automation_started: bool,
    model_path: PathBuf,
    base_transform: Mat4,
    turntable_enabled: bool,
    turntable_speed_deg: f32,
    pending_screenshot: Option<String>,
    notification: Option<String>,
    model_name: String,
    primitive_count: usize,
}

impl ViewerApp {
    pub fn new(config: &sceneview::core::Config) -> Self {
        let settings = match config.settings_file.as_ref() {
            Some(path) if path.exists() => match ViewerSettings::from_file(path) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Ignoring the settings file: {}", e);
                    ViewerSettings::default()
                }
            },
            _ => ViewerSettings::default(),
        };

        let automation = match config.batch_file.as_deref() {
            Some("default") | None => AutomationEngine::new(AutomationSpec::default_test_cases()),
            Some(path) => {
                // A broken spec would silently no-op a scripted run, so it
                // is fatal.
                let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
                    error!("Unable to load the automation spec {}: {}", path, e);
                    std::process::exit(1);
                });
                let spec = AutomationSpec::parse(&source).unwrap_or_else(|e| {
                    error!("Unable to parse the automation spec {}: {}", path, e);
                    std::process::exit(1);
                });
                AutomationEngine::new(spec)
            }
        };

        Self {
            settings,
            automation,
            automation_started: false,
            model_path: config.model.clone(),
            base_transform: Mat4::identity(),
            turntable_enabled: false,
            turntable_speed_deg: 20.0,
            pending_screenshot: None,
            notification: None,
            model_name: String::new(),
            primitive_count: 0,
        }
    }

    fn load_model(&mut self, scene: &mut Scene, path: &PathBuf, actual_size: bool) -> bool {
        match Model::load(path, actual_size) {
            Ok(model) => {
                self.model_name = model.name.clone();
                self.primitive_count = model.primitives.len();
                self.base_transform = model.root_transform;
                self.model_path = path.clone();
                self.notification = None;
                scene.model = Some(model);
                true
            }
            Err(e) => {
                error!("Could not load {}: {}", path.display(), e);
                self.notification = Some(format!("Could not load {}", path.display()));
                false
            }
        }
    }

    fn apply_settings(&self, context: &mut Context, scene: &mut Scene) {
        let settings = &self.settings;

        scene.clear_color = {
            let linear = color::srgb_to_linear3f(&settings.clear_color);
            Vec4::new(linear.x, linear.y, linear.z, 1.0)
        };
        scene.skybox_enabled = settings.skybox_enabled;
        scene.ibl_intensity = settings.ibl_intensity;
        scene.ibl_rotation_deg = settings.ibl_rotation;
        scene.sun_enabled = settings.sun_enabled;
        scene.dirt_strength = settings.dirt_strength;

        if let Some(ground) = scene.ground.as_mut() {
            ground.visible = settings.ground_plane_enabled;
            ground.shadow_strength = settings.ground_shadow_strength;
        }

        context
            .window
            .main_view_mut()
            .camera_mut()
            .set_exposure(
                settings.camera_aperture,
                settings.camera_shutter_speed,
                settings.camera_sensitivity,
            );
    }
}

impl App for ViewerApp {
    fn setup(&mut self, mut context: Context, scene: &mut Scene) {
        scene.ground = Some(Ground::new(10.0));

        let model_path = self.model_path.clone();
        let actual_size = context.config.actual_size;
        if !self.load_model(scene, &model_path, actual_size) {
            // Without a scene a scripted run would only export empty
            // frames.
            if context.config.batch_file.is_some() {
                std::process::exit(1);
            }
        }

        if context.config.batch_file.is_some() {
            self.automation.start_batch();
            self.automation_started = true;
        }

        self.apply_settings(&mut context, scene);
    }

    fn cleanup(&mut self, _context: Context, _scene: &mut Scene) {
        info!("Viewer shutting down");
    }

    fn animate(&mut self, _context: Context, scene: &mut Scene, now: f64) {
        if !self.turntable_enabled {
            return;
        }

        if let Some(model) = scene.model.as_mut() {
            let angle = (now as f32) * self.turntable_speed_deg;
            model.root_transform =
                math::rotate(&Mat4::identity(), angle, &Axes::up()) * self.base_transform;
        }
    }

    fn gui(&mut self, ui: &Ui, controls: &mut Controls) {
        controls.sidebar_width = SIDEBAR_WIDTH;

        let height = ui.io().display_size[1];
        sceneview::imgui::Window::new(im_str!("Viewer"))
            .position([0.0, 0.0], Condition::Always)
            .size([SIDEBAR_WIDTH as f32, height], Condition::Always)
            .resizable(false)
            .movable(false)
            .collapsible(false)
            .build(ui, || {
                if let Some(notification) = self.notification.as_ref() {
                    ui.text_colored([1.0, 0.4, 0.3, 1.0], notification);
                    ui.separator();
                }

                ui.text(format!(
                    "Model: {} ({} primitives)",
                    if self.model_name.is_empty() {
                        "none"
                    } else {
                        &self.model_name
                    },
                    self.primitive_count
                ));
                ui.text(format!("{:.1} fps", ui.io().framerate));
                ui.text(format!("Skipped frames: {}", controls.skipped_frames));
                ui.separator();

                self.settings.gui(ui);

                if CollapsingHeader::new(im_str!("Animation")).build(ui) {
                    ui.checkbox(im_str!("Turntable"), &mut self.turntable_enabled);
                    imgui::Slider::new(im_str!("Turntable speed"), 1.0, 180.0)
                        .build(ui, &mut self.turntable_speed_deg);
                }

                if CollapsingHeader::new(im_str!("Automation")).build(ui) {
                    let (done, total) = self.automation.progress();
                    ui.text(format!("Cases: {}/{}", done, total));

                    if self.automation.is_running() {
                        if let Some(case) = self.automation.current_case() {
                            ui.text(format!("Running: {}", case.name));
                        }
                    } else if ui.button(im_str!("Run test cases")) {
                        self.automation.start();
                        self.automation_started = true;
                    }
                }
            });
    }

    fn pre_render(&mut self, mut context: Context, scene: &mut Scene, controls: &mut Controls) {
        if self.automation_started {
            match self.automation.tick(context.timer.delta_time()) {
                TickAction::ApplySettings(settings) => {
                    self.settings = *settings;
                    if let Some(case) = self.automation.current_case() {
                        info!("Automation case: {}", case.name);
                    }
                }
                TickAction::TakeScreenshot(filename) => {
                    self.pending_screenshot = Some(filename);
                }
                TickAction::Finished => {
                    info!("Automation run finished");
                    self.notification = Some(String::from("Automation run finished"));
                    self.automation_started = false;
                }
                TickAction::None => {}
            }

            if self.automation.should_close() {
                controls.close_requested = true;
            }
        }

        controls.focal_length = self.settings.camera_focal_length;
        self.apply_settings(&mut context, scene);
    }

    fn post_render(&mut self, context: Context, _scene: &mut Scene) {
        if let Some(filename) = self.pending_screenshot.take() {
            let (width, height) = context.window.drawable_size();
            let image = capture_framebuffer(width as u32, height as u32);

            match image.save(&filename) {
                Ok(()) => info!("Exported {}", filename),
                Err(e) => error!("Could not export {}: {}", filename, e),
            }
        }
    }

    fn file_dropped(&mut self, context: Context, scene: &mut Scene, path: PathBuf) {
        let actual_size = context.config.actual_size;
        self.load_model(scene, &path, actual_size);
    }
}
