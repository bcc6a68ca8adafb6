use crate::core::{Config, Context};
use crate::imgui::{ImGui, Ui};
use crate::rendering::renderer::{Scene, SceneRenderer};
use crate::timer::{FramePacer, Timer};
use crate::viewer::asset::AssetManager;
use crate::viewer::ibl::Ibl;
use crate::window::Window;
use glutin::{
    event::{
        ElementState, Event, KeyboardInput, MouseButton, MouseScrollDelta, VirtualKeyCode,
        WindowEvent,
    },
    event_loop::{ControlFlow, EventLoop},
};
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

/// Per-frame knobs shared between the application and the driver loop.
///
/// The application's UI writes these; the driver reconfigures the window
/// cameras when the sidebar width or focal length changed since the last
/// frame.
pub struct Controls {
    pub title: String,
    pub sidebar_width: i32,
    pub focal_length: f32,
    pub close_requested: bool,
    pub skipped_frames: usize,
}

impl Controls {
    fn new(config: &Config) -> Self {
        Self {
            title: config.title.clone(),
            sidebar_width: 0,
            focal_length: 28.0,
            close_requested: false,
            skipped_frames: 0,
        }
    }
}

/// Application hooks invoked by the driver, in frame order: `animate`,
/// `gui`, `pre_render`, `post_render`. All hooks default to no-ops.
pub trait App {
    fn setup(&mut self, _context: Context, _scene: &mut Scene) {}
    fn cleanup(&mut self, _context: Context, _scene: &mut Scene) {}
    fn animate(&mut self, _context: Context, _scene: &mut Scene, _now: f64) {}
    fn gui(&mut self, _ui: &Ui, _controls: &mut Controls) {}
    fn pre_render(&mut self, _context: Context, _scene: &mut Scene, _controls: &mut Controls) {}
    fn post_render(&mut self, _context: Context, _scene: &mut Scene) {}
    fn resized(&mut self, _context: Context) {}
    fn file_dropped(&mut self, _context: Context, _scene: &mut Scene, _path: PathBuf) {}
}

pub struct Driver;

impl Driver {
    /// Creates the window and runs the application until it closes. Fatal
    /// startup failures log and exit; the process does not outlive the
    /// event loop.
    pub fn run<A, C>(mut config: Config, app_constructor: C) -> !
    where
        A: App + 'static,
        C: FnOnce(Context, &mut Scene) -> A,
    {
        let event_loop = EventLoop::new();

        let mut window = Window::new(&event_loop, &config).unwrap_or_else(|e| {
            error!("Failed to create the window: {}", e);
            std::process::exit(1);
        });

        let mut renderer = SceneRenderer::new().unwrap_or_else(|e| {
            error!("Failed to build the scene renderer: {}", e);
            std::process::exit(1);
        });

        let mut scene = Scene::default();
        let mut asset_manager = AssetManager::new();
        let mut timer = Timer::new();
        let mut pacer = FramePacer::new(window.refresh_rate());
        let mut controls = Controls::new(&config);

        Self::load_ibl(&config, &mut scene);
        Self::load_dirt(&config, &mut scene, &mut asset_manager);

        // Batch runs drive frames themselves and never show the overlay.
        let mut imgui = if config.headless {
            None
        } else {
            Some(ImGui::new(window.window(), &config.font, config.scale, |s| {
                window.get_proc_address(s)
            }))
        };

        let mut app = app_constructor(
            Context::new(&mut window, &mut asset_manager, &mut timer, &mut config),
            &mut scene,
        );
        app.setup(
            Context::new(&mut window, &mut asset_manager, &mut timer, &mut config),
            &mut scene,
        );

        let mut applied_title = config.title.clone();
        let mut applied_sidebar = controls.sidebar_width;
        let mut applied_focal = controls.focal_length;
        let mut cursor = (0, 0);

        event_loop.run(move |event, _, control_flow| {
            *control_flow = ControlFlow::Poll;

            if let Some(imgui) = imgui.as_mut() {
                imgui.handle_event(window.window(), &event);
            }

            match event {
                Event::WindowEvent { event, .. } => {
                    let (capture_mouse, capture_keyboard) = imgui
                        .as_ref()
                        .map(|imgui| imgui.wants_capture())
                        .unwrap_or((false, false));

                    match event {
                        WindowEvent::CloseRequested => controls.close_requested = true,
                        WindowEvent::Resized(size) => {
                            window.resize(
                                size.width,
                                size.height,
                                applied_sidebar,
                                applied_focal,
                            );
                            app.resized(Context::new(
                                &mut window,
                                &mut asset_manager,
                                &mut timer,
                                &mut config,
                            ));
                        }
                        WindowEvent::DroppedFile(path) => {
                            app.file_dropped(
                                Context::new(
                                    &mut window,
                                    &mut asset_manager,
                                    &mut timer,
                                    &mut config,
                                ),
                                &mut scene,
                                path,
                            );
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            cursor = (position.x as i32, position.y as i32);
                            if !capture_mouse {
                                window.mouse_moved(cursor.0, cursor.1);
                            }
                        }
                        WindowEvent::MouseInput { state, button, .. } if !capture_mouse => {
                            let strafe = button == MouseButton::Right;
                            match state {
                                ElementState::Pressed => {
                                    window.mouse_down(strafe, cursor.0, cursor.1)
                                }
                                ElementState::Released => window.mouse_up(cursor.0, cursor.1),
                            }
                        }
                        WindowEvent::MouseWheel { delta, .. } if !capture_mouse => {
                            let lines = match delta {
                                MouseScrollDelta::LineDelta(_, y) => y,
                                MouseScrollDelta::PixelDelta(position) => {
                                    position.y as f32 / 50.0
                                }
                            };
                            window.mouse_wheel(lines);
                        }
                        WindowEvent::KeyboardInput {
                            input:
                                KeyboardInput {
                                    state,
                                    virtual_keycode: Some(keycode),
                                    ..
                                },
                            ..
                        } => {
                            if keycode == VirtualKeyCode::Escape {
                                controls.close_requested = true;
                            }
                            if !capture_keyboard {
                                match state {
                                    ElementState::Pressed => window.key_down(keycode),
                                    ElementState::Released => window.key_up(keycode),
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::MainEventsCleared => {
                    let frame_start = Instant::now();

                    if controls.title != applied_title {
                        window.window().set_title(&controls.title);
                        applied_title = controls.title.clone();
                    }

                    if controls.sidebar_width != applied_sidebar
                        || (controls.focal_length - applied_focal).abs() > f32::EPSILON
                    {
                        window.configure_cameras(controls.sidebar_width, controls.focal_length);
                        applied_sidebar = controls.sidebar_width;
                        applied_focal = controls.focal_length;
                    }

                    timer.tick();
                    let dt = timer.delta_time();
                    let now = timer.elapsed_time() as f64;

                    app.animate(
                        Context::new(&mut window, &mut asset_manager, &mut timer, &mut config),
                        &mut scene,
                        now,
                    );

                    window.tick_views(dt);
                    renderer.update_debug_cubes(&window, &mut scene);

                    app.pre_render(
                        Context::new(&mut window, &mut asset_manager, &mut timer, &mut config),
                        &mut scene,
                        &mut controls,
                    );

                    renderer.render(&window, &scene);

                    if let Some(imgui) = imgui.as_mut() {
                        imgui.render_frame(window.window(), dt, |ui| {
                            app.gui(ui, &mut controls);
                        });
                    }

                    app.post_render(
                        Context::new(&mut window, &mut asset_manager, &mut timer, &mut config),
                        &mut scene,
                    );

                    window.swap_buffers();

                    // Pace to the display refresh interval; overruns are
                    // only counted.
                    let sleep = pacer.register_frame(frame_start.elapsed());
                    if !sleep.is_zero() {
                        std::thread::sleep(sleep);
                    }
                    controls.skipped_frames = pacer.skipped_frames();

                    if controls.close_requested {
                        *control_flow = ControlFlow::Exit;
                    }
                }
                Event::LoopDestroyed => {
                    info!(
                        "Shutting down after skipping {} frames",
                        pacer.skipped_frames()
                    );
                    app.cleanup(
                        Context::new(&mut window, &mut asset_manager, &mut timer, &mut config),
                        &mut scene,
                    );
                }
                _ => {}
            }
        })
    }

    fn load_ibl(config: &Config, scene: &mut Scene) {
        if let Some(dir) = config.ibl_dir.as_ref() {
            match Ibl::load_from_directory(dir) {
                Ok(ibl) => scene.ibl = Some(ibl),
                Err(e) => error!("Could not load the IBL {}: {}", dir.display(), e),
            }
        }
    }

    fn load_dirt(config: &Config, scene: &mut Scene, asset_manager: &mut AssetManager) {
        if let Some(path) = config.dirt.as_ref() {
            match asset_manager.load_texture_2d(path, false, false) {
                Ok(texture) => scene.dirt = Some(texture),
                Err(e) => error!("Could not load the dirt texture {}: {}", path.display(), e),
            }
        }
    }
}
