use sceneview;

pub mod viewer_app;

use log::error;
use std::path::PathBuf;
use sceneview::core::driver::Driver;
use sceneview::core::{CameraMode, Config};
use sceneview::viewer::asset::resolve_path;
use viewer_app::ViewerApp;

fn parse_args(config: &mut Config) {
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--split-view" => config.split_view = true,
            "--actual-size" => config.actual_size = true,
            "--batch" => {
                config.batch_file = Some(args.next().unwrap_or_else(|| String::from("default")));
                config.headless = true;
            }
            "--ibl" => match args.next() {
                Some(dir) => config.ibl_dir = Some(PathBuf::from(dir)),
                None => {
                    error!("--ibl expects a directory");
                    std::process::exit(1);
                }
            },
            "--dirt" => config.dirt = args.next().map(PathBuf::from),
            "--camera" => match args.next().as_deref() {
                Some("orbit") => config.camera_mode = CameraMode::Orbit,
                Some("map") => config.camera_mode = CameraMode::Map,
                Some("flight") => config.camera_mode = CameraMode::FreeFlight,
                other => {
                    error!("unknown camera mode {:?}", other);
                    std::process::exit(1);
                }
            },
            path if !path.starts_with('-') => config.model = PathBuf::from(path),
            other => {
                error!("unknown argument {}", other);
                std::process::exit(1);
            }
        }
    }
}

fn main() {
    env_logger::init();

    let mut config = Config::default();
    parse_args(&mut config);

    // Configured paths are relative to the assets shipped next to the
    // executable unless given as absolute.
    config.model = resolve_path(&config.model);
    config.font = resolve_path(&config.font);
    config.ibl_dir = config.ibl_dir.as_deref().map(resolve_path);
    config.dirt = config.dirt.as_deref().map(resolve_path);

    Driver::run(config, |context, _scene| ViewerApp::new(context.config))
}
