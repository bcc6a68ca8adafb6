pub mod camera;
pub mod driver;
pub mod manipulator;
pub mod math;
pub mod timer;
pub mod view;
pub mod window;

use self::math::UVec2;
use crate::timer::Timer;
use crate::viewer::asset::AssetManager;
use crate::window::Window;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Debug, Clone, Copy)]
pub enum WindowMode {
    Windowed,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Msaa {
    None,
    X4,
    X8,
    X16,
}

impl Msaa {
    pub fn samples(self) -> u16 {
        match self {
            Msaa::None => 0,
            Msaa::X4 => 4,
            Msaa::X8 => 8,
            Msaa::X16 => 16,
        }
    }
}

/// How raw input is translated into camera motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Orbit,
    Map,
    FreeFlight,
}

/// Viewport rectangle in physical pixels, origin at the bottom left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub title: String,
    pub window_size: UVec2,
    pub scale: f32,
    pub resizeable: bool,
    pub split_view: bool,
    pub headless: bool,
    pub vsync: bool,
    pub msaa: Msaa,
    pub window_mode: WindowMode,
    pub graphics_api_version: Version,
    pub camera_mode: CameraMode,

    pub asset_dir: PathBuf,
    pub ibl_dir: Option<PathBuf>,
    pub model: PathBuf,
    pub font: PathBuf,
    pub dirt: Option<PathBuf>,
    pub settings_file: Option<PathBuf>,
    /// Automation spec to run in batch mode. `"default"` selects the
    /// built-in test cases; anything else is read as a RON spec file.
    pub batch_file: Option<String>,
    /// Skip the fit-into-unit-cube transform after loading a model.
    pub actual_size: bool,
}

impl Default for Config {
    fn default() -> Self {
        let asset_dir = PathBuf::from("assets");

        Self {
            title: String::from("Scene Viewer"),
            window_size: UVec2::new(1280, 768),
            scale: 1.0,
            resizeable: true,
            split_view: false,
            headless: false,
            vsync: true,
            msaa: Msaa::X4,
            window_mode: WindowMode::Windowed,
            graphics_api_version: Version {
                major: 4,
                minor: 5,
                patch: 0,
            },
            camera_mode: CameraMode::Orbit,
            ibl_dir: Some(asset_dir.join("ibl/noon_grass")),
            model: asset_dir.join("models/jet.glb"),
            font: asset_dir.join("fonts/Roboto-Medium.ttf"),
            dirt: None,
            settings_file: Some(PathBuf::from("viewer.ron")),
            batch_file: None,
            actual_size: false,
            asset_dir,
        }
    }
}

pub struct Context<'a> {
    pub window: &'a mut Window,
    pub asset_manager: &'a mut AssetManager,
    pub timer: &'a mut Timer,
    pub config: &'a mut Config,
}

impl<'a> Context<'a> {
    pub fn new(
        window: &'a mut Window,
        asset_manager: &'a mut AssetManager,
        timer: &'a mut Timer,
        config: &'a mut Config,
    ) -> Self {
        Self {
            window,
            asset_manager,
            timer,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_contains_is_half_open() {
        let rect = Rectangle::new(10, 10, 20, 20);

        assert!(rect.contains(10, 10));
        assert!(rect.contains(29, 29));
        assert!(!rect.contains(30, 10));
        assert!(!rect.contains(10, 30));
        assert!(!rect.contains(9, 15));
    }
}
