use crate::core::math::Vec3;
use crate::imgui::{im_str, CollapsingHeader, Gui, Ui};
use crate::viewer::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Runtime viewer options, loadable from a RON file next to the assets
/// and patched by the automation engine in batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub camera_focal_length: f32,
    pub camera_aperture: f32,
    pub camera_shutter_speed: f32,
    pub camera_sensitivity: f32,

    pub ground_plane_enabled: bool,
    pub ground_shadow_strength: f32,

    pub skybox_enabled: bool,
    pub ibl_intensity: f32,
    pub ibl_rotation: f32,

    pub sun_enabled: bool,
    pub dirt_strength: f32,
    pub clear_color: Vec3,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            camera_focal_length: 28.0,
            camera_aperture: 16.0,
            camera_shutter_speed: 1.0 / 125.0,
            camera_sensitivity: 100.0,
            ground_plane_enabled: true,
            ground_shadow_strength: 0.75,
            skybox_enabled: true,
            ibl_intensity: 30_000.0,
            ibl_rotation: 0.0,
            sun_enabled: true,
            dirt_strength: 0.0,
            clear_color: Vec3::new(0.02, 0.02, 0.02),
        }
    }
}

impl ViewerSettings {
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        ron::de::from_str(&text).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Gui for ViewerSettings {
    fn gui(&mut self, ui: &Ui) {
        if CollapsingHeader::new(im_str!("Camera"))
            .default_open(true)
            .build(ui)
        {
            imgui::Slider::new(im_str!("Focal length (mm)"), 16.0, 90.0)
                .build(ui, &mut self.camera_focal_length);

            imgui::Slider::new(im_str!("Aperture (f-stop)"), 1.0, 32.0)
                .build(ui, &mut self.camera_aperture);

            imgui::Slider::new(im_str!("Shutter speed (s)"), 1.0 / 8000.0, 1.0 / 15.0)
                .display_format(im_str!("%.5f"))
                .build(ui, &mut self.camera_shutter_speed);

            imgui::Slider::new(im_str!("Sensitivity (ISO)"), 25.0, 6400.0)
                .build(ui, &mut self.camera_sensitivity);
        }

        if CollapsingHeader::new(im_str!("Lighting"))
            .default_open(true)
            .build(ui)
        {
            ui.checkbox(im_str!("Skybox"), &mut self.skybox_enabled);
            ui.checkbox(im_str!("Sunlight"), &mut self.sun_enabled);

            imgui::Drag::new(im_str!("IBL intensity (lux)"))
                .range(0.0, 100_000.0)
                .speed(100.0)
                .build(ui, &mut self.ibl_intensity);

            imgui::Slider::new(im_str!("IBL rotation"), 0.0, 360.0)
                .build(ui, &mut self.ibl_rotation);
        }

        if CollapsingHeader::new(im_str!("Scene")).build(ui) {
            ui.checkbox(im_str!("Ground plane"), &mut self.ground_plane_enabled);
            imgui::Slider::new(im_str!("Ground shadow strength"), 0.0, 1.0)
                .build(ui, &mut self.ground_shadow_strength);

            imgui::Slider::new(im_str!("Dirt overlay"), 0.0, 1.0)
                .build(ui, &mut self.dirt_strength);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_files_fill_in_defaults() {
        let parsed: ViewerSettings = ron::de::from_str(
            "(camera_focal_length: 50.0, skybox_enabled: false)",
        )
        .unwrap();

        assert_eq!(parsed.camera_focal_length, 50.0);
        assert!(!parsed.skybox_enabled);
        // Everything else keeps its default.
        assert_eq!(parsed.camera_aperture, 16.0);
        assert_eq!(parsed.ground_shadow_strength, 0.75);
    }

    #[test]
    fn settings_survive_a_ron_round_trip() {
        let mut settings = ViewerSettings::default();
        settings.ibl_rotation = 90.0;
        settings.clear_color = Vec3::new(0.1, 0.2, 0.3);

        let text = ron::ser::to_string(&settings).unwrap();
        let parsed: ViewerSettings = ron::de::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
