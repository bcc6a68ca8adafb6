use crate::core::math::Vec3;
use crate::viewer::settings::ViewerSettings;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One expanded automation case: the settings to apply and how long to
/// let them render before moving on.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub settings: ViewerSettings,
    pub sleep_duration: f32,
}

/// A batch test spec. The RON source is either a single literal case or a
/// generator: a base settings patch plus per-field value lists whose
/// cartesian product becomes the case list.
#[derive(Debug, Clone)]
pub struct AutomationSpec {
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct SpecSource {
    name: String,
    #[serde(default = "default_sleep_duration")]
    sleep_duration: f32,
    #[serde(default)]
    base: BTreeMap<String, ron::Value>,
    #[serde(default)]
    permute: BTreeMap<String, Vec<ron::Value>>,
}

fn default_sleep_duration() -> f32 {
    0.5
}

impl AutomationSpec {
    pub fn parse(source: &str) -> Result<Self, String> {
        let source: SpecSource = ron::de::from_str(source).map_err(|e| e.to_string())?;

        let mut base_settings = ViewerSettings::default();
        for (field, value) in &source.base {
            apply_field(&mut base_settings, field, value)?;
        }

        if source.permute.is_empty() {
            return Ok(Self {
                cases: vec![TestCase {
                    name: source.name,
                    settings: base_settings,
                    sleep_duration: source.sleep_duration,
                }],
            });
        }

        // Cartesian product over the permuted fields, in field order so a
        // spec always expands to the same case sequence.
        let fields: Vec<(&String, &Vec<ron::Value>)> = source.permute.iter().collect();
        for (field, values) in &fields {
            if values.is_empty() {
                return Err(format!("permuted field '{}' has no values", field));
            }
        }

        let total: usize = fields.iter().map(|(_, values)| values.len()).product();
        let mut cases = Vec::with_capacity(total);

        for index in 0..total {
            let mut settings = base_settings.clone();
            let mut remainder = index;

            for (field, values) in &fields {
                let value = &values[remainder % values.len()];
                remainder /= values.len();
                apply_field(&mut settings, field, value)?;
            }

            cases.push(TestCase {
                name: format!("{}_{:03}", source.name, index),
                settings,
                sleep_duration: source.sleep_duration,
            });
        }

        Ok(Self { cases })
    }

    /// The built-in cases used when the batch file is `"default"`.
    pub fn default_test_cases() -> Self {
        Self::parse(
            r#"(
                name: "default",
                sleep_duration: 0.5,
                permute: {
                    "ibl_rotation": [0.0, 90.0, 180.0, 270.0],
                    "skybox_enabled": [true, false],
                },
            )"#,
        )
        .expect("the built-in automation spec must parse")
    }
}

fn apply_field(
    settings: &mut ViewerSettings,
    field: &str,
    value: &ron::Value,
) -> Result<(), String> {
    fn as_f32(field: &str, value: &ron::Value) -> Result<f32, String> {
        value
            .clone()
            .into_rust::<f32>()
            .map_err(|e| format!("field '{}': {}", field, e))
    }

    fn as_bool(field: &str, value: &ron::Value) -> Result<bool, String> {
        value
            .clone()
            .into_rust::<bool>()
            .map_err(|e| format!("field '{}': {}", field, e))
    }

    match field {
        "camera_focal_length" => settings.camera_focal_length = as_f32(field, value)?,
        "camera_aperture" => settings.camera_aperture = as_f32(field, value)?,
        "camera_shutter_speed" => settings.camera_shutter_speed = as_f32(field, value)?,
        "camera_sensitivity" => settings.camera_sensitivity = as_f32(field, value)?,
        "ground_shadow_strength" => settings.ground_shadow_strength = as_f32(field, value)?,
        "ibl_intensity" => settings.ibl_intensity = as_f32(field, value)?,
        "ibl_rotation" => settings.ibl_rotation = as_f32(field, value)?,
        "dirt_strength" => settings.dirt_strength = as_f32(field, value)?,
        "ground_plane_enabled" => settings.ground_plane_enabled = as_bool(field, value)?,
        "skybox_enabled" => settings.skybox_enabled = as_bool(field, value)?,
        "sun_enabled" => settings.sun_enabled = as_bool(field, value)?,
        "clear_color" => {
            let components = value
                .clone()
                .into_rust::<[f32; 3]>()
                .map_err(|e| format!("field '{}': {}", field, e))?;
            settings.clear_color = Vec3::new(components[0], components[1], components[2]);
        }
        unknown => return Err(format!("unknown settings field '{}'", unknown)),
    }

    Ok(())
}

/// What the application should do after an engine tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickAction {
    None,
    /// A new case started; apply its settings this frame.
    ApplySettings(Box<ViewerSettings>),
    /// The case rendered long enough; export a screenshot to this file.
    TakeScreenshot(String),
    /// The final case finished.
    Finished,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Running {
        case: usize,
        elapsed: f32,
        applied: bool,
        screenshot_requested: bool,
    },
    Done,
}

/// Steps through the spec's cases: apply, wait out the sleep, export,
/// advance. A single tick never both applies a case and requests its
/// screenshot.
pub struct AutomationEngine {
    spec: AutomationSpec,
    state: State,
    batch_mode: bool,
    export_screenshots: bool,
    sleep_override: Option<f32>,
}

impl AutomationEngine {
    pub fn new(spec: AutomationSpec) -> Self {
        Self {
            spec,
            state: State::Idle,
            batch_mode: false,
            export_screenshots: false,
            sleep_override: None,
        }
    }

    /// Starts an unattended run: screenshots on, no per-case dwell time.
    pub fn start_batch(&mut self) {
        self.batch_mode = true;
        self.export_screenshots = true;
        self.sleep_override = Some(0.0);
        self.start();
    }

    pub fn start(&mut self) {
        if !self.spec.cases.is_empty() {
            self.state = State::Running {
                case: 0,
                elapsed: 0.0,
                applied: false,
                screenshot_requested: false,
            };
        } else {
            self.state = State::Done;
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// In batch mode the process should exit once the run is over.
    pub fn should_close(&self) -> bool {
        self.batch_mode && matches!(self.state, State::Done)
    }

    pub fn progress(&self) -> (usize, usize) {
        let total = self.spec.cases.len();
        match self.state {
            State::Idle => (0, total),
            State::Running { case, .. } => (case, total),
            State::Done => (total, total),
        }
    }

    pub fn current_case(&self) -> Option<&TestCase> {
        match self.state {
            State::Running { case, .. } => self.spec.cases.get(case),
            _ => None,
        }
    }

    pub fn tick(&mut self, dt: f32) -> TickAction {
        let (case, mut elapsed, applied, screenshot_requested) = match self.state {
            State::Running {
                case,
                elapsed,
                applied,
                screenshot_requested,
            } => (case, elapsed, applied, screenshot_requested),
            _ => return TickAction::None,
        };

        let current = &self.spec.cases[case];

        if !applied {
            self.state = State::Running {
                case,
                elapsed: 0.0,
                applied: true,
                screenshot_requested: false,
            };
            return TickAction::ApplySettings(Box::new(current.settings.clone()));
        }

        elapsed += dt;
        let sleep = self.sleep_override.unwrap_or(current.sleep_duration);

        if elapsed < sleep {
            self.state = State::Running {
                case,
                elapsed,
                applied,
                screenshot_requested,
            };
            return TickAction::None;
        }

        if self.export_screenshots && !screenshot_requested {
            self.state = State::Running {
                case,
                elapsed,
                applied,
                screenshot_requested: true,
            };
            return TickAction::TakeScreenshot(format!("{}.png", current.name));
        }

        if case + 1 < self.spec.cases.len() {
            self.state = State::Running {
                case: case + 1,
                elapsed: 0.0,
                applied: false,
                screenshot_requested: false,
            };
            TickAction::None
        } else {
            self.state = State::Done;
            TickAction::Finished
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_spec_expands_to_one_case() {
        let spec = AutomationSpec::parse(
            r#"(
                name: "smoke",
                sleep_duration: 1.0,
                base: { "ibl_intensity": 1000.0, "skybox_enabled": false },
            )"#,
        )
        .unwrap();

        assert_eq!(spec.cases.len(), 1);
        let case = &spec.cases[0];
        assert_eq!(case.name, "smoke");
        assert_eq!(case.sleep_duration, 1.0);
        assert_eq!(case.settings.ibl_intensity, 1000.0);
        assert!(!case.settings.skybox_enabled);
    }

    #[test]
    fn permutations_expand_to_the_cartesian_product() {
        let spec = AutomationSpec::parse(
            r#"(
                name: "sweep",
                base: { "camera_focal_length": 50.0 },
                permute: {
                    "ibl_rotation": [0.0, 90.0, 180.0],
                    "skybox_enabled": [true, false],
                },
            )"#,
        )
        .unwrap();

        assert_eq!(spec.cases.len(), 6);
        // The base patch applies to every case.
        assert!(spec
            .cases
            .iter()
            .all(|case| case.settings.camera_focal_length == 50.0));
        // Field order is stable, so the first case takes the first values.
        assert_eq!(spec.cases[0].name, "sweep_000");
        assert_eq!(spec.cases[0].settings.ibl_rotation, 0.0);
        assert!(spec.cases[0].settings.skybox_enabled);
        // Every combination appears exactly once.
        let mut combos: Vec<(u32, bool)> = spec
            .cases
            .iter()
            .map(|case| {
                (
                    case.settings.ibl_rotation as u32,
                    case.settings.skybox_enabled,
                )
            })
            .collect();
        combos.sort();
        combos.dedup();
        assert_eq!(combos.len(), 6);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = AutomationSpec::parse(
            r#"(name: "bad", base: { "bloom_strength": 1.0 })"#,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("bloom_strength"));
    }

    #[test]
    fn the_builtin_spec_parses() {
        let spec = AutomationSpec::default_test_cases();
        assert_eq!(spec.cases.len(), 8);
    }

    #[test]
    fn engine_applies_then_screenshots_then_advances() {
        let spec = AutomationSpec::parse(
            r#"(
                name: "run",
                sleep_duration: 0.2,
                permute: { "skybox_enabled": [true, false] },
            )"#,
        )
        .unwrap();

        let mut engine = AutomationEngine::new(spec);
        engine.start_batch();
        // Batch mode overrides the dwell time to zero.
        assert!(engine.is_running());
        assert!(!engine.should_close());

        let mut actions = Vec::new();
        for _ in 0..16 {
            let action = engine.tick(0.1);
            if action != TickAction::None {
                actions.push(action);
            }
            if engine.should_close() {
                break;
            }
        }

        assert_eq!(actions.len(), 5);
        assert!(matches!(actions[0], TickAction::ApplySettings(_)));
        assert_eq!(
            actions[1],
            TickAction::TakeScreenshot(String::from("run_000.png"))
        );
        assert!(matches!(actions[2], TickAction::ApplySettings(_)));
        assert_eq!(
            actions[3],
            TickAction::TakeScreenshot(String::from("run_001.png"))
        );
        assert_eq!(actions[4], TickAction::Finished);
        assert!(engine.should_close());
    }

    #[test]
    fn interactive_runs_respect_the_case_dwell_time() {
        let spec = AutomationSpec::parse(r#"(name: "one", sleep_duration: 0.5)"#).unwrap();

        let mut engine = AutomationEngine::new(spec);
        engine.start();

        assert!(matches!(engine.tick(0.1), TickAction::ApplySettings(_)));
        // Still dwelling on the case.
        assert_eq!(engine.tick(0.2), TickAction::None);
        assert_eq!(engine.tick(0.2), TickAction::None);
        // No screenshots outside batch mode; the case just finishes.
        assert_eq!(engine.tick(0.2), TickAction::Finished);
        assert!(!engine.should_close());
    }
}
