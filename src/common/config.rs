use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

const APP_DIR: &str = "placer";

/// Per-user data directory. Falls back to the home directory, then the
/// working directory, when the platform reports none.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
pub fn settings_file() -> PathBuf { data_dir().join("user_settings.json") }
pub fn default_plan_file() -> PathBuf { data_dir().join("default.json") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Half thickness of the snap bands, in pixels. Zero disables snapping.
    #[serde(default = "default_snap_pixels")]
    pub snap_pixels: i32,
    /// Whether the window being placed is itself a snap target.
    #[serde(default)]
    pub snap_include_self: bool,
    /// Distance the cursor sits inside the overlay corner it is dragging.
    #[serde(default = "default_shift_cursor")]
    pub shift_cursor: i32,
    #[serde(default = "default_min_width")]
    pub min_width: i32,
    #[serde(default = "default_min_height")]
    pub min_height: i32,
    /// How often queued mouse events are drained, in milliseconds.
    #[serde(default = "default_mouse_check_interval_ms")]
    pub mouse_check_interval_ms: u64,
    /// Overlay opacity, 0.0 to 1.0.
    #[serde(default = "default_root_alpha")]
    pub root_alpha: f64,
    /// Box blur radius applied to the backdrop screenshot.
    #[serde(default = "default_screenshot_blur_pixels")]
    pub screenshot_blur_pixels: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snap_pixels: default_snap_pixels(),
            snap_include_self: false,
            shift_cursor: default_shift_cursor(),
            min_width: default_min_width(),
            min_height: default_min_height(),
            mouse_check_interval_ms: default_mouse_check_interval_ms(),
            root_alpha: default_root_alpha(),
            screenshot_blur_pixels: default_screenshot_blur_pixels(),
        }
    }
}

fn default_snap_pixels() -> i32 { 10 }

fn default_shift_cursor() -> i32 { 5 }

fn default_min_width() -> i32 { 100 }

fn default_min_height() -> i32 { 60 }

fn default_mouse_check_interval_ms() -> u64 { 10 }

fn default_root_alpha() -> f64 { 0.85 }

fn default_screenshot_blur_pixels() -> u32 { 4 }

/// Returns `candidate` if it has the same JSON shape as `default`.
///
/// Integers must stay integers, arrays must have the same length and matching
/// element types. Anything else yields `None` so the old value stands.
pub fn get_value_if_valid_type(default: &Value, candidate: &Value) -> Option<Value> {
    let valid = match (default, candidate) {
        (Value::Bool(_), Value::Bool(_)) | (Value::String(_), Value::String(_)) => true,
        (Value::Number(d), Value::Number(c)) => d.is_f64() || !c.is_f64(),
        (Value::Array(d), Value::Array(c)) => {
            d.len() == c.len()
                && d.iter().zip(c).all(|(d, c)| get_value_if_valid_type(d, c).is_some())
        }
        _ => false,
    };
    valid.then(|| candidate.clone())
}

impl Settings {
    /// Reads `path`, starting from defaults. Missing or unreadable files are
    /// not an error.
    pub fn load(path: &Path) -> Settings {
        let buf = match std::fs::read_to_string(path) {
            Ok(buf) => buf,
            Err(e) => {
                debug!(path = %path.display(), "no user settings: {e}");
                return Settings::default();
            }
        };
        let mut settings = match Self::parse(&buf) {
            Ok(settings) => settings,
            Err(e) => {
                debug!(path = %path.display(), "ignoring unparsable user settings: {e}");
                Settings::default()
            }
        };
        let fixes = settings.auto_fix_values();
        if fixes > 0 {
            warn!("reset {fixes} out of range setting(s) to defaults");
        }
        settings
    }

    /// Applies each stored key on top of the defaults, skipping values with
    /// the wrong type and keys this version does not know.
    pub fn parse(buf: &str) -> anyhow::Result<Settings> {
        let stored: Map<String, Value> = serde_json::from_str(buf)?;
        let Value::Object(mut merged) = serde_json::to_value(Settings::default())? else {
            anyhow::bail!("settings did not serialize to an object");
        };

        for (key, value) in stored {
            let Some(default) = merged.get(&key) else {
                debug!(key = %key, "ignoring unknown setting");
                continue;
            };
            let Some(value) = get_value_if_valid_type(default, &value) else {
                debug!(key = %key, ?value, "ignoring setting with the wrong type");
                continue;
            };
            let previous = merged.insert(key.clone(), value);
            if serde_json::from_value::<Settings>(Value::Object(merged.clone())).is_err() {
                debug!(key = %key, "ignoring setting out of range for its type");
                if let Some(previous) = previous {
                    merged.insert(key, previous);
                }
            }
        }

        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Keys whose value differs from the default; this is what gets written.
    pub fn changed_values(&self) -> Map<String, Value> {
        let (Ok(Value::Object(current)), Ok(Value::Object(defaults))) =
            (serde_json::to_value(self), serde_json::to_value(Settings::default()))
        else {
            return Map::new();
        };
        current.into_iter().filter(|(k, v)| defaults.get(k) != Some(v)).collect()
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let buf = serde_json::to_string_pretty(&self.changed_values())?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, buf.as_bytes())?;
        Ok(())
    }

    pub fn mouse_check_interval(&self) -> Duration {
        Duration::from_millis(self.mouse_check_interval_ms)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.snap_pixels < 0 {
            issues.push(format!("snap_pixels must be non-negative, got {}", self.snap_pixels));
        }
        if self.shift_cursor < 0 {
            issues.push(format!("shift_cursor must be non-negative, got {}", self.shift_cursor));
        }
        if self.min_width <= 0 {
            issues.push(format!("min_width must be positive, got {}", self.min_width));
        }
        if self.min_height <= 0 {
            issues.push(format!("min_height must be positive, got {}", self.min_height));
        }
        if self.mouse_check_interval_ms == 0 {
            issues.push("mouse_check_interval_ms must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.root_alpha) {
            issues.push(format!("root_alpha must be within 0..1, got {}", self.root_alpha));
        }

        issues
    }

    /// Resets out of range values to their defaults. Returns the number of
    /// fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.snap_pixels < 0 {
            self.snap_pixels = default_snap_pixels();
            fixes += 1;
        }
        if self.shift_cursor < 0 {
            self.shift_cursor = default_shift_cursor();
            fixes += 1;
        }
        if self.min_width <= 0 {
            self.min_width = default_min_width();
            fixes += 1;
        }
        if self.min_height <= 0 {
            self.min_height = default_min_height();
            fixes += 1;
        }
        if self.mouse_check_interval_ms == 0 {
            self.mouse_check_interval_ms = default_mouse_check_interval_ms();
            fixes += 1;
        }
        if !(0.0..=1.0).contains(&self.root_alpha) {
            self.root_alpha = default_root_alpha();
            fixes += 1;
        }

        fixes
    }
}
