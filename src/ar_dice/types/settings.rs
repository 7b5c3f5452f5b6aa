//! Application settings types and persistence
//!
//! Settings live in a single JSON file. Every section falls back to its
//! defaults, so a partial file only overrides what it names.

use bevy::log::{info, warn};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SETTINGS_FILE: &str = "ardicee_settings.json";

/// Simple serializable RGBA color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSetting {
    #[serde(default)]
    pub a: f32,
    #[serde(default)]
    pub r: f32,
    #[serde(default)]
    pub g: f32,
    #[serde(default)]
    pub b: f32,
}

impl Default for ColorSetting {
    fn default() -> Self {
        Self {
            a: 1.0,
            r: 1.0,
            g: 1.0,
            b: 1.0,
        }
    }
}

impl ColorSetting {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { a, r, g, b }
    }

    pub fn to_color(&self) -> Color {
        Color::srgba(self.r, self.g, self.b, self.a)
    }

    /// Channels quantized to 8-bit sRGB, in RGBA order.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Roll animation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollSettings {
    /// Multiplier applied to the drawn quarter turns to make the spin visible
    pub spin_multiplier: f32,
    /// Wall-clock length of one roll animation
    pub duration_seconds: f32,
}

impl Default for RollSettings {
    fn default() -> Self {
        Self {
            spin_multiplier: 10.0,
            duration_seconds: 0.5,
        }
    }
}

/// How dice are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DieSettings {
    /// glTF scene to render dice with (e.g. "models/die.glb#Scene0"); a cube when unset
    pub scene: Option<String>,
    /// Base color texture for the built-in cube
    pub texture: Option<String>,
    /// Bounding sphere radius in meters; dice are lifted by this much above the plane
    pub bounding_radius: f32,
    pub color: ColorSetting,
}

impl Default for DieSettings {
    fn default() -> Self {
        Self {
            scene: None,
            texture: None,
            bounding_radius: 0.05,
            color: ColorSetting::rgba(0.85, 0.1, 0.1, 1.0),
        }
    }
}

/// Appearance of the indicator drawn on each detected plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneIndicatorSettings {
    /// Image to draw on planes; a generated grid when unset
    pub texture: Option<String>,
    /// Number of grid cells along each side of the texture
    pub grid_cells: u32,
    pub line_color: ColorSetting,
    pub fill_color: ColorSetting,
}

impl Default for PlaneIndicatorSettings {
    fn default() -> Self {
        Self {
            texture: None,
            grid_cells: 8,
            line_color: ColorSetting::rgba(1.0, 1.0, 1.0, 0.9),
            fill_color: ColorSetting::rgba(0.2, 0.6, 1.0, 0.25),
        }
    }
}

/// Pointer-wiggle shake gesture thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeSettings {
    /// Minimum horizontal pointer speed (pixels per second) that counts as a stroke
    pub min_speed: f32,
    /// Direction reversals needed within the window
    pub reversals: u32,
    pub window_seconds: f32,
}

impl Default for ShakeSettings {
    fn default() -> Self {
        Self {
            min_speed: 1500.0,
            reversals: 4,
            window_seconds: 0.8,
        }
    }
}

/// A tabletop the simulated session can discover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSetting {
    /// World-space center of the surface
    pub center: [f32; 3],
    /// Width (x) and depth (z)
    pub extent: [f32; 2],
}

/// Desktop stand-in for a device camera and a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub world_tracking_supported: bool,
    /// Seconds between two plane discoveries
    pub discovery_interval_seconds: f32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub surfaces: Vec<SurfaceSetting>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            world_tracking_supported: true,
            discovery_interval_seconds: 1.5,
            camera_position: [0.0, 1.5, 1.0],
            camera_target: [0.0, 0.0, -1.5],
            surfaces: vec![
                SurfaceSetting {
                    center: [0.0, 0.0, -1.5],
                    extent: [2.0, 1.5],
                },
                SurfaceSetting {
                    center: [1.2, 0.45, -2.2],
                    extent: [0.8, 0.6],
                },
                SurfaceSetting {
                    center: [-1.1, 0.75, -2.0],
                    extent: [0.6, 0.6],
                },
            ],
        }
    }
}

/// Parameters of the top-down view used by the scripted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptViewSettings {
    pub view_width: f32,
    pub view_height: f32,
    pub pixels_per_meter: f32,
}

impl Default for ScriptViewSettings {
    fn default() -> Self {
        Self {
            view_width: 800.0,
            view_height: 600.0,
            pixels_per_meter: 100.0,
        }
    }
}

/// Top-level application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, Resource)]
#[serde(default)]
pub struct AppSettings {
    pub roll: RollSettings,
    pub die: DieSettings,
    pub plane_indicator: PlaneIndicatorSettings,
    pub shake: ShakeSettings,
    pub simulation: SimulationSettings,
    pub script_view: ScriptViewSettings,
}

impl AppSettings {
    /// Load settings from a JSON file, falling back to defaults.
    pub fn load_from_file(path: &Path) -> Self {
        if !path.exists() {
            info!(
                "Settings file '{}' not found, using defaults",
                path.display()
            );
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => {
                    info!("Loaded settings from '{}'", path.display());
                    settings
                }
                Err(e) => {
                    warn!("{}; using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read settings file '{}': {}; using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| format!("Invalid settings JSON: {}", e))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize settings: {}", e))
    }

    /// Save settings as pretty-printed JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|e| format!("Failed to write settings file '{}': {}", path.display(), e))
    }
}
