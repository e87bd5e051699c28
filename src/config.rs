use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// RGBA color as stored in config files.
pub type Rgba = [u8; 4];

/// Top-level configuration. Every field has a default, so a config file only
/// needs the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub surface: SurfaceConfig,
    pub overlay: OverlayConfig,
}

/// Drawing surface dimensions in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Overlay geometry and colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// How far the midline is extended beyond its end points, in keypoint units.
    pub midline_extension: f32,
    pub line_width: f32,
    pub point_radius: f32,
    /// Vertical position of the proportions band as a fraction of surface height.
    pub band_center_y: f32,
    pub tooth_height: f32,
    pub text_size: f32,
    pub midline_color: Rgba,
    pub point_color: Rgba,
    pub central_color: Rgba,
    pub lateral_color: Rgba,
    pub canine_color: Rgba,
    pub band_outline_color: Rgba,
    pub info_background: Rgba,
    pub info_text_color: Rgba,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            midline_extension: 50.0,
            line_width: 2.0,
            point_radius: 2.0,
            band_center_y: 0.7,
            tooth_height: 40.0,
            text_size: 10.0,
            midline_color: [255, 0, 0, 178],
            point_color: [0, 255, 0, 255],
            central_color: [255, 255, 255, 128],
            lateral_color: [173, 216, 230, 128],
            canine_color: [255, 228, 181, 128],
            band_outline_color: [255, 255, 0, 255],
            info_background: [0, 0, 0, 178],
            info_text_color: [255, 255, 255, 255],
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_host_surface() {
        let config = Config::default();
        assert_eq!(config.surface.width, 640);
        assert_eq!(config.surface.height, 480);
        assert_eq!(config.overlay.midline_extension, 50.0);
        assert_eq!(config.overlay.band_center_y, 0.7);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [surface]
            width = 1280

            [overlay]
            point_radius = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(config.surface.width, 1280);
        assert_eq!(config.surface.height, 480);
        assert_eq!(config.overlay.point_radius, 4.0);
        assert_eq!(config.overlay.midline_extension, 50.0);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml("[surface]\nwidth = \"wide\"").is_err());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dental-face.toml");

        let mut config = Config::default();
        config.overlay.tooth_height = 32.0;
        config.overlay.midline_color = [0, 0, 255, 200];
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
