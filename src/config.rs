use crate::batch::{DEFAULT_MAX_VERTICES, MAX_VERTICES};
use crate::geometry::{Color, Rectangle};
use crate::shader::ShaderConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Overlay".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default = "default_shader_path")]
    pub shader_path: PathBuf,
    #[serde(default)]
    pub shader: ShaderConfig,
    #[serde(default = "default_max_vertices")]
    pub max_vertices: usize,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub debug_device: bool,
    #[serde(default = "default_log_retention")]
    pub log_retention_count: usize,
    #[serde(default = "default_rectangles")]
    pub rectangles: Vec<Rectangle>,
}

fn default_shader_path() -> PathBuf {
    PathBuf::from("shaders").join("overlay.hlsl")
}

fn default_max_vertices() -> usize {
    DEFAULT_MAX_VERTICES
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_log_retention() -> usize {
    10
}

fn default_rectangles() -> Vec<Rectangle> {
    vec![Rectangle::new(400.0, 300.0, 200.0, 100.0, Color::rgba(1.0, 0.0, 0.0, 0.25))]
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            shader_path: default_shader_path(),
            shader: ShaderConfig::default(),
            max_vertices: default_max_vertices(),
            frame_interval_ms: default_frame_interval_ms(),
            debug_device: false,
            log_retention_count: default_log_retention(),
            rectangles: default_rectangles(),
        }
    }
}

impl OverlayConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            anyhow::bail!(
                "Window dimensions must be positive (got {}x{})",
                self.window.width,
                self.window.height
            );
        }
        if self.max_vertices == 0 || self.max_vertices > MAX_VERTICES {
            anyhow::bail!(
                "max_vertices must be between 1 and {} (got {})",
                MAX_VERTICES,
                self.max_vertices
            );
        }
        if self.frame_interval_ms == 0 {
            anyhow::bail!("frame_interval_ms must be positive");
        }
        for (i, rect) in self.rectangles.iter().enumerate() {
            let finite = [rect.x, rect.y, rect.width, rect.height]
                .iter()
                .all(|v| v.is_finite());
            if !finite || rect.width <= 0.0 || rect.height <= 0.0 {
                anyhow::bail!(
                    "Rectangle {} needs a finite position and a positive size (got {}x{} at {},{})",
                    i,
                    rect.width,
                    rect.height,
                    rect.x,
                    rect.y
                );
            }
        }
        Ok(())
    }
}

pub struct Config {
    config_path: PathBuf,
    pub app_data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self> {
        let app_data = std::env::var("APPDATA")
            .context("Failed to get APPDATA environment variable")?;

        Self::with_dir(PathBuf::from(app_data).join("RectOverlay"))
    }

    pub fn with_dir(app_data_dir: PathBuf) -> Result<Self> {
        let config_path = app_data_dir.join("config.json");
        let log_dir = app_data_dir.join("logs");

        fs::create_dir_all(&app_data_dir)
            .context("Failed to create app data directory")?;
        fs::create_dir_all(&log_dir)
            .context("Failed to create logs directory")?;

        Ok(Self {
            config_path,
            app_data_dir,
            log_dir,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<OverlayConfig> {
        Self::load_from(&self.config_path)
    }

    pub fn load_from(path: &Path) -> Result<OverlayConfig> {
        if !path.exists() {
            return Ok(OverlayConfig::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: OverlayConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Like `load_from`, but a missing file is an error rather than defaults.
    pub fn load_required(path: &Path) -> Result<OverlayConfig> {
        if !path.is_file() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
        Self::load_from(path)
    }

    pub fn save(&self, config: &OverlayConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize config")?;

        fs::write(&self.config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_dir(dir.path().join("app")).unwrap();
        assert!(config.log_dir.is_dir());

        let loaded = config.load().unwrap();
        assert_eq!(loaded, OverlayConfig::default());
        assert_eq!(loaded.window.width, 800);
        assert_eq!(loaded.max_vertices, 1024);
        assert_eq!(loaded.frame_interval(), Duration::from_millis(16));
        assert_eq!(loaded.rectangles.len(), 1);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_dir(dir.path().to_path_buf()).unwrap();

        let mut settings = OverlayConfig::default();
        settings.window.title = "HUD".to_string();
        settings.rectangles.push(Rectangle::new(10.0, 10.0, 4.0, 4.0, Color::rgba(0.0, 0.0, 1.0, 1.0)));
        config.save(&settings).unwrap();

        assert_eq!(config.load().unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_dir(dir.path().to_path_buf()).unwrap();
        fs::write(config.config_path(), r#"{ "window": { "width": 1280 }, "max_vertices": 60 }"#).unwrap();

        let loaded = config.load().unwrap();
        assert_eq!(loaded.window.width, 1280);
        assert_eq!(loaded.window.height, 600);
        assert_eq!(loaded.window.title, "Overlay");
        assert_eq!(loaded.max_vertices, 60);
        assert_eq!(loaded.shader, ShaderConfig::default());
    }

    #[test]
    fn degenerate_rectangles_fail_validation() {
        let color = Color::rgba(1.0, 0.0, 0.0, 0.25);
        let bad = [
            Rectangle::new(400.0, 300.0, -200.0, 100.0, color),
            Rectangle::new(400.0, 300.0, 200.0, -100.0, color),
            Rectangle::new(400.0, 300.0, 0.0, 100.0, color),
            Rectangle::new(f32::NAN, 300.0, 200.0, 100.0, color),
            Rectangle::new(400.0, f32::INFINITY, 200.0, 100.0, color),
            Rectangle::new(400.0, 300.0, f32::NAN, 100.0, color),
        ];

        for rect in bad {
            let settings = OverlayConfig {
                rectangles: vec![rect],
                ..OverlayConfig::default()
            };
            assert!(settings.validate().is_err(), "{:?} passed validation", rect);
        }
    }

    #[test]
    fn negative_rectangle_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_dir(dir.path().to_path_buf()).unwrap();
        fs::write(
            config.config_path(),
            r#"{ "rectangles": [ { "x": 400, "y": 300, "width": -200, "height": 100,
                 "color": { "r": 1, "g": 0, "b": 0, "a": 1 } } ] }"#,
        )
        .unwrap();
        assert!(config.load().is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let typo = dir.path().join("overlay.jsn");

        let err = Config::load_required(&typo).unwrap_err();
        assert!(err.to_string().contains("overlay.jsn"));

        let real = dir.path().join("overlay.json");
        fs::write(&real, r#"{ "frame_interval_ms": 33 }"#).unwrap();
        assert_eq!(Config::load_required(&real).unwrap().frame_interval_ms, 33);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_dir(dir.path().to_path_buf()).unwrap();
        fs::write(config.config_path(), "{ not json").unwrap();
        assert!(config.load().is_err());
    }

    #[test]
    fn zero_sizes_fail_validation() {
        let mut settings = OverlayConfig::default();
        settings.window.height = 0;
        assert!(settings.validate().is_err());

        let mut settings = OverlayConfig::default();
        settings.max_vertices = 0;
        assert!(settings.validate().is_err());

        let mut settings = OverlayConfig::default();
        settings.frame_interval_ms = 0;
        assert!(settings.validate().is_err());

        let mut settings = OverlayConfig::default();
        settings.max_vertices = usize::MAX;
        assert!(settings.validate().is_err());

        let mut settings = OverlayConfig::default();
        settings.max_vertices = MAX_VERTICES;
        assert!(settings.validate().is_ok());

        assert!(OverlayConfig::default().validate().is_ok());
    }
}
