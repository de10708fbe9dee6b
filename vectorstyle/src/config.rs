//! Renderer configuration.
//!
//! Settings live in an INI file, by default
//! `~/.config/vectorstyle/config.ini`:
//!
//! ```ini
//! [render]
//! tile_size = 512
//! background_color = rgb(248, 244, 240)
//! overzoom = true
//! min_footprint = 16
//! stroke_offset = 0.5
//! line_width_scale = 0.5
//!
//! [text]
//! font_path = /usr/share/fonts/truetype/dejavu/DejaVuSans.ttf
//! default_size = 16
//!
//! [logging]
//! level = info
//! file = /tmp/vectorstyle.log
//! ```
//!
//! Missing sections and keys keep their defaults; unknown keys are ignored.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tiny_skia::Color;

use crate::overzoom::MIN_FOOTPRINT;
use crate::style::parse_color;

/// Default output tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default label size in pixels when `text-size` is not declared.
pub const DEFAULT_TEXT_SIZE: f32 = 16.0;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A key has a value of the wrong type or range.
    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Settings consumed by the tile renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Edge length of rendered tiles in pixels.
    pub tile_size: u32,

    /// Background painted before any layer; replaced by the style's last
    /// background layer.
    pub default_background: Color,

    /// Reproject geometry when the requested tile is deeper than the native
    /// tile. When off, native geometry is drawn as-is.
    pub overzoom: bool,

    /// Smallest overzoom footprint, in native extent units.
    pub min_footprint: u32,

    /// Translation applied to strokes (half a pixel keeps 1px lines crisp).
    pub stroke_offset: f32,

    /// Multiplier applied to `line-width`.
    pub line_width_scale: f32,

    /// Label size when `text-size` is not declared.
    pub default_text_size: f32,

    /// TrueType/OpenType font for labels. Labels are skipped without one.
    pub font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            default_background: Color::BLACK,
            overzoom: true,
            min_footprint: MIN_FOOTPRINT,
            stroke_offset: 0.5,
            line_width_scale: 0.5,
            default_text_size: DEFAULT_TEXT_SIZE,
            font_path: None,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_default_background(mut self, color: Color) -> Self {
        self.default_background = color;
        self
    }

    pub fn with_overzoom(mut self, enabled: bool) -> Self {
        self.overzoom = enabled;
        self
    }

    pub fn with_min_footprint(mut self, min_footprint: u32) -> Self {
        self.min_footprint = min_footprint;
        self
    }

    pub fn with_stroke_offset(mut self, offset: f32) -> Self {
        self.stroke_offset = offset;
        self
    }

    pub fn with_line_width_scale(mut self, scale: f32) -> Self {
        self.line_width_scale = scale;
        self
    }

    pub fn with_default_text_size(mut self, size: f32) -> Self {
        self.default_text_size = size;
        self
    }

    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,

    /// Optional log file in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// The full configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

/// Default config file location.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vectorstyle").join("config.ini"))
}

impl ConfigFile {
    /// Load from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini_str(&text)
    }

    /// Load from the default location, or defaults if there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = ConfigFile::default();

        if let Some(section) = ini.section(Some("render")) {
            let render = &mut config.render;
            if let Some(v) = section.get("tile_size") {
                render.tile_size = parse_number("render", "tile_size", v)?;
                if render.tile_size == 0 {
                    return Err(invalid("render", "tile_size", v, "must be positive"));
                }
            }
            if let Some(v) = section.get("background_color") {
                render.default_background =
                    parse_color(v).ok_or_else(|| invalid("render", "background_color", v, "not a color"))?;
            }
            if let Some(v) = section.get("overzoom") {
                render.overzoom = parse_bool("render", "overzoom", v)?;
            }
            if let Some(v) = section.get("min_footprint") {
                render.min_footprint = parse_number("render", "min_footprint", v)?;
            }
            if let Some(v) = section.get("stroke_offset") {
                render.stroke_offset = parse_number("render", "stroke_offset", v)?;
            }
            if let Some(v) = section.get("line_width_scale") {
                render.line_width_scale = parse_number("render", "line_width_scale", v)?;
            }
        }

        if let Some(section) = ini.section(Some("text")) {
            if let Some(v) = section.get("font_path") {
                if !v.trim().is_empty() {
                    config.render.font_path = Some(PathBuf::from(v.trim()));
                }
            }
            if let Some(v) = section.get("default_size") {
                config.render.default_text_size = parse_number("text", "default_size", v)?;
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(v) = section.get("level") {
                config.logging.level = v.trim().to_string();
            }
            if let Some(v) = section.get("file") {
                if !v.trim().is_empty() {
                    config.logging.file = Some(PathBuf::from(v.trim()));
                }
            }
        }

        Ok(config)
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "not a number"))
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_render_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.default_background, Color::BLACK);
        assert!(config.overzoom);
        assert_eq!(config.min_footprint, 16);
        assert_eq!(config.stroke_offset, 0.5);
        assert_eq!(config.line_width_scale, 0.5);
        assert_eq!(config.default_text_size, 16.0);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn test_render_config_builder() {
        let config = RenderConfig::new()
            .with_tile_size(512)
            .with_overzoom(false)
            .with_stroke_offset(0.0)
            .with_line_width_scale(1.0)
            .with_font_path("/fonts/a.ttf");
        assert_eq!(config.tile_size, 512);
        assert!(!config.overzoom);
        assert_eq!(config.stroke_offset, 0.0);
        assert_eq!(config.line_width_scale, 1.0);
        assert_eq!(config.font_path, Some(PathBuf::from("/fonts/a.ttf")));
    }

    #[test]
    fn test_from_ini_str() {
        let config = ConfigFile::from_ini_str(
            "[render]\n\
             tile_size = 512\n\
             background_color = white\n\
             overzoom = no\n\
             min_footprint = 32\n\
             unknown_key = 1\n\
             [text]\n\
             font_path = /fonts/DejaVuSans.ttf\n\
             default_size = 12\n\
             [logging]\n\
             level = debug\n",
        )
        .unwrap();

        assert_eq!(config.render.tile_size, 512);
        assert_eq!(config.render.default_background, Color::WHITE);
        assert!(!config.render.overzoom);
        assert_eq!(config.render.min_footprint, 32);
        assert_eq!(
            config.render.font_path,
            Some(PathBuf::from("/fonts/DejaVuSans.ttf"))
        );
        assert_eq!(config.render.default_text_size, 12.0);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(ConfigFile::from_ini_str("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_invalid_values() {
        let err = ConfigFile::from_ini_str("[render]\ntile_size = big\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "tile_size"));

        let err = ConfigFile::from_ini_str("[render]\ntile_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("must be positive"));

        let err = ConfigFile::from_ini_str("[render]\nbackground_color = nope\n").unwrap_err();
        assert!(err.to_string().contains("render.background_color"));

        let err = ConfigFile::from_ini_str("[render]\noverzoom = maybe\n").unwrap_err();
        assert!(err.to_string().contains("expected true or false"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = warn\nfile = /tmp/vs.log").unwrap();

        let config = ConfigFile::load_from(file.path()).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/vs.log")));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = ConfigFile::load_from(Path::new("/nonexistent/vectorstyle.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
