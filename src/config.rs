//! Configuration and theme management for neoterm.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.neoterm/config.toml`
//! - Built-in themes (matrix, cyan, amber)
//!
//! # Configuration File
//!
//! The configuration file is located at `~/.neoterm/config.toml`:
//!
//! ```toml
//! # Backdrop variant: rain, circuit
//! backdrop = "rain"
//!
//! # Theme: matrix, cyan, amber
//! theme = "matrix"
//!
//! # Target animation frame rate
//! fps = 30
//!
//! [rain]
//! pool = 50
//! ```
//!
//! A missing or malformed file degrades to defaults; it never aborts
//! startup.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::anim::rain::DEFAULT_POOL;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config path")]
    NoConfigPath,

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config: {0}")]
    Write(#[from] std::io::Error),
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backdrop variant name ("rain" or "circuit")
    pub backdrop: String,
    /// Theme name
    pub theme: String,
    /// Target animation frame rate
    pub fps: u32,
    /// Rain backdrop settings
    pub rain: RainConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backdrop: "rain".to_string(),
            theme: "matrix".to_string(),
            fps: 30,
            rain: RainConfig::default(),
        }
    }
}

/// Rain backdrop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    /// Number of falling streams
    pub pool: usize,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self { pool: DEFAULT_POOL }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match fs::read_to_string(&path) {
                    Ok(content) => match toml::from_str(&content) {
                        Ok(config) => return config,
                        Err(e) => warn!("ignoring malformed {}: {}", path.display(), e),
                    },
                    Err(e) => warn!("could not read {}: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigPath)?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    fn config_path() -> Option<PathBuf> {
        let dir = app_dir()?;
        Some(dir.join("config.toml"))
    }

    /// Get the theme
    pub fn get_theme(&self) -> Theme {
        Theme::by_name(&self.theme)
    }
}

/// `~/.neoterm`, created on first use.
pub fn app_dir() -> Option<PathBuf> {
    let home = home_dir()?;
    let dir = home.join(".neoterm");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    Some(dir)
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// Scale toward black by `level` in `[0, 1]`.
    pub fn scaled(self, level: f32) -> Self {
        let level = level.clamp(0.0, 1.0);
        Self {
            r: (f32::from(self.r) * level) as u8,
            g: (f32::from(self.g) * level) as u8,
            b: (f32::from(self.b) * level) as u8,
        }
    }
}

/// Theme definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    // Backdrop colors
    pub backdrop: Color,
    pub backdrop_head: Color,

    // Terminal panel colors
    pub panel_border: Color,
    pub panel_title: Color,
    pub panel_text: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::matrix()
    }
}

impl Theme {
    /// Classic green-on-black.
    pub fn matrix() -> Self {
        Self {
            name: "matrix".to_string(),

            backdrop: Color::new(0, 255, 70),
            backdrop_head: Color::new(180, 255, 180),

            panel_border: Color::new(0, 200, 70),
            panel_title: Color::new(160, 255, 160),
            panel_text: Color::new(0, 255, 70),

            status_bar_bg: Color::new(0, 40, 12),
            status_bar_fg: Color::new(0, 220, 80),
        }
    }

    /// Neon cyan.
    pub fn cyan() -> Self {
        Self {
            name: "cyan".to_string(),

            backdrop: Color::new(0, 255, 255),
            backdrop_head: Color::new(200, 255, 255),

            panel_border: Color::new(0, 190, 190),
            panel_title: Color::new(180, 255, 255),
            panel_text: Color::new(0, 255, 255),

            status_bar_bg: Color::new(0, 35, 40),
            status_bar_fg: Color::new(0, 220, 220),
        }
    }

    /// Retro amber phosphor.
    pub fn amber() -> Self {
        Self {
            name: "amber".to_string(),

            backdrop: Color::new(255, 176, 0),
            backdrop_head: Color::new(255, 230, 160),

            panel_border: Color::new(200, 140, 0),
            panel_title: Color::new(255, 220, 140),
            panel_text: Color::new(255, 176, 0),

            status_bar_bg: Color::new(45, 30, 0),
            status_bar_fg: Color::new(230, 160, 0),
        }
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "cyan" | "neon" => Self::cyan(),
            "amber" | "phosphor" => Self::amber(),
            _ => Self::matrix(),
        }
    }

    /// List available themes
    pub fn list() -> Vec<&'static str> {
        vec!["matrix", "cyan", "amber"]
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
