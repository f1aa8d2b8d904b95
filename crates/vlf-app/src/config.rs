//! Configuration management for vlf-report
//!
//! Config stored at: ~/.config/vlf-report/config.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use vlf_infra::map::{MapSettings, RuralSettings, UrbanSettings};
use vlf_infra::tiles::{DEFAULT_USER_AGENT, ESRI_WORLD_IMAGERY_URL, OSM_TILE_URL};
use vlf_types::{ConfigError, Environment, OutputFormat, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding templateVLF*.docx files
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Directory holding the voltage table images
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Upper-case every text field before rendering
    #[serde(default = "default_true")]
    pub uppercase_fields: bool,

    #[serde(default)]
    pub default_environment: Environment,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Generic name of the generated document
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,

    /// Payload key whose value names the document (optional)
    #[serde(default)]
    pub file_name_field: Option<String>,

    /// Log level used when neither --verbose nor RUST_LOG is given
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub map: MapConfig,
}

/// Tile servers and map geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_street_tile_url")]
    pub street_tile_url: String,

    #[serde(default = "default_satellite_tile_url")]
    pub satellite_tile_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP timeout per tile request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_zoom")]
    pub urban_zoom: u8,

    #[serde(default = "default_urban_width")]
    pub urban_width: u32,

    #[serde(default = "default_urban_height")]
    pub urban_height: u32,

    /// Marker radius in pixels
    #[serde(default = "default_urban_marker_radius")]
    pub urban_marker_radius: f64,

    #[serde(default = "default_zoom")]
    pub rural_zoom: u8,

    /// Half side of the rural bounding box, in metres
    #[serde(default = "default_rural_radius_m")]
    pub rural_radius_m: f64,

    #[serde(default = "default_rural_width_in")]
    pub rural_width_in: f64,

    #[serde(default = "default_rural_height_in")]
    pub rural_height_in: f64,

    #[serde(default = "default_rural_dpi")]
    pub rural_dpi: u32,
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_output_file_name() -> String {
    "reporte_vlf.docx".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_street_tile_url() -> String {
    OSM_TILE_URL.to_string()
}

fn default_satellite_tile_url() -> String {
    ESRI_WORLD_IMAGERY_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_zoom() -> u8 {
    17
}

fn default_urban_width() -> u32 {
    600
}

fn default_urban_height() -> u32 {
    400
}

fn default_urban_marker_radius() -> f64 {
    6.0
}

fn default_rural_radius_m() -> f64 {
    300.0
}

fn default_rural_width_in() -> f64 {
    9.0
}

fn default_rural_height_in() -> f64 {
    7.0
}

fn default_rural_dpi() -> u32 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            images_dir: default_images_dir(),
            uppercase_fields: true,
            default_environment: Environment::default(),
            output_format: OutputFormat::default(),
            output_file_name: default_output_file_name(),
            file_name_field: None,
            log_level: default_log_level(),
            map: MapConfig::default(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            street_tile_url: default_street_tile_url(),
            satellite_tile_url: default_satellite_tile_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            urban_zoom: default_zoom(),
            urban_width: default_urban_width(),
            urban_height: default_urban_height(),
            urban_marker_radius: default_urban_marker_radius(),
            rural_zoom: default_zoom(),
            rural_radius_m: default_rural_radius_m(),
            rural_width_in: default_rural_width_in(),
            rural_height_in: default_rural_height_in(),
            rural_dpi: default_rural_dpi(),
        }
    }
}

impl MapConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settings(&self) -> MapSettings {
        MapSettings {
            urban: UrbanSettings {
                zoom: self.urban_zoom,
                width: self.urban_width,
                height: self.urban_height,
                marker_radius: self.urban_marker_radius,
            },
            rural: RuralSettings {
                zoom: self.rural_zoom,
                radius_m: self.rural_radius_m,
                width_in: self.rural_width_in,
                height_in: self.rural_height_in,
                dpi: self.rural_dpi,
                ..RuralSettings::default()
            },
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("vlf-report");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_json(&content)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "VLF Report Configuration")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(f, "Templates dir:   {}", self.templates_dir.display())?;
        writeln!(f, "Images dir:      {}", self.images_dir.display())?;
        writeln!(f, "Uppercase:       {}", self.uppercase_fields)?;
        writeln!(f, "Environment:     {}", self.default_environment)?;
        writeln!(f, "Output format:   {}", self.output_format)?;
        writeln!(f, "Output file:     {}", self.output_file_name)?;
        writeln!(
            f,
            "File name field: {}",
            self.file_name_field.as_deref().unwrap_or("(none)")
        )?;
        writeln!(f, "Log level:       {}", self.log_level)?;
        writeln!(f)?;
        writeln!(f, "Street tiles:    {}", self.map.street_tile_url)?;
        writeln!(f, "Satellite tiles: {}", self.map.satellite_tile_url)?;
        writeln!(f, "Tile timeout:    {} s", self.map.timeout_secs)?;
        writeln!(
            f,
            "Urban map:       zoom {}, {}x{} px",
            self.map.urban_zoom, self.map.urban_width, self.map.urban_height
        )?;
        writeln!(
            f,
            "Rural map:       zoom {}, +/-{} m, {}x{} in @ {} dpi",
            self.map.rural_zoom,
            self.map.rural_radius_m,
            self.map.rural_width_in,
            self.map.rural_height_in,
            self.map.rural_dpi
        )?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}
