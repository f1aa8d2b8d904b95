//! CLI definition using clap

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vlf_types::{Environment, OutputFormat};

#[derive(Parser)]
#[command(name = "vlf-report")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "VLF cable test report generator (Word templates, site maps, test photos)")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Templates directory override
    #[arg(long, global = true)]
    pub templates_dir: Option<PathBuf>,

    /// Reference images directory override
    #[arg(long, global = true)]
    pub images_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a report document from a JSON payload
    Generate {
        /// Payload JSON file ("-" reads stdin)
        payload: PathBuf,

        /// Site environment (urbano, rural). Uses config value if not specified.
        #[arg(long, short = 'e')]
        environment: Option<Environment>,

        /// Segment photo as SLOT=PATH (e.g. imgPruebaTramoTrm1A=foto.jpg); repeatable
        #[arg(long = "image", short = 'i', value_parser = parse_slot_path)]
        images: Vec<(String, PathBuf)>,

        /// Directory of photos named after their slot (imgPruebaTramoTrm1A.png)
        #[arg(long)]
        uploads_dir: Option<PathBuf>,

        /// Output file or directory
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Keep text fields as typed (overrides config)
        #[arg(long)]
        no_uppercase: bool,

        /// Report date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List the photo slots a payload expects
    Slots {
        /// Payload JSON file ("-" reads stdin)
        payload: PathBuf,
    },

    /// List available report templates
    Templates,

    /// Render only the site map as PNG
    Map {
        /// Latitude (decimal degrees, "," or "." as separator)
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        /// Longitude (decimal degrees, "," or "." as separator)
        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        /// Site environment (urbano, rural). Uses config value if not specified.
        #[arg(long, short = 'e')]
        environment: Option<Environment>,

        /// Output PNG path
        #[arg(long, short = 'o', default_value = "mapa.png")]
        output: PathBuf,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set templates directory
        #[arg(long)]
        set_templates_dir: Option<PathBuf>,

        /// Set reference images directory
        #[arg(long)]
        set_images_dir: Option<PathBuf>,

        /// Enable/disable upper-casing of text fields
        #[arg(long)]
        set_uppercase: Option<bool>,

        /// Set default environment
        #[arg(long)]
        set_environment: Option<Environment>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Payload field used to name the document ("" clears it)
        #[arg(long)]
        set_file_name_field: Option<String>,

        /// Set default log level (trace, debug, info, warn, error)
        #[arg(long)]
        set_log_level: Option<String>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// `SLOT=PATH`
pub fn parse_slot_path(s: &str) -> Result<(String, PathBuf), String> {
    let (slot, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=PATH, got `{}`", s))?;
    let slot = slot.trim();
    if slot.is_empty() || path.is_empty() {
        return Err(format!("expected SLOT=PATH, got `{}`", s));
    }
    Ok((slot.to_string(), PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot_path() {
        assert_eq!(
            parse_slot_path("imgPruebaTramoTrm1A=fotos/a=b.jpg").unwrap(),
            ("imgPruebaTramoTrm1A".to_string(), PathBuf::from("fotos/a=b.jpg"))
        );
        assert!(parse_slot_path("sin-separador").is_err());
        assert!(parse_slot_path("=x.png").is_err());
        assert!(parse_slot_path("k=").is_err());
    }

    #[test]
    fn test_generate_args() {
        let cli = Cli::try_parse_from([
            "vlf-report",
            "generate",
            "payload.json",
            "-e",
            "rural",
            "-i",
            "imgPruebaTramoTrm1=a.png",
            "--date",
            "2024-10-05",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                environment,
                images,
                date,
                ..
            } => {
                assert_eq!(environment, Some(Environment::Rural));
                assert_eq!(images.len(), 1);
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 10, 5));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_map_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "vlf-report", "map", "--lat", "-12,05", "--lon", "-77.04",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Map { ref lat, .. } if lat == "-12,05"));
    }
}
