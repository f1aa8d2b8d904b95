//! Command handlers

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use vlf_app::app::{plan_slots, ReportOptions, ReportRequest, ReportService};
use vlf_app::config::Config;
use vlf_app::output_file::write_atomic;
use vlf_app::repository::{open_map_renderer, open_reference_images, open_template_repo};
use vlf_app::uploads::collect_uploads;
use vlf_domain::model::Coordinates;
use vlf_domain::repository::TemplateRepository;
use vlf_domain::service::NormalizeOptions;
use vlf_types::{Environment, Error, OutputFormat, Result};

use crate::cli::{Cli, Commands};
use crate::logging::init_logging;
use crate::output::{output_report, output_slots, output_templates};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if skips_saved_config(&cli.command) {
        init_logging(&Config::default().log_level, cli.verbose);
        return reset_config();
    }

    let mut config = Config::load()?;
    init_logging(&config.log_level, cli.verbose);

    // Override from CLI args
    if let Some(ref dir) = cli.templates_dir {
        config.templates_dir = dir.clone();
    }
    if let Some(ref dir) = cli.images_dir {
        config.images_dir = dir.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Generate {
            payload,
            environment,
            images,
            uploads_dir,
            output,
            no_uppercase,
            date,
        } => {
            if no_uppercase {
                config.uppercase_fields = false;
            }
            let args = GenerateArgs {
                payload,
                environment: environment.unwrap_or(config.default_environment),
                images,
                uploads_dir,
                output,
                date: date.unwrap_or_else(|| Local::now().date_naive()),
            };
            cmd_generate(&config, args, output_format)
        }

        Commands::Slots { payload } => cmd_slots(&payload, output_format),

        Commands::Templates => cmd_templates(&config, output_format),

        Commands::Map {
            lat,
            lon,
            environment,
            output,
        } => cmd_map(
            &config,
            &lat,
            &lon,
            environment.unwrap_or(config.default_environment),
            &output,
        ),

        Commands::Config {
            show,
            set_templates_dir,
            set_images_dir,
            set_uppercase,
            set_environment,
            set_output,
            set_file_name_field,
            set_log_level,
            reset: _,
        } => cmd_config(ConfigUpdate {
            show,
            templates_dir: set_templates_dir,
            images_dir: set_images_dir,
            uppercase: set_uppercase,
            environment: set_environment,
            output_format: set_output,
            file_name_field: set_file_name_field,
            log_level: set_log_level,
        }),
    }
}

/// Commands that must run even when the saved config no longer parses
fn skips_saved_config(command: &Commands) -> bool {
    matches!(command, Commands::Config { reset: true, .. })
}

struct GenerateArgs {
    payload: PathBuf,
    environment: Environment,
    images: Vec<(String, PathBuf)>,
    uploads_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    date: NaiveDate,
}

/// Payload file contents, or stdin for "-"
fn read_payload(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Explicit file, file inside an explicit directory, or the default name here
fn resolve_output_path(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn cmd_generate(config: &Config, args: GenerateArgs, output_format: OutputFormat) -> Result<()> {
    let payload_json = read_payload(&args.payload)?;
    let uploads = collect_uploads(&args.images, args.uploads_dir.as_deref())?;

    let templates = open_template_repo(config)?;
    let images = open_reference_images(config);
    let map = open_map_renderer(config)?;

    let options = ReportOptions {
        normalize: NormalizeOptions {
            uppercase: config.uppercase_fields,
        },
        output_file_name: config.output_file_name.clone(),
        file_name_field: config.file_name_field.clone(),
    };
    let service = ReportService::new(&templates, &images, &map, options);

    let pb = spinner(&format!("Generating report ({})...", args.environment));
    let result = service.generate(ReportRequest {
        payload_json,
        uploads,
        environment: args.environment,
        today: args.date,
    });
    pb.finish_and_clear();
    let report = result?;

    let path = resolve_output_path(args.output.as_deref(), &report.file_name);
    let path = write_atomic(&path, &report.bytes)?;

    output_report(output_format, &report, &path.display().to_string())
}

fn cmd_slots(payload: &Path, output_format: OutputFormat) -> Result<()> {
    let plan = plan_slots(&read_payload(payload)?)?;
    output_slots(output_format, &plan)
}

fn cmd_templates(config: &Config, output_format: OutputFormat) -> Result<()> {
    let repo = open_template_repo(config)?;
    output_templates(output_format, &repo.available())
}

fn cmd_map(
    config: &Config,
    lat: &str,
    lon: &str,
    environment: Environment,
    output: &Path,
) -> Result<()> {
    let coords = Coordinates::parse(lat, lon)?;
    let renderer = open_map_renderer(config)?;

    let pb = spinner(&format!("Rendering {} map...", environment));
    let result = renderer.render(&coords, environment);
    pb.finish_and_clear();
    let png = result?;

    let path = write_atomic(output, &png)?;
    println!("Map saved to: {}", path.display());
    Ok(())
}

struct ConfigUpdate {
    show: bool,
    templates_dir: Option<PathBuf>,
    images_dir: Option<PathBuf>,
    uppercase: Option<bool>,
    environment: Option<Environment>,
    output_format: Option<OutputFormat>,
    file_name_field: Option<String>,
    log_level: Option<String>,
}

fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    println!("\n{}", config);
    Ok(())
}

fn cmd_config(update: ConfigUpdate) -> Result<()> {
    let mut config = Config::load()?;
    let modified = apply_config_update(&mut config, &update);

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if update.show || !modified {
        println!("{}", config);
    }

    Ok(())
}

fn apply_config_update(config: &mut Config, update: &ConfigUpdate) -> bool {
    let mut modified = false;

    if let Some(ref dir) = update.templates_dir {
        config.templates_dir = dir.clone();
        modified = true;
    }

    if let Some(ref dir) = update.images_dir {
        config.images_dir = dir.clone();
        modified = true;
    }

    if let Some(uppercase) = update.uppercase {
        config.uppercase_fields = uppercase;
        modified = true;
    }

    if let Some(environment) = update.environment {
        config.default_environment = environment;
        modified = true;
    }

    if let Some(output_format) = update.output_format {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(ref field) = update.file_name_field {
        config.file_name_field = if field.trim().is_empty() {
            None
        } else {
            Some(field.trim().to_string())
        };
        modified = true;
    }

    if let Some(ref level) = update.log_level {
        config.log_level = level.clone();
        modified = true;
    }

    modified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_update() -> ConfigUpdate {
        ConfigUpdate {
            show: false,
            templates_dir: None,
            images_dir: None,
            uppercase: None,
            environment: None,
            output_format: None,
            file_name_field: None,
            log_level: None,
        }
    }

    #[test]
    fn test_resolve_output_path() {
        let dir = std::env::temp_dir();
        assert_eq!(
            resolve_output_path(Some(&dir), "reporte_vlf.docx"),
            dir.join("reporte_vlf.docx")
        );
        assert_eq!(
            resolve_output_path(Some(Path::new("salida/informe.docx")), "reporte_vlf.docx"),
            PathBuf::from("salida/informe.docx")
        );
        assert_eq!(
            resolve_output_path(None, "reporte_vlf.docx"),
            PathBuf::from("reporte_vlf.docx")
        );
    }

    #[test]
    fn test_apply_config_update() {
        let mut config = Config::default();
        assert!(!apply_config_update(&mut config, &empty_update()));

        let update = ConfigUpdate {
            uppercase: Some(false),
            environment: Some(Environment::Rural),
            file_name_field: Some("codigoProyecto".to_string()),
            ..empty_update()
        };
        assert!(apply_config_update(&mut config, &update));
        assert!(!config.uppercase_fields);
        assert_eq!(config.default_environment, Environment::Rural);
        assert_eq!(config.file_name_field.as_deref(), Some("codigoProyecto"));

        let clear = ConfigUpdate {
            file_name_field: Some(String::new()),
            ..empty_update()
        };
        apply_config_update(&mut config, &clear);
        assert_eq!(config.file_name_field, None);
    }

    #[test]
    fn test_reset_skips_saved_config() {
        use clap::Parser;

        let reset = Cli::try_parse_from(["vlf-report", "config", "--reset"]).unwrap();
        assert!(skips_saved_config(&reset.command));

        let show = Cli::try_parse_from(["vlf-report", "config", "--show"]).unwrap();
        assert!(!skips_saved_config(&show.command));
        let templates = Cli::try_parse_from(["vlf-report", "templates"]).unwrap();
        assert!(!skips_saved_config(&templates.command));
    }

    #[test]
    fn test_read_payload_missing_file() {
        assert!(matches!(
            read_payload(Path::new("/nonexistent/payload.json")),
            Err(Error::FileNotFound(_))
        ));
    }
}
