//! uic-convert: convert an uploaded image to the configured target format.
//!
//! Plays the host's part around the conversion core: resolves settings,
//! applies the global enable switch, derives the declared MIME type and
//! reports what should be stored for the upload.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uic_image::{
    convert, mime_from_extension, Capabilities, ConversionReport, ConversionRequest,
    ConverterSettings, TargetFormat,
};

mod logging;
mod output;

use output::{availability, format_size, Status};

/// Exit codes for CLI commands
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    pub const CONFIG_ERROR: u8 = 3;
}

#[derive(Parser)]
#[command(name = "uic-convert")]
#[command(about = "Convert uploaded images to a single target format")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one uploaded file
    Convert {
        /// Path to the uploaded file
        path: PathBuf,
        /// Declared MIME type (derived from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,
        /// Settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the target format (webp, jpeg, png, gif)
        #[arg(short, long)]
        target: Option<TargetFormat>,
        /// Override the quality (1-100)
        #[arg(short, long)]
        quality: Option<u32>,
        /// Keep the original after converting
        #[arg(long)]
        keep_original: bool,
        /// Stored URL of the upload, rewritten to match the result
        #[arg(long)]
        url: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which formats this build can decode and encode
    Capabilities {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved settings
    Config {
        /// Settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }

    let code = match cli.command {
        Commands::Convert {
            path,
            mime,
            config,
            target,
            quality,
            keep_original,
            url,
            json,
        } => {
            let overrides = Overrides {
                target,
                quality,
                keep_original,
            };
            run_convert(&path, mime, config.as_deref(), overrides, url.as_deref(), json)
        }
        Commands::Capabilities { json } => run_capabilities(json),
        Commands::Config { config, json } => run_config(config.as_deref(), json),
    };

    match code {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            Status::error(&e.to_string());
            ExitCode::from(exit_codes::FAILURE)
        }
    }
}

/// Command-line values that win over the settings file.
struct Overrides {
    target: Option<TargetFormat>,
    quality: Option<u32>,
    keep_original: bool,
}

impl Overrides {
    fn apply(&self, settings: &mut ConverterSettings) {
        if let Some(target) = self.target {
            settings.target_format = target;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if self.keep_original {
            settings.delete_original = false;
        }
    }
}

fn run_convert(
    path: &Path,
    mime: Option<String>,
    config_path: Option<&Path>,
    overrides: Overrides,
    url: Option<&str>,
    json: bool,
) -> anyhow::Result<u8> {
    let mut settings = match ConverterSettings::load(config_path) {
        Ok((settings, _)) => settings,
        Err(e) => {
            Status::error(&e.to_string());
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    overrides.apply(&mut settings);

    let mime = mime
        .or_else(|| mime_from_extension(path).map(String::from))
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let request = ConversionRequest::new(path, mime);

    if !settings.enabled {
        tracing::debug!("Converter disabled, upload passed through");
        print_disabled(&request, url, json)?;
        return Ok(exit_codes::SUCCESS);
    }

    let config = match settings.to_config() {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let report = convert(&request, &config);
    let code = if report.failure.is_some() {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report_json(&request, &report, url))?);
    } else {
        print_report(&request, &report, url);
    }

    Ok(code)
}

fn report_json(
    request: &ConversionRequest,
    report: &ConversionReport,
    url: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "source_path": request.source_path,
        "source_mime_type": request.source_mime_type,
        "output_path": report.result.output_path,
        "output_mime_type": report.result.output_mime_type,
        "converted": report.result.converted,
        "url": url.map(|u| report.result.rewrite_url(u, &request.source_path)),
        "skipped": report.skipped,
        "error": report.failure.as_ref().map(|e| serde_json::json!({
            "kind": e.kind(),
            "message": e.to_string(),
        })),
        "delete_warning": report.delete_warning.as_ref().map(ToString::to_string),
    })
}

fn print_report(request: &ConversionRequest, report: &ConversionReport, url: Option<&str>) {
    let result = &report.result;

    if result.converted {
        let size = std::fs::metadata(&result.output_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        Status::success(&format!(
            "{} -> {} ({}, {})",
            request.source_path.display(),
            result.output_path.display(),
            result.output_mime_type,
            size
        ));
    } else if let Some(reason) = report.skipped {
        Status::info(&format!(
            "{} left unchanged ({:?})",
            request.source_path.display(),
            reason
        ));
    } else if let Some(failure) = &report.failure {
        Status::warning(&format!(
            "{} left unchanged: {}",
            request.source_path.display(),
            failure
        ));
    }

    if let Some(warning) = &report.delete_warning {
        Status::warning(&warning.to_string());
    }

    if let Some(url) = url {
        println!("URL: {}", result.rewrite_url(url, &request.source_path));
    }
}

fn print_disabled(
    request: &ConversionRequest,
    url: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "source_path": request.source_path,
            "source_mime_type": request.source_mime_type,
            "output_path": request.source_path,
            "output_mime_type": request.source_mime_type,
            "converted": false,
            "url": url,
            "skipped": "disabled",
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        Status::info("Converter is disabled; upload left unchanged");
    }
    Ok(())
}

fn run_capabilities(json: bool) -> anyhow::Result<u8> {
    let caps = Capabilities::detect();

    if json {
        println!("{}", serde_json::to_string_pretty(&caps)?);
        return Ok(exit_codes::SUCCESS);
    }

    Status::header("Decoders");
    for format in &caps.decoders {
        println!("  {:<6} {}", format!("{:?}", format).to_lowercase(), availability(true));
    }

    Status::header("Encoders");
    for format in TargetFormat::ALL {
        println!("  {:<6} {}", format, availability(caps.supports(format)));
    }

    Ok(exit_codes::SUCCESS)
}

fn run_config(config_path: Option<&Path>, json: bool) -> anyhow::Result<u8> {
    let (settings, found) = match ConverterSettings::load(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            Status::error(&e.to_string());
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    if let Err(e) = settings.to_config() {
        Status::error(&e.to_string());
        return Ok(exit_codes::CONFIG_ERROR);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(exit_codes::SUCCESS);
    }

    match found {
        Some(path) => Status::info(&format!("Settings from {}", path.display())),
        None => Status::info("No settings file found, using defaults"),
    }
    println!("enabled:          {}", settings.enabled);
    println!("target_format:    {}", settings.target_format);
    println!("quality:          {}", settings.quality);
    println!("delete_original:  {}", settings.delete_original);
    println!("source_formats:   {}", settings.source_formats.join(", "));

    Ok(exit_codes::SUCCESS)
}
