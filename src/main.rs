//! pastel-probe - report what the standard streams are attached to
//!
//! Runs the same startup checks a console tool would: cygwin/msys pty
//! detection on stdin/stdout/stderr, ANSI enabling on stdout, and the
//! resulting color decision.
//!
//! # Quick Start
//!
//! ```text
//! pastel-probe                 # Human readable report
//! pastel-probe --toml          # Report as TOML
//! pastel-probe --color never   # Force plain output
//! ```

use std::env;
use std::path::PathBuf;

use crossterm::style::Stylize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pastel_term::config::Config as PastelConfig;
use pastel_term::{AnsiStatus, ColorMode, Console, Probe, Report, StreamConsole};

/// Command line options
#[derive(Debug, Default)]
struct Args {
    /// Color mode from the command line, overrides the config file
    color: Option<ColorMode>,
    /// Skip enabling ANSI processing
    no_enable: bool,
    /// Print the report as TOML
    toml: bool,
    /// Log file from the command line
    log_file: Option<PathBuf>,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("pastel-probe {}", VERSION);
}

fn print_help() {
    eprintln!("pastel-probe {} - Terminal capability report", VERSION);
    eprintln!();
    eprintln!("Usage: pastel-probe [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --color <WHEN>        auto, always or never (default: from config, auto)");
    eprintln!("  --no-enable           Do not enable ANSI processing on stdout");
    eprintln!("  --toml                Print the report as TOML");
    eprintln!("  --log <FILE>          Log file (default: ~/.pastel/pastel-probe.log)");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.pastel/config.toml");
    eprintln!("Log filter: RUST_LOG (e.g. RUST_LOG=pastel_term=debug)");
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "--color" => {
                let value = args.next().ok_or("Missing color argument")?;
                parsed.color = Some(value.parse()?);
            }
            "--no-enable" => {
                parsed.no_enable = true;
            }
            "--toml" => {
                parsed.toml = true;
            }
            "--log" => {
                let value = args.next().ok_or("Missing log file argument")?;
                parsed.log_file = Some(PathBuf::from(value));
            }
            other => {
                return Err(format!("Unknown argument: {}. Use -h for help.", other));
            }
        }
    }

    Ok(parsed)
}

/// Initialize logging to file
fn init_logging(config: &PastelConfig) {
    let log_path = config.log_path();

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = match parse_args(env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Merge config: command line args override config file
    let mut config = PastelConfig::load();
    if let Some(color) = args.color {
        config.color = color;
    }
    if args.no_enable {
        config.enable_ansi = false;
    }
    if let Some(ref file) = args.log_file {
        config.log.file = Some(file.clone());
    }

    init_logging(&config);
    info!("pastel-probe {} starting", VERSION);

    let probe = Probe::native();
    let report = Report::collect(&probe, config.enable_ansi);
    let color = report.use_color(config.color);

    info!("Emulated pty: {}", report.any_emulated_pty);
    info!("Color: {} ({:?})", color, config.color);
    if let AnsiStatus::Failed(ref reason) = report.ansi {
        warn!("ANSI processing unavailable: {}", reason);
    }

    let console = StreamConsole::stdio();
    if args.toml {
        console.log(&toml::to_string_pretty(&report)?);
        return Ok(());
    }

    for stream in &report.streams {
        let label = if color {
            match stream.pty {
                Some(_) => stream.attached_to.as_str().magenta().to_string(),
                None if stream.attached_to == "tty" => stream.attached_to.as_str().green().to_string(),
                None => stream.attached_to.as_str().dark_grey().to_string(),
            }
        } else {
            stream.attached_to.clone()
        };
        console.log(&format!("{:<6} (fd {}): {}\n", stream.name, stream.fd, label));
    }
    console.log(&format!("emulated pty on any stream: {}\n", report.any_emulated_pty));

    match &report.ansi {
        AnsiStatus::Enabled => console.log("ansi: enabled\n"),
        AnsiStatus::Skipped => console.log("ansi: skipped\n"),
        AnsiStatus::Failed(reason) => console.warn(&format!("ansi: failed ({})\n", reason)),
    }
    console.log(&format!("color: {}\n", if color { "on" } else { "off" }));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_arguments() {
        let parsed = args(&[]).unwrap();
        assert!(parsed.color.is_none());
        assert!(!parsed.no_enable);
        assert!(!parsed.toml);
    }

    #[test]
    fn test_all_flags() {
        let parsed = args(&["--color", "never", "--no-enable", "--toml", "--log", "probe.log"]).unwrap();
        assert_eq!(parsed.color, Some(ColorMode::Never));
        assert!(parsed.no_enable);
        assert!(parsed.toml);
        assert_eq!(parsed.log_file, Some(PathBuf::from("probe.log")));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(args(&["--color"]).is_err());
        assert!(args(&["--color", "purple"]).is_err());
        assert!(args(&["--log"]).is_err());
        assert_eq!(
            args(&["--frobnicate"]).unwrap_err(),
            "Unknown argument: --frobnicate. Use -h for help."
        );
    }
}
