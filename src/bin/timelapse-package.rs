//! Purpose: `timelapse-package` CLI entry point.
//! Role: Stage the plugin bundle, strip artifacts, and emit a versioned zip.
//! Invariants: The archive lands in the output directory or not at all.
//! Invariants: Process exit code is derived from `api::to_exit_code`.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use timelapse_dist::api::{Error, ErrorKind, PackageConfig, PackageReport, package, to_exit_code};
use timelapse_dist::report::emit_error;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let exit_code = match run() {
        Ok(()) => 0,
        Err((err, use_color)) => {
            emit_error(&err, use_color);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), (Error, bool)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        false,
                    )
                })?;
                return Ok(());
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(err.to_string().lines().next().unwrap_or("invalid arguments").trim().to_string())
                        .with_hint("Run `timelapse-package --help` for usage."),
                    false,
                ));
            }
        },
    };

    let use_color = cli.color.use_color(io::stderr().is_terminal());
    let config = PackageConfig {
        output_dir: cli.output.unwrap_or_else(|| cli.source.join("dist")),
        source: cli.source,
    };
    let report = package(&config).map_err(|err| (err, use_color))?;
    emit_report(&report);
    Ok(())
}

fn emit_report(report: &PackageReport) {
    if io::stdout().is_terminal() {
        println!("Packaged version {}", report.version);
        println!(
            "  {} files, {} build artifacts stripped",
            report.files_packaged, report.artifacts_stripped
        );
        println!("  wrote {}", report.archive.display());
        return;
    }
    let value = json!({
        "package": {
            "version": report.version,
            "archive": report.archive.display().to_string(),
            "files": report.files_packaged,
            "stripped": report.artifacts_stripped,
        }
    });
    let text = serde_json::to_string(&value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{text}");
}

#[derive(Parser)]
#[command(
    name = "timelapse-package",
    version,
    about = "Package the QGIS Timelapse plugin into a versioned zip",
    after_help = r#"EXAMPLES
  $ timelapse-package                        # ./metadata.txt -> ./dist/timelapse-<version>.zip
  $ timelapse-package --source plugin/       # package a bundle elsewhere
  $ timelapse-package --output /tmp/release  # put the archive somewhere else

The archive's single top-level entry is `timelapse/`; bytecode caches, compiled
files, OS metadata files, and version-control metadata are stripped."#
)]
struct Cli {
    #[arg(
        long,
        default_value = ".",
        help = "Plugin bundle source directory (must hold metadata.txt)",
        value_hint = ValueHint::DirPath
    )]
    source: PathBuf,

    #[arg(
        long,
        help = "Output directory for the archive (default: {source}/dist)",
        value_hint = ValueHint::DirPath
    )]
    output: Option<PathBuf>,

    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}
