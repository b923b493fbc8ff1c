//! Purpose: `timelapse-install` CLI entry point.
//! Role: Binary crate root; parses args, installs or removes the plugin.
//! Invariants: Human summaries go to a TTY stdout, JSON envelopes otherwise.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Soft warnings (deps failure, nothing to uninstall) exit 0.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use timelapse_dist::api::{
    Bundle, Error, ErrorKind, HostEnv, InstallReport, PLUGIN_NAME, UninstallOutcome, install,
    install_dependencies, resolve_plugins_dir, to_exit_code, uninstall,
};
use timelapse_dist::report::{Notice, emit_error, emit_notice};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, use_color)) => {
            emit_error(&err, use_color);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, bool)> {
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
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `timelapse-install --help` for usage."),
                    false,
                ));
            }
        },
    };

    let use_color = cli.color.use_color(io::stderr().is_terminal());
    dispatch(cli, use_color).map_err(|err| (err, use_color))
}

fn dispatch(cli: Cli, use_color: bool) -> Result<RunOutcome, Error> {
    let plugins_dir = match &cli.plugins_dir {
        Some(dir) => dir.clone(),
        None => {
            let env = HostEnv::detect()?;
            resolve_plugins_dir(&env, &cli.profile, |path: &Path| path.is_dir())?
        }
    };

    if cli.uninstall {
        let outcome = uninstall(&plugins_dir)?;
        emit_uninstall(&outcome, use_color);
        return Ok(RunOutcome::ok());
    }

    let bundle = Bundle::open(&cli.source)?;

    if cli.deps
        && let Err(err) = install_dependencies(&bundle)
    {
        emit_notice(
            &Notice {
                kind: "deps".to_string(),
                cmd: "install".to_string(),
                message: format!("dependency installation failed: {err}"),
                hint: err.hint().map(str::to_string),
            },
            use_color,
        );
    }

    let report = install(&bundle, &plugins_dir)?;
    for skipped in &report.skipped {
        emit_notice(
            &Notice {
                kind: "skipped".to_string(),
                cmd: "install".to_string(),
                message: format!("{} not found in source, skipped", skipped.name),
                hint: None,
            },
            use_color,
        );
    }
    emit_install(&report);
    Ok(RunOutcome::ok())
}

fn emit_install(report: &InstallReport) {
    if io::stdout().is_terminal() {
        println!("Installed {PLUGIN_NAME} to {}", report.target.display());
        if report.replaced_existing {
            println!("  replaced the previous installation");
        }
        println!(
            "  {} files installed, {} build artifacts stripped",
            report.files_installed, report.artifacts_stripped
        );
        println!();
        println!("Next steps:");
        println!("  1. Restart QGIS if it is running");
        println!("  2. Plugins -> Manage and Install Plugins -> Installed -> enable Timelapse");
        println!("  3. First use: authenticate with `earthengine authenticate`");
        return;
    }
    let skipped: Vec<_> = report.skipped.iter().map(|s| s.name.as_str()).collect();
    emit_json(json!({
        "install": {
            "target": report.target.display().to_string(),
            "files": report.files_installed,
            "stripped": report.artifacts_stripped,
            "replaced": report.replaced_existing,
            "skipped": skipped,
        }
    }));
}

fn emit_uninstall(outcome: &UninstallOutcome, use_color: bool) {
    match outcome {
        UninstallOutcome::Removed(path) => {
            if io::stdout().is_terminal() {
                println!("Uninstalled {PLUGIN_NAME} from {}", path.display());
            } else {
                emit_json(json!({
                    "uninstall": { "removed": true, "path": path.display().to_string() }
                }));
            }
        }
        UninstallOutcome::NotInstalled(path) => {
            emit_notice(
                &Notice {
                    kind: "uninstall".to_string(),
                    cmd: "uninstall".to_string(),
                    message: format!("plugin not installed at {}", path.display()),
                    hint: None,
                },
                use_color,
            );
            if !io::stdout().is_terminal() {
                emit_json(json!({
                    "uninstall": { "removed": false, "path": path.display().to_string() }
                }));
            }
        }
    }
}

fn emit_json(value: serde_json::Value) {
    let text = serde_json::to_string(&value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{text}");
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[derive(Parser)]
#[command(
    name = "timelapse-install",
    version,
    about = "Install the QGIS Timelapse plugin into a QGIS profile",
    after_help = r#"EXAMPLES
  $ timelapse-install                          # install from the current directory
  $ timelapse-install --deps                   # also pip-install python dependencies
  $ timelapse-install --profile field-survey   # install into a named QGIS profile
  $ timelapse-install --uninstall              # remove the installed plugin
  $ timelapse-install --plugins-dir /path      # bypass OS path resolution

The plugins directory is resolved per OS (standard, Flatpak, and Snap layouts
on Linux; Application Support on macOS; %APPDATA% on Windows); the first
existing candidate wins."#
)]
struct Cli {
    #[arg(long, default_value = "default", help = "QGIS profile name")]
    profile: String,

    #[arg(long, help = "Remove the installed plugin instead of installing")]
    uninstall: bool,

    #[arg(long, help = "Also pip-install the bundle's python dependencies (best effort)")]
    deps: bool,

    #[arg(
        long,
        help = "Custom QGIS plugins directory (skips OS path resolution)",
        value_hint = ValueHint::DirPath
    )]
    plugins_dir: Option<PathBuf>,

    #[arg(
        long,
        default_value = ".",
        help = "Plugin bundle source directory",
        value_hint = ValueHint::DirPath
    )]
    source: PathBuf,

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
