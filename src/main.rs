//! freshbox - Main entry point
//!
//! Parses the command line, sets up diagnostics, then either runs the
//! interactive wizard or one of the headless commands.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use freshbox::app::App;
use freshbox::cli::{Cli, Commands};
use freshbox::command::{CommandRunner, SystemRunner};
use freshbox::config::Settings;
use freshbox::config_file::Profile;
use freshbox::installer::{InstallEvent, InstallLog, Orchestrator, TaskContext, build_queue};
use freshbox::probe::{ProbeReport, SystemProbe};
use freshbox::process_guard;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::OpenOptions;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Where Homebrew puts its binaries on Apple silicon and Intel
const HOMEBREW_BINS: [&str; 2] = ["/opt/homebrew/bin", "/usr/local/bin"];

/// Initialize diagnostics.
///
/// The TUI owns the terminal, so events go to the diagnostic log file.
/// Headless commands fall back to stderr when the file cannot be opened.
fn init_tracing(settings: &Settings, log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file = settings.ensure_state_dir().ok().and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(settings.layout.diagnostic_log())
            .ok()
    });

    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Runner whose PATH already includes the directories installs create
fn system_runner(settings: &Settings) -> Arc<dyn CommandRunner> {
    let layout = &settings.layout;
    let extra = HOMEBREW_BINS
        .into_iter()
        .map(PathBuf::from)
        .chain([layout.cargo_bin(), layout.local_bin()]);
    Arc::new(SystemRunner::new().with_extra_path(extra))
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli.home.clone(), cli.dry_run)?;

    init_tracing(&settings, &cli.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "freshbox starting up");

    // Children are terminated on SIGINT/SIGTERM/SIGHUP
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!(error = %e, "failed to initialize signal handlers");
    }
    debug!("signal handlers initialized");

    let runner = system_runner(&settings);

    match cli.command {
        Some(Commands::Validate { profile }) => validate_profile(&profile),
        Some(Commands::Install {
            profile: Some(profile),
            ..
        }) => run_headless_install(&profile, &settings, runner),
        Some(Commands::Install { save_profile, .. }) => run_tui(settings, runner, save_profile),
        Some(Commands::Plan { profile }) => print_plan(&profile, &settings, runner),
        Some(Commands::Probe) => print_probe(&settings, runner),
        None => run_tui(settings, runner, None),
    }
}

/// Run the interactive wizard
fn run_tui(
    settings: Settings,
    runner: Arc<dyn CommandRunner>,
    save_profile: Option<PathBuf>,
) -> Result<()> {
    debug!("initializing terminal for TUI mode");

    enable_raw_mode().context("Failed to enable raw mode")?;
    crossterm::execute!(stdout(), EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .context("Failed to create terminal")
        .and_then(|mut terminal| {
            let mut app = App::new(settings, runner, save_profile);
            app.run(&mut terminal)
        });

    // Cleanup terminal (always attempt cleanup, even if app failed)
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);

    if let Err(e) = &result {
        error!(error = %format!("{:#}", e), "wizard exited with an error");
    }
    result
}

fn load_valid_profile(path: &Path) -> Result<Profile> {
    info!(path = %path.display(), "loading profile");
    let profile = Profile::load_from_file(path)?;
    profile.validate()?;
    Ok(profile)
}

fn validate_profile(path: &Path) -> Result<()> {
    match load_valid_profile(path) {
        Ok(_) => {
            info!("profile validation successful");
            println!("✓ Profile is valid: {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "profile validation failed");
            eprintln!("✗ Profile validation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn probe_machine(settings: &Settings, runner: Arc<dyn CommandRunner>) -> ProbeReport {
    ProbeReport::collect(&SystemProbe::new(runner, settings.home()))
}

/// Print the task queue a profile would produce on this machine
fn print_plan(path: &Path, settings: &Settings, runner: Arc<dyn CommandRunner>) -> Result<()> {
    let profile = load_valid_profile(path)?;
    let probe = probe_machine(settings, Arc::clone(&runner));
    let queue = build_queue(profile.request(), &probe, &TaskContext::new(runner, settings));

    if queue.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }
    for (i, task) in queue.iter().enumerate() {
        println!("{:>3}. {}", i + 1, task.name());
    }
    Ok(())
}

fn print_probe(settings: &Settings, runner: Arc<dyn CommandRunner>) -> Result<()> {
    let report = probe_machine(settings, runner);
    for (key, result) in report.iter() {
        match (result.installed, result.version.as_deref()) {
            (true, Some(version)) => println!("✓ {:<24} {}", key, version),
            (true, None) => println!("✓ {}", key),
            (false, _) => println!("✗ {}", key),
        }
    }
    Ok(())
}

/// Run a saved profile without the TUI, one line per event
fn run_headless_install(
    path: &Path,
    settings: &Settings,
    runner: Arc<dyn CommandRunner>,
) -> Result<()> {
    let profile = load_valid_profile(path)?;
    println!("✓ Profile loaded and validated");
    if settings.dry_run {
        println!("Dry run: no command will be executed");
    }

    let guard = process_guard::ProcessGuard::new();
    let probe = probe_machine(settings, Arc::clone(&runner));
    let queue = build_queue(profile.request(), &probe, &TaskContext::new(runner, settings));
    let mut orchestrator = Orchestrator::new(
        queue,
        InstallLog::new(settings.layout.install_log()),
        settings.summary_len,
    );

    orchestrator.run_to_completion(|event| match event {
        InstallEvent::TaskStarted { index, total, name } => {
            println!("[{}/{}] {}", index + 1, total, name);
        }
        InstallEvent::TaskFinished(outcome) => match &outcome.error_summary {
            None => println!("  ✓ {}", outcome.name),
            Some(summary) => println!("  ✗ {}: {}", outcome.name, summary),
        },
        InstallEvent::AllDone { total, failed } => {
            println!();
            println!("{} tasks, {} failed", total, failed);
        }
    })?;

    println!("Install log: {}", orchestrator.log_path().display());
    if orchestrator.failed_count() > 0 {
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
