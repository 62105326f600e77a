//! shortsmith CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use shortsmith::cli::{commands, Cli, Commands, Output};
use shortsmith::config::{LogFormat, Settings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Exit status after Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    // Load configuration
    let settings = match Settings::load_from(cli.config.as_ref().map(|_| &config_path)) {
        Ok(settings) => settings,
        Err(e) => {
            Output::error(&format!("{}", e));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = bootstrap(&settings, cli.verbose) {
        Output::error(&format!("{:#}", e));
        return ExitCode::FAILURE;
    }

    tokio::select! {
        result = run(cli.command, settings, config_path) => match result {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                Output::error(&format!("{:#}", e));
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            Output::warning("Interrupted.");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(command: Commands, settings: Settings, config_path: PathBuf) -> Result<bool> {
    match command {
        Commands::Process { input } => commands::run_process(&input, settings).await,
        Commands::Doctor => commands::run_doctor(&settings, &config_path).await,
        Commands::Config { action } => {
            commands::run_config(&action, settings, &config_path)?;
            Ok(true)
        }
    }
}

/// Create working directories, then install the tracing subscriber.
fn bootstrap(settings: &Settings, verbose: u8) -> Result<()> {
    for dir in [settings.temp_dir(), settings.output_dir(), settings.logs_dir()] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let level = match verbose {
        0 => settings.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("shortsmith={}", level)),
    );

    let console = match settings.logging.format {
        LogFormat::Full => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let file = if settings.logging.file_logging {
        let path = settings.logs_dir().join(format!(
            "shortsmith_{}.log",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}
