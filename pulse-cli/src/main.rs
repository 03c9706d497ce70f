use anyhow::Result;
use clap::{Parser, Subcommand};
use pulse_core::{AiError, SettingsManager};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

/// Exit status used when the generative service reports an exhausted quota
const QUOTA_EXIT_CODE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pulse - brand audits, ad concepts and narration from the command line")]
struct Args {
    /// Load settings from a specific file instead of ~/.pulse/settings.toml
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Audit a brand URL: health, strategy and three ad concepts
    Audit { url: String },

    /// Generate three more ad concepts for an audit
    Ads {
        #[arg(long, value_name = "FILE")]
        audit: PathBuf,
    },

    /// Simulate audience reaction to an ad concept
    Simulate {
        #[arg(long, value_name = "FILE")]
        audit: PathBuf,
        /// Ad concept id; defaults to the first ad
        #[arg(long)]
        ad: Option<String>,
    },

    /// Refract an ad concept into platform-native assets
    Forge {
        #[arg(long, value_name = "FILE")]
        audit: PathBuf,
        #[arg(long)]
        ad: Option<String>,
    },

    /// Search-grounded scan of competitor and market signals
    Intel {
        #[arg(long)]
        brand: String,
        #[arg(long)]
        niche: String,
    },

    /// Rewrite the leading ad concepts around a new theme
    Pivot {
        #[arg(long, value_name = "FILE")]
        audit: PathBuf,
        #[arg(long)]
        theme: String,
        /// Number of leading ads to pivot
        #[arg(long, default_value_t = 2)]
        count: usize,
    },

    /// Generate a marketing visual
    Image {
        #[arg(long)]
        prompt: String,
        /// Write the decoded image here instead of printing it
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Speak text through the default audio device
    Speak { text: String },

    /// Inspect or edit the settings file
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the settings file location
    Path,
    /// Print the current settings with keys redacted
    Show,
    /// Store a Gemini API key and make it the active provider
    SetKey { key: String },
}

fn main() {
    if let Err(e) = setup_tracing() {
        eprintln!("Warning: failed to initialize tracing: {e:?}");
    }

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(async_main()));

    if let Err(e) = result {
        if is_quota_exhausted(&e) {
            error!(error = ?e, "quota exhausted");
            eprintln!(
                "Error: the Gemini API quota is exhausted. Wait for it to reset or switch to a \
                 key with remaining quota (`pulse settings set-key`)."
            );
            std::process::exit(QUOTA_EXIT_CODE);
        }

        error!(error = ?e, "command failed");
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

async fn async_main() -> Result<()> {
    let args = Args::parse();
    info!(command = ?args.command, settings = ?args.settings, "CLI startup");

    let settings = match args.settings {
        Some(path) => SettingsManager::from_path(path)?,
        None => SettingsManager::new()?,
    };

    commands::run(args.command, &settings).await
}

fn is_quota_exhausted(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<AiError>()
        .is_some_and(AiError::is_quota_exhausted)
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    let trace_dir = home.join(".pulse").join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("pulse.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
