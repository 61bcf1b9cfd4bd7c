//! handcursor CLI — drive the gesture pipeline from the command line.
//!
//! Usage:
//!   handcursor replay <FILE>    Replay recorded detections through a session
//!   handcursor map --x --y      Show where a fingertip lands on the canvas
//!   handcursor config show      Print the effective configuration
//!   handcursor config init      Write the default configuration
//!   handcursor check            Validate configuration and show cursor bounds

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use handcursor_common::config::{AppConfig, ClickMode};

mod commands;

#[derive(Parser)]
#[command(
    name = "handcursor",
    about = "Drive a screen cursor with hand gestures",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL detection recording through a control session
    Replay {
        /// Path to the recording
        file: PathBuf,

        /// Frame loop rate in Hz (defaults to the configured refresh rate)
        #[arg(long)]
        fps: Option<u32>,

        /// Click mode: continuous|on_enter
        #[arg(long, value_parser = parse_click_mode)]
        click_mode: Option<ClickMode>,

        /// Artificial detector latency in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,

        /// Width of the recorded video
        #[arg(long, default_value = "640")]
        video_width: u32,

        /// Height of the recorded video
        #[arg(long, default_value = "480")]
        video_height: u32,
    },

    /// Map a fingertip position to cursor space
    Map {
        /// Fingertip x in video pixels
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        /// Fingertip y in video pixels
        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Video width
        #[arg(long, default_value = "640")]
        video_width: u32,

        /// Video height
        #[arg(long, default_value = "480")]
        video_height: u32,
    },

    /// Show or initialise the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Validate the configuration and show derived values
    Check,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,

    /// Write the default configuration to the standard location
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_click_mode(value: &str) -> Result<ClickMode, String> {
    match value {
        "continuous" => Ok(ClickMode::Continuous),
        "on_enter" | "on-enter" => Ok(ClickMode::OnEnter),
        other => Err(format!(
            "unknown click mode '{other}' (expected continuous or on_enter)"
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    handcursor_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Replay {
            file,
            fps,
            click_mode,
            latency_ms,
            video_width,
            video_height,
        } => {
            commands::replay::run(
                config,
                commands::replay::ReplayOptions {
                    file,
                    fps,
                    click_mode,
                    latency_ms,
                    video_width,
                    video_height,
                },
            )
            .await
        }
        Commands::Map {
            x,
            y,
            video_width,
            video_height,
        } => commands::map::run(&config, x, y, video_width, video_height),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(force),
        },
        Commands::Check => commands::check::run(&config),
    }
}
