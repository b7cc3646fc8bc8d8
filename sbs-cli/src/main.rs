//! SBS CLI - read and write SmileBASIC Source comments from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{codec, config, edit, post, show, SettingsArgs};

/// sbs - SmileBASIC Source comments in your terminal
#[derive(Parser)]
#[command(name = "sbs", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a comment with its author
    Show {
        /// Comment ID
        id: i64,
        /// Print the raw content, metadata line included
        #[arg(long)]
        raw: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an existing comment
    Edit {
        /// Comment ID
        id: i64,
        /// New body ("-" reads stdin; omitted keeps the body when settings change)
        body: Option<String>,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Auth token (defaults to the configured one)
        #[arg(long, env = "SBS_AUTH_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Post a new comment
    Post {
        /// Room (page) ID to post in
        room: i64,
        /// Body ("-" or omitted reads stdin)
        body: Option<String>,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Auth token (defaults to the configured one)
        #[arg(long, env = "SBS_AUTH_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode a body and settings into wire content
    Encode {
        /// Body ("-" or omitted reads stdin)
        body: Option<String>,
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Decode wire content into settings and body
    Decode {
        /// Wire content ("-" or omitted reads stdin)
        content: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage API settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Commands::Show { id, raw, json } => runtime.block_on(show::run(id, raw, json)),
        Commands::Edit { id, body, settings, token, json } => {
            runtime.block_on(edit::run(id, body, &settings, token, json))
        }
        Commands::Post { room, body, settings, token, json } => {
            runtime.block_on(post::run(room, body, &settings, token, json))
        }
        Commands::Encode { body, settings } => codec::run_encode(body, &settings),
        Commands::Decode { content, json } => codec::run_decode(content, json),
        Commands::Config { command } => config::run(command),
    }
}
