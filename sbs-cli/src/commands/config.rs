//! Config command - view and change API settings

use anyhow::Result;
use clap::Subcommand;
use sbs_core::config::{normalize_api_url, Config};

use super::get_sbs_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the active configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change stored settings
    Set {
        /// API root URL
        #[arg(long)]
        api_url: Option<String>,
        /// Auth token used for edits and posts
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the stored auth token
    Logout,
}

fn mask(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{}…", visible)
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let sbs_dir = get_sbs_dir()?;
    std::fs::create_dir_all(&sbs_dir)?;
    let mut config = Config::load(&sbs_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            if json {
                let value = serde_json::json!({
                    "apiUrl": config.api_url,
                    "hasAuthToken": config.auth_token.is_some(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }

            let mut table = output::create_table();
            table.add_row(vec!["Config dir", &sbs_dir.display().to_string()]);
            table.add_row(vec!["API URL", &config.api_url]);
            let token = config
                .auth_token
                .as_deref()
                .map(mask)
                .unwrap_or_else(|| "(none)".to_string());
            table.add_row(vec!["Auth token", &token]);
            println!("{}", table);
        }
        ConfigCommands::Set { api_url, token } => {
            if api_url.is_none() && token.is_none() {
                anyhow::bail!("Nothing to set. Pass --api-url and/or --token.");
            }
            if let Some(url) = api_url {
                config.api_url = normalize_api_url(&url)?;
            }
            if let Some(token) = token {
                config.auth_token = Some(token).filter(|t| !t.is_empty());
            }
            config.save(&sbs_dir)?;
            output::success("configuration saved");
        }
        ConfigCommands::Logout => {
            config.auth_token = None;
            config.save(&sbs_dir)?;
            output::info("Auth token removed");
        }
    }

    Ok(())
}
