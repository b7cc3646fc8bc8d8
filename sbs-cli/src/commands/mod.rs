//! CLI command implementations

pub mod codec;
pub mod config;
pub mod edit;
pub mod post;
pub mod show;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sbs_core::{SbsContext, Settings};

/// Metadata flags shared by commands that write content
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Markup type ("t" for plain text, "12y", "bbcode", ...)
    #[arg(long, short)]
    pub markup: Option<String>,
    /// Nickname to display instead of the username
    #[arg(long)]
    pub nickname: Option<String>,
    /// Display name set by a chat bridge
    #[arg(long)]
    pub bridge_name: Option<String>,
    /// File ID of an avatar to display instead of the user's own
    #[arg(long)]
    pub avatar: Option<i64>,
}

impl SettingsArgs {
    pub fn is_empty(&self) -> bool {
        self.markup.is_none()
            && self.nickname.is_none()
            && self.bridge_name.is_none()
            && self.avatar.is_none()
    }

    /// Apply the given flags on top of `base`
    pub fn apply(&self, base: &Settings) -> Settings {
        let mut settings = base.clone();
        if let Some(markup) = &self.markup {
            settings.markup_type = markup.clone();
        }
        if let Some(nickname) = &self.nickname {
            settings.nickname = Some(nickname.clone());
        }
        if let Some(name) = &self.bridge_name {
            settings.bridge_display_name = Some(name.clone());
        }
        if let Some(avatar) = self.avatar {
            settings.avatar_override_file_id = Some(avatar);
        }
        settings
    }
}

/// Get the sbs config directory from environment or default
pub fn get_sbs_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SBS_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".sbs"))
        .context("Could not find home directory")
}

/// Build the context from the config directory
pub fn get_context() -> Result<SbsContext> {
    let sbs_dir = get_sbs_dir()?;
    SbsContext::new(&sbs_dir).context("Failed to initialize sbs context")
}

/// Prefer an explicit token over the configured one
pub fn pick_token(explicit: Option<String>, ctx: &SbsContext) -> Option<String> {
    explicit.or_else(|| ctx.auth_token().map(str::to_string))
}

/// Read a body argument, or stdin when it is `-` or missing
pub fn read_body(body: Option<String>) -> Result<String> {
    match body {
        Some(text) if text != "-" => Ok(text),
        _ => {
            let mut input = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut input)
                .context("Failed to read body from stdin")?;
            Ok(input)
        }
    }
}
