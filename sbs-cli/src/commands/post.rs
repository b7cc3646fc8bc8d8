//! Post command - create a comment in a room

use anyhow::{Context, Result};
use sbs_core::{Comment, Settings};

use super::{get_context, pick_token, read_body, SettingsArgs};
use crate::output;

pub async fn run(
    room: i64,
    body: Option<String>,
    settings_args: &SettingsArgs,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let token = pick_token(token, &ctx);
    let body = read_body(body)?;
    let settings = settings_args.apply(&Settings::default());

    let created = Comment::create(
        ctx.transport.as_ref(),
        &body,
        &settings,
        room,
        token.as_deref(),
        ctx.api_url(),
    )
    .await
    .with_context(|| format!("Failed to post in room {}", room))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        output::success(&format!(
            "posted comment #{} in room {}",
            created.id, created.parent_id
        ));
    }
    Ok(())
}
