//! Edit command - replace the body or settings of a comment

use anyhow::{Context, Result};
use sbs_core::Comment;

use super::{get_context, pick_token, read_body, SettingsArgs};
use crate::output;

pub async fn run(
    id: i64,
    body: Option<String>,
    settings_args: &SettingsArgs,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let token = pick_token(token, &ctx);
    let transport = ctx.transport.as_ref();

    let current = Comment::fetch_by_id(transport, id, ctx.api_url()).await?;
    let body = match body {
        Some(body) => read_body(Some(body))?,
        None if !settings_args.is_empty() => current.text_content.clone(),
        None => read_body(None)?,
    };
    let settings = if settings_args.is_empty() {
        None
    } else {
        Some(settings_args.apply(&current.settings))
    };

    let edited = current
        .edit(transport, &body, settings.as_ref(), token.as_deref())
        .await
        .with_context(|| format!("Failed to edit comment {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&edited)?);
    } else {
        output::success(&format!("comment #{} edited", edited.id));
    }
    Ok(())
}
