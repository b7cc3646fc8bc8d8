//! Show command - fetch a comment with its users

use anyhow::Result;
use colored::Colorize;
use sbs_core::{Comment, User};

use super::get_context;
use crate::output;

pub async fn run(id: i64, raw: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let transport = ctx.transport.as_ref();

    let fetched = Comment::fetch_by_id(transport, id, ctx.api_url()).await?;
    let roster = User::fetch_many(
        transport,
        &[fetched.create_user_id, fetched.edit_user_id],
        ctx.api_url(),
    )
    .await?;
    let comment = fetched.with_roster(&roster);

    if json {
        println!("{}", serde_json::to_string_pretty(&comment)?);
        return Ok(());
    }

    let author = comment.display_name().unwrap_or("(unknown user)");
    println!("{} {}", author.bold(), format!("#{}", comment.id).dimmed());

    let mut table = output::create_table();
    table.add_row(vec!["Room", &comment.parent_id.to_string()]);
    table.add_row(vec!["Markup", &comment.settings.markup_type]);
    table.add_row(vec!["Created", &comment.create_date]);
    if comment.edit_date != comment.create_date {
        let editor = comment
            .edit_user
            .map(|u| u.username.clone())
            .unwrap_or_else(|| comment.edit_user_id.to_string());
        table.add_row(vec!["Edited", &format!("{} by {}", comment.edit_date, editor)]);
    }
    if let Some(link) = comment.avatar_link(sbs_core::domain::DEFAULT_AVATAR_SIZE) {
        table.add_row(vec!["Avatar", &link]);
    }
    println!("{}", table);

    if comment.deleted {
        output::warning("This comment is deleted");
    }

    println!();
    if raw {
        println!("{}", comment.content);
    } else {
        println!("{}", comment.text_content);
    }

    Ok(())
}
