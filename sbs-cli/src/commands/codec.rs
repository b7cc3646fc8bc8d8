//! Encode / decode commands - work with wire content offline

use anyhow::Result;
use sbs_core::domain::{decode, encode};
use sbs_core::Settings;

use super::{read_body, SettingsArgs};
use crate::output;

pub fn run_encode(body: Option<String>, settings_args: &SettingsArgs) -> Result<()> {
    let body = read_body(body)?;
    let settings = settings_args.apply(&Settings::default());
    print!("{}", encode(&settings, &body));
    Ok(())
}

pub fn run_decode(content: Option<String>, json: bool) -> Result<()> {
    let content = read_body(content)?;
    let (settings, body) = decode(&content);

    if json {
        let value = serde_json::json!({
            "settings": settings,
            "textContent": body,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.add_row(vec!["Markup", settings.markup_type.as_str()]);
    if let Some(nickname) = &settings.nickname {
        table.add_row(vec!["Nickname", nickname.as_str()]);
    }
    if let Some(name) = &settings.bridge_display_name {
        table.add_row(vec!["Bridge name", name.as_str()]);
    }
    if let Some(avatar) = settings.avatar_override_file_id {
        table.add_row(vec!["Avatar", &avatar.to_string()]);
    }
    for (key, value) in &settings.extra {
        table.add_row(vec![key.as_str(), &value.to_string()]);
    }
    println!("{}", table);
    println!();
    println!("{}", body);
    Ok(())
}
