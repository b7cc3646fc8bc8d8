//! Comment metadata and the content codec
//!
//! The content API stores a comment as one opaque string. Per-comment display
//! settings travel inside it as a single JSON line in front of the body:
//!
//! ```text
//! {"m":"12y","n":"nick"}
//! the actual message
//! ```
//!
//! Clients that do not know the convention still see readable text. Content
//! without a parseable metadata line decodes to default settings and the whole
//! string as body.
//!
//! A body whose first line is itself a JSON object, sent without a metadata
//! line, is read as metadata. The legacy format has no sentinel to tell the two
//! apart, and adding one would break existing comments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Markup marker for plain text
pub const MARKUP_PLAIN: &str = "t";

const KEY_MARKUP: &str = "m";
const KEY_BRIDGE_NAME: &str = "b";
const KEY_NICKNAME: &str = "n";
const KEY_AVATAR: &str = "a";

/// Display settings embedded in a comment's content.
///
/// Any JSON object is accepted. Known keys are lifted into typed fields when
/// their values have the expected type; everything else stays in `extra` and
/// is written back on encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, JsonValue>", into = "Map<String, JsonValue>")]
pub struct Settings {
    /// Markup type ("t" for plain text, "12y", "bbcode", ...)
    pub markup_type: String,
    /// Display username as determined by a chat bridge
    pub bridge_display_name: Option<String>,
    pub nickname: Option<String>,
    /// File ID of an avatar that replaces the author's own
    pub avatar_override_file_id: Option<i64>,
    /// Keys this client does not understand, kept so they survive an edit.
    ///
    /// A known key here is only written when its typed field is unset.
    pub extra: Map<String, JsonValue>,
}

fn take_string(map: &mut Map<String, JsonValue>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(JsonValue::String(_)) => match map.remove(key) {
            Some(JsonValue::String(value)) => Some(value),
            _ => None,
        },
        _ => None,
    }
}

fn take_i64(map: &mut Map<String, JsonValue>, key: &str) -> Option<i64> {
    let value = map.get(key).and_then(JsonValue::as_i64)?;
    map.remove(key);
    Some(value)
}

impl From<Map<String, JsonValue>> for Settings {
    fn from(mut map: Map<String, JsonValue>) -> Self {
        Self {
            markup_type: take_string(&mut map, KEY_MARKUP)
                .unwrap_or_else(|| MARKUP_PLAIN.to_string()),
            bridge_display_name: take_string(&mut map, KEY_BRIDGE_NAME),
            nickname: take_string(&mut map, KEY_NICKNAME),
            avatar_override_file_id: take_i64(&mut map, KEY_AVATAR),
            extra: map,
        }
    }
}

impl From<Settings> for Map<String, JsonValue> {
    fn from(settings: Settings) -> Self {
        let mut map = Map::new();
        map.insert(KEY_MARKUP.to_string(), settings.markup_type.into());
        if let Some(name) = settings.bridge_display_name {
            map.insert(KEY_BRIDGE_NAME.to_string(), name.into());
        }
        if let Some(nickname) = settings.nickname {
            map.insert(KEY_NICKNAME.to_string(), nickname.into());
        }
        if let Some(file_id) = settings.avatar_override_file_id {
            map.insert(KEY_AVATAR.to_string(), file_id.into());
        }
        for (key, value) in settings.extra {
            if !map.contains_key(&key) {
                map.insert(key, value);
            }
        }
        map
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(MARKUP_PLAIN)
    }
}

impl Settings {
    pub fn new(markup_type: impl Into<String>) -> Self {
        Self {
            markup_type: markup_type.into(),
            bridge_display_name: None,
            nickname: None,
            avatar_override_file_id: None,
            extra: Map::new(),
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_bridge_display_name(mut self, name: impl Into<String>) -> Self {
        self.bridge_display_name = Some(name.into());
        self
    }

    pub fn with_avatar_override(mut self, file_id: i64) -> Self {
        self.avatar_override_file_id = Some(file_id);
        self
    }

    /// True for the plain-text markup
    pub fn is_plain(&self) -> bool {
        self.markup_type == MARKUP_PLAIN
    }
}

/// Pack settings and a body into wire content.
///
/// The settings line is compact JSON, which escapes any newline inside string
/// values, so the first `\n` in the result always ends the metadata.
pub fn encode(settings: &Settings, body: &str) -> String {
    // Serializing a JSON map cannot fail
    let line = serde_json::to_string(settings).unwrap_or_else(|_| "{}".to_string());
    format!("{}\n{}", line, body)
}

/// Split wire content into settings and body.
///
/// Never fails. Falls back to `(Settings::default(), content)` when there is
/// no newline or the first line is not a JSON object.
pub fn decode(content: &str) -> (Settings, String) {
    let Some((line, body)) = content.split_once('\n') else {
        return (Settings::default(), content.to_string());
    };

    match serde_json::from_str::<Settings>(line) {
        Ok(settings) => (settings, body.to_string()),
        Err(e) => {
            tracing::trace!(error = %e, "no metadata line in comment content");
            (Settings::default(), content.to_string())
        }
    }
}
