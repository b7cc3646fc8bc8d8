//! User domain model

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::ports::CommentTransport;

/// Avatar size used when the caller does not ask for one
pub const DEFAULT_AVATAR_SIZE: u32 = 256;

/// User record as it is formatted on the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: i64,
    pub username: String,
    /// File ID of the user's avatar
    #[serde(default)]
    pub avatar: Option<i64>,
    pub create_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
    pub banned: bool,
    /// Whether the user has special permissions
    #[serde(rename = "super")]
    pub is_super: bool,
    pub registered: bool,
}

/// Build the raw-file link for an avatar.
///
/// A missing file ID leaves the path segment empty.
pub fn avatar_url(api_url: &str, file_id: Option<i64>, size: u32) -> String {
    let file = file_id.map(|id| id.to_string()).unwrap_or_default();
    format!("{}File/raw/{}?size={}&crop=true", api_url, file, size)
}

/// A user of the content API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub avatar_file_id: Option<i64>,
    pub create_date: String,
    /// Free-text role tag
    pub special: Option<String>,
    pub banned: bool,
    pub is_privileged: bool,
    pub registered: bool,
    #[serde(skip)]
    api_url: String,
}

impl User {
    /// Wrap a raw user record. Fields are copied as-is.
    pub fn from_raw(raw: RawUser, api_url: &str) -> Self {
        Self {
            id: raw.id,
            username: raw.username,
            avatar_file_id: raw.avatar,
            create_date: raw.create_date,
            special: raw.special,
            banned: raw.banned,
            is_privileged: raw.is_super,
            registered: raw.registered,
            api_url: api_url.to_string(),
        }
    }

    pub fn to_raw(&self) -> RawUser {
        RawUser {
            id: self.id,
            username: self.username.clone(),
            avatar: self.avatar_file_id,
            create_date: self.create_date.clone(),
            special: self.special.clone(),
            banned: self.banned,
            is_super: self.is_privileged,
            registered: self.registered,
        }
    }

    /// API URL this user was fetched from
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Link to the user's avatar cropped to `size` pixels
    pub fn avatar_link(&self, size: u32) -> String {
        avatar_url(&self.api_url, self.avatar_file_id, size)
    }

    pub fn default_avatar_link(&self) -> String {
        self.avatar_link(DEFAULT_AVATAR_SIZE)
    }

    /// Fetch a roster of users by ID.
    ///
    /// Duplicate IDs are requested once. Users the API does not return are
    /// simply absent from the roster.
    pub async fn fetch_many(
        transport: &dyn CommentTransport,
        ids: &[i64],
        api_url: &str,
    ) -> Result<Vec<User>> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        if unique.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(count = unique.len(), "fetching users");
        let raw_users = transport.get_users_by_ids(&unique).await?;

        Ok(raw_users
            .into_iter()
            .map(|raw| User::from_raw(raw, api_url))
            .collect())
    }
}
