//! Comment domain model
//!
//! A comment's wire `content` carries a metadata line followed by the body
//! (see [`settings`](super::settings)). Comments are never mutated after
//! construction: [`Comment::edit`] and [`Comment::with_roster`] build new
//! instances from raw records through the same constructor.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::settings::{self, Settings};
use crate::domain::user::{avatar_url, User};
use crate::ports::CommentTransport;

/// Comment record as it is formatted on the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    /// Room (page) the comment was posted in
    pub parent_id: i64,
    pub content: String,
    pub create_date: String,
    pub edit_date: String,
    pub create_user_id: i64,
    pub edit_user_id: i64,
    pub deleted: bool,
    pub id: i64,
}

/// Body of a request that creates a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub parent_id: i64,
    pub content: String,
}

/// A comment with decoded settings and resolved users
///
/// `create_user` and `edit_user` borrow from the roster the comment was built
/// with; a comment never owns its users.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment<'r> {
    pub id: i64,
    pub parent_id: i64,
    /// Raw wire content, metadata line included
    pub content: String,
    pub create_date: String,
    pub edit_date: String,
    pub create_user_id: i64,
    pub edit_user_id: i64,
    pub deleted: bool,
    pub settings: Settings,
    /// Content with the metadata line stripped
    pub text_content: String,
    pub create_user: Option<&'r User>,
    pub edit_user: Option<&'r User>,
    #[serde(skip)]
    auth_token: Option<String>,
    #[serde(skip)]
    api_url: String,
}

fn usable_token(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.is_empty())
}

fn parse_api_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    // Some records omit the offset; those are UTC
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

impl<'r> Comment<'r> {
    /// Build a comment from a raw record.
    ///
    /// Users are looked up in `roster` by ID; a missing user leaves the
    /// reference unset. An empty `auth_token` is treated as absent.
    pub fn new(
        raw: RawComment,
        api_url: &str,
        roster: &'r [User],
        auth_token: Option<&str>,
    ) -> Self {
        let candidates: Vec<&'r User> = roster.iter().collect();
        Self::from_raw(raw, api_url, &candidates, auth_token)
    }

    fn from_raw(
        raw: RawComment,
        api_url: &str,
        candidates: &[&'r User],
        auth_token: Option<&str>,
    ) -> Self {
        let find = |id: i64| candidates.iter().copied().find(|user| user.id == id);
        let (settings, text_content) = settings::decode(&raw.content);

        Self {
            create_user: find(raw.create_user_id),
            edit_user: find(raw.edit_user_id),
            id: raw.id,
            parent_id: raw.parent_id,
            content: raw.content,
            create_date: raw.create_date,
            edit_date: raw.edit_date,
            create_user_id: raw.create_user_id,
            edit_user_id: raw.edit_user_id,
            deleted: raw.deleted,
            settings,
            text_content,
            auth_token: usable_token(auth_token).map(str::to_string),
            api_url: api_url.to_string(),
        }
    }

    /// Fetch a comment by ID. The result has no users attached.
    pub async fn fetch_by_id(
        transport: &dyn CommentTransport,
        id: i64,
        api_url: &str,
    ) -> Result<Comment<'r>> {
        tracing::debug!(id, "fetching comment");
        let raw = transport
            .get_comment_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("comment {}", id)))?;

        Ok(Comment::new(raw, api_url, &[], None))
    }

    /// Post a new comment in room `parent_id`.
    ///
    /// Fails with [`Error::AuthenticationRequired`] before touching the
    /// transport when no token is given.
    pub async fn create(
        transport: &dyn CommentTransport,
        body: &str,
        settings: &Settings,
        parent_id: i64,
        auth_token: Option<&str>,
        api_url: &str,
    ) -> Result<Comment<'r>> {
        let token = usable_token(auth_token).ok_or_else(|| {
            Error::auth_required(format!("a token is needed to post in room {}", parent_id))
        })?;

        let draft = CommentDraft {
            parent_id,
            content: settings::encode(settings, body),
        };

        tracing::debug!(parent_id, "posting comment");
        let created = transport.post_comment(&draft, token).await?;

        Ok(Comment::new(created, api_url, &[], Some(token)))
    }

    /// Edit this comment, returning the comment as the server stored it.
    ///
    /// `settings` defaults to the current settings and `auth_token` to the
    /// token the comment was built with. `self` is left untouched whether the
    /// edit succeeds or not. The returned comment resolves its users against
    /// this comment's `create_user` and `edit_user` only.
    pub async fn edit(
        &self,
        transport: &dyn CommentTransport,
        body: &str,
        settings: Option<&Settings>,
        auth_token: Option<&str>,
    ) -> Result<Comment<'r>> {
        let token = usable_token(auth_token)
            .or(self.auth_token.as_deref())
            .ok_or_else(|| {
                Error::auth_required(format!("a token is needed to edit comment {}", self.id))
            })?;

        let mut record = self.to_raw();
        record.content = settings::encode(settings.unwrap_or(&self.settings), body);

        tracing::debug!(id = self.id, "editing comment");
        let updated = transport.put_comment(self.id, &record, token).await?;

        let known: Vec<&'r User> = self.create_user.into_iter().chain(self.edit_user).collect();
        Ok(Comment::from_raw(updated, &self.api_url, &known, Some(token)))
    }

    /// Rebuild this comment with users resolved against another roster
    pub fn with_roster<'s>(&self, roster: &'s [User]) -> Comment<'s> {
        Comment::new(
            self.to_raw(),
            &self.api_url,
            roster,
            self.auth_token.as_deref(),
        )
    }

    /// The raw record for this comment
    pub fn to_raw(&self) -> RawComment {
        RawComment {
            parent_id: self.parent_id,
            content: self.content.clone(),
            create_date: self.create_date.clone(),
            edit_date: self.edit_date.clone(),
            create_user_id: self.create_user_id,
            edit_user_id: self.edit_user_id,
            deleted: self.deleted,
            id: self.id,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn has_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Name to show for the author: nickname, then bridge name, then username
    pub fn display_name(&self) -> Option<&str> {
        self.settings
            .nickname
            .as_deref()
            .or(self.settings.bridge_display_name.as_deref())
            .or(self.create_user.map(|user| user.username.as_str()))
    }

    /// Avatar to show for the author, honouring the avatar override
    pub fn avatar_link(&self, size: u32) -> Option<String> {
        match self.settings.avatar_override_file_id {
            Some(file_id) => Some(avatar_url(&self.api_url, Some(file_id), size)),
            None => self.create_user.map(|user| user.avatar_link(size)),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_api_date(&self.create_date)
    }

    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        parse_api_date(&self.edit_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryTransport;
    use crate::domain::user::RawUser;

    const API: &str = "https://example.test/api/";

    fn raw_comment(id: i64, content: &str) -> RawComment {
        RawComment {
            parent_id: 10,
            content: content.to_string(),
            create_date: "2021-02-03T04:05:06Z".to_string(),
            edit_date: "2021-02-03T04:05:06Z".to_string(),
            create_user_id: 2,
            edit_user_id: 9,
            deleted: false,
            id,
        }
    }

    fn user(id: i64) -> User {
        User::from_raw(
            RawUser {
                id,
                username: format!("user{}", id),
                avatar: Some(id * 100),
                create_date: "2020-01-01T00:00:00Z".to_string(),
                special: None,
                banned: false,
                is_super: false,
                registered: true,
            },
            API,
        )
    }

    #[test]
    fn test_resolves_users_from_roster() {
        let roster = vec![user(1), user(2)];
        let comment = Comment::new(raw_comment(1, "{\"m\":\"t\"}\nhi"), API, &roster, None);

        assert_eq!(comment.create_user.map(|u| u.id), Some(2));
        assert!(comment.edit_user.is_none());
        assert_eq!(comment.text_content, "hi");
    }

    #[test]
    fn test_decodes_content() {
        let comment = Comment::new(
            raw_comment(82268, "{\"m\":\"t\"}\nback to here"),
            API,
            &[],
            None,
        );
        assert_eq!(comment.text_content, "back to here");
        assert_eq!(comment.settings.markup_type, "t");
        assert_eq!(comment.content, "{\"m\":\"t\"}\nback to here");
    }

    #[test]
    fn test_plain_content_falls_back() {
        let comment = Comment::new(raw_comment(1, "{oops}\nline two"), API, &[], None);
        assert_eq!(comment.settings, Settings::default());
        assert_eq!(comment.text_content, "{oops}\nline two");
    }

    #[test]
    fn test_empty_token_is_absent() {
        let comment = Comment::new(raw_comment(1, "x"), API, &[], Some(""));
        assert!(!comment.has_auth_token());
    }

    #[test]
    fn test_to_raw_round_trip() {
        let raw = raw_comment(5, "{\"m\":\"12y\"}\n[b]x[/b]");
        let comment = Comment::new(raw.clone(), API, &[], None);
        assert_eq!(comment.to_raw(), raw);
        assert_eq!(
            settings::encode(&comment.settings, &comment.text_content),
            comment.content
        );
    }

    #[test]
    fn test_with_roster() {
        let comment = Comment::new(raw_comment(1, "x"), API, &[], Some("tok"));
        assert!(comment.create_user.is_none());

        let roster = vec![user(2), user(9)];
        let resolved = comment.with_roster(&roster);
        assert_eq!(resolved.create_user.map(|u| u.id), Some(2));
        assert_eq!(resolved.edit_user.map(|u| u.id), Some(9));
        assert!(resolved.has_auth_token());
    }

    #[test]
    fn test_display_name_precedence() {
        let roster = vec![user(2)];
        let plain = Comment::new(raw_comment(1, "{\"m\":\"t\"}\nx"), API, &roster, None);
        assert_eq!(plain.display_name(), Some("user2"));

        let bridged = Comment::new(
            raw_comment(1, "{\"m\":\"t\",\"b\":\"irc:bob\"}\nx"),
            API,
            &roster,
            None,
        );
        assert_eq!(bridged.display_name(), Some("irc:bob"));

        let nicked = Comment::new(
            raw_comment(1, "{\"m\":\"t\",\"b\":\"irc:bob\",\"n\":\"Bobby\"}\nx"),
            API,
            &roster,
            None,
        );
        assert_eq!(nicked.display_name(), Some("Bobby"));

        let orphan = Comment::new(raw_comment(1, "x"), API, &[], None);
        assert_eq!(orphan.display_name(), None);
    }

    #[test]
    fn test_avatar_override() {
        let roster = vec![user(2)];
        let own = Comment::new(raw_comment(1, "x"), API, &roster, None);
        assert_eq!(
            own.avatar_link(64).as_deref(),
            Some("https://example.test/api/File/raw/200?size=64&crop=true")
        );

        let overridden = Comment::new(
            raw_comment(1, "{\"m\":\"t\",\"a\":77}\nx"),
            API,
            &roster,
            None,
        );
        assert_eq!(
            overridden.avatar_link(64).as_deref(),
            Some("https://example.test/api/File/raw/77?size=64&crop=true")
        );
    }

    #[test]
    fn test_dates() {
        let mut raw = raw_comment(1, "x");
        raw.edit_date = "2021-02-03T04:05:06.5".to_string();
        let comment = Comment::new(raw, API, &[], None);

        let created = comment.created_at().unwrap();
        assert_eq!(created.to_rfc3339(), "2021-02-03T04:05:06+00:00");
        assert!(comment.edited_at().unwrap() > created);

        let mut raw = raw_comment(1, "x");
        raw.create_date = "yesterday".to_string();
        assert!(Comment::new(raw, API, &[], None).created_at().is_none());
    }

    #[tokio::test]
    async fn test_fetch_by_id() {
        let transport =
            MemoryTransport::new().with_comment(raw_comment(82268, "{\"m\":\"t\"}\nback to here"));

        let comment = Comment::fetch_by_id(&transport, 82268, API).await.unwrap();
        assert_eq!(comment.text_content, "back to here");
        assert_eq!(comment.api_url(), API);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let transport = MemoryTransport::new();
        let err = Comment::fetch_by_id(&transport, 1, API).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let transport = MemoryTransport::new().with_comment(raw_comment(1, "x"));
        transport.fail_all(true);
        let err = Comment::fetch_by_id(&transport, 1, API).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_edit_requires_token_before_network() {
        let transport = MemoryTransport::new().with_comment(raw_comment(1, "x"));
        let comment = Comment::new(raw_comment(1, "x"), API, &[], None);

        let err = comment.edit(&transport, "new", None, None).await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationRequired(_)));

        let err = comment.edit(&transport, "new", None, Some("")).await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationRequired(_)));

        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_edit_returns_new_instance() {
        let roster = vec![user(2), user(9), user(3)];
        let transport = MemoryTransport::new()
            .with_comment(raw_comment(1, "{\"m\":\"12y\"}\nold"))
            .with_session("secret", 9);

        let original = Comment::new(
            raw_comment(1, "{\"m\":\"12y\"}\nold"),
            API,
            &roster,
            Some("secret"),
        );
        let before = original.clone();

        let edited = original.edit(&transport, "new body", None, None).await.unwrap();

        assert_eq!(original, before);
        assert_eq!(edited.text_content, "new body");
        assert_eq!(edited.settings.markup_type, "12y");
        assert_eq!(edited.content, "{\"m\":\"12y\"}\nnew body");
        assert_eq!(edited.edit_user_id, 9);
        assert_eq!(edited.create_user.map(|u| u.id), Some(2));
        assert_eq!(edited.edit_user.map(|u| u.id), Some(9));
        assert!(edited.has_auth_token());
    }

    #[tokio::test]
    async fn test_edit_resolves_only_known_users() {
        let roster = vec![user(2), user(9), user(3)];
        let transport = MemoryTransport::new()
            .with_comment(raw_comment(1, "x"))
            .with_session("other", 3);

        let original = Comment::new(raw_comment(1, "x"), API, &roster, None);
        let edited = original
            .edit(&transport, "y", Some(&Settings::new("bbcode")), Some("other"))
            .await
            .unwrap();

        // User 3 is in the roster but was not known to the original comment
        assert_eq!(edited.edit_user_id, 3);
        assert!(edited.edit_user.is_none());
        assert_eq!(edited.settings.markup_type, "bbcode");
    }

    #[tokio::test]
    async fn test_failed_edit_leaves_original() {
        let transport = MemoryTransport::new().with_comment(raw_comment(1, "x"));
        let original = Comment::new(raw_comment(1, "x"), API, &[], Some("unknown"));
        let before = original.clone();

        let err = original.edit(&transport, "y", None, None).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(original, before);
    }

    #[tokio::test]
    async fn test_create() {
        let transport = MemoryTransport::new().with_session("secret", 4);
        let settings = Settings::default().with_nickname("nick");

        let created = Comment::create(&transport, "hello", &settings, 42, Some("secret"), API)
            .await
            .unwrap();

        assert_eq!(created.parent_id, 42);
        assert_eq!(created.create_user_id, 4);
        assert_eq!(created.settings, settings);
        assert_eq!(created.text_content, "hello");
        assert!(created.has_auth_token());

        let stored = Comment::fetch_by_id(&transport, created.id, API).await.unwrap();
        assert_eq!(stored.content, created.content);
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let transport = MemoryTransport::new();
        let err = Comment::create(&transport, "hello", &Settings::default(), 42, None, API)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthenticationRequired(_)));
        assert_eq!(transport.calls(), 0);
    }
}
