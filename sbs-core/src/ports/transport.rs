//! Transport port - access to the content API

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{CommentDraft, RawComment, RawUser};

/// Content API transport abstraction
///
/// Implementations report network and server failures as
/// [`Error::Transport`](crate::Error::Transport). The models never look at
/// status codes or headers; auth tokens are passed through opaquely.
#[async_trait]
pub trait CommentTransport: Send + Sync {
    /// Get a single comment, or `None` if the API has no comment with that ID
    async fn get_comment_by_id(&self, id: i64) -> Result<Option<RawComment>>;

    /// Replace an existing comment, returning the record as stored
    async fn put_comment(&self, id: i64, comment: &RawComment, auth_token: &str)
        -> Result<RawComment>;

    /// Create a new comment, returning the record as stored
    async fn post_comment(&self, draft: &CommentDraft, auth_token: &str) -> Result<RawComment>;

    /// Get the users with the given IDs. Unknown IDs are left out.
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<RawUser>>;
}
