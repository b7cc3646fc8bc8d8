//! Core domain entities
//!
//! Comments, users and the metadata codec. Network access goes through the
//! [`CommentTransport`](crate::ports::CommentTransport) port only.

mod comment;
pub mod result;
pub mod settings;
mod user;

pub use comment::{Comment, CommentDraft, RawComment};
pub use settings::{decode, encode, Settings, MARKUP_PLAIN};
pub use user::{avatar_url, RawUser, User, DEFAULT_AVATAR_SIZE};
