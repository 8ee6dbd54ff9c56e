use serde::{Deserialize, Serialize};

/// Snapshot of a forum post as read from the platform.
///
/// The core never mutates a post; it reads one snapshot per evaluation and
/// asks the platform to apply any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    /// `None` when the author account has been deleted.
    pub author: Option<String>,
    /// Link target; equals `permalink` for text posts and crossposts.
    pub url: String,
    /// Absolute url of the post's own comment page.
    pub permalink: String,
    /// Creation time, seconds since the Unix epoch (UTC).
    pub created_utc: i64,
    /// Net vote score reported by the platform.
    pub score: i64,
    /// Comment count as reported by the platform.  `None` when the field was
    /// missing or unreadable.
    pub num_comments: Option<i64>,
    /// Already taken down by a moderator (possibly this bot on an earlier
    /// pass).  Moderators still see removed posts in listings.
    #[serde(default)]
    pub removed: bool,
}

/// A comment created by the bot itself (e.g. a promotion reply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRef {
    pub id: String,
}
