//! Collaborator interfaces implemented by a concrete forum client.
//!
//! The engine only ever talks to the platform through these traits, so a
//! pass can run against the live API or an in-memory fake.

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::post::{CommentRef, Post};

/// Operations the curation pass needs.
#[async_trait]
pub trait ForumPlatform: Send + Sync {
    /// Newest posts first, at most `limit` of them.
    async fn fetch_newest_posts(&self, forum: &str, limit: usize) -> Result<Vec<Post>, PlatformError>;

    /// Remove `post` with a moderation reason and a private moderator note.
    /// Removing an already-removed post must succeed.
    async fn remove_post(&self, post: &Post, reason_id: &str, note: &str) -> Result<(), PlatformError>;

    /// Post the public removal notice on `post`.
    async fn notify_removal(&self, post: &Post, message: &str) -> Result<(), PlatformError>;
}

/// Operations the cross-forum promotion sync needs.
#[async_trait]
pub trait PromotionPlatform: Send + Sync {
    async fn top_post_of_week(&self, forum: &str) -> Result<Option<Post>, PlatformError>;

    /// The post pinned in `slot` (1 or 2), or `None` when the slot is empty.
    async fn sticky(&self, forum: &str, slot: u8) -> Result<Option<Post>, PlatformError>;

    async fn set_sticky(&self, post: &Post, state: bool, bottom: bool) -> Result<(), PlatformError>;

    async fn delete_post(&self, post: &Post) -> Result<(), PlatformError>;

    /// Crosspost `post` into `forum` with replies disabled and returns the
    /// new post.
    async fn crosspost(
        &self,
        post: &Post,
        forum: &str,
        flair_id: Option<&str>,
    ) -> Result<Post, PlatformError>;

    async fn reply(&self, post: &Post, text: &str) -> Result<CommentRef, PlatformError>;

    async fn distinguish(&self, comment: &CommentRef) -> Result<(), PlatformError>;

    async fn lock(&self, post: &Post) -> Result<(), PlatformError>;

    /// Account name the client is authenticated as.
    async fn current_user(&self) -> Result<String, PlatformError>;
}
