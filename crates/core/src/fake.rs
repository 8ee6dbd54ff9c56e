//! In-memory platform double shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use curator_config::ScoringConfig;

use crate::decision::{Evaluation, evaluate};
use crate::error::PlatformError;
use crate::platform::{ForumPlatform, PromotionPlatform};
use crate::post::{CommentRef, Post};

/// 2024-03-09 16:00 UTC, inside the default peak window.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 16, 0, 0).unwrap()
}

pub fn sample_post(id: &str, minutes_ago: i64, score: i64, num_comments: i64) -> Post {
    Post {
        id: id.to_string(),
        title: format!("post {id}"),
        author: Some("author".to_string()),
        url: format!("https://www.reddit.com/r/test/comments/{id}/"),
        permalink: format!("https://www.reddit.com/r/test/comments/{id}/"),
        created_utc: fixed_now().timestamp() - minutes_ago * 60,
        score,
        num_comments: Some(num_comments),
        removed: false,
    }
}

pub fn evaluation_for(post: &Post) -> Evaluation {
    evaluate(post, fixed_now(), &ScoringConfig::default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Remove {
        post_id: String,
        reason_id: String,
        note: String,
    },
    Notify {
        post_id: String,
        message: String,
    },
    SetSticky {
        post_id: String,
        state: bool,
        bottom: bool,
    },
    Delete {
        post_id: String,
    },
    Crosspost {
        source_id: String,
        forum: String,
        flair_id: Option<String>,
    },
    Reply {
        post_id: String,
        text: String,
    },
    Distinguish {
        comment_id: String,
    },
    Lock {
        post_id: String,
    },
}

#[derive(Default)]
pub struct FakePlatform {
    posts: Mutex<Vec<Post>>,
    fail_fetch: bool,
    fail_notices: bool,
    failing_removals: HashSet<String>,
    top_of_week: Option<Post>,
    stickies: HashMap<u8, Post>,
    user: String,
    calls: Mutex<Vec<Call>>,
}

impl FakePlatform {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
            ..Self::default()
        }
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_notices(mut self) -> Self {
        self.fail_notices = true;
        self
    }

    pub fn failing_removal_of(mut self, post_id: &str) -> Self {
        self.failing_removals.insert(post_id.to_string());
        self
    }

    pub fn with_top_of_week(mut self, post: Post) -> Self {
        self.top_of_week = Some(post);
        self
    }

    pub fn with_sticky(mut self, slot: u8, post: Post) -> Self {
        self.stickies.insert(slot, post);
        self
    }

    pub fn signed_in_as(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn notified_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Notify { post_id, .. } => Some(post_id),
                _ => None,
            })
            .collect()
    }

    pub fn removed_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Remove { post_id, .. } => Some(post_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ForumPlatform for FakePlatform {
    async fn fetch_newest_posts(&self, _forum: &str, limit: usize) -> Result<Vec<Post>, PlatformError> {
        if self.fail_fetch {
            return Err(PlatformError::RateLimited);
        }
        let posts = self.posts.lock().unwrap();
        Ok(posts.iter().take(limit).cloned().collect())
    }

    async fn remove_post(&self, post: &Post, reason_id: &str, note: &str) -> Result<(), PlatformError> {
        if self.failing_removals.contains(&post.id) {
            return Err(PlatformError::NotFound(post.id.clone()));
        }
        self.record(Call::Remove {
            post_id: post.id.clone(),
            reason_id: reason_id.to_string(),
            note: note.to_string(),
        });
        // Later listings report the post as removed.
        for stored in self.posts.lock().unwrap().iter_mut() {
            if stored.id == post.id {
                stored.removed = true;
            }
        }
        Ok(())
    }

    async fn notify_removal(&self, post: &Post, message: &str) -> Result<(), PlatformError> {
        if self.fail_notices {
            return Err(PlatformError::Transport("connection reset".to_string()));
        }
        self.record(Call::Notify {
            post_id: post.id.clone(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl PromotionPlatform for FakePlatform {
    async fn top_post_of_week(&self, _forum: &str) -> Result<Option<Post>, PlatformError> {
        Ok(self.top_of_week.clone())
    }

    async fn sticky(&self, _forum: &str, slot: u8) -> Result<Option<Post>, PlatformError> {
        Ok(self.stickies.get(&slot).cloned())
    }

    async fn set_sticky(&self, post: &Post, state: bool, bottom: bool) -> Result<(), PlatformError> {
        self.record(Call::SetSticky {
            post_id: post.id.clone(),
            state,
            bottom,
        });
        Ok(())
    }

    async fn delete_post(&self, post: &Post) -> Result<(), PlatformError> {
        self.record(Call::Delete {
            post_id: post.id.clone(),
        });
        Ok(())
    }

    async fn crosspost(
        &self,
        post: &Post,
        forum: &str,
        flair_id: Option<&str>,
    ) -> Result<Post, PlatformError> {
        self.record(Call::Crosspost {
            source_id: post.id.clone(),
            forum: forum.to_string(),
            flair_id: flair_id.map(str::to_string),
        });
        let id = format!("x_{}", post.id);
        Ok(Post {
            author: Some(self.user.clone()),
            url: post.permalink.clone(),
            permalink: format!("https://www.reddit.com/r/{forum}/comments/{id}/"),
            id,
            ..post.clone()
        })
    }

    async fn reply(&self, post: &Post, text: &str) -> Result<CommentRef, PlatformError> {
        self.record(Call::Reply {
            post_id: post.id.clone(),
            text: text.to_string(),
        });
        Ok(CommentRef {
            id: format!("c_{}", post.id),
        })
    }

    async fn distinguish(&self, comment: &CommentRef) -> Result<(), PlatformError> {
        self.record(Call::Distinguish {
            comment_id: comment.id.clone(),
        });
        Ok(())
    }

    async fn lock(&self, post: &Post) -> Result<(), PlatformError> {
        self.record(Call::Lock {
            post_id: post.id.clone(),
        });
        Ok(())
    }

    async fn current_user(&self) -> Result<String, PlatformError> {
        Ok(self.user.clone())
    }
}
