//! Combined popularity score.
//!
//! Discussion is scored from the comment count alone:
//! `floor(num_comments ^ 1.5)`.  This rewards comment volume super-linearly
//! and needs no comment-tree traversal.

use crate::post::Post;

/// Discussion score for a comment count.  Missing or negative counts
/// contribute nothing.
pub fn discussion_score(num_comments: Option<i64>) -> i64 {
    match num_comments {
        // floor(n^1.5) == isqrt(n^3), exact for every count that fits.
        Some(count) if count > 0 => match count.checked_pow(3) {
            Some(cubed) => cubed.isqrt(),
            None => (count as f64).powf(1.5).floor() as i64,
        },
        _ => 0,
    }
}

/// Direct and discussion scores of one post snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub direct: i64,
    pub discussion: i64,
}

impl ScoreBreakdown {
    pub fn of(post: &Post) -> Self {
        Self {
            direct: post.score,
            discussion: discussion_score(post.num_comments),
        }
    }

    /// `direct + discussion`, unclamped.
    pub fn combined(&self) -> i64 {
        self.direct + self.discussion
    }
}
