//! Keep/remove decision for a single post snapshot.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use curator_config::{EligibilityConfig, ScoringConfig};

use crate::post::Post;
use crate::score::ScoreBreakdown;
use crate::target::calculate_target;
use crate::time::Exposure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Keep,
    Remove,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every derived value for one post at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub post_id: String,
    pub elapsed_minutes: i64,
    pub adjusted_minutes: i64,
    pub num_comments: Option<i64>,
    pub direct_score: i64,
    pub discussion_score: i64,
    pub combined_score: i64,
    pub target_score: i64,
    pub eligible: bool,
    pub action: Action,
}

impl Evaluation {
    /// Multi-line audit summary used in moderator notes, removal notices and
    /// the CLI.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {}", self.post_id)?;
        writeln!(f, "min: {}", self.elapsed_minutes)?;
        writeln!(f, "amin: {}", self.adjusted_minutes)?;
        match self.num_comments {
            Some(count) => writeln!(f, "nc: {count}")?,
            None => writeln!(f, "nc: ?")?,
        }
        writeln!(
            f,
            "sc: s{}+d{}=c{}",
            self.direct_score, self.discussion_score, self.combined_score
        )?;
        write!(f, "ts: {}", self.target_score)
    }
}

/// `true` when `adjusted_minutes` falls inside the inclusive removal window.
pub fn is_eligible(adjusted_minutes: i64, window: &EligibilityConfig) -> bool {
    (window.min_minutes..=window.max_minutes).contains(&adjusted_minutes)
}

/// Derive every value for `post` as of `now`.
///
/// Posts outside the eligibility window are always kept; inside it a post is
/// removed when its combined score is strictly below the target.
pub fn evaluate(post: &Post, now: DateTime<Utc>, scoring: &ScoringConfig) -> Evaluation {
    let exposure = Exposure::measure(post.created_utc, now, &scoring.activity);
    let scores = ScoreBreakdown::of(post);
    let target_score = calculate_target(exposure.adjusted_minutes, &scoring.target);
    let eligible = is_eligible(exposure.adjusted_minutes, &scoring.eligibility);

    let action = if eligible && scores.combined() < target_score {
        Action::Remove
    } else {
        Action::Keep
    };

    Evaluation {
        post_id: post.id.clone(),
        elapsed_minutes: exposure.elapsed_minutes,
        adjusted_minutes: exposure.adjusted_minutes,
        num_comments: post.num_comments,
        direct_score: scores.direct,
        discussion_score: scores.discussion,
        combined_score: scores.combined(),
        target_score,
        eligible,
        action,
    }
}

pub fn should_remove(post: &Post, now: DateTime<Utc>, scoring: &ScoringConfig) -> bool {
    submission_action(post, now, scoring) == Action::Remove
}

pub fn submission_action(post: &Post, now: DateTime<Utc>, scoring: &ScoringConfig) -> Action {
    evaluate(post, now, scoring).action
}
