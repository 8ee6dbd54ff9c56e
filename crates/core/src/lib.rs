//! Scoring and decision engine for new-post curation.
//!
//! A post's age is re-weighted by a diurnal activity curve ([`time`]), turned
//! into a popularity target ([`target`]), compared against its direct plus
//! discussion score ([`score`]) inside an eligibility window ([`decision`]),
//! and the resulting [`Action`] is applied through a [`ForumPlatform`]
//! ([`executor`]).

pub mod curator;
pub mod decision;
pub mod error;
pub mod executor;
pub mod platform;
pub mod post;
pub mod promotion;
pub mod score;
pub mod target;
pub mod time;

#[cfg(test)]
mod fake;

pub use curator::{Curator, PassReport, PostFailure};
pub use decision::{Action, Evaluation, evaluate, should_remove, submission_action};
pub use error::{CurateError, PlatformError};
pub use executor::execute;
pub use platform::{ForumPlatform, PromotionPlatform};
pub use post::{CommentRef, Post};
pub use promotion::{PromotionOutcome, sync_promotion};
pub use score::{ScoreBreakdown, discussion_score};
pub use target::{TargetInput, calculate_target, target_for};
pub use time::{Exposure, adjusted_elapsed_minutes, elapsed_minutes};
