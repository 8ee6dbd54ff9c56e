//! Popularity target a post must reach for its adjusted age.

use chrono::{DateTime, Utc};

use curator_config::{ActivityConfig, TargetConfig};

use crate::error::{CurateError, Result};
use crate::post::Post;
use crate::time::Exposure;

/// Required combined score after `adjusted_minutes` of adjusted exposure.
///
/// Below the grace period the target is the fixed floor.  Otherwise the age
/// is capped, one point is expected per `minutes_per_point`, and that base is
/// scaled by `1 + m / multiplier_horizon_minutes`.  The product is computed
/// in integers (`base * (H + m) / H`) so fixture values are exact.
pub fn calculate_target(adjusted_minutes: i64, policy: &TargetConfig) -> i64 {
    if adjusted_minutes < policy.grace_minutes {
        return policy.floor_target;
    }

    let minutes = adjusted_minutes.min(policy.cap_minutes);
    let horizon = policy.multiplier_horizon_minutes.max(1);
    let base = minutes / policy.minutes_per_point.max(1);
    let target = base * (horizon + minutes) / horizon;
    target.max(policy.floor_target)
}

/// What a target can be derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetInput<'a> {
    pub adjusted_minutes: Option<i64>,
    pub post: Option<&'a Post>,
}

impl<'a> TargetInput<'a> {
    pub fn minutes(adjusted_minutes: i64) -> Self {
        Self {
            adjusted_minutes: Some(adjusted_minutes),
            post: None,
        }
    }

    pub fn post(post: &'a Post) -> Self {
        Self {
            adjusted_minutes: None,
            post: Some(post),
        }
    }
}

/// Target for either an explicit adjusted age or a post measured at `now`.
///
/// An explicit age wins when both are given.  Supplying neither is a caller
/// bug and is reported, never defaulted.
pub fn target_for(
    input: TargetInput<'_>,
    now: DateTime<Utc>,
    curve: &ActivityConfig,
    policy: &TargetConfig,
) -> Result<i64> {
    let adjusted = match (input.adjusted_minutes, input.post) {
        (Some(minutes), _) => minutes,
        (None, Some(post)) => Exposure::measure(post.created_utc, now, curve).adjusted_minutes,
        (None, None) => return Err(CurateError::MissingTargetInput),
    };
    Ok(calculate_target(adjusted, policy))
}
