//! Applies a decided [`Action`] through the platform.

use tracing::{debug, info};

use curator_config::ModerationConfig;

use crate::decision::{Action, Evaluation};
use crate::error::PlatformError;
use crate::platform::ForumPlatform;
use crate::post::Post;

/// Private moderator note: the summary cut to `max_chars` characters.
pub fn removal_note(evaluation: &Evaluation, max_chars: usize) -> String {
    evaluation.summary().chars().take(max_chars).collect()
}

/// Public removal notice: the configured template followed by the summary.
pub fn removal_message(evaluation: &Evaluation, template: &str) -> String {
    let summary = evaluation.summary();
    if template.is_empty() {
        return summary;
    }
    if template.ends_with('\n') {
        format!("{template}{summary}")
    } else {
        format!("{template}\n\n{summary}")
    }
}

/// Apply `action` to `post`.
///
/// `Keep` makes no platform call.  `Remove` issues exactly one removal and
/// then one public notice; if the notice fails the post stays removed and the
/// error is returned.  A post that is already removed is left alone, so a
/// later pass never repeats the removal or the notice.
pub async fn execute<P>(
    action: Action,
    post: &Post,
    evaluation: &Evaluation,
    platform: &P,
    moderation: &ModerationConfig,
) -> Result<(), PlatformError>
where
    P: ForumPlatform + ?Sized,
{
    match action {
        Action::Keep => {
            debug!(post_id = %post.id, "keeping post");
            Ok(())
        }
        Action::Remove if post.removed => {
            debug!(post_id = %post.id, "post already removed");
            Ok(())
        }
        Action::Remove => {
            let note = removal_note(evaluation, moderation.note_max_chars);
            platform
                .remove_post(post, &moderation.removal_reason_id, &note)
                .await?;
            info!(post_id = %post.id, title = %post.title, "post removed");

            let message = removal_message(evaluation, &moderation.removal_message);
            platform.notify_removal(post, &message).await?;
            debug!(post_id = %post.id, "removal notice sent");
            Ok(())
        }
    }
}
