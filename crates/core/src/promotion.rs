//! Keeps the companion forum's weekly top post pinned in the main forum.
//!
//! The sync is idempotent: when the pinned post already points at the
//! current weekly top post nothing is written.

use serde::Serialize;
use tracing::{debug, info};

use curator_config::PromotionConfig;

use crate::error::PlatformError;
use crate::platform::PromotionPlatform;
use crate::post::Post;

/// Slots checked for an existing promotion, in order.
const STICKY_SLOTS: [u8; 2] = [2, 1];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromotionOutcome {
    NothingToPromote,
    AlreadyPromoted {
        source_id: String,
    },
    Promoted {
        source_id: String,
        crosspost_id: String,
        /// Sticky that was un-pinned to make room, if any.
        replaced: Option<String>,
    },
}

pub async fn sync_promotion<P>(
    platform: &P,
    main_forum: &str,
    config: &PromotionConfig,
) -> Result<PromotionOutcome, PlatformError>
where
    P: PromotionPlatform + ?Sized,
{
    let Some(source) = platform.top_post_of_week(&config.source_forum).await? else {
        debug!(forum = %config.source_forum, "no weekly top post to promote");
        return Ok(PromotionOutcome::NothingToPromote);
    };

    let mut replaced = None;
    if let Some(sticky) = current_sticky(platform, main_forum).await? {
        if points_at(&sticky, &source) {
            debug!(source_id = %source.id, sticky_id = %sticky.id, "weekly top post already promoted");
            return Ok(PromotionOutcome::AlreadyPromoted {
                source_id: source.id,
            });
        }

        platform.set_sticky(&sticky, false, false).await?;
        let me = platform.current_user().await?;
        if sticky.author.as_deref() == Some(me.as_str()) {
            platform.delete_post(&sticky).await?;
            info!(sticky_id = %sticky.id, title = %sticky.title, "removed previous promotion");
        } else {
            info!(sticky_id = %sticky.id, "un-pinned sticky to make room");
        }
        replaced = Some(sticky.id);
    }

    let flair_id = Some(config.flair_id.as_str()).filter(|flair| !flair.is_empty());
    let crosspost = platform.crosspost(&source, main_forum, flair_id).await?;
    platform.set_sticky(&crosspost, true, true).await?;

    let discussion_url = if source.permalink.is_empty() {
        &source.url
    } else {
        &source.permalink
    };
    let link = config.discussion_link_template.replace("{url}", discussion_url);
    let reply = platform.reply(&crosspost, &link).await?;
    platform.distinguish(&reply).await?;
    platform.lock(&crosspost).await?;

    info!(
        source_id = %source.id,
        crosspost_id = %crosspost.id,
        title = %source.title,
        "promoted weekly top post"
    );
    Ok(PromotionOutcome::Promoted {
        source_id: source.id,
        crosspost_id: crosspost.id,
        replaced,
    })
}

/// A crosspost's url is its source's permalink; a text post's url is its own
/// permalink.  Either way a matching url means `sticky` already shows `source`.
fn points_at(sticky: &Post, source: &Post) -> bool {
    sticky.url == source.url || (!source.permalink.is_empty() && sticky.url == source.permalink)
}

/// The sticky in the bottom slot, falling back to the top slot.
async fn current_sticky<P>(platform: &P, forum: &str) -> Result<Option<Post>, PlatformError>
where
    P: PromotionPlatform + ?Sized,
{
    for slot in STICKY_SLOTS {
        match platform.sticky(forum, slot).await {
            Ok(Some(post)) => return Ok(Some(post)),
            Ok(None) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}
