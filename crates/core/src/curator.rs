//! One curation pass over a forum's newest posts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use curator_config::AppConfig;

use crate::decision::{Action, Evaluation, evaluate};
use crate::error::Result;
use crate::executor::execute;
use crate::platform::ForumPlatform;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostFailure {
    pub post_id: String,
    pub error: String,
}

/// Outcome counts for one pass.  In dry-run mode `removed` counts the posts
/// that would have been removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub dry_run: bool,
    pub evaluated: usize,
    pub kept: usize,
    pub removed: usize,
    pub failures: Vec<PostFailure>,
    pub evaluations: Vec<Evaluation>,
}

pub struct Curator<'a, P: ?Sized> {
    platform: &'a P,
    config: &'a AppConfig,
}

impl<'a, P> Curator<'a, P>
where
    P: ForumPlatform + ?Sized,
{
    pub fn new(platform: &'a P, config: &'a AppConfig) -> Self {
        Self { platform, config }
    }

    /// Fetch the newest posts and evaluate them one after another.
    ///
    /// Failing to fetch the listing fails the pass.  A failure while acting
    /// on one post is recorded and the pass moves on to the next post.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> Result<PassReport> {
        let forum = &self.config.forum;
        let moderation = &self.config.moderation;
        let posts = self
            .platform
            .fetch_newest_posts(&forum.name, forum.fetch_limit)
            .await?;

        let mut report = PassReport {
            dry_run: moderation.dry_run,
            ..PassReport::default()
        };

        for post in posts.iter().take(forum.fetch_limit) {
            let evaluation = evaluate(post, now, &self.config.scoring);
            report.evaluated += 1;
            info!(
                post_id = %post.id,
                elapsed = evaluation.elapsed_minutes,
                adjusted = evaluation.adjusted_minutes,
                combined = evaluation.combined_score,
                target = evaluation.target_score,
                action = %evaluation.action,
                "post evaluated"
            );

            let outcome = if moderation.dry_run {
                Ok(())
            } else {
                execute(evaluation.action, post, &evaluation, self.platform, moderation).await
            };

            match outcome {
                Ok(()) => match evaluation.action {
                    Action::Keep => report.kept += 1,
                    Action::Remove => report.removed += 1,
                },
                Err(err) => {
                    warn!(post_id = %post.id, error = %err, "failed to apply action");
                    report.failures.push(PostFailure {
                        post_id: post.id.clone(),
                        error: err.to_string(),
                    });
                }
            }
            report.evaluations.push(evaluation);
        }

        info!(
            forum = %forum.name,
            evaluated = report.evaluated,
            kept = report.kept,
            removed = report.removed,
            failed = report.failures.len(),
            dry_run = report.dry_run,
            "curation pass complete"
        );
        Ok(report)
    }
}
