use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};

use curator_config::AppConfig;
use curator_core::{
    Curator, ForumPlatform, PassReport, PromotionOutcome, PromotionPlatform, sync_promotion,
};
use curator_reddit::RedditClient;

pub async fn run_curation(config: &AppConfig, json: bool) -> Result<()> {
    config.moderation.check_ready()?;
    let client = RedditClient::connect(&config.reddit).await?;
    let report = curate_with(&client, config).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report_lines(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_promotion(config: &AppConfig) -> Result<()> {
    if config.moderation.dry_run {
        info!("dry run; promotion sync skipped");
        return Ok(());
    }
    let client = RedditClient::connect(&config.reddit).await?;
    promote_with(&client, config).await
}

/// One curation pass followed by the promotion sync, sharing one session.
/// A failed pass does not prevent the promotion sync; the pass error is
/// returned afterwards.
pub async fn run_once(config: &AppConfig) -> Result<()> {
    config.moderation.check_ready()?;
    let client = RedditClient::connect(&config.reddit).await?;

    let curation = curate_with(&client, config).await;
    match &curation {
        Ok(report) => {
            for line in report_lines(report) {
                println!("{line}");
            }
        }
        Err(err) => error!(error = %err, "curation pass failed"),
    }

    if config.promotion.enabled && !config.moderation.dry_run {
        promote_with(&client, config).await?;
    }
    curation.map(|_| ())
}

pub async fn run_watch(config: &AppConfig, interval_minutes: u64) -> Result<()> {
    let interval = Duration::from_secs(interval_minutes.max(1) * 60);
    info!(interval_minutes = interval.as_secs() / 60, "watching forum");

    loop {
        if let Err(err) = run_once(config).await {
            error!(error = %err, "pass failed; waiting for the next interval");
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; stopping");
                return Ok(());
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

async fn curate_with<P>(platform: &P, config: &AppConfig) -> Result<PassReport>
where
    P: ForumPlatform + ?Sized,
{
    let report = Curator::new(platform, config).run_pass(Utc::now()).await?;
    Ok(report)
}

async fn promote_with<P>(platform: &P, config: &AppConfig) -> Result<()>
where
    P: PromotionPlatform + ?Sized,
{
    let outcome = sync_promotion(platform, &config.forum.name, &config.promotion).await?;
    println!("{}", outcome_line(&outcome));
    Ok(())
}

fn report_lines(report: &PassReport) -> Vec<String> {
    let mut lines = Vec::new();
    for evaluation in &report.evaluations {
        lines.push(evaluation.summary());
        lines.push(format!("action: {}", evaluation.action));
        lines.push("----".to_string());
    }
    let mode = if report.dry_run { " (dry run)" } else { "" };
    lines.push(format!(
        "evaluated {} · kept {} · removed {} · failed {}{mode}",
        report.evaluated,
        report.kept,
        report.removed,
        report.failures.len()
    ));
    for failure in &report.failures {
        lines.push(format!("  {}: {}", failure.post_id, failure.error));
    }
    lines
}

fn outcome_line(outcome: &PromotionOutcome) -> String {
    match outcome {
        PromotionOutcome::NothingToPromote => "promotion: nothing to promote".to_string(),
        PromotionOutcome::AlreadyPromoted { source_id } => {
            format!("promotion: {source_id} already pinned")
        }
        PromotionOutcome::Promoted {
            source_id,
            crosspost_id,
            replaced,
        } => match replaced {
            Some(old) => format!("promotion: pinned {crosspost_id} (from {source_id}), replaced {old}"),
            None => format!("promotion: pinned {crosspost_id} (from {source_id})"),
        },
    }
}
