//! Offline commands: nothing here talks to the platform.

use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

use curator_config::{AppConfig, ScoringConfig};
use curator_core::decision::is_eligible;
use curator_core::{Evaluation, Post, calculate_target, evaluate};

const DEFAULT_TARGET_ROWS: [i64; 9] = [0, 30, 60, 120, 200, 240, 360, 720, 1440];

pub struct EvaluateInput {
    pub id: String,
    pub created_at: i64,
    pub score: i64,
    pub comments: Option<i64>,
    pub now: Option<i64>,
}

pub fn run_evaluate(config: &AppConfig, input: EvaluateInput, json: bool) -> Result<()> {
    let now = match input.now {
        Some(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| anyhow!("--now {secs} is out of range"))?,
        None => Utc::now(),
    };
    let evaluation = evaluate_synthetic(&input, now, &config.scoring);
    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        println!("{}", evaluation.summary());
        println!("eligible: {}", evaluation.eligible);
        println!("action: {}", evaluation.action);
    }
    Ok(())
}

pub fn run_targets(config: &AppConfig, minutes: &[i64]) {
    let minutes = if minutes.is_empty() {
        &DEFAULT_TARGET_ROWS[..]
    } else {
        minutes
    };
    println!("{:>8}  {:>8}  {}", "amin", "target", "window");
    for (amin, target, eligible) in target_rows(&config.scoring, minutes) {
        let window = if eligible { "eligible" } else { "-" };
        println!("{amin:>8}  {target:>8}  {window}");
    }
}

pub fn run_doctor(config: &AppConfig, path: &Path) {
    let status = if path.exists() { "" } else { " (not found, defaults)" };
    println!("config file      {}{status}", path.display());
    println!("forum            r/{}", config.forum.name);
    println!("fetch limit      {}", config.forum.fetch_limit);
    println!("api base url     {}", config.reddit.api_base_url);
    println!("user agent       {}", config.reddit.user_agent);
    println!("client id        {}", mask(&config.reddit.client_id));
    println!("client secret    {}", mask(&config.reddit.client_secret));
    println!("username         {}", display_or_unset(&config.reddit.username));
    println!("password         {}", mask(&config.reddit.password));
    println!("removal reason   {}", display_or_unset(&config.moderation.removal_reason_id));
    println!("dry run          {}", config.moderation.dry_run);

    let scoring = &config.scoring;
    println!(
        "activity         peak from {:02}:00 UTC, weights {} / {}",
        scoring.activity.peak_start_hour, scoring.activity.off_peak_weight, scoring.activity.peak_weight
    );
    println!(
        "window           {}..={} adjusted minutes",
        scoring.eligibility.min_minutes, scoring.eligibility.max_minutes
    );
    if config.promotion.enabled {
        println!("promotion        r/{} -> r/{}", config.promotion.source_forum, config.forum.name);
    } else {
        println!("promotion        disabled");
    }
    match config.moderation.check_ready() {
        Ok(()) if config.reddit.has_credentials() => println!("status           ready"),
        Ok(()) => println!("status           missing reddit credentials"),
        Err(err) => println!("status           {err}"),
    }
}

fn evaluate_synthetic(input: &EvaluateInput, now: DateTime<Utc>, scoring: &ScoringConfig) -> Evaluation {
    let post = Post {
        id: input.id.clone(),
        title: String::new(),
        author: None,
        url: String::new(),
        permalink: String::new(),
        created_utc: input.created_at,
        score: input.score,
        num_comments: input.comments,
        removed: false,
    };
    evaluate(&post, now, scoring)
}

fn target_rows(scoring: &ScoringConfig, minutes: &[i64]) -> Vec<(i64, i64, bool)> {
    minutes
        .iter()
        .map(|&amin| {
            let target = calculate_target(amin, &scoring.target);
            (amin, target, is_eligible(amin, &scoring.eligibility))
        })
        .collect()
}

fn mask(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return "(unset)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn display_or_unset(value: &str) -> &str {
    if value.trim().is_empty() { "(unset)" } else { value }
}
