use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

// ── Forum ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    /// Name of the moderated forum (subreddit, without the `r/` prefix).
    /// Overridden at runtime by `CURATOR_FORUM` when set.
    pub name: String,
    /// How many of the newest posts a single pass evaluates.
    pub fetch_limit: usize,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            name: "vegancirclejerk".to_string(),
            fetch_limit: 10,
        }
    }
}

// ── Platform credentials ─────────────────────────────────────────────────────

/// Reddit script-app credentials.  Every field can be supplied through the
/// matching `REDDIT_*` environment variable, which takes precedence over the
/// file so that secrets never have to be written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            user_agent: format!("rust:curator:v{}", env!("CARGO_PKG_VERSION")),
            auth_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            api_base_url: "https://oauth.reddit.com".to_string(),
            timeout_secs: 20,
        }
    }
}

impl RedditConfig {
    pub fn has_credentials(&self) -> bool {
        [
            &self.client_id,
            &self.client_secret,
            &self.username,
            &self.password,
        ]
        .iter()
        .all(|value| !value.trim().is_empty())
    }
}

// ── Moderation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Removal-reason identifier from the forum's moderation settings.
    pub removal_reason_id: String,
    /// Public removal notice.  The evaluation summary is appended to it.
    pub removal_message: String,
    /// Maximum length (in characters) of the private moderator note.
    pub note_max_chars: usize,
    /// Evaluate and log decisions without touching the platform.
    pub dry_run: bool,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            removal_reason_id: String::new(),
            removal_message: String::new(),
            note_max_chars: 100,
            dry_run: false,
        }
    }
}

impl ModerationConfig {
    /// Removal needs both opaque tokens from the platform's moderation
    /// settings; dry runs need neither.
    pub fn check_ready(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        if self.removal_reason_id.trim().is_empty() {
            bail!("moderation.removal_reason_id is empty (set it or enable dry_run)");
        }
        if self.removal_message.trim().is_empty() {
            bail!("moderation.removal_message is empty (set it or enable dry_run)");
        }
        Ok(())
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Diurnal weighting curve used to turn raw elapsed minutes into
/// activity-adjusted minutes.
///
/// Minutes whose UTC hour is below `peak_start_hour` count as
/// `off_peak_weight`, the rest as `peak_weight`.  The split uses the UTC hour
/// directly as a cheap proxy for the audience's day/night cycle; it is not
/// timezone-aware.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub peak_start_hour: u32,
    pub off_peak_weight: f64,
    pub peak_weight: f64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            peak_start_hour: 12,
            off_peak_weight: 0.6,
            peak_weight: 1.0 / 0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Posts younger than this (adjusted minutes) get `floor_target`.
    pub grace_minutes: i64,
    pub floor_target: i64,
    /// Target growth stops after this many adjusted minutes.
    pub cap_minutes: i64,
    /// One point expected per this many adjusted minutes.
    pub minutes_per_point: i64,
    /// The multiplier grows linearly from 1.0 to 2.0 over this span.
    pub multiplier_horizon_minutes: i64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            grace_minutes: 30,
            floor_target: 1,
            cap_minutes: 720,
            minutes_per_point: 10,
            multiplier_horizon_minutes: 720,
        }
    }
}

/// Adjusted-minute range (inclusive) in which a post may be removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_minutes: 60,
            max_minutes: 240,
        }
    }
}

/// The three scoring sections, grouped so the decision engine can borrow
/// them together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub activity: ActivityConfig,
    pub target: TargetConfig,
    pub eligibility: EligibilityConfig,
}

// ── Promotion ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionConfig {
    pub enabled: bool,
    /// Companion forum whose weekly top post is promoted.
    pub source_forum: String,
    /// Flair applied to the crosspost.  Empty means no flair.
    pub flair_id: String,
    /// Reply left on the crosspost.  `{url}` expands to the source post url.
    pub discussion_link_template: String,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source_forum: "vegancirclejerkchat".to_string(),
            flair_id: String::new(),
            discussion_link_template: "### Continue to the discussion [here]({url}).".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub forum: ForumConfig,
    pub reddit: RedditConfig,
    pub moderation: ModerationConfig,
    pub scoring: ScoringConfig,
    pub promotion: PromotionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        // Credentials and forum env overrides (take precedence over the file).
        for (var, slot) in [
            ("REDDIT_CLIENT_ID", &mut config.reddit.client_id),
            ("REDDIT_CLIENT_SECRET", &mut config.reddit.client_secret),
            ("REDDIT_USERNAME", &mut config.reddit.username),
            ("REDDIT_PASSWORD", &mut config.reddit.password),
            ("CURATOR_FORUM", &mut config.forum.name),
        ] {
            if let Ok(value) = env::var(var) {
                if !value.is_empty() {
                    *slot = value;
                }
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Reject scoring parameters the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let activity = &self.scoring.activity;
        if activity.peak_start_hour > 23 {
            bail!("activity.peak_start_hour must be in 0..=23");
        }
        if !(activity.off_peak_weight > 0.0 && activity.peak_weight > 0.0) {
            bail!("activity weights must be positive");
        }

        let target = &self.scoring.target;
        if target.minutes_per_point <= 0 || target.multiplier_horizon_minutes <= 0 {
            bail!("target.minutes_per_point and target.multiplier_horizon_minutes must be positive");
        }
        if target.cap_minutes < target.grace_minutes {
            bail!("target.cap_minutes must not be below target.grace_minutes");
        }

        let window = &self.scoring.eligibility;
        if window.min_minutes > window.max_minutes {
            bail!("eligibility.min_minutes must not exceed eligibility.max_minutes");
        }

        if self.forum.name.trim().is_empty() {
            bail!("forum.name is empty");
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
