mod inspect_cmds;
mod pass_cmds;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use curator_config::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "curator",
    version,
    about = "Removes new forum posts that fall behind a time-weighted popularity target"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one curation pass, then the promotion sync when enabled.
    Run {
        #[arg(long)]
        dry_run: bool,
    },
    /// Run one curation pass only.
    Curate {
        /// Override `forum.fetch_limit`.
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        dry_run: bool,
        /// Print the pass report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Sync the companion forum's weekly top post into the main forum.
    Promote,
    /// Repeat `run` on a fixed interval until interrupted.
    Watch {
        #[arg(long, default_value_t = 10)]
        interval_minutes: u64,
        #[arg(long)]
        dry_run: bool,
    },
    /// Evaluate a synthetic post offline.
    Evaluate {
        /// Creation time, Unix seconds (UTC).
        #[arg(long)]
        created_at: i64,
        #[arg(long, allow_hyphen_values = true)]
        score: i64,
        #[arg(long)]
        comments: Option<i64>,
        /// Evaluation time, Unix seconds (UTC).  Defaults to now.
        #[arg(long)]
        now: Option<i64>,
        #[arg(long, default_value = "manual")]
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the target schedule for a list of adjusted ages.
    Targets {
        /// Adjusted minutes to tabulate.
        #[arg(long, value_delimiter = ',')]
        minutes: Vec<i64>,
    },
    /// Show the effective configuration.
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    init_tracing(&config);
    config.validate()?;

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => {
            config.moderation.dry_run |= dry_run;
            pass_cmds::run_once(&config).await?;
        }
        Commands::Curate {
            limit,
            dry_run,
            json,
        } => {
            if let Some(limit) = limit {
                config.forum.fetch_limit = limit;
            }
            config.moderation.dry_run |= dry_run;
            pass_cmds::run_curation(&config, json).await?;
        }
        Commands::Promote => {
            pass_cmds::run_promotion(&config).await?;
        }
        Commands::Watch {
            interval_minutes,
            dry_run,
        } => {
            config.moderation.dry_run |= dry_run;
            pass_cmds::run_watch(&config, interval_minutes).await?;
        }
        Commands::Evaluate {
            created_at,
            score,
            comments,
            now,
            id,
            json,
        } => {
            let input = inspect_cmds::EvaluateInput {
                id,
                created_at,
                score,
                comments,
                now,
            };
            inspect_cmds::run_evaluate(&config, input, json)?;
        }
        Commands::Targets { minutes } => {
            inspect_cmds::run_targets(&config, &minutes);
        }
        Commands::Doctor => {
            inspect_cmds::run_doctor(&config, &cli.config);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured `[telemetry] log_level`.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
