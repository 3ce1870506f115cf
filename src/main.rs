use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peer_bench::api::state::AppState;
use peer_bench::config::AppConfig;
use peer_bench::engine::Engine;
use peer_bench::models::MatchCriteria;
use peer_bench::parse_test_numbers;
use peer_bench::provider::http::{HttpPeerProvider, HttpProviderConfig};

#[derive(Parser)]
#[command(name = "peer-bench")]
#[command(about = "Peer-group benchmarking engine for golf training metrics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show the resolved peer group for a player
    PeerGroup {
        /// Player identifier
        #[arg(long)]
        player_id: String,

        /// Test number to pull metrics for
        #[arg(long)]
        test_number: Option<u32>,

        /// Max peers to return
        #[arg(long)]
        limit: Option<u32>,

        /// Skill category filter (e.g. "ELITE")
        #[arg(long)]
        category: Option<String>,

        /// Gender filter
        #[arg(long)]
        gender: Option<String>,

        /// Minimum age (inclusive)
        #[arg(long)]
        age_min: Option<u32>,

        /// Maximum age (inclusive)
        #[arg(long)]
        age_max: Option<u32>,

        /// Minimum handicap (inclusive)
        #[arg(long)]
        handicap_min: Option<f64>,

        /// Maximum handicap (inclusive)
        #[arg(long)]
        handicap_max: Option<f64>,
    },

    /// Compare a player against their peers for one test
    Compare {
        /// Player identifier
        #[arg(long)]
        player_id: String,

        /// Test number to benchmark
        #[arg(long)]
        test_number: u32,

        /// Skill category filter (e.g. "ELITE")
        #[arg(long)]
        category: Option<String>,

        /// Gender filter
        #[arg(long)]
        gender: Option<String>,

        /// Minimum age (inclusive)
        #[arg(long)]
        age_min: Option<u32>,

        /// Maximum age (inclusive)
        #[arg(long)]
        age_max: Option<u32>,

        /// Minimum handicap (inclusive)
        #[arg(long)]
        handicap_min: Option<f64>,

        /// Maximum handicap (inclusive)
        #[arg(long)]
        handicap_max: Option<f64>,
    },

    /// Compare a player across several tests at once
    MultiLevel {
        /// Player identifier
        #[arg(long)]
        player_id: String,

        /// Comma-separated test numbers (e.g. "1,2,3")
        #[arg(long)]
        test_numbers: String,

        /// Skill category filter (e.g. "ELITE")
        #[arg(long)]
        category: Option<String>,

        /// Gender filter
        #[arg(long)]
        gender: Option<String>,

        /// Minimum age (inclusive)
        #[arg(long)]
        age_min: Option<u32>,

        /// Maximum age (inclusive)
        #[arg(long)]
        age_max: Option<u32>,

        /// Minimum handicap (inclusive)
        #[arg(long)]
        handicap_min: Option<f64>,

        /// Maximum handicap (inclusive)
        #[arg(long)]
        handicap_max: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting peer-bench v{}", env!("CARGO_PKG_VERSION"));

    let config_path = PathBuf::from(&cli.config);
    let config = if config_path.exists() {
        AppConfig::from_file(&config_path)?
    } else {
        tracing::debug!("No config file at {:?}, using defaults", config_path);
        AppConfig::default()
    };

    let provider = HttpPeerProvider::new(HttpProviderConfig {
        base_url: url::Url::parse(&config.provider.base_url)?,
        timeout: Duration::from_secs(config.provider.timeout_seconds),
        ..Default::default()
    })?;
    let engine = Arc::new(Engine::new(Arc::new(provider), config.engine.clone()));

    match cli.command {
        Commands::Serve { host, port } => {
            let state = AppState {
                engine: engine.clone(),
            };
            let app = peer_bench::api::build_router(state, &config.server.cors_origin);

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API server: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::PeerGroup {
            player_id,
            test_number,
            limit,
            category,
            gender,
            age_min,
            age_max,
            handicap_min,
            handicap_max,
        } => {
            let explicit = MatchCriteria {
                category,
                gender,
                age_min,
                age_max,
                handicap_min,
                handicap_max,
            };

            match engine
                .peer_group(&player_id, &explicit, test_number, limit)
                .await
            {
                Ok((criteria, peers)) => {
                    println!("=== Peer Group ({} peers) ===\n", peers.len());
                    println!("Criteria: {}", serde_json::to_string(&criteria)?);
                    for peer in &peers {
                        println!(
                            "  {} — age {}, handicap {}",
                            peer.name,
                            peer.age.map(|a| a.to_string()).unwrap_or_else(|| "?".to_string()),
                            peer.handicap
                                .map(|h| format!("{:.1}", h))
                                .unwrap_or_else(|| "?".to_string()),
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("Peer group query failed: {}", e);
                }
            }
        }
        Commands::Compare {
            player_id,
            test_number,
            category,
            gender,
            age_min,
            age_max,
            handicap_min,
            handicap_max,
        } => {
            let explicit = MatchCriteria {
                category,
                gender,
                age_min,
                age_max,
                handicap_min,
                handicap_max,
            };

            match engine.compare_single(&player_id, test_number, &explicit).await {
                Ok((criteria, report)) => {
                    let output = serde_json::json!({
                        "playerId": player_id,
                        "criteria": criteria,
                        "report": report,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                Err(e) => {
                    tracing::error!("Comparison failed: {}", e);
                }
            }
        }
        Commands::MultiLevel {
            player_id,
            test_numbers,
            category,
            gender,
            age_min,
            age_max,
            handicap_min,
            handicap_max,
        } => {
            let Some(test_numbers) = parse_test_numbers(&test_numbers) else {
                eprintln!(
                    "Invalid --test-numbers (expected e.g. \"1,2,3\"): {}",
                    test_numbers
                );
                return Ok(());
            };

            let explicit = MatchCriteria {
                category,
                gender,
                age_min,
                age_max,
                handicap_min,
                handicap_max,
            };

            match engine
                .compare_across_levels(&player_id, &test_numbers, &explicit)
                .await
            {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    if report.failed_levels() > 0 {
                        eprintln!(
                            "\n{} of {} level(s) failed; see the per-level markers above.",
                            report.failed_levels(),
                            report.levels.len()
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("Multi-level comparison failed: {}", e);
                }
            }
        }
    }

    Ok(())
}
