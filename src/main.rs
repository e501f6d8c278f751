//! u-timetable: course timetabling CLI and HTTP server.
//!
//! # Usage
//!
//! ```text
//! u-timetable solve --snapshot term.json --config u-timetable.toml
//! u-timetable serve --bind 127.0.0.1:8080
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use u_timetable::config::{AppConfig, EngineConfig};
use u_timetable::engine::{generate_from_source, GenerateResult};
use u_timetable::http::{build_router, ApiState};
use u_timetable::snapshot::JsonFileSource;

#[derive(Parser)]
#[command(name = "u-timetable", about = "Course timetable generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a timetable from a JSON snapshot and print the result.
    Solve {
        /// Snapshot exported by the entity repository.
        #[arg(long)]
        snapshot: PathBuf,

        /// TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Wall-clock budget, overriding the configuration.
        #[arg(long)]
        time_limit_ms: Option<u64>,
    },
    /// Serve the HTTP API.
    Serve {
        /// Address to listen on, overriding the configuration.
        #[arg(long)]
        bind: Option<String>,

        /// TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,u_timetable=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Solve {
            snapshot,
            config,
            time_limit_ms,
        } => run_solve(&snapshot, config.as_deref(), time_limit_ms),
        Command::Serve { bind, config } => {
            run_serve(bind, config.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn run_solve(snapshot: &Path, config: Option<&Path>, time_limit_ms: Option<u64>) -> anyhow::Result<ExitCode> {
    let mut engine: EngineConfig = load_config(config)?.engine;
    if let Some(ms) = time_limit_ms {
        engine = engine.with_time_limit_ms(ms);
    }

    let result = generate_from_source(&JsonFileSource::new(snapshot), &engine);
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(match result {
        GenerateResult::Ok { .. } => ExitCode::SUCCESS,
        GenerateResult::Infeasible { .. } => ExitCode::from(2),
        GenerateResult::Error { .. } => ExitCode::FAILURE,
    })
}

async fn run_serve(bind: Option<String>, config: Option<&Path>) -> anyhow::Result<()> {
    let AppConfig { engine, mut server } = load_config(config)?;
    if let Some(bind) = bind {
        server.bind = bind;
    }

    let router = build_router(ApiState::new(engine, &server));
    let listener = tokio::net::TcpListener::bind(&server.bind)
        .await
        .with_context(|| format!("binding {}", server.bind))?;
    info!(
        addr = %server.bind,
        max_concurrent_solves = server.max_concurrent_solves,
        "API server starting"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
