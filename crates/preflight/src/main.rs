use anyhow::{Context, Result};
use bench_core::{connect_pool, Config};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "preflight")]
#[command(about = "Preflight checks for the benchmark database (connect/round-trip/version)")]
struct Args {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Postgres connection string (overrides config)
    #[arg(long)]
    conn: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };
    if let Some(conn) = args.conn {
        config.database.url = conn;
    }

    println!();
    println!("=== Preflight ===");

    let start = Instant::now();
    let pool = connect_pool(&config.database.url, 1).await?;
    println!("connect     -> OK ({}ms)", start.elapsed().as_millis());

    let mut failures = 0u64;

    let start = Instant::now();
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => println!("SELECT 1    -> OK ({}ms)", start.elapsed().as_millis()),
        Err(e) => {
            println!("SELECT 1    -> ERROR ({}ms)", start.elapsed().as_millis());
            warn!("Round-trip check failed: {}", e);
            failures += 1;
        }
    }

    let start = Instant::now();
    match sqlx::query_scalar::<_, String>("SELECT version()")
        .fetch_one(&pool)
        .await
    {
        Ok(version) => {
            println!("version()   -> OK ({}ms)", start.elapsed().as_millis());
            println!("Server: {}", version);
        }
        Err(e) => {
            println!("version()   -> ERROR ({}ms)", start.elapsed().as_millis());
            warn!("Version check failed: {}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("Preflight failed: {failures} required check(s) failed");
    }

    println!();
    println!("Preflight OK.");
    Ok(())
}
