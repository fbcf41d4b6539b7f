use anyhow::{Context, Result};
use bench_core::{
    connect_pool, render_report, reset_schema, run_updates, Config, LatencyRecorder,
    LatencySummary, MockUpdateTarget, PgUpdateTarget, UpdateTarget, WorkerReport,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bench")]
#[command(about = "Measures single-row update latency under concurrent write load")]
struct Args {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Postgres connection string (overrides config)
    #[arg(long)]
    conn: Option<String>,

    /// Number of concurrent workers (overrides config)
    #[arg(long)]
    concurrency: Option<u32>,

    /// Number of updates per worker (overrides config)
    #[arg(long)]
    iterations: Option<u64>,

    /// Target mode: postgres or mock
    #[arg(long, default_value = "postgres")]
    mode: String,
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
    if let Some(concurrency) = args.concurrency {
        config.run.concurrency = concurrency;
    }
    if let Some(iterations) = args.iterations {
        config.run.iterations = iterations;
    }
    config.validate()?;

    let target: Arc<dyn UpdateTarget> = match args.mode.as_str() {
        "mock" => Arc::new(MockUpdateTarget::new(Duration::from_micros(500))), // 500us simulated latency
        "postgres" => {
            let pool = connect_pool(&config.database.url, config.run.concurrency).await?;
            reset_schema(&pool).await.context("Failed to set up table")?;
            Arc::new(PgUpdateTarget::new(pool))
        }
        _ => anyhow::bail!("Invalid mode: {}, must be 'postgres' or 'mock'", args.mode),
    };

    info!(
        "Starting run against '{}' target: {} workers x {} updates each",
        target.name(),
        config.run.concurrency,
        config.run.iterations
    );

    let summary = run_benchmark(target, config.run.concurrency, config.run.iterations).await?;

    if summary.samples == 0 {
        warn!("No latency samples were recorded; reporting zeros");
    }

    println!();
    println!("{}", render_report(&summary));

    Ok(())
}

/// Fan out the workers, wait for every one of them, then read the final
/// distribution once all writers are done.
async fn run_benchmark(
    target: Arc<dyn UpdateTarget>,
    concurrency: u32,
    iterations: u64,
) -> Result<LatencySummary> {
    let recorder = Arc::new(Mutex::new(LatencyRecorder::new()?));
    let start = Instant::now();

    let mut handles = Vec::with_capacity(concurrency as usize);
    for worker_id in 0..concurrency {
        handles.push(tokio::spawn(run_updates(
            worker_id,
            target.clone(),
            iterations,
            recorder.clone(),
        )));
    }

    let mut totals = WorkerReport::default();
    for handle in handles {
        let report = handle.await.context("worker task panicked")??;
        totals.completed += report.completed;
        totals.failed += report.failed;
    }

    info!(
        "Run complete: attempted={} completed={} failed={} duration_ms={}",
        concurrency as u64 * iterations,
        totals.completed,
        totals.failed,
        start.elapsed().as_millis()
    );

    let summary = recorder.lock().await.summary();
    Ok(summary)
}
