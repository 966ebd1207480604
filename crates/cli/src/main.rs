use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::server;
use std::net::SocketAddr;
use storage::VideoStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use video_tagger_core::config::{self, AppConfig};
use video_tagger_core::indexer;
use video_tagger_core::tagging::TaggingService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("invalid configuration")?;

    match cli.command {
        Commands::Serve { bind } => run_serve(cfg, bind).await,
        Commands::Index { json } => run_index(cfg, json).await,
        Commands::Stats { json } => run_stats(cfg, json).await,
    }
}

#[derive(Parser)]
#[command(name = "video-tagger")]
#[command(about = "Tag a folder of videos one clip at a time", long_about = None)]
struct Cli {
    /// Path to config file (environment variables override it)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the video folder, then serve the tagging UI
    Serve {
        /// Override the listen address, e.g. 0.0.0.0:8000
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Index the video folder and exit
    Index {
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Print annotation progress
    Stats {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

async fn open_store(cfg: &AppConfig) -> Result<VideoStore> {
    let pool = storage::connect(&cfg.database_url)
        .await
        .context("db connect")?;
    storage::migrate(&pool).await.context("db migrate")?;
    Ok(VideoStore::new(pool))
}

async fn run_serve(cfg: AppConfig, bind: Option<SocketAddr>) -> Result<()> {
    let store = open_store(&cfg).await?;

    // Indexing is best-effort: a failed pass still leaves the UI usable for
    // whatever was indexed before.
    match indexer::index_videos(&cfg, &store).await {
        Ok(summary) => info!(added = summary.added, "index ready"),
        Err(e) => error!("Error during video indexing: {}", e),
    }

    let addr = bind.unwrap_or(cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    let service = TaggingService::new(store, &cfg);
    let router = server::create_router(service, cfg.static_dir.clone());
    server::serve(listener, router).await.context("http server")?;
    Ok(())
}

async fn run_index(cfg: AppConfig, json: bool) -> Result<()> {
    let store = open_store(&cfg).await?;
    let summary = indexer::index_videos(&cfg, &store)
        .await
        .context("indexing failed")?;
    if json {
        let summary_json = serde_json::json!({
            "status": "ok",
            "root": cfg.video_root,
            "discovered": summary.discovered,
            "added": summary.added,
            "skipped": summary.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&summary_json)?);
    } else {
        println!(
            "index: discovered {}, added {}, skipped {}",
            summary.discovered, summary.added, summary.skipped
        );
    }
    Ok(())
}

async fn run_stats(cfg: AppConfig, json: bool) -> Result<()> {
    let store = open_store(&cfg).await?;
    let stats = TaggingService::new(store, &cfg).stats().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "total {}, annotated {}, unannotated {}",
            stats.total_videos, stats.annotated_videos, stats.unannotated_videos
        );
    }
    Ok(())
}
