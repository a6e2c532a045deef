use clap::Parser;
use dotenvy::dotenv;
use oh_datauploader::infrastructure::store;
use oh_datauploader::services::sync_job::{
    DemoDataSource, EnvSessionProvider, ExistingDataSource, JobOutcome, LoggingScheduler, SyncJob,
};
use oh_datauploader::{JobConfig, StoreConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Open Humans project member id to sync
    #[arg(short, long)]
    member_id: String,

    /// Payload source (demo, existing)
    #[arg(short, long, default_value = "demo")]
    source: String,

    /// Override the remote basename of the uploaded file
    #[arg(short, long)]
    basename: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oh_datauploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Open Humans data sync for {}...", args.member_id);

    let store_config = StoreConfig::from_env();
    let mut job_config = JobConfig::from_env();
    if let Some(basename) = args.basename {
        job_config.file_basename = basename;
    }

    let client = store::setup_store(store_config)?;

    let source: Arc<dyn oh_datauploader::DataSource> = match args.source.as_str() {
        "existing" => {
            let tag = job_config
                .metadata_tags
                .first()
                .cloned()
                .unwrap_or_else(|| "sync".to_string());
            Arc::new(ExistingDataSource::new(client.clone(), tag))
        }
        _ => Arc::new(DemoDataSource),
    };

    let job = SyncJob::new(
        Arc::new(EnvSessionProvider),
        source,
        client,
        Arc::new(LoggingScheduler),
        job_config,
    );

    match job.process(&args.member_id).await? {
        JobOutcome::Done => info!("✅ Sync completed for {}", args.member_id),
        JobOutcome::Rescheduled => info!("⏳ Sync rate limited; run again later"),
    }

    Ok(())
}
