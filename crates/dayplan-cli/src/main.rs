use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dayplan_cli::commands;
use dayplan_cli::config::CliConfig;
use dayplan_engine::{NoticeLevel, Session, SystemClock};
use dayplan_service::{MemoryService, TrackerService};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::parse();
    let service: Arc<dyn TrackerService> = if config.offline {
        info!("offline mode, using in-memory store");
        Arc::new(MemoryService::new())
    } else {
        info!("server: {}", config.server_url);
        Arc::new(config.http_service())
    };

    let session = Session::new(
        service,
        config.identity(),
        Arc::new(SystemClock),
        &config.engine_config(),
    );

    let result = match session.start().await {
        Ok(_) => commands::run(&session, &config.command).await,
        Err(e) => Err(e.into()),
    };

    if let Some(notice) = session.notices().current() {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
    print!("{}", result?);
    Ok(())
}
