use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use lib_gps::ingestors::GpsPollingIngestor;
use lib_gps::retrieve::FeedClient;
use lib_gps::MarkerCache;

mod gps_logic;
use gps_logic::{config, downstream, logger, state};

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = config::load_config();
    let log_path = logger::setup_logging(&loaded.settings.log_dir, &loaded.settings.log_level)?;
    log::info!("Logging to {}", log_path.display());
    loaded.log_notices();
    let settings = loaded.settings;

    let feed = FeedClient::new(&settings.feed_config())?;
    log::info!("Polling {} every {:?}", feed.url(), settings.refresh_interval);

    let cache = Arc::new(MarkerCache::new());
    let app_state = state::AppState::new(cache.clone());
    let shutdown = CancellationToken::new();

    let ingestor = GpsPollingIngestor::new(feed, cache, settings.refresh_interval);
    let upstream_handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { ingestor.run(shutdown).await }
    });

    let downstream_handle = tokio::spawn({
        let settings = settings.clone();
        let shutdown = shutdown.clone();
        async move {
            let result = downstream::run(settings, app_state, shutdown.clone()).await;
            if let Err(e) = &result {
                log::error!("Downstream server failed: {}", e);
                shutdown.cancel();
            }
            result
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = terminate() => {
            log::info!("SIGTERM received, initiating shutdown.");
        }
        _ = shutdown.cancelled() => {}
    }

    // Send shutdown signal to all components
    shutdown.cancel();

    let (upstream, downstream) = tokio::join!(upstream_handle, downstream_handle);
    upstream?;
    downstream??;

    log::info!("Shutdown complete.");
    Ok(())
}

async fn terminate() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term_signal) => {
                term_signal.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        // On non-unix platforms, just wait forever.
        std::future::pending::<()>().await;
    }
}
