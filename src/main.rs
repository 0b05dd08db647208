use hls_mocker::application::{Sweeper, UploadService};
use hls_mocker::clock::{Clock, SystemClock};
use hls_mocker::http::{self, AppState};
use hls_mocker::ports::storage::AssetStore;
use hls_mocker::{Config, ExpiryTracker, FfmpegExecutor, FsAdapter};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Adapters
    let store = FsAdapter::new(&config.upload_dir, &config.hls_dir);
    if let Err(e) = store.prepare().await {
        error!("Failed to create storage directories: {}", e);
        std::process::exit(1);
    }
    let store: Arc<dyn AssetStore> = Arc::new(store);
    let transcoder = Arc::new(FfmpegExecutor::new(&config.ffmpeg_bin, config.segment_seconds));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tracker = ExpiryTracker::new(config.retention());

    // 2. Sweeper, seeded with whatever a previous run left on disk
    let sweeper = Arc::new(Sweeper::new(tracker.clone(), store.clone(), clock.clone()));
    if let Err(e) = sweeper.adopt_existing().await {
        error!("Could not scan existing assets: {}", e);
    }
    sweeper.start(config.sweep_interval());
    info!(
        every_minutes = config.sweep_interval_minutes,
        retention_minutes = config.retention_minutes,
        "Cleanup sweeper started"
    );

    // 3. HTTP layer
    let uploads = UploadService::new(
        store,
        transcoder,
        tracker.clone(),
        clock.clone(),
        config.public_base_url.clone(),
    );
    let state = AppState {
        uploads: Arc::new(uploads),
        tracker,
        clock,
        hls_dir: Arc::new(config.hls_dir.clone()),
    };
    let cors = match http::cors_layer(&config.allowed_origin) {
        Ok(cors) => cors,
        Err(e) => {
            error!("Invalid ALLOWED_ORIGIN {:?}: {}", config.allowed_origin, e);
            std::process::exit(1);
        }
    };
    let app = http::router(state, cors);

    // 4. Start Server
    let listener = match tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}:{}: {}", config.addr, config.port, e);
            std::process::exit(1);
        }
    };
    info!("Listening at {}:{}", config.addr, config.port);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down");
}
