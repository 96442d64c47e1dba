use std::net::SocketAddr;
use std::sync::Arc;

use rivulet::common::HttpClient;
use rivulet::common::logger;
use rivulet::configs::Config;
use rivulet::library::MediaLibrary;
use rivulet::segmenter::Segmenter;
use rivulet::server::AppState;
use rivulet::session::{HttpEngineFactory, SessionRegistry};
use rivulet::transport;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::load()?;
    logger::init(&config);

    std::fs::create_dir_all(&config.storage.upload_dir)?;
    std::fs::create_dir_all(&config.storage.segments_dir)?;

    // The default engine streams from this server's own endpoints.
    let engine_base = format!("http://127.0.0.1:{}", config.server.port);
    let factory = Arc::new(HttpEngineFactory::new(
        HttpClient::new()?,
        engine_base,
        config.playback.ready_delay(),
    ));

    let state = Arc::new(AppState {
        registry: SessionRegistry::new(factory, config.playback.clone()),
        library: MediaLibrary::new(config.storage.segments_dir.clone()),
        segmenter: Segmenter::new(config.segmenter.clone()),
        config,
    });

    let app = transport::http_server::router(state.clone());

    let address: SocketAddr =
        format!("{}:{}", state.config.server.host, state.config.server.port).parse()?;
    info!("rivulet listening on {}", address);

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, releasing media sessions");
    state.registry.release_all();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
