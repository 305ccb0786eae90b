use anyhow::Context;
use docsearch::api::{create_router, AppState};
use docsearch::domain::ports::{DocumentStore, Embedder, IndexLifecycle};
use docsearch::infrastructure::{
    config::DEFAULT_CONFIG_PATH, AppConfig, EmbeddingProvider, HashedEmbedding,
    InMemoryDocumentStore, QdrantDocumentStore, StoreBackend, TextEmbedding,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docsearch=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_embedder(config: &AppConfig) -> anyhow::Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.embedding.provider {
        EmbeddingProvider::Hashed => Arc::new(HashedEmbedding::new(config.embedding.dimension)),
        EmbeddingProvider::OpenAi => Arc::new(
            TextEmbedding::from_config(&config.embedding).context("creating OpenAI embedder")?,
        ),
    };
    Ok(embedder)
}

fn build_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn DocumentStore>, Arc<dyn IndexLifecycle>)> {
    let dimension = config.embedding.dimension;
    match config.store.backend {
        StoreBackend::Memory => {
            let store = Arc::new(InMemoryDocumentStore::new(&config.store.collection, dimension));
            let documents: Arc<dyn DocumentStore> = store.clone();
            let lifecycle: Arc<dyn IndexLifecycle> = store;
            Ok((documents, lifecycle))
        }
        StoreBackend::Qdrant => {
            let store = Arc::new(QdrantDocumentStore::new(
                &config.store.qdrant_url,
                &config.store.collection,
                dimension,
            )?);
            let documents: Arc<dyn DocumentStore> = store.clone();
            let lifecycle: Arc<dyn IndexLifecycle> = store;
            Ok((documents, lifecycle))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config_path =
        std::env::var("DOCSEARCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;
    info!(
        backend = ?config.store.backend,
        collection = %config.store.collection,
        dimension = config.embedding.dimension,
        embedder = ?config.embedding.provider,
        "configuration loaded"
    );

    let embedder = build_embedder(&config)?;
    let (store, lifecycle) = build_store(&config)?;
    anyhow::ensure!(
        embedder.dimension() == store.dimension(),
        "embedder produces {}-dimension vectors but the store expects {}",
        embedder.dimension(),
        store.dimension()
    );

    let state = AppState::new(config.clone(), embedder, store, lifecycle);
    state
        .index
        .initialize()
        .await
        .context("creating document index")?;

    let app = create_router(state.clone());
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if config.store.destroy_on_shutdown {
        state
            .index
            .shutdown()
            .await
            .context("destroying document index")?;
    }

    Ok(())
}
