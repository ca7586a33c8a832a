use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use book_catalog::api::{self, AppState};
use book_catalog::config::Settings;
use book_catalog::data::BookRepository;
use book_catalog::pricing::PriceOracle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_application();

    info!("📚 Starting Book Catalog Service");

    let settings = Settings::new().context("Failed to load configuration")?;
    info!("📋 Configuration loaded successfully");

    info!("🔌 Connecting to database...");
    let pool = BookRepository::create_pool(&settings.database).await?;
    let repository = BookRepository::new(pool);
    repository.run_migrations().await.context("Failed to run migrations")?;
    repository.test_connection().await?;
    info!("✅ Database connection established");

    let oracle = PriceOracle::new(&settings.pricing);
    if settings.pricing.enabled {
        info!(
            program = %settings.pricing.program,
            max_concurrent = settings.pricing.max_concurrent,
            timeout_secs = settings.pricing.timeout_secs,
            "🤖 Price oracle ready"
        );
    } else {
        warn!("⚠️  Price lookups disabled; every book will be served without a price");
    }

    let state = Arc::new(AppState { repository, oracle });

    let app = api::create_router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("🚀 HTTP server listening on http://{addr}");
    info!("📡 Available endpoints:");
    info!("   GET    /api/books          - List books (prices attached)");
    info!("   GET    /api/books?search=x - Keyword search");
    info!("   GET    /api/books/:id      - Fetch one book");
    info!("   POST   /api/books          - Create a book");
    info!("   PUT    /api/books/:id      - Update a book");
    info!("   DELETE /api/books/:id      - Delete a book");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("✅ Application stopped gracefully");
    Ok(())
}

fn init_application() {
    if dotenv::dotenv().is_err() {
        eprintln!("No .env file found, using environment variables");
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("book_catalog=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_err() {
        warn!("Failed to listen for ctrl-c; shutting down on server error only");
        return;
    }
    info!("Received Ctrl+C signal, shutting down");
}
