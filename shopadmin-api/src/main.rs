//! # Shopadmin API Server
//!
//! REST backend for the e-commerce administration panel: authentication,
//! catalog CRUD (categories, subcategories, products), and image uploads
//! served from local disk.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/shopadmin \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p shopadmin-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopadmin_api::{
    app::{build_router, AppState},
    config::Config,
    uploads::UploadStore,
};
use shopadmin_shared::db::{migrations, pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shopadmin_api=debug,shopadmin_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Shopadmin API server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let uploads = UploadStore::new(&config.uploads.dir).await?;

    let addr = config.bind_address();
    let app = build_router(AppState::new(db, config, uploads));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
