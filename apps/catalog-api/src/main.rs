//! Catalog API - REST server for categories and products

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use axum::Router;
use axum_helpers::server::{close_postgres, create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{self, PostgresConfig};
use domain_catalog::{
    handlers, CatalogRepository, CategoryService, InMemoryCatalog, PgCatalog, ProductService,
};
use migration::Migrator;
use tracing::{info, warn};

mod config;
mod health;
mod openapi;

use config::Config;

type Cleanup = Pin<Box<dyn Future<Output = ()> + Send>>;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let (api_routes, db, cleanup): (Router, Option<_>, Cleanup) = match config.database.clone() {
        Some(db_config) => {
            info!("Connecting to PostgreSQL");
            let db =
                postgres::connect_from_config_with_retry(PostgresConfig::new(db_config.url), None)
                    .await?;
            postgres::run_migrations::<Migrator>(&db, "catalog_api").await?;

            let routes = catalog_routes(PgCatalog::new(db.clone()));
            let cleanup_db = db.clone();
            let cleanup: Cleanup = Box::pin(async move {
                info!("Shutting down: closing PostgreSQL connection");
                close_postgres(cleanup_db, "catalog").await;
            });
            (routes, Some(db), cleanup)
        }
        None => {
            warn!("DATABASE_URL not set, serving from the in-memory store");
            (
                catalog_routes(InMemoryCatalog::new()),
                None,
                Box::pin(async {}) as Cleanup,
            )
        }
    };

    let router = create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router
        .merge(health_router(config.app))
        .merge(health::ready_router(db));

    info!("Starting Catalog API on port {}", config.server.port);

    create_production_app(app, &config.server, Duration::from_secs(30), cleanup)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}

/// Mounts both domain routers over one shared repository.
fn catalog_routes<R>(repository: R) -> Router
where
    R: CatalogRepository + Clone + 'static,
{
    Router::new()
        .nest(
            "/categories",
            handlers::categories_router(CategoryService::new(repository.clone())),
        )
        .nest(
            "/products",
            handlers::products_router(ProductService::new(repository)),
        )
}
