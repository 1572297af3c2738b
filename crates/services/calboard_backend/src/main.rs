// File: services/calboard_backend/src/main.rs
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use calboard_calendly::cache::EventCache;
use calboard_calendly::fetcher::HttpCalendlyApi;
use calboard_calendly::handlers::CalendlyState;
use calboard_calendly::oauth::HttpTokenExchanger;
use calboard_calendly::routes as calendly_routes;
use calboard_common::logging;
use calboard_config::load_config;
use calboard_db::{DbClient, SqlCredentialStore, SqlProfessionalDirectory};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Arc::new(load_config()?);

    let db_client = DbClient::connect(&config.database.url).await?;
    db_client.init_schema().await?;

    let state = CalendlyState {
        config: config.clone(),
        credentials: Arc::new(SqlCredentialStore::new(db_client.clone())),
        directory: Arc::new(SqlProfessionalDirectory::new(db_client)),
        api: Arc::new(HttpCalendlyApi::new(&config.calendly)),
        exchanger: Arc::new(HttpTokenExchanger::new(&config.calendly)),
        cache: EventCache::new(Duration::from_secs(config.cache.ttl_minutes * 60)),
    };

    let app = Router::new()
        .route("/", get(|| async { "Welcome to Calboard API!" }))
        .merge(calendly_routes::routes(state))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("starting server at http://{addr}");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
