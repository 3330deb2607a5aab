//! # Quad API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use api_server::background::ReconcileScheduler;
use api_server::config::AppConfig;
use api_server::handlers;
use api_server::middleware::{RateLimitGuard, json_error_handler, query_error_handler};
use api_server::state::AppState;
use api_server::telemetry::{self, TelemetryConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Quad API Server on {}:{}",
        config.host,
        config.port
    );

    // Build application state
    let state = AppState::new(&config).await;

    // The sweep holds its own scheduler; dropping it would stop the job.
    let _reconciler = ReconcileScheduler::start(&config.reconcile, state.posts.clone()).await;

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(RateLimitGuard)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
