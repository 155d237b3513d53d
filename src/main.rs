//! Plant care scheduling service
//!
//! REST backend that tracks plants and rooms, computes watering intervals
//! and serves "Today" / "Soon" care task lists.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use plantcare::config::Settings;
use plantcare::handlers;
use plantcare::recompute::FrequencySweeper;
use plantcare::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenv::dotenv().ok();

    // Logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,plantcare=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();

    // Load configuration
    let settings = Settings::from_env().context("Failed to load configuration")?;
    let bind_address = format!("{}:{}", settings.server.host, settings.server.port);

    info!("Starting plantcare backend");
    info!("Binding server to {}", bind_address);

    // Shared application state
    let app_state = Arc::new(RwLock::new(AppState::new()));

    // ---------------------------------------------------------------------
    // Background frequency recomputation
    // ---------------------------------------------------------------------
    let sweep_state = app_state.clone();
    let sweeper = FrequencySweeper::new(settings.schedule.sweep_interval_secs);

    actix_rt::spawn(async move {
        sweeper.run(sweep_state).await;
    });

    // ---------------------------------------------------------------------
    // HTTP server
    // ---------------------------------------------------------------------
    let schedule = web::Data::new(settings.schedule.clone());

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(schedule.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    Ok(())
}
