use foodwise_api::{build_router, state::AppState};
use foodwise_config::Settings;
use foodwise_db::{connect, indexes::ensure_indexes};
use foodwise_services::notify::ExpiryScheduler;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "foodwise_api=debug,foodwise_services=debug,foodwise_db=debug,tower_http=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!(
        "Starting FoodWise API on {}:{}",
        settings.app.host, settings.app.port
    );

    // Connect to MongoDB
    let db = connect(&settings.database).await?;

    // Ensure indexes
    ensure_indexes(&db).await?;

    // Build app state
    let app_state = AppState::new(db, settings.clone());

    // Start the expiry notification scheduler
    let scheduler = if settings.notifier.enabled {
        Some(ExpiryScheduler::spawn(
            app_state.sweep.clone(),
            &settings.notifier,
        ))
    } else {
        info!("Expiry notification scheduler disabled by config");
        None
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop ticking, let an in-flight sweep finish
    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
