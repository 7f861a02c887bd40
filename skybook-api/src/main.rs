use anyhow::Context;
use skybook_api::{app, worker, AppState};
use skybook_booking::FlowRegistry;
use skybook_catalog::{FallbackPolicy, MockFlightCatalog, PricingEngine, SeatGenerator};
use skybook_core::{MockIdentityProvider, SessionStore, SimulatedBookingGateway};
use skybook_store::app_config::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skybook_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting SkyBook API on port {}", config.server.port);

    let slot = skybook_store::open_session_slot(&config.session)
        .map_err(|e| anyhow::anyhow!("Failed to open session slot: {}", e))?;
    let identity = Arc::new(MockIdentityProvider::with_delays(
        config.simulation.login_delay(),
        config.simulation.signup_delay(),
    ));
    let session = SessionStore::open(identity, slot)
        .await
        .context("Failed to restore session")?;

    let fallback = match config.catalog.fallback_size {
        0 => FallbackPolicy::Empty,
        n => FallbackPolicy::FirstN(n),
    };

    let flows = Arc::new(Mutex::new(FlowRegistry::new()));
    let (events_tx, _) = tokio::sync::broadcast::channel(100);

    let state = AppState {
        session: Arc::new(session),
        catalog: Arc::new(MockFlightCatalog::with_latency(config.simulation.search_delay())),
        gateway: Arc::new(SimulatedBookingGateway::new(config.simulation.booking_delay())),
        seats: Arc::new(SeatGenerator::default()),
        pricing: PricingEngine::new(),
        flows: flows.clone(),
        events_tx,
        fallback,
    };

    tokio::spawn(worker::start_flow_cleanup(
        flows,
        std::time::Duration::from_secs(config.flows.cleanup_interval_seconds),
        chrono::Duration::minutes(config.flows.max_idle_minutes),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
