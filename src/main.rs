use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use marquee_server::config::Config;
use marquee_server::notifier::{BroadcastNotifier, Notifier};
use marquee_server::routes::create_routes;
use marquee_server::services::PriceChangeProcessor;
use marquee_server::state::AppState;
use marquee_server::store::InMemoryStore;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let store = Arc::new(InMemoryStore::new());
    let (notifier, events) = BroadcastNotifier::channel(EVENT_CHANNEL_CAPACITY);
    let notifier: Arc<dyn Notifier> = Arc::new(notifier);

    let state = AppState::new(
        store.clone(),
        store.clone(),
        store,
        notifier,
        &config,
    );

    // Downstream consumer for the price-change pipeline. It republishes
    // completion events onto the same channel and ignores them when they
    // come back around.
    let processor: PriceChangeProcessor = state.events.clone();
    tokio::spawn(processor.run(events));

    let app: Router = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
