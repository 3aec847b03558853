use kakaobus_server::config::ServerConfig;
use kakaobus_server::host::{ConfigEntryStore, FlowSessions, Integration};
use kakaobus_server::kakao::KakaoClient;
use kakaobus_server::web::{AppState, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,kakaobus_server=debug")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid configuration");

    let client = KakaoClient::new(config.kakao()).expect("Failed to create KakaoMap client");
    let store = ConfigEntryStore::open(&config.store_path)
        .expect("Failed to open config entry store");

    let integration = Integration::new(client, store);
    let loaded = integration.setup_all().await;
    info!(
        entries = loaded,
        store = %config.store_path.display(),
        "Loaded config entries"
    );

    let state = AppState::new(integration.clone(), FlowSessions::default());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind listener");
    info!(addr = %config.bind, "KakaoMap bus server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .expect("Server error");

    integration.shutdown().await;
}
