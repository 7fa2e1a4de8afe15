use axum::Router;
use tokio::sync::broadcast;

use rom_engine::config::{Config, EngineEnvConfig, LimitsConfig, SessionEnvConfig};
use rom_engine::routes::build_router;
use rom_engine::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    pub shutdown_tx: broadcast::Sender<()>,
}

/// Build `Config` by hand so parallel tests never race on process env vars.
pub fn test_config() -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        limits: LimitsConfig::default(),
        session: SessionEnvConfig::default(),
        engine: EngineEnvConfig::default(),
    }
}

pub async fn spawn_with_config(config: Config) -> TestApp {
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(&config, shutdown_tx.clone());
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        shutdown_tx,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with_config(test_config()).await
}

pub async fn spawn_test_app_with_sse_limit(max_sse_connections: usize) -> TestApp {
    let mut config = test_config();
    config.limits = LimitsConfig {
        max_sse_connections,
    };
    spawn_with_config(config).await
}
