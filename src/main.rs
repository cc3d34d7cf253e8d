use jobboard_api::{app, config, db};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Jobboard API in {:?} mode", config.environment);

    let pool = db::connect(config)
        .await
        .unwrap_or_else(|e| panic!("database connection failed: {}", e));
    let state = db::AppState::new(pool.clone());

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server");

    // Lifecycle: pool lives from process start to this explicit shutdown
    pool.close().await;
    tracing::info!("database pool closed, exiting");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
