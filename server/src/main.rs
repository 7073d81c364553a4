mod config;
mod db;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env().expect("invalid server configuration");
    let port = config.port;

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    match services::session::delete_expired_sessions(&pool).await {
        Ok(removed) => tracing::info!(removed, "expired sessions swept"),
        Err(e) => tracing::warn!(error = %e, "expired session sweep failed"),
    }

    let mailer = services::mailer::from_config(&config.email);
    let state = state::AppState::new(pool, config, mailer);

    let app = routes::leptos_app(state).expect("leptos app setup failed");
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "gatekeeper listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server failed");
}
