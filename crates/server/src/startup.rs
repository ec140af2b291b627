use std::future::Future;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::TokenIssuer;
use service::events::ChangeHub;

use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Binds `server.host:server.port`; the host may be a name.
async fn bind(cfg: &AppConfig) -> anyhow::Result<tokio::net::TcpListener> {
    let host = cfg.server.host.as_str();
    tokio::net::TcpListener::bind((host, cfg.server.port))
        .await
        .map_err(|e| anyhow::anyhow!("cannot bind {host}:{}: {e}", cfg.server.port))
}

/// Connect to the database, apply pending migrations and wire up the services.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    common::env::ensure_env(&cfg.frontend.dir).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!("database schema up to date");

    let tokens = TokenIssuer::new(&cfg.auth.jwt_secret, chrono::Duration::hours(cfg.auth.token_ttl_hours));
    Ok(ServerState::new(db, tokens, ChangeHub::new(cfg.events.capacity)))
}

pub fn build_app(state: ServerState, cfg: &AppConfig) -> Router {
    routes::build_router(state, build_cors(), &cfg.frontend.dir)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
/// Open event streams are closed first so draining can finish.
pub async fn run_with_shutdown<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg).await?;
    let hub = state.hub.clone();
    let app = build_app(state, &cfg);
    let listener = bind(&cfg).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "listening");
    let shutdown = async move {
        shutdown.await;
        hub.close();
    };
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server drained");
    Ok(())
}
