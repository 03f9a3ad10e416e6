/*
 * Responsibility
 * - Config loading -> dependency wiring -> Router assembly
 * - Router-wide middleware (security headers, HTTP layers)
 * - Start serving with axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, auth::carrier::SessionCookie};
use crate::services::{
    directory::UserDirectory,
    session::{SessionPolicy, SessionService, TokenCodec},
};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,ticket_desk_session=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash loudly. Production: keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        app_env = ?config.app_env,
        addr = %config.addr,
        cookie = %config.cookie.name,
        users = config.directory.len(),
        "starting session server"
    );
    if config.directory.is_empty() {
        tracing::warn!("AUTH_USERS is empty; every login will fail");
    }

    let state = build_state(&config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &Config) -> AppState {
    let codec = TokenCodec::new(config.session.secret.as_bytes(), config.session.kdf_iterations);
    tracing::debug!(kdf_iterations = codec.iterations(), "session codec ready");
    let sessions = SessionService::new(
        codec,
        SessionPolicy {
            nonce_marker: config.session.nonce_marker.clone(),
            max_age: config.session.max_age,
            max_concurrent_crypto: config.session.crypto_concurrency,
        },
    );
    let directory: Arc<dyn UserDirectory> = Arc::new(config.directory.clone());

    AppState::new(
        Arc::new(sessions),
        directory,
        SessionCookie::from_config(&config.cookie),
        config.allow_anonymous,
    )
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state.clone()).with_state(state);
    let router = middleware::security_headers::apply(router, config.app_env);

    middleware::http::apply(router, &config.http)
}
