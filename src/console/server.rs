//! Console HTTP server
//!
//! Sets up the axum router and serves it.

use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::common::{PanelError, Result};

use super::auth::require_session;
use super::handlers;
use super::state::ConsoleState;

/// Start the console and serve until Ctrl+C
pub async fn start_console_server(state: ConsoleState, listen_addr: SocketAddr) -> Result<()> {
    let base_path = state.url("/");
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    log::info!("Console listening on http://{}{}", listen_addr, base_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PanelError::Server(e.to_string()))?;

    log::info!("Console stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Build the application router with all routes
///
/// Everything is mounted below the state's base path.
pub fn build_router(state: ConsoleState) -> Router {
    // Protected routes (require a session)
    let protected = Router::new()
        .route("/", get(handlers::dashboard))
        .route("/users", get(handlers::list_users))
        .route("/users/add", get(handlers::add_user_page).post(handlers::add_user))
        .route("/users/edit/:id", get(handlers::edit_user_page).post(handlers::edit_user))
        .route("/users/delete/:id", get(handlers::delete_user).post(handlers::delete_user))
        .route("/users/connection/:id", get(handlers::user_connection))
        .route("/settings", get(handlers::settings_page).post(handlers::save_settings))
        .route("/logs", get(handlers::logs))
        .route("/api/status", get(handlers::api_status))
        .route("/api/restart", get(handlers::api_restart).post(handlers::api_restart))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let console = Router::new()
        // Public routes (no session required)
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/health", get(handlers::health_check))
        .merge(protected);

    let app = match state.base_path() {
        "" => console,
        base => Router::new()
            .route(&format!("{}/", base), get(handlers::trailing_slash))
            .nest(base, console),
    };

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
