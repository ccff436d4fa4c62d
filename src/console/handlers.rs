//! Console request handlers
//!
//! Mutating handlers follow one sequence: validate the form, write to the
//! store, run the apply cycle, redirect with flash messages. Validation
//! failures re-render the form and leave the store untouched.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::{Extension, Form};
use chrono::Utc;
use log::{info, warn};

use crate::store::{SettingKey, StoreError};

use super::auth::{clear_session_cookie, AdminSession};
use super::error::ConsoleResult;
use super::flash::{apply_flashes, take_flashes, Flash, FlashRedirect};
use super::forms::{LoginForm, SettingsForm, UserForm};
use super::html;
use super::link::{connection_uri, qr_data_uri};
use super::state::ConsoleState;
use super::types::{HealthResponse, RestartResponse, ServiceStatus, StatusResponse};

/// Placeholder shown when the journal cannot be read
pub const LOGS_UNAVAILABLE: &str = "Failed to load logs";

/// Users listed on the dashboard
const RECENT_USERS: i64 = 5;

/// Liveness probe (no session required)
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

// === Session ===

pub async fn login_page(State(state): State<ConsoleState>, headers: HeaderMap) -> Response {
    html::login_page(&state, "")
        .with_pending(take_flashes(&headers))
        .into_response()
}

pub async fn login(
    State(state): State<ConsoleState>,
    Form(form): Form<LoginForm>,
) -> ConsoleResult<Response> {
    let username = form.username.trim();

    match state.store.authenticate_admin(username, &form.password).await? {
        Some(admin) => {
            info!("Administrator {} logged in", admin.username);
            let cookie = state.session_key.session_cookie(admin.id)?;
            Ok(FlashRedirect::to(state.url("/"))
                .cookie(cookie)
                .flash(Flash::success("Logged in successfully"))
                .into_response())
        }
        None => {
            warn!("Failed login attempt for {:?}", username);
            Ok(html::login_page(&state, username)
                .with_flash(Flash::danger("Invalid username or password"))
                .into_response())
        }
    }
}

pub async fn logout(State(state): State<ConsoleState>) -> Response {
    FlashRedirect::to(state.url("/login"))
        .cookie(clear_session_cookie())
        .flash(Flash::info("You have been logged out"))
        .into_response()
}

// === Pages ===

pub async fn dashboard(
    State(state): State<ConsoleState>,
    headers: HeaderMap,
) -> ConsoleResult<Response> {
    let stats = state.store.user_stats().await?;
    let recent = state.store.recent_users(RECENT_USERS).await?;
    let online = state.service().is_active().await;

    Ok(html::dashboard_page(&state, &stats, online, &recent)
        .with_pending(take_flashes(&headers))
        .into_response())
}

pub async fn list_users(
    State(state): State<ConsoleState>,
    headers: HeaderMap,
) -> ConsoleResult<Response> {
    let users = state.store.list_users().await?;

    Ok(html::users_page(&state, &users)
        .with_pending(take_flashes(&headers))
        .into_response())
}

pub async fn add_user_page(State(state): State<ConsoleState>, headers: HeaderMap) -> Response {
    html::user_form_page(&state, None, &UserForm::default())
        .with_pending(take_flashes(&headers))
        .into_response()
}

pub async fn add_user(
    State(state): State<ConsoleState>,
    Form(form): Form<UserForm>,
) -> ConsoleResult<Response> {
    let new_user = match form.clone().into_new_user() {
        Ok(user) => user,
        Err(e) => {
            return Ok(html::user_form_page(&state, None, &form)
                .with_flash(Flash::danger(e.to_string()))
                .into_response());
        }
    };

    match state.store.create_user(&new_user).await {
        Ok(user) => {
            info!("User {} added", user.username);
            let outcome = state.apply.apply(&state.store).await?;
            Ok(FlashRedirect::to(state.url("/users"))
                .flash(Flash::success(format!("User {} added", user.username)))
                .flashes(apply_flashes(&outcome))
                .into_response())
        }
        Err(StoreError::Conflict(_)) => Ok(html::user_form_page(&state, None, &form)
            .with_flash(Flash::danger(format!(
                "A user named {} already exists",
                new_user.username
            )))
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_user_page(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ConsoleResult<Response> {
    let Some(user) = state.store.find_user(id).await? else {
        return Ok(user_not_found(&state));
    };

    Ok(html::user_form_page(&state, Some(id), &UserForm::from_user(&user))
        .with_pending(take_flashes(&headers))
        .into_response())
}

pub async fn edit_user(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
    Form(form): Form<UserForm>,
) -> ConsoleResult<Response> {
    let update = match form.clone().into_update() {
        Ok(update) => update,
        Err(e) => {
            return Ok(html::user_form_page(&state, Some(id), &form)
                .with_flash(Flash::danger(e.to_string()))
                .into_response());
        }
    };

    match state.store.update_user(id, &update).await {
        Ok(user) => {
            info!("User {} updated", user.username);
            let outcome = state.apply.apply(&state.store).await?;
            Ok(FlashRedirect::to(state.url("/users"))
                .flash(Flash::success(format!("User {} updated", user.username)))
                .flashes(apply_flashes(&outcome))
                .into_response())
        }
        Err(StoreError::Conflict(_)) => Ok(html::user_form_page(&state, Some(id), &form)
            .with_flash(Flash::danger(format!(
                "A user named {} already exists",
                update.username
            )))
            .into_response()),
        Err(StoreError::NotFound(_)) => Ok(user_not_found(&state)),
        Err(e) => Err(e.into()),
    }
}

/// Deleting an unknown id is not an error; the apply cycle runs regardless.
pub async fn delete_user(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
) -> ConsoleResult<Response> {
    if state.store.delete_user(id).await? {
        info!("User {} deleted", id);
    }

    let outcome = state.apply.apply(&state.store).await?;
    Ok(FlashRedirect::to(state.url("/users"))
        .flash(Flash::success("User deleted"))
        .flashes(apply_flashes(&outcome))
        .into_response())
}

pub async fn user_connection(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ConsoleResult<Response> {
    let Some(user) = state.store.find_user(id).await? else {
        return Ok(user_not_found(&state));
    };
    let settings = state.store.load_settings().await?;

    let host = state.resolver.resolve(settings.get(SettingKey::ServerIp)).await;
    let uri = connection_uri(
        &user.password,
        &host,
        settings.get(SettingKey::ServerPort),
        &user.username,
    );

    let qr = match qr_data_uri(&uri) {
        Ok(qr) => Some(qr),
        Err(e) => {
            warn!("Could not render QR code for user {}: {}", user.username, e);
            None
        }
    };

    Ok(html::connection_page(&state, &user, &uri, qr.as_deref())
        .with_pending(take_flashes(&headers))
        .into_response())
}

pub async fn settings_page(
    State(state): State<ConsoleState>,
    headers: HeaderMap,
) -> ConsoleResult<Response> {
    let settings = state.store.load_settings().await?;

    Ok(html::settings_page(&state, &settings)
        .with_pending(take_flashes(&headers))
        .into_response())
}

pub async fn save_settings(
    State(state): State<ConsoleState>,
    Extension(session): Extension<AdminSession>,
    Form(form): Form<SettingsForm>,
) -> ConsoleResult<Response> {
    let change = match form.validate() {
        Ok(change) => change,
        Err(e) => {
            let settings = state.store.load_settings().await?;
            return Ok(html::settings_page(&state, &settings)
                .with_flash(Flash::danger(e.to_string()))
                .into_response());
        }
    };

    let written = state.store.update_settings(change.values).await?;
    info!("{} updated {} setting(s)", session.username, written);

    let mut redirect = FlashRedirect::to(state.url("/settings"));

    if let Some((old, new)) = change.password_change {
        if state.store.change_admin_password(session.id, &old, &new).await? {
            info!("Administrator {} changed their password", session.username);
            redirect = redirect.flash(Flash::success("Password changed"));
        } else {
            redirect = redirect.flash(Flash::danger("Current password is incorrect"));
        }
    }

    let outcome = state.apply.apply(&state.store).await?;
    Ok(redirect
        .flashes(apply_flashes(&outcome))
        .flash(Flash::success("Settings saved"))
        .into_response())
}

pub async fn logs(State(state): State<ConsoleState>, headers: HeaderMap) -> Response {
    let logs = match state.service().journal_tail(state.log_lines).await {
        Ok(logs) => logs,
        Err(e) => {
            warn!("Could not read service journal: {}", e);
            LOGS_UNAVAILABLE.to_string()
        }
    };

    html::logs_page(&state, &logs)
        .with_pending(take_flashes(&headers))
        .into_response()
}

// === JSON API ===

pub async fn api_status(State(state): State<ConsoleState>) -> Json<StatusResponse> {
    let active = state.service().is_active().await;
    Json(StatusResponse {
        status: ServiceStatus::from(active),
        timestamp: Utc::now(),
    })
}

pub async fn api_restart(
    State(state): State<ConsoleState>,
    Extension(session): Extension<AdminSession>,
) -> Json<RestartResponse> {
    info!("{} requested a service restart", session.username);

    let response = match state.service().restart().await {
        Ok(()) => RestartResponse {
            success: true,
            message: "Server restarted".to_string(),
        },
        Err(e) => {
            warn!("Service restart failed: {}", e);
            RestartResponse {
                success: false,
                message: format!("Restart failed: {}", e),
            }
        }
    };

    Json(response)
}

/// `{base}/` lands on the dashboard
pub async fn trailing_slash(State(state): State<ConsoleState>) -> Redirect {
    Redirect::permanent(&state.url("/"))
}

fn user_not_found(state: &ConsoleState) -> Response {
    FlashRedirect::to(state.url("/users"))
        .flash(Flash::danger("User not found"))
        .into_response()
}
