use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use chrono::Utc;
use serde::Serialize;
use skybook_core::{Credentials, SignupDetails, User};
use skybook_shared::FlowEvent;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/signup", post(signup))
        .route("/v1/auth/logout", post(logout))
        .route("/v1/auth/me", get(me))
}

async fn login(State(state): State<AppState>, Json(credentials): Json<Credentials>) -> Result<Json<User>, AppError> {
    if credentials.email.trim().is_empty() || credentials.password.expose().is_empty() {
        return Err(AppError::ValidationError("Email and password are required".to_string()));
    }

    let user = state
        .session
        .login(&credentials.email, credentials.password.expose())
        .await?;
    state.publish(FlowEvent::SessionStarted {
        user_id: user.id.clone(),
        timestamp: Utc::now(),
    });
    Ok(Json(user))
}

async fn signup(State(state): State<AppState>, Json(details): Json<SignupDetails>) -> Result<(StatusCode, Json<User>), AppError> {
    let missing: Vec<&str> = [
        ("email", details.email.as_str()),
        ("firstName", details.first_name.as_str()),
        ("lastName", details.last_name.as_str()),
        ("password", details.password.expose().as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();
    if !missing.is_empty() {
        return Err(AppError::ValidationError(format!("Missing fields: {}", missing.join(", "))));
    }

    let user = state.session.signup(&details).await?;
    state.publish(FlowEvent::SessionStarted {
        user_id: user.id.clone(),
        timestamp: Utc::now(),
    });
    Ok((StatusCode::CREATED, Json(user)))
}

async fn logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let was_signed_in = state.session.is_authenticated().await;
    state.session.logout().await?;
    if was_signed_in {
        state.publish(FlowEvent::SessionEnded { timestamp: Utc::now() });
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(state): State<AppState>) -> Json<SessionResponse> {
    let user = state.session.current_user().await;
    Json(SessionResponse {
        is_authenticated: user.is_some(),
        user,
        is_loading: state.session.is_loading(),
    })
}
