use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skybook_booking::{ContextError, FlowError, SelectionError};
use skybook_core::CoreError;
use skybook_shared::Notice;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    /// Rejected user action carrying a toast for the client and an optional
    /// page to navigate to.
    Rejected {
        status: StatusCode,
        notice: Notice,
        redirect: Option<&'static str>,
    },
    /// Silent navigation, e.g. a confirmation page reached without context.
    Redirect(&'static str),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
            AppError::Redirect(_) => StatusCode::SEE_OTHER,
            AppError::NotFoundError(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Redirect(location) => (
                status,
                [(header::LOCATION, location)],
                Json(json!({ "redirect": location })),
            )
                .into_response(),
            AppError::Rejected { notice, redirect, .. } => {
                let body = Json(json!({
                    "error": notice.title,
                    "notice": notice,
                    "redirect": redirect,
                }));
                (status, body).into_response()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                internal()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                internal()
            }
            AppError::ValidationError(msg) | AppError::NotFoundError(msg) | AppError::ConflictError(msg) => {
                (status, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}

fn internal() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        let status = match &err {
            SelectionError::UnknownSeat(_) => StatusCode::NOT_FOUND,
            SelectionError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            SelectionError::Context(_) => StatusCode::BAD_REQUEST,
            SelectionError::Unavailable(_)
            | SelectionError::LimitReached { .. }
            | SelectionError::Incomplete { .. } => StatusCode::CONFLICT,
        };
        AppError::Rejected {
            status,
            notice: err.notice(),
            redirect: err.redirect(),
        }
    }
}

impl From<ContextError> for AppError {
    fn from(err: ContextError) -> Self {
        match err.redirect() {
            Some(location) => AppError::Redirect(location),
            None => SelectionError::Context(err).into(),
        }
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::NotFound(_) | FlowError::UnknownFlight(_) => AppError::NotFoundError(err.to_string()),
            FlowError::InvalidTransition { .. } | FlowError::Stale { .. } | FlowError::Busy => {
                AppError::ConflictError(err.to_string())
            }
            FlowError::Search(e) => e.into(),
            FlowError::Selection(e) => e.into(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AppError::ValidationError(msg),
            CoreError::Identity(msg) => AppError::Rejected {
                status: StatusCode::UNAUTHORIZED,
                notice: Notice::new("Authentication failed", msg),
                redirect: None,
            },
            CoreError::Storage(msg) | CoreError::Booking(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}
