use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use skybook_booking::{BookingContextDraft, ContextError, SelectionError};
use skybook_core::BookingConfirmation;
use skybook_shared::FlowEvent;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", post(create_booking))
}

/// Confirm a booking from a context the client carried between pages.
///
/// Without a flight the client is sent back to search. Flight fare and seat
/// upcharges are taken from the catalog and the seat layout, never from the
/// request body.
async fn create_booking(
    State(state): State<AppState>,
    Json(draft): Json<BookingContextDraft>,
) -> Result<(StatusCode, Json<BookingConfirmation>), AppError> {
    let flight_id = draft.flight_id().ok_or(ContextError::MissingFlight)?.to_string();
    let flight = state
        .catalog
        .get_flight(&flight_id)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Flight lookup failed: {}", e)))?
        .ok_or(ContextError::UnknownFlight(flight_id))?;

    let context = draft
        .reconcile(flight, &state.seats)
        .and_then(|draft| draft.validate(&state.pricing))
        .inspect_err(|e| tracing::warn!("Rejected booking context: {}", e))?;

    let user = state
        .session
        .current_user()
        .await
        .ok_or(SelectionError::NotAuthenticated)?;

    let confirmation = state.gateway.submit(&context, &user).await?;
    state.publish(FlowEvent::BookingConfirmed {
        flow_id: None,
        flight_id: confirmation.flight_id.clone(),
        reference: confirmation.reference.clone(),
        seats: confirmation.seats.clone(),
        total_amount: confirmation.total_price,
        timestamp: Utc::now(),
    });
    Ok((StatusCode::CREATED, Json(confirmation)))
}
