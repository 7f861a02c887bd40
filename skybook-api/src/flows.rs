use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skybook_booking::{BookingFlow, SelectionChange, SelectionError, SelectionView, Stage, StageKind};
use skybook_catalog::ResultsListing;
use skybook_core::{BookingConfirmation, BookingContext, SearchForm};
use skybook_shared::FlowEvent;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Wire view of a booking flow: the stage plus whatever that stage shows.
#[derive(Debug, Serialize)]
pub struct FlowResponse {
    pub id: Uuid,
    pub stage: StageKind,
    pub epoch: u64,
    pub searching: bool,
    pub booking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BookingContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<BookingConfirmation>,
    pub updated_at: DateTime<Utc>,
}

impl From<&BookingFlow> for FlowResponse {
    fn from(flow: &BookingFlow) -> Self {
        let mut response = FlowResponse {
            id: flow.id(),
            stage: flow.kind(),
            epoch: flow.epoch(),
            searching: flow.is_searching(),
            booking: flow.is_booking(),
            results: None,
            selection: None,
            context: None,
            confirmation: None,
            updated_at: flow.updated_at(),
        };

        match flow.stage() {
            Stage::Search => {}
            Stage::Results(listing) => response.results = Some(listing.clone()),
            Stage::SeatSelection(selection) => response.selection = Some(selection.view()),
            Stage::Confirmation(context) => response.context = Some(context.clone()),
            Stage::Confirmed { context, confirmation } => {
                response.context = Some(context.clone());
                response.confirmation = Some(confirmation.clone());
            }
        }
        response
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectFlightRequest {
    pub flight_id: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub change: SelectionChange,
    pub flow: FlowResponse,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flows", post(create_flow))
        .route("/v1/flows/{id}", get(get_flow).delete(delete_flow))
        .route("/v1/flows/{id}/reset", post(reset))
        .route("/v1/flows/{id}/search", post(search))
        .route("/v1/flows/{id}/flight", post(select_flight))
        .route("/v1/flows/{id}/seats/{seat_id}", post(toggle_seat))
        .route("/v1/flows/{id}/continue", post(continue_to_booking))
        .route("/v1/flows/{id}/confirm", post(confirm))
}

async fn create_flow(State(state): State<AppState>) -> (StatusCode, Json<FlowResponse>) {
    let mut flows = state.flows.lock().await;
    let flow = flows.create();
    info!("Created booking flow {}", flow.id());
    (StatusCode::CREATED, Json(FlowResponse::from(flow)))
}

async fn get_flow(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<FlowResponse>, AppError> {
    let flows = state.flows.lock().await;
    Ok(Json(FlowResponse::from(flows.get(&id)?)))
}

async fn delete_flow(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, AppError> {
    let mut flows = state.flows.lock().await;
    match flows.discard(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFoundError(format!("Booking flow not found: {}", id))),
    }
}

/// Back to an empty search form, from any stage.
async fn reset(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<FlowResponse>, AppError> {
    let mut flows = state.flows.lock().await;
    let flow = flows.get_mut(&id)?;
    flow.reset();
    Ok(Json(FlowResponse::from(&*flow)))
}

/// Submit the search form. The registry lock is released while the catalog
/// is queried; a newer navigation on the same flow makes this result stale.
async fn search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<SearchForm>,
) -> Result<Json<FlowResponse>, AppError> {
    let (ticket, query) = {
        let mut flows = state.flows.lock().await;
        flows.get_mut(&id)?.begin_search(&form)?
    };

    let listing = ResultsListing::search(state.catalog.as_ref(), query, state.fallback)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Flight search failed: {}", e)))?;

    let mut flows = state.flows.lock().await;
    let flow = flows.get_mut(&id)?;
    flow.complete_search(ticket, listing)?;
    Ok(Json(FlowResponse::from(&*flow)))
}

async fn select_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectFlightRequest>,
) -> Result<Json<FlowResponse>, AppError> {
    let mut flows = state.flows.lock().await;
    let flow = flows.get_mut(&id)?;
    flow.select_flight(&req.flight_id, &state.seats)?;
    Ok(Json(FlowResponse::from(&*flow)))
}

async fn toggle_seat(
    State(state): State<AppState>,
    Path((id, seat_id)): Path<(Uuid, String)>,
) -> Result<Json<ToggleResponse>, AppError> {
    let mut flows = state.flows.lock().await;
    let flow = flows.get_mut(&id)?;
    let change = flow.toggle_seat(&seat_id).inspect_err(|e| {
        debug!("Seat {} rejected on flow {}: {}", seat_id, id, e);
    })?;
    Ok(Json(ToggleResponse {
        change,
        flow: FlowResponse::from(&*flow),
    }))
}

async fn continue_to_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowResponse>, AppError> {
    let user = state.session.current_user().await;

    let mut flows = state.flows.lock().await;
    let flow = flows.get_mut(&id)?;
    flow.continue_to_booking(user.as_ref())?;
    Ok(Json(FlowResponse::from(&*flow)))
}

/// Place the booking. A second confirm while one is in flight is refused;
/// a failed gateway call leaves the flow on the confirmation stage. On
/// success the flow is removed from the registry.
async fn confirm(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<FlowResponse>, AppError> {
    let user = state
        .session
        .current_user()
        .await
        .ok_or(SelectionError::NotAuthenticated)?;

    let (ticket, context) = {
        let mut flows = state.flows.lock().await;
        flows.get_mut(&id)?.begin_booking()?
    };

    let result = state.gateway.submit(&context, &user).await;

    let mut flows = state.flows.lock().await;
    let flow = flows.get_mut(&id)?;
    let confirmation = match result {
        Ok(confirmation) => flow.complete_booking(ticket, confirmation)?.clone(),
        Err(e) => {
            if let Err(stale) = flow.abort_booking(ticket) {
                warn!("Abort after failed booking ignored: {}", stale);
            }
            return Err(e.into());
        }
    };
    let response = FlowResponse::from(&*flow);

    // The confirmed flow is only reported back once.
    flows.discard(&id);
    info!("Flow {} confirmed as {}", id, confirmation.reference);
    state.publish(FlowEvent::BookingConfirmed {
        flow_id: Some(id),
        flight_id: confirmation.flight_id.clone(),
        reference: confirmation.reference.clone(),
        seats: confirmation.seats.clone(),
        total_amount: confirmation.total_price,
        timestamp: confirmation.confirmed_at,
    });
    Ok(Json(response))
}
