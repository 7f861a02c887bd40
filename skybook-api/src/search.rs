use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use skybook_catalog::ResultsListing;
use skybook_core::{Airport, SearchQuery};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/airports", get(list_airports))
        .route("/v1/flights/search", get(search_flights))
}

async fn list_airports(State(state): State<AppState>) -> Result<Json<Vec<Airport>>, AppError> {
    let airports = state
        .catalog
        .list_airports()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to list airports: {}", e)))?;
    Ok(Json(airports))
}

/// Stateless results page: the query string is the whole request.
async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ResultsListing>, AppError> {
    if query.from.trim().is_empty() || query.to.trim().is_empty() {
        return Err(AppError::ValidationError("Both from and to are required".to_string()));
    }
    if query.return_date.is_some_and(|ret| ret < query.departure) {
        return Err(AppError::ValidationError("Return date is before departure".to_string()));
    }

    tracing::info!("Searching {} -> {} for {}", query.from, query.to, query.passengers);
    let listing = ResultsListing::search(state.catalog.as_ref(), query, state.fallback)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Flight search failed: {}", e)))?;
    Ok(Json(listing))
}
