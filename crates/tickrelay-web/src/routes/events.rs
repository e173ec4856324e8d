use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use tickrelay_core::{CalendarDate, CorporateEvent, DateRange, Ticker};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsParams {
    ticker: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

/// `GET /stock-events?ticker=<T>&start=..&end=..`
///
/// All three parameters are required. An empty window is a valid 200 with
/// an empty array, not an error.
pub async fn stock_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsParams>,
) -> Result<Json<Vec<CorporateEvent>>, ApiError> {
    state.gates.check_global()?;

    let (ticker_raw, start_raw, end_raw) = match (params.ticker, params.start, params.end) {
        (Some(ticker), Some(start), Some(end)) => (ticker, start, end),
        _ => return Err(ApiError::missing("Missing required parameters")),
    };

    let ticker = Ticker::parse(&ticker_raw)?;
    let start = CalendarDate::parse(&start_raw)?;
    let end = CalendarDate::parse(&end_raw)?;
    let range = DateRange::new(start, end)?;

    let events = state
        .service
        .corporate_events(ticker, range)
        .await
        .map_err(|e| ApiError::from_source(e, "stock events"))?;

    Ok(Json(events.as_ref().clone()))
}
