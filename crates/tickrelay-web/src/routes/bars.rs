use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use tickrelay_core::{CalendarDate, DateRange, PriceBar, Ticker};

use crate::error::ApiError;
use crate::state::AppState;

/// Number of trailing calendar days served when no range is given.
const DEFAULT_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct BarsParams {
    ticker: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

/// `GET /stock-data?ticker=<T>[&start=..&end=..]`
pub async fn stock_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BarsParams>,
) -> Result<Json<Vec<PriceBar>>, ApiError> {
    state.gates.check_global()?;
    state.gates.check_bars()?;

    let ticker_raw = params
        .ticker
        .ok_or_else(|| ApiError::missing("Missing ticker parameter"))?;
    let ticker = Ticker::parse(&ticker_raw)?;

    let range = resolve_range(params.start, params.end, yesterday(&state))?;

    let bars = state
        .service
        .price_bars(ticker, range)
        .await
        .map_err(|e| ApiError::from_source(e, "stock data"))?;

    if bars.is_empty() {
        return Err(ApiError::no_valid_data());
    }

    Ok(Json(bars.as_ref().clone()))
}

/// Most recent complete trading date: the current day may still be an
/// incomplete session, so windows never extend past yesterday.
fn yesterday(state: &AppState) -> CalendarDate {
    let today = CalendarDate::from_datetime(state.clock.now());
    today.previous_day().unwrap_or(today)
}

fn resolve_range(
    start: Option<String>,
    end: Option<String>,
    yesterday: CalendarDate,
) -> Result<DateRange, ApiError> {
    match (start, end) {
        (None, None) => Ok(DateRange::trailing(yesterday, DEFAULT_WINDOW_DAYS)),
        (Some(start), Some(end)) => {
            let start = CalendarDate::parse(&start)?;
            let end = CalendarDate::parse(&end)?;
            let end = end.min(yesterday);
            DateRange::new(start, end).map_err(ApiError::from)
        }
        _ => Err(ApiError::bad_request(
            "start and end must be provided together",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn day(d: time::Date) -> CalendarDate {
        CalendarDate::from_date(d)
    }

    #[test]
    fn omitted_range_defaults_to_trailing_year_ending_yesterday() {
        let yesterday = day(date!(2024 - 06 - 30));
        let range = resolve_range(None, None, yesterday).expect("valid");
        assert_eq!(range.end(), yesterday);
        assert_eq!(range.start().to_string(), "2023-07-01");
    }

    #[test]
    fn explicit_range_is_clamped_to_yesterday() {
        let yesterday = day(date!(2024 - 06 - 30));
        let range = resolve_range(
            Some("2024-06-01".into()),
            Some("2024-12-31".into()),
            yesterday,
        )
        .expect("valid");
        assert_eq!(range.end(), yesterday);
    }

    #[test]
    fn half_specified_range_is_rejected() {
        let yesterday = day(date!(2024 - 06 - 30));
        let err = resolve_range(Some("2024-06-01".into()), None, yesterday).expect_err("must fail");
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn range_entirely_in_the_future_is_rejected() {
        let yesterday = day(date!(2024 - 06 - 30));
        let err = resolve_range(
            Some("2024-07-10".into()),
            Some("2024-07-20".into()),
            yesterday,
        )
        .expect_err("must fail");
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
