//! Financial Modeling Prep adapter.
//!
//! FMP's `stock_dividend` and `stock_split` endpoints return full history
//! regardless of any requested range, so window filtering happens here
//! rather than being delegated upstream.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::data_source::{
    BarsQuery, EventsQuery, MarketDataSource, ProviderId, SourceError,
};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::{split_ratio_parts, CalendarDate, CorporateEvent, PriceBar, Ticker};

const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Financial Modeling Prep provider.
#[derive(Clone)]
pub struct FmpAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
}

impl Default for FmpAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            api_key: std::env::var("FMP_API_KEY").unwrap_or_else(|_| String::from("demo")),
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }
}

impl FmpAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    async fn fetch_body(&self, url: String, context: &str) -> Result<String, SourceError> {
        let request = HttpRequest::get(url).with_timeout_ms(10_000);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("fmp transport error ({context}): {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "fmp returned status {} ({context})",
                response.status
            )));
        }

        Ok(response.body)
    }

    async fn fetch_dividends(&self, query: &EventsQuery) -> Result<Vec<CorporateEvent>, SourceError> {
        let url = format!(
            "{}/historical-price-full/stock_dividend/{}?apikey={}",
            self.base_url,
            urlencoding::encode(query.ticker.as_str()),
            self.api_key
        );
        let context = format!("dividends for {}", query.ticker);
        let body = self.fetch_body(url, &context).await?;
        parse_dividends_body(&body, &query.ticker)
    }

    async fn fetch_splits(&self, query: &EventsQuery) -> Result<Vec<CorporateEvent>, SourceError> {
        let url = format!(
            "{}/historical-price-full/stock_split/{}?apikey={}",
            self.base_url,
            urlencoding::encode(query.ticker.as_str()),
            self.api_key
        );
        let context = format!("splits for {}", query.ticker);
        let body = self.fetch_body(url, &context).await?;
        parse_splits_body(&body, &query.ticker)
    }
}

impl MarketDataSource for FmpAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fmp
    }

    fn price_bars<'a>(
        &'a self,
        query: BarsQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PriceBar>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/historical-price-full/{}?from={}&to={}&apikey={}",
                self.base_url,
                urlencoding::encode(query.ticker.as_str()),
                query.range.start(),
                query.range.end(),
                self.api_key
            );

            let context = format!(
                "bars for {} {}..{}",
                query.ticker,
                query.range.start(),
                query.range.end()
            );
            let body = self.fetch_body(url, &context).await?;
            parse_bars_body(&body, &query.ticker)
        })
    }

    fn corporate_events<'a>(
        &'a self,
        query: EventsQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CorporateEvent>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            // Two independent upstream calls; one failing half does not
            // block the other.
            let dividends = self.fetch_dividends(&query).await;
            let splits = self.fetch_splits(&query).await;

            let mut events = match (dividends, splits) {
                (Ok(mut dividends), Ok(mut splits)) => {
                    dividends.append(&mut splits);
                    dividends
                }
                (Ok(dividends), Err(error)) => {
                    tracing::warn!(
                        ticker = %query.ticker,
                        error = %error,
                        "split history unavailable, returning dividends only"
                    );
                    dividends
                }
                (Err(error), Ok(splits)) => {
                    tracing::warn!(
                        ticker = %query.ticker,
                        error = %error,
                        "dividend history unavailable, returning splits only"
                    );
                    splits
                }
                (Err(error), Err(_)) => return Err(error),
            };

            events.retain(|event| query.range.contains(event.date));
            events.sort_by_key(|event| event.date);
            Ok(events)
        })
    }
}

#[derive(Debug, Deserialize)]
struct FmpHistoricalResponse<Row> {
    #[serde(default)]
    historical: Option<Vec<Row>>,
}

#[derive(Debug, Default, Deserialize)]
struct FmpBarRow {
    date: Option<String>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FmpDividendRow {
    date: Option<String>,
    dividend: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FmpSplitRow {
    date: Option<String>,
    numerator: Option<f64>,
    denominator: Option<f64>,
    ratio: Option<f64>,
}

fn parse_bars_body(body: &str, ticker: &Ticker) -> Result<Vec<PriceBar>, SourceError> {
    let response: FmpHistoricalResponse<FmpBarRow> = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("fmp bars payload for {ticker}: {e}")))?;

    let rows = match response.historical {
        Some(rows) => rows,
        None => return Err(SourceError::ticker_not_found(ticker)),
    };

    let mut bars: Vec<PriceBar> = rows
        .into_iter()
        .filter_map(|row| match normalize_bar_row(&row) {
            Some(bar) => Some(bar),
            None => {
                tracing::warn!(ticker = %ticker, row = ?row, "skipping malformed bar row");
                None
            }
        })
        .collect();

    bars.sort_by_key(|bar| bar.date);
    bars.dedup_by_key(|bar| bar.date);
    Ok(bars)
}

fn normalize_bar_row(row: &FmpBarRow) -> Option<PriceBar> {
    let date = CalendarDate::parse(row.date.as_deref()?).ok()?;
    let volume = row.volume.filter(|v| v.is_finite() && *v >= 0.0)?;

    PriceBar::new(
        date,
        row.open?,
        row.high?,
        row.low?,
        row.close?,
        volume as u64,
    )
    .ok()
}

fn parse_dividends_body(body: &str, ticker: &Ticker) -> Result<Vec<CorporateEvent>, SourceError> {
    let response: FmpHistoricalResponse<FmpDividendRow> = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("fmp dividend payload for {ticker}: {e}")))?;

    // Unlike bars, a missing history key here just means no recorded
    // dividends for the ticker.
    let rows = response.historical.unwrap_or_default();

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let normalized = row
                .date
                .as_deref()
                .and_then(|date| CalendarDate::parse(date).ok())
                .zip(row.dividend)
                .and_then(|(date, amount)| CorporateEvent::dividend(date, amount).ok());

            if normalized.is_none() {
                tracing::warn!(ticker = %ticker, row = ?row, "skipping malformed dividend row");
            }
            normalized
        })
        .collect())
}

fn parse_splits_body(body: &str, ticker: &Ticker) -> Result<Vec<CorporateEvent>, SourceError> {
    let response: FmpHistoricalResponse<FmpSplitRow> = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("fmp split payload for {ticker}: {e}")))?;

    let rows = response.historical.unwrap_or_default();

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let normalized = normalize_split_row(&row);
            if normalized.is_none() {
                tracing::warn!(ticker = %ticker, row = ?row, "skipping malformed split row");
            }
            normalized
        })
        .collect())
}

fn normalize_split_row(row: &FmpSplitRow) -> Option<CorporateEvent> {
    let date = CalendarDate::parse(row.date.as_deref()?).ok()?;

    let parts = match (row.numerator, row.denominator) {
        (Some(numerator), Some(denominator))
            if numerator.is_finite()
                && denominator.is_finite()
                && numerator >= 1.0
                && denominator >= 1.0 =>
        {
            Some((numerator.round() as u32, denominator.round() as u32))
        }
        // Some feeds report only a raw ratio.
        _ => row.ratio.and_then(split_ratio_parts),
    }?;

    CorporateEvent::split(date, parts.0, parts.1).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(value: &str) -> Ticker {
        Ticker::parse(value).expect("valid ticker")
    }

    #[test]
    fn bars_are_sorted_ascending_and_deduplicated() {
        let body = r#"{
            "symbol": "AAPL",
            "historical": [
                {"date": "2024-01-03", "open": 10.0, "high": 11.0, "low": 9.5, "close": 10.5, "volume": 1200},
                {"date": "2024-01-02", "open": 9.0, "high": 10.0, "low": 8.5, "close": 9.5, "volume": 1000},
                {"date": "2024-01-03", "open": 10.1, "high": 11.1, "low": 9.6, "close": 10.6, "volume": 1300}
            ]
        }"#;

        let bars = parse_bars_body(body, &ticker("AAPL")).expect("parses");
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date.to_string(), "2024-01-02");
        assert_eq!(bars[1].date.to_string(), "2024-01-03");
    }

    #[test]
    fn malformed_bar_rows_are_skipped_not_fatal() {
        let body = r#"{
            "historical": [
                {"date": "2024-01-02", "open": 9.0, "high": 10.0, "low": 8.5, "close": 9.5, "volume": 1000},
                {"date": "2024-01-03", "open": null, "high": 10.0, "low": 8.5, "close": 9.5, "volume": 1000},
                {"date": "not-a-date", "open": 9.0, "high": 10.0, "low": 8.5, "close": 9.5, "volume": 1000},
                {"date": "2024-01-05", "open": 9.0, "high": 8.0, "low": 8.5, "close": 8.7, "volume": 1000}
            ]
        }"#;

        let bars = parse_bars_body(body, &ticker("AAPL")).expect("parses");
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date.to_string(), "2024-01-02");
    }

    #[test]
    fn missing_historical_key_is_ticker_not_found() {
        let error = parse_bars_body("{}", &ticker("ZZZZ")).expect_err("must fail");
        assert_eq!(
            error.kind(),
            crate::data_source::SourceErrorKind::TickerNotFound
        );
    }

    #[test]
    fn invalid_json_is_malformed_response() {
        let error = parse_bars_body("<html>oops</html>", &ticker("AAPL")).expect_err("must fail");
        assert_eq!(
            error.kind(),
            crate::data_source::SourceErrorKind::MalformedResponse
        );
    }

    #[test]
    fn dividends_without_history_key_are_empty() {
        let events = parse_dividends_body("{}", &ticker("AAPL")).expect("parses");
        assert!(events.is_empty());
    }

    #[test]
    fn split_rows_prefer_explicit_parts_over_ratio() {
        let body = r#"{
            "historical": [
                {"date": "2020-08-31", "numerator": 4.0, "denominator": 1.0, "ratio": 99.0},
                {"date": "2010-06-09", "ratio": 0.5}
            ]
        }"#;

        let events = parse_splits_body(body, &ticker("AAPL")).expect("parses");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].headline, "4:1 Stock Split");
        assert_eq!(events[1].headline, "1:2 Stock Split");
    }
}
