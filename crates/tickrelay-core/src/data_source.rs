//! Upstream provider contract and request/response types.
//!
//! `MarketDataSource` is the single polymorphic capability every provider
//! implements: historical price bars and corporate-action history. One
//! concrete adapter exists per provider, selected at construction time.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CorporateEvent, DateRange, PriceBar, Ticker, ValidationError};

/// Upstream provider identifier used in logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Fmp,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fmp => "fmp",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The query itself is unusable (empty ticker, inverted range).
    InvalidRequest,
    /// Network failure, timeout, or a non-2xx upstream status.
    Unavailable,
    /// Upstream reports no historical series for the ticker.
    TickerNotFound,
    /// Upstream responded 2xx but the payload is missing expected keys.
    MalformedResponse,
}

/// Structured upstream error surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn ticker_not_found(ticker: &Ticker) -> Self {
        Self {
            kind: SourceErrorKind::TickerNotFound,
            message: format!("no historical series for '{ticker}'"),
            retryable: false,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::TickerNotFound => "source.ticker_not_found",
            SourceErrorKind::MalformedResponse => "source.malformed_response",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Request payload for the price-bar endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BarsQuery {
    pub ticker: Ticker,
    pub range: DateRange,
}

impl BarsQuery {
    pub fn new(ticker: Ticker, range: DateRange) -> Self {
        Self { ticker, range }
    }
}

/// Request payload for the corporate-event endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventsQuery {
    pub ticker: Ticker,
    pub range: DateRange,
}

impl EventsQuery {
    pub fn new(ticker: Ticker, range: DateRange) -> Self {
        Self { ticker, range }
    }
}

/// Provider adapter contract.
///
/// Implementations must be `Send + Sync`; they are shared across request
/// tasks behind an `Arc`.
pub trait MarketDataSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches daily OHLCV bars for the query window.
    ///
    /// The result is sorted strictly ascending by date with no duplicate
    /// dates. Rows lacking required numeric fields are skipped and logged,
    /// never fatal.
    fn price_bars<'a>(
        &'a self,
        query: BarsQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PriceBar>, SourceError>> + Send + 'a>>;

    /// Fetches dividend and split history, filtered to the query window
    /// (inclusive) and sorted ascending by date.
    fn corporate_events<'a>(
        &'a self,
        query: EventsQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CorporateEvent>, SourceError>> + Send + 'a>>;
}
