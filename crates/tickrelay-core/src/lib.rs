//! # tickrelay-core
//!
//! Domain contracts, upstream adapter and request cache for the tickrelay
//! market-data proxy.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Financial Modeling Prep) |
//! | [`cache`] | Bounded LRU request cache with freshness window |
//! | [`clock`] | Injected time source |
//! | [`data_source`] | Provider trait, query types, error taxonomy |
//! | [`domain`] | Domain models (Ticker, CalendarDate, PriceBar, CorporateEvent) |
//! | [`error`] | Validation errors |
//! | [`http_client`] | Outbound HTTP transport abstraction |
//! | [`service`] | Cache-fronted service facade |
//!
//! ## Security
//!
//! The upstream API key is read from the environment at process start and
//! appears only in outbound request URLs, never in logs.

pub mod adapters;
pub mod cache;
pub mod clock;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod service;

pub use adapters::FmpAdapter;

pub use cache::QueryCache;

pub use clock::{Clock, SystemClock};

pub use data_source::{
    BarsQuery, EventsQuery, MarketDataSource, ProviderId, SourceError, SourceErrorKind,
};

pub use domain::{
    split_ratio_parts, CalendarDate, CorporateEvent, DateRange, EventKind, PriceBar, Ticker,
};

pub use error::ValidationError;

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

pub use service::{CachePolicy, MarketDataService};
