use std::sync::Arc;

use tickrelay_core::{Clock, MarketDataService};

use crate::rate_limit::RequestGates;

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub service: MarketDataService,
    pub gates: RequestGates,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(service: MarketDataService, gates: RequestGates, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            service,
            gates,
            clock,
        })
    }
}
