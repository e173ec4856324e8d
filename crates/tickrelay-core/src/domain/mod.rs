mod date;
mod models;
mod ticker;

pub use date::{CalendarDate, DateRange};
pub use models::{split_ratio_parts, CorporateEvent, EventKind, PriceBar};
pub use ticker::Ticker;
