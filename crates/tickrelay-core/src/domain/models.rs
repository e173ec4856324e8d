use serde::{Deserialize, Serialize};

use crate::{CalendarDate, ValidationError};

/// Daily OHLCV bar.
///
/// One bar per calendar date per ticker; immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: CalendarDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(
        date: CalendarDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Corporate action category reported by the upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Dividend,
    Split,
}

/// Normalized corporate action with provider-formatted display text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorporateEvent {
    pub date: CalendarDate,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "event")]
    pub headline: String,
    pub description: String,
    #[serde(skip)]
    pub magnitude: f64,
}

impl CorporateEvent {
    /// Cash dividend; `amount` is the per-share payment.
    pub fn dividend(date: CalendarDate, amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "dividend" });
        }
        if amount <= 0.0 {
            return Err(ValidationError::NonPositiveDividend);
        }

        Ok(Self {
            date,
            kind: EventKind::Dividend,
            headline: format!("Dividend: ${amount:.2}"),
            description: format!("${amount:.2} dividend payment"),
            magnitude: amount,
        })
    }

    /// Stock split expressed as `numerator:denominator` new-for-old shares.
    pub fn split(date: CalendarDate, numerator: u32, denominator: u32) -> Result<Self, ValidationError> {
        if numerator == 0 || denominator == 0 {
            return Err(ValidationError::InvalidSplitRatio);
        }

        Ok(Self {
            date,
            kind: EventKind::Split,
            headline: format!("{numerator}:{denominator} Stock Split"),
            description: format!("{numerator}:{denominator} stock split"),
            magnitude: f64::from(numerator) / f64::from(denominator),
        })
    }
}

/// Derive integer split parts from a raw ratio.
///
/// Providers that report a single ratio instead of explicit parts get the
/// rounded form: ratio >= 1 becomes `round(ratio):1`, anything below one
/// becomes `1:round(1/ratio)`. Whether upstream sources round or truncate
/// is provider-dependent; rounding is the behavior pinned here.
pub fn split_ratio_parts(ratio: f64) -> Option<(u32, u32)> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return None;
    }

    let (numerator, denominator) = if ratio >= 1.0 {
        (ratio.round(), 1.0)
    } else {
        (1.0, (1.0 / ratio).round())
    };

    if numerator < 1.0 || denominator < 1.0 || numerator > f64::from(u32::MAX) || denominator > f64::from(u32::MAX) {
        return None;
    }

    Some((numerator as u32, denominator as u32))
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
