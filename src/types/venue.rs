//! Venue snapshot types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Point-in-time view of one liquidity venue. Never mutated after capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueSnapshot {
    pub name: String,
    pub address: String,
    /// Source-currency per quote-currency.
    pub price: Decimal,
    /// Tradable depth in quote-currency units.
    pub liquidity: Decimal,
    pub captured_at: DateTime<Utc>,
}

impl VenueSnapshot {
    pub fn new(name: &str, address: &str, price: Decimal, liquidity: Decimal) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            price,
            liquidity,
            captured_at: Utc::now(),
        }
    }
}
