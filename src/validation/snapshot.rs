//! Venue snapshot validation

use anyhow::Result;
use rust_decimal::Decimal;
use crate::types::VenueSnapshot;

pub fn validate_snapshot(snapshot: &VenueSnapshot) -> Result<()> {
    if snapshot.price <= Decimal::ZERO {
        return Err(anyhow::anyhow!(
            "{} price is zero or negative: {}",
            snapshot.name,
            snapshot.price
        ));
    }

    if snapshot.liquidity < Decimal::ZERO {
        return Err(anyhow::anyhow!(
            "{} reports negative liquidity: {}",
            snapshot.name,
            snapshot.liquidity
        ));
    }

    Ok(())
}
