//! Fixed-price feed used when no on-chain pools are configured

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;
use super::VenueFeed;
use crate::{errors::GuardianResult, types::VenueSnapshot};

#[derive(Debug, Clone)]
struct SimulatedVenue {
    name: String,
    address: String,
    price: Decimal,
    liquidity: Decimal,
}

#[derive(Debug, Clone)]
pub struct SimulatedVenueFeed {
    venues: Vec<SimulatedVenue>,
    fee_level_gwei: Decimal,
}

impl SimulatedVenueFeed {
    /// Two stable pools, one trading slightly under the peg and one over it.
    pub fn new(fee_level_gwei: Decimal) -> Self {
        Self::empty(fee_level_gwei)
            .with_venue("Pool A", "0x0000000000000000000000000000000000000001", dec!(0.998), dec!(2000000))
            .with_venue("Pool B", "0x0000000000000000000000000000000000000002", dec!(1.004), dec!(1000000))
    }

    pub fn empty(fee_level_gwei: Decimal) -> Self {
        Self { venues: Vec::new(), fee_level_gwei }
    }

    pub fn with_venue(mut self, name: &str, address: &str, price: Decimal, liquidity: Decimal) -> Self {
        self.venues.push(SimulatedVenue {
            name: name.to_string(),
            address: address.to_string(),
            price,
            liquidity,
        });
        self
    }
}

#[async_trait]
impl VenueFeed for SimulatedVenueFeed {
    async fn fetch_snapshots(&self) -> GuardianResult<Vec<VenueSnapshot>> {
        let snapshots: Vec<VenueSnapshot> = self.venues
            .iter()
            .map(|v| VenueSnapshot::new(&v.name, &v.address, v.price, v.liquidity))
            .collect();
        debug!("Simulated feed produced {} snapshots", snapshots.len());
        Ok(snapshots)
    }

    async fn current_fee_level(&self) -> GuardianResult<Decimal> {
        Ok(self.fee_level_gwei)
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
