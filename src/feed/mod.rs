//! Venue feeds: where snapshots and the network fee level come from

pub mod onchain;
pub mod simulated;

pub use onchain::OnchainVenueFeed;
pub use simulated::SimulatedVenueFeed;

use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::{errors::GuardianResult, types::VenueSnapshot};

/// Source of point-in-time venue state.
///
/// Both calls may fail transiently with `FeedUnavailable`; the loop treats
/// that as a cycle without candidates.
#[async_trait]
pub trait VenueFeed: Send + Sync {
    async fn fetch_snapshots(&self) -> GuardianResult<Vec<VenueSnapshot>>;

    /// Current network fee level in gwei.
    async fn current_fee_level(&self) -> GuardianResult<Decimal>;

    fn name(&self) -> &str;
}
