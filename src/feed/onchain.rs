//! Feed reading UniswapV2-style pair reserves over JSON-RPC

use alloy::{
    primitives::{Address, keccak256, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::eth::TransactionRequest,
    sol_types::SolValue,
    transports::http::reqwest::Url,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::prelude::*;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};
use super::VenueFeed;
use crate::{
    config::{Config, PoolSpec},
    errors::{GuardianError, GuardianResult},
    network::retry::{retry_with_backoff, RetryConfig},
    types::VenueSnapshot,
    ConcreteProvider,
};

const GWEI: u128 = 1_000_000_000;

#[derive(Debug, Clone)]
struct OnchainPool {
    name: String,
    address: Address,
}

pub struct OnchainVenueFeed {
    provider: Arc<ConcreteProvider>,
    pools: Vec<OnchainPool>,
    token0_decimals: u32,
    token1_decimals: u32,
    retry: RetryConfig,
}

impl OnchainVenueFeed {
    pub fn connect(config: &Config) -> GuardianResult<Self> {
        let url = config.rpc_url.parse::<Url>()
            .map_err(|e| GuardianError::config(format!("invalid RPC_URL '{}': {}", config.rpc_url, e)))?;
        let provider: Arc<ConcreteProvider> = Arc::new(ProviderBuilder::new().on_http(url).boxed());

        Self::new(provider, &config.venue_pools, config.token0_decimals, config.token1_decimals)
    }

    pub fn new(
        provider: Arc<ConcreteProvider>,
        pools: &[PoolSpec],
        token0_decimals: u32,
        token1_decimals: u32,
    ) -> GuardianResult<Self> {
        let pools = pools
            .iter()
            .map(|spec| {
                Address::from_str(&spec.address)
                    .map(|address| OnchainPool { name: spec.name.clone(), address })
                    .map_err(|e| GuardianError::config(format!(
                        "invalid pool address for {}: {}", spec.name, e
                    )))
            })
            .collect::<GuardianResult<Vec<_>>>()?;

        info!("🔗 On-chain feed watching {} pools", pools.len());

        Ok(Self {
            provider,
            pools,
            token0_decimals,
            token1_decimals,
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 200,
                ..Default::default()
            },
        })
    }

    async fn snapshot(&self, pool: &OnchainPool) -> GuardianResult<VenueSnapshot> {
        let (r0, r1) = retry_with_backoff(
            || async { get_pool_reserves(self.provider.as_ref(), pool.address).await },
            &self.retry,
            &format!("get reserves for {}", pool.name),
        ).await?;

        let (price, liquidity) = price_and_liquidity(r0, r1, self.token0_decimals, self.token1_decimals)
            .map_err(|e| GuardianError::feed(format!("unusable reserves for {}", pool.name), Some(e)))?;

        debug!("{} price={} liquidity={}", pool.name, price, liquidity);
        Ok(VenueSnapshot::new(&pool.name, &pool.address.to_string(), price, liquidity))
    }
}

pub async fn get_pool_reserves(provider: &ConcreteProvider, pool: Address) -> Result<(U256, U256)> {
    let data = keccak256("getReserves()")[..4].to_vec();
    let tx = TransactionRequest::default()
        .to(pool)
        .input(data.into());

    let result = provider.call(&tx).await
        .context("Failed to call getReserves")?;
    let decoded = <(U256, U256, U256)>::abi_decode(&result, true)
        .context("Failed to decode reserves")?;
    Ok((decoded.0, decoded.1))
}

/// Converts raw reserves into `(token0 price in token1, total depth in token1)`.
pub fn price_and_liquidity(
    reserve0: U256,
    reserve1: U256,
    token0_decimals: u32,
    token1_decimals: u32,
) -> Result<(Decimal, Decimal)> {
    if reserve0.is_zero() || reserve1.is_zero() {
        return Err(anyhow::anyhow!("Pool has zero reserves"));
    }

    let amount0 = normalise(reserve0, token0_decimals).context("Failed to parse reserve0")?;
    let amount1 = normalise(reserve1, token1_decimals).context("Failed to parse reserve1")?;
    if amount0.is_zero() {
        return Err(anyhow::anyhow!("reserve0 rounds to zero"));
    }

    let price = amount1
        .checked_div(amount0)
        .ok_or_else(|| anyhow::anyhow!("price {} / {} out of range", amount1, amount0))?;
    let liquidity = amount0
        .checked_add(amount1)
        .ok_or_else(|| anyhow::anyhow!("liquidity {} + {} out of range", amount0, amount1))?;
    Ok((price, liquidity))
}

fn normalise(raw: U256, decimals: u32) -> Result<Decimal> {
    let value = Decimal::from_str(&raw.to_string())?;
    let scale = (0..decimals).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(Decimal::TEN))
        .ok_or_else(|| anyhow::anyhow!("decimals {} out of range", decimals))?;
    Ok(value / scale)
}

#[async_trait]
impl VenueFeed for OnchainVenueFeed {
    async fn fetch_snapshots(&self) -> GuardianResult<Vec<VenueSnapshot>> {
        let mut snapshots = Vec::with_capacity(self.pools.len());
        for pool in &self.pools {
            snapshots.push(self.snapshot(pool).await?);
        }
        Ok(snapshots)
    }

    async fn current_fee_level(&self) -> GuardianResult<Decimal> {
        let wei = retry_with_backoff(
            || async {
                self.provider.get_gas_price().await
                    .context("Failed to get gas price")
            },
            &self.retry,
            "gas price",
        ).await?;

        let whole = Decimal::from_u128(wei / GWEI).unwrap_or(Decimal::MAX);
        let fraction = Decimal::from_u128(wei % GWEI).unwrap_or(Decimal::ZERO) / Decimal::from(GWEI as u64);
        Ok(whole + fraction)
    }

    fn name(&self) -> &str {
        "on-chain"
    }
}
