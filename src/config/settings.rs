//! Guardian configuration settings and environment variable handling

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use crate::{
    errors::{GuardianError, GuardianResult},
    types::ExecutionMode,
};

// Configuration constants
pub const DEFAULT_MIN_DIVERGENCE: Decimal = dec!(0.003); // 0.3%
pub const DEFAULT_MIN_PROFIT_USD: Decimal = dec!(5);
pub const DEFAULT_TRADE_SIZE_USD: Decimal = dec!(1000);
pub const MAX_SLIPPAGE_BPS: u32 = 100; // 1%
pub const DEFAULT_GAS_PRICE_GWEI: u32 = 50;
pub const MAX_GAS_PRICE_GWEI: u32 = 500;
pub const EXECUTION_TIMEOUT_SECS: u64 = 30;

// Loop timing
pub const IDLE_BACKOFF_SECS: u64 = 5;
pub const CYCLE_DELAY_SECS: u64 = 10;
pub const DEFAULT_SIMULATED_LATENCY_MS: u64 = 1500;
pub const DEFAULT_ADVISORY_TIMEOUT_SECS: u64 = 10;

/// A configured on-chain venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSpec {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Detection & decision
    pub min_divergence: Decimal,
    pub min_profit_usd: Decimal,
    pub trade_size_usd: Decimal,
    // Execution
    pub execution_mode: ExecutionMode,
    pub rpc_url: String,
    pub private_key: Option<String>,
    pub router_address: Option<String>,
    pub swap_token_in: Option<String>,
    pub swap_token_out: Option<String>,
    pub token_out_decimals: u32,
    pub slippage_tolerance_bps: u32,
    pub max_gas_price_gwei: u32,
    pub simulated_latency_ms: u64,
    pub simulation_seed: Option<u64>,
    // Venue feed
    pub venue_pools: Vec<PoolSpec>,
    pub token0_decimals: u32,
    pub token1_decimals: u32,
    pub simulated_fee_gwei: Decimal,
    // Advisory
    pub openai_api_key: Option<String>,
    pub advisory_model: String,
    pub advisory_timeout_secs: u64,
    // Output
    pub output_dir: String,
    /// Keys whose values were present but could not be parsed.
    pub rejected: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source. Unset keys take defaults;
    /// values that fail to parse are recorded in `rejected` and reported by
    /// [`Config::validate`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let min_divergence = parse_or(&lookup, &mut rejected, "MIN_DIVERGENCE_THRESHOLD", DEFAULT_MIN_DIVERGENCE);
        let min_profit_usd = parse_or(&lookup, &mut rejected, "MIN_PROFIT_USD", DEFAULT_MIN_PROFIT_USD);
        let trade_size_usd = parse_or(&lookup, &mut rejected, "TRADE_SIZE_USD", DEFAULT_TRADE_SIZE_USD);
        let execution_mode = parse_or(&lookup, &mut rejected, "EXECUTION_MODE", ExecutionMode::Simulation);
        let token_out_decimals = parse_or(&lookup, &mut rejected, "TOKEN_OUT_DECIMALS", 6u32);
        let slippage_tolerance_bps =
            parse_or(&lookup, &mut rejected, "SLIPPAGE_TOLERANCE_BPS", 50u32).min(MAX_SLIPPAGE_BPS); // 0.5% default
        let max_gas_price_gwei =
            parse_or(&lookup, &mut rejected, "MAX_GAS_PRICE_GWEI", DEFAULT_GAS_PRICE_GWEI).min(MAX_GAS_PRICE_GWEI);
        let simulated_latency_ms =
            parse_or(&lookup, &mut rejected, "SIMULATED_LATENCY_MS", DEFAULT_SIMULATED_LATENCY_MS);
        let simulation_seed = match non_empty("SIMULATION_SEED") {
            Some(_) => Some(parse_or(&lookup, &mut rejected, "SIMULATION_SEED", 0u64)),
            None => None,
        };
        let token0_decimals = parse_or(&lookup, &mut rejected, "TOKEN0_DECIMALS", 18u32);
        let token1_decimals = parse_or(&lookup, &mut rejected, "TOKEN1_DECIMALS", 6u32);
        let simulated_fee_gwei = parse_or(&lookup, &mut rejected, "SIMULATED_FEE_GWEI", dec!(20));
        let advisory_timeout_secs =
            parse_or(&lookup, &mut rejected, "ADVISORY_TIMEOUT_SECS", DEFAULT_ADVISORY_TIMEOUT_SECS);

        Self {
            min_divergence,
            min_profit_usd,
            trade_size_usd,
            execution_mode,
            rpc_url: lookup("RPC_URL")
                .unwrap_or_else(|| "https://sepolia.base.org".to_string()),
            private_key: non_empty("PRIVATE_KEY"),
            router_address: non_empty("ROUTER_ADDRESS"),
            swap_token_in: non_empty("SWAP_TOKEN_IN"),
            swap_token_out: non_empty("SWAP_TOKEN_OUT"),
            token_out_decimals,
            slippage_tolerance_bps,
            max_gas_price_gwei,
            simulated_latency_ms,
            simulation_seed,
            venue_pools: lookup("VENUE_POOLS")
                .map(|s| parse_pool_specs(&s))
                .unwrap_or_default(),
            token0_decimals,
            token1_decimals,
            simulated_fee_gwei,
            openai_api_key: non_empty("OPENAI_API_KEY"),
            advisory_model: lookup("ADVISORY_MODEL")
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            advisory_timeout_secs,
            output_dir: lookup("OUTPUT_DIR").unwrap_or_else(|| "output".to_string()),
            rejected,
        }
    }

    /// Startup checks. Any failure here is fatal: the loop never starts.
    pub fn validate(&self) -> GuardianResult<()> {
        if !self.rejected.is_empty() {
            return Err(GuardianError::config(format!(
                "unparsable value for {}",
                self.rejected.join(", ")
            )));
        }
        if self.min_divergence <= Decimal::ZERO || self.min_divergence >= Decimal::ONE {
            return Err(GuardianError::config(format!(
                "divergence threshold must be a fraction in (0, 1), got {}",
                self.min_divergence
            )));
        }
        if self.min_profit_usd < Decimal::ZERO {
            return Err(GuardianError::config(format!(
                "minimum profit must not be negative, got {}",
                self.min_profit_usd
            )));
        }
        if self.trade_size_usd <= Decimal::ZERO {
            return Err(GuardianError::config(format!(
                "trade size must be positive, got {}",
                self.trade_size_usd
            )));
        }
        if self.execution_mode == ExecutionMode::Live {
            if self.private_key.is_none() {
                return Err(GuardianError::config(
                    "live execution requires PRIVATE_KEY (signing capability)",
                ));
            }
            if self.router_address.is_none()
                || self.swap_token_in.is_none()
                || self.swap_token_out.is_none()
            {
                return Err(GuardianError::config(
                    "live execution requires ROUTER_ADDRESS, SWAP_TOKEN_IN and SWAP_TOKEN_OUT",
                ));
            }
        }
        Ok(())
    }

    pub fn advisory_timeout(&self) -> Duration {
        Duration::from_secs(self.advisory_timeout_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

/// Blank or missing keys take `default`; anything else must parse.
fn parse_or<F, T>(lookup: &F, rejected: &mut Vec<String>, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            rejected.push(key.to_string());
            default
        }),
        _ => default,
    }
}

/// Parses `name=0xaddr,name=0xaddr`. Entries without a name use the address.
pub fn parse_pool_specs(raw: &str) -> Vec<PoolSpec> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, address)) => PoolSpec {
                name: name.trim().to_string(),
                address: address.trim().to_string(),
            },
            None => PoolSpec {
                name: entry.to_string(),
                address: entry.to_string(),
            },
        })
        .collect()
}
