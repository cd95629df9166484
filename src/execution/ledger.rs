//! Live ledger access: swap submission and receipt checks

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, B256, keccak256, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::eth::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::info;
use crate::{
    config::{Config, EXECUTION_TIMEOUT_SECS},
    errors::{GuardianError, GuardianResult},
    types::Opportunity,
};

const SWAP_DEADLINE_SECS: u64 = 1200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub tx_hash: String,
    pub gas_used: u64,
    pub effective_gas_price_gwei: Decimal,
    /// Receipt status; `false` means the transaction was mined but reverted.
    pub confirmed: bool,
}

/// Signing-capable counterparty used in live mode.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn submit(&self, opportunity: &Opportunity) -> Result<LedgerReceipt>;

    /// `Ok(false)` for unknown or reverted references.
    async fn is_confirmed(&self, reference: &str) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct SwapRoute {
    pub router: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub token_in_decimals: u32,
    pub token_out_decimals: u32,
    pub slippage_tolerance_bps: u32,
    pub max_gas_price_gwei: u32,
}

pub struct AlloyLedger {
    provider: Arc<dyn Provider>,
    account: Address,
    route: SwapRoute,
}

impl AlloyLedger {
    pub async fn connect(config: &Config) -> GuardianResult<Self> {
        let key = config.private_key.as_deref()
            .ok_or_else(|| GuardianError::config("live execution requires PRIVATE_KEY (signing capability)"))?;
        let signer = PrivateKeySigner::from_str(key)
            .map_err(|e| GuardianError::config(format!("Failed to parse private key: {}", e)))?;
        let account = signer.address();
        let wallet = EthereumWallet::from(signer);

        let route = SwapRoute {
            router: parse_address(config.router_address.as_deref(), "ROUTER_ADDRESS")?,
            token_in: parse_address(config.swap_token_in.as_deref(), "SWAP_TOKEN_IN")?,
            token_out: parse_address(config.swap_token_out.as_deref(), "SWAP_TOKEN_OUT")?,
            token_in_decimals: config.token0_decimals,
            token_out_decimals: config.token_out_decimals,
            slippage_tolerance_bps: config.slippage_tolerance_bps,
            max_gas_price_gwei: config.max_gas_price_gwei,
        };

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_builtin(&config.rpc_url)
            .await
            .map_err(|e| GuardianError::Ledger {
                message: format!("failed to connect to {}", config.rpc_url),
                source: e.into(),
            })?;

        info!("🔑 Live ledger ready for account {}", account);
        Ok(Self { provider: Arc::new(provider), account, route })
    }
}

fn parse_address(value: Option<&str>, key: &str) -> GuardianResult<Address> {
    let raw = value.ok_or_else(|| GuardianError::config(format!("live execution requires {}", key)))?;
    Address::from_str(raw).map_err(|e| GuardianError::config(format!("invalid {} '{}': {}", key, raw, e)))
}

/// Scales a decimal amount to integer token units, truncating dust.
fn to_token_units(amount: Decimal, decimals: u32) -> Result<U256> {
    let scaled = (0..decimals).try_fold(amount, |acc, _| acc.checked_mul(dec!(10)))
        .ok_or_else(|| anyhow::anyhow!("amount {} overflows at {} decimals", amount, decimals))?;
    let units = scaled.trunc().to_u128()
        .ok_or_else(|| anyhow::anyhow!("amount {} is not representable", amount))?;
    Ok(U256::from(units))
}

fn wei_to_gwei(wei: u128) -> Decimal {
    Decimal::from_u128(wei).unwrap_or(Decimal::MAX) / dec!(1000000000)
}

/// ABI-encodes `swapExactTokensForTokens(uint256,uint256,address[],address,uint256)`.
pub fn encode_swap_exact_tokens(
    amount_in: U256,
    amount_out_min: U256,
    path: &[Address],
    to: Address,
    deadline: U256,
) -> Vec<u8> {
    let mut encoded = keccak256("swapExactTokensForTokens(uint256,uint256,address[],address,uint256)")[..4].to_vec();

    encoded.extend_from_slice(&amount_in.to_be_bytes::<32>());
    encoded.extend_from_slice(&amount_out_min.to_be_bytes::<32>());
    // Offset of the dynamic path array: five head words.
    encoded.extend_from_slice(&U256::from(160).to_be_bytes::<32>());
    encoded.extend_from_slice(&[0u8; 12]);
    encoded.extend_from_slice(to.as_slice());
    encoded.extend_from_slice(&deadline.to_be_bytes::<32>());
    encoded.extend_from_slice(&U256::from(path.len()).to_be_bytes::<32>());

    for addr in path {
        encoded.extend_from_slice(&[0u8; 12]);
        encoded.extend_from_slice(addr.as_slice());
    }

    encoded
}

#[async_trait]
impl Ledger for AlloyLedger {
    async fn submit(&self, opportunity: &Opportunity) -> Result<LedgerReceipt> {
        let route = &self.route;
        let amount_in = to_token_units(opportunity.trade_size_usd, route.token_in_decimals)?;
        let slippage_factor = dec!(1) - Decimal::from(route.slippage_tolerance_bps) / dec!(10000);
        let amount_out_min = to_token_units(opportunity.trade_size_usd * slippage_factor, route.token_out_decimals)?;
        let deadline = U256::from(
            SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?.as_secs() + SWAP_DEADLINE_SECS,
        );

        let swap_data = encode_swap_exact_tokens(
            amount_in,
            amount_out_min,
            &[route.token_in, route.token_out],
            self.account,
            deadline,
        );

        let tx = TransactionRequest::default()
            .to(route.router)
            .input(swap_data.into())
            .gas_limit(300_000)
            .max_fee_per_gas(route.max_gas_price_gwei as u128 * 1_000_000_000)
            .max_priority_fee_per_gas(1_000_000_000);

        info!("📤 Submitting swap for {} via router {}", opportunity.id, route.router);

        let pending_tx = self.provider
            .send_transaction(tx)
            .await
            .context("Failed to send transaction")?;
        let tx_hash = format!("{:?}", pending_tx.tx_hash());

        info!("📡 Transaction sent: {}", tx_hash);

        tokio::select! {
            result = pending_tx.get_receipt() => {
                let receipt = result.context("Transaction failed")?;
                Ok(LedgerReceipt {
                    tx_hash,
                    gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
                    effective_gas_price_gwei: wei_to_gwei(receipt.effective_gas_price),
                    confirmed: receipt.status(),
                })
            }
            _ = tokio::time::sleep(Duration::from_secs(EXECUTION_TIMEOUT_SECS)) => {
                Err(anyhow::anyhow!("Transaction timeout after {} seconds", EXECUTION_TIMEOUT_SECS))
            }
        }
    }

    async fn is_confirmed(&self, reference: &str) -> Result<bool> {
        let hash = match B256::from_str(reference) {
            Ok(hash) => hash,
            Err(_) => return Ok(false),
        };
        let receipt = self.provider
            .get_transaction_receipt(hash)
            .await
            .context("Failed to fetch receipt")?;
        Ok(receipt.map(|r| r.status()).unwrap_or(false))
    }
}
