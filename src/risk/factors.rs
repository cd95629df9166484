//! Individual risk factor step functions
//!
//! Breakpoints are fixed; each function walks its thresholds in order and
//! the first match wins.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Stable value the pegged asset is meant to hold.
pub const PEG_REFERENCE_PRICE: Decimal = dec!(1.0);
/// Notional trade used to estimate slippage against venue depth.
pub const SLIPPAGE_REFERENCE_TRADE_USD: Decimal = dec!(10000);

/// Weights in table order: liquidity, price impact, gas cost, volatility,
/// slippage, competition.
pub const FACTOR_WEIGHTS: [Decimal; 6] = [
    dec!(0.25),
    dec!(0.20),
    dec!(0.20),
    dec!(0.15),
    dec!(0.10),
    dec!(0.10),
];

pub fn liquidity_risk(liquidity: Decimal) -> u8 {
    match liquidity {
        l if l > dec!(5000000) => 10,
        l if l > dec!(1000000) => 25,
        l if l > dec!(500000) => 40,
        l if l > dec!(100000) => 65,
        _ => 90,
    }
}

pub fn price_impact_risk(divergence_pct: Decimal) -> u8 {
    match divergence_pct {
        d if d < dec!(0.5) => 20,
        d if d < dec!(1.0) => 35,
        d if d < dec!(2.0) => 50,
        d if d < dec!(5.0) => 70,
        _ => 95,
    }
}

/// `net / (net + fee)`. A zero or unrepresentable ratio counts as no margin at all.
pub fn profit_margin(net_profit_usd: Decimal, fee_cost_usd: Decimal) -> Decimal {
    net_profit_usd
        .checked_add(fee_cost_usd)
        .and_then(|total| net_profit_usd.checked_div(total))
        .unwrap_or(Decimal::ZERO)
}

pub fn gas_cost_risk(fee_level_gwei: Decimal, net_profit_usd: Decimal, fee_cost_usd: Decimal) -> u8 {
    if fee_level_gwei > dec!(100) {
        return 80;
    }
    if fee_level_gwei > dec!(50) {
        return 60;
    }

    match profit_margin(net_profit_usd, fee_cost_usd) {
        m if m < dec!(0.3) => 70,
        m if m < dec!(0.5) => 50,
        m if m < dec!(0.7) => 30,
        _ => 15,
    }
}

/// Distance of the two venues' mean price from the peg.
pub fn peg_deviation(source_price: Decimal, target_price: Decimal) -> Decimal {
    ((source_price + target_price) / dec!(2) - PEG_REFERENCE_PRICE).abs()
}

pub fn volatility_risk(source_price: Decimal, target_price: Decimal) -> u8 {
    match peg_deviation(source_price, target_price) {
        d if d < dec!(0.005) => 10,
        d if d < dec!(0.01) => 25,
        d if d < dec!(0.02) => 45,
        d if d < dec!(0.05) => 70,
        _ => 95,
    }
}

pub fn slippage_risk(liquidity: Decimal) -> u8 {
    if liquidity <= Decimal::ZERO {
        return 85;
    }

    let Some(ratio) = SLIPPAGE_REFERENCE_TRADE_USD.checked_div(liquidity) else {
        return 85;
    };
    match ratio {
        r if r < dec!(0.001) => 10,
        r if r < dec!(0.005) => 25,
        r if r < dec!(0.01) => 40,
        r if r < dec!(0.02) => 60,
        _ => 85,
    }
}

pub fn competition_risk(net_profit_usd: Decimal) -> u8 {
    match net_profit_usd {
        p if p > dec!(1000) => 75,
        p if p > dec!(500) => 60,
        p if p > dec!(100) => 45,
        p if p > dec!(50) => 30,
        _ => 20,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liquidity_breakpoints_are_exclusive() {
        assert_eq!(liquidity_risk(dec!(5000001)), 10);
        assert_eq!(liquidity_risk(dec!(5000000)), 25);
        assert_eq!(liquidity_risk(dec!(1000000)), 40);
        assert_eq!(liquidity_risk(dec!(500000)), 65);
        assert_eq!(liquidity_risk(dec!(100000)), 90);
        assert_eq!(liquidity_risk(dec!(0)), 90);
    }

    #[test]
    fn price_impact_breakpoints() {
        assert_eq!(price_impact_risk(dec!(0.49)), 20);
        assert_eq!(price_impact_risk(dec!(0.5)), 35);
        assert_eq!(price_impact_risk(dec!(1.0)), 50);
        assert_eq!(price_impact_risk(dec!(2.0)), 70);
        assert_eq!(price_impact_risk(dec!(5.0)), 95);
    }

    #[test]
    fn fee_level_surcharge_precedes_margin() {
        assert_eq!(gas_cost_risk(dec!(101), dec!(100), dec!(1)), 80);
        assert_eq!(gas_cost_risk(dec!(51), dec!(100), dec!(1)), 60);
        assert_eq!(gas_cost_risk(dec!(50), dec!(100), dec!(1)), 15);
    }

    #[test]
    fn margin_breakpoints() {
        assert_eq!(gas_cost_risk(dec!(1), dec!(2), dec!(8)), 70); // 0.2
        assert_eq!(gas_cost_risk(dec!(1), dec!(3), dec!(7)), 50); // 0.3
        assert_eq!(gas_cost_risk(dec!(1), dec!(5), dec!(5)), 30); // 0.5
        assert_eq!(gas_cost_risk(dec!(1), dec!(7), dec!(3)), 15); // 0.7
        assert_eq!(gas_cost_risk(dec!(1), dec!(0), dec!(0)), 70);
        assert_eq!(profit_margin(Decimal::MAX, Decimal::MAX), Decimal::ZERO);
    }

    #[test]
    fn volatility_uses_mean_price_distance_from_peg() {
        assert_eq!(peg_deviation(dec!(0.998), dec!(1.004)), dec!(0.001));
        assert_eq!(volatility_risk(dec!(0.998), dec!(1.004)), 10);
        assert_eq!(volatility_risk(dec!(0.99), dec!(1.0)), 25);
        assert_eq!(volatility_risk(dec!(0.98), dec!(0.99)), 45);
        assert_eq!(volatility_risk(dec!(0.96), dec!(0.96)), 70);
        assert_eq!(volatility_risk(dec!(0.90), dec!(0.92)), 95);
    }

    #[test]
    fn slippage_ratio_boundary_is_exclusive() {
        assert_eq!(slippage_risk(dec!(20000000)), 10);
        assert_eq!(slippage_risk(dec!(2000000)), 40);
        assert_eq!(slippage_risk(dec!(1000001)), 40);
        assert_eq!(slippage_risk(dec!(500000)), 85);
        assert_eq!(slippage_risk(dec!(0)), 85);
        assert_eq!(slippage_risk(Decimal::from_scientific("1e-27").unwrap()), 85);
    }

    #[test]
    fn competition_grows_with_profit() {
        assert_eq!(competition_risk(dec!(1001)), 75);
        assert_eq!(competition_risk(dec!(501)), 60);
        assert_eq!(competition_risk(dec!(101)), 45);
        assert_eq!(competition_risk(dec!(55)), 30);
        assert_eq!(competition_risk(dec!(50)), 20);
        assert_eq!(competition_risk(dec!(-3)), 20);
    }
}
