//! Prompt templates for the remote advisory model

use crate::types::{MarketContext, Opportunity, RiskAssessment};

pub const SYSTEM_PROMPT: &str = "You review pairwise price discrepancies between pools of a \
pegged stable asset. Judge whether acting on the discrepancy is worth the execution and \
liquidity risk. Protect capital first, but do not dismiss sound opportunities. \
Answer in at most three sentences.";

pub fn opportunity_prompt(
    opportunity: &Opportunity,
    assessment: &RiskAssessment,
    context: &MarketContext,
) -> String {
    let factors = &assessment.factors;
    format!(
        "Venue pair: {source} (price {source_price}) -> {target} (price {target_price})\n\
         Divergence: {divergence:.3}%\n\
         Gross profit: ${gross:.2} | Fee cost: ${fee:.3} | Net profit: ${net:.2}\n\
         Source liquidity: ${liquidity:.0}\n\
         Fee level: {fee_level} gwei\n\
         \n\
         Risk: {overall}/100 ({category}), rule-based call: {recommendation}\n\
         Sub-scores: liquidity {l}, price impact {p}, gas cost {g}, volatility {v}, slippage {s}, competition {c}\n\
         \n\
         Market: {count} candidate(s) this cycle, average risk {avg_risk:.1}, average net ${avg_profit:.2}, peg reference {reference}\n\
         \n\
         Is the spread wide enough, what could go wrong during execution, and would you \
         EXECUTE, WAIT or SKIP?",
        source = opportunity.source.name,
        source_price = opportunity.source.price,
        target = opportunity.target.name,
        target_price = opportunity.target.price,
        divergence = opportunity.divergence_pct,
        gross = opportunity.gross_profit_usd,
        fee = opportunity.fee_cost_usd,
        net = opportunity.net_profit_usd,
        liquidity = opportunity.liquidity_available,
        fee_level = context.fee_level_gwei,
        overall = assessment.overall,
        category = assessment.category,
        recommendation = assessment.recommendation,
        l = factors.liquidity_risk,
        p = factors.price_impact_risk,
        g = factors.gas_cost_risk,
        v = factors.volatility_risk,
        s = factors.slippage_risk,
        c = factors.competition_risk,
        count = context.candidate_count,
        avg_risk = context.average_risk,
        avg_profit = context.average_net_profit_usd,
        reference = context.reference_price,
    )
}
