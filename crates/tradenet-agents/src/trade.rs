//! Bidirectional barter between two co-located agents.
//!
//! A trade runs in two directions, first agent to second and then second
//! to first. Each agent decides how many ledger entries to offer with its
//! [`TradeBehavior`](tradenet_types::TradeBehavior) and draws that many
//! entries from its own ledger. Both draws happen before either direction
//! runs.
//!
//! For each offered good the receiver must be able to pay its unit price.
//! The receiver then draws up to `counter_offer_sample` entries from its
//! own ledger and hands back the cheapest one (first drawn wins a tie).
//! The receiver pays the offered good's price to the offerer, and each
//! side gives up one unit and receives a fresh single-unit entry. Every
//! exchange therefore keeps both ledger sizes and the pair's combined
//! wealth unchanged.
//!
//! An offered good the offerer no longer holds by the time its turn comes
//! (it was handed over as a return good in the first direction) is
//! skipped.

use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;
use tradenet_types::{AgentId, Good};

use crate::agent::Agent;
use crate::behavior::trade_amount;
use crate::ledger::LedgerError;
use crate::sampling::sample_cloned;

/// Default number of counter-offer candidates drawn per offered good.
pub const DEFAULT_COUNTER_OFFER_SAMPLE: usize = 3;

/// Structural failures during trade execution.
#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    /// A ledger lost an entry it was just shown to hold.
    #[error("ledger error during trade: {0}")]
    Ledger(#[from] LedgerError),

    /// A wealth transfer overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

/// Why a trade did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSkipReason {
    /// At least one party is inactive.
    Inactive,
    /// At least one party has already traded this step.
    AlreadyTraded,
}

/// One offered good swapped for one return good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Agent that offered the good and was paid its price.
    pub offerer: AgentId,
    /// Agent that paid and handed back a return good.
    pub receiver: AgentId,
    /// Unit the offerer gave up.
    pub offered: Good,
    /// Unit the receiver gave up.
    pub returned: Good,
}

/// Record of a completed trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeSummary {
    /// First party.
    pub first: AgentId,
    /// Second party.
    pub second: AgentId,
    /// Entries the first party put on the table.
    pub offered_by_first: usize,
    /// Entries the second party put on the table.
    pub offered_by_second: usize,
    /// Exchanges that went through, in execution order.
    pub exchanges: Vec<Exchange>,
}

/// Result of [`execute_trade`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeOutcome {
    /// Preconditions failed; neither agent was touched.
    Skipped(TradeSkipReason),
    /// Both directions ran and both agents are marked as having traded.
    /// The exchange list may be empty.
    Completed(TradeSummary),
}

/// Trade between `first` and `second`.
///
/// Both agents must be active and must not have traded yet this step,
/// otherwise the call is a logged no-op.
///
/// # Errors
///
/// Returns [`TradeError`] only if a ledger or wealth invariant breaks,
/// which leaves the pair partially updated.
pub fn execute_trade(
    first: &mut Agent,
    second: &mut Agent,
    counter_offer_sample: usize,
    rng: &mut impl Rng,
) -> Result<TradeOutcome, TradeError> {
    let skip = if !first.is_active() || !second.is_active() {
        Some(TradeSkipReason::Inactive)
    } else if first.has_traded || second.has_traded {
        Some(TradeSkipReason::AlreadyTraded)
    } else {
        None
    };
    if let Some(reason) = skip {
        debug!(first = %first.id, second = %second.id, ?reason, "Trade skipped");
        return Ok(TradeOutcome::Skipped(reason));
    }

    let amount_first = trade_amount(first.behavior, first.goods.len(), rng);
    let amount_second = trade_amount(second.behavior, second.goods.len(), rng);
    let offered_first = sample_cloned(rng, first.goods.entries(), amount_first);
    let offered_second = sample_cloned(rng, second.goods.entries(), amount_second);

    let mut exchanges = Vec::new();
    for good in &offered_first {
        if let Some(exchange) = exchange_one(first, second, good, counter_offer_sample, rng)? {
            exchanges.push(exchange);
        }
    }
    for good in &offered_second {
        if let Some(exchange) = exchange_one(second, first, good, counter_offer_sample, rng)? {
            exchanges.push(exchange);
        }
    }

    first.has_traded = true;
    second.has_traded = true;

    debug!(
        first = %first.id,
        second = %second.id,
        offered_by_first = offered_first.len(),
        offered_by_second = offered_second.len(),
        exchanges = exchanges.len(),
        "Trade completed"
    );

    Ok(TradeOutcome::Completed(TradeSummary {
        first: first.id,
        second: second.id,
        offered_by_first: offered_first.len(),
        offered_by_second: offered_second.len(),
        exchanges,
    }))
}

/// Swap one offered unit for the receiver's cheapest sampled unit.
fn exchange_one(
    offerer: &mut Agent,
    receiver: &mut Agent,
    offered: &Good,
    counter_offer_sample: usize,
    rng: &mut impl Rng,
) -> Result<Option<Exchange>, TradeError> {
    if !offerer.goods.holds(&offered.name, offered.price) {
        debug!(
            offerer = %offerer.id,
            good = %offered.name,
            "Offered good already traded away"
        );
        return Ok(None);
    }
    if receiver.wealth < offered.price {
        return Ok(None);
    }

    let candidates = sample_cloned(rng, receiver.goods.entries(), counter_offer_sample);
    let mut returned: Option<Good> = None;
    for candidate in candidates {
        if returned.as_ref().is_none_or(|best| candidate.price < best.price) {
            returned = Some(candidate);
        }
    }
    let Some(returned) = returned else {
        return Ok(None);
    };

    let receiver_wealth = receiver
        .wealth
        .checked_sub(offered.price)
        .ok_or_else(|| overflow("receiver wealth"))?;
    let offerer_wealth = offerer
        .wealth
        .checked_add(offered.price)
        .ok_or_else(|| overflow("offerer wealth"))?;
    receiver.wealth = receiver_wealth;
    offerer.wealth = offerer_wealth;

    offerer.goods.take_one(&offered.name, offered.price)?;
    receiver.goods.receive(offered.name.clone(), offered.price);
    receiver.goods.take_one(&returned.name, returned.price)?;
    offerer.goods.receive(returned.name.clone(), returned.price);

    Ok(Some(Exchange {
        offerer: offerer.id,
        receiver: receiver.id,
        offered: Good::unit(offered.name.clone(), offered.price),
        returned: Good::unit(returned.name, returned.price),
    }))
}

fn overflow(context: &str) -> TradeError {
    TradeError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}

/// Combined wealth of two agents, for conservation checks.
pub fn pair_wealth(first: &Agent, second: &Agent) -> Option<Decimal> {
    first.wealth.checked_add(second.wealth)
}
