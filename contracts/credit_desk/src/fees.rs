use crate::active_credit::ActiveCredit;
use crate::error::Error;
use crate::pool::Pools;
use crate::storage::{Storage, BASIS_POINTS, SECONDS_PER_YEAR};
use soroban_sdk::{Env, Symbol};

/// How a protocol fee amount splits across the three sinks.
pub struct FeeSplit {
    pub treasury: i128,
    pub active: i128,
    pub fee_index: i128,
}

/// Annualized simple interest, truncating division
///
/// Formula: interest = principal × apr × duration / (365 days × 10,000)
///
/// Example:
/// - principal: 100,000
/// - apr: 12% (1,200 basis points)
/// - duration: 365 days
/// - interest: 100,000 × 12% = 12,000
pub fn interest_due(principal: i128, apr_bps: u32, duration: u64) -> Option<i128> {
    let numerator = principal
        .checked_mul(apr_bps as i128)?
        .checked_mul(duration as i128)?;
    let denominator = (SECONDS_PER_YEAR as i128).checked_mul(BASIS_POINTS)?;

    numerator.checked_div(denominator)
}

/// Basis-point share of an amount, truncating division
pub fn share_of(amount: i128, bps: u32) -> Option<i128> {
    amount.checked_mul(bps as i128)?.checked_div(BASIS_POINTS)
}

/// Split a protocol fee amount into treasury / active-credit / fee-index shares.
///
/// Treasury and active shares floor; the fee-index absorbs the remainder, so
/// the three parts always sum to `amount` exactly. When no treasury is
/// configured its share is forced to zero.
pub fn split_fees(
    amount: i128,
    treasury_bps: u32,
    active_bps: u32,
    treasury_set: bool,
) -> Option<FeeSplit> {
    let treasury = if treasury_set {
        share_of(amount, treasury_bps)?
    } else {
        0
    };
    let active = share_of(amount, active_bps)?;
    let fee_index = amount.checked_sub(treasury)?.checked_sub(active)?;

    Some(FeeSplit {
        treasury,
        active,
        fee_index,
    })
}

/// Floor share of one account in a proportional distribution
pub fn proportional_share(amount: i128, weight: i128, total_weight: i128) -> Option<i128> {
    amount.checked_mul(weight)?.checked_div(total_weight)
}

/// Applies the split to protocol income sitting in a pool: treasury share is
/// paid out, active share goes to the active-credit index, and the remainder
/// lands in the pool's fee index.
pub fn route_income(
    env: &Env,
    pool_id: u32,
    amount: i128,
    tag: Symbol,
    now: u64,
) -> Result<(), Error> {
    if amount == 0 {
        return Ok(());
    }
    let shares = Storage::fee_shares(env)?;
    let treasury = Storage::treasury(env);
    let split = split_fees(
        amount,
        shares.treasury_bps,
        shares.active_bps,
        treasury.is_some(),
    )
    .ok_or(Error::InvalidAmount)?;

    if split.treasury > 0 {
        if let Some(treasury) = treasury {
            Pools::transfer_out(env, pool_id, &treasury, split.treasury)?;
        }
    }
    ActiveCredit::accrue(env, pool_id, split.active, tag, now)?;
    Pools::bump_fee_index(env, pool_id, split.fee_index)?;

    Ok(())
}
