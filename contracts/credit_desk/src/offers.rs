use crate::error::Error;
use crate::events::{OfferCancelledEvent, OfferPostedEvent};
use crate::fees;
use crate::pool::Pools;
use crate::positions::PositionRegistry;
use crate::storage::{Offer, OfferTerms, Permissions, Storage};
use soroban_sdk::{Address, Env, Symbol, Vec};

pub struct Offers;

impl Offers {
    // ============================================
    // POSTING
    // ============================================

    #[allow(clippy::too_many_arguments)]
    pub fn post(
        env: &Env,
        caller: &Address,
        position: u64,
        borrower_initiated: bool,
        source_pool: u32,
        collateral_pool: u32,
        principal: i128,
        collateral: i128,
        terms: OfferTerms,
        perms: Permissions,
        tranche: bool,
        strict_fill: bool,
    ) -> Result<u64, Error> {
        if principal <= 0 || collateral <= 0 {
            return Err(Error::InvalidAmount);
        }
        PositionRegistry::require_controller(env, caller, position)?;

        if !Storage::has_pool(env, source_pool) || !Storage::has_pool(env, collateral_pool) {
            return Err(Error::PoolNotFound);
        }
        if source_pool == collateral_pool {
            return Err(Error::InvalidTerms);
        }
        Self::validate_terms(env, &terms, principal, tranche)?;

        // The initiating side backs the offer: lenders reserve the principal,
        // borrowers reserve the collateral.
        let (reserve_pool, reserve_amount) = if borrower_initiated {
            (collateral_pool, collateral)
        } else {
            (source_pool, principal)
        };
        Pools::reserve(env, reserve_pool, caller, reserve_amount)?;

        let offer_id = Storage::bump_offer_id(env);
        let offer = Offer {
            id: offer_id,
            borrower_initiated,
            position,
            creator: caller.clone(),
            source_pool,
            collateral_pool,
            principal,
            collateral,
            terms,
            perms,
            cancelled: false,
            filled: false,
            is_tranche: tranche,
            tranche_remaining: if tranche { principal } else { 0 },
            tranche_strict: tranche && strict_fill,
            reserve_remaining: reserve_amount,
            collateral_remaining: collateral,
        };
        Storage::set_offer(env, &offer);

        // Index by position id so the transfer hook can purge the offers
        // without calling back into the registry mid-transfer.
        let mut index = Storage::position_offers(env, position);
        index.push_back(offer_id);
        Storage::set_position_offers(env, position, &index);

        env.events().publish(
            (Symbol::new(env, "offer_posted"), offer_id),
            OfferPostedEvent {
                offer_id,
                position,
                borrower_initiated,
                source_pool,
                collateral_pool,
                principal,
                collateral,
            },
        );

        Ok(offer_id)
    }

    fn validate_terms(
        env: &Env,
        terms: &OfferTerms,
        principal: i128,
        tranche: bool,
    ) -> Result<(), Error> {
        match terms {
            OfferTerms::Fixed(fixed) => {
                let config = Storage::direct_config(env)?;
                if fixed.duration < config.min_interest_duration {
                    return Err(Error::InvalidTerms);
                }
                let interest = fees::interest_due(principal, fixed.apr_bps, fixed.duration)
                    .ok_or(Error::InvalidTerms)?;
                let fee =
                    fees::share_of(principal, config.platform_fee_bps).ok_or(Error::InvalidTerms)?;
                // prepaid charges must leave the borrower positive proceeds
                if interest + fee >= principal {
                    return Err(Error::InvalidTerms);
                }
            }
            OfferTerms::Rolling(rolling) => {
                if tranche {
                    return Err(Error::InvalidTerms);
                }
                let config = Storage::rolling_config(env)?;
                if rolling.payment_interval < config.min_payment_interval {
                    return Err(Error::InvalidTerms);
                }
                if rolling.apr_bps < config.min_apr_bps || rolling.apr_bps > config.max_apr_bps {
                    return Err(Error::InvalidTerms);
                }
                if rolling.max_payment_count == 0
                    || rolling.max_payment_count > config.max_payment_count
                {
                    return Err(Error::InvalidTerms);
                }
                let premium_cap = fees::share_of(principal, config.max_upfront_premium_bps)
                    .ok_or(Error::InvalidTerms)?;
                if rolling.upfront_premium < 0 || rolling.upfront_premium > premium_cap {
                    return Err(Error::InvalidTerms);
                }
                // the borrower must receive positive proceeds
                if rolling.upfront_premium >= principal {
                    return Err(Error::InvalidTerms);
                }
            }
        }
        Ok(())
    }

    // ============================================
    // CANCELLATION
    // ============================================

    pub fn cancel(env: &Env, caller: &Address, offer_id: u64) -> Result<(), Error> {
        let mut offer = Storage::offer(env, offer_id)?;
        if offer.cancelled || offer.filled {
            return Err(Error::InvalidOffer);
        }
        PositionRegistry::require_controller(env, caller, offer.position)?;

        Self::purge(env, &mut offer);
        Ok(())
    }

    /// Pre-transfer hook target: cancels every open offer keyed to the
    /// position so no reservation survives a change of controller. Only the
    /// position registry may invoke it.
    pub fn cancel_for_position(env: &Env, position: u64) -> Result<(), Error> {
        let registry = Storage::registry(env)?;
        registry.require_auth();

        let index = Storage::position_offers(env, position);
        for offer_id in index.iter() {
            let mut offer = Storage::offer(env, offer_id)?;
            if offer.cancelled || offer.filled {
                continue;
            }
            Self::purge(env, &mut offer);
        }
        Storage::set_position_offers(env, position, &Vec::new(env));

        Ok(())
    }

    fn purge(env: &Env, offer: &mut Offer) {
        let released = offer.reserve_remaining;
        Pools::release(env, Self::reserve_pool(offer), &offer.creator, released);
        offer.reserve_remaining = 0;
        offer.cancelled = true;
        Storage::set_offer(env, offer);

        env.events().publish(
            (Symbol::new(env, "offer_cancelled"), offer.id),
            OfferCancelledEvent {
                offer_id: offer.id,
                position: offer.position,
                released,
            },
        );
    }

    pub fn reserve_pool(offer: &Offer) -> u32 {
        if offer.borrower_initiated {
            offer.collateral_pool
        } else {
            offer.source_pool
        }
    }

    // ============================================
    // FILL ACCOUNTING
    // ============================================

    /// Checks the offer is open and the fill amount is acceptable.
    pub fn validate_fill(offer: &Offer, fill: i128) -> Result<(), Error> {
        if offer.cancelled || offer.filled {
            return Err(Error::InvalidOffer);
        }
        if offer.is_tranche {
            if fill <= 0 || fill > offer.tranche_remaining {
                return Err(Error::InvalidFillAmount);
            }
            if offer.tranche_strict && fill != offer.tranche_remaining {
                return Err(Error::InvalidFillAmount);
            }
        } else if fill != offer.principal {
            return Err(Error::InvalidFillAmount);
        }
        Ok(())
    }

    /// Collateral backing a fill, pro-rated against the offer totals. The
    /// final fill takes the tracked residue so the per-fill amounts sum to
    /// the offer's collateral exactly.
    pub fn collateral_for_fill(offer: &Offer, fill: i128) -> Result<i128, Error> {
        let remaining = if offer.is_tranche {
            offer.tranche_remaining
        } else {
            offer.principal
        };
        if fill == remaining {
            return Ok(offer.collateral_remaining);
        }
        fees::proportional_share(offer.collateral, fill, offer.principal).ok_or(Error::InvalidAmount)
    }

    /// Consumes a fill: decrements the running reservation and collateral
    /// counters and flips the status flags.
    pub fn apply_fill(
        env: &Env,
        offer: &mut Offer,
        fill: i128,
        collateral_used: i128,
        reserve_released: i128,
    ) {
        offer.reserve_remaining -= reserve_released;
        offer.collateral_remaining -= collateral_used;
        if offer.is_tranche {
            offer.tranche_remaining -= fill;
            if offer.tranche_remaining == 0 {
                offer.filled = true;
            }
        } else {
            offer.filled = true;
        }
        Storage::set_offer(env, offer);
    }
}
