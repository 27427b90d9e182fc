#![no_std]

mod active_credit;
mod agreements;
mod error;
mod events;
mod fees;
mod offers;
mod pool;
mod positions;
mod rolling;
mod storage;


use active_credit::ActiveCredit;
use agreements::Agreements;
use error::Error;
use offers::Offers;
use pool::Pools;
use rolling::RollingAgreements;
use storage::{
    Agreement, DirectConfig, DirectRollingConfig, Encumbrance, FeeShares, Offer, OfferTerms,
    Permissions, Pool, PoolAccount, RollingAgreement, Storage, YieldAccount, BASIS_POINTS,
};

use soroban_sdk::{contract, contractimpl, Address, Env, Symbol};

#[contract]
pub struct CreditDesk;

#[contractimpl]
impl CreditDesk {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    pub fn initialize(env: Env, admin: Address, registry: Address) -> Result<(), Error> {
        if Storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        Storage::set_initialized(&env);
        Storage::set_admin(&env, &admin);
        Storage::set_registry(&env, &registry);
        Storage::set_paused(&env, false);
        Storage::set_direct_config(
            &env,
            &DirectConfig {
                platform_fee_bps: 50,          // 0.5% of principal
                interest_lender_bps: 9_000,    // 90% of interest to the lender
                platform_fee_lender_bps: 0,
                default_lender_bps: 9_500,     // 95% of seized collateral
                min_interest_duration: 86_400, // 1 day
            },
        );
        Storage::set_rolling_config(
            &env,
            &DirectRollingConfig {
                min_payment_interval: 86_400,   // 1 day
                max_payment_count: 60,
                max_upfront_premium_bps: 1_000, // 10% of principal
                min_apr_bps: 100,
                max_apr_bps: 5_000,
                default_penalty_bps: 500,       // 5% of outstanding on default
                min_payment_bps: 100,           // 1% of original principal
            },
        );
        Storage::set_fee_shares(
            &env,
            &FeeShares {
                treasury_bps: 2_000,
                active_bps: 5_000,
            },
        );
        Storage::set_time_gate(&env, 7 * 24 * 60 * 60);

        Ok(())
    }

    pub fn pause(env: Env) -> Result<(), Error> {
        Self::require_admin(&env)?;
        Storage::set_paused(&env, true);
        Ok(())
    }

    pub fn unpause(env: Env) -> Result<(), Error> {
        Self::require_admin(&env)?;
        Storage::set_paused(&env, false);
        Ok(())
    }

    /// Enables the treasury share of protocol income. Until a treasury is
    /// set, its share stays in the fee index.
    pub fn set_treasury(env: Env, treasury: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        Storage::set_treasury(&env, &treasury);
        Ok(())
    }

    pub fn set_direct_config(env: Env, config: DirectConfig) -> Result<(), Error> {
        Self::require_admin(&env)?;
        if !Self::valid_bps(config.platform_fee_bps)
            || !Self::valid_bps(config.interest_lender_bps)
            || !Self::valid_bps(config.platform_fee_lender_bps)
            || !Self::valid_bps(config.default_lender_bps)
        {
            return Err(Error::InvalidConfig);
        }
        Storage::set_direct_config(&env, &config);
        Ok(())
    }

    pub fn set_rolling_config(env: Env, config: DirectRollingConfig) -> Result<(), Error> {
        Self::require_admin(&env)?;
        if !Self::valid_bps(config.max_upfront_premium_bps)
            || !Self::valid_bps(config.default_penalty_bps)
            || !Self::valid_bps(config.min_payment_bps)
            || config.min_apr_bps > config.max_apr_bps
            || config.max_payment_count == 0
            || config.min_payment_interval == 0
        {
            return Err(Error::InvalidConfig);
        }
        Storage::set_rolling_config(&env, &config);
        Ok(())
    }

    pub fn set_fee_shares(env: Env, shares: FeeShares) -> Result<(), Error> {
        Self::require_admin(&env)?;
        if (shares.treasury_bps as i128) + (shares.active_bps as i128) > BASIS_POINTS {
            return Err(Error::InvalidConfig);
        }
        Storage::set_fee_shares(&env, &shares);
        Ok(())
    }

    pub fn set_time_gate(env: Env, gate: u64) -> Result<(), Error> {
        Self::require_admin(&env)?;
        Storage::set_time_gate(&env, gate);
        Ok(())
    }

    pub fn create_pool(env: Env, asset: Address, native: bool) -> Result<u32, Error> {
        Self::require_admin(&env)?;
        Ok(Pools::create(&env, &asset, native))
    }

    // ============================================
    // POOL DEPOSITS & WITHDRAWALS
    // ============================================

    pub fn deposit(env: Env, caller: Address, pool_id: u32, amount: i128) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Pools::deposit(&env, &caller, pool_id, amount)
    }

    /// Withdraws unencumbered principal only; locked and reserved portions
    /// stay behind.
    pub fn withdraw(env: Env, caller: Address, pool_id: u32, amount: i128) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Pools::withdraw(&env, &caller, pool_id, amount)
    }

    // ============================================
    // OFFERS
    // ============================================

    /// Lender-initiated offer: reserves the principal in the source pool
    /// against the caller until the offer fills or is cancelled.
    #[allow(clippy::too_many_arguments)]
    pub fn post_offer(
        env: Env,
        caller: Address,
        position: u64,
        source_pool: u32,
        collateral_pool: u32,
        principal: i128,
        collateral: i128,
        terms: OfferTerms,
        perms: Permissions,
        tranche: bool,
        strict_fill: bool,
    ) -> Result<u64, Error> {
        Self::check_not_paused(&env)?;
        Offers::post(
            &env,
            &caller,
            position,
            false,
            source_pool,
            collateral_pool,
            principal,
            collateral,
            terms,
            perms,
            tranche,
            strict_fill,
        )
    }

    /// Borrower-initiated offer: reserves the collateral instead.
    #[allow(clippy::too_many_arguments)]
    pub fn post_borrower_offer(
        env: Env,
        caller: Address,
        position: u64,
        source_pool: u32,
        collateral_pool: u32,
        principal: i128,
        collateral: i128,
        terms: OfferTerms,
        perms: Permissions,
        tranche: bool,
        strict_fill: bool,
    ) -> Result<u64, Error> {
        Self::check_not_paused(&env)?;
        Offers::post(
            &env,
            &caller,
            position,
            true,
            source_pool,
            collateral_pool,
            principal,
            collateral,
            terms,
            perms,
            tranche,
            strict_fill,
        )
    }

    pub fn cancel_offer(env: Env, caller: Address, offer_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        Offers::cancel(&env, &caller, offer_id)
    }

    /// Pre-transfer hook for the position registry: cancels every open offer
    /// keyed to the position. Not pause-gated, so reservations can never
    /// survive a transfer.
    pub fn cancel_offers_for_position(env: Env, position: u64) -> Result<(), Error> {
        Offers::cancel_for_position(&env, position)
    }

    // ============================================
    // FIXED-TERM AGREEMENTS
    // ============================================

    /// Fills a fixed-term offer (whole, or partially for tranche offers).
    /// Interest and platform fee are retained up front; the borrower
    /// receives the net proceeds and owes the principal at the due date.
    pub fn accept_offer(
        env: Env,
        caller: Address,
        offer_id: u64,
        taker_position: u64,
        fill: i128,
    ) -> Result<u64, Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        Agreements::accept(&env, &caller, offer_id, taker_position, fill, now)
    }

    pub fn repay(env: Env, caller: Address, agreement_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        Agreements::repay(&env, &caller, agreement_id, now)
    }

    pub fn exercise_direct(env: Env, caller: Address, agreement_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        Agreements::exercise(&env, &caller, agreement_id, now)
    }

    /// Accelerates the due date to now (lender only, flag-gated).
    pub fn call_loan(env: Env, caller: Address, agreement_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        Agreements::call(&env, &caller, agreement_id, now)
    }

    /// Permissionless forced exercise once the due date plus the grace
    /// window has passed.
    pub fn recover(env: Env, agreement_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        Agreements::recover(&env, agreement_id, now)
    }

    // ============================================
    // ROLLING AGREEMENTS
    // ============================================

    pub fn accept_rolling_offer(
        env: Env,
        caller: Address,
        offer_id: u64,
        taker_position: u64,
    ) -> Result<u64, Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        RollingAgreements::accept(&env, &caller, offer_id, taker_position, now)
    }

    pub fn make_payment(
        env: Env,
        caller: Address,
        rolling_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        RollingAgreements::make_payment(&env, &caller, rolling_id, amount, now)
    }

    pub fn repay_rolling_in_full(env: Env, caller: Address, rolling_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        RollingAgreements::repay_in_full(&env, &caller, rolling_id, now)
    }

    pub fn exercise_rolling(env: Env, caller: Address, rolling_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        RollingAgreements::exercise(&env, &caller, rolling_id, now)
    }

    /// Permissionless default settlement once a due date plus the grace
    /// period has been missed with arrears outstanding.
    pub fn claim_default(env: Env, rolling_id: u64) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        RollingAgreements::claim_default(&env, rolling_id, now)
    }

    // ============================================
    // ACTIVE CREDIT
    // ============================================

    /// Pulls yield from the caller and distributes it across eligible
    /// encumbrances under the caller's tag.
    pub fn accrue_yield(
        env: Env,
        caller: Address,
        pool_id: u32,
        amount: i128,
        tag: Symbol,
    ) -> Result<(), Error> {
        Self::check_not_paused(&env)?;
        let now = env.ledger().timestamp();
        ActiveCredit::accrue_yield(&env, &caller, pool_id, amount, tag, now)
    }

    /// Pays out the account's pending yield; returns the amount moved.
    pub fn settle_active(env: Env, account: Address, pool_id: u32) -> Result<i128, Error> {
        Self::check_not_paused(&env)?;
        ActiveCredit::settle(&env, &account, pool_id)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_offer(env: Env, offer_id: u64) -> Result<Offer, Error> {
        Storage::offer(&env, offer_id)
    }

    pub fn get_agreement(env: Env, agreement_id: u64) -> Result<Agreement, Error> {
        Storage::agreement(&env, agreement_id)
    }

    pub fn get_rolling(env: Env, rolling_id: u64) -> Result<RollingAgreement, Error> {
        Storage::rolling(&env, rolling_id)
    }

    pub fn get_pool(env: Env, pool_id: u32) -> Result<Pool, Error> {
        Storage::pool(&env, pool_id)
    }

    pub fn get_pool_account(env: Env, pool_id: u32, account: Address) -> PoolAccount {
        Storage::pool_account(&env, pool_id, &account)
    }

    /// Uncommitted principal the account could still reserve, lock or
    /// withdraw.
    pub fn available(env: Env, pool_id: u32, account: Address) -> i128 {
        Pools::available(&Storage::pool_account(&env, pool_id, &account))
    }

    pub fn get_yield_account(env: Env, pool_id: u32, account: Address) -> YieldAccount {
        Storage::yield_account(&env, pool_id, &account)
    }

    pub fn get_encumbrance(env: Env, pool_id: u32, account: Address) -> Option<Encumbrance> {
        Storage::encumbrance(&env, pool_id, &account)
    }

    pub fn tranche_remaining(env: Env, offer_id: u64) -> Result<i128, Error> {
        Ok(Storage::offer(&env, offer_id)?.tranche_remaining)
    }

    pub fn get_direct_config(env: Env) -> Result<DirectConfig, Error> {
        Storage::direct_config(&env)
    }

    pub fn get_rolling_config(env: Env) -> Result<DirectRollingConfig, Error> {
        Storage::rolling_config(&env)
    }

    pub fn get_fee_shares(env: Env) -> Result<FeeShares, Error> {
        Storage::fee_shares(&env)
    }

    pub fn get_time_gate(env: Env) -> Result<u64, Error> {
        Storage::time_gate(&env)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn require_admin(env: &Env) -> Result<(), Error> {
        let admin = Storage::admin(env)?;
        admin.require_auth();
        Ok(())
    }

    fn check_not_paused(env: &Env) -> Result<(), Error> {
        if Storage::is_paused(env) {
            return Err(Error::ContractPaused);
        }
        Ok(())
    }

    fn valid_bps(bps: u32) -> bool {
        (bps as i128) <= BASIS_POINTS
    }
}
