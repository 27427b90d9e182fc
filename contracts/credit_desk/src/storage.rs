use crate::error::Error;
use soroban_sdk::{contracttype, Address, Env, Vec};

// Constants
pub const BASIS_POINTS: i128 = 10_000; // 100% = 10,000 basis points
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;
/// Grace window after a fixed-term due date before recovery opens.
/// Rolling agreements carry their own configurable grace period instead.
pub const RECOVER_GRACE: u64 = 3 * 24 * 60 * 60;

#[contracttype]
#[derive(Clone, Debug)]
pub struct Pool {
    /// Token contract backing this pool
    pub asset: Address,
    /// True when the asset is the chain's native token
    pub native: bool,
    /// Residual fee accumulator (amounts not routed to treasury or active credit)
    pub fee_index: i128,
    /// Mirror of the contract's actual asset balance, maintained for native pools
    pub tracked_balance: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolAccount {
    /// Total principal the account holds in the pool
    pub principal: i128,
    /// Portion locked as collateral under agreements
    pub locked: i128,
    /// Portion reserved behind outstanding offers
    pub reserved: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct Encumbrance {
    /// Account's currently locked amount in the pool
    pub locked_amount: i128,
    /// Timestamp of the last change to the locked amount
    pub since: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct YieldAccount {
    /// Accrued, not yet settled
    pub pending: i128,
    /// Settled and paid out to date
    pub withdrawn: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct Permissions {
    pub allow_early_repay: bool,
    pub allow_early_exercise: bool,
    /// Fixed-term only: lender may accelerate the due date
    pub allow_lender_call: bool,
    /// Rolling only: borrower may amortize via payments
    pub allow_amortization: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct FixedTerms {
    /// Annualized simple-interest rate in basis points
    pub apr_bps: u32,
    /// Loan duration in seconds
    pub duration: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RollingTerms {
    /// Seconds between scheduled payments
    pub payment_interval: u64,
    /// Annualized rate applied to outstanding principal, basis points
    pub apr_bps: u32,
    /// Seconds past a missed due date before default can be claimed
    pub grace_period: u64,
    /// Maximum number of payments before the debt must be settled
    pub max_payment_count: u32,
    /// Premium retained from the disbursement and paid to the lender
    pub upfront_premium: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub enum OfferTerms {
    Fixed(FixedTerms),
    Rolling(RollingTerms),
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct Offer {
    /// Unique offer ID
    pub id: u64,
    /// True when the borrower side posted the offer
    pub borrower_initiated: bool,
    /// Position that posted the offer (initiating side)
    pub position: u64,
    /// Account that posted the offer and holds its reservation
    pub creator: Address,
    /// Pool the principal is drawn from
    pub source_pool: u32,
    /// Pool the collateral is locked in
    pub collateral_pool: u32,
    /// Principal to lend
    pub principal: i128,
    /// Collateral required against the full principal
    pub collateral: i128,
    pub terms: OfferTerms,
    pub perms: Permissions,
    pub cancelled: bool,
    pub filled: bool,
    /// True when the offer may be filled in parts
    pub is_tranche: bool,
    /// Unfilled remainder of a tranche offer; zero on whole-fill offers
    pub tranche_remaining: i128,
    /// Tranche offers only: a fill must take the full remaining size
    pub tranche_strict: bool,
    /// Undisbursed part of the initiating-side reservation
    pub reserve_remaining: i128,
    /// Collateral requirement not yet consumed by fills
    pub collateral_remaining: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AgreementStatus {
    /// Agreement is live, borrower can repay and lender can exercise
    Active = 0,
    /// Borrower repaid in full
    Repaid = 1,
    /// Lender took the collateral in lieu of repayment
    Exercised = 2,
    /// Forced exercise after the due date plus grace window
    Recovered = 3,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct Agreement {
    /// Unique agreement ID
    pub id: u64,
    /// Lender account at accept time
    pub lender: Address,
    /// Borrower account at accept time
    pub borrower: Address,
    /// Position holding the lender-side claim
    pub lender_position: u64,
    /// Position holding the borrower-side claim
    pub borrower_position: u64,
    pub source_pool: u32,
    pub collateral_pool: u32,
    /// Principal lent (repayment amount; interest and fee were prepaid)
    pub principal: i128,
    pub apr_bps: u32,
    pub accept_ts: u64,
    /// May only move earlier, via a lender call
    pub due_ts: u64,
    /// Collateral locked on the borrower
    pub collateral: i128,
    pub perms: Permissions,
    pub status: AgreementStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RollingStatus {
    /// Agreement is live, payments accepted
    Active = 0,
    /// Debt settled by the borrower
    Repaid = 1,
    /// Lender exercised against the collateral
    Exercised = 2,
    /// Defaulted after a missed due date plus grace
    Defaulted = 3,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RollingAgreement {
    /// Unique rolling agreement ID
    pub id: u64,
    /// Lender account at accept time
    pub lender: Address,
    /// Borrower account at accept time
    pub borrower: Address,
    pub lender_position: u64,
    pub borrower_position: u64,
    pub source_pool: u32,
    pub collateral_pool: u32,
    /// Original principal (min-payment floor is computed against this)
    pub principal: i128,
    /// Principal still owed
    pub outstanding: i128,
    /// Accrued interest not yet paid
    pub arrears: i128,
    pub payment_count: u32,
    /// Interest accrued up to this timestamp
    pub last_accrual: u64,
    pub next_due: u64,
    /// Premium retained from the disbursement at accept
    pub upfront_premium: i128,
    pub payment_interval: u64,
    pub apr_bps: u32,
    pub grace_period: u64,
    pub max_payment_count: u32,
    /// Penalty applied to outstanding principal on default, snapshotted at accept
    pub penalty_bps: u32,
    /// Collateral locked on the borrower
    pub collateral: i128,
    pub perms: Permissions,
    pub status: RollingStatus,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DirectConfig {
    /// Platform fee on the principal, basis points
    pub platform_fee_bps: u32,
    /// Lender's share of prepaid interest, basis points
    pub interest_lender_bps: u32,
    /// Lender's share of the platform fee, basis points
    pub platform_fee_lender_bps: u32,
    /// Lender's share of seized collateral on exercise/recovery, basis points
    pub default_lender_bps: u32,
    /// Minimum fixed-term duration in seconds
    pub min_interest_duration: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DirectRollingConfig {
    /// Floor on the payment interval in seconds
    pub min_payment_interval: u64,
    /// Cap on an offer's max payment count
    pub max_payment_count: u32,
    /// Cap on the upfront premium as basis points of principal
    pub max_upfront_premium_bps: u32,
    pub min_apr_bps: u32,
    pub max_apr_bps: u32,
    /// Penalty on outstanding principal applied at default, basis points
    pub default_penalty_bps: u32,
    /// Minimum payment as basis points of original principal
    pub min_payment_bps: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct FeeShares {
    /// Treasury share of protocol fee income, basis points
    pub treasury_bps: u32,
    /// Active-credit share of protocol fee income, basis points
    pub active_bps: u32,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Registry,
    Treasury,
    Initialized,
    Paused,
    DirectCfg,
    RollingCfg,
    FeeShares,
    TimeGate,
    PoolCounter,
    OfferCounter,
    AgreementCounter,
    RollingCounter,
    Pool(u32),
    PoolAccount(u32, Address),
    Encumbrance(u32, Address),
    Roster(u32),
    YieldAccount(u32, Address),
    Undistributed(u32),
    Offer(u64),
    Agreement(u64),
    Rolling(u64),
    PositionOffers(u64),
}

pub struct Storage;

impl Storage {
    // Roles
    pub fn admin(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_admin(env: &Env, admin: &Address) {
        env.storage().instance().set(&DataKey::Admin, admin);
    }

    pub fn registry(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Registry)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_registry(env: &Env, registry: &Address) {
        env.storage().instance().set(&DataKey::Registry, registry);
    }

    pub fn treasury(env: &Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Treasury)
    }

    pub fn set_treasury(env: &Env, treasury: &Address) {
        env.storage().instance().set(&DataKey::Treasury, treasury);
    }

    pub fn is_initialized(env: &Env) -> bool {
        env.storage().instance().has(&DataKey::Initialized)
    }

    pub fn set_initialized(env: &Env) {
        env.storage().instance().set(&DataKey::Initialized, &true);
    }

    pub fn is_paused(env: &Env) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::Paused)
            .unwrap_or(false)
    }

    pub fn set_paused(env: &Env, paused: bool) {
        env.storage().instance().set(&DataKey::Paused, &paused);
    }

    // Configuration
    pub fn direct_config(env: &Env) -> Result<DirectConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::DirectCfg)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_direct_config(env: &Env, config: &DirectConfig) {
        env.storage().instance().set(&DataKey::DirectCfg, config);
    }

    pub fn rolling_config(env: &Env) -> Result<DirectRollingConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::RollingCfg)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_rolling_config(env: &Env, config: &DirectRollingConfig) {
        env.storage().instance().set(&DataKey::RollingCfg, config);
    }

    pub fn fee_shares(env: &Env) -> Result<FeeShares, Error> {
        env.storage()
            .instance()
            .get(&DataKey::FeeShares)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_fee_shares(env: &Env, shares: &FeeShares) {
        env.storage().instance().set(&DataKey::FeeShares, shares);
    }

    pub fn time_gate(env: &Env) -> Result<u64, Error> {
        env.storage()
            .instance()
            .get(&DataKey::TimeGate)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_time_gate(env: &Env, gate: u64) {
        env.storage().instance().set(&DataKey::TimeGate, &gate);
    }

    // Counters
    pub fn bump_pool_id(env: &Env) -> u32 {
        let next: u32 = env
            .storage()
            .instance()
            .get(&DataKey::PoolCounter)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&DataKey::PoolCounter, &next);
        next
    }

    pub fn bump_offer_id(env: &Env) -> u64 {
        let next: u64 = env
            .storage()
            .instance()
            .get(&DataKey::OfferCounter)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&DataKey::OfferCounter, &next);
        next
    }

    pub fn bump_agreement_id(env: &Env) -> u64 {
        let next: u64 = env
            .storage()
            .instance()
            .get(&DataKey::AgreementCounter)
            .unwrap_or(0)
            + 1;
        env.storage()
            .instance()
            .set(&DataKey::AgreementCounter, &next);
        next
    }

    pub fn bump_rolling_id(env: &Env) -> u64 {
        let next: u64 = env
            .storage()
            .instance()
            .get(&DataKey::RollingCounter)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&DataKey::RollingCounter, &next);
        next
    }

    // Pools
    pub fn pool(env: &Env, pool_id: u32) -> Result<Pool, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Pool(pool_id))
            .ok_or(Error::PoolNotFound)
    }

    pub fn set_pool(env: &Env, pool_id: u32, pool: &Pool) {
        env.storage().persistent().set(&DataKey::Pool(pool_id), pool);
    }

    pub fn has_pool(env: &Env, pool_id: u32) -> bool {
        env.storage().persistent().has(&DataKey::Pool(pool_id))
    }

    pub fn pool_account(env: &Env, pool_id: u32, account: &Address) -> PoolAccount {
        env.storage()
            .persistent()
            .get(&DataKey::PoolAccount(pool_id, account.clone()))
            .unwrap_or(PoolAccount {
                principal: 0,
                locked: 0,
                reserved: 0,
            })
    }

    pub fn set_pool_account(env: &Env, pool_id: u32, account: &Address, record: &PoolAccount) {
        env.storage()
            .persistent()
            .set(&DataKey::PoolAccount(pool_id, account.clone()), record);
    }

    pub fn encumbrance(env: &Env, pool_id: u32, account: &Address) -> Option<Encumbrance> {
        env.storage()
            .persistent()
            .get(&DataKey::Encumbrance(pool_id, account.clone()))
    }

    pub fn set_encumbrance(env: &Env, pool_id: u32, account: &Address, record: &Encumbrance) {
        env.storage()
            .persistent()
            .set(&DataKey::Encumbrance(pool_id, account.clone()), record);
    }

    pub fn remove_encumbrance(env: &Env, pool_id: u32, account: &Address) {
        env.storage()
            .persistent()
            .remove(&DataKey::Encumbrance(pool_id, account.clone()));
    }

    pub fn roster(env: &Env, pool_id: u32) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::Roster(pool_id))
            .unwrap_or(Vec::new(env))
    }

    pub fn set_roster(env: &Env, pool_id: u32, roster: &Vec<Address>) {
        env.storage()
            .persistent()
            .set(&DataKey::Roster(pool_id), roster);
    }

    pub fn yield_account(env: &Env, pool_id: u32, account: &Address) -> YieldAccount {
        env.storage()
            .persistent()
            .get(&DataKey::YieldAccount(pool_id, account.clone()))
            .unwrap_or(YieldAccount {
                pending: 0,
                withdrawn: 0,
            })
    }

    pub fn set_yield_account(env: &Env, pool_id: u32, account: &Address, record: &YieldAccount) {
        env.storage()
            .persistent()
            .set(&DataKey::YieldAccount(pool_id, account.clone()), record);
    }

    pub fn undistributed(env: &Env, pool_id: u32) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Undistributed(pool_id))
            .unwrap_or(0)
    }

    pub fn set_undistributed(env: &Env, pool_id: u32, amount: i128) {
        env.storage()
            .persistent()
            .set(&DataKey::Undistributed(pool_id), &amount);
    }

    // Offers & agreements
    pub fn offer(env: &Env, offer_id: u64) -> Result<Offer, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Offer(offer_id))
            .ok_or(Error::OfferNotFound)
    }

    pub fn set_offer(env: &Env, offer: &Offer) {
        env.storage()
            .persistent()
            .set(&DataKey::Offer(offer.id), offer);
    }

    pub fn agreement(env: &Env, agreement_id: u64) -> Result<Agreement, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Agreement(agreement_id))
            .ok_or(Error::AgreementNotFound)
    }

    pub fn set_agreement(env: &Env, agreement: &Agreement) {
        env.storage()
            .persistent()
            .set(&DataKey::Agreement(agreement.id), agreement);
    }

    pub fn rolling(env: &Env, rolling_id: u64) -> Result<RollingAgreement, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Rolling(rolling_id))
            .ok_or(Error::AgreementNotFound)
    }

    pub fn set_rolling(env: &Env, rolling: &RollingAgreement) {
        env.storage()
            .persistent()
            .set(&DataKey::Rolling(rolling.id), rolling);
    }

    pub fn position_offers(env: &Env, position: u64) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&DataKey::PositionOffers(position))
            .unwrap_or(Vec::new(env))
    }

    pub fn set_position_offers(env: &Env, position: u64, offers: &Vec<u64>) {
        env.storage()
            .persistent()
            .set(&DataKey::PositionOffers(position), offers);
    }
}
