use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-19)
    // ============================================
    /// Caller does not control the referenced position (or is not admin)
    Unauthorized = 10,

    // ============================================
    // POOL & BALANCE ERRORS (20-29)
    // ============================================
    /// Pool not found
    PoolNotFound = 20,
    /// Requested reservation/lock/debit exceeds available principal
    InsufficientPrincipal = 21,
    /// Amount must be positive (or arithmetic out of range)
    InvalidAmount = 22,
    /// Tracked native balance does not match the actual asset balance
    ValueMismatch = 23,

    // ============================================
    // OFFER ERRORS (30-39)
    // ============================================
    /// Offer not found
    OfferNotFound = 30,
    /// Offer cancelled or already filled
    InvalidOffer = 31,
    /// Accepting position equals the offer's initiating position
    SelfFill = 32,
    /// Offer terms violate the configured bounds
    InvalidTerms = 33,
    /// Fill amount invalid for this offer (zero, above remaining, or partial on strict)
    InvalidFillAmount = 34,

    // ============================================
    // AGREEMENT ERRORS (40-49)
    // ============================================
    /// Agreement not found
    AgreementNotFound = 40,
    /// Agreement not in the expected status for this operation
    InvalidStatus = 41,
    /// Repayment before due date without the early-repay flag
    EarlyRepayNotAllowed = 42,
    /// Exercise before due date without the early-exercise flag
    EarlyExerciseNotAllowed = 43,
    /// Loan call without the lender-call flag
    LenderCallNotAllowed = 44,
    /// Recovery/default attempted before the grace window elapsed
    GracePeriodActive = 45,

    // ============================================
    // ROLLING AGREEMENT ERRORS (50-59)
    // ============================================
    /// Payment on a rolling agreement without the amortization flag
    AmortizationNotAllowed = 50,
    /// Payment below the configured minimum without settling the debt
    PaymentTooSmall = 51,
    /// Payment count reached the agreement's maximum
    PaymentScheduleExhausted = 52,

    // ============================================
    // CONFIG & OPERATIONAL ERRORS (60-69)
    // ============================================
    /// Configuration value out of range
    InvalidConfig = 60,
    /// Contract is paused
    ContractPaused = 61,
}
