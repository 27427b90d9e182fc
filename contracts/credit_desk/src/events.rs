use soroban_sdk::{contracttype, Address, Symbol};

#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolCreatedEvent {
    pub pool_id: u32,
    pub asset: Address,
    pub native: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DepositEvent {
    pub pool_id: u32,
    pub account: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct WithdrawEvent {
    pub pool_id: u32,
    pub account: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OfferPostedEvent {
    pub offer_id: u64,
    pub position: u64,
    pub borrower_initiated: bool,
    pub source_pool: u32,
    pub collateral_pool: u32,
    pub principal: i128,
    pub collateral: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OfferCancelledEvent {
    pub offer_id: u64,
    pub position: u64,
    pub released: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AgreementOpenedEvent {
    pub agreement_id: u64,
    pub offer_id: u64,
    pub lender: Address,
    pub borrower: Address,
    pub principal: i128,
    pub interest: i128,
    pub platform_fee: i128,
    pub collateral: i128,
    pub due_ts: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AgreementRepaidEvent {
    pub agreement_id: u64,
    pub borrower: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AgreementExercisedEvent {
    pub agreement_id: u64,
    pub lender: Address,
    pub collateral_seized: i128,
    pub lender_share: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AgreementRecoveredEvent {
    pub agreement_id: u64,
    pub collateral_seized: i128,
    pub lender_share: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct LoanCalledEvent {
    pub agreement_id: u64,
    pub lender: Address,
    pub due_ts: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RollingOpenedEvent {
    pub rolling_id: u64,
    pub offer_id: u64,
    pub lender: Address,
    pub borrower: Address,
    pub principal: i128,
    pub upfront_premium: i128,
    pub next_due: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RollingPaymentEvent {
    pub rolling_id: u64,
    pub borrower: Address,
    pub amount: i128,
    pub interest_paid: i128,
    pub principal_paid: i128,
    pub outstanding: i128,
    pub arrears: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RollingRepaidEvent {
    pub rolling_id: u64,
    pub borrower: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RollingExercisedEvent {
    pub rolling_id: u64,
    pub lender: Address,
    pub seized: i128,
    pub refund: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RollingDefaultedEvent {
    pub rolling_id: u64,
    pub penalty: i128,
    pub seized: i128,
    pub refund: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct YieldAccruedEvent {
    pub pool_id: u32,
    pub amount: i128,
    pub tag: Symbol,
    /// Number of eligible accounts; zero means the fee-index fallback took it
    pub recipients: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct YieldSettledEvent {
    pub pool_id: u32,
    pub account: Address,
    pub amount: i128,
}
