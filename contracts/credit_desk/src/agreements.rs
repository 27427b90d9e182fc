use crate::error::Error;
use crate::events::{
    AgreementExercisedEvent, AgreementOpenedEvent, AgreementRecoveredEvent, AgreementRepaidEvent,
    LoanCalledEvent,
};
use crate::fees;
use crate::offers::Offers;
use crate::pool::Pools;
use crate::positions::PositionRegistry;
use crate::storage::{Agreement, AgreementStatus, OfferTerms, Storage, RECOVER_GRACE};
use soroban_sdk::{Address, Env, Symbol};

pub struct Agreements;

impl Agreements {
    // ============================================
    // ACCEPT
    // ============================================

    pub fn accept(
        env: &Env,
        caller: &Address,
        offer_id: u64,
        taker_position: u64,
        fill: i128,
        now: u64,
    ) -> Result<u64, Error> {
        let mut offer = Storage::offer(env, offer_id)?;
        let fixed = match offer.terms.clone() {
            OfferTerms::Fixed(fixed) => fixed,
            OfferTerms::Rolling(_) => return Err(Error::InvalidOffer),
        };
        Offers::validate_fill(&offer, fill)?;

        PositionRegistry::require_controller(env, caller, taker_position)?;
        if taker_position == offer.position || *caller == offer.creator {
            return Err(Error::SelfFill);
        }

        let config = Storage::direct_config(env)?;
        let interest =
            fees::interest_due(fill, fixed.apr_bps, fixed.duration).ok_or(Error::InvalidAmount)?;
        let fee = fees::share_of(fill, config.platform_fee_bps).ok_or(Error::InvalidAmount)?;
        let net = fill - interest - fee;
        if net <= 0 {
            return Err(Error::InvalidFillAmount);
        }

        // Interest and platform fee are collected up front; the configured
        // shares of both go to the lender, the rest is protocol income.
        let lender_margin = fees::share_of(interest, config.interest_lender_bps)
            .ok_or(Error::InvalidAmount)?
            + fees::share_of(fee, config.platform_fee_lender_bps).ok_or(Error::InvalidAmount)?;
        let protocol_take = interest + fee - lender_margin;

        let collateral = Offers::collateral_for_fill(&offer, fill)?;

        let (lender, lender_position, borrower, borrower_position) = if offer.borrower_initiated {
            (
                caller.clone(),
                taker_position,
                offer.creator.clone(),
                offer.position,
            )
        } else {
            (
                offer.creator.clone(),
                offer.position,
                caller.clone(),
                taker_position,
            )
        };

        let reserve_released = if offer.borrower_initiated {
            // The borrower's reservation converts to a lock; the accepting
            // lender's principal is drawn against a fresh capacity check.
            Pools::release(env, offer.collateral_pool, &borrower, collateral);
            Pools::lock(env, offer.collateral_pool, &borrower, collateral, now)?;
            Pools::sub_principal(env, offer.source_pool, &lender, fill)?;
            collateral
        } else {
            Pools::lock(env, offer.collateral_pool, &borrower, collateral, now)?;
            Pools::release(env, offer.source_pool, &lender, fill);
            Pools::sub_principal(env, offer.source_pool, &lender, fill)?;
            fill
        };

        Pools::add_principal(env, offer.source_pool, &lender, lender_margin);
        fees::route_income(
            env,
            offer.source_pool,
            protocol_take,
            Symbol::new(env, "interest"),
            now,
        )?;
        Pools::transfer_out(env, offer.source_pool, &borrower, net)?;

        Offers::apply_fill(env, &mut offer, fill, collateral, reserve_released);

        let agreement_id = Storage::bump_agreement_id(env);
        let agreement = Agreement {
            id: agreement_id,
            lender: lender.clone(),
            borrower: borrower.clone(),
            lender_position,
            borrower_position,
            source_pool: offer.source_pool,
            collateral_pool: offer.collateral_pool,
            principal: fill,
            apr_bps: fixed.apr_bps,
            accept_ts: now,
            due_ts: now + fixed.duration,
            collateral,
            perms: offer.perms.clone(),
            status: AgreementStatus::Active,
        };
        Storage::set_agreement(env, &agreement);

        env.events().publish(
            (Symbol::new(env, "agreement_opened"), agreement_id),
            AgreementOpenedEvent {
                agreement_id,
                offer_id,
                lender,
                borrower,
                principal: fill,
                interest,
                platform_fee: fee,
                collateral,
                due_ts: agreement.due_ts,
            },
        );

        Ok(agreement_id)
    }

    // ============================================
    // REPAY
    // ============================================

    pub fn repay(env: &Env, caller: &Address, agreement_id: u64, now: u64) -> Result<(), Error> {
        let mut agreement = Storage::agreement(env, agreement_id)?;
        if agreement.status != AgreementStatus::Active {
            return Err(Error::InvalidStatus);
        }
        PositionRegistry::require_controller(env, caller, agreement.borrower_position)?;
        if now < agreement.due_ts && !agreement.perms.allow_early_repay {
            return Err(Error::EarlyRepayNotAllowed);
        }

        // Interest was prepaid at accept, so repayment is the principal
        // exactly. It is credited to whoever holds the lender-side claim now.
        Pools::transfer_in(env, agreement.source_pool, caller, agreement.principal)?;
        let claim_holder = PositionRegistry::owner_of(env, agreement.lender_position)?;
        Pools::add_principal(env, agreement.source_pool, &claim_holder, agreement.principal);

        Pools::unlock(
            env,
            agreement.collateral_pool,
            &agreement.borrower,
            agreement.collateral,
            now,
        );

        agreement.status = AgreementStatus::Repaid;
        Storage::set_agreement(env, &agreement);

        env.events().publish(
            (Symbol::new(env, "agreement_repaid"), agreement_id),
            AgreementRepaidEvent {
                agreement_id,
                borrower: caller.clone(),
                amount: agreement.principal,
            },
        );

        Ok(())
    }

    // ============================================
    // EXERCISE & RECOVERY
    // ============================================

    pub fn exercise(env: &Env, caller: &Address, agreement_id: u64, now: u64) -> Result<(), Error> {
        let mut agreement = Storage::agreement(env, agreement_id)?;
        if agreement.status != AgreementStatus::Active {
            return Err(Error::InvalidStatus);
        }
        PositionRegistry::require_controller(env, caller, agreement.lender_position)?;
        if now < agreement.due_ts && !agreement.perms.allow_early_exercise {
            return Err(Error::EarlyExerciseNotAllowed);
        }

        let lender_share = Self::seize_collateral(env, &agreement, now)?;

        agreement.status = AgreementStatus::Exercised;
        Storage::set_agreement(env, &agreement);

        env.events().publish(
            (Symbol::new(env, "agreement_exercised"), agreement_id),
            AgreementExercisedEvent {
                agreement_id,
                lender: caller.clone(),
                collateral_seized: agreement.collateral,
                lender_share,
            },
        );

        Ok(())
    }

    /// Keeper path: anyone may force the exercise once the due date plus the
    /// fixed grace window has passed.
    pub fn recover(env: &Env, agreement_id: u64, now: u64) -> Result<(), Error> {
        let mut agreement = Storage::agreement(env, agreement_id)?;
        if agreement.status != AgreementStatus::Active {
            return Err(Error::InvalidStatus);
        }
        if now < agreement.due_ts + RECOVER_GRACE {
            return Err(Error::GracePeriodActive);
        }

        let lender_share = Self::seize_collateral(env, &agreement, now)?;

        agreement.status = AgreementStatus::Recovered;
        Storage::set_agreement(env, &agreement);

        env.events().publish(
            (Symbol::new(env, "agreement_recovered"), agreement_id),
            AgreementRecoveredEvent {
                agreement_id,
                collateral_seized: agreement.collateral,
                lender_share,
            },
        );

        Ok(())
    }

    /// Lender accelerates the due date to now. Repay, exercise and the
    /// recovery grace window all run from the accelerated date.
    pub fn call(env: &Env, caller: &Address, agreement_id: u64, now: u64) -> Result<(), Error> {
        let mut agreement = Storage::agreement(env, agreement_id)?;
        if agreement.status != AgreementStatus::Active {
            return Err(Error::InvalidStatus);
        }
        PositionRegistry::require_controller(env, caller, agreement.lender_position)?;
        if !agreement.perms.allow_lender_call {
            return Err(Error::LenderCallNotAllowed);
        }
        if now >= agreement.due_ts {
            return Err(Error::InvalidStatus);
        }

        agreement.due_ts = now;
        Storage::set_agreement(env, &agreement);

        env.events().publish(
            (Symbol::new(env, "loan_called"), agreement_id),
            LoanCalledEvent {
                agreement_id,
                lender: caller.clone(),
                due_ts: now,
            },
        );

        Ok(())
    }

    /// Unlocks the collateral, moves the configured lender share to the
    /// current lender-side claim holder, and routes the remainder as
    /// protocol income within the collateral pool.
    fn seize_collateral(env: &Env, agreement: &Agreement, now: u64) -> Result<i128, Error> {
        let config = Storage::direct_config(env)?;
        let lender_share = fees::share_of(agreement.collateral, config.default_lender_bps)
            .ok_or(Error::InvalidAmount)?;
        let protocol_take = agreement.collateral - lender_share;

        Pools::unlock(
            env,
            agreement.collateral_pool,
            &agreement.borrower,
            agreement.collateral,
            now,
        );

        let claim_holder = PositionRegistry::owner_of(env, agreement.lender_position)?;
        Pools::transfer_principal(
            env,
            agreement.collateral_pool,
            &agreement.borrower,
            &claim_holder,
            lender_share,
        )?;

        if protocol_take > 0 {
            Pools::sub_principal(env, agreement.collateral_pool, &agreement.borrower, protocol_take)?;
            fees::route_income(
                env,
                agreement.collateral_pool,
                protocol_take,
                Symbol::new(env, "exercise"),
                now,
            )?;
        }

        Ok(lender_share)
    }
}
