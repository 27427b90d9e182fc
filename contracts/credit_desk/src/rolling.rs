use crate::error::Error;
use crate::events::{
    RollingDefaultedEvent, RollingExercisedEvent, RollingOpenedEvent, RollingPaymentEvent,
    RollingRepaidEvent,
};
use crate::fees;
use crate::offers::Offers;
use crate::pool::Pools;
use crate::positions::PositionRegistry;
use crate::storage::{OfferTerms, RollingAgreement, RollingStatus, Storage};
use soroban_sdk::{Address, Env, Symbol};

pub struct RollingAgreements;

impl RollingAgreements {
    // ============================================
    // ACCEPT
    // ============================================

    pub fn accept(
        env: &Env,
        caller: &Address,
        offer_id: u64,
        taker_position: u64,
        now: u64,
    ) -> Result<u64, Error> {
        let mut offer = Storage::offer(env, offer_id)?;
        let terms = match offer.terms.clone() {
            OfferTerms::Rolling(terms) => terms,
            OfferTerms::Fixed(_) => return Err(Error::InvalidOffer),
        };
        // Rolling offers never carry tranches, so fills are whole-principal.
        Offers::validate_fill(&offer, offer.principal)?;

        PositionRegistry::require_controller(env, caller, taker_position)?;
        if taker_position == offer.position || *caller == offer.creator {
            return Err(Error::SelfFill);
        }

        let principal = offer.principal;
        let collateral = offer.collateral;
        let net = principal - terms.upfront_premium;

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
            Pools::release(env, offer.collateral_pool, &borrower, collateral);
            Pools::lock(env, offer.collateral_pool, &borrower, collateral, now)?;
            Pools::sub_principal(env, offer.source_pool, &lender, principal)?;
            collateral
        } else {
            Pools::lock(env, offer.collateral_pool, &borrower, collateral, now)?;
            Pools::release(env, offer.source_pool, &lender, principal);
            Pools::sub_principal(env, offer.source_pool, &lender, principal)?;
            principal
        };

        // The premium is retained from the disbursement and goes straight
        // back to the lender's principal.
        Pools::add_principal(env, offer.source_pool, &lender, terms.upfront_premium);
        Pools::transfer_out(env, offer.source_pool, &borrower, net)?;

        Offers::apply_fill(env, &mut offer, principal, collateral, reserve_released);

        let config = Storage::rolling_config(env)?;
        let rolling_id = Storage::bump_rolling_id(env);
        let rolling = RollingAgreement {
            id: rolling_id,
            lender: lender.clone(),
            borrower: borrower.clone(),
            lender_position,
            borrower_position,
            source_pool: offer.source_pool,
            collateral_pool: offer.collateral_pool,
            principal,
            outstanding: principal,
            arrears: 0,
            payment_count: 0,
            last_accrual: now,
            next_due: now + terms.payment_interval,
            upfront_premium: terms.upfront_premium,
            payment_interval: terms.payment_interval,
            apr_bps: terms.apr_bps,
            grace_period: terms.grace_period,
            max_payment_count: terms.max_payment_count,
            penalty_bps: config.default_penalty_bps,
            collateral,
            perms: offer.perms.clone(),
            status: RollingStatus::Active,
        };
        Storage::set_rolling(env, &rolling);

        env.events().publish(
            (Symbol::new(env, "rolling_opened"), rolling_id),
            RollingOpenedEvent {
                rolling_id,
                offer_id,
                lender,
                borrower,
                principal,
                upfront_premium: terms.upfront_premium,
                next_due: rolling.next_due,
            },
        );

        Ok(rolling_id)
    }

    // ============================================
    // PAYMENTS
    // ============================================

    pub fn make_payment(
        env: &Env,
        caller: &Address,
        rolling_id: u64,
        amount: i128,
        now: u64,
    ) -> Result<(), Error> {
        let mut rolling = Storage::rolling(env, rolling_id)?;
        if rolling.status != RollingStatus::Active {
            return Err(Error::InvalidStatus);
        }
        PositionRegistry::require_controller(env, caller, rolling.borrower_position)?;
        if !rolling.perms.allow_amortization {
            return Err(Error::AmortizationNotAllowed);
        }
        if rolling.payment_count >= rolling.max_payment_count {
            return Err(Error::PaymentScheduleExhausted);
        }

        Self::accrue_arrears(&mut rolling, now)?;

        let debt = rolling.outstanding + rolling.arrears;
        if amount <= 0 || amount > debt {
            return Err(Error::InvalidAmount);
        }
        let config = Storage::rolling_config(env)?;
        let minimum =
            fees::share_of(rolling.principal, config.min_payment_bps).ok_or(Error::InvalidAmount)?;
        if amount < minimum && amount != debt {
            return Err(Error::PaymentTooSmall);
        }

        Pools::transfer_in(env, rolling.source_pool, caller, amount)?;

        // Arrears first, then principal.
        let interest_paid = if amount < rolling.arrears {
            amount
        } else {
            rolling.arrears
        };
        let principal_paid = amount - interest_paid;
        rolling.arrears -= interest_paid;
        rolling.outstanding -= principal_paid;

        Self::route_payment(env, &rolling, interest_paid, principal_paid, now)?;

        rolling.payment_count += 1;
        rolling.next_due += rolling.payment_interval;

        if rolling.outstanding == 0 && rolling.arrears == 0 {
            Pools::unlock(
                env,
                rolling.collateral_pool,
                &rolling.borrower,
                rolling.collateral,
                now,
            );
            rolling.status = RollingStatus::Repaid;
        }
        Storage::set_rolling(env, &rolling);

        env.events().publish(
            (Symbol::new(env, "rolling_payment"), rolling_id),
            RollingPaymentEvent {
                rolling_id,
                borrower: caller.clone(),
                amount,
                interest_paid,
                principal_paid,
                outstanding: rolling.outstanding,
                arrears: rolling.arrears,
            },
        );

        Ok(())
    }

    pub fn repay_in_full(
        env: &Env,
        caller: &Address,
        rolling_id: u64,
        now: u64,
    ) -> Result<(), Error> {
        let mut rolling = Storage::rolling(env, rolling_id)?;
        if rolling.status != RollingStatus::Active {
            return Err(Error::InvalidStatus);
        }
        PositionRegistry::require_controller(env, caller, rolling.borrower_position)?;
        if !rolling.perms.allow_early_repay {
            return Err(Error::EarlyRepayNotAllowed);
        }

        Self::accrue_arrears(&mut rolling, now)?;

        let debt = rolling.outstanding + rolling.arrears;
        Pools::transfer_in(env, rolling.source_pool, caller, debt)?;
        Self::route_payment(env, &rolling, rolling.arrears, rolling.outstanding, now)?;
        rolling.arrears = 0;
        rolling.outstanding = 0;

        // Collateral returns to the borrower without moving.
        Pools::unlock(
            env,
            rolling.collateral_pool,
            &rolling.borrower,
            rolling.collateral,
            now,
        );

        rolling.status = RollingStatus::Repaid;
        Storage::set_rolling(env, &rolling);

        env.events().publish(
            (Symbol::new(env, "rolling_repaid"), rolling_id),
            RollingRepaidEvent {
                rolling_id,
                borrower: caller.clone(),
                amount: debt,
            },
        );

        Ok(())
    }

    // ============================================
    // EXERCISE & DEFAULT
    // ============================================

    pub fn exercise(env: &Env, caller: &Address, rolling_id: u64, now: u64) -> Result<(), Error> {
        let mut rolling = Storage::rolling(env, rolling_id)?;
        if rolling.status != RollingStatus::Active {
            return Err(Error::InvalidStatus);
        }
        PositionRegistry::require_controller(env, caller, rolling.lender_position)?;
        if !rolling.perms.allow_early_exercise {
            return Err(Error::EarlyExerciseNotAllowed);
        }

        Self::accrue_arrears(&mut rolling, now)?;
        let (seized, refund) = Self::settle_against_collateral(env, &mut rolling, now)?;

        rolling.status = RollingStatus::Exercised;
        Storage::set_rolling(env, &rolling);

        env.events().publish(
            (Symbol::new(env, "rolling_exercised"), rolling_id),
            RollingExercisedEvent {
                rolling_id,
                lender: caller.clone(),
                seized,
                refund,
            },
        );

        Ok(())
    }

    /// Keeper path: after a missed due date plus the grace period, anyone may
    /// settle the agreement against its collateral. The penalty lands in
    /// arrears before settlement, and the early-exercise flag does not apply.
    pub fn claim_default(env: &Env, rolling_id: u64, now: u64) -> Result<(), Error> {
        let mut rolling = Storage::rolling(env, rolling_id)?;
        if rolling.status != RollingStatus::Active {
            return Err(Error::InvalidStatus);
        }
        if now <= rolling.next_due + rolling.grace_period {
            return Err(Error::GracePeriodActive);
        }

        Self::accrue_arrears(&mut rolling, now)?;
        if rolling.outstanding + rolling.arrears == 0 {
            return Err(Error::InvalidStatus);
        }

        let penalty =
            fees::share_of(rolling.outstanding, rolling.penalty_bps).ok_or(Error::InvalidAmount)?;
        rolling.arrears += penalty;

        let (seized, refund) = Self::settle_against_collateral(env, &mut rolling, now)?;

        rolling.status = RollingStatus::Defaulted;
        Storage::set_rolling(env, &rolling);

        env.events().publish(
            (Symbol::new(env, "rolling_defaulted"), rolling_id),
            RollingDefaultedEvent {
                rolling_id,
                penalty,
                seized,
                refund,
            },
        );

        Ok(())
    }

    // ============================================
    // INTERNAL
    // ============================================

    /// Interest accrues into arrears pro-rated by elapsed time, never into
    /// outstanding principal.
    fn accrue_arrears(rolling: &mut RollingAgreement, now: u64) -> Result<(), Error> {
        if now <= rolling.last_accrual {
            return Ok(());
        }
        let elapsed = now - rolling.last_accrual;
        let accrued = fees::interest_due(rolling.outstanding, rolling.apr_bps, elapsed)
            .ok_or(Error::InvalidAmount)?;
        rolling.arrears = rolling
            .arrears
            .checked_add(accrued)
            .ok_or(Error::InvalidAmount)?;
        rolling.last_accrual = now;
        Ok(())
    }

    /// The interest portion splits between the lender-side claim holder and
    /// the protocol; the principal portion returns to the claim holder whole.
    fn route_payment(
        env: &Env,
        rolling: &RollingAgreement,
        interest_paid: i128,
        principal_paid: i128,
        now: u64,
    ) -> Result<(), Error> {
        let claim_holder = PositionRegistry::owner_of(env, rolling.lender_position)?;
        if interest_paid > 0 {
            let config = Storage::direct_config(env)?;
            let lender_cut = fees::share_of(interest_paid, config.interest_lender_bps)
                .ok_or(Error::InvalidAmount)?;
            Pools::add_principal(env, rolling.source_pool, &claim_holder, lender_cut);
            fees::route_income(
                env,
                rolling.source_pool,
                interest_paid - lender_cut,
                Symbol::new(env, "payment"),
                now,
            )?;
        }
        if principal_paid > 0 {
            Pools::add_principal(env, rolling.source_pool, &claim_holder, principal_paid);
        }
        Ok(())
    }

    /// Settles the debt against the locked collateral: the lender-side claim
    /// holder receives min(collateral, debt); anything above the debt stays
    /// with the borrower through the unlock. Debt fields reset to zero.
    fn settle_against_collateral(
        env: &Env,
        rolling: &mut RollingAgreement,
        now: u64,
    ) -> Result<(i128, i128), Error> {
        let debt = rolling.outstanding + rolling.arrears;
        let seized = if debt < rolling.collateral {
            debt
        } else {
            rolling.collateral
        };
        let refund = rolling.collateral - seized;

        Pools::unlock(
            env,
            rolling.collateral_pool,
            &rolling.borrower,
            rolling.collateral,
            now,
        );
        if seized > 0 {
            let claim_holder = PositionRegistry::owner_of(env, rolling.lender_position)?;
            Pools::transfer_principal(
                env,
                rolling.collateral_pool,
                &rolling.borrower,
                &claim_holder,
                seized,
            )?;
        }

        rolling.outstanding = 0;
        rolling.arrears = 0;
        Ok((seized, refund))
    }
}
