use crate::error::Error;
use crate::events::{YieldAccruedEvent, YieldSettledEvent};
use crate::fees;
use crate::pool::Pools;
use crate::storage::Storage;
use soroban_sdk::{Address, Env, Symbol, Vec};

pub struct ActiveCredit;

impl ActiveCredit {
    /// Distributes `amount` across accounts whose encumbrance has met the
    /// time gate, proportional to locked amounts. All but the last eligible
    /// account get floor shares; the last takes the remainder, so the
    /// allocations sum to `amount` exactly. With no eligible account the
    /// whole amount falls back to the pool's fee index instead of failing
    /// the triggering operation.
    pub fn accrue(
        env: &Env,
        pool_id: u32,
        amount: i128,
        tag: Symbol,
        now: u64,
    ) -> Result<(), Error> {
        if amount == 0 {
            return Ok(());
        }
        let gate = Storage::time_gate(env)?;
        let roster = Storage::roster(env, pool_id);

        let mut eligible: Vec<(Address, i128)> = Vec::new(env);
        let mut total: i128 = 0;
        for account in roster.iter() {
            if let Some(record) = Storage::encumbrance(env, pool_id, &account) {
                if now - record.since >= gate {
                    total = total
                        .checked_add(record.locked_amount)
                        .ok_or(Error::InvalidAmount)?;
                    eligible.push_back((account, record.locked_amount));
                }
            }
        }

        if total == 0 {
            Pools::bump_fee_index(env, pool_id, amount)?;
            env.events().publish(
                (Symbol::new(env, "yield_accrued"), pool_id),
                YieldAccruedEvent {
                    pool_id,
                    amount,
                    tag,
                    recipients: 0,
                },
            );
            return Ok(());
        }

        let count = eligible.len();
        let last = (count - 1) as usize;
        let mut distributed: i128 = 0;
        for (i, (account, locked)) in eligible.iter().enumerate() {
            let share = if i == last {
                amount - distributed
            } else {
                fees::proportional_share(amount, locked, total).ok_or(Error::InvalidAmount)?
            };
            distributed += share;

            let mut record = Storage::yield_account(env, pool_id, &account);
            record.pending += share;
            Storage::set_yield_account(env, pool_id, &account, &record);
        }

        Storage::set_undistributed(env, pool_id, Storage::undistributed(env, pool_id) + amount);

        env.events().publish(
            (Symbol::new(env, "yield_accrued"), pool_id),
            YieldAccruedEvent {
                pool_id,
                amount,
                tag,
                recipients: count,
            },
        );

        Ok(())
    }

    /// External injection path: pulls the amount from the caller into the
    /// pool, then distributes it under the caller's tag.
    pub fn accrue_yield(
        env: &Env,
        caller: &Address,
        pool_id: u32,
        amount: i128,
        tag: Symbol,
        now: u64,
    ) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        caller.require_auth();

        Pools::transfer_in(env, pool_id, caller, amount)?;
        Self::accrue(env, pool_id, amount, tag, now)
    }

    /// Pays out the account's pending yield. Calling again without an
    /// intervening accrual moves nothing.
    pub fn settle(env: &Env, account: &Address, pool_id: u32) -> Result<i128, Error> {
        account.require_auth();

        if !Storage::has_pool(env, pool_id) {
            return Err(Error::PoolNotFound);
        }

        let mut record = Storage::yield_account(env, pool_id, account);
        if record.pending == 0 {
            return Ok(0);
        }

        let amount = record.pending;
        record.pending = 0;
        record.withdrawn += amount;
        Storage::set_yield_account(env, pool_id, account, &record);
        Storage::set_undistributed(env, pool_id, Storage::undistributed(env, pool_id) - amount);

        Pools::transfer_out(env, pool_id, account, amount)?;

        env.events().publish(
            (Symbol::new(env, "yield_settled"), pool_id),
            YieldSettledEvent {
                pool_id,
                account: account.clone(),
                amount,
            },
        );

        Ok(amount)
    }
}
