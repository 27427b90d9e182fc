use crate::error::Error;
use crate::events::{DepositEvent, PoolCreatedEvent, WithdrawEvent};
use crate::storage::{Encumbrance, Pool, PoolAccount, Storage};
use soroban_sdk::{token, Address, Env, Symbol};

pub struct Pools;

impl Pools {
    // ============================================
    // POOL MANAGEMENT
    // ============================================

    pub fn create(env: &Env, asset: &Address, native: bool) -> u32 {
        let pool_id = Storage::bump_pool_id(env);
        let pool = Pool {
            asset: asset.clone(),
            native,
            fee_index: 0,
            tracked_balance: 0,
        };
        Storage::set_pool(env, pool_id, &pool);

        env.events().publish(
            (Symbol::new(env, "pool_created"), pool_id),
            PoolCreatedEvent {
                pool_id,
                asset: asset.clone(),
                native,
            },
        );

        pool_id
    }

    pub fn deposit(env: &Env, caller: &Address, pool_id: u32, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        caller.require_auth();

        Self::transfer_in(env, pool_id, caller, amount)?;

        let mut acct = Storage::pool_account(env, pool_id, caller);
        acct.principal = acct
            .principal
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        Storage::set_pool_account(env, pool_id, caller, &acct);

        env.events().publish(
            (Symbol::new(env, "deposit"), pool_id),
            DepositEvent {
                pool_id,
                account: caller.clone(),
                amount,
            },
        );

        Ok(())
    }

    pub fn withdraw(env: &Env, caller: &Address, pool_id: u32, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        caller.require_auth();

        if !Storage::has_pool(env, pool_id) {
            return Err(Error::PoolNotFound);
        }

        let mut acct = Storage::pool_account(env, pool_id, caller);
        if amount > Self::available(&acct) {
            return Err(Error::InsufficientPrincipal);
        }
        acct.principal -= amount;
        Storage::set_pool_account(env, pool_id, caller, &acct);

        Self::transfer_out(env, pool_id, caller, amount)?;

        env.events().publish(
            (Symbol::new(env, "withdraw"), pool_id),
            WithdrawEvent {
                pool_id,
                account: caller.clone(),
                amount,
            },
        );

        Ok(())
    }

    // ============================================
    // CAPACITY LEDGER
    // ============================================

    /// Uncommitted principal available for new reservations or locks.
    pub fn available(acct: &PoolAccount) -> i128 {
        acct.principal - acct.locked - acct.reserved
    }

    pub fn reserve(env: &Env, pool_id: u32, account: &Address, amount: i128) -> Result<(), Error> {
        let mut acct = Storage::pool_account(env, pool_id, account);
        if amount > Self::available(&acct) {
            return Err(Error::InsufficientPrincipal);
        }
        acct.reserved += amount;
        Storage::set_pool_account(env, pool_id, account, &acct);
        Ok(())
    }

    /// Releasing more than is outstanding is a programming error, not a user
    /// fault, so it traps instead of returning.
    pub fn release(env: &Env, pool_id: u32, account: &Address, amount: i128) {
        let mut acct = Storage::pool_account(env, pool_id, account);
        if amount > acct.reserved {
            panic!("release exceeds outstanding reservation");
        }
        acct.reserved -= amount;
        Storage::set_pool_account(env, pool_id, account, &acct);
    }

    /// Locks principal as collateral. Any change to the locked amount rewrites
    /// the account's encumbrance with a fresh timestamp.
    pub fn lock(
        env: &Env,
        pool_id: u32,
        account: &Address,
        amount: i128,
        now: u64,
    ) -> Result<(), Error> {
        let mut acct = Storage::pool_account(env, pool_id, account);
        if amount > Self::available(&acct) {
            return Err(Error::InsufficientPrincipal);
        }
        acct.locked += amount;
        Storage::set_pool_account(env, pool_id, account, &acct);
        Self::rewrite_encumbrance(env, pool_id, account, acct.locked, now);
        Ok(())
    }

    pub fn unlock(env: &Env, pool_id: u32, account: &Address, amount: i128, now: u64) {
        let mut acct = Storage::pool_account(env, pool_id, account);
        if amount > acct.locked {
            panic!("unlock exceeds locked amount");
        }
        acct.locked -= amount;
        Storage::set_pool_account(env, pool_id, account, &acct);
        Self::rewrite_encumbrance(env, pool_id, account, acct.locked, now);
    }

    pub fn add_principal(env: &Env, pool_id: u32, account: &Address, amount: i128) {
        let mut acct = Storage::pool_account(env, pool_id, account);
        acct.principal += amount;
        Storage::set_pool_account(env, pool_id, account, &acct);
    }

    pub fn sub_principal(
        env: &Env,
        pool_id: u32,
        account: &Address,
        amount: i128,
    ) -> Result<(), Error> {
        let mut acct = Storage::pool_account(env, pool_id, account);
        if amount > Self::available(&acct) {
            return Err(Error::InsufficientPrincipal);
        }
        acct.principal -= amount;
        Storage::set_pool_account(env, pool_id, account, &acct);
        Ok(())
    }

    /// Moves unencumbered principal between accounts within a pool.
    pub fn transfer_principal(
        env: &Env,
        pool_id: u32,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::sub_principal(env, pool_id, from, amount)?;
        Self::add_principal(env, pool_id, to, amount);
        Ok(())
    }

    /// Adds to the pool's residual fee accumulator.
    pub fn bump_fee_index(env: &Env, pool_id: u32, amount: i128) -> Result<(), Error> {
        let mut pool = Storage::pool(env, pool_id)?;
        pool.fee_index = pool
            .fee_index
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        Storage::set_pool(env, pool_id, &pool);
        Ok(())
    }

    fn rewrite_encumbrance(env: &Env, pool_id: u32, account: &Address, locked: i128, now: u64) {
        let mut roster = Storage::roster(env, pool_id);
        if locked == 0 {
            Storage::remove_encumbrance(env, pool_id, account);
            if let Some(index) = roster.first_index_of(account.clone()) {
                roster.remove(index);
                Storage::set_roster(env, pool_id, &roster);
            }
        } else {
            Storage::set_encumbrance(
                env,
                pool_id,
                account,
                &Encumbrance {
                    locked_amount: locked,
                    since: now,
                },
            );
            if roster.first_index_of(account.clone()).is_none() {
                roster.push_back(account.clone());
                Storage::set_roster(env, pool_id, &roster);
            }
        }
    }

    // ============================================
    // TOKEN MOVEMENT
    // ============================================

    /// Pulls tokens into the desk. Native pools reconcile the contract's
    /// actual asset balance against the tracked balance so that any drift
    /// surfaces as ValueMismatch instead of being silently absorbed.
    pub fn transfer_in(env: &Env, pool_id: u32, from: &Address, amount: i128) -> Result<(), Error> {
        let mut pool = Storage::pool(env, pool_id)?;
        let client = token::Client::new(env, &pool.asset);
        client.transfer(from, &env.current_contract_address(), &amount);

        if pool.native {
            let actual = client.balance(&env.current_contract_address());
            let expected = pool
                .tracked_balance
                .checked_add(amount)
                .ok_or(Error::InvalidAmount)?;
            if actual != expected {
                return Err(Error::ValueMismatch);
            }
            pool.tracked_balance = expected;
            Storage::set_pool(env, pool_id, &pool);
        }
        Ok(())
    }

    pub fn transfer_out(env: &Env, pool_id: u32, to: &Address, amount: i128) -> Result<(), Error> {
        let mut pool = Storage::pool(env, pool_id)?;
        let client = token::Client::new(env, &pool.asset);
        client.transfer(&env.current_contract_address(), to, &amount);

        if pool.native {
            pool.tracked_balance -= amount;
            Storage::set_pool(env, pool_id, &pool);
        }
        Ok(())
    }
}
