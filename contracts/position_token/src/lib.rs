#![no_std]

mod error;
mod events;
mod storage;

use error::Error;
use events::{MintEvent, TransferEvent};
use storage::DataKey;

use soroban_sdk::{
    contract, contractimpl, vec, Address, Bytes, BytesN, Env, IntoVal, Symbol,
};

#[contract]
pub struct PositionToken;

#[contractimpl]
impl PositionToken {
    /// Initialize the registry
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);

        Ok(())
    }

    /// Wire up the lending desk that gets notified before transfers
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn set_desk(env: Env, desk: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage().instance().set(&DataKey::Desk, &desk);

        Ok(())
    }

    /// Mint a new position to the caller-approved recipient
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn mint(env: Env, to: Address) -> Result<u64, Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        to.require_auth();

        let position_id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::PositionCounter)
            .unwrap_or(0)
            + 1;
        env.storage()
            .instance()
            .set(&DataKey::PositionCounter, &position_id);

        // Key is fixed at mint so it survives controller changes.
        let mut seed = Bytes::new(&env);
        seed.extend_from_array(&position_id.to_be_bytes());
        seed.extend_from_array(&env.ledger().sequence().to_be_bytes());
        let key: BytesN<32> = env.crypto().sha256(&seed).to_bytes();

        env.storage()
            .persistent()
            .set(&DataKey::Owner(position_id), &to);
        env.storage()
            .persistent()
            .set(&DataKey::Key(position_id), &key);

        env.events().publish(
            (Symbol::new(&env, "mint"), position_id),
            MintEvent {
                position_id,
                to: to.clone(),
            },
        );

        Ok(position_id)
    }

    /// Transfer a position. The desk is notified first so that offers backed
    /// by the position are cancelled before the controller changes.
    ///
    /// # Errors
    /// - `PositionNotFound`: Unknown position ID
    /// - `Unauthorized`: From address is not the current controller
    pub fn transfer(env: Env, from: Address, to: Address, position_id: u64) -> Result<(), Error> {
        let owner: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Owner(position_id))
            .ok_or(Error::PositionNotFound)?;

        if owner != from {
            return Err(Error::Unauthorized);
        }
        from.require_auth();

        let desk: Option<Address> = env.storage().instance().get(&DataKey::Desk);
        if let Some(desk) = desk {
            env.invoke_contract::<()>(
                &desk,
                &Symbol::new(&env, "cancel_offers_for_position"),
                vec![&env, position_id.into_val(&env)],
            );
        }

        env.storage()
            .persistent()
            .set(&DataKey::Owner(position_id), &to);

        env.events().publish(
            (Symbol::new(&env, "transfer"), position_id),
            TransferEvent {
                position_id,
                from: from.clone(),
                to: to.clone(),
            },
        );

        Ok(())
    }

    /// Current controller of a position
    pub fn owner_of(env: Env, position_id: u64) -> Result<Address, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Owner(position_id))
            .ok_or(Error::PositionNotFound)
    }

    /// Stable key of a position, fixed at mint
    pub fn position_key(env: Env, position_id: u64) -> Result<BytesN<32>, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Key(position_id))
            .ok_or(Error::PositionNotFound)
    }
}
