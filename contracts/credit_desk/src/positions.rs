use crate::error::Error;
use crate::storage::Storage;
use soroban_sdk::{vec, Address, Env, IntoVal, Symbol};

/// Client helpers for the external position registry. The desk never owns
/// position lifecycle; it only asks who controls a position.
pub struct PositionRegistry;

impl PositionRegistry {
    pub fn owner_of(env: &Env, position: u64) -> Result<Address, Error> {
        let registry = Storage::registry(env)?;
        let owner: Address = env.invoke_contract(
            &registry,
            &Symbol::new(env, "owner_of"),
            vec![env, position.into_val(env)],
        );
        Ok(owner)
    }

    /// Authorizes the caller and checks they control the position.
    pub fn require_controller(env: &Env, caller: &Address, position: u64) -> Result<(), Error> {
        caller.require_auth();
        if Self::owner_of(env, position)? != *caller {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }
}
