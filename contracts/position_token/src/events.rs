use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct MintEvent {
    pub position_id: u64,
    pub to: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TransferEvent {
    pub position_id: u64,
    pub from: Address,
    pub to: Address,
}
