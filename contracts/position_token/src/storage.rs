use soroban_sdk::contracttype;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    /// Lending desk notified before a position changes controller
    Desk,
    Initialized,
    PositionCounter,
    /// Position ID → current controller
    Owner(u64),
    /// Position ID → stable key (independent of the controller)
    Key(u64),
}
