//! CEP-18 event definitions for the asset token
use odra::prelude::*;
use odra::casper_types::U256;

/// Event emitted when tokens are transferred or minted
#[odra::event]
pub struct Transfer {
    /// From address
    pub from: Address,
    /// To address
    pub to: Address,
    /// Amount transferred
    pub value: U256,
}

/// Event emitted when approval is granted
#[odra::event]
pub struct Approval {
    /// Owner address
    pub owner: Address,
    /// Spender address
    pub spender: Address,
    /// Amount approved
    pub value: U256,
}
