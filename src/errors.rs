//! Error definitions for the asset token
use odra::prelude::*;

/// Custom errors for the asset token contract
#[odra::odra_error]
pub enum TokenError {
    /// Insufficient allowance for transfer
    InsufficientAllowance = 200,

    /// Insufficient balance for operation
    InsufficientBalance = 201,

    /// Caller is not the minter
    NotMinter = 202,

    /// Minting would overflow the total supply
    SupplyOverflow = 203,
}
