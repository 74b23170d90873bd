//! Error types for the lending hub and its reference collaborators

use odra::prelude::*;

/// Errors raised by the hub
#[odra::odra_error]
pub enum HubError {
    // Configuration Errors
    /// No market registered under this id
    MarketNotCreated = 1,
    /// A market with identical parameters already exists
    MarketAlreadyExists = 2,
    /// Oracle failed the interface probe
    InvalidOracle = 3,
    /// Interest rate model failed the interface probe
    InvalidIrm = 4,
    /// Liquidation threshold is zero or above the maximum
    InvalidLiquidationThreshold = 5,
    /// Loan and collateral asset are the same token
    IdenticalAssets = 6,
    /// Protocol or flash loan fee above its cap
    MaxFeeExceeded = 7,
    /// Market is frozen for new exposure
    MarketFrozen = 8,

    // Liquidity Errors
    /// Not enough idle liquidity in the market
    InsufficientLiquidity = 10,

    // Solvency Errors
    /// Position would be unhealthy after the operation
    InsufficientCollateral = 20,
    /// Position is healthy, cannot liquidate
    PositionHealthy = 21,

    // Access Control Errors
    /// Caller may not act for this account
    Unauthorized = 30,
    /// Reentrant call into the hub
    Reentrancy = 31,

    // Input Errors
    /// Exactly one of assets and shares must be nonzero
    InconsistentInput = 40,
    /// Zero amount not allowed
    ZeroAmount = 41,
    /// Position does not hold enough shares or collateral
    InsufficientBalance = 42,
    /// Repayment larger than the outstanding debt
    RepayExceedsDebt = 43,
    /// Flash loan receiver did not return principal and fee
    FlashLoanNotRepaid = 44,
    /// Market parameters could not be serialized
    SerializationFailed = 45,
    /// Token contract reported a failed transfer
    TransferFailed = 46,

    // Arithmetic Faults
    /// Math overflow occurred
    MathOverflow = 50,
    /// Math underflow occurred
    MathUnderflow = 51,
    /// Division by zero
    DivisionByZero = 52,
}

/// Errors raised by the reference price oracle
#[odra::odra_error]
pub enum OracleError {
    /// Price was never set or was cleared
    PriceNotSet = 100,
    /// Zero price rejected
    InvalidPrice = 101,
    /// Caller is not the oracle admin
    NotAdmin = 102,
    /// Price is older than the allowed staleness
    StalePrice = 103,
}

/// Errors raised by the reference interest rate models
#[odra::odra_error]
pub enum RateModelError {
    /// Invalid interest rate parameters
    InvalidParams = 110,
    /// Caller is not the model admin
    NotAdmin = 111,
}
