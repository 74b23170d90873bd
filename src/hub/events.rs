//! Events for the lending hub and its reference collaborators

use odra::prelude::*;
use odra::casper_types::U256;
use super::market::{MarketId, MarketParams};

// ============================================================================
// Market Events
// ============================================================================

/// Event emitted when a market is created
#[odra::event]
pub struct MarketCreated {
    /// Market id
    pub id: MarketId,
    /// Market parameters
    pub params: MarketParams,
}

/// Event emitted when interest is accrued on a market
#[odra::event]
pub struct AccrueInterest {
    /// Market id
    pub id: MarketId,
    /// Per-second borrow rate used
    pub borrow_rate: U256,
    /// Interest added to supply and borrow totals
    pub interest: U256,
    /// Supply shares minted to the fee recipient
    pub fee_shares: U256,
}

// ============================================================================
// Supply Events
// ============================================================================

/// Event emitted when loan assets are supplied
#[odra::event]
pub struct Supply {
    /// Market id
    pub id: MarketId,
    /// Address that paid
    pub caller: Address,
    /// Address credited
    pub on_behalf: Address,
    /// Assets supplied
    pub assets: U256,
    /// Shares minted
    pub shares: U256,
}

/// Event emitted when loan assets are withdrawn
#[odra::event]
pub struct Withdraw {
    /// Market id
    pub id: MarketId,
    /// Address that called
    pub caller: Address,
    /// Address debited
    pub on_behalf: Address,
    /// Address paid
    pub receiver: Address,
    /// Assets withdrawn
    pub assets: U256,
    /// Shares burned
    pub shares: U256,
}

// ============================================================================
// Collateral Events
// ============================================================================

/// Event emitted when collateral is deposited
#[odra::event]
pub struct SupplyCollateral {
    /// Market id
    pub id: MarketId,
    /// Address that paid
    pub caller: Address,
    /// Address credited
    pub on_behalf: Address,
    /// Collateral deposited
    pub assets: U256,
}

/// Event emitted when collateral is withdrawn
#[odra::event]
pub struct WithdrawCollateral {
    /// Market id
    pub id: MarketId,
    /// Address that called
    pub caller: Address,
    /// Address debited
    pub on_behalf: Address,
    /// Address paid
    pub receiver: Address,
    /// Collateral withdrawn
    pub assets: U256,
}

// ============================================================================
// Borrowing Events
// ============================================================================

/// Event emitted when loan assets are borrowed
#[odra::event]
pub struct Borrow {
    /// Market id
    pub id: MarketId,
    /// Address that called
    pub caller: Address,
    /// Address charged with the debt
    pub on_behalf: Address,
    /// Address paid
    pub receiver: Address,
    /// Assets borrowed
    pub assets: U256,
    /// Borrow shares minted
    pub shares: U256,
}

/// Event emitted when debt is repaid
#[odra::event]
pub struct Repay {
    /// Market id
    pub id: MarketId,
    /// Address that paid
    pub caller: Address,
    /// Address whose debt shrank
    pub on_behalf: Address,
    /// Assets repaid
    pub assets: U256,
    /// Borrow shares burned
    pub shares: U256,
}

// ============================================================================
// Liquidation Events
// ============================================================================

/// Event emitted when a position is liquidated
#[odra::event]
pub struct Liquidate {
    /// Market id
    pub id: MarketId,
    /// Liquidator
    pub caller: Address,
    /// Liquidated borrower
    pub borrower: Address,
    /// Loan assets paid by the liquidator
    pub repaid_assets: U256,
    /// Borrow shares burned
    pub repaid_shares: U256,
    /// Collateral sent to the liquidator
    pub seized_assets: U256,
    /// Debt written off against suppliers
    pub bad_debt_assets: U256,
    /// Borrow shares cleared with the bad debt
    pub bad_debt_shares: U256,
}

/// Event emitted after a flash loan is repaid
#[odra::event]
pub struct FlashLoan {
    /// Borrower
    pub caller: Address,
    /// Token lent
    pub token: Address,
    /// Amount lent
    pub assets: U256,
    /// Fee paid on top
    pub fee: U256,
}

// ============================================================================
// Authorization & Admin Events
// ============================================================================

/// Event emitted when an account changes a delegate's authorization
#[odra::event]
pub struct SetAuthorization {
    /// Account granting or revoking
    pub authorizer: Address,
    /// Delegate
    pub authorized: Address,
    /// New status
    pub is_authorized: bool,
}

/// Event emitted when ownership changes
#[odra::event]
pub struct SetOwner {
    /// New owner
    pub new_owner: Address,
}

/// Event emitted when the fee recipient changes
#[odra::event]
pub struct SetFeeRecipient {
    /// New fee recipient
    pub new_fee_recipient: Address,
}

/// Event emitted when a market's protocol fee changes
#[odra::event]
pub struct SetFee {
    /// Market id
    pub id: MarketId,
    /// New fee (WAD)
    pub new_fee: U256,
}

/// Event emitted when the flash loan fee changes
#[odra::event]
pub struct SetFlashLoanFee {
    /// New fee (WAD)
    pub new_fee: U256,
}

/// Event emitted when a market is frozen or unfrozen
#[odra::event]
pub struct MarketFrozenSet {
    /// Market id
    pub id: MarketId,
    /// New frozen status
    pub frozen: bool,
}

// ============================================================================
// Collaborator Events
// ============================================================================

/// Event emitted when a reference oracle price changes
#[odra::event]
pub struct PriceUpdated {
    /// New price (1e36 scale)
    pub price: U256,
    /// Block time of the update
    pub timestamp: u64,
}

/// Event emitted when a reference rate model changes
#[odra::event]
pub struct RateUpdated {
    /// New rate (base rate for curve models)
    pub rate: U256,
    /// Block time of the update
    pub timestamp: u64,
}
