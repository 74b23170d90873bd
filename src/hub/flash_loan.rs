//! Flash loan callback interface and a reference borrower
//!
//! The hub lends to the calling contract, invokes [`FlashLoanReceiver::on_flash_loan`]
//! on it, then pulls principal plus fee back with `transfer_from`. A receiver
//! repays by approving the hub before returning.

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use super::errors::HubError;
use super::lending_hub::LendingHubContractRef;
use super::market::MarketParams;
use crate::token::Cep18TokenContractRef;

/// Callback invoked on the flash loan caller
#[odra::external_contract]
pub trait FlashLoanReceiver {
    /// Called after `assets` of `token` were sent to the receiver
    fn on_flash_loan(&mut self, token: Address, assets: U256, fee: U256, data: Bytes);
}

/// How [`FlashBorrower`] behaves inside the callback
pub mod mode {
    /// Approve principal and fee
    pub const REPAY: u8 = 0;
    /// Approve the principal only
    pub const SKIP_FEE: u8 = 1;
    /// Call back into the hub for another flash loan
    pub const REENTER: u8 = 2;
    /// Withdraw the borrowed assets from the configured market
    pub const REENTER_WITHDRAW: u8 = 3;
    /// Borrow the same amount again from the configured market
    pub const REENTER_BORROW: u8 = 4;
}

/// Reference flash loan receiver
#[odra::module]
pub struct FlashBorrower {
    /// Hub to borrow from
    hub: Var<Address>,
    /// Callback behaviour, one of [`mode`]
    mode: Var<u8>,
    /// Data received by the last callback
    last_data: Var<Bytes>,
    /// Market used by the reentering modes
    market: Var<MarketParams>,
}

#[odra::module]
impl FlashBorrower {
    /// Initialize the borrower for `hub`
    pub fn init(&mut self, hub: Address) {
        self.hub.set(hub);
        self.mode.set(mode::REPAY);
    }

    /// Select the callback behaviour
    pub fn set_mode(&mut self, mode: u8) {
        self.mode.set(mode);
    }

    /// Select the market the reentering modes act on
    pub fn set_market(&mut self, params: MarketParams) {
        self.market.set(params);
    }

    /// Take a flash loan of `assets` of `token`
    pub fn execute(&mut self, token: Address, assets: U256, data: Bytes) {
        let hub = self.hub.get_or_revert_with(HubError::Unauthorized);
        LendingHubContractRef::new(self.env(), hub).flash_loan(token, assets, data);
    }

    /// Data passed to the last callback
    pub fn last_data(&self) -> Bytes {
        self.last_data.get_or_default()
    }

    /// Flash loan callback
    pub fn on_flash_loan(&mut self, token: Address, assets: U256, fee: U256, data: Bytes) {
        let hub = self.hub.get_or_revert_with(HubError::Unauthorized);
        if self.env().caller() != hub {
            self.env().revert(HubError::Unauthorized);
        }
        self.last_data.set(data.clone());

        let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
        match self.mode.get_or_default() {
            mode::SKIP_FEE => {
                token_ref.approve(hub, assets);
            }
            mode::REENTER => {
                LendingHubContractRef::new(self.env(), hub).flash_loan(token, assets, data);
            }
            mode::REENTER_WITHDRAW => {
                let params = self.market.get_or_revert_with(HubError::MarketNotCreated);
                let this = self.env().self_address();
                LendingHubContractRef::new(self.env(), hub).withdraw(params, assets, U256::zero(), this, this);
            }
            mode::REENTER_BORROW => {
                let params = self.market.get_or_revert_with(HubError::MarketNotCreated);
                let this = self.env().self_address();
                LendingHubContractRef::new(self.env(), hub).borrow(params, assets, U256::zero(), this, this);
            }
            _ => {
                token_ref.approve(hub, assets + fee);
            }
        }
    }
}
