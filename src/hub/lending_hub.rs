//! Lending Hub - Shared engine for isolated lending markets
//!
//! One contract holds the state of every market:
//! - Market registry keyed by the hash of the market parameters
//! - Lazy interest accrual on every touch
//! - Supply, borrow, collateral and liquidation bookkeeping per position
//! - Flash loans of any token the hub holds
//!
//! Every mutating entry point holds the reentrancy lock, accrues the target
//! market first, and moves tokens only after the ledger is updated.

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::bytesrepr::{Bytes, ToBytes};
use odra::casper_types::U256;
use super::errors::HubError;
use super::events::*;
use super::flash_loan::FlashLoanReceiverContractRef;
use super::interest::{self, Accrual};
use super::interest_rate::{InterestRateModelContractRef, IRM_INTERFACE_ID};
use super::ledger;
use super::liquidation;
use super::market::{Market, MarketId, MarketParams, Position, MAX_FEE, MAX_FLASH_LOAN_FEE, MAX_LLTV};
use super::price_oracle::{PriceOracleContractRef, ORACLE_INTERFACE_ID};
use super::shares::{to_assets_down, to_assets_up};
use crate::math::{SafeMath, WadMath};
use crate::token::Cep18TokenContractRef;

/// Lending Hub contract
#[odra::module]
pub struct LendingHub {
    /// Protocol owner
    owner: Var<Address>,
    /// Receiver of protocol fee shares and flash loan fees
    fee_recipient: Var<Address>,
    /// Flash loan fee (WAD)
    flash_loan_fee: Var<U256>,
    /// Reentrancy lock
    locked: Var<bool>,
    /// Market state by id
    markets: Mapping<MarketId, Market>,
    /// Market parameters by id
    market_params: Mapping<MarketId, MarketParams>,
    /// Market ids in creation order
    market_ids: Mapping<u32, MarketId>,
    /// Number of markets created
    market_count: Var<u32>,
    /// Positions by market and account
    positions: Mapping<(MarketId, Address), Position>,
    /// (authorizer, delegate) -> may act for authorizer
    authorizations: Mapping<(Address, Address), bool>,
}

#[odra::module]
impl LendingHub {
    /// Initialize the hub. `owner` also starts as fee recipient.
    pub fn init(&mut self, owner: Address) {
        self.owner.set(owner);
        self.fee_recipient.set(owner);
        self.flash_loan_fee.set(U256::zero());
        self.market_count.set(0);
        self.locked.set(false);
    }

    // ========================================
    // Market Registry
    // ========================================

    /// Create a market (permissionless)
    ///
    /// # Arguments
    /// * `params` - Loan token, collateral token, oracle, rate model and
    ///   liquidation threshold
    ///
    /// # Returns
    /// The market id
    pub fn create_market(&mut self, params: MarketParams) -> MarketId {
        self.lock();

        let irm = InterestRateModelContractRef::new(self.env(), params.irm);
        if !irm.supports_interface(IRM_INTERFACE_ID) {
            self.env().revert(HubError::InvalidIrm);
        }
        let oracle = PriceOracleContractRef::new(self.env(), params.oracle);
        if !oracle.supports_interface(ORACLE_INTERFACE_ID) {
            self.env().revert(HubError::InvalidOracle);
        }
        if params.loan_token == params.collateral_token {
            self.env().revert(HubError::IdenticalAssets);
        }
        if params.lltv.is_zero() || params.lltv > MAX_LLTV {
            self.env().revert(HubError::InvalidLiquidationThreshold);
        }

        let id = self.id_of(&params);
        if self.markets.get(&id).is_some() {
            self.env().revert(HubError::MarketAlreadyExists);
        }

        self.markets.set(&id, Market::new(self.now()));
        self.market_params.set(&id, params.clone());

        let count = self.market_count.get_or_default();
        self.market_ids.set(&count, id);
        self.market_count.set(count + 1);

        self.env().emit_event(MarketCreated { id, params });

        self.unlock();
        id
    }

    /// Bring a market's interest up to date
    pub fn accrue_interest(&mut self, params: MarketParams) {
        self.lock();
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        self.accrue(&id, &params, &mut market);
        self.markets.set(&id, market);
        self.unlock();
    }

    // ========================================
    // Supply / Withdraw
    // ========================================

    /// Supply loan tokens for `on_behalf`, paid by the caller
    ///
    /// Exactly one of `assets` and `shares` must be nonzero.
    ///
    /// # Returns
    /// `(assets, shares)` actually supplied
    pub fn supply(&mut self, params: MarketParams, assets: U256, shares: U256, on_behalf: Address) -> (U256, U256) {
        self.lock();
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        if market.frozen {
            self.env().revert(HubError::MarketFrozen);
        }
        self.accrue(&id, &params, &mut market);

        let key = (id, on_behalf);
        let mut position = self.positions.get(&key).unwrap_or_default();
        let (assets, shares) = ledger::supply(&mut market, &mut position, assets, shares)
            .unwrap_or_revert(&self.env());
        self.markets.set(&id, market);
        self.positions.set(&key, position);

        let caller = self.env().caller();
        self.pull(params.loan_token, caller, assets);

        self.env().emit_event(Supply {
            id,
            caller,
            on_behalf,
            assets,
            shares,
        });

        self.unlock();
        (assets, shares)
    }

    /// Withdraw loan tokens supplied by `on_behalf` to `receiver`
    ///
    /// # Returns
    /// `(assets, shares)` actually withdrawn
    pub fn withdraw(
        &mut self,
        params: MarketParams,
        assets: U256,
        shares: U256,
        on_behalf: Address,
        receiver: Address,
    ) -> (U256, U256) {
        self.lock();
        self.ensure_authorized(on_behalf);
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        self.accrue(&id, &params, &mut market);

        let key = (id, on_behalf);
        let mut position = self.positions.get(&key).unwrap_or_default();
        let (assets, shares) = ledger::withdraw(&mut market, &mut position, assets, shares)
            .unwrap_or_revert(&self.env());
        self.markets.set(&id, market);
        self.positions.set(&key, position);

        self.push(params.loan_token, receiver, assets);

        self.env().emit_event(Withdraw {
            id,
            caller: self.env().caller(),
            on_behalf,
            receiver,
            assets,
            shares,
        });

        self.unlock();
        (assets, shares)
    }

    // ========================================
    // Collateral
    // ========================================

    /// Deposit collateral for `on_behalf`, paid by the caller
    pub fn supply_collateral(&mut self, params: MarketParams, assets: U256, on_behalf: Address) {
        self.lock();
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        if market.frozen {
            self.env().revert(HubError::MarketFrozen);
        }
        self.accrue(&id, &params, &mut market);

        let key = (id, on_behalf);
        let mut position = self.positions.get(&key).unwrap_or_default();
        ledger::supply_collateral(&mut market, &mut position, assets).unwrap_or_revert(&self.env());
        self.markets.set(&id, market);
        self.positions.set(&key, position);

        let caller = self.env().caller();
        self.pull(params.collateral_token, caller, assets);

        self.env().emit_event(SupplyCollateral {
            id,
            caller,
            on_behalf,
            assets,
        });

        self.unlock();
    }

    /// Withdraw collateral of `on_behalf` to `receiver`; the position must
    /// stay healthy
    pub fn withdraw_collateral(&mut self, params: MarketParams, assets: U256, on_behalf: Address, receiver: Address) {
        self.lock();
        self.ensure_authorized(on_behalf);
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        self.accrue(&id, &params, &mut market);

        let key = (id, on_behalf);
        let mut position = self.positions.get(&key).unwrap_or_default();
        ledger::withdraw_collateral(&mut market, &mut position, assets).unwrap_or_revert(&self.env());
        self.ensure_healthy(&params, &market, &position);
        self.markets.set(&id, market);
        self.positions.set(&key, position);

        self.push(params.collateral_token, receiver, assets);

        self.env().emit_event(WithdrawCollateral {
            id,
            caller: self.env().caller(),
            on_behalf,
            receiver,
            assets,
        });

        self.unlock();
    }

    // ========================================
    // Borrowing
    // ========================================

    /// Borrow loan tokens against the collateral of `on_behalf`, paid to
    /// `receiver`
    ///
    /// # Returns
    /// `(assets, shares)` actually borrowed
    pub fn borrow(
        &mut self,
        params: MarketParams,
        assets: U256,
        shares: U256,
        on_behalf: Address,
        receiver: Address,
    ) -> (U256, U256) {
        self.lock();
        self.ensure_authorized(on_behalf);
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        if market.frozen {
            self.env().revert(HubError::MarketFrozen);
        }
        self.accrue(&id, &params, &mut market);

        let key = (id, on_behalf);
        let mut position = self.positions.get(&key).unwrap_or_default();
        let (assets, shares) = ledger::borrow(&mut market, &mut position, assets, shares)
            .unwrap_or_revert(&self.env());
        self.ensure_healthy(&params, &market, &position);
        self.markets.set(&id, market);
        self.positions.set(&key, position);

        self.push(params.loan_token, receiver, assets);

        self.env().emit_event(Borrow {
            id,
            caller: self.env().caller(),
            on_behalf,
            receiver,
            assets,
            shares,
        });

        self.unlock();
        (assets, shares)
    }

    /// Repay debt of `on_behalf`, paid by the caller
    ///
    /// # Returns
    /// `(assets, shares)` actually repaid
    pub fn repay(&mut self, params: MarketParams, assets: U256, shares: U256, on_behalf: Address) -> (U256, U256) {
        self.lock();
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        self.accrue(&id, &params, &mut market);

        let key = (id, on_behalf);
        let mut position = self.positions.get(&key).unwrap_or_default();
        let (assets, shares) = ledger::repay(&mut market, &mut position, assets, shares)
            .unwrap_or_revert(&self.env());
        self.markets.set(&id, market);
        self.positions.set(&key, position);

        let caller = self.env().caller();
        self.pull(params.loan_token, caller, assets);

        self.env().emit_event(Repay {
            id,
            caller,
            on_behalf,
            assets,
            shares,
        });

        self.unlock();
        (assets, shares)
    }

    // ========================================
    // Liquidation
    // ========================================

    /// Liquidate an unhealthy position (permissionless)
    ///
    /// Exactly one of `seized_assets` and `repaid_shares` must be nonzero.
    ///
    /// # Returns
    /// `(seized_assets, repaid_assets)`
    pub fn liquidate(
        &mut self,
        params: MarketParams,
        borrower: Address,
        seized_assets: U256,
        repaid_shares: U256,
    ) -> (U256, U256) {
        self.lock();
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        self.accrue(&id, &params, &mut market);

        let key = (id, borrower);
        let mut position = self.positions.get(&key).unwrap_or_default();
        let price = self.price(&params);
        let outcome = liquidation::liquidate(
            &mut market,
            &mut position,
            params.lltv,
            price,
            seized_assets,
            repaid_shares,
        )
        .unwrap_or_revert(&self.env());
        self.markets.set(&id, market);
        self.positions.set(&key, position);

        let caller = self.env().caller();
        self.push(params.collateral_token, caller, outcome.seized_assets);
        self.pull(params.loan_token, caller, outcome.repaid_assets);

        self.env().emit_event(Liquidate {
            id,
            caller,
            borrower,
            repaid_assets: outcome.repaid_assets,
            repaid_shares: outcome.repaid_shares,
            seized_assets: outcome.seized_assets,
            bad_debt_assets: outcome.bad_debt_assets,
            bad_debt_shares: outcome.bad_debt_shares,
        });

        self.unlock();
        (outcome.seized_assets, outcome.repaid_assets)
    }

    // ========================================
    // Flash Loans
    // ========================================

    /// Lend `assets` of `token` to the calling contract for the duration of
    /// its `on_flash_loan` callback
    pub fn flash_loan(&mut self, token: Address, assets: U256, data: Bytes) {
        self.lock();
        if assets.is_zero() {
            self.env().revert(HubError::ZeroAmount);
        }

        let caller = self.env().caller();
        let hub = self.env().self_address();
        let fee = WadMath::mul_wad_up(assets, self.flash_loan_fee.get_or_default()).unwrap_or_revert(&self.env());
        let due = SafeMath::add(assets, fee).unwrap_or_revert(&self.env());

        self.push(token, caller, assets);
        FlashLoanReceiverContractRef::new(self.env(), caller).on_flash_loan(token, assets, fee, data);

        let token_ref = Cep18TokenContractRef::new(self.env(), token);
        if token_ref.allowance(caller, hub) < due {
            self.env().revert(HubError::FlashLoanNotRepaid);
        }
        self.pull(token, caller, due);
        if !fee.is_zero() {
            let recipient = self.fee_recipient();
            self.push(token, recipient, fee);
        }

        self.env().emit_event(FlashLoan {
            caller,
            token,
            assets,
            fee,
        });

        self.unlock();
    }

    // ========================================
    // Authorization
    // ========================================

    /// Allow or forbid `authorized` to withdraw, borrow and remove
    /// collateral on the caller's behalf
    pub fn set_authorization(&mut self, authorized: Address, is_authorized: bool) {
        let caller = self.env().caller();
        self.authorizations.set(&(caller, authorized), is_authorized);
        self.env().emit_event(SetAuthorization {
            authorizer: caller,
            authorized,
            is_authorized,
        });
    }

    /// Whether `sender` may act for `owner`
    pub fn is_authorized(&self, owner: Address, sender: Address) -> bool {
        owner == sender || self.authorizations.get(&(owner, sender)).unwrap_or_default()
    }

    // ========================================
    // Admin Functions
    // ========================================

    /// Transfer ownership (owner only)
    pub fn set_owner(&mut self, new_owner: Address) {
        self.only_owner();
        self.owner.set(new_owner);
        self.env().emit_event(SetOwner { new_owner });
    }

    /// Set the fee recipient (owner only)
    pub fn set_fee_recipient(&mut self, new_fee_recipient: Address) {
        self.only_owner();
        self.fee_recipient.set(new_fee_recipient);
        self.env().emit_event(SetFeeRecipient { new_fee_recipient });
    }

    /// Set a market's protocol fee (owner only). Interest up to now is
    /// accrued at the old fee.
    pub fn set_fee(&mut self, params: MarketParams, new_fee: U256) {
        self.only_owner();
        if new_fee > MAX_FEE {
            self.env().revert(HubError::MaxFeeExceeded);
        }
        self.lock();
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        self.accrue(&id, &params, &mut market);
        market.fee = new_fee;
        self.markets.set(&id, market);
        self.env().emit_event(SetFee { id, new_fee });
        self.unlock();
    }

    /// Freeze or unfreeze a market (owner only)
    pub fn set_market_frozen(&mut self, params: MarketParams, frozen: bool) {
        self.only_owner();
        let id = self.id_of(&params);
        let mut market = self.load_market(&id);
        market.frozen = frozen;
        self.markets.set(&id, market);
        self.env().emit_event(MarketFrozenSet { id, frozen });
    }

    /// Set the flash loan fee (owner only)
    pub fn set_flash_loan_fee(&mut self, new_fee: U256) {
        self.only_owner();
        if new_fee > MAX_FLASH_LOAN_FEE {
            self.env().revert(HubError::MaxFeeExceeded);
        }
        self.flash_loan_fee.set(new_fee);
        self.env().emit_event(SetFlashLoanFee { new_fee });
    }

    // ========================================
    // View Functions
    // ========================================

    /// Get owner address
    pub fn owner(&self) -> Address {
        self.owner.get_or_revert_with(HubError::Unauthorized)
    }

    /// Get fee recipient address
    pub fn fee_recipient(&self) -> Address {
        self.fee_recipient.get_or_revert_with(HubError::Unauthorized)
    }

    /// Get flash loan fee
    pub fn flash_loan_fee(&self) -> U256 {
        self.flash_loan_fee.get_or_default()
    }

    /// Stored market state, without pending interest
    pub fn market(&self, id: MarketId) -> Option<Market> {
        self.markets.get(&id)
    }

    /// Parameters of a market
    pub fn id_to_market_params(&self, id: MarketId) -> Option<MarketParams> {
        self.market_params.get(&id)
    }

    /// Id a market with `params` has or would have
    pub fn market_id(&self, params: MarketParams) -> MarketId {
        self.id_of(&params)
    }

    /// Number of markets created
    pub fn market_count(&self) -> u32 {
        self.market_count.get_or_default()
    }

    /// Id of the `index`-th market created
    pub fn market_id_at(&self, index: u32) -> Option<MarketId> {
        self.market_ids.get(&index)
    }

    /// Stored position of `user`
    pub fn position(&self, id: MarketId, user: Address) -> Position {
        self.positions.get(&(id, user)).unwrap_or_default()
    }

    /// Whether `user` passes the solvency check with interest accrued to now
    pub fn is_healthy(&self, params: MarketParams, user: Address) -> bool {
        let id = self.id_of(&params);
        let (market, _) = self.expected(&id, &params);
        let position = self.position(id, user);
        if position.borrow_shares.is_zero() {
            return true;
        }
        let price = self.price(&params);
        ledger::is_healthy(&market, &position, params.lltv, price).unwrap_or_revert(&self.env())
    }

    /// Market state with interest accrued to now, without writing it
    pub fn expected_market(&self, params: MarketParams) -> Market {
        let id = self.id_of(&params);
        self.expected(&id, &params).0
    }

    /// Loan assets `user` could withdraw if liquidity allowed, interest
    /// included
    pub fn expected_supply_assets(&self, params: MarketParams, user: Address) -> U256 {
        let id = self.id_of(&params);
        let (market, accrual) = self.expected(&id, &params);
        let mut shares = self.position(id, user).supply_shares;
        if user == self.fee_recipient() {
            shares = SafeMath::add(shares, accrual.fee_shares).unwrap_or_revert(&self.env());
        }
        to_assets_down(shares, market.total_supply_assets, market.total_supply_shares).unwrap_or_revert(&self.env())
    }

    /// Loan assets `user` owes, interest included
    pub fn expected_borrow_assets(&self, params: MarketParams, user: Address) -> U256 {
        let id = self.id_of(&params);
        let (market, _) = self.expected(&id, &params);
        let shares = self.position(id, user).borrow_shares;
        to_assets_up(shares, market.total_borrow_assets, market.total_borrow_shares).unwrap_or_revert(&self.env())
    }

    // ========================================
    // Internal Functions
    // ========================================

    /// Reentrancy lock
    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(HubError::Reentrancy);
        }
        self.locked.set(true);
    }

    /// Reentrancy unlock
    fn unlock(&mut self) {
        self.locked.set(false);
    }

    fn only_owner(&self) {
        if self.env().caller() != self.owner() {
            self.env().revert(HubError::Unauthorized);
        }
    }

    fn ensure_authorized(&self, on_behalf: Address) {
        if !self.is_authorized(on_behalf, self.env().caller()) {
            self.env().revert(HubError::Unauthorized);
        }
    }

    /// Block time in seconds
    fn now(&self) -> u64 {
        self.env().get_block_time() / 1000
    }

    fn id_of(&self, params: &MarketParams) -> MarketId {
        let bytes = params
            .to_bytes()
            .ok()
            .unwrap_or_revert_with(&self.env(), HubError::SerializationFailed);
        self.env().hash(bytes)
    }

    fn load_market(&self, id: &MarketId) -> Market {
        self.markets.get(id).unwrap_or_revert_with(&self.env(), HubError::MarketNotCreated)
    }

    fn borrow_rate(&self, params: &MarketParams, market: &Market) -> U256 {
        InterestRateModelContractRef::new(self.env(), params.irm).borrow_rate(params.clone(), market.clone())
    }

    fn price(&self, params: &MarketParams) -> U256 {
        PriceOracleContractRef::new(self.env(), params.oracle).price()
    }

    /// Accrues `market` in memory and credits fee shares to the fee
    /// recipient. The caller stores `market`.
    fn accrue(&mut self, id: &MarketId, params: &MarketParams, market: &mut Market) {
        if self.now() <= market.last_update {
            return;
        }
        let borrow_rate = self.borrow_rate(params, market);
        let accrual = interest::accrue(market, borrow_rate, self.now()).unwrap_or_revert(&self.env());

        if !accrual.fee_shares.is_zero() {
            let key = (*id, self.fee_recipient());
            let mut position = self.positions.get(&key).unwrap_or_default();
            position.supply_shares = SafeMath::add(position.supply_shares, accrual.fee_shares)
                .unwrap_or_revert(&self.env());
            self.positions.set(&key, position);
        }

        self.env().emit_event(AccrueInterest {
            id: *id,
            borrow_rate,
            interest: accrual.interest,
            fee_shares: accrual.fee_shares,
        });
    }

    /// Market and pending accrual as of now, read-only
    fn expected(&self, id: &MarketId, params: &MarketParams) -> (Market, Accrual) {
        let mut market = self.load_market(id);
        if self.now() <= market.last_update {
            return (market, Accrual::default());
        }
        let borrow_rate = self.borrow_rate(params, &market);
        let accrual = interest::accrue(&mut market, borrow_rate, self.now()).unwrap_or_revert(&self.env());
        (market, accrual)
    }

    fn ensure_healthy(&self, params: &MarketParams, market: &Market, position: &Position) {
        if position.borrow_shares.is_zero() {
            return;
        }
        let price = self.price(params);
        if !ledger::is_healthy(market, position, params.lltv, price).unwrap_or_revert(&self.env()) {
            self.env().revert(HubError::InsufficientCollateral);
        }
    }

    /// Pull tokens from `from` into the hub
    fn pull(&self, token: Address, from: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
        if !token_ref.transfer_from(from, self.env().self_address(), amount) {
            self.env().revert(HubError::TransferFailed);
        }
    }

    /// Send tokens from the hub to `to`
    fn push(&self, token: Address, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let mut token_ref = Cep18TokenContractRef::new(self.env(), token);
        if !token_ref.transfer(to, amount) {
            self.env().revert(HubError::TransferFailed);
        }
    }
}
