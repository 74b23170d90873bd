//! CEP-18 token used as loan and collateral asset
//!
//! The hub only talks to tokens through the [`Cep18Token`] interface; the
//! [`AssetToken`] module is the reference implementation deployed in tests
//! and by the CLI.
use odra::prelude::*;
use odra::casper_types::U256;
use crate::events::{Transfer, Approval};
use crate::errors::TokenError;

/// Asset token implementing CEP-18 with a single minter
#[odra::module]
pub struct AssetToken {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Token decimals
    decimals: Var<u8>,
    /// Total supply of tokens
    total_supply: Var<U256>,
    /// Balance mapping: owner -> balance
    balances: Mapping<Address, U256>,
    /// Allowance mapping: owner -> spender -> amount
    allowances: Mapping<(Address, Address), U256>,
    /// Account allowed to mint
    minter: Var<Address>,
}

#[odra::module]
impl AssetToken {
    /// Initialize the token; the deployer becomes the minter
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
        self.minter.set(self.env().caller());
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    /// Move `amount` from the caller to `to`
    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.move_balance(sender, to, amount);
        true
    }

    /// Let `spender` pull up to `amount` from the caller; replaces any previous allowance
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.set_allowance(owner, spender, amount);
        true
    }

    /// Move `amount` from `from` to `to`, spending the caller's allowance
    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        let remaining = self
            .allowance(from, spender)
            .checked_sub(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::InsufficientAllowance);
        self.set_allowance(from, spender, remaining);
        self.move_balance(from, to, amount);
        true
    }

    /// Create `amount` new tokens for `to` (minter only)
    pub fn mint(&mut self, to: Address, amount: U256) {
        let minter = self.minter.get_or_revert_with(TokenError::NotMinter);
        if self.env().caller() != minter {
            self.env().revert(TokenError::NotMinter);
        }

        let supply = self
            .total_supply()
            .checked_add(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::SupplyOverflow);
        self.total_supply.set(supply);
        // bounded by the total supply
        let to_balance = self.balance_of(to) + amount;
        self.balances.set(&to, to_balance);

        self.env().emit_event(Transfer {
            from: self.env().self_address(),
            to,
            value: amount,
        });
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::InsufficientBalance);
        self.balances.set(&from, from_balance);
        let to_balance = self.balance_of(to) + amount;
        self.balances.set(&to, to_balance);

        self.env().emit_event(Transfer { from, to, value: amount });
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.env().emit_event(Approval { owner, spender, value: amount });
    }
}

/// The slice of CEP-18 the hub and the flash borrower call
#[odra::external_contract]
pub trait Cep18Token {
    fn transfer(&mut self, to: Address, amount: U256) -> bool;

    fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool;

    fn approve(&mut self, spender: Address, amount: U256) -> bool;

    fn allowance(&self, owner: Address, spender: Address) -> U256;
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv};

    fn setup() -> (HostEnv, AssetTokenHostRef) {
        let env = odra_test::env();
        let init_args = AssetTokenInitArgs {
            name: String::from("Loan Token"),
            symbol: String::from("LOAN"),
            decimals: 9,
        };
        let token = AssetToken::deploy(&env, init_args);
        (env, token)
    }

    #[test]
    fn test_init() {
        let (_, token) = setup();
        assert_eq!(token.name(), "Loan Token");
        assert_eq!(token.symbol(), "LOAN");
        assert_eq!(token.decimals(), 9);
        assert_eq!(token.total_supply(), U256::zero());
    }

    #[test]
    fn test_only_minter_mints() {
        let (env, mut token) = setup();
        let user = env.get_account(1);

        token.mint(user, U256::from(1000));
        assert_eq!(token.balance_of(user), U256::from(1000));
        assert_eq!(token.total_supply(), U256::from(1000));

        env.set_caller(user);
        assert_eq!(
            token.try_mint(user, U256::from(1)).err(),
            Some(TokenError::NotMinter.into())
        );
    }

    #[test]
    fn test_transfer_from_needs_allowance() {
        let (env, mut token) = setup();
        let owner = env.get_account(1);
        let spender = env.get_account(2);
        token.mint(owner, U256::from(1000));

        env.set_caller(spender);
        assert_eq!(
            token.try_transfer_from(owner, spender, U256::from(10)).err(),
            Some(TokenError::InsufficientAllowance.into())
        );

        env.set_caller(owner);
        token.approve(spender, U256::from(600));
        env.set_caller(spender);
        token.transfer_from(owner, spender, U256::from(500));

        assert_eq!(token.balance_of(owner), U256::from(500));
        assert_eq!(token.balance_of(spender), U256::from(500));
        assert_eq!(token.allowance(owner, spender), U256::from(100));
    }

    #[test]
    fn test_transfer_needs_balance() {
        let (env, mut token) = setup();
        let alice = env.get_account(1);
        let bob = env.get_account(2);
        token.mint(alice, U256::from(100));

        env.set_caller(alice);
        assert_eq!(
            token.try_transfer(bob, U256::from(101)).err(),
            Some(TokenError::InsufficientBalance.into())
        );
        token.transfer(bob, U256::from(40));
        assert_eq!(token.balance_of(alice), U256::from(60));
        assert_eq!(token.balance_of(bob), U256::from(40));
        assert_eq!(token.total_supply(), U256::from(100));
    }
}
