//! Lending Hub - Isolated lending markets in one contract
//!
//! Markets are created permissionlessly from a loan token, a collateral
//! token, a price oracle, an interest rate model and a liquidation
//! threshold. Each market keeps its own supply, debt and collateral, and
//! interest accrues lazily whenever the market is touched.

pub mod errors;
pub mod events;
pub mod flash_loan;
pub mod interest;
pub mod interest_rate;
pub mod ledger;
pub mod lending_hub;
pub mod liquidation;
pub mod market;
pub mod price_oracle;
pub mod shares;


pub use errors::{HubError, OracleError, RateModelError};
pub use events::*;
pub use flash_loan::FlashBorrower;
pub use interest_rate::{FixedRateModel, LinearRateModel};
pub use lending_hub::LendingHub;
pub use market::{Market, MarketId, MarketParams, Position};
pub use price_oracle::FixedPriceOracle;
