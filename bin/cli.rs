//! CLI tool for deploying and interacting with the Lending Hub contracts.

use lending_hub_contracts::hub::market::MarketParams;
use lending_hub_contracts::hub::{FixedPriceOracle, LendingHub, LinearRateModel};
use lending_hub_contracts::token::AssetToken;
use odra::casper_types::U256;
use odra::prelude::{Address, Addressable};
use odra::host::HostEnv;
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Deploys the Lending Hub with the caller as owner.
pub struct HubDeployScript;

impl DeployScript for HubDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use lending_hub_contracts::hub::lending_hub::LendingHubInitArgs;

        let caller = env.caller();
        let _hub = LendingHub::load_or_deploy(
            &env,
            LendingHubInitArgs { owner: caller },
            container,
            600_000_000_000 // Gas limit for hub deployment
        )?;

        Ok(())
    }
}

/// Deploys the reference loan token, price oracle and rate model.
pub struct CollaboratorsDeployScript;

impl DeployScript for CollaboratorsDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use lending_hub_contracts::hub::interest_rate::LinearRateModelInitArgs;
        use lending_hub_contracts::hub::price_oracle::FixedPriceOracleInitArgs;
        use lending_hub_contracts::token::AssetTokenInitArgs;

        let _loan = AssetToken::load_or_deploy(
            &env,
            AssetTokenInitArgs {
                name: String::from("Hub Loan Token"),
                symbol: String::from("HLT"),
                decimals: 9,
            },
            container,
            300_000_000_000
        )?;

        let _oracle = FixedPriceOracle::load_or_deploy(
            &env,
            FixedPriceOracleInitArgs { max_staleness: 3600 },
            container,
            300_000_000_000
        )?;

        // 2% base, 80% optimal, 4% / 75% slopes
        let _irm = LinearRateModel::load_or_deploy(
            &env,
            LinearRateModelInitArgs {
                base_rate: U256::from(20_000_000_000_000_000u128),
                optimal_utilization: U256::from(800_000_000_000_000_000u128),
                slope1: U256::from(40_000_000_000_000_000u128),
                slope2: U256::from(750_000_000_000_000_000u128),
            },
            container,
            300_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the hub and its reference collaborators.
pub struct FullDeployScript;

impl DeployScript for FullDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        CollaboratorsDeployScript.deploy(env, container)?;
        HubDeployScript.deploy(env, container)?;
        Ok(())
    }
}

fn collateral_args() -> Vec<CommandArg> {
    vec![
        CommandArg::new(
            "collateral_token",
            "Address of the collateral token",
            NamedCLType::Key,
        ),
        CommandArg::new(
            "lltv",
            "Liquidation threshold (WAD, e.g. 800000000000000000 for 80%)",
            NamedCLType::U256,
        ),
    ]
}

/// Market parameters built from the deployed collaborators and the
/// scenario arguments.
fn market_params(
    env: &HostEnv,
    container: &DeployedContractsContainer,
    args: &Args
) -> Result<MarketParams, Error> {
    let loan = container.contract_ref::<AssetToken>(env)?;
    let oracle = container.contract_ref::<FixedPriceOracle>(env)?;
    let irm = container.contract_ref::<LinearRateModel>(env)?;
    Ok(MarketParams {
        loan_token: loan.address().clone(),
        collateral_token: args.get_single::<Address>("collateral_token")?,
        oracle: oracle.address().clone(),
        irm: irm.address().clone(),
        lltv: args.get_single::<U256>("lltv")?,
    })
}

/// Scenario to create a market against the deployed loan token.
pub struct CreateMarketScenario;

impl Scenario for CreateMarketScenario {
    fn args(&self) -> Vec<CommandArg> {
        collateral_args()
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut hub = container.contract_ref::<LendingHub>(env)?;
        let params = market_params(env, container, &args)?;

        env.set_gas(400_000_000_000);
        hub.try_create_market(params)?;

        println!("Market created! Total markets: {}", hub.market_count());
        Ok(())
    }
}

impl ScenarioMetadata for CreateMarketScenario {
    const NAME: &'static str = "create-market";
    const DESCRIPTION: &'static str = "Creates a lending market for a collateral token";
}

/// Scenario to accrue interest on a market.
pub struct AccrueInterestScenario;

impl Scenario for AccrueInterestScenario {
    fn args(&self) -> Vec<CommandArg> {
        collateral_args()
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut hub = container.contract_ref::<LendingHub>(env)?;
        let params = market_params(env, container, &args)?;

        env.set_gas(200_000_000_000);
        hub.try_accrue_interest(params.clone())?;

        let market = hub.expected_market(params);
        println!("Total supply assets: {}", market.total_supply_assets);
        println!("Total borrow assets: {}", market.total_borrow_assets);
        Ok(())
    }
}

impl ScenarioMetadata for AccrueInterestScenario {
    const NAME: &'static str = "accrue-interest";
    const DESCRIPTION: &'static str = "Accrues interest on a market and prints its totals";
}

/// Scenario to push a new oracle price.
pub struct SetPriceScenario;

impl Scenario for SetPriceScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![CommandArg::new(
            "price",
            "Collateral price in loan token, scaled by 1e36",
            NamedCLType::U256,
        )]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut oracle = container.contract_ref::<FixedPriceOracle>(env)?;
        let price = args.get_single::<U256>("price")?;

        env.set_gas(100_000_000_000);
        oracle.try_set_price(price)?;

        println!("Price set to {}", price);
        Ok(())
    }
}

impl ScenarioMetadata for SetPriceScenario {
    const NAME: &'static str = "set-price";
    const DESCRIPTION: &'static str = "Sets the reference oracle price";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the Lending Hub smart contracts")
        // Deploy scripts
        .deploy(CollaboratorsDeployScript)
        .deploy(HubDeployScript)
        .deploy(FullDeployScript)
        // Contract references
        .contract::<LendingHub>()
        .contract::<AssetToken>()
        .contract::<FixedPriceOracle>()
        .contract::<LinearRateModel>()
        // Scenarios
        .scenario(CreateMarketScenario)
        .scenario(AccrueInterestScenario)
        .scenario(SetPriceScenario)
        .build()
        .run();
}
