//! Contract side of the wrapper: dynamic ABI calls against a deployed sale
//! contract plus typed helpers for each of its operations.

use alloy::contract::{ContractInstance, Interface};
use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, U256};
use alloy::providers::DynProvider;
use alloy::rpc::types::TransactionReceipt;
use sale_math::{Stablecoin, TierId};
use tracing::{debug, info};

use crate::artifact::ContractArtifact;
use crate::chain::{ensure_success, ChainClient};
use crate::config::{ContractVersion, DeploymentConfig, TEST_VESTING_DELAY_SECS};
use crate::error::{HarnessError, Result};

/// Whether a purchase amount is given in whole tokens or in atoms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseUnit {
    Whole,
    Atoms,
}

/// Contract function name for a purchase, e.g. `contributeGsxAtomsForUsdt`.
pub fn purchase_function(version: ContractVersion, coin: Stablecoin, unit: PurchaseUnit) -> String {
    let verb = version.profile().purchase_verb;
    let unit = match unit {
        PurchaseUnit::Whole => "Gsx",
        PurchaseUnit::Atoms => "GsxAtoms",
    };
    let coin = match coin {
        Stablecoin::Usdc => "Usdc",
        Stablecoin::Usdt => "Usdt",
    };
    format!("{verb}{unit}For{coin}")
}

pub struct SaleContract {
    instance: ContractInstance<DynProvider>,
    pub version: ContractVersion,
    /// Unix seconds.
    pub sale_start: u64,
    /// Unix seconds.
    pub vesting_start: u64,
}

impl SaleContract {
    pub fn new(
        chain: &ChainClient,
        address: Address,
        abi: JsonAbi,
        version: ContractVersion,
        sale_start: u64,
        vesting_start: u64,
    ) -> Self {
        let instance = ContractInstance::new(address, chain.provider().clone(), Interface::new(abi));
        Self {
            instance,
            version,
            sale_start,
            vesting_start,
        }
    }

    /// Deploys with the sale opening at the current chain time and vesting
    /// starting seven weeks later.
    pub async fn deploy_for_test(
        chain: &ChainClient,
        deployer: Address,
        artifact: &ContractArtifact,
        config: &DeploymentConfig,
    ) -> Result<Self> {
        let sale_start = chain.timestamp().await?;
        let config = DeploymentConfig {
            sale_start,
            vesting_start: sale_start + TEST_VESTING_DELAY_SECS,
            ..config.clone()
        };
        let args = config.constructor_args()?;
        let (address, _) = chain.deploy(deployer, artifact, &args).await?;
        Ok(Self::new(
            chain,
            address,
            artifact.abi.clone(),
            config.version,
            config.sale_start,
            config.vesting_start,
        ))
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    pub fn abi(&self) -> &JsonAbi {
        self.instance.abi()
    }

    /// Calls a view function by name with positional arguments.
    pub async fn read(&self, function: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        let output = self
            .instance
            .function(function, args)
            .map_err(|err| HarnessError::from_contract(function, err))?
            .call()
            .await
            .map_err(|err| HarnessError::from_contract(function, err))?;
        debug!(function, ?output, "read");
        Ok(output)
    }

    /// Sends a state-changing call as `actor` and waits for it to be mined.
    pub async fn send(
        &self,
        actor: Address,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<TransactionReceipt> {
        let pending = self
            .instance
            .function(function, args)
            .map_err(|err| HarnessError::from_contract(function, err))?
            .from(actor)
            .send()
            .await
            .map_err(|err| HarnessError::from_contract(function, err))?;
        info!(function, %actor, tx = %pending.tx_hash(), "sent");
        ensure_success(function, pending.get_receipt().await?)
    }

    async fn read_uint(&self, function: &str, args: &[DynSolValue]) -> Result<U256> {
        match self.read(function, args).await?.first() {
            Some(DynSolValue::Uint(value, _)) => Ok(*value),
            _ => Err(unexpected(function)),
        }
    }

    async fn read_bool(&self, function: &str, args: &[DynSolValue]) -> Result<bool> {
        match self.read(function, args).await?.first() {
            Some(DynSolValue::Bool(value)) => Ok(*value),
            _ => Err(unexpected(function)),
        }
    }

    async fn read_address(&self, function: &str, args: &[DynSolValue]) -> Result<Address> {
        match self.read(function, args).await?.first() {
            Some(DynSolValue::Address(value)) => Ok(*value),
            _ => Err(unexpected(function)),
        }
    }

    pub async fn current_tier(&self) -> Result<TierId> {
        let tier = self.read_uint("getCurrentTier", &[]).await?;
        TierId::try_from(tier).map_err(|_| unexpected("getCurrentTier"))
    }

    pub async fn claimable_amount_for_tier(&self, user: Address, tier: TierId) -> Result<U256> {
        self.read_uint("getClaimableAmountForTier", &[DynSolValue::Address(user), tier_arg(tier)])
            .await
    }

    /// Cost the contract charges `user` for `sale_atoms`, with any referral
    /// discount applied. `stable_factor` is the stablecoin's decimals factor.
    pub async fn calculate_cost_in_usd_atoms(
        &self,
        user: Address,
        sale_atoms: U256,
        tier: TierId,
        stable_factor: U256,
    ) -> Result<U256> {
        self.read_uint(
            "calculateCostForGsxInUsdAtoms",
            &[
                DynSolValue::Address(user),
                uint_arg(sale_atoms),
                tier_arg(tier),
                uint_arg(stable_factor),
            ],
        )
        .await
    }

    pub async fn whitelisted_referrer(&self, referrer: Address) -> Result<bool> {
        self.read_bool("whitelistedReferrers", &[DynSolValue::Address(referrer)])
            .await
    }

    pub async fn users_referrer(&self, user: Address) -> Result<Address> {
        self.read_address("usersReferrers", &[DynSolValue::Address(user)])
            .await
    }

    pub async fn vested_amount(&self, user: Address, tier: TierId) -> Result<U256> {
        self.read_uint("vestedAmountsGsxAtoms", &[DynSolValue::Address(user), tier_arg(tier)])
            .await
    }

    pub async fn single_wallet_purchase_limit(&self) -> Result<U256> {
        self.read_uint("singleWalletPurchaseLimitInUsdAtoms", &[]).await
    }

    pub async fn total_usd_atoms_spent_by_referrers_supporters(&self, referrer: Address) -> Result<U256> {
        self.read_uint(
            "totalUsdAtomsSpentByReferrersSupporters",
            &[DynSolValue::Address(referrer)],
        )
        .await
    }

    pub async fn set_referral_admin(&self, owner: Address, admin: Address) -> Result<TransactionReceipt> {
        self.send(owner, "setReferralAdmin", &[DynSolValue::Address(admin)])
            .await
    }

    pub async fn whitelist_referrer(&self, admin: Address, referrer: Address) -> Result<TransactionReceipt> {
        self.send(admin, "whitelistReferrer", &[DynSolValue::Address(referrer)])
            .await
    }

    pub async fn add_referrer(
        &self,
        admin: Address,
        user: Address,
        referrer: Address,
    ) -> Result<TransactionReceipt> {
        self.send(
            admin,
            "addReferrer",
            &[DynSolValue::Address(user), DynSolValue::Address(referrer)],
        )
        .await
    }

    pub async fn whitelist_supporter(&self, admin: Address, supporter: Address) -> Result<TransactionReceipt> {
        self.send(admin, "whitelistSupporter", &[DynSolValue::Address(supporter)])
            .await
    }

    pub async fn remove_supporter_from_whitelist(
        &self,
        admin: Address,
        supporter: Address,
    ) -> Result<TransactionReceipt> {
        self.send(
            admin,
            "removeSupporterFromWhitelist",
            &[DynSolValue::Address(supporter)],
        )
        .await
    }

    pub async fn claim_referral_rewards(&self, referrer: Address) -> Result<TransactionReceipt> {
        self.send(referrer, "claimReferralRewards", &[]).await
    }

    /// Buys `amount` sale tokens (whole or atoms per `unit`) paying in `coin`.
    /// The stablecoin allowance must already be in place.
    pub async fn contribute(
        &self,
        actor: Address,
        coin: Stablecoin,
        amount: U256,
        unit: PurchaseUnit,
    ) -> Result<TransactionReceipt> {
        let function = purchase_function(self.version, coin, unit);
        self.send(actor, &function, &[uint_arg(amount)]).await
    }

    pub async fn claim_tokens(&self, actor: Address) -> Result<TransactionReceipt> {
        self.send(actor, "claimTokens", &[]).await
    }

    pub async fn withdraw_usd_tokens(
        &self,
        actor: Address,
        token: Address,
        amount: U256,
        to: Address,
    ) -> Result<TransactionReceipt> {
        self.send(
            actor,
            "withdrawUsdTokens",
            &[DynSolValue::Address(token), uint_arg(amount), DynSolValue::Address(to)],
        )
        .await
    }
}

fn uint_arg(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

fn tier_arg(tier: TierId) -> DynSolValue {
    DynSolValue::Uint(U256::from(tier), 8)
}

fn unexpected(function: &str) -> HarnessError {
    HarnessError::UnexpectedOutput {
        function: function.to_string(),
    }
}
