use std::fmt;
use std::path::Path;
use std::str::FromStr;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{address, Address, U256};
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const PRIVATE_KEY_LEN: usize = 66;
const TOKEN_ATOMS: u128 = 1_000_000_000_000_000_000;

/// Delay between sale start and vesting start used for test deployments.
pub const TEST_VESTING_DELAY_SECS: u64 = 7 * 7 * 24 * 60 * 60;
/// Each contract tier lasts two weeks.
pub const TIER_DURATION_SECS: u64 = 2 * 7 * 24 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContractVersion {
    V1,
    V2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WalletRole {
    ValidatorsRewards,
    CommunityReserve,
    SeedRound,
    CexDex,
    OperationalReserves,
    Team,
}

impl fmt::Display for WalletRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalletRole::ValidatorsRewards => "validators_rewards",
            WalletRole::CommunityReserve => "community_reserve",
            WalletRole::SeedRound => "seed_round",
            WalletRole::CexDex => "cex_dex",
            WalletRole::OperationalReserves => "operational_reserves",
            WalletRole::Team => "team",
        };
        f.write_str(name)
    }
}

/// Everything that differs between contract versions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionProfile {
    pub contract_name: &'static str,
    /// `buy` on V1, `contribute` on V2.
    pub purchase_verb: &'static str,
    pub wallet_roles: &'static [WalletRole],
}

const V1_ROLES: &[WalletRole] = &[
    WalletRole::ValidatorsRewards,
    WalletRole::CommunityReserve,
    WalletRole::SeedRound,
    WalletRole::CexDex,
    WalletRole::Team,
];

const V2_ROLES: &[WalletRole] = &[
    WalletRole::ValidatorsRewards,
    WalletRole::CommunityReserve,
    WalletRole::SeedRound,
    WalletRole::CexDex,
    WalletRole::OperationalReserves,
    WalletRole::Team,
];

impl ContractVersion {
    pub fn profile(self) -> VersionProfile {
        match self {
            ContractVersion::V1 => VersionProfile {
                contract_name: "GSXToken",
                purchase_verb: "buy",
                wallet_roles: V1_ROLES,
            },
            ContractVersion::V2 => VersionProfile {
                contract_name: "GSXTokenV2",
                purchase_verb: "contribute",
                wallet_roles: V2_ROLES,
            },
        }
    }
}

/// One optional value per wallet role, laid out as TOML keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMap<T> {
    pub validators_rewards: Option<T>,
    pub community_reserve: Option<T>,
    pub seed_round: Option<T>,
    pub cex_dex: Option<T>,
    pub operational_reserves: Option<T>,
    pub team: Option<T>,
}

impl<T: Copy> RoleMap<T> {
    pub fn get(&self, role: WalletRole) -> Option<T> {
        match role {
            WalletRole::ValidatorsRewards => self.validators_rewards,
            WalletRole::CommunityReserve => self.community_reserve,
            WalletRole::SeedRound => self.seed_round,
            WalletRole::CexDex => self.cex_dex,
            WalletRole::OperationalReserves => self.operational_reserves,
            WalletRole::Team => self.team,
        }
    }

    pub fn set(&mut self, role: WalletRole, value: T) {
        let slot = match role {
            WalletRole::ValidatorsRewards => &mut self.validators_rewards,
            WalletRole::CommunityReserve => &mut self.community_reserve,
            WalletRole::SeedRound => &mut self.seed_round,
            WalletRole::CexDex => &mut self.cex_dex,
            WalletRole::OperationalReserves => &mut self.operational_reserves,
            WalletRole::Team => &mut self.team,
        };
        *slot = Some(value);
    }
}

/// Initial token distribution in atoms. The contract mints it at
/// construction; the harness only checks it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDistribution {
    pub initial_supply: U256,
    pub allocations: RoleMap<U256>,
    pub fair_launch: U256,
}

impl TokenDistribution {
    pub fn v2_default() -> Self {
        let tokens = |n: u128| U256::from(n) * U256::from(TOKEN_ATOMS);
        let mut allocations = RoleMap::default();
        allocations.set(WalletRole::ValidatorsRewards, tokens(30_000_000));
        allocations.set(WalletRole::CommunityReserve, tokens(14_000_000));
        allocations.set(WalletRole::SeedRound, tokens(10_000_000));
        allocations.set(WalletRole::CexDex, tokens(8_000_000));
        allocations.set(WalletRole::Team, tokens(4_000_000));
        allocations.set(WalletRole::OperationalReserves, tokens(4_000_000));
        Self {
            initial_supply: tokens(80_000_000),
            allocations,
            fair_launch: tokens(10_000_000),
        }
    }

    /// Allocation for `role`, zero when unset.
    pub fn allocation(&self, role: WalletRole) -> U256 {
        self.allocations.get(role).unwrap_or_default()
    }

    pub fn validate(&self, version: ContractVersion) -> Result<(), ConfigError> {
        let actual = version
            .profile()
            .wallet_roles
            .iter()
            .try_fold(self.fair_launch, |sum, role| {
                sum.checked_add(self.allocation(*role))
            })
            .ok_or(ConfigError::DistributionOverflow)?;
        if actual != self.initial_supply {
            return Err(ConfigError::InvalidDistribution {
                expected: self.initial_supply.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }
}

/// Constructor inputs for one deployment, read from a TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub version: ContractVersion,
    pub usdc: Address,
    pub usdt: Address,
    pub wallets: RoleMap<Address>,
    /// Unix seconds.
    pub sale_start: u64,
    /// Unix seconds.
    pub vesting_start: u64,
    #[serde(default)]
    pub distribution: Option<TokenDistribution>,
}

impl DeploymentConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&raw)?)
    }

    /// Local dev-node configuration: wallets are the node's prefunded
    /// accounts #3 to #8.
    pub fn dev_defaults(version: ContractVersion, usdc: Address, usdt: Address, sale_start: u64) -> Self {
        let mut wallets = RoleMap::default();
        for (role, wallet) in version.profile().wallet_roles.iter().zip(DEV_WALLETS) {
            wallets.set(*role, wallet);
        }
        Self {
            version,
            usdc,
            usdt,
            wallets,
            sale_start,
            vesting_start: sale_start + TEST_VESTING_DELAY_SECS,
            distribution: match version {
                ContractVersion::V1 => None,
                ContractVersion::V2 => Some(TokenDistribution::v2_default()),
            },
        }
    }

    pub fn profile(&self) -> VersionProfile {
        self.version.profile()
    }

    /// Positional constructor arguments: USDC, USDT, one address per wallet
    /// role in version order, sale start, vesting start.
    pub fn constructor_args(&self) -> Result<Vec<DynSolValue>, ConfigError> {
        if self.vesting_start <= self.sale_start {
            return Err(ConfigError::InvalidSchedule {
                sale_start: self.sale_start,
                vesting_start: self.vesting_start,
            });
        }
        if let Some(distribution) = &self.distribution {
            distribution.validate(self.version)?;
        }

        let mut args = vec![DynSolValue::Address(self.usdc), DynSolValue::Address(self.usdt)];
        for role in self.profile().wallet_roles {
            let wallet = self
                .wallets
                .get(*role)
                .ok_or(ConfigError::MissingWallet(*role))?;
            args.push(DynSolValue::Address(wallet));
        }
        args.push(DynSolValue::Uint(U256::from(self.sale_start), 256));
        args.push(DynSolValue::Uint(U256::from(self.vesting_start), 256));
        Ok(args)
    }
}

/// A prefunded account on the local dev node.
#[derive(Clone, Copy, Debug)]
pub struct DevAccount {
    pub address: Address,
    pub private_key: &'static str,
}

impl DevAccount {
    pub fn signer(&self) -> Result<PrivateKeySigner, ConfigError> {
        load_signer(Some(self.private_key))
    }
}

pub const DEV_OWNER: DevAccount = DevAccount {
    address: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
    private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
};

pub const DEV_ADMIN: DevAccount = DevAccount {
    address: address!("70997970c51812dc3a010c7d01b50e0d17dc79c8"),
    private_key: "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
};

pub const DEV_REFERRER: DevAccount = DevAccount {
    address: address!("3c44cdddb6a900fa2b585dd299e03d12fa4293bc"),
    private_key: "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
};

const DEV_WALLETS: [Address; 6] = [
    address!("90f79bf6eb2c4f870365e785982e1f101e93b906"),
    address!("15d34aaf54267db7d7c367839aaf71a00a2c6a65"),
    address!("9965507d1a55bcc2695c58ba16fb37d819b0a4dc"),
    address!("976ea74026e726554db657fa54763abd0c3a0aa9"),
    address!("14dc79964da2c08b23698b3d3cc7ca32193d9955"),
    address!("23618e81e3f5cdf7f54c3d65f7fbc0abf5b21e8f"),
];

/// Normalizes and validates a raw private key, then builds a signer.
///
/// The value is trimmed and given a `0x` prefix when missing. It must then
/// be exactly `0x` plus 64 hex digits.
pub fn load_signer(raw: Option<&str>) -> Result<PrivateKeySigner, ConfigError> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingPrivateKey);
    }

    let key = if trimmed.starts_with("0x") {
        trimmed.to_string()
    } else {
        format!("0x{trimmed}")
    };
    if key.len() != PRIVATE_KEY_LEN {
        return Err(ConfigError::PrivateKeyLength(key.len()));
    }
    if !key[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::PrivateKeyNotHex);
    }

    PrivateKeySigner::from_str(&key).map_err(|_| ConfigError::InvalidPrivateKey)
}
