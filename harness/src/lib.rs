//! Deployment tooling and a typed chain wrapper for the token sale
//! contract, paired with the `sale-math` calculator for expected values.

pub mod approx;
pub mod artifact;
pub mod chain;
pub mod config;
pub mod error;
pub mod registry;
pub mod sale;
pub mod telemetry;

pub use approx::approx_eq;
pub use artifact::ContractArtifact;
pub use chain::ChainClient;
pub use config::{load_signer, ContractVersion, DeploymentConfig, TokenDistribution, WalletRole};
pub use error::{ConfigError, HarnessError, Result};
pub use registry::DeploymentRegistry;
pub use sale::{PurchaseUnit, SaleContract};
