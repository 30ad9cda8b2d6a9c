use std::path::PathBuf;

use alloy::transports::{RpcError, TransportError};
use thiserror::Error;

use crate::config::WalletRole;

/// Problems with local inputs: credentials, the deployment file, the
/// registry. None of these touch the network.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("private key is not set")]
    MissingPrivateKey,
    #[error("private key must be 66 characters including the 0x prefix, got {0}")]
    PrivateKeyLength(usize),
    #[error("private key must be 0x followed by 64 hex digits")]
    PrivateKeyNotHex,
    #[error("private key is not a valid secp256k1 scalar")]
    InvalidPrivateKey,
    #[error("no wallet configured for role {0}")]
    MissingWallet(WalletRole),
    #[error("vesting start {vesting_start} must come after sale start {sale_start}")]
    InvalidSchedule { sale_start: u64, vesting_start: u64 },
    #[error("distribution sums to {actual} atoms but the initial supply is {expected}")]
    InvalidDistribution { expected: String, actual: String },
    #[error("distribution overflows 256 bits")]
    DistributionOverflow,
    #[error("registry file {} does not exist", .0.display())]
    MissingRegistry(PathBuf),
    #[error("registry file {} has no deployed address", .0.display())]
    EmptyRegistry(PathBuf),
    #[error("invalid RPC url {0:?}")]
    InvalidRpcUrl(String),
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("artifact has no constructor for {0} arguments")]
    ConstructorMismatch(usize),
    #[error("invalid deployment file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Arithmetic failure from the sale calculator, carried by value.
    #[error("calculator: {0}")]
    Calculator(anchor_lang::error::Error),
    #[error("{function} reverted: {reason}")]
    Reverted { function: String, reason: String },
    #[error("contract call failed: {0}")]
    Contract(alloy::contract::Error),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("pending transaction: {0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),
    #[error("abi: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("deployment receipt {0} carries no contract address")]
    MissingContractAddress(alloy::primitives::TxHash),
    #[error("{function} returned unexpected output")]
    UnexpectedOutput { function: String },
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;

impl From<anchor_lang::error::Error> for HarnessError {
    fn from(err: anchor_lang::error::Error) -> Self {
        HarnessError::Calculator(err)
    }
}

impl HarnessError {
    /// Maps a contract-layer error for `function`, turning node-reported
    /// reverts into [`HarnessError::Reverted`] with the decoded reason.
    pub fn from_contract(function: &str, err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(err) => Self::from_transport(function, err),
            other => HarnessError::Contract(other),
        }
    }

    pub fn from_transport(function: &str, err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => {
                let reason = payload
                    .as_revert_data()
                    .and_then(|data| alloy::sol_types::decode_revert_reason(&data))
                    .unwrap_or_else(|| payload.message.to_string());
                HarnessError::Reverted {
                    function: function.to_string(),
                    reason,
                }
            }
            other => HarnessError::Transport(other),
        }
    }

    /// True when this is a revert whose reason contains `needle`.
    pub fn is_revert_with(&self, needle: &str) -> bool {
        matches!(self, HarnessError::Reverted { reason, .. } if reason.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::sol_types::{Revert, SolError};
    use sale_math::SaleMathError;

    #[test]
    fn revert_matching_is_substring_based() {
        let err = HarnessError::Reverted {
            function: "withdrawUsdTokens".into(),
            reason: "Cannot withdraw to the zero address".into(),
        };
        assert!(err.is_revert_with("zero address"));
        assert!(!err.is_revert_with("Minimum purchase"));
        assert_eq!(
            err.to_string(),
            "withdrawUsdTokens reverted: Cannot withdraw to the zero address"
        );
    }

    fn error_response(message: &'static str, data: Option<&str>) -> TransportError {
        RpcError::ErrorResp(ErrorPayload {
            code: 3,
            message: message.into(),
            data: data.map(|hex| serde_json::value::to_raw_value(hex).unwrap()),
        })
    }

    #[test]
    fn revert_reason_is_decoded_from_error_data() {
        let encoded = Revert::from("Minimum purchase amount is not reached").abi_encode();
        let data = format!("0x{}", alloy::hex::encode(encoded));
        let err = HarnessError::from_transport(
            "contributeGsxForUsdc",
            error_response("execution reverted", Some(&data)),
        );
        match err {
            HarnessError::Reverted { function, reason } => {
                assert_eq!(function, "contributeGsxForUsdc");
                assert_eq!(reason, "Minimum purchase amount is not reached");
            }
            other => panic!("expected a revert, got {other}"),
        }
    }

    #[test]
    fn revert_without_data_keeps_node_message() {
        let err = HarnessError::from_transport(
            "withdrawUsdTokens",
            error_response("execution reverted: Cannot withdraw to the zero address", None),
        );
        assert!(err.is_revert_with("Cannot withdraw to the zero address"));
    }

    #[test]
    fn contract_errors_unwrap_to_the_same_revert() {
        let err = HarnessError::from_contract(
            "claimTokens",
            alloy::contract::Error::TransportError(error_response(
                "execution reverted: nothing",
                None,
            )),
        );
        assert!(err.is_revert_with("nothing"));
    }

    #[test]
    fn other_transport_failures_stay_transport() {
        let err = HarnessError::from_transport("getCurrentTier", RpcError::NullResp);
        assert!(matches!(err, HarnessError::Transport(_)));
        assert!(!err.is_revert_with(""));
    }

    #[test]
    fn non_reverts_never_match() {
        let err = HarnessError::from(anchor_lang::error::Error::from(SaleMathError::UnknownTier));
        assert!(matches!(err, HarnessError::Calculator(_)));
        assert!(!err.is_revert_with(""));
    }
}
