use std::path::{Path, PathBuf};

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Compiled contract as emitted by the build toolchain.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    #[serde(default)]
    pub deployed_bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Resolves `<dir>/contracts/<Name>.sol/<Name>.json`, falling back to a
    /// flat `<dir>/<Name>.json`.
    pub fn locate(dir: &Path, contract_name: &str) -> PathBuf {
        let nested = dir
            .join("contracts")
            .join(format!("{contract_name}.sol"))
            .join(format!("{contract_name}.json"));
        if nested.exists() {
            nested
        } else {
            dir.join(format!("{contract_name}.json"))
        }
    }

    pub fn encoded_constructor_args(&self, args: &[DynSolValue]) -> Result<Vec<u8>> {
        match self.abi.constructor() {
            Some(constructor) => Ok(constructor.abi_encode_input(args)?),
            None if args.is_empty() => Ok(Vec::new()),
            None => Err(ConfigError::ConstructorMismatch(args.len()).into()),
        }
    }

    /// Creation bytecode followed by the encoded constructor arguments.
    pub fn creation_code(&self, args: &[DynSolValue]) -> Result<Bytes> {
        let mut code = self.bytecode.to_vec();
        code.extend(self.encoded_constructor_args(args)?);
        Ok(code.into())
    }
}
