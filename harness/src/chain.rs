//! Network side of the wrapper: provider, signers, dev-node clock control
//! and plain token transfers.
//!
//! Nothing here retries. Every transport or revert error is returned to the
//! caller as is.

use alloy::dyn_abi::DynSolValue;
use alloy::eips::BlockNumberOrTag;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

use crate::artifact::ContractArtifact;
use crate::error::{ConfigError, HarnessError, Result};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Provider holding one signer per actor. Each transaction is signed by
/// the key matching its `from` address.
#[derive(Clone)]
pub struct ChainClient {
    provider: DynProvider,
    default_sender: Address,
}

impl ChainClient {
    pub fn connect(rpc_url: &str, signers: impl IntoIterator<Item = PrivateKeySigner>) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|_| ConfigError::InvalidRpcUrl(rpc_url.to_string()))?;

        let mut signers = signers.into_iter();
        let first = signers.next().ok_or(ConfigError::MissingPrivateKey)?;
        let default_sender = first.address();
        let mut wallet = EthereumWallet::new(first);
        for signer in signers {
            wallet.register_signer(signer);
        }

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();
        info!(rpc_url, %default_sender, "connected");
        Ok(Self {
            provider,
            default_sender,
        })
    }

    /// Provider without signers, for reads only.
    pub fn read_only(rpc_url: &str) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|_| ConfigError::InvalidRpcUrl(rpc_url.to_string()))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        info!(rpc_url, "connected read-only");
        Ok(Self {
            provider,
            default_sender: Address::ZERO,
        })
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn default_sender(&self) -> Address {
        self.default_sender
    }

    pub async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    pub async fn code_at(&self, address: Address) -> Result<Bytes> {
        Ok(self.provider.get_code_at(address).await?)
    }

    /// Timestamp of the latest block.
    pub async fn timestamp(&self) -> Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| HarnessError::UnexpectedOutput {
                function: "eth_getBlockByNumber".into(),
            })?;
        Ok(block.header.timestamp)
    }

    /// Dev nodes only. Mines a block so reads observe the new time.
    pub async fn set_next_block_timestamp(&self, timestamp: u64) -> Result<()> {
        self.provider
            .raw_request::<_, Value>("evm_setNextBlockTimestamp".into(), (timestamp,))
            .await?;
        self.mine().await?;
        info!(timestamp, "moved chain clock");
        Ok(())
    }

    /// Dev nodes only.
    pub async fn increase_time(&self, seconds: u64) -> Result<()> {
        self.provider
            .raw_request::<_, Value>("evm_increaseTime".into(), (seconds,))
            .await?;
        self.mine().await?;
        info!(seconds, "advanced chain clock");
        Ok(())
    }

    async fn mine(&self) -> Result<()> {
        self.provider
            .raw_request::<_, Value>("evm_mine".into(), Value::Array(Vec::new()))
            .await?;
        Ok(())
    }

    pub async fn transfer_native(&self, from: Address, to: Address, wei: U256) -> Result<TransactionReceipt> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(wei);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|err| HarnessError::from_transport("transfer", err))?;
        debug!(%from, %to, %wei, tx = %pending.tx_hash(), "native transfer sent");
        let receipt = pending.get_receipt().await?;
        ensure_success("transfer", receipt)
    }

    pub async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(|err| HarnessError::from_contract("balanceOf", err))
    }

    pub async fn transfer_tokens(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransactionReceipt> {
        let pending = IERC20::new(token, self.provider.clone())
            .transfer(to, amount)
            .from(from)
            .send()
            .await
            .map_err(|err| HarnessError::from_contract("transfer", err))?;
        debug!(%token, %from, %to, %amount, tx = %pending.tx_hash(), "token transfer sent");
        ensure_success("transfer", pending.get_receipt().await?)
    }

    pub async fn approve_tokens(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TransactionReceipt> {
        let pending = IERC20::new(token, self.provider.clone())
            .approve(spender, amount)
            .from(owner)
            .send()
            .await
            .map_err(|err| HarnessError::from_contract("approve", err))?;
        debug!(%token, %owner, %spender, %amount, tx = %pending.tx_hash(), "approval sent");
        ensure_success("approve", pending.get_receipt().await?)
    }

    /// Deploys `artifact` with `args` from `deployer` and returns the new
    /// contract address together with the creation receipt.
    pub async fn deploy(
        &self,
        deployer: Address,
        artifact: &ContractArtifact,
        args: &[DynSolValue],
    ) -> Result<(Address, TransactionReceipt)> {
        let code = artifact.creation_code(args)?;
        let tx = TransactionRequest::default()
            .with_from(deployer)
            .with_deploy_code(code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|err| HarnessError::from_transport("constructor", err))?;
        info!(
            contract = %artifact.contract_name,
            %deployer,
            tx = %pending.tx_hash(),
            "deployment sent"
        );

        let receipt = ensure_success("constructor", pending.get_receipt().await?)?;
        let address = receipt
            .contract_address
            .ok_or(HarnessError::MissingContractAddress(receipt.transaction_hash))?;
        info!(contract = %artifact.contract_name, %address, "deployed");
        Ok((address, receipt))
    }
}

/// A mined receipt with failed status is a revert without a reason.
pub(crate) fn ensure_success(function: &str, receipt: TransactionReceipt) -> Result<TransactionReceipt> {
    debug!(
        function,
        tx = %receipt.transaction_hash,
        gas_used = receipt.gas_used,
        status = receipt.status(),
        "receipt"
    );
    if !receipt.status() {
        return Err(HarnessError::Reverted {
            function: function.to_string(),
            reason: format!("transaction {} failed", receipt.transaction_hash),
        });
    }
    Ok(receipt)
}
