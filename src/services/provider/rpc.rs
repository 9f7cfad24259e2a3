//! Wallet provider backed by an alloy JSON-RPC client
//!
//! The node behind the RPC URL plays the role of the injected wallet: it
//! answers `eth_requestAccounts` / `eth_accounts` and signs
//! `eth_sendTransaction` requests for the accounts it manages.

use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use async_trait::async_trait;
use std::sync::Arc;

use super::{AtmContract, Confirmation, PendingTx, TransactionSigner, WalletProvider};
use crate::error::ChainError;

sol! {
    #[sol(rpc)]
    interface IAssessment {
        function getBalance() external view returns (uint256);
        function deposit(uint256 amount) external payable;
        function withdraw(uint256 amount) external;
        function borrow(uint256 amount) external;
        function transfer(address recipient, uint256 amount) external;
    }
}

/// Wraps an alloy pending transaction so confirmation can be awaited later.
fn track(pending: PendingTransactionBuilder<Ethereum>) -> PendingTx {
    let tx_hash = *pending.tx_hash();
    tracing::info!("Transaction hash: {:?}", tx_hash);

    PendingTx::new(tx_hash, async move {
        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(ChainError::Reverted(tx_hash));
        }
        Ok(Confirmation {
            tx_hash,
            block_number: receipt.block_number,
        })
    })
}

/// Wallet provider talking JSON-RPC to a node that manages the user's accounts
#[derive(Clone)]
pub struct RpcWalletProvider {
    provider: DynProvider,
    rpc_url: String,
}

impl RpcWalletProvider {
    /// Connect to the wallet node at `rpc_url`. No request is made until first use.
    pub fn connect(rpc_url: &str) -> Result<Self, String> {
        let url = rpc_url
            .parse()
            .map_err(|e| format!("Invalid RPC URL '{rpc_url}': {e}"))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();
        tracing::info!("Wallet provider configured at {}", rpc_url);

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainError> {
        let accounts: Vec<Address> = self
            .provider
            .raw_request("eth_requestAccounts".into(), ())
            .await?;
        Ok(accounts)
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self.provider.get_accounts().await?)
    }

    fn signer(&self, account: Address) -> Result<Arc<dyn TransactionSigner>, ChainError> {
        if account == Address::ZERO {
            return Err(ChainError::NoSigner(
                "cannot sign for the zero address".to_string(),
            ));
        }
        Ok(Arc::new(RpcSigner {
            provider: self.provider.clone(),
            from: account,
        }))
    }
}

/// Signer whose transactions are signed by the wallet node (`eth_sendTransaction`)
struct RpcSigner {
    provider: DynProvider,
    from: Address,
}

#[async_trait]
impl TransactionSigner for RpcSigner {
    fn address(&self) -> Address {
        self.from
    }

    async fn send_transaction(&self, to: Address, value: U256) -> Result<PendingTx, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.from)
            .with_to(to)
            .with_value(value);

        let pending = self.provider.send_transaction(tx).await?;
        Ok(track(pending))
    }

    fn bind_contract(&self, contract: Address) -> Arc<dyn AtmContract> {
        Arc::new(RpcAtmContract {
            instance: IAssessment::new(contract, self.provider.clone()),
            from: self.from,
        })
    }
}

/// ATM contract handle whose calls are sent from the bound account
struct RpcAtmContract {
    instance: IAssessment::IAssessmentInstance<DynProvider>,
    from: Address,
}

#[async_trait]
impl AtmContract for RpcAtmContract {
    fn address(&self) -> Address {
        *self.instance.address()
    }

    async fn get_balance(&self) -> Result<U256, ChainError> {
        Ok(self.instance.getBalance().from(self.from).call().await?)
    }

    async fn deposit(&self, amount: U256) -> Result<PendingTx, ChainError> {
        let pending = self.instance.deposit(amount).from(self.from).send().await?;
        Ok(track(pending))
    }

    async fn withdraw(&self, amount: U256) -> Result<PendingTx, ChainError> {
        let pending = self.instance.withdraw(amount).from(self.from).send().await?;
        Ok(track(pending))
    }

    async fn borrow(&self, amount: U256) -> Result<PendingTx, ChainError> {
        let pending = self.instance.borrow(amount).from(self.from).send().await?;
        Ok(track(pending))
    }

    async fn transfer(&self, recipient: Address, amount: U256) -> Result<PendingTx, ChainError> {
        let pending = self
            .instance
            .transfer(recipient, amount)
            .from(self.from)
            .send()
            .await?;
        Ok(track(pending))
    }
}
