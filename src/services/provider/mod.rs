//! Seams to the wallet provider and the ATM contract runtime
//!
//! - [`WalletProvider`]: account authorization and signer derivation
//! - [`TransactionSigner`]: native value transfers and contract binding for one account
//! - [`AtmContract`]: the remote-callable ATM entry points
//! - [`PendingTx`]: a submitted transaction that can be awaited to confirmation
//!
//! [`rpc`] implements these over an alloy JSON-RPC client; [`mock`] provides
//! an in-memory chain for tests.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ChainError;

pub mod mock;
pub mod rpc;

pub use mock::{FailAt, MockCall, MockChain};
pub use rpc::RpcWalletProvider;

/// A transaction accepted as final by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

pub type ConfirmationFuture =
    Pin<Box<dyn Future<Output = Result<Confirmation, ChainError>> + Send + 'static>>;

/// Handle to a submitted transaction awaiting confirmation.
pub struct PendingTx {
    tx_hash: TxHash,
    confirmation: ConfirmationFuture,
}

impl PendingTx {
    pub fn new<F>(tx_hash: TxHash, confirmation: F) -> Self
    where
        F: Future<Output = Result<Confirmation, ChainError>> + Send + 'static,
    {
        Self {
            tx_hash,
            confirmation: Box::pin(confirmation),
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Suspends until the transaction is mined, or fails if it reverts or is dropped.
    pub async fn wait(self) -> Result<Confirmation, ChainError> {
        self.confirmation.await
    }
}

impl fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTx")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

/// An injected wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompts the user to authorize accounts. Fails with
    /// [`ChainError::UserRejected`] when the prompt is declined.
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainError>;

    /// Accounts already authorized for this client, without prompting.
    async fn get_accounts(&self) -> Result<Vec<Address>, ChainError>;

    /// Derives a transaction-signing context for `account`. No network call.
    fn signer(&self, account: Address) -> Result<Arc<dyn TransactionSigner>, ChainError>;
}

/// Signs and submits transactions on behalf of one account.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Sends `value` (in the native smallest unit) to `to`.
    async fn send_transaction(&self, to: Address, value: U256) -> Result<PendingTx, ChainError>;

    /// Builds a handle to the ATM contract at `contract` whose calls are signed by this signer.
    fn bind_contract(&self, contract: Address) -> Arc<dyn AtmContract>;
}

/// The ATM contract's remote-callable interface.
#[async_trait]
pub trait AtmContract: Send + Sync {
    fn address(&self) -> Address;

    async fn get_balance(&self) -> Result<U256, ChainError>;

    async fn deposit(&self, amount: U256) -> Result<PendingTx, ChainError>;

    async fn withdraw(&self, amount: U256) -> Result<PendingTx, ChainError>;

    async fn borrow(&self, amount: U256) -> Result<PendingTx, ChainError>;

    async fn transfer(&self, recipient: Address, amount: U256) -> Result<PendingTx, ChainError>;
}
