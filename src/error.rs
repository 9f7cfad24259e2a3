//! Error taxonomy for wallet sessions and ATM operations
//!
//! [`ChainError`] describes faults surfaced by the wallet provider or the
//! contract runtime. [`AtmError`] is what callers of the ATM service see:
//! every provider fault is translated into one of its variants at the
//! orchestrator boundary.

use alloy::primitives::TxHash;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::outcome::{OperationKind, TransferStage};

/// EIP-1193 error code returned when the user declines a wallet prompt.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Faults raised by the wallet provider or the contract runtime.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("user rejected the request")]
    UserRejected,
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("provider cannot produce a signer: {0}")]
    NoSigner(String),
}

impl From<alloy::transports::TransportError> for ChainError {
    fn from(err: alloy::transports::TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) if payload.code == USER_REJECTED_CODE => ChainError::UserRejected,
            _ => ChainError::Rpc(err.to_string()),
        }
    }
}

impl From<alloy::contract::Error> for ChainError {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(e) => e.into(),
            other => ChainError::Rpc(other.to_string()),
        }
    }
}

impl From<alloy::providers::PendingTransactionError> for ChainError {
    fn from(err: alloy::providers::PendingTransactionError) -> Self {
        ChainError::Rpc(err.to_string())
    }
}

/// Failures reported by the ATM service.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AtmError {
    /// No wallet provider is present in the environment.
    #[error("A wallet provider is required; install or enable a wallet extension to use the ATM")]
    ProviderUnavailable,

    /// The user declined the authorization prompt, or it yielded no account.
    #[error("Wallet connection rejected: {reason}")]
    ConnectionRejected { reason: String },

    /// The provider could not be queried for already-authorized accounts.
    #[error("Failed to query authorized accounts: {reason}")]
    AccountQueryFailed { reason: String },

    /// The provider could not produce a signer for the session.
    #[error("Failed to bind ATM contract: {reason}")]
    BindingError { reason: String },

    /// The balance read failed; the cached balance was left unchanged.
    #[error("Failed to read balance: {reason}")]
    ReadError { reason: String },

    #[error("{op} failed: {cause}")]
    OperationFailed { op: OperationKind, cause: String },

    #[error("Transfer failed at {stage} stage (native transfer succeeded: {native_transfer_succeeded}): {cause}")]
    TransferFailed {
        stage: TransferStage,
        native_transfer_succeeded: bool,
        cause: String,
    },
}

impl AtmError {
    /// Short machine-readable name of the variant, used as a Sentry tag.
    pub fn kind(&self) -> &'static str {
        match self {
            AtmError::ProviderUnavailable => "provider_unavailable",
            AtmError::ConnectionRejected { .. } => "connection_rejected",
            AtmError::AccountQueryFailed { .. } => "account_query_failed",
            AtmError::BindingError { .. } => "binding_error",
            AtmError::ReadError { .. } => "read_error",
            AtmError::OperationFailed { .. } => "operation_failed",
            AtmError::TransferFailed { .. } => "transfer_failed",
        }
    }
}

/// Logs a failure and forwards it to Sentry before handing it back to the caller.
pub fn report(err: AtmError) -> AtmError {
    tracing::error!("{}", err);
    sentry::with_scope(
        |scope| scope.set_tag("atm_error", err.kind()),
        || sentry::capture_message(&err.to_string(), sentry::Level::Error),
    );
    err
}
