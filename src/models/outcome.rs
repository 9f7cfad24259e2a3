use alloy::primitives::{Address, TxHash};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-initiated operations against the ATM contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Borrow,
    Transfer,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "deposit",
            OperationKind::Withdraw => "withdraw",
            OperationKind::Borrow => "borrow",
            OperationKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The step of the compound transfer that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferStage {
    /// Value transfer from the wallet to the recipient
    Native,
    /// Ledger update on the ATM contract
    Contract,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStage::Native => f.write_str("native"),
            TransferStage::Contract => f.write_str("contract"),
        }
    }
}

/// Result of the balance refresh that follows a confirmed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceRefresh {
    /// The cache now holds this balance
    Updated { balance: u64 },
    /// The session that issued the read is no longer active; the cache was not touched
    Stale,
    /// The read failed; the previous cached balance was retained
    Failed { reason: String },
}

/// Result of a user-initiated ATM operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// No session or binding was active, nothing was submitted
    Skipped { op: OperationKind },
    /// Every transaction of the operation was confirmed
    Confirmed {
        op: OperationKind,
        #[schemars(with = "Vec<String>")]
        tx_hashes: Vec<TxHash>,
        balance: BalanceRefresh,
    },
}

impl OperationOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, OperationOutcome::Skipped { .. })
    }
}

/// Result of a successful `connect` or `restore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConnectOutcome {
    #[schemars(with = "String")]
    pub account: Address,
    pub balance: BalanceRefresh,
}
