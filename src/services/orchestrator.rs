//! Transaction orchestration for ATM operations
//!
//! Every user action runs as submit -> confirm -> refresh. A failure at any
//! stage is reported and stops the pipeline: nothing is retried and the
//! balance is not refreshed. Operations dispatched concurrently proceed
//! independently; the cache keeps whichever refresh is written last, and a
//! refresh belonging to a session that has since ended is discarded.

use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::watch;

use super::balance::BalanceCache;
use super::binding::ContractBinding;
use super::provider::{Confirmation, PendingTx, WalletProvider};
use super::session::SessionManager;
use super::state::{AtmState, AtmStore};
use super::units::{NATIVE_TRANSFER_AMOUNT, contract_amount, to_native_units};
use crate::error::{AtmError, ChainError, report};
use crate::models::{
    AtmConfig, AtmView, BalanceRefresh, ConnectOutcome, OperationKind, OperationOutcome,
    TransferStage,
};

/// Contract entry points that take a single amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SingleCall {
    Deposit,
    Withdraw,
    Borrow,
}

impl From<SingleCall> for OperationKind {
    fn from(call: SingleCall) -> Self {
        match call {
            SingleCall::Deposit => OperationKind::Deposit,
            SingleCall::Withdraw => OperationKind::Withdraw,
            SingleCall::Borrow => OperationKind::Borrow,
        }
    }
}

/// Submit a transaction and wait for it to be mined.
async fn submit_and_confirm<F>(submit: F) -> Result<Confirmation, ChainError>
where
    F: std::future::Future<Output = Result<PendingTx, ChainError>>,
{
    let pending = submit.await?;
    tracing::info!(
        "Transaction {} sent, waiting for confirmation...",
        pending.tx_hash()
    );
    let confirmation = pending.wait().await?;
    tracing::info!(
        "Transaction {} confirmed in block {:?}",
        confirmation.tx_hash,
        confirmation.block_number
    );
    Ok(confirmation)
}

/// The ATM client: wallet session, contract binding, balance cache and the
/// operations that tie them together.
pub struct AtmService {
    store: AtmStore,
    sessions: SessionManager,
    balance: BalanceCache,
    transfer_recipient: Address,
}

impl AtmService {
    /// `injected` is the wallet provider present in the environment, if any.
    /// Call [`AtmService::detect_provider`] to pick it up.
    pub fn new(config: &AtmConfig, injected: Option<Arc<dyn WalletProvider>>) -> Self {
        let store = AtmStore::new();
        Self {
            sessions: SessionManager::new(store.clone(), injected, config.contract_address),
            balance: BalanceCache::new(store.clone()),
            store,
            transfer_recipient: config.transfer_recipient,
        }
    }

    pub fn view(&self) -> AtmView {
        self.store.view()
    }

    pub fn snapshot(&self) -> AtmState {
        self.store.snapshot()
    }

    /// Change notifications for the presentation layer
    pub fn subscribe(&self) -> watch::Receiver<AtmState> {
        self.store.subscribe()
    }

    pub fn balance_cache(&self) -> &BalanceCache {
        &self.balance
    }

    pub fn transfer_recipient(&self) -> Address {
        self.transfer_recipient
    }

    pub fn detect_provider(&self) -> bool {
        self.sessions.detect_provider()
    }

    pub async fn restore_session(&self) -> Result<Option<ConnectOutcome>, AtmError> {
        self.sessions.restore_session().await
    }

    pub async fn connect(&self) -> Result<ConnectOutcome, AtmError> {
        self.sessions.connect().await
    }

    pub fn logout(&self) {
        self.sessions.logout();
    }

    /// Re-read the balance on demand. A no-op returning [`BalanceRefresh::Stale`] without a binding.
    pub async fn refresh(&self) -> Result<BalanceRefresh, AtmError> {
        match self.store.binding() {
            Some(binding) => self.balance.refresh(&binding).await.map_err(report),
            None => Ok(BalanceRefresh::Stale),
        }
    }

    pub async fn deposit(&self) -> Result<OperationOutcome, AtmError> {
        self.run_single(SingleCall::Deposit).await
    }

    pub async fn withdraw(&self) -> Result<OperationOutcome, AtmError> {
        self.run_single(SingleCall::Withdraw).await
    }

    pub async fn borrow(&self) -> Result<OperationOutcome, AtmError> {
        self.run_single(SingleCall::Borrow).await
    }

    async fn run_single(&self, call: SingleCall) -> Result<OperationOutcome, AtmError> {
        let op = OperationKind::from(call);
        let Some(binding) = self.store.binding() else {
            tracing::debug!("{} skipped: no contract binding", op);
            return Ok(OperationOutcome::Skipped { op });
        };

        let amount = contract_amount();
        tracing::info!("Submitting {} of {} for {}", op, amount, binding.account());

        let contract = binding.contract();
        let submit = async {
            match call {
                SingleCall::Deposit => contract.deposit(amount).await,
                SingleCall::Withdraw => contract.withdraw(amount).await,
                SingleCall::Borrow => contract.borrow(amount).await,
            }
        };

        let confirmation = submit_and_confirm(submit).await.map_err(|e| {
            report(AtmError::OperationFailed {
                op,
                cause: e.to_string(),
            })
        })?;

        let balance = self.balance.refresh_after_confirmation(&binding).await;
        Ok(OperationOutcome::Confirmed {
            op,
            tx_hashes: vec![confirmation.tx_hash],
            balance,
        })
    }

    /// Send native currency to the recipient, then record the transfer on the contract ledger.
    ///
    /// The ledger update is attempted only after the native transfer confirms, and
    /// only if the session that sent it is still active. If it fails or is skipped,
    /// the native transfer is not reversed and the failure says so.
    pub async fn transfer(&self) -> Result<OperationOutcome, AtmError> {
        let op = OperationKind::Transfer;
        let state = self.store.snapshot();
        if state.provider.is_none() {
            return Err(report(AtmError::ProviderUnavailable));
        }
        let Some(session) = state.session else {
            tracing::debug!("transfer skipped: no active session");
            return Ok(OperationOutcome::Skipped { op });
        };

        let recipient = self.transfer_recipient;
        let native_failure = |cause: String| {
            report(AtmError::TransferFailed {
                stage: TransferStage::Native,
                native_transfer_succeeded: false,
                cause,
            })
        };

        let value = to_native_units(NATIVE_TRANSFER_AMOUNT).map_err(native_failure)?;
        let signer = session
            .provider
            .signer(session.account)
            .map_err(|e| native_failure(e.to_string()))?;

        tracing::info!(
            "Sending {} wei from {} to {}",
            value,
            session.account,
            recipient
        );
        let native = submit_and_confirm(signer.send_transaction(recipient, value))
            .await
            .map_err(|e| native_failure(e.to_string()))?;

        let ledger_failure = |cause: String| {
            report(AtmError::TransferFailed {
                stage: TransferStage::Contract,
                native_transfer_succeeded: true,
                cause,
            })
        };

        let binding: ContractBinding = state.binding.ok_or_else(|| {
            ledger_failure("no contract binding for the session".to_string())
        })?;

        // Step A has settled; the binding may have been invalidated meanwhile
        if !self.store.is_active_session(binding.session_id()) {
            return Err(ledger_failure(
                "session ended before the ledger update".to_string(),
            ));
        }

        tracing::info!("Recording transfer of {} to {} on the contract", value, recipient);
        let ledger = submit_and_confirm(binding.contract().transfer(recipient, value))
            .await
            .map_err(|e| ledger_failure(e.to_string()))?;

        let balance = self.balance.refresh_after_confirmation(&binding).await;
        Ok(OperationOutcome::Confirmed {
            op,
            tx_hashes: vec![native.tx_hash, ledger.tx_hash],
            balance,
        })
    }
}

