//! Wallet session management
//!
//! Detects the injected wallet provider, restores or establishes the single
//! connected account, and tears the session down on logout. A session and
//! its contract binding are always installed and removed together.

use alloy::primitives::Address;
use std::fmt;
use std::sync::Arc;

use super::balance::BalanceCache;
use super::binding::{self, ContractBinding};
use super::provider::WalletProvider;
use super::state::AtmStore;
use crate::error::{AtmError, ChainError, report};
use crate::models::ConnectOutcome;

/// The account currently authorized to sign, together with its provider.
#[derive(Clone)]
pub struct Session {
    pub id: u64,
    pub provider: Arc<dyn WalletProvider>,
    pub account: Address,
}

impl Session {
    pub fn new(id: u64, provider: Arc<dyn WalletProvider>, account: Address) -> Self {
        Self {
            id,
            provider,
            account,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

pub struct SessionManager {
    store: AtmStore,
    balance: BalanceCache,
    /// The provider present in the execution environment, if any
    injected: Option<Arc<dyn WalletProvider>>,
    contract_address: Address,
}

impl SessionManager {
    pub fn new(
        store: AtmStore,
        injected: Option<Arc<dyn WalletProvider>>,
        contract_address: Address,
    ) -> Self {
        Self {
            balance: BalanceCache::new(store.clone()),
            store,
            injected,
            contract_address,
        }
    }

    /// Record the injected provider, if the environment has one
    pub fn detect_provider(&self) -> bool {
        let found = self.injected.clone();
        let detected = found.is_some();

        self.store.update(|state| {
            if found.is_none() {
                state.clear_session();
            }
            state.provider = found;
        });

        if detected {
            tracing::info!("Wallet provider detected");
        } else {
            tracing::warn!("No wallet provider detected");
        }
        detected
    }

    /// Adopt an already-authorized account without prompting the user
    pub async fn restore_session(&self) -> Result<Option<ConnectOutcome>, AtmError> {
        let Some(provider) = self.store.provider() else {
            tracing::debug!("No provider detected, nothing to restore");
            return Ok(None);
        };

        let accounts = provider.get_accounts().await.map_err(|e| {
            report(AtmError::AccountQueryFailed {
                reason: e.to_string(),
            })
        })?;

        let Some(account) = accounts.first().copied() else {
            tracing::info!("No account found");
            return Ok(None);
        };

        let outcome = self.establish(provider, account).await?;
        Ok(Some(outcome))
    }

    /// Prompt the provider for authorization and make the first account the active session
    pub async fn connect(&self) -> Result<ConnectOutcome, AtmError> {
        let Some(provider) = self.store.provider() else {
            return Err(report(AtmError::ProviderUnavailable));
        };

        let accounts = provider.request_accounts().await.map_err(|e| {
            let reason = match e {
                ChainError::UserRejected => "user declined the authorization prompt".to_string(),
                other => other.to_string(),
            };
            report(AtmError::ConnectionRejected { reason })
        })?;

        let Some(account) = accounts.first().copied() else {
            return Err(report(AtmError::ConnectionRejected {
                reason: "provider returned no accounts".to_string(),
            }));
        };

        self.establish(provider, account).await
    }

    /// Clear session, binding and balance. Always succeeds.
    pub fn logout(&self) {
        self.store.update(|state| state.clear_session());
        tracing::info!("Account disconnected");
    }

    /// Bind the contract for `account`, install both atomically, then take a first balance reading
    async fn establish(
        &self,
        provider: Arc<dyn WalletProvider>,
        account: Address,
    ) -> Result<ConnectOutcome, AtmError> {
        let session = Session::new(self.store.next_session_id(), provider, account);
        let binding: ContractBinding =
            binding::bind(&session, self.contract_address).map_err(report)?;

        self.store
            .update(|state| state.install(session, binding.clone()));
        tracing::info!("Account connected: {}", account);

        let balance = self.balance.refresh_after_confirmation(&binding).await;
        Ok(ConnectOutcome { account, balance })
    }
}
