use super::binding::ContractBinding;
use super::state::AtmStore;
use crate::error::{AtmError, report};
use crate::models::BalanceRefresh;

/// The only writer of the cached balance.
#[derive(Clone)]
pub struct BalanceCache {
    store: AtmStore,
}

impl BalanceCache {
    pub fn new(store: AtmStore) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Option<u64> {
        self.store.snapshot().balance
    }

    /// Read the contract balance through `binding` and overwrite the cache.
    ///
    /// The write happens only if the binding's session is still active;
    /// otherwise the read is discarded and [`BalanceRefresh::Stale`] returned.
    /// On failure the previous cached value is kept.
    pub async fn refresh(&self, binding: &ContractBinding) -> Result<BalanceRefresh, AtmError> {
        let session_id = binding.session_id();
        if !self.store.is_active_session(session_id) {
            tracing::debug!("Skipping balance read for inactive session {}", session_id);
            return Ok(BalanceRefresh::Stale);
        }

        let raw = binding
            .contract()
            .get_balance()
            .await
            .map_err(|e| AtmError::ReadError {
                reason: e.to_string(),
            })?;

        let balance = u64::try_from(raw).map_err(|_| AtmError::ReadError {
            reason: format!("balance {raw} exceeds the displayable range"),
        })?;

        let written = self.store.update_if(|state| {
            if state.is_active_session(session_id) {
                state.balance = Some(balance);
                true
            } else {
                false
            }
        });

        if written {
            tracing::info!("Balance refreshed: {}", balance);
            Ok(BalanceRefresh::Updated { balance })
        } else {
            tracing::warn!(
                "Discarding balance {} read for session {} which is no longer active",
                balance,
                session_id
            );
            Ok(BalanceRefresh::Stale)
        }
    }

    /// Post-confirmation hook: refresh, reporting a failed read in the returned value
    pub async fn refresh_after_confirmation(&self, binding: &ContractBinding) -> BalanceRefresh {
        match self.refresh(binding).await {
            Ok(refresh) => refresh,
            Err(e) => {
                let e = report(e);
                BalanceRefresh::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
