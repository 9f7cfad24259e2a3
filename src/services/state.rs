//! Observable state container for the ATM client
//!
//! All state lives in a `tokio::sync::watch` channel. Writers mutate it in
//! short synchronous closures, never across an await, and every mutation
//! notifies subscribers. Readers take cheap snapshots.

use alloy::primitives::Address;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use super::binding::ContractBinding;
use super::provider::WalletProvider;
use super::session::Session;
use crate::models::AtmView;

/// Everything the client knows about the wallet, the contract and the balance.
#[derive(Clone, Default)]
pub struct AtmState {
    pub provider: Option<Arc<dyn WalletProvider>>,
    pub session: Option<Session>,
    pub binding: Option<ContractBinding>,
    pub balance: Option<u64>,
}

impl AtmState {
    /// Whether `session_id` identifies the session that is currently active
    pub fn is_active_session(&self, session_id: u64) -> bool {
        self.session.as_ref().map(|s| s.id) == Some(session_id)
    }

    pub fn account(&self) -> Option<Address> {
        self.session.as_ref().map(|s| s.account)
    }

    /// Replace the session and its binding; the balance of any previous session is dropped
    pub fn install(&mut self, session: Session, binding: ContractBinding) {
        self.session = Some(session);
        self.binding = Some(binding);
        self.balance = None;
    }

    pub fn clear_session(&mut self) {
        self.session = None;
        self.binding = None;
        self.balance = None;
    }

    pub fn view(&self) -> AtmView {
        AtmView {
            provider_detected: self.provider.is_some(),
            account: self.account(),
            balance: self.balance,
        }
    }
}

/// Shared handle to the ATM state
#[derive(Clone)]
pub struct AtmStore {
    state: Arc<watch::Sender<AtmState>>,
    session_ids: Arc<AtomicU64>,
}

impl Default for AtmStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AtmStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AtmState::default());
        Self {
            state: Arc::new(state),
            session_ids: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Allocate an identifier for a new session; identifiers are never reused
    pub fn next_session_id(&self) -> u64 {
        self.session_ids.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> AtmState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> AtmView {
        self.state.borrow().view()
    }

    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.state.borrow().provider.clone()
    }

    pub fn binding(&self) -> Option<ContractBinding> {
        self.state.borrow().binding.clone()
    }

    pub fn is_active_session(&self, session_id: u64) -> bool {
        self.state.borrow().is_active_session(session_id)
    }

    /// Receive a notification after every state change
    pub fn subscribe(&self) -> watch::Receiver<AtmState> {
        self.state.subscribe()
    }

    pub fn update(&self, modify: impl FnOnce(&mut AtmState)) {
        self.state.send_modify(modify);
    }

    /// Apply `modify`; subscribers are notified only if it returns `true`
    pub fn update_if(&self, modify: impl FnOnce(&mut AtmState) -> bool) -> bool {
        self.state.send_if_modified(modify)
    }
}
