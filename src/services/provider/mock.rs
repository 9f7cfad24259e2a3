//! In-memory chain for testing the ATM services
//!
//! [`MockChain`] acts as wallet provider, signer and ATM contract at once.
//! Contract and native balances change only when a transaction confirms,
//! so reads between submission and confirmation observe the old state.
//! Failures can be programmed per call and stage, and confirmations can be
//! held open to control the order in which concurrent operations settle.

use alloy::primitives::{Address, B256, TxHash, U256};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

use super::{AtmContract, Confirmation, PendingTx, TransactionSigner, WalletProvider};
use crate::error::ChainError;

/// Calls the mock chain records and can be programmed to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    RequestAccounts,
    GetAccounts,
    Signer,
    GetBalance,
    Deposit,
    Withdraw,
    Borrow,
    NativeTransfer,
    ContractTransfer,
}

/// Where a programmed failure is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    /// The call itself fails (prompt declined, submission rejected, read failed)
    Submit,
    /// The transaction is accepted but reverts when mined
    Confirm,
}

#[derive(Debug, Clone, Copy)]
enum Effect {
    Credit(U256),
    Debit(U256),
    Send { from: Address, to: Address, value: U256 },
    Ledger { recipient: Address, amount: U256 },
}

#[derive(Default)]
struct MockLedger {
    wallet_accounts: Vec<Address>,
    authorized: bool,
    contract_balance: U256,
    native_balances: HashMap<Address, U256>,
    ledger_credits: HashMap<Address, U256>,
    failures: HashMap<MockCall, FailAt>,
    calls: HashMap<MockCall, usize>,
    gates: HashMap<MockCall, VecDeque<oneshot::Receiver<()>>>,
    tx_counter: u64,
    block_number: u64,
}

/// Shared in-memory chain; clones observe the same state.
#[derive(Clone, Default)]
pub struct MockChain {
    inner: Arc<Mutex<MockLedger>>,
}

impl MockChain {
    /// Create a chain whose wallet manages `accounts`, none of them authorized yet
    pub fn new(accounts: Vec<Address>) -> Self {
        let chain = Self::default();
        chain.ledger().wallet_accounts = accounts;
        chain
    }

    fn ledger(&self) -> MutexGuard<'_, MockLedger> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark the wallet's accounts as already authorized (as after an earlier visit)
    pub fn authorize(&self) {
        self.ledger().authorized = true;
    }

    pub fn set_contract_balance(&self, balance: U256) {
        self.ledger().contract_balance = balance;
    }

    pub fn contract_balance(&self) -> U256 {
        self.ledger().contract_balance
    }

    pub fn set_native_balance(&self, account: Address, balance: U256) {
        self.ledger().native_balances.insert(account, balance);
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.ledger()
            .native_balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    /// Amount the contract ledger has recorded as transferred to `recipient`
    pub fn ledger_credit(&self, recipient: Address) -> U256 {
        self.ledger()
            .ledger_credits
            .get(&recipient)
            .copied()
            .unwrap_or_default()
    }

    /// Make every subsequent `call` fail at `at` until cleared
    pub fn fail(&self, call: MockCall, at: FailAt) {
        self.ledger().failures.insert(call, at);
    }

    pub fn clear_failure(&self, call: MockCall) {
        self.ledger().failures.remove(&call);
    }

    /// Number of times `call` has been invoked (submissions, not confirmations)
    pub fn call_count(&self, call: MockCall) -> usize {
        self.ledger().calls.get(&call).copied().unwrap_or(0)
    }

    /// Hold the confirmation of the next `call` until the returned sender fires or is dropped
    pub fn hold_confirmation(&self, call: MockCall) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.ledger().gates.entry(call).or_default().push_back(rx);
        tx
    }

    /// Record an invocation and return the programmed failure for it, if any
    fn record(&self, call: MockCall) -> Option<FailAt> {
        let mut ledger = self.ledger();
        *ledger.calls.entry(call).or_insert(0) += 1;
        ledger.failures.get(&call).copied()
    }

    fn submit(&self, call: MockCall, effect: Effect) -> Result<PendingTx, ChainError> {
        let failure = self.record(call);
        if failure == Some(FailAt::Submit) {
            return Err(ChainError::Rpc(format!("{call:?} submission rejected")));
        }

        let (tx_hash, gate) = {
            let mut ledger = self.ledger();
            ledger.tx_counter += 1;
            let tx_hash = B256::left_padding_from(&ledger.tx_counter.to_be_bytes());
            let gate = ledger.gates.get_mut(&call).and_then(|q| q.pop_front());
            (tx_hash, gate)
        };

        let chain = self.clone();
        let revert = failure == Some(FailAt::Confirm);
        Ok(PendingTx::new(tx_hash, async move {
            if let Some(gate) = gate {
                // A dropped sender releases the gate as well
                let _ = gate.await;
            }
            chain.settle(tx_hash, effect, revert)
        }))
    }

    fn settle(&self, tx_hash: TxHash, effect: Effect, revert: bool) -> Result<Confirmation, ChainError> {
        let mut ledger = self.ledger();
        ledger.block_number += 1;
        if revert {
            return Err(ChainError::Reverted(tx_hash));
        }

        match effect {
            Effect::Credit(amount) => {
                ledger.contract_balance += amount;
            }
            Effect::Debit(amount) => {
                if ledger.contract_balance < amount {
                    return Err(ChainError::Reverted(tx_hash));
                }
                ledger.contract_balance -= amount;
            }
            Effect::Send { from, to, value } => {
                let from_balance = ledger.native_balances.get(&from).copied().unwrap_or_default();
                if from_balance < value {
                    return Err(ChainError::Reverted(tx_hash));
                }
                ledger.native_balances.insert(from, from_balance - value);
                *ledger.native_balances.entry(to).or_default() += value;
            }
            Effect::Ledger { recipient, amount } => {
                ledger.contract_balance = ledger.contract_balance.saturating_sub(amount);
                *ledger.ledger_credits.entry(recipient).or_default() += amount;
            }
        }

        Ok(Confirmation {
            tx_hash,
            block_number: Some(ledger.block_number),
        })
    }
}

#[async_trait]
impl WalletProvider for MockChain {
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainError> {
        if self.record(MockCall::RequestAccounts).is_some() {
            return Err(ChainError::UserRejected);
        }
        let mut ledger = self.ledger();
        ledger.authorized = true;
        Ok(ledger.wallet_accounts.clone())
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, ChainError> {
        if self.record(MockCall::GetAccounts).is_some() {
            return Err(ChainError::Rpc("eth_accounts unavailable".to_string()));
        }
        let ledger = self.ledger();
        if ledger.authorized {
            Ok(ledger.wallet_accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn signer(&self, account: Address) -> Result<Arc<dyn TransactionSigner>, ChainError> {
        if self.record(MockCall::Signer).is_some() {
            return Err(ChainError::NoSigner(format!("no signer for {account}")));
        }
        Ok(Arc::new(MockSigner {
            chain: self.clone(),
            from: account,
        }))
    }
}

struct MockSigner {
    chain: MockChain,
    from: Address,
}

#[async_trait]
impl TransactionSigner for MockSigner {
    fn address(&self) -> Address {
        self.from
    }

    async fn send_transaction(&self, to: Address, value: U256) -> Result<PendingTx, ChainError> {
        self.chain.submit(
            MockCall::NativeTransfer,
            Effect::Send {
                from: self.from,
                to,
                value,
            },
        )
    }

    fn bind_contract(&self, contract: Address) -> Arc<dyn AtmContract> {
        Arc::new(MockContract {
            chain: self.chain.clone(),
            address: contract,
        })
    }
}

struct MockContract {
    chain: MockChain,
    address: Address,
}

#[async_trait]
impl AtmContract for MockContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_balance(&self) -> Result<U256, ChainError> {
        if self.chain.record(MockCall::GetBalance).is_some() {
            return Err(ChainError::Rpc("getBalance call failed".to_string()));
        }
        Ok(self.chain.contract_balance())
    }

    async fn deposit(&self, amount: U256) -> Result<PendingTx, ChainError> {
        self.chain.submit(MockCall::Deposit, Effect::Credit(amount))
    }

    async fn withdraw(&self, amount: U256) -> Result<PendingTx, ChainError> {
        self.chain.submit(MockCall::Withdraw, Effect::Debit(amount))
    }

    async fn borrow(&self, amount: U256) -> Result<PendingTx, ChainError> {
        self.chain.submit(MockCall::Borrow, Effect::Credit(amount))
    }

    async fn transfer(&self, recipient: Address, amount: U256) -> Result<PendingTx, ChainError> {
        self.chain
            .submit(MockCall::ContractTransfer, Effect::Ledger { recipient, amount })
    }
}
