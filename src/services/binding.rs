use alloy::primitives::Address;
use std::fmt;
use std::sync::Arc;

use super::provider::{AtmContract, TransactionSigner};
use super::session::Session;
use crate::error::AtmError;

/// A signer-bound handle to the ATM contract, valid only while the session
/// that produced it is the active one.
#[derive(Clone)]
pub struct ContractBinding {
    session_id: u64,
    signer: Arc<dyn TransactionSigner>,
    contract: Arc<dyn AtmContract>,
}

impl ContractBinding {
    /// Id of the session this binding was derived from
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn account(&self) -> Address {
        self.signer.address()
    }

    pub fn contract(&self) -> &Arc<dyn AtmContract> {
        &self.contract
    }
}

impl fmt::Debug for ContractBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractBinding")
            .field("session_id", &self.session_id)
            .field("account", &self.signer.address())
            .field("contract", &self.contract.address())
            .finish()
    }
}

/// Derive a signer from the session's provider and bind it to the contract at `contract_address`.
///
/// Pure derivation, no network call. Fails only if the provider cannot produce a signer.
pub fn bind(session: &Session, contract_address: Address) -> Result<ContractBinding, AtmError> {
    let signer = session
        .provider
        .signer(session.account)
        .map_err(|e| AtmError::BindingError {
            reason: e.to_string(),
        })?;

    let contract = signer.bind_contract(contract_address);
    tracing::debug!(
        "Bound ATM contract {} to account {} (session {})",
        contract_address,
        session.account,
        session.id
    );

    Ok(ContractBinding {
        session_id: session.id,
        signer,
        contract,
    })
}
