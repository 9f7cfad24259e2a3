// Compound transfer: native transfer, then contract ledger update

use alloy::primitives::U256;
use atm_client::error::AtmError;
use atm_client::models::{BalanceRefresh, OperationKind, OperationOutcome, TransferStage};
use atm_client::services::provider::{FailAt, MockCall};
use atm_client::services::units::{NATIVE_TRANSFER_AMOUNT, to_native_units};

use crate::test_utils::{
    USER, atm_with_chain, atm_without_provider, connected_atm, funded_native_balance,
};

fn one_ether() -> U256 {
    to_native_units(NATIVE_TRANSFER_AMOUNT).unwrap()
}

#[tokio::test]
async fn test_transfer_moves_funds_then_updates_ledger() {
    let contract_balance = 3_000_000_000_000_000_000u64;
    let (chain, atm) = connected_atm(contract_balance).await;
    let recipient = atm.transfer_recipient();

    let outcome = atm.transfer().await.unwrap();
    match outcome {
        OperationOutcome::Confirmed {
            op,
            tx_hashes,
            balance,
        } => {
            assert_eq!(op, OperationKind::Transfer);
            assert_eq!(tx_hashes.len(), 2);
            assert_ne!(tx_hashes[0], tx_hashes[1]);
            assert_eq!(
                balance,
                BalanceRefresh::Updated {
                    balance: 2_000_000_000_000_000_000
                }
            );
        }
        other => panic!("expected confirmation, got {other:?}"),
    }

    assert_eq!(chain.native_balance(USER), funded_native_balance() - one_ether());
    assert_eq!(chain.native_balance(recipient), one_ether());
    assert_eq!(chain.ledger_credit(recipient), one_ether());
    assert_eq!(chain.call_count(MockCall::NativeTransfer), 1);
    assert_eq!(chain.call_count(MockCall::ContractTransfer), 1);
}

#[tokio::test]
async fn test_native_failure_never_touches_contract() {
    let (chain, atm) = connected_atm(42).await;
    let reads_before = chain.call_count(MockCall::GetBalance);
    chain.fail(MockCall::NativeTransfer, FailAt::Submit);

    let err = atm.transfer().await.unwrap_err();
    assert_eq!(
        err,
        AtmError::TransferFailed {
            stage: TransferStage::Native,
            native_transfer_succeeded: false,
            cause: "rpc error: NativeTransfer submission rejected".to_string(),
        }
    );
    assert_eq!(chain.call_count(MockCall::ContractTransfer), 0);
    assert_eq!(chain.call_count(MockCall::GetBalance), reads_before);
    assert_eq!(atm.view().balance, Some(42));
}

#[tokio::test]
async fn test_native_revert_never_touches_contract() {
    let (chain, atm) = connected_atm(42).await;
    chain.set_native_balance(USER, U256::ZERO);

    let err = atm.transfer().await.unwrap_err();
    assert!(matches!(
        err,
        AtmError::TransferFailed {
            stage: TransferStage::Native,
            native_transfer_succeeded: false,
            ..
        }
    ));
    assert_eq!(chain.call_count(MockCall::ContractTransfer), 0);
    assert_eq!(atm.view().balance, Some(42));
}

#[tokio::test]
async fn test_ledger_failure_reports_partial_transfer() {
    let (chain, atm) = connected_atm(42).await;
    let recipient = atm.transfer_recipient();
    let reads_before = chain.call_count(MockCall::GetBalance);
    chain.fail(MockCall::ContractTransfer, FailAt::Confirm);

    let err = atm.transfer().await.unwrap_err();
    match &err {
        AtmError::TransferFailed {
            stage,
            native_transfer_succeeded,
            ..
        } => {
            assert_eq!(*stage, TransferStage::Contract);
            assert!(*native_transfer_succeeded);
        }
        other => panic!("unexpected error {other:?}"),
    }

    // Funds left the wallet, the ledger did not record it, and the cache was not refreshed
    assert_eq!(chain.native_balance(recipient), one_ether());
    assert_eq!(chain.ledger_credit(recipient), U256::ZERO);
    assert_eq!(chain.call_count(MockCall::GetBalance), reads_before);
    assert_eq!(atm.view().balance, Some(42));
}

#[tokio::test]
async fn test_signer_failure_is_a_native_stage_failure() {
    let (chain, atm) = connected_atm(42).await;
    chain.fail(MockCall::Signer, FailAt::Submit);

    let err = atm.transfer().await.unwrap_err();
    assert!(matches!(
        err,
        AtmError::TransferFailed {
            stage: TransferStage::Native,
            native_transfer_succeeded: false,
            ..
        }
    ));
    assert_eq!(chain.call_count(MockCall::NativeTransfer), 0);
}

#[tokio::test]
async fn test_transfer_without_provider_is_unavailable() {
    let atm = atm_without_provider();
    assert_eq!(
        atm.transfer().await.unwrap_err(),
        AtmError::ProviderUnavailable
    );
}

#[tokio::test]
async fn test_transfer_without_session_is_skipped() {
    let chain = crate::test_utils::mock_chain(42);
    let atm = atm_with_chain(&chain);

    let outcome = atm.transfer().await.unwrap();
    assert!(outcome.is_skipped());
    assert_eq!(chain.call_count(MockCall::NativeTransfer), 0);
}
