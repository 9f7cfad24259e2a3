// Wallet session manager tests: detection, restore, connect, logout

use alloy::primitives::U256;
use atm_client::error::AtmError;
use atm_client::models::BalanceRefresh;
use atm_client::services::provider::{FailAt, MockCall};

use crate::test_utils::{USER, atm_with_chain, atm_without_provider, mock_chain};

#[tokio::test]
async fn test_connect_without_provider_is_unavailable() {
    let atm = atm_without_provider();

    let err = atm.connect().await.unwrap_err();
    assert_eq!(err, AtmError::ProviderUnavailable);

    let view = atm.view();
    assert!(!view.provider_detected);
    assert!(view.account.is_none());
    assert!(atm.snapshot().binding.is_none());
}

#[tokio::test]
async fn test_connect_binds_and_reads_balance() {
    let chain = mock_chain(42);
    let atm = atm_with_chain(&chain);

    let outcome = atm.connect().await.unwrap();
    assert_eq!(outcome.account, USER);
    assert_eq!(outcome.balance, BalanceRefresh::Updated { balance: 42 });

    let state = atm.snapshot();
    let session = state.session.as_ref().unwrap();
    let binding = state.binding.as_ref().unwrap();
    assert_eq!(session.account, USER);
    assert_eq!(binding.session_id(), session.id);
    assert_eq!(binding.account(), USER);
    assert_eq!(state.balance, Some(42));
    assert_eq!(chain.call_count(MockCall::RequestAccounts), 1);
}

#[tokio::test]
async fn test_connect_rejected_by_user() {
    let chain = mock_chain(42);
    chain.fail(MockCall::RequestAccounts, FailAt::Submit);
    let atm = atm_with_chain(&chain);

    let err = atm.connect().await.unwrap_err();
    assert!(matches!(err, AtmError::ConnectionRejected { .. }));
    assert!(err.to_string().contains("declined"));
    assert!(atm.view().account.is_none());
    assert_eq!(chain.call_count(MockCall::GetBalance), 0);

    // Not retried behind the caller's back
    assert_eq!(chain.call_count(MockCall::RequestAccounts), 1);
}

#[tokio::test]
async fn test_connect_with_no_accounts_is_rejected() {
    let chain = atm_client::services::provider::MockChain::new(vec![]);
    let atm = atm_with_chain(&chain);

    let err = atm.connect().await.unwrap_err();
    assert!(matches!(err, AtmError::ConnectionRejected { .. }));
    assert!(atm.view().account.is_none());
}

#[tokio::test]
async fn test_connect_binding_failure_leaves_session_empty() {
    let chain = mock_chain(42);
    chain.fail(MockCall::Signer, FailAt::Submit);
    let atm = atm_with_chain(&chain);

    let err = atm.connect().await.unwrap_err();
    assert!(matches!(err, AtmError::BindingError { .. }));

    let state = atm.snapshot();
    assert!(state.session.is_none());
    assert!(state.binding.is_none());
    assert!(state.balance.is_none());
}

#[tokio::test]
async fn test_connect_succeeds_even_if_first_read_fails() {
    let chain = mock_chain(42);
    chain.fail(MockCall::GetBalance, FailAt::Submit);
    let atm = atm_with_chain(&chain);

    let outcome = atm.connect().await.unwrap();
    assert!(matches!(outcome.balance, BalanceRefresh::Failed { .. }));
    assert_eq!(atm.view().account, Some(USER));
    assert_eq!(atm.view().balance, None);
}

#[tokio::test]
async fn test_restore_without_authorized_accounts() {
    let chain = mock_chain(42);
    let atm = atm_with_chain(&chain);

    assert_eq!(atm.restore_session().await.unwrap(), None);
    assert!(atm.view().account.is_none());
    assert_eq!(chain.call_count(MockCall::RequestAccounts), 0);
}

#[tokio::test]
async fn test_restore_adopts_authorized_account_without_prompt() {
    let chain = mock_chain(7);
    chain.authorize();
    let atm = atm_with_chain(&chain);

    let outcome = atm.restore_session().await.unwrap().unwrap();
    assert_eq!(outcome.account, USER);
    assert_eq!(outcome.balance, BalanceRefresh::Updated { balance: 7 });
    assert!(atm.snapshot().binding.is_some());
    assert_eq!(chain.call_count(MockCall::RequestAccounts), 0);
}

#[tokio::test]
async fn test_restore_without_provider_is_noop() {
    let atm = atm_without_provider();
    assert_eq!(atm.restore_session().await.unwrap(), None);
}

#[tokio::test]
async fn test_restore_reports_account_query_failure() {
    let chain = mock_chain(7);
    chain.fail(MockCall::GetAccounts, FailAt::Submit);
    let atm = atm_with_chain(&chain);

    let err = atm.restore_session().await.unwrap_err();
    assert!(matches!(err, AtmError::AccountQueryFailed { .. }));
    assert!(atm.view().account.is_none());
}

#[tokio::test]
async fn test_logout_clears_everything_and_is_idempotent() {
    let chain = mock_chain(42);
    let atm = atm_with_chain(&chain);
    atm.connect().await.unwrap();
    assert_eq!(atm.view().balance, Some(42));

    atm.logout();
    let once = atm.snapshot();
    assert!(once.session.is_none());
    assert!(once.binding.is_none());
    assert!(once.balance.is_none());

    atm.logout();
    let twice = atm.snapshot();
    assert!(twice.session.is_none());
    assert!(twice.binding.is_none());
    assert!(twice.balance.is_none());
    assert_eq!(atm.view(), once.view());

    // The provider stays detected
    assert!(atm.view().provider_detected);
}

#[tokio::test]
async fn test_reconnect_creates_a_new_binding() {
    let chain = mock_chain(42);
    let atm = atm_with_chain(&chain);

    atm.connect().await.unwrap();
    let first = atm.snapshot().binding.unwrap().session_id();

    atm.logout();
    chain.set_contract_balance(U256::from(5));
    atm.connect().await.unwrap();
    let second = atm.snapshot().binding.unwrap().session_id();

    assert_ne!(first, second);
    assert_eq!(atm.view().balance, Some(5));
}

#[tokio::test]
async fn test_subscribers_are_notified_of_connection() {
    let chain = mock_chain(42);
    let atm = atm_with_chain(&chain);
    let mut rx = atm.subscribe();

    atm.connect().await.unwrap();

    let state = rx.wait_for(|s| s.balance.is_some()).await.unwrap();
    assert_eq!(state.balance, Some(42));
    assert_eq!(state.account(), Some(USER));
}
