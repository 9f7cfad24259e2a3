// End-to-end flows through detect, restore, connect, operations and logout

use alloy::primitives::U256;
use atm_client::models::{BalanceRefresh, OperationOutcome};
use atm_client::services::provider::MockCall;

use crate::test_utils::{USER, atm_with_chain, funded_native_balance, mock_chain};

const ALL_CALLS: [MockCall; 9] = [
    MockCall::RequestAccounts,
    MockCall::GetAccounts,
    MockCall::Signer,
    MockCall::GetBalance,
    MockCall::Deposit,
    MockCall::Withdraw,
    MockCall::Borrow,
    MockCall::NativeTransfer,
    MockCall::ContractTransfer,
];

#[tokio::test]
async fn test_first_visit_flow() {
    let chain = mock_chain(2_000_000_000_000_000_000);
    let atm = atm_with_chain(&chain);

    assert_eq!(atm.restore_session().await.unwrap(), None);
    let connected = atm.connect().await.unwrap();
    assert_eq!(connected.account, USER);

    atm.deposit().await.unwrap();
    atm.borrow().await.unwrap();
    atm.withdraw().await.unwrap();
    let transfer = atm.transfer().await.unwrap();
    assert!(matches!(transfer, OperationOutcome::Confirmed { .. }));

    // 2e18 + 1 + 1 - 1 - 1e18
    assert_eq!(
        atm.view().balance,
        Some(1_000_000_000_000_000_001)
    );
    assert!(chain.native_balance(USER) < funded_native_balance());
}

#[tokio::test]
async fn test_returning_visit_restores_without_prompt() {
    let chain = mock_chain(5);
    chain.authorize();
    let atm = atm_with_chain(&chain);

    let restored = atm.restore_session().await.unwrap().unwrap();
    assert_eq!(restored.account, USER);
    atm.deposit().await.unwrap();

    assert_eq!(atm.view().balance, Some(6));
    assert_eq!(chain.call_count(MockCall::RequestAccounts), 0);
}

#[tokio::test]
async fn test_every_operation_is_a_noop_after_logout() {
    let chain = mock_chain(5);
    let atm = atm_with_chain(&chain);
    atm.connect().await.unwrap();
    atm.logout();

    let before: Vec<usize> = ALL_CALLS.iter().map(|c| chain.call_count(*c)).collect();
    let view_before = atm.view();

    for outcome in [
        atm.deposit().await.unwrap(),
        atm.withdraw().await.unwrap(),
        atm.borrow().await.unwrap(),
        atm.transfer().await.unwrap(),
    ] {
        assert!(outcome.is_skipped());
    }
    assert_eq!(atm.refresh().await.unwrap(), BalanceRefresh::Stale);

    let after: Vec<usize> = ALL_CALLS.iter().map(|c| chain.call_count(*c)).collect();
    assert_eq!(before, after);
    assert_eq!(atm.view(), view_before);
    assert_eq!(chain.contract_balance(), U256::from(5));
}

#[tokio::test]
async fn test_restore_after_logout_readopts_authorized_account() {
    let chain = mock_chain(5);
    let atm = atm_with_chain(&chain);
    atm.connect().await.unwrap();
    atm.logout();

    // The wallet still remembers the authorization
    let restored = atm.restore_session().await.unwrap().unwrap();
    assert_eq!(restored.account, USER);
    assert_eq!(atm.view().balance, Some(5));
}
