// Tests against a local Anvil node; run with `cargo test -- --ignored` when anvil is installed

use alloy::node_bindings::Anvil;
use alloy::primitives::U256;
use atm_client::services::provider::{RpcWalletProvider, WalletProvider};

#[tokio::test]
#[ignore = "requires anvil on PATH"]
async fn test_rpc_provider_lists_node_accounts() {
    let anvil = Anvil::new().chain_id(31337u64).spawn();
    let provider = RpcWalletProvider::connect(&anvil.endpoint()).unwrap();

    let accounts = provider.get_accounts().await.unwrap();
    assert_eq!(accounts, anvil.addresses().to_vec());
}

#[tokio::test]
#[ignore = "requires anvil on PATH"]
async fn test_rpc_signer_sends_and_confirms_native_transfer() {
    let anvil = Anvil::new().chain_id(31337u64).spawn();
    let provider = RpcWalletProvider::connect(&anvil.endpoint()).unwrap();
    let accounts = anvil.addresses().to_vec();

    let signer = provider.signer(accounts[0]).unwrap();
    assert_eq!(signer.address(), accounts[0]);

    let pending = signer
        .send_transaction(accounts[1], U256::from(1_000_000_000u64))
        .await
        .unwrap();
    let tx_hash = pending.tx_hash();
    let confirmation = pending.wait().await.unwrap();

    assert_eq!(confirmation.tx_hash, tx_hash);
    assert!(confirmation.block_number.is_some());
}

#[tokio::test]
#[ignore = "requires anvil on PATH"]
async fn test_balance_read_without_contract_is_a_read_failure() {
    let anvil = Anvil::new().chain_id(31337u64).spawn();
    let provider = RpcWalletProvider::connect(&anvil.endpoint()).unwrap();
    let accounts = anvil.addresses().to_vec();

    // Nothing is deployed at the default address on a fresh node
    let contract = provider
        .signer(accounts[0])
        .unwrap()
        .bind_contract(atm_client::models::AtmConfig::default().contract_address);
    assert!(contract.get_balance().await.is_err());
}
