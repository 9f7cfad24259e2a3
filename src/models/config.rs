use alloy::primitives::{Address, address};
use std::env;
use std::str::FromStr;

/// Address of the deployed ATM contract on the local development chain.
pub const DEFAULT_ATM_CONTRACT_ADDRESS: Address =
    address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

/// Recipient of the compound transfer when none is configured.
pub const DEFAULT_TRANSFER_RECIPIENT: Address =
    address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

/// Configuration for the ATM client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtmConfig {
    pub env_type: String,
    /// JSON-RPC endpoint of the wallet provider; `None` means no provider is injected
    pub wallet_rpc_url: Option<String>,
    pub contract_address: Address,
    pub transfer_recipient: Address,
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            env_type: "localnet".to_string(),
            wallet_rpc_url: None,
            contract_address: DEFAULT_ATM_CONTRACT_ADDRESS,
            transfer_recipient: DEFAULT_TRANSFER_RECIPIENT,
        }
    }
}

impl AtmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let env_type = env::var("ENV").unwrap_or_else(|_| "localnet".to_string());

        match env_type.to_lowercase().as_str() {
            "mainnet" | "testnet" | "localnet" => {}
            _ => {
                return Err(format!(
                    "Invalid ENV value '{env_type}'. Must be 'mainnet', 'testnet', or 'localnet'"
                ));
            }
        }

        let wallet_rpc_url = env::var("WALLET_RPC_URL")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let contract_address =
            Self::address_from_env("ATM_CONTRACT_ADDRESS", DEFAULT_ATM_CONTRACT_ADDRESS)?;
        let transfer_recipient =
            Self::address_from_env("TRANSFER_RECIPIENT", DEFAULT_TRANSFER_RECIPIENT)?;

        Ok(Self {
            env_type,
            wallet_rpc_url,
            contract_address,
            transfer_recipient,
        })
    }

    fn address_from_env(key: &str, default: Address) -> Result<Address, String> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Address::from_str(value.trim())
                .map_err(|e| format!("Failed to parse {key} '{value}': {e}")),
            _ => Ok(default),
        }
    }

    /// The wallet RPC URL a local node would typically expose for this environment
    pub fn default_rpc_url(&self) -> &'static str {
        match self.env_type.to_lowercase().as_str() {
            "mainnet" => "https://mainnet.base.org",
            "testnet" => "https://sepolia.base.org",
            _ => "http://127.0.0.1:8545",
        }
    }
}
