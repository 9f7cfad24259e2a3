use rocket::{Build, Rocket};
use rocket_okapi::openapi_get_routes;
use std::sync::Arc;

pub mod error;
pub mod fairings;
pub mod models;
pub mod routes;
pub mod services;

use crate::models::AtmConfig;
use crate::services::AtmService;
use crate::services::provider::{RpcWalletProvider, WalletProvider};

/// Build the wallet provider the environment exposes, if any
pub fn injected_provider(config: &AtmConfig) -> Result<Option<Arc<dyn WalletProvider>>, String> {
    match &config.wallet_rpc_url {
        Some(url) => {
            let provider = RpcWalletProvider::connect(url)?;
            Ok(Some(Arc::new(provider)))
        }
        None => Ok(None),
    }
}

/// Mount the presentation boundary on a Rocket instance managing `atm`
pub fn build_rocket(atm: AtmService) -> Rocket<Build> {
    rocket::build()
        .manage(atm)
        .attach(fairings::RequestLogger)
        .attach(fairings::PanicCatcher)
        .mount(
            "/",
            openapi_get_routes![
                routes::index,
                routes::get_state,
                routes::detect,
                routes::restore,
                routes::connect,
                routes::logout,
                routes::refresh,
                routes::deposit,
                routes::withdraw,
                routes::borrow,
                routes::transfer,
            ],
        )
}

pub async fn create_rocket() -> Result<Rocket<Build>, String> {
    dotenvy::dotenv().ok();

    let config = AtmConfig::from_env()?;
    let injected = injected_provider(&config)?;

    tracing::info!("ATM client configuration:");
    tracing::info!("  - ENV: {}", config.env_type);
    tracing::info!("  - ATM contract: {}", config.contract_address);
    tracing::info!("  - Transfer recipient: {}", config.transfer_recipient);
    match &config.wallet_rpc_url {
        Some(url) => tracing::info!("  - Wallet RPC URL: {}", url),
        None => tracing::info!(
            "  - Wallet RPC URL: not set (a local wallet usually listens on {})",
            config.default_rpc_url()
        ),
    }

    let atm = AtmService::new(&config, injected);
    if atm.detect_provider() {
        match atm.restore_session().await {
            Ok(Some(outcome)) => tracing::info!("Restored session for {}", outcome.account),
            Ok(None) => tracing::info!("No previously authorized account"),
            Err(e) => tracing::warn!("Failed to restore session: {}", e),
        }
    }

    Ok(build_rocket(atm))
}
