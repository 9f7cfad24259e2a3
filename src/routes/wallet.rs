use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use tracing;

use super::{ErrorResponse, error_response, ok_response};
use crate::models::{ApiResponse, AtmView, ConnectOutcome};
use crate::services::AtmService;

/// Current provider, account and cached balance.
#[openapi(tag = "Wallet")]
#[get("/state")]
pub fn get_state(atm: &State<AtmService>) -> Json<ApiResponse<AtmView>> {
    tracing::debug!("Received request: GET /state");
    ok_response(atm.view(), "Current ATM state")
}

/// Looks for an injected wallet provider.
#[openapi(tag = "Wallet")]
#[post("/detect")]
pub fn detect(atm: &State<AtmService>) -> Json<ApiResponse<AtmView>> {
    tracing::info!("Received request: POST /detect");
    let message = if atm.detect_provider() {
        "Wallet provider detected"
    } else {
        "Please install a wallet extension in order to use this ATM"
    };
    ok_response(atm.view(), message)
}

/// Adopts an already-authorized account, if the wallet has one.
#[openapi(tag = "Wallet")]
#[post("/restore")]
pub async fn restore(
    atm: &State<AtmService>,
) -> Result<Json<ApiResponse<Option<ConnectOutcome>>>, ErrorResponse> {
    tracing::info!("Received request: POST /restore");
    match atm.restore_session().await {
        Ok(Some(outcome)) => {
            let message = format!("Restored account {}", outcome.account);
            Ok(ok_response(Some(outcome), message))
        }
        Ok(None) => Ok(ok_response(None, "No authorized account found")),
        Err(e) => Err(error_response(e)),
    }
}

/// Prompts the wallet to authorize an account and binds the ATM contract to it.
#[openapi(tag = "Wallet")]
#[post("/connect")]
pub async fn connect(
    atm: &State<AtmService>,
) -> Result<Json<ApiResponse<ConnectOutcome>>, ErrorResponse> {
    tracing::info!("Received request: POST /connect");
    let _guard = sentry::Hub::current().push_scope();
    sentry::configure_scope(|scope| scope.set_tag("endpoint", "/connect"));

    match atm.connect().await {
        Ok(outcome) => {
            let message = format!("Connected account {}", outcome.account);
            Ok(ok_response(outcome, message))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Forgets the account, the contract binding and the cached balance.
#[openapi(tag = "Wallet")]
#[post("/logout")]
pub fn logout(atm: &State<AtmService>) -> Json<ApiResponse<AtmView>> {
    tracing::info!("Received request: POST /logout");
    atm.logout();
    ok_response(atm.view(), "Account disconnected")
}
