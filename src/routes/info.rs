use rocket::get;
use rocket::serde::json::Json;
use rocket_okapi::openapi;
use tracing;

use crate::models::{ApiResponse, ApiSummary, EndpointInfo};

/// Every endpoint of the ATM client, for the welcome page
pub fn endpoints() -> Vec<EndpointInfo> {
    [
        ("GET", "/", "Welcome page with API documentation"),
        ("GET", "/state", "Provider, account and cached balance"),
        ("POST", "/detect", "Look for an injected wallet provider"),
        ("POST", "/restore", "Adopt an already-authorized account without prompting"),
        ("POST", "/connect", "Prompt the wallet to authorize an account"),
        ("POST", "/logout", "Forget the account, contract binding and balance"),
        ("POST", "/refresh", "Re-read the balance from the contract"),
        ("POST", "/deposit", "Deposit 1 unit into the ATM"),
        ("POST", "/withdraw", "Withdraw 1 unit from the ATM"),
        ("POST", "/borrow", "Borrow 1 unit from the ATM"),
        ("POST", "/transfer", "Send 1 ETH to the recipient and record it on the ATM ledger"),
    ]
    .into_iter()
    .map(|(method, path, description)| EndpointInfo {
        method: method.to_string(),
        path: path.to_string(),
        description: description.to_string(),
    })
    .collect()
}

/// Welcome page listing the available endpoints.
#[openapi(tag = "Info")]
#[get("/")]
pub fn index() -> Json<ApiResponse<ApiSummary>> {
    tracing::info!("Received request: GET /");

    let endpoints = endpoints();
    let message = format!(
        "Welcome to the ATM! {} endpoints available",
        endpoints.len()
    );

    Json(ApiResponse {
        success: true,
        data: Some(ApiSummary {
            total_endpoints: endpoints.len(),
            endpoints,
        }),
        message,
    })
}
