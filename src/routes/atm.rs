use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;
use tracing;

use super::{ErrorResponse, error_response, ok_response};
use crate::error::AtmError;
use crate::models::{ApiResponse, BalanceRefresh, OperationKind, OperationOutcome};
use crate::services::AtmService;

/// Tag every event captured while the guard lives with the operation name.
///
/// Must be taken before the service call, since failures are captured inside it.
fn operation_scope(op: OperationKind) -> sentry::ScopeGuard {
    let guard = sentry::Hub::current().push_scope();
    sentry::configure_scope(|scope| scope.set_tag("operation", op.as_str()));
    guard
}

fn operation_response(
    op: OperationKind,
    result: Result<OperationOutcome, AtmError>,
) -> Result<Json<ApiResponse<OperationOutcome>>, ErrorResponse> {
    match result {
        Ok(outcome) => {
            let message = match &outcome {
                OperationOutcome::Skipped { .. } => format!("{op} skipped: no wallet connected"),
                OperationOutcome::Confirmed { balance, .. } => match balance {
                    BalanceRefresh::Updated { balance } => {
                        format!("{op} confirmed, balance is now {balance}")
                    }
                    BalanceRefresh::Stale => {
                        format!("{op} confirmed after the session ended")
                    }
                    BalanceRefresh::Failed { reason } => {
                        format!("{op} confirmed, balance refresh failed: {reason}")
                    }
                },
            };
            Ok(ok_response(outcome, message))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Re-reads the balance from the ATM contract.
#[openapi(tag = "ATM")]
#[post("/refresh")]
pub async fn refresh(
    atm: &State<AtmService>,
) -> Result<Json<ApiResponse<BalanceRefresh>>, ErrorResponse> {
    tracing::info!("Received request: POST /refresh");
    match atm.refresh().await {
        Ok(refresh) => Ok(ok_response(refresh, "Balance refreshed")),
        Err(e) => Err(error_response(e)),
    }
}

/// Deposits 1 unit into the ATM.
#[openapi(tag = "ATM")]
#[post("/deposit")]
pub async fn deposit(
    atm: &State<AtmService>,
) -> Result<Json<ApiResponse<OperationOutcome>>, ErrorResponse> {
    tracing::info!("Received request: POST /deposit");
    let _scope = operation_scope(OperationKind::Deposit);
    operation_response(OperationKind::Deposit, atm.deposit().await)
}

/// Withdraws 1 unit from the ATM.
#[openapi(tag = "ATM")]
#[post("/withdraw")]
pub async fn withdraw(
    atm: &State<AtmService>,
) -> Result<Json<ApiResponse<OperationOutcome>>, ErrorResponse> {
    tracing::info!("Received request: POST /withdraw");
    let _scope = operation_scope(OperationKind::Withdraw);
    operation_response(OperationKind::Withdraw, atm.withdraw().await)
}

/// Borrows 1 unit from the ATM.
#[openapi(tag = "ATM")]
#[post("/borrow")]
pub async fn borrow(
    atm: &State<AtmService>,
) -> Result<Json<ApiResponse<OperationOutcome>>, ErrorResponse> {
    tracing::info!("Received request: POST /borrow");
    let _scope = operation_scope(OperationKind::Borrow);
    operation_response(OperationKind::Borrow, atm.borrow().await)
}

/// Sends 1 ETH to the configured recipient, then records the transfer on the ATM ledger.
///
/// A failure after the ETH has left the wallet is reported with
/// `native_transfer_succeeded: true`.
#[openapi(tag = "ATM")]
#[post("/transfer")]
pub async fn transfer(
    atm: &State<AtmService>,
) -> Result<Json<ApiResponse<OperationOutcome>>, ErrorResponse> {
    tracing::info!("Received request: POST /transfer");
    let _scope = operation_scope(OperationKind::Transfer);
    operation_response(OperationKind::Transfer, atm.transfer().await)
}
