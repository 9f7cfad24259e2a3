use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;

use crate::error::AtmError;
use crate::models::ApiResponse;

pub mod atm;
pub mod info;
pub mod wallet;

pub use atm::*;
pub use info::*;
pub use wallet::*;

pub type ErrorResponse = Custom<Json<ApiResponse<AtmError>>>;

/// HTTP status for each failure kind
pub fn status_for(err: &AtmError) -> Status {
    match err {
        AtmError::ProviderUnavailable => Status::ServiceUnavailable,
        AtmError::ConnectionRejected { .. } => Status::Forbidden,
        AtmError::BindingError { .. } => Status::InternalServerError,
        AtmError::AccountQueryFailed { .. }
        | AtmError::ReadError { .. }
        | AtmError::OperationFailed { .. }
        | AtmError::TransferFailed { .. } => Status::BadGateway,
    }
}

/// Wrap a failure in the API envelope, keeping the typed error as the payload
pub fn error_response(err: AtmError) -> ErrorResponse {
    Custom(
        status_for(&err),
        Json(ApiResponse {
            success: false,
            message: err.to_string(),
            data: Some(err),
        }),
    )
}

pub fn ok_response<T>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: message.into(),
    })
}
