use alloy::primitives::Address;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

/// Read-only projection of the ATM state for the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AtmView {
    pub provider_detected: bool,
    #[schemars(with = "Option<String>")]
    pub account: Option<Address>,
    pub balance: Option<u64>,
}

/// Endpoint information for the welcome page
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EndpointInfo {
    pub method: String,
    pub path: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiSummary {
    pub total_endpoints: usize,
    pub endpoints: Vec<EndpointInfo>,
}
