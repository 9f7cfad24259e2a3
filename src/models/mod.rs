pub mod config;
pub mod outcome;
pub mod responses;

pub use config::AtmConfig;
pub use outcome::{BalanceRefresh, ConnectOutcome, OperationKind, OperationOutcome, TransferStage};
pub use responses::{ApiResponse, ApiSummary, AtmView, EndpointInfo};
