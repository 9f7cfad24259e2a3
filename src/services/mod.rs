pub mod balance;
pub mod binding;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod state;
pub mod units;

pub use balance::BalanceCache;
pub use binding::ContractBinding;
pub use orchestrator::AtmService;
pub use session::{Session, SessionManager};
pub use state::{AtmState, AtmStore};
