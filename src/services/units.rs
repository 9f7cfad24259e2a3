use alloy::primitives::U256;
use alloy::primitives::utils::parse_units;

/// Amount passed to `deposit`, `withdraw` and `borrow`, in the contract's own unit.
pub const CONTRACT_OPERATION_AMOUNT: u64 = 1;

/// Amount of native currency moved by the compound transfer, in whole units.
pub const NATIVE_TRANSFER_AMOUNT: &str = "1";

/// Decimals of the native currency's smallest unit (wei).
pub const NATIVE_DECIMALS: u8 = 18;

/// Amount for the single-call contract operations.
pub fn contract_amount() -> U256 {
    U256::from(CONTRACT_OPERATION_AMOUNT)
}

/// Scale a human-readable native amount (e.g. `"1"`, `"0.5"`) to the smallest unit.
pub fn to_native_units(amount: &str) -> Result<U256, String> {
    parse_units(amount, NATIVE_DECIMALS)
        .map(Into::into)
        .map_err(|e| format!("Invalid native amount '{amount}': {e}"))
}
