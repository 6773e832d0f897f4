// Contract error codes

use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR CODES
// ============================================================================

pub const ERR_UNAUTHORIZED: u32 = 100;
pub const ERR_INVALID_STATUS: u32 = 101;
pub const ERR_STATUS_LOCKED: u32 = 102;
pub const ERR_INVALID_OPTION_COUNT: u32 = 103;
pub const ERR_MARKET_NOT_ACTIVE: u32 = 104;
pub const ERR_AMOUNT_MISMATCH: u32 = 300;
pub const ERR_INSUFFICIENT_LIQUIDITY: u32 = 301;
pub const ERR_ZERO_AMOUNT: u32 = 302;
pub const ERR_INVALID_OPTION_INDEX: u32 = 303;
pub const ERR_NOT_FOUND: u32 = 404;

/// Failure of a contract call.
///
/// Contract-level failures render as `err-u<code>`, the form callers match
/// on. Runtime failures (bad routing or badly typed arguments) never reach a
/// contract and render as `<kind>: <detail>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractError {
    /// Caller is neither the market creator nor its oracle
    Unauthorized,
    /// Status text is not one of active / resolved / cancelled
    InvalidStatus,
    /// Market already resolved or cancelled
    StatusLocked,
    /// Option count outside 2..=10
    InvalidOptionCount,
    /// Market is resolved or cancelled, trading and liquidity are closed
    MarketNotActive,
    /// Liquidity amounts list length differs from the option count
    AmountMismatch,
    /// Swap input too large for the pool depth
    InsufficientLiquidity,
    ZeroAmount,
    /// Option index out of range, or input index equals output index
    InvalidOptionIndex,
    /// Market or pool does not exist
    NotFound,

    UnknownContract(String),
    UnknownFunction(String),
    BadArguments(String),
}

impl ContractError {
    /// Numeric code for contract-level errors, `None` for runtime errors
    pub fn code(&self) -> Option<u32> {
        match self {
            ContractError::Unauthorized => Some(ERR_UNAUTHORIZED),
            ContractError::InvalidStatus => Some(ERR_INVALID_STATUS),
            ContractError::StatusLocked => Some(ERR_STATUS_LOCKED),
            ContractError::InvalidOptionCount => Some(ERR_INVALID_OPTION_COUNT),
            ContractError::MarketNotActive => Some(ERR_MARKET_NOT_ACTIVE),
            ContractError::AmountMismatch => Some(ERR_AMOUNT_MISMATCH),
            ContractError::InsufficientLiquidity => Some(ERR_INSUFFICIENT_LIQUIDITY),
            ContractError::ZeroAmount => Some(ERR_ZERO_AMOUNT),
            ContractError::InvalidOptionIndex => Some(ERR_INVALID_OPTION_INDEX),
            ContractError::NotFound => Some(ERR_NOT_FOUND),
            ContractError::UnknownContract(_)
            | ContractError::UnknownFunction(_)
            | ContractError::BadArguments(_) => None,
        }
    }

    /// Inverse of [`ContractError::code`]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            ERR_UNAUTHORIZED => Some(ContractError::Unauthorized),
            ERR_INVALID_STATUS => Some(ContractError::InvalidStatus),
            ERR_STATUS_LOCKED => Some(ContractError::StatusLocked),
            ERR_INVALID_OPTION_COUNT => Some(ContractError::InvalidOptionCount),
            ERR_MARKET_NOT_ACTIVE => Some(ContractError::MarketNotActive),
            ERR_AMOUNT_MISMATCH => Some(ContractError::AmountMismatch),
            ERR_INSUFFICIENT_LIQUIDITY => Some(ContractError::InsufficientLiquidity),
            ERR_ZERO_AMOUNT => Some(ContractError::ZeroAmount),
            ERR_INVALID_OPTION_INDEX => Some(ContractError::InvalidOptionIndex),
            ERR_NOT_FOUND => Some(ContractError::NotFound),
            _ => None,
        }
    }

    /// Parse the `err-u<code>` form back into an error
    pub fn parse(error: &str) -> Option<Self> {
        error_code(error).and_then(Self::from_code)
    }
}

/// Extract `<code>` from an `err-u<code>` string
pub fn error_code(error: &str) -> Option<u32> {
    error.strip_prefix("err-u")?.parse().ok()
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractError::UnknownContract(name) => write!(f, "unknown-contract: {}", name),
            ContractError::UnknownFunction(name) => write!(f, "unknown-function: {}", name),
            ContractError::BadArguments(msg) => write!(f, "bad-arguments: {}", msg),
            other => match other.code() {
                Some(code) => write!(f, "err-u{}", code),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

impl std::error::Error for ContractError {}
