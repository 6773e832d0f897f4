use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::MarketId;
use crate::errors::ContractError;
use crate::values::TypedValue;

/// Fewest options a market may have
pub const MIN_OPTIONS: usize = 2;

/// Most options a market may have
pub const MAX_OPTIONS: usize = 10;

// ============================================================================
// MARKET STATUS
// ============================================================================

/// Market lifecycle status
///
/// Flow: Active → Resolved
///          ↓
///      Cancelled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    /// Open for liquidity and swaps
    #[default]
    Active,

    /// Oracle has determined the outcome
    Resolved,

    /// Market withdrawn before resolution
    Cancelled,
}

impl MarketStatus {
    /// Parse the string-ascii form used on the wire
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "active" => Some(MarketStatus::Active),
            "resolved" => Some(MarketStatus::Resolved),
            "cancelled" => Some(MarketStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::Active => "active",
            MarketStatus::Resolved => "resolved",
            MarketStatus::Cancelled => "cancelled",
        }
    }

    /// Check if trading and liquidity provision are allowed
    pub fn is_trading_open(&self) -> bool {
        matches!(self, MarketStatus::Active)
    }

    /// Check if the market has ended (no more status changes possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, MarketStatus::Resolved | MarketStatus::Cancelled)
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// MARKET
// ============================================================================

/// A prediction market record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,

    /// Account that created the market
    pub creator: String,

    /// Market question (e.g., "Will it rain tomorrow?")
    pub description: String,

    /// Outcome labels (e.g., ["Yes", "No"])
    pub options: Vec<String>,

    /// When the real-world outcome is expected
    pub resolution_time: u128,

    /// Account authorized to resolve the market
    pub oracle: String,

    pub status: MarketStatus,
}

impl Market {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Check if `caller` may change this market's status
    pub fn can_update_status(&self, caller: &str) -> bool {
        caller == self.creator || caller == self.oracle
    }

    /// Record form returned by `get-market`
    pub fn to_value(&self) -> TypedValue {
        TypedValue::tuple([
            ("creator", TypedValue::principal(&self.creator)),
            ("description", TypedValue::string_utf8(&self.description)),
            (
                "options",
                TypedValue::list(self.options.iter().map(TypedValue::string_utf8)),
            ),
            ("resolution-time", TypedValue::uint(self.resolution_time)),
            ("oracle", TypedValue::principal(&self.oracle)),
            ("status", TypedValue::string_ascii(self.status.as_str())),
        ])
    }
}

// ============================================================================
// MARKET REGISTRY
// ============================================================================

/// All markets ever created, keyed by id. Markets are never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketRegistry {
    markets: BTreeMap<MarketId, Market>,

    /// Last id handed out (0 = none yet)
    last_id: MarketId,
}

impl MarketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new market and return its id
    ///
    /// Fails with `InvalidOptionCount` unless 2..=10 options are given.
    pub fn create_market(
        &mut self,
        creator: &str,
        description: String,
        options: Vec<String>,
        resolution_time: u128,
        oracle: String,
    ) -> Result<MarketId, ContractError> {
        if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
            return Err(ContractError::InvalidOptionCount);
        }

        let id = self.last_id + 1;
        let market = Market {
            id,
            creator: creator.to_string(),
            description,
            options,
            resolution_time,
            oracle,
            status: MarketStatus::Active,
        };

        self.markets.insert(id, market);
        self.last_id = id;
        Ok(id)
    }

    pub fn get_market(&self, id: MarketId) -> Result<&Market, ContractError> {
        self.markets.get(&id).ok_or(ContractError::NotFound)
    }

    /// Replace a market's status
    ///
    /// Only the creator or the oracle may do this, and only while the market
    /// is still active. Returns the previous status.
    pub fn update_market_status(
        &mut self,
        caller: &str,
        id: MarketId,
        new_status: &str,
    ) -> Result<MarketStatus, ContractError> {
        let status = MarketStatus::parse(new_status).ok_or(ContractError::InvalidStatus)?;
        let market = self.markets.get_mut(&id).ok_or(ContractError::NotFound)?;

        if !market.can_update_status(caller) {
            return Err(ContractError::Unauthorized);
        }

        if market.status.is_terminal() {
            return Err(ContractError::StatusLocked);
        }

        let previous = market.status;
        market.status = status;
        Ok(previous)
    }

    /// Number of markets created so far
    pub fn market_count(&self) -> u64 {
        self.last_id
    }

    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.markets.values()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
