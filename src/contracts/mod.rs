// ============================================================================
// Contracts Module - Market Registry & Liquidity Pool
// ============================================================================
//
// Off-chain reference model of the two contracts addressed by the gateway:
//   - markets: market-creation contract (create / get / update status)
//   - cpmm:    amm contract (provide liquidity / pool lookup / swap)
//
// Both are plain state machines. Locking and routing live in `chain`.
//
// ============================================================================

pub mod markets;
pub mod cpmm;

pub use markets::*;
pub use cpmm::*;

use crate::errors::ContractError;
use crate::values::TypedValue;

/// Market identifier, assigned sequentially from 1
pub type MarketId = u64;

/// Positional argument reader for a contract function call.
///
/// Every accessor checks the tag of the next argument. Call `finish` once all
/// expected arguments are read so trailing extras are rejected.
pub struct Args<'a> {
    function: &'a str,
    values: &'a [TypedValue],
    position: usize,
}

impl<'a> Args<'a> {
    pub fn new(function: &'a str, values: &'a [TypedValue]) -> Self {
        Self { function, values, position: 0 }
    }

    fn next(&mut self, name: &str) -> Result<&'a TypedValue, ContractError> {
        let value = self.values.get(self.position).ok_or_else(|| {
            ContractError::BadArguments(format!(
                "{} expects argument {} ({})",
                self.function,
                self.position + 1,
                name
            ))
        })?;
        self.position += 1;
        Ok(value)
    }

    fn mismatch(&self, name: &str, expected: &str, got: &TypedValue) -> ContractError {
        ContractError::BadArguments(format!(
            "{}: {} must be {}, got {}",
            self.function,
            name,
            expected,
            got.type_name()
        ))
    }

    pub fn uint(&mut self, name: &str) -> Result<u128, ContractError> {
        let value = self.next(name)?;
        value.as_uint().ok_or_else(|| self.mismatch(name, "uint", value))
    }

    /// A `uint` naming a market. Ids beyond 64 bits cannot exist.
    pub fn market_id(&mut self, name: &str) -> Result<MarketId, ContractError> {
        let raw = self.uint(name)?;
        MarketId::try_from(raw).map_err(|_| ContractError::NotFound)
    }

    /// A `uint` used as an option index
    pub fn index(&mut self, name: &str) -> Result<usize, ContractError> {
        let raw = self.uint(name)?;
        Ok(usize::try_from(raw).unwrap_or(usize::MAX))
    }

    pub fn string_utf8(&mut self, name: &str) -> Result<String, ContractError> {
        let value = self.next(name)?;
        value
            .as_string_utf8()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(name, "string-utf8", value))
    }

    pub fn string_ascii(&mut self, name: &str) -> Result<String, ContractError> {
        let value = self.next(name)?;
        value
            .as_string_ascii()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(name, "string-ascii", value))
    }

    pub fn principal(&mut self, name: &str) -> Result<String, ContractError> {
        let value = self.next(name)?;
        value
            .as_principal()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(name, "principal", value))
    }

    pub fn utf8_list(&mut self, name: &str) -> Result<Vec<String>, ContractError> {
        let value = self.next(name)?;
        let items = value.as_list().ok_or_else(|| self.mismatch(name, "list", value))?;
        items
            .iter()
            .map(|item| {
                item.as_string_utf8()
                    .map(str::to_string)
                    .ok_or_else(|| self.mismatch(name, "list of string-utf8", item))
            })
            .collect()
    }

    pub fn uint_list(&mut self, name: &str) -> Result<Vec<u128>, ContractError> {
        let value = self.next(name)?;
        let items = value.as_list().ok_or_else(|| self.mismatch(name, "list", value))?;
        items
            .iter()
            .map(|item| item.as_uint().ok_or_else(|| self.mismatch(name, "list of uint", item)))
            .collect()
    }

    pub fn finish(self) -> Result<(), ContractError> {
        if self.position < self.values.len() {
            return Err(ContractError::BadArguments(format!(
                "{} takes {} arguments, got {}",
                self.function,
                self.position,
                self.values.len()
            )));
        }
        Ok(())
    }
}
