use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::MarketId;
use crate::errors::ContractError;
use crate::values::TypedValue;

// ============================================================================
// CPMM CONSTANTS
// ============================================================================

/// Constant Product Market Maker (CPMM) over outcome shares
///
/// A swap touches two reserves, `x = shares[input]` and `y = shares[output]`.
/// After the fee is taken the pair keeps `x * y = k`:
///
///   effective = input - input * fee
///   output    = y * effective / (x + effective)
///
/// The whole input (fee included) is added to `x`, so the fee stays in the
/// pool and `k` grows slightly with every trade.

/// Fee charged on each swap, in basis points (2%)
pub const SWAP_FEE_BPS: u128 = 200;

pub const BPS_DENOMINATOR: u128 = 10_000;

/// Output amount for a swap of `input` against reserves `(reserve_in, reserve_out)`
///
/// Returns `(fee, output)`. Output is rounded down.
pub fn compute_output(input: u128, reserve_in: u128, reserve_out: u128) -> Option<(u128, u128)> {
    let fee = input.checked_mul(SWAP_FEE_BPS)? / BPS_DENOMINATOR;
    let effective = input - fee;
    let denominator = reserve_in.checked_add(effective)?;
    if denominator == 0 {
        return Some((fee, 0));
    }
    let output = reserve_out.checked_mul(effective)? / denominator;
    Some((fee, output))
}

fn pool_overflow() -> ContractError {
    ContractError::BadArguments("amount overflows pool".to_string())
}

// ============================================================================
// LIQUIDITY POOL
// ============================================================================

/// Per-market liquidity pool
///
/// Invariant: `shares.len()` equals the market's option count and
/// `total_liquidity == shares.iter().sum()` after every successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub market_id: MarketId,

    /// Sum of all shares
    pub total_liquidity: u128,

    /// Per-option balances, one per market option
    pub shares: Vec<u128>,

    /// Total amount contributed by each provider
    pub providers: BTreeMap<String, u128>,
}

/// Result of a swap operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    pub input_index: usize,
    pub output_index: usize,
    pub input_amount: u128,
    /// Part of the input retained by the pool
    pub fee: u128,
    pub output_amount: u128,
}

impl LiquidityPool {
    /// Create an empty pool for a market with `option_count` options
    pub fn new(market_id: MarketId, option_count: usize) -> Self {
        Self {
            market_id,
            total_liquidity: 0,
            shares: vec![0; option_count],
            providers: BTreeMap::new(),
        }
    }

    pub fn option_count(&self) -> usize {
        self.shares.len()
    }

    /// Add one amount per option
    ///
    /// Fails with `AmountMismatch` if `amounts` does not have one entry per
    /// option and `ZeroAmount` if every entry is zero.
    pub fn provide(&mut self, provider: &str, amounts: &[u128]) -> Result<u128, ContractError> {
        if amounts.len() != self.shares.len() {
            return Err(ContractError::AmountMismatch);
        }

        let added = amounts
            .iter()
            .try_fold(0u128, |acc, amount| acc.checked_add(*amount))
            .ok_or_else(pool_overflow)?;
        if added == 0 {
            return Err(ContractError::ZeroAmount);
        }

        let new_total = self.total_liquidity.checked_add(added).ok_or_else(pool_overflow)?;

        // Contributions only grow while swaps can shrink the total
        let contribution = self.contribution(provider).checked_add(added).ok_or_else(pool_overflow)?;

        // Every slot fits because each is at most the total
        for (share, amount) in self.shares.iter_mut().zip(amounts) {
            *share += amount;
        }
        self.total_liquidity = new_total;
        self.providers.insert(provider.to_string(), contribution);

        Ok(added)
    }

    /// Price a swap without executing it
    pub fn quote(&self, input_index: usize, output_index: usize, input_amount: u128) -> Result<SwapResult, ContractError> {
        let n = self.shares.len();
        if input_index >= n || output_index >= n || input_index == output_index {
            return Err(ContractError::InvalidOptionIndex);
        }

        if input_amount == 0 {
            return Err(ContractError::ZeroAmount);
        }

        let reserve_in = self.shares[input_index];
        let reserve_out = self.shares[output_index];

        // Inputs larger than the opposite reserve have no meaningful price
        if input_amount > reserve_out {
            return Err(ContractError::InsufficientLiquidity);
        }

        let (fee, output_amount) = compute_output(input_amount, reserve_in, reserve_out)
            .ok_or(ContractError::InsufficientLiquidity)?;

        if output_amount == 0 {
            return Err(ContractError::InsufficientLiquidity);
        }

        Ok(SwapResult {
            input_index,
            output_index,
            input_amount,
            fee,
            output_amount,
        })
    }

    /// Execute a swap from `input_index` shares into `output_index` shares
    pub fn swap(&mut self, input_index: usize, output_index: usize, input_amount: u128) -> Result<SwapResult, ContractError> {
        let result = self.quote(input_index, output_index, input_amount)?;

        // Output never exceeds its reserve, so only the input side can overflow
        let new_total = (self.total_liquidity - result.output_amount)
            .checked_add(input_amount)
            .ok_or_else(pool_overflow)?;
        let new_input_reserve = self.shares[input_index]
            .checked_add(input_amount)
            .ok_or_else(pool_overflow)?;

        self.shares[input_index] = new_input_reserve;
        self.shares[output_index] -= result.output_amount;
        self.total_liquidity = new_total;

        Ok(result)
    }

    /// Total contributed by `provider`
    pub fn contribution(&self, provider: &str) -> u128 {
        self.providers.get(provider).copied().unwrap_or(0)
    }

    /// Implied probability of each option
    ///
    /// Price(i) = (total - shares[i]) / (total * (n - 1)). Prices sum to 1.
    pub fn spot_prices(&self) -> Vec<Decimal> {
        let n = self.shares.len();
        if n == 0 {
            return Vec::new();
        }

        let equal = Decimal::ONE / Decimal::from(n as u64);
        if self.total_liquidity == 0 || n == 1 {
            return vec![equal; n];
        }

        let total = match Decimal::from_u128(self.total_liquidity) {
            Some(total) => total,
            None => return vec![equal; n],
        };
        let denominator = total * Decimal::from((n - 1) as u64);

        self.shares
            .iter()
            .map(|share| {
                let share = Decimal::from_u128(*share).unwrap_or(total);
                (total - share) / denominator
            })
            .collect()
    }

    /// Record form returned by `get-liquidity-pool`
    pub fn to_value(&self) -> TypedValue {
        TypedValue::tuple([
            ("total-liquidity", TypedValue::uint(self.total_liquidity)),
            ("shares", TypedValue::uint_list(self.shares.iter().copied())),
        ])
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ALICE: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    const BOB: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

    fn seeded_pool() -> LiquidityPool {
        let mut pool = LiquidityPool::new(1, 2);
        pool.provide(ALICE, &[100000000, 100000000]).unwrap();
        pool
    }

    #[test]
    fn test_provide_liquidity() {
        let pool = seeded_pool();

        assert_eq!(pool.total_liquidity, 200000000);
        assert_eq!(pool.shares, vec![100000000, 100000000]);
        assert_eq!(pool.contribution(ALICE), 200000000);
    }

    #[test]
    fn test_provide_accumulates() {
        let mut pool = seeded_pool();
        pool.provide(BOB, &[5, 15]).unwrap();
        pool.provide(ALICE, &[1, 0]).unwrap();

        assert_eq!(pool.total_liquidity, 200000021);
        assert_eq!(pool.shares.iter().sum::<u128>(), pool.total_liquidity);
        assert_eq!(pool.contribution(BOB), 20);
        assert_eq!(pool.contribution(ALICE), 200000001);
        assert_eq!(pool.contribution("nobody"), 0);
    }

    #[test]
    fn test_provide_mismatched_amounts() {
        let mut pool = LiquidityPool::new(1, 2);

        let result = pool.provide(ALICE, &[100000000, 100000000, 100000000]);
        assert_eq!(result, Err(ContractError::AmountMismatch));
        assert_eq!(pool.total_liquidity, 0);
    }

    #[test]
    fn test_provide_all_zero() {
        let mut pool = LiquidityPool::new(1, 3);
        assert_eq!(pool.provide(ALICE, &[0, 0, 0]), Err(ContractError::ZeroAmount));
    }

    #[test]
    fn test_swap_output_with_fee() {
        let mut pool = seeded_pool();

        let swap = pool.swap(0, 1, 50000000).unwrap();

        // fee = 1_000_000, effective = 49_000_000
        // output = 100_000_000 * 49_000_000 / 149_000_000
        assert_eq!(swap.fee, 1000000);
        assert_eq!(swap.output_amount, 32885906);
        assert_eq!(pool.shares, vec![150000000, 67114094]);
        assert_eq!(pool.total_liquidity, 217114094);
    }

    #[test]
    fn test_swap_has_slippage() {
        let pool = seeded_pool();

        let swap = pool.quote(0, 1, 50000000).unwrap();

        // Naive proportional amount is input * y / x
        let naive = 50000000u128 * pool.shares[1] / pool.shares[0];
        assert!(swap.output_amount > 0);
        assert!(swap.output_amount < naive);
    }

    #[test]
    fn test_price_impact_increases_with_size() {
        let pool = seeded_pool();

        let small = pool.quote(0, 1, 1000000).unwrap();
        let large = pool.quote(0, 1, 50000000).unwrap();

        // Output per unit of input falls as the trade grows
        assert!(small.output_amount * 50 > large.output_amount);
    }

    #[test]
    fn test_quote_leaves_pool_untouched() {
        let pool = seeded_pool();
        let before = pool.clone();

        pool.quote(1, 0, 1234).unwrap();
        assert_eq!(pool, before);
    }

    #[test]
    fn test_oversized_swap() {
        let mut pool = seeded_pool();

        let result = pool.swap(0, 1, 10000000000);
        assert_eq!(result, Err(ContractError::InsufficientLiquidity));
        assert_eq!(pool.shares, vec![100000000, 100000000]);
    }

    #[test]
    fn test_swap_that_would_overflow_total_is_rejected() {
        // Third option pads the total to just under the limit
        let mut pool = LiquidityPool::new(1, 3);
        pool.provide(ALICE, &[1000000, 1000000, u128::MAX - 2000005]).unwrap();
        let before = pool.clone();

        // Net change is input minus output, about +21
        let result = pool.swap(0, 1, 1000);
        assert!(matches!(result, Err(ContractError::BadArguments(_))));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_swap_near_limit_keeps_total_consistent() {
        let mut pool = LiquidityPool::new(1, 3);
        pool.provide(ALICE, &[1000000, 1000000, u128::MAX - 2001000]).unwrap();

        pool.swap(0, 1, 1000).unwrap();
        assert_eq!(pool.total_liquidity, pool.shares.iter().sum::<u128>());
    }

    #[test]
    fn test_contribution_overflow_is_rejected() {
        let half = u128::MAX / 2;
        let mut pool = LiquidityPool::new(1, 2);

        // Swaps shrink the total while the contribution keeps growing
        pool.provide(ALICE, &[1, half]).unwrap();
        pool.swap(0, 1, 1).unwrap();
        pool.provide(ALICE, &[0, half]).unwrap();
        pool.swap(0, 1, 1).unwrap();
        assert_eq!(pool.contribution(ALICE), u128::MAX);

        let before = pool.clone();
        let result = pool.provide(ALICE, &[0, u128::MAX / 4]);
        assert!(matches!(result, Err(ContractError::BadArguments(_))));
        assert_eq!(pool, before);

        // The same amount from someone else still fits
        pool.provide(BOB, &[0, u128::MAX / 4]).unwrap();
        assert_eq!(pool.total_liquidity, pool.shares.iter().sum::<u128>());
    }

    #[test]
    fn test_swap_rounding_to_zero_is_rejected() {
        let mut pool = LiquidityPool::new(1, 2);
        pool.provide(ALICE, &[1000000, 1]).unwrap();

        assert_eq!(pool.swap(0, 1, 1), Err(ContractError::InsufficientLiquidity));
    }

    #[test]
    fn test_swap_index_validation() {
        let mut pool = seeded_pool();

        assert_eq!(pool.swap(0, 2, 10), Err(ContractError::InvalidOptionIndex));
        assert_eq!(pool.swap(1, 1, 10), Err(ContractError::InvalidOptionIndex));
        assert_eq!(pool.swap(0, 1, 0), Err(ContractError::ZeroAmount));
    }

    #[test]
    fn test_spot_prices() {
        let mut pool = seeded_pool();
        assert_eq!(pool.spot_prices(), vec![dec!(0.5), dec!(0.5)]);

        pool.swap(0, 1, 50000000).unwrap();
        let prices = pool.spot_prices();

        // Option 1 became scarce, so it is now the more likely outcome
        assert!(prices[1] > prices[0]);
        assert!((prices[0] + prices[1] - Decimal::ONE).abs() < dec!(0.000001));
    }

    #[test]
    fn test_spot_prices_multi_outcome() {
        let mut pool = LiquidityPool::new(7, 3);
        assert_eq!(pool.spot_prices().len(), 3);

        pool.provide(ALICE, &[1000, 1000, 1000]).unwrap();
        for price in pool.spot_prices() {
            assert!((price - dec!(0.3333)).abs() < dec!(0.001));
        }
    }

    #[test]
    fn test_pool_record_shape() {
        let record = seeded_pool().to_value();

        assert_eq!(record.field("total-liquidity"), Some(&TypedValue::uint(200000000)));
        assert_eq!(record.field("shares"), Some(&TypedValue::uint_list([100000000, 100000000])));
    }
}
