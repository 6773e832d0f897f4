/// In-memory chain executing the market-creation and amm contracts
///
/// Stands in for the blockchain: calls are routed by contract and function
/// name, arguments are decoded from typed values and each call resolves to
/// exactly one `CallResult`. Calls touching the same pool are serialized by
/// that pool's lock; calls on different markets do not wait for each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::contracts::{Args, LiquidityPool, Market, MarketId, MarketRegistry, SwapResult};
use crate::errors::ContractError;
use crate::rpc::{CallResult, ContractCall, ContractTransport, TransportError};
use crate::values::TypedValue;

// ============================================================================
// CONSTANTS
// ============================================================================

pub const DEFAULT_MARKET_CONTRACT: &str = "market-creation";
pub const DEFAULT_AMM_CONTRACT: &str = "amm";

/// Activity entries kept before the oldest are dropped
pub const MAX_ACTIVITY_ENTRIES: usize = 1000;

type PoolSlot = Arc<AsyncMutex<Option<LiquidityPool>>>;

// ============================================================================
// ACTIVITY LOG
// ============================================================================

/// One executed call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub contract: String,
    pub function: String,
    pub success: bool,
    /// Returned value or error text
    pub outcome: String,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Serializable copy of all contract state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub registry: MarketRegistry,
    pub pools: BTreeMap<MarketId, LiquidityPool>,
}

impl ChainSnapshot {
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize state: {}", e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }

        std::fs::write(path, json).map_err(|e| format!("Failed to write state file: {}", e))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read state file: {}", e))?;

        serde_json::from_str(&json).map_err(|e| format!("Failed to deserialize state: {}", e))
    }
}

// ============================================================================
// SIMULATED CHAIN
// ============================================================================

/// In-process executor for both contracts
pub struct SimulatedChain {
    market_contract: String,
    amm_contract: String,

    registry: RwLock<MarketRegistry>,

    /// One slot per market that has ever had liquidity provided
    pools: Mutex<HashMap<MarketId, PoolSlot>>,

    activity: Mutex<VecDeque<ActivityEntry>>,
}

impl SimulatedChain {
    pub fn new() -> Self {
        Self::with_contract_names(DEFAULT_MARKET_CONTRACT, DEFAULT_AMM_CONTRACT)
    }

    pub fn with_contract_names(market_contract: impl Into<String>, amm_contract: impl Into<String>) -> Self {
        Self {
            market_contract: market_contract.into(),
            amm_contract: amm_contract.into(),
            registry: RwLock::new(MarketRegistry::new()),
            pools: Mutex::new(HashMap::new()),
            activity: Mutex::new(VecDeque::new()),
        }
    }

    /// Rebuild a chain from a snapshot
    pub fn from_snapshot(snapshot: ChainSnapshot, market_contract: &str, amm_contract: &str) -> Self {
        let chain = Self::with_contract_names(market_contract, amm_contract);
        *chain.registry_mut() = snapshot.registry;
        {
            let mut slots = chain.slots();
            for (id, pool) in snapshot.pools {
                slots.insert(id, Arc::new(AsyncMutex::new(Some(pool))));
            }
        }
        chain
    }

    /// Copy out all contract state
    pub async fn snapshot(&self) -> ChainSnapshot {
        let registry = self.registry().clone();

        let slots: Vec<(MarketId, PoolSlot)> = self
            .slots()
            .iter()
            .map(|(id, slot)| (*id, slot.clone()))
            .collect();

        let mut pools = BTreeMap::new();
        for (id, slot) in slots {
            if let Some(pool) = slot.lock().await.clone() {
                pools.insert(id, pool);
            }
        }

        ChainSnapshot { registry, pools }
    }

    pub fn market_contract(&self) -> &str {
        &self.market_contract
    }

    pub fn amm_contract(&self) -> &str {
        &self.amm_contract
    }

    // ========================================================================
    // LOCKS
    // ========================================================================

    fn registry(&self) -> std::sync::RwLockReadGuard<'_, MarketRegistry> {
        self.registry.read().unwrap_or_else(|p| p.into_inner())
    }

    fn registry_mut(&self) -> std::sync::RwLockWriteGuard<'_, MarketRegistry> {
        self.registry.write().unwrap_or_else(|p| p.into_inner())
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<MarketId, PoolSlot>> {
        self.pools.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Existing slot for a market, without creating one
    fn existing_slot(&self, id: MarketId) -> Option<PoolSlot> {
        self.slots().get(&id).cloned()
    }

    /// Slot for a market, created empty on first use
    fn slot(&self, id: MarketId) -> PoolSlot {
        self.slots()
            .entry(id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(None)))
            .clone()
    }

    /// Option count and status of a market, read under a short registry lock
    fn market_shape(&self, id: MarketId) -> Result<(usize, bool), ContractError> {
        let registry = self.registry();
        let market = registry.get_market(id)?;
        Ok((market.option_count(), market.status.is_trading_open()))
    }

    // ========================================================================
    // MARKET REGISTRY
    // ========================================================================

    pub fn create_market(
        &self,
        sender: &str,
        description: String,
        options: Vec<String>,
        resolution_time: u128,
        oracle: String,
    ) -> Result<MarketId, ContractError> {
        let id = self
            .registry_mut()
            .create_market(sender, description, options, resolution_time, oracle)?;
        info!(market_id = id, creator = sender, "📊 market created");
        Ok(id)
    }

    pub fn get_market(&self, id: MarketId) -> Result<Market, ContractError> {
        self.registry().get_market(id).cloned()
    }

    pub fn update_market_status(&self, sender: &str, id: MarketId, new_status: &str) -> Result<(), ContractError> {
        let previous = self.registry_mut().update_market_status(sender, id, new_status)?;
        info!(market_id = id, from = %previous, to = new_status, "market status updated");
        Ok(())
    }

    pub fn market_count(&self) -> u64 {
        self.registry().market_count()
    }

    // ========================================================================
    // LIQUIDITY POOL
    // ========================================================================

    pub async fn provide_liquidity(&self, sender: &str, id: MarketId, amounts: &[u128]) -> Result<(), ContractError> {
        // Existence first, so unknown ids never get a slot
        self.market_shape(id)?;

        let slot = self.slot(id);
        let mut guard = slot.lock().await;

        let (option_count, trading_open) = self.market_shape(id)?;
        if !trading_open {
            return Err(ContractError::MarketNotActive);
        }
        if amounts.len() != option_count {
            return Err(ContractError::AmountMismatch);
        }

        // Build on a copy so a failed call never leaves an empty pool behind
        let mut pool = guard.clone().unwrap_or_else(|| LiquidityPool::new(id, option_count));
        let added = pool.provide(sender, amounts)?;
        let total = pool.total_liquidity;
        *guard = Some(pool);

        info!(market_id = id, provider = sender, added = %added, total = %total, "💧 liquidity provided");
        Ok(())
    }

    pub async fn get_liquidity_pool(&self, id: MarketId) -> Result<LiquidityPool, ContractError> {
        let slot = self.existing_slot(id).ok_or(ContractError::NotFound)?;
        let guard = slot.lock().await;
        guard.clone().ok_or(ContractError::NotFound)
    }

    pub async fn swap(
        &self,
        sender: &str,
        id: MarketId,
        input_index: usize,
        output_index: usize,
        input_amount: u128,
    ) -> Result<SwapResult, ContractError> {
        let slot = self.existing_slot(id).ok_or(ContractError::NotFound)?;
        let mut guard = slot.lock().await;
        let pool = guard.as_mut().ok_or(ContractError::NotFound)?;

        let (_, trading_open) = self.market_shape(id)?;
        if !trading_open {
            return Err(ContractError::MarketNotActive);
        }

        let result = pool.swap(input_index, output_index, input_amount)?;
        info!(
            market_id = id,
            trader = sender,
            input = %result.input_amount,
            output = %result.output_amount,
            "🔄 swap executed"
        );
        Ok(result)
    }

    pub async fn quote_swap(
        &self,
        id: MarketId,
        input_index: usize,
        output_index: usize,
        input_amount: u128,
    ) -> Result<SwapResult, ContractError> {
        let slot = self.existing_slot(id).ok_or(ContractError::NotFound)?;
        let guard = slot.lock().await;
        let pool = guard.as_ref().ok_or(ContractError::NotFound)?;

        let (_, trading_open) = self.market_shape(id)?;
        if !trading_open {
            return Err(ContractError::MarketNotActive);
        }

        pool.quote(input_index, output_index, input_amount)
    }

    pub async fn provider_liquidity(&self, id: MarketId, provider: &str) -> Result<u128, ContractError> {
        Ok(self.get_liquidity_pool(id).await?.contribution(provider))
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    /// Route a call to its contract function
    pub async fn execute(&self, call: &ContractCall) -> Result<TypedValue, ContractError> {
        if call.contract == self.market_contract {
            self.execute_market(call)
        } else if call.contract == self.amm_contract {
            self.execute_amm(call).await
        } else {
            Err(ContractError::UnknownContract(call.contract.clone()))
        }
    }

    fn execute_market(&self, call: &ContractCall) -> Result<TypedValue, ContractError> {
        let mut args = Args::new(&call.function, &call.args);

        match call.function.as_str() {
            "create-market" => {
                let description = args.string_utf8("description")?;
                let options = args.utf8_list("options")?;
                let resolution_time = args.uint("resolution-time")?;
                let oracle = args.principal("oracle")?;
                args.finish()?;

                let id = self.create_market(&call.sender, description, options, resolution_time, oracle)?;
                Ok(TypedValue::uint(id as u128))
            }
            "get-market" => {
                let id = args.market_id("market-id")?;
                args.finish()?;
                Ok(self.get_market(id)?.to_value())
            }
            "update-market-status" => {
                let id = args.market_id("market-id")?;
                let status = args.string_ascii("new-status")?;
                args.finish()?;

                self.update_market_status(&call.sender, id, &status)?;
                Ok(TypedValue::bool(true))
            }
            "get-market-count" => {
                args.finish()?;
                Ok(TypedValue::uint(self.market_count() as u128))
            }
            other => Err(ContractError::UnknownFunction(other.to_string())),
        }
    }

    async fn execute_amm(&self, call: &ContractCall) -> Result<TypedValue, ContractError> {
        let mut args = Args::new(&call.function, &call.args);

        match call.function.as_str() {
            "provide-liquidity" => {
                let id = args.market_id("market-id")?;
                let amounts = args.uint_list("amounts")?;
                args.finish()?;

                self.provide_liquidity(&call.sender, id, &amounts).await?;
                Ok(TypedValue::bool(true))
            }
            "get-liquidity-pool" => {
                let id = args.market_id("market-id")?;
                args.finish()?;
                Ok(self.get_liquidity_pool(id).await?.to_value())
            }
            "swap" => {
                let id = args.market_id("market-id")?;
                let input_index = args.index("input-index")?;
                let output_index = args.index("output-index")?;
                let input_amount = args.uint("input-amount")?;
                args.finish()?;

                let result = self.swap(&call.sender, id, input_index, output_index, input_amount).await?;
                Ok(TypedValue::uint(result.output_amount))
            }
            "get-swap-quote" => {
                let id = args.market_id("market-id")?;
                let input_index = args.index("input-index")?;
                let output_index = args.index("output-index")?;
                let input_amount = args.uint("input-amount")?;
                args.finish()?;

                let result = self.quote_swap(id, input_index, output_index, input_amount).await?;
                Ok(TypedValue::uint(result.output_amount))
            }
            "get-provider-liquidity" => {
                let id = args.market_id("market-id")?;
                let provider = args.principal("provider")?;
                args.finish()?;
                Ok(TypedValue::uint(self.provider_liquidity(id, &provider).await?))
            }
            other => Err(ContractError::UnknownFunction(other.to_string())),
        }
    }

    // ========================================================================
    // ACTIVITY
    // ========================================================================

    fn record(&self, call: &ContractCall, result: &CallResult) {
        let outcome = match (&result.value, &result.error) {
            (Some(value), _) => value.to_string(),
            (None, Some(error)) => error.clone(),
            (None, None) => String::new(),
        };

        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sender: call.sender.clone(),
            contract: call.contract.clone(),
            function: call.function.clone(),
            success: result.success,
            outcome,
        };

        let mut activity = self.activity.lock().unwrap_or_else(|p| p.into_inner());
        activity.push_back(entry);
        while activity.len() > MAX_ACTIVITY_ENTRIES {
            activity.pop_front();
        }
    }

    /// Most recent activity, newest last
    pub fn activity(&self, limit: usize) -> Vec<ActivityEntry> {
        let activity = self.activity.lock().unwrap_or_else(|p| p.into_inner());
        let skip = activity.len().saturating_sub(limit);
        activity.iter().skip(skip).cloned().collect()
    }
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractTransport for SimulatedChain {
    async fn call(&self, call: ContractCall) -> Result<CallResult, TransportError> {
        let result = CallResult::from(self.execute(&call).await);

        if result.success {
            debug!(contract = %call.contract, function = %call.function, "call succeeded");
        } else {
            warn!(
                contract = %call.contract,
                function = %call.function,
                error = result.error.as_deref().unwrap_or(""),
                "call failed"
            );
        }

        self.record(&call, &result);
        Ok(result)
    }
}

// ============================================================================
// TESTS
// ============================================================================
