// Application state management

use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::{ChainSnapshot, SimulatedChain};
use crate::config::GatewayConfig;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub chain: Arc<SimulatedChain>,
    pub config: GatewayConfig,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        info!("🚀 Initializing prediction market gateway...");

        let chain = match Self::load_from_disk(&config) {
            Ok(Some(chain)) => {
                info!("✅ Loaded persisted chain state from disk");
                chain
            }
            Ok(None) => {
                info!("ℹ️  No persisted state found, starting fresh");
                SimulatedChain::with_contract_names(&config.market_contract, &config.amm_contract)
            }
            Err(e) => {
                warn!("⚠️  Failed to load persisted state, starting fresh: {}", e);
                SimulatedChain::with_contract_names(&config.market_contract, &config.amm_contract)
            }
        };

        info!(
            market_contract = %config.market_contract,
            amm_contract = %config.amm_contract,
            markets = chain.market_count(),
            "✅ Simulated chain ready"
        );

        Self {
            chain: Arc::new(chain),
            config,
        }
    }

    fn load_from_disk(config: &GatewayConfig) -> Result<Option<SimulatedChain>, String> {
        let path = match &config.state_file {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        };

        let snapshot = ChainSnapshot::load(path)?;
        Ok(Some(SimulatedChain::from_snapshot(
            snapshot,
            &config.market_contract,
            &config.amm_contract,
        )))
    }

    /// Write the chain snapshot to the configured state file, if any
    pub async fn save_to_disk(&self) -> Result<(), String> {
        let path = match &self.config.state_file {
            Some(path) => path,
            None => return Ok(()),
        };

        self.chain.snapshot().await.save(path)?;
        info!("💾 State saved to {}", path.display());
        Ok(())
    }
}
