// Gateway configuration loaded from the environment

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::chain::{DEFAULT_AMM_CONTRACT, DEFAULT_MARKET_CONTRACT};
use crate::rpc::node_client::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:1234";

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// Node endpoint; `None` runs in mock mode
    pub node_url: Option<String>,

    pub market_contract: String,
    pub amm_contract: String,

    /// Where the chain snapshot is saved on shutdown and restored on startup
    pub state_file: Option<PathBuf>,

    pub rpc_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 1234)),
            node_url: None,
            market_contract: DEFAULT_MARKET_CONTRACT.to_string(),
            amm_contract: DEFAULT_AMM_CONTRACT.to_string(),
            state_file: None,
            rpc_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Load from process environment, after reading `.env` if present
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let bind_addr = match get("GATEWAY_BIND") {
            Some(addr) => addr
                .parse::<SocketAddr>()
                .map_err(|e| format!("Invalid GATEWAY_BIND '{}': {}", addr, e))?,
            None => defaults.bind_addr,
        };

        let rpc_timeout = match get("RPC_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .map_err(|e| format!("Invalid RPC_TIMEOUT_SECS '{}': {}", secs, e))?,
            ),
            None => defaults.rpc_timeout,
        };

        Ok(Self {
            bind_addr,
            node_url: get("NODE_RPC_URL"),
            market_contract: get("MARKET_CONTRACT").unwrap_or(defaults.market_contract),
            amm_contract: get("AMM_CONTRACT").unwrap_or(defaults.amm_contract),
            state_file: get("STATE_FILE").map(PathBuf::from),
            rpc_timeout,
        })
    }
}
