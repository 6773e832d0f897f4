/// Node RPC Client
///
/// HTTP transport for executing contract calls on a node.
/// Supports mock mode for local development without a live node: calls are
/// executed by an in-process `SimulatedChain` instead.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::transport::{CallResult, ContractCall, ContractTransport, TransportError};
use crate::chain::SimulatedChain;
use crate::config::GatewayConfig;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default timeout for node RPC calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path of the contract call endpoint, relative to the node URL
pub const CALL_PATH: &str = "/v2/contracts/call";

// ============================================================================
// NODE RPC CLIENT
// ============================================================================

/// Client for executing contract calls on a node
pub struct NodeClient {
    /// Node endpoint URL
    endpoint_url: Option<String>,

    /// HTTP client
    client: Client,

    /// Request timeout
    timeout: Duration,

    /// Executes calls in mock mode (no endpoint configured)
    local_chain: Option<Arc<SimulatedChain>>,
}

impl NodeClient {
    /// Create a client for `endpoint_url`, or a mock-mode client when `None`
    pub fn new(endpoint_url: Option<String>) -> Self {
        Self::with_timeout(endpoint_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint_url: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let endpoint_url = endpoint_url.map(|url| url.trim_end_matches('/').to_string());
        let local_chain = match endpoint_url {
            Some(_) => None,
            None => Some(Arc::new(SimulatedChain::new())),
        };

        NodeClient {
            endpoint_url,
            client,
            timeout,
            local_chain,
        }
    }

    /// Create NodeClient from gateway configuration
    ///
    /// In mock mode the local chain uses the configured contract names.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut client = Self::with_timeout(config.node_url.clone(), config.rpc_timeout);
        if client.is_mock_mode() {
            client.local_chain = Some(Arc::new(SimulatedChain::with_contract_names(
                &config.market_contract,
                &config.amm_contract,
            )));
        }
        client
    }

    /// Mock-mode client backed by an existing chain
    pub fn mock(chain: Arc<SimulatedChain>) -> Self {
        let mut client = Self::new(None);
        client.local_chain = Some(chain);
        client
    }

    /// Check if connected to a node (not in mock mode)
    pub fn is_connected(&self) -> bool {
        self.local_chain.is_none()
    }

    pub fn is_mock_mode(&self) -> bool {
        self.local_chain.is_some()
    }

    /// Get the endpoint URL (if connected)
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Chain executing calls in mock mode
    pub fn local_chain(&self) -> Option<&Arc<SimulatedChain>> {
        self.local_chain.as_ref()
    }

    /// Execute a call via the node's HTTP endpoint
    async fn call_remote(&self, url: &str, call: &ContractCall) -> Result<CallResult, TransportError> {
        let url = format!("{}{}", url, CALL_PATH);
        debug!(url = %url, contract = %call.contract, function = %call.function, "sending contract call");

        let response = self.client
            .post(&url)
            .json(call)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(TransportError::RequestFailed(
                format!("Node returned status {}", response.status())
            ));
        }

        response
            .json::<CallResult>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

impl Default for NodeClient {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ContractTransport for NodeClient {
    async fn call(&self, call: ContractCall) -> Result<CallResult, TransportError> {
        if let Some(chain) = &self.local_chain {
            return chain.call(call).await;
        }

        match &self.endpoint_url {
            Some(url) => self.call_remote(url, &call).await,
            None => Err(TransportError::RequestFailed("no node endpoint configured".to_string())),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::TypedValue;

    #[test]
    fn test_client_creation() {
        // Without URL - should be in mock mode
        let client = NodeClient::new(None);
        assert!(client.is_mock_mode());
        assert!(!client.is_connected());
        assert!(client.endpoint_url().is_none());
        assert!(client.local_chain().is_some());

        // With URL - should be connected
        let client = NodeClient::new(Some("http://localhost:1234/".to_string()));
        assert!(!client.is_mock_mode());
        assert!(client.is_connected());
        assert_eq!(client.endpoint_url(), Some("http://localhost:1234"));
    }

    #[tokio::test]
    async fn test_from_config_uses_contract_names() {
        let config = GatewayConfig {
            amm_contract: "amm-v2".to_string(),
            ..GatewayConfig::default()
        };
        let client = NodeClient::from_config(&config);
        assert!(client.is_mock_mode());

        let call = ContractCall::new("ST1TEST", "amm-v2", "get-liquidity-pool", vec![TypedValue::uint(1)]);
        let result = client.call(call).await.unwrap();
        assert_eq!(result.error.as_deref(), Some("err-u404"));

        let call = ContractCall::new("ST1TEST", "amm", "get-liquidity-pool", vec![TypedValue::uint(1)]);
        let result = client.call(call).await.unwrap();
        assert_eq!(result.error.as_deref(), Some("unknown-contract: amm"));
    }

    #[tokio::test]
    async fn test_mock_mode_executes_locally() {
        let client = NodeClient::new(None);

        let call = ContractCall::new(
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            "market-creation",
            "get-market-count",
            vec![],
        );
        let result = client.call(call).await.unwrap();

        assert!(result.success);
        assert_eq!(result.value, Some(TypedValue::uint(0)));
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        // Port 9 (discard) is closed on test machines
        let client = NodeClient::with_timeout(Some("http://127.0.0.1:9".to_string()), Duration::from_secs(2));

        let call = ContractCall::new("ST1TEST", "amm", "get-liquidity-pool", vec![TypedValue::uint(1)]);
        let result = client.call(call).await;

        assert!(matches!(
            result,
            Err(TransportError::RequestFailed(_)) | Err(TransportError::Timeout)
        ));
    }
}
