/// Contract call boundary
///
/// Every contract interaction is one `ContractCall` in and one `CallResult`
/// out. Implementations decide where the call executes: in-process, over
/// HTTP, or a scripted test double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::ContractError;
use crate::values::TypedValue;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Failure to deliver a call or read its response.
///
/// Contract failures are not transport failures; those arrive as a
/// `CallResult` with `success: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransportError {
    /// HTTP request failed
    RequestFailed(String),
    /// Response could not be decoded
    InvalidResponse(String),
    /// Timeout waiting for the node
    Timeout,
    /// Scripted transport has nothing queued
    NoResponse,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::RequestFailed(msg) => write!(f, "Node request failed: {}", msg),
            TransportError::InvalidResponse(msg) => write!(f, "Invalid node response: {}", msg),
            TransportError::Timeout => write!(f, "Node RPC timeout"),
            TransportError::NoResponse => write!(f, "No scripted response available"),
        }
    }
}

impl std::error::Error for TransportError {}

// ============================================================================
// REQUEST/RESPONSE TYPES
// ============================================================================

/// A single contract function invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    /// Principal on whose behalf the call executes
    pub sender: String,
    /// Contract name (e.g., "amm")
    pub contract: String,
    /// Function name (e.g., "swap")
    pub function: String,
    /// Ordered arguments
    #[serde(default)]
    pub args: Vec<TypedValue>,
}

impl ContractCall {
    pub fn new(
        sender: impl Into<String>,
        contract: impl Into<String>,
        function: impl Into<String>,
        args: Vec<TypedValue>,
    ) -> Self {
        Self {
            sender: sender.into(),
            contract: contract.into(),
            function: function.into(),
            args,
        }
    }
}

/// Outcome of a contract call
///
/// `{"success": true, "value": {...}}` or `{"success": false, "error": "err-u404"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<TypedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallResult {
    pub fn ok(value: TypedValue) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.into()),
        }
    }

    /// Split into value or verbatim error text
    pub fn into_result(self) -> Result<Option<TypedValue>, String> {
        if self.success {
            Ok(self.value)
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

impl From<Result<TypedValue, ContractError>> for CallResult {
    fn from(result: Result<TypedValue, ContractError>) -> Self {
        match result {
            Ok(value) => CallResult::ok(value),
            Err(e) => CallResult::err(e.to_string()),
        }
    }
}

// ============================================================================
// TRANSPORT
// ============================================================================

/// Executes contract calls somewhere
#[async_trait]
pub trait ContractTransport: Send + Sync {
    async fn call(&self, call: ContractCall) -> Result<CallResult, TransportError>;
}

#[async_trait]
impl<T: ContractTransport + ?Sized> ContractTransport for Arc<T> {
    async fn call(&self, call: ContractCall) -> Result<CallResult, TransportError> {
        (**self).call(call).await
    }
}

#[async_trait]
impl<T: ContractTransport + ?Sized> ContractTransport for Box<T> {
    async fn call(&self, call: ContractCall) -> Result<CallResult, TransportError> {
        (**self).call(call).await
    }
}
