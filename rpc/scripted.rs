/// Scripted transport for tests
///
/// Returns preprogrammed responses instead of executing anything and keeps a
/// log of every call it received, so tests can assert on both what went out
/// and what came back.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::transport::{CallResult, ContractCall, ContractTransport, TransportError};

#[derive(Debug, Default)]
struct Script {
    /// One-shot responses, consumed in order
    queued: VecDeque<CallResult>,
    /// Returned whenever the queue is empty
    fallback: Option<CallResult>,
    calls: Vec<ContractCall>,
}

/// Deterministic test double for [`ContractTransport`]
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `result` to every call until changed
    pub fn respond_with(&self, result: CallResult) {
        self.lock().fallback = Some(result);
    }

    /// Respond with `result` to the next call only
    pub fn push_response(&self, result: CallResult) {
        self.lock().queued.push_back(result);
    }

    /// Drop all responses and recorded calls
    pub fn reset(&self) {
        *self.lock() = Script::default();
    }

    /// Every call received so far, oldest first
    pub fn calls(&self) -> Vec<ContractCall> {
        self.lock().calls.clone()
    }

    pub fn last_call(&self) -> Option<ContractCall> {
        self.lock().calls.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // Poisoned by a panicking test; the script is still usable
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ContractTransport for ScriptedTransport {
    async fn call(&self, call: ContractCall) -> Result<CallResult, TransportError> {
        let mut script = self.lock();
        script.calls.push(call);

        match script.queued.pop_front() {
            Some(result) => Ok(result),
            None => script.fallback.clone().ok_or(TransportError::NoResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::TypedValue;

    fn call(function: &str) -> ContractCall {
        ContractCall::new("ST1TEST", "amm", function, vec![TypedValue::uint(1)])
    }

    #[tokio::test]
    async fn test_queued_then_fallback() {
        let transport = ScriptedTransport::new();
        transport.respond_with(CallResult::err("err-u404"));
        transport.push_response(CallResult::ok(TypedValue::bool(true)));

        let first = transport.call(call("provide-liquidity")).await.unwrap();
        let second = transport.call(call("get-liquidity-pool")).await.unwrap();

        assert!(first.success);
        assert_eq!(second.error.as_deref(), Some("err-u404"));
        assert_eq!(transport.calls().len(), 2);
        assert_eq!(transport.last_call().unwrap().function, "get-liquidity-pool");
    }

    #[tokio::test]
    async fn test_empty_script_is_a_transport_error() {
        let transport = ScriptedTransport::new();

        let result = transport.call(call("swap")).await;
        assert!(matches!(result, Err(TransportError::NoResponse)));
    }

    #[test]
    fn test_reset_clears_everything() {
        let transport = ScriptedTransport::new();
        transport.respond_with(CallResult::ok(TypedValue::uint(1)));
        tokio_test::block_on(transport.call(call("swap"))).unwrap();

        transport.reset();

        assert!(transport.calls().is_empty());
        assert!(tokio_test::block_on(transport.call(call("swap"))).is_err());
    }
}
