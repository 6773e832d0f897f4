/// Typed client for the market-creation and amm contracts
///
/// Wraps any `ContractTransport`, encodes arguments as typed values and
/// decodes results back into Rust types. Contract failures are returned
/// verbatim inside `GatewayError::Contract`.

use serde::{Deserialize, Serialize};

use crate::chain::{DEFAULT_AMM_CONTRACT, DEFAULT_MARKET_CONTRACT};
use crate::contracts::{Market, MarketId, MarketStatus};
use crate::errors::{error_code, ContractError};
use crate::rpc::{CallResult, ContractCall, ContractTransport, TransportError};
use crate::values::TypedValue;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub enum GatewayError {
    /// Call never produced a result
    Transport(TransportError),
    /// Contract rejected the call; carries the error text as returned
    Contract(String),
    /// Result had an unexpected shape
    Decode(String),
}

impl GatewayError {
    /// The `err-u<code>` number, if this is a contract rejection
    pub fn code(&self) -> Option<u32> {
        match self {
            GatewayError::Contract(error) => error_code(error),
            _ => None,
        }
    }

    pub fn contract_error(&self) -> Option<ContractError> {
        match self {
            GatewayError::Contract(error) => ContractError::parse(error),
            _ => None,
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Transport(e) => write!(f, "transport error: {}", e),
            GatewayError::Contract(error) => write!(f, "contract error: {}", error),
            GatewayError::Decode(msg) => write!(f, "unexpected result: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<TransportError> for GatewayError {
    fn from(e: TransportError) -> Self {
        GatewayError::Transport(e)
    }
}

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Pool record as returned by `get-liquidity-pool`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub total_liquidity: u128,
    pub shares: Vec<u128>,
}

// ============================================================================
// MARKET GATEWAY
// ============================================================================

/// Typed access to both contracts on behalf of one sender
pub struct MarketGateway<T> {
    transport: T,
    sender: String,
    market_contract: String,
    amm_contract: String,
}

impl<T: ContractTransport> MarketGateway<T> {
    pub fn new(transport: T, sender: impl Into<String>) -> Self {
        Self::with_contracts(transport, sender, DEFAULT_MARKET_CONTRACT, DEFAULT_AMM_CONTRACT)
    }

    pub fn with_contracts(
        transport: T,
        sender: impl Into<String>,
        market_contract: impl Into<String>,
        amm_contract: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            sender: sender.into(),
            market_contract: market_contract.into(),
            amm_contract: amm_contract.into(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Same transport and contracts, different sender
    pub fn as_sender(&self, sender: impl Into<String>) -> MarketGateway<T>
    where
        T: Clone,
    {
        Self::with_contracts(
            self.transport.clone(),
            sender,
            self.market_contract.clone(),
            self.amm_contract.clone(),
        )
    }

    /// Send an arbitrary call and return the raw result
    pub async fn call(&self, contract: &str, function: &str, args: Vec<TypedValue>) -> Result<CallResult, TransportError> {
        let call = ContractCall::new(self.sender.clone(), contract, function, args);
        self.transport.call(call).await
    }

    async fn invoke(&self, contract: &str, function: &str, args: Vec<TypedValue>) -> Result<Option<TypedValue>, GatewayError> {
        self.call(contract, function, args)
            .await?
            .into_result()
            .map_err(GatewayError::Contract)
    }

    async fn invoke_value(&self, contract: &str, function: &str, args: Vec<TypedValue>) -> Result<TypedValue, GatewayError> {
        self.invoke(contract, function, args)
            .await?
            .ok_or_else(|| GatewayError::Decode(format!("{} returned no value", function)))
    }

    async fn invoke_uint(&self, contract: &str, function: &str, args: Vec<TypedValue>) -> Result<u128, GatewayError> {
        let value = self.invoke_value(contract, function, args).await?;
        value
            .as_uint()
            .ok_or_else(|| GatewayError::Decode(format!("{} returned {}, expected uint", function, value.type_name())))
    }

    // ========================================================================
    // MARKET CREATION
    // ========================================================================

    /// Create a market; returns its id
    pub async fn create_market(
        &self,
        description: &str,
        options: &[&str],
        resolution_time: u128,
        oracle: &str,
    ) -> Result<MarketId, GatewayError> {
        let args = vec![
            TypedValue::string_utf8(description),
            TypedValue::list(options.iter().map(|o| TypedValue::string_utf8(*o))),
            TypedValue::uint(resolution_time),
            TypedValue::principal(oracle),
        ];

        let id = self.invoke_uint(&self.market_contract, "create-market", args).await?;
        MarketId::try_from(id).map_err(|_| GatewayError::Decode(format!("market id {} out of range", id)))
    }

    pub async fn get_market(&self, id: MarketId) -> Result<Market, GatewayError> {
        let value = self
            .invoke_value(&self.market_contract, "get-market", vec![TypedValue::uint(id as u128)])
            .await?;
        decode_market(id, &value)
    }

    pub async fn update_market_status(&self, id: MarketId, status: MarketStatus) -> Result<(), GatewayError> {
        let args = vec![TypedValue::uint(id as u128), TypedValue::string_ascii(status.as_str())];
        self.invoke(&self.market_contract, "update-market-status", args).await?;
        Ok(())
    }

    pub async fn market_count(&self) -> Result<u64, GatewayError> {
        let count = self.invoke_uint(&self.market_contract, "get-market-count", vec![]).await?;
        u64::try_from(count).map_err(|_| GatewayError::Decode(format!("market count {} out of range", count)))
    }

    // ========================================================================
    // AMM
    // ========================================================================

    pub async fn provide_liquidity(&self, id: MarketId, amounts: &[u128]) -> Result<bool, GatewayError> {
        let args = vec![TypedValue::uint(id as u128), TypedValue::uint_list(amounts.iter().copied())];
        let value = self.invoke_value(&self.amm_contract, "provide-liquidity", args).await?;
        value
            .as_bool()
            .ok_or_else(|| GatewayError::Decode(format!("provide-liquidity returned {}", value.type_name())))
    }

    pub async fn get_liquidity_pool(&self, id: MarketId) -> Result<PoolInfo, GatewayError> {
        let value = self
            .invoke_value(&self.amm_contract, "get-liquidity-pool", vec![TypedValue::uint(id as u128)])
            .await?;
        decode_pool(&value)
    }

    /// Swap `input_amount` of `input_index` shares; returns the output amount
    pub async fn swap(&self, id: MarketId, input_index: usize, output_index: usize, input_amount: u128) -> Result<u128, GatewayError> {
        let args = swap_args(id, input_index, output_index, input_amount);
        self.invoke_uint(&self.amm_contract, "swap", args).await
    }

    pub async fn quote_swap(&self, id: MarketId, input_index: usize, output_index: usize, input_amount: u128) -> Result<u128, GatewayError> {
        let args = swap_args(id, input_index, output_index, input_amount);
        self.invoke_uint(&self.amm_contract, "get-swap-quote", args).await
    }

    pub async fn provider_liquidity(&self, id: MarketId, provider: &str) -> Result<u128, GatewayError> {
        let args = vec![TypedValue::uint(id as u128), TypedValue::principal(provider)];
        self.invoke_uint(&self.amm_contract, "get-provider-liquidity", args).await
    }
}

fn swap_args(id: MarketId, input_index: usize, output_index: usize, input_amount: u128) -> Vec<TypedValue> {
    vec![
        TypedValue::uint(id as u128),
        TypedValue::uint(input_index as u128),
        TypedValue::uint(output_index as u128),
        TypedValue::uint(input_amount),
    ]
}

// ============================================================================
// DECODING
// ============================================================================

fn field<'a>(record: &'a TypedValue, name: &str) -> Result<&'a TypedValue, GatewayError> {
    record
        .field(name)
        .ok_or_else(|| GatewayError::Decode(format!("missing field {}", name)))
}

fn wrong(name: &str, expected: &str) -> GatewayError {
    GatewayError::Decode(format!("field {} is not {}", name, expected))
}

/// Decode a `get-market` record
pub fn decode_market(id: MarketId, record: &TypedValue) -> Result<Market, GatewayError> {
    let creator = field(record, "creator")?.as_principal().ok_or_else(|| wrong("creator", "principal"))?;
    let description = field(record, "description")?
        .as_string_utf8()
        .ok_or_else(|| wrong("description", "string-utf8"))?;
    let options = field(record, "options")?
        .as_list()
        .ok_or_else(|| wrong("options", "list"))?
        .iter()
        .map(|o| o.as_string_utf8().map(str::to_string).ok_or_else(|| wrong("options", "string-utf8 list")))
        .collect::<Result<Vec<_>, _>>()?;
    let resolution_time = field(record, "resolution-time")?
        .as_uint()
        .ok_or_else(|| wrong("resolution-time", "uint"))?;
    let oracle = field(record, "oracle")?.as_principal().ok_or_else(|| wrong("oracle", "principal"))?;
    let status_text = field(record, "status")?
        .as_string_ascii()
        .ok_or_else(|| wrong("status", "string-ascii"))?;
    let status = MarketStatus::parse(status_text)
        .ok_or_else(|| GatewayError::Decode(format!("unknown status {}", status_text)))?;

    Ok(Market {
        id,
        creator: creator.to_string(),
        description: description.to_string(),
        options,
        resolution_time,
        oracle: oracle.to_string(),
        status,
    })
}

/// Decode a `get-liquidity-pool` record
pub fn decode_pool(record: &TypedValue) -> Result<PoolInfo, GatewayError> {
    let total_liquidity = field(record, "total-liquidity")?
        .as_uint()
        .ok_or_else(|| wrong("total-liquidity", "uint"))?;
    let shares = field(record, "shares")?
        .as_list()
        .ok_or_else(|| wrong("shares", "list"))?
        .iter()
        .map(|s| s.as_uint().ok_or_else(|| wrong("shares", "uint list")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PoolInfo { total_liquidity, shares })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::ScriptedTransport;

    const ALICE: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    #[tokio::test]
    async fn test_encodes_swap_arguments() {
        let gateway = MarketGateway::new(ScriptedTransport::new(), ALICE);
        gateway.transport().respond_with(CallResult::ok(TypedValue::uint(49000000)));

        let output = gateway.swap(1, 0, 1, 50000000).await.unwrap();
        assert_eq!(output, 49000000);

        let call = gateway.transport().last_call().unwrap();
        assert_eq!(call.sender, ALICE);
        assert_eq!(call.contract, "amm");
        assert_eq!(call.function, "swap");
        assert_eq!(
            call.args,
            vec![
                TypedValue::uint(1),
                TypedValue::uint(0),
                TypedValue::uint(1),
                TypedValue::uint(50000000),
            ]
        );
    }

    #[tokio::test]
    async fn test_contract_error_is_verbatim() {
        let gateway = MarketGateway::new(ScriptedTransport::new(), ALICE);
        gateway.transport().respond_with(CallResult::err("err-u301"));

        let err = gateway.swap(1, 0, 1, 10000000000).await.unwrap_err();
        assert!(matches!(&err, GatewayError::Contract(e) if e == "err-u301"));
        assert_eq!(err.code(), Some(301));
        assert_eq!(err.contract_error(), Some(ContractError::InsufficientLiquidity));
    }

    #[tokio::test]
    async fn test_wrong_result_tag_is_decode_error() {
        let gateway = MarketGateway::new(ScriptedTransport::new(), ALICE);
        gateway.transport().respond_with(CallResult::ok(TypedValue::bool(true)));

        let err = gateway.market_count().await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn test_bare_success_for_status_update() {
        let gateway = MarketGateway::new(ScriptedTransport::new(), ALICE);
        gateway.transport().respond_with(CallResult {
            success: true,
            value: None,
            error: None,
        });

        assert!(gateway.update_market_status(1, MarketStatus::Resolved).await.is_ok());
        let call = gateway.transport().last_call().unwrap();
        assert_eq!(call.args[1], TypedValue::string_ascii("resolved"));
    }

    #[test]
    fn test_decode_pool_rejects_bad_shape() {
        let record = TypedValue::tuple([("total-liquidity", TypedValue::uint(1))]);
        assert!(matches!(decode_pool(&record), Err(GatewayError::Decode(_))));
    }
}
