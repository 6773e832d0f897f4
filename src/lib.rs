/// Prediction Market Gateway
/// Off-chain reference model of the market-creation and amm contracts,
/// reached through a single contract-call boundary

pub mod values;
pub mod errors;
pub mod contracts;
pub mod chain;
pub mod client;
pub mod config;
pub mod app_state;
pub mod handlers;
pub mod routes;

#[path = "../rpc/mod.rs"]
pub mod rpc;

pub use values::TypedValue;
pub use errors::{ContractError, error_code};
pub use contracts::{Market, MarketId, MarketRegistry, MarketStatus, LiquidityPool, SwapResult, MAX_OPTIONS, MIN_OPTIONS, SWAP_FEE_BPS};
pub use chain::{SimulatedChain, ChainSnapshot, ActivityEntry};
pub use client::{MarketGateway, GatewayError, PoolInfo};
pub use config::GatewayConfig;
pub use rpc::{ContractCall, CallResult, ContractTransport, TransportError, NodeClient, ScriptedTransport};
