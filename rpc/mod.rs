// ============================================================================
// RPC Module - Contract Call Gateway Transports
// ============================================================================
//
// This module holds the single boundary through which contract calls travel,
// and the transports that implement it.
//
// Components:
//   - transport:   ContractCall / CallResult and the ContractTransport trait
//   - node_client: HTTP transport with an in-process mock mode
//   - scripted:    preprogrammed test double that records calls
//
// ============================================================================

pub mod transport;
pub mod node_client;
pub mod scripted;

pub use transport::*;
pub use node_client::*;
pub use scripted::*;
