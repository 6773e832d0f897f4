// HTTP request handlers for the gateway API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app_state::SharedState;
use crate::chain::ActivityEntry;
use crate::contracts::{LiquidityPool, Market, MarketId};
use crate::errors::ContractError;
use crate::rpc::{CallResult, ContractCall, ContractTransport};

type ApiError = (StatusCode, Json<Value>);

fn api_error(e: ContractError) -> ApiError {
    let status = match e {
        ContractError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "success": false, "error": e.to_string() })))
}

// ===== CONTRACT CALLS =====

/// Execute one contract call. Contract failures still answer 200; the
/// failure is in the body.
pub async fn call_contract(
    State(state): State<SharedState>,
    Json(call): Json<ContractCall>,
) -> Json<CallResult> {
    match state.chain.call(call).await {
        Ok(result) => Json(result),
        Err(e) => Json(CallResult::err(e.to_string())),
    }
}

// ===== READ-ONLY VIEWS =====

pub async fn get_market(
    State(state): State<SharedState>,
    Path(id): Path<MarketId>,
) -> Result<Json<Market>, ApiError> {
    state.chain.get_market(id).map(Json).map_err(api_error)
}

pub async fn get_pool(
    State(state): State<SharedState>,
    Path(id): Path<MarketId>,
) -> Result<Json<LiquidityPool>, ApiError> {
    state.chain.get_liquidity_pool(id).await.map(Json).map_err(api_error)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PricesResponse {
    pub market_id: MarketId,
    pub options: Vec<String>,
    pub prices: Vec<Decimal>,
}

pub async fn get_pool_prices(
    State(state): State<SharedState>,
    Path(id): Path<MarketId>,
) -> Result<Json<PricesResponse>, ApiError> {
    let market = state.chain.get_market(id).map_err(api_error)?;
    let pool = state.chain.get_liquidity_pool(id).await.map_err(api_error)?;

    Ok(Json(PricesResponse {
        market_id: id,
        options: market.options,
        prices: pool.spot_prices(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

pub async fn get_activity(
    State(state): State<SharedState>,
    Query(query): Query<ActivityQuery>,
) -> Json<Vec<ActivityEntry>> {
    Json(state.chain.activity(query.limit.unwrap_or(100)))
}

pub async fn health_check(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "markets": state.chain.market_count(),
        "market_contract": state.chain.market_contract(),
        "amm_contract": state.chain.amm_contract(),
    }))
}
