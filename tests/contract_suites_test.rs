// Contract call suites against a scripted transport.
//
// Every response is preprogrammed, so these pin down the request encoding and
// how results and verbatim error codes come back through the gateway.

use prediction_market_gateway::{
    CallResult, ContractTransport, GatewayError, MarketGateway, MarketStatus, ScriptedTransport, TypedValue,
};
use std::sync::Arc;

const ORACLE: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

fn gateway() -> MarketGateway<Arc<ScriptedTransport>> {
    MarketGateway::new(Arc::new(ScriptedTransport::new()), ORACLE)
}

fn contract_error(err: GatewayError) -> String {
    match err {
        GatewayError::Contract(error) => error,
        other => panic!("expected contract error, got {}", other),
    }
}

// ===== AMM: provide-liquidity =====

#[tokio::test]
async fn test_provide_liquidity_successfully() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::ok(TypedValue::bool(true)));

    let provided = gateway.provide_liquidity(1, &[100000000, 100000000]).await.unwrap();
    assert!(provided);

    let call = gateway.transport().last_call().unwrap();
    assert_eq!(call.contract, "amm");
    assert_eq!(call.function, "provide-liquidity");
    assert_eq!(
        call.args,
        vec![TypedValue::uint(1), TypedValue::uint_list([100000000, 100000000])]
    );
}

#[tokio::test]
async fn test_provide_liquidity_mismatched_amounts() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::err("err-u300"));

    let err = gateway
        .provide_liquidity(1, &[100000000, 100000000, 100000000])
        .await
        .unwrap_err();
    assert_eq!(contract_error(err), "err-u300");
}

// ===== AMM: get-liquidity-pool =====

#[tokio::test]
async fn test_get_liquidity_pool_details() {
    let gateway = gateway();
    let record = TypedValue::tuple([
        ("total-liquidity", TypedValue::uint(200000000)),
        ("shares", TypedValue::uint_list([100000000, 100000000])),
    ]);
    gateway.transport().respond_with(CallResult::ok(record.clone()));

    // Raw result is passed through untouched
    let raw = gateway.call("amm", "get-liquidity-pool", vec![TypedValue::uint(1)]).await.unwrap();
    assert!(raw.success);
    assert_eq!(raw.value, Some(record));

    let pool = gateway.get_liquidity_pool(1).await.unwrap();
    assert_eq!(pool.total_liquidity, 200000000);
    assert_eq!(pool.shares, vec![100000000, 100000000]);
}

#[tokio::test]
async fn test_get_liquidity_pool_not_found() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::err("err-u404"));

    let err = gateway.get_liquidity_pool(999).await.unwrap_err();
    assert_eq!(err.code(), Some(404));
}

// ===== AMM: swap =====

#[tokio::test]
async fn test_swap_successfully() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::ok(TypedValue::uint(49000000)));

    let output = gateway.swap(1, 0, 1, 50000000).await.unwrap();
    assert_eq!(output, 49000000);
}

#[tokio::test]
async fn test_swap_insufficient_liquidity() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::err("err-u301"));

    let err = gateway.swap(1, 0, 1, 10000000000).await.unwrap_err();
    assert_eq!(contract_error(err), "err-u301");

    let call = gateway.transport().last_call().unwrap();
    assert_eq!(call.args[3], TypedValue::uint(10000000000));
}

#[tokio::test]
async fn test_swap_invalid_market() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::err("err-u404"));

    let err = gateway.swap(999, 0, 1, 50000000).await.unwrap_err();
    assert_eq!(contract_error(err), "err-u404");
}

// ===== MARKET CREATION: create-market =====

#[tokio::test]
async fn test_create_market_successfully() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::ok(TypedValue::uint(1)));

    let id = gateway
        .create_market("Will it rain tomorrow?", &["Yes", "No"], 100000, ORACLE)
        .await
        .unwrap();
    assert_eq!(id, 1);

    let call = gateway.transport().last_call().unwrap();
    assert_eq!(call.contract, "market-creation");
    assert_eq!(call.function, "create-market");
    assert_eq!(
        call.args,
        vec![
            TypedValue::string_utf8("Will it rain tomorrow?"),
            TypedValue::list([TypedValue::string_utf8("Yes"), TypedValue::string_utf8("No")]),
            TypedValue::uint(100000),
            TypedValue::principal(ORACLE),
        ]
    );
}

#[tokio::test]
async fn test_create_market_too_many_options() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::err("err-u103"));

    let options = [
        "Team A", "Team B", "Team C", "Team D", "Team E", "Team F", "Team G", "Team H", "Team I", "Team J", "Team K",
    ];
    let err = gateway
        .create_market("Which team will win?", &options, 100000, ORACLE)
        .await
        .unwrap_err();
    assert_eq!(contract_error(err), "err-u103");
}

// ===== MARKET CREATION: get-market =====

#[tokio::test]
async fn test_get_market_details() {
    let gateway = gateway();
    let record = TypedValue::tuple([
        ("creator", TypedValue::principal(ORACLE)),
        ("description", TypedValue::string_utf8("Will it rain tomorrow?")),
        (
            "options",
            TypedValue::list([TypedValue::string_utf8("Yes"), TypedValue::string_utf8("No")]),
        ),
        ("resolution-time", TypedValue::uint(100000)),
        ("oracle", TypedValue::principal(ORACLE)),
        ("status", TypedValue::string_ascii("active")),
    ]);
    gateway.transport().respond_with(CallResult::ok(record));

    let market = gateway.get_market(1).await.unwrap();
    assert_eq!(market.id, 1);
    assert_eq!(market.creator, ORACLE);
    assert_eq!(market.description, "Will it rain tomorrow?");
    assert_eq!(market.options, vec!["Yes", "No"]);
    assert_eq!(market.resolution_time, 100000);
    assert_eq!(market.status, MarketStatus::Active);
}

#[tokio::test]
async fn test_get_market_not_found() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::err("err-u404"));

    let err = gateway.get_market(999).await.unwrap_err();
    assert_eq!(contract_error(err), "err-u404");
}

// ===== MARKET CREATION: update-market-status =====

#[tokio::test]
async fn test_update_market_status_successfully() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult {
        success: true,
        value: None,
        error: None,
    });

    gateway.update_market_status(1, MarketStatus::Resolved).await.unwrap();

    let call = gateway.transport().last_call().unwrap();
    assert_eq!(call.function, "update-market-status");
    assert_eq!(call.args, vec![TypedValue::uint(1), TypedValue::string_ascii("resolved")]);
}

#[tokio::test]
async fn test_update_market_status_by_non_owner() {
    let gateway = gateway();
    gateway.transport().respond_with(CallResult::err("err-u100"));

    let err = gateway.update_market_status(1, MarketStatus::Resolved).await.unwrap_err();
    assert_eq!(contract_error(err), "err-u100");
}

// ===== TRANSPORT =====

#[tokio::test]
async fn test_transport_failure_is_not_a_contract_error() {
    // Nothing scripted: the transport itself fails
    let gateway = gateway();

    let err = gateway.swap(1, 0, 1, 1).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
    assert_eq!(err.code(), None);
}

#[tokio::test]
async fn test_transport_is_swappable_behind_trait_object() {
    let scripted = Arc::new(ScriptedTransport::new());
    scripted.respond_with(CallResult::ok(TypedValue::uint(3)));

    let transport: Box<dyn ContractTransport> = Box::new(scripted.clone());
    let gateway = MarketGateway::new(transport, ORACLE);

    assert_eq!(gateway.market_count().await.unwrap(), 3);
    assert_eq!(scripted.calls().len(), 1);
}
