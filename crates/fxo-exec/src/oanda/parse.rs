//! Extraction of typed values from v20 JSON responses.
//!
//! The v20 API quotes all numbers as strings, so every numeric field goes
//! through [`num_field`]. Parsers are pure `Value → struct` functions; the
//! HTTP layer stays in the client module.

use anyhow::{Result, anyhow};
use fxo_core::types::{FillDetail, OrderAck, OrderSnapshot, OrderStatus};
use fxo_feed::RawQuote;
use serde_json::Value;

/// Read a string-encoded numeric field, tolerating plain JSON numbers too.
fn num_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key) {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Extract the top-of-book bid/ask from a pricing response.
pub fn parse_pricing(body: &Value) -> Result<RawQuote> {
    let price = body
        .get("prices")
        .and_then(|p| p.get(0))
        .ok_or_else(|| anyhow!("pricing response has no prices"))?;

    let bid = price
        .get("bids")
        .and_then(|b| b.get(0))
        .and_then(|b| num_field(b, "price"))
        .ok_or_else(|| anyhow!("pricing response has no bid"))?;
    let ask = price
        .get("asks")
        .and_then(|a| a.get(0))
        .and_then(|a| num_field(a, "price"))
        .ok_or_else(|| anyhow!("pricing response has no ask"))?;

    Ok(RawQuote { bid, ask })
}

/// Extract the account balance from an account summary response.
pub fn parse_balance(body: &Value) -> Result<f64> {
    body.get("account")
        .and_then(|a| num_field(a, "balance"))
        .ok_or_else(|| anyhow!("account summary has no balance"))
}

/// Extract the order id and optional synchronous fill from a create-order
/// response.
///
/// A response without `orderCreateTransaction.id` is malformed — the caller
/// cannot track an order it has no id for.
pub fn parse_order_ack(body: &Value) -> Result<OrderAck> {
    let create = body
        .get("orderCreateTransaction")
        .ok_or_else(|| anyhow!("create-order response has no orderCreateTransaction"))?;

    let order_id = str_field(create, "id")
        .ok_or_else(|| anyhow!("create-order response is missing the order id"))?;
    let create_time = str_field(create, "time").unwrap_or_default();

    let fill = body.get("orderFillTransaction").map(|fill| {
        let margin_required = fill
            .get("tradeOpened")
            .and_then(|t| num_field(t, "initialMarginRequired"))
            .unwrap_or(0.0);
        FillDetail {
            executed_price: num_field(fill, "price").unwrap_or(0.0),
            fill_time: str_field(fill, "time").unwrap_or_default(),
            half_spread_cost: num_field(fill, "halfSpreadCost").unwrap_or(0.0),
            commission: num_field(fill, "commission").unwrap_or(0.0),
            financing: num_field(fill, "financing").unwrap_or(0.0),
            account_balance: num_field(fill, "accountBalance").unwrap_or(0.0),
            margin_required,
            reason: str_field(fill, "reason").unwrap_or_default(),
        }
    });

    Ok(OrderAck {
        order_id,
        create_time,
        fill,
    })
}

/// Extract a status snapshot from an order-details response.
pub fn parse_order_snapshot(body: &Value) -> Result<OrderSnapshot> {
    let order = body
        .get("order")
        .ok_or_else(|| anyhow!("order-details response has no order"))?;

    let state = str_field(order, "state")
        .ok_or_else(|| anyhow!("order-details response has no state"))?;
    let status = OrderStatus::from_broker_state(&state)
        .ok_or_else(|| anyhow!("unknown order state '{state}'"))?;

    Ok(OrderSnapshot {
        order_id: str_field(order, "id").unwrap_or_default(),
        status,
        instrument: str_field(order, "instrument").unwrap_or_default(),
        units: num_field(order, "units").unwrap_or(0.0) as i64,
        price: num_field(order, "price").unwrap_or(0.0),
        stop_loss_price: order
            .get("stopLossOnFill")
            .and_then(|s| num_field(s, "price"))
            .unwrap_or(0.0),
        take_profit_price: order
            .get("takeProfitOnFill")
            .and_then(|t| num_field(t, "price"))
            .unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pricing_top_of_book() {
        let body = json!({
            "prices": [{
                "bids": [{ "price": "1.10001", "liquidity": 10000000 }],
                "asks": [{ "price": "1.10013", "liquidity": 10000000 }]
            }]
        });
        let quote = parse_pricing(&body).unwrap();
        assert_eq!(quote.bid, 1.10001);
        assert_eq!(quote.ask, 1.10013);
    }

    #[test]
    fn pricing_without_prices_fails() {
        assert!(parse_pricing(&json!({ "prices": [] })).is_err());
    }

    #[test]
    fn balance_from_summary() {
        let body = json!({ "account": { "balance": "10000.0000", "id": "001" } });
        assert_eq!(parse_balance(&body).unwrap(), 10_000.0);
    }

    #[test]
    fn ack_without_fill() {
        let body = json!({
            "orderCreateTransaction": { "id": "6372", "time": "2024-06-01T12:00:00Z" }
        });
        let ack = parse_order_ack(&body).unwrap();
        assert_eq!(ack.order_id, "6372");
        assert!(ack.fill.is_none());
    }

    #[test]
    fn ack_with_immediate_fill() {
        let body = json!({
            "orderCreateTransaction": { "id": "6372", "time": "t0" },
            "orderFillTransaction": {
                "price": "1.10005",
                "time": "t1",
                "halfSpreadCost": "0.35",
                "commission": "0.0",
                "financing": "0.0",
                "accountBalance": "9999.65",
                "reason": "MARKET_ORDER",
                "tradeOpened": { "initialMarginRequired": "333.21" }
            }
        });
        let ack = parse_order_ack(&body).unwrap();
        let fill = ack.fill.unwrap();
        assert_eq!(fill.executed_price, 1.10005);
        assert_eq!(fill.margin_required, 333.21);
        assert_eq!(fill.reason, "MARKET_ORDER");
    }

    #[test]
    fn ack_missing_id_is_an_error() {
        let body = json!({ "orderCreateTransaction": { "time": "t0" } });
        assert!(parse_order_ack(&body).is_err());
    }

    #[test]
    fn snapshot_maps_state() {
        let body = json!({
            "order": {
                "id": "6372",
                "state": "FILLED",
                "instrument": "EUR_USD",
                "units": "-50000",
                "price": "1.10000",
                "stopLossOnFill": { "price": "1.10200" },
                "takeProfitOnFill": { "price": "1.09800" }
            }
        });
        let snap = parse_order_snapshot(&body).unwrap();
        assert_eq!(snap.status, OrderStatus::Filled);
        assert_eq!(snap.units, -50_000);
        assert_eq!(snap.stop_loss_price, 1.10200);
    }

    #[test]
    fn snapshot_unknown_state_fails() {
        let body = json!({ "order": { "id": "1", "state": "WHATEVER" } });
        assert!(parse_order_snapshot(&body).is_err());
    }
}
