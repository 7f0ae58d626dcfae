//! OANDA v20 REST client.
//!
//! # Endpoints
//!
//! | Operation        | Method | Path                                        |
//! |------------------|--------|---------------------------------------------|
//! | Pricing          | GET    | `/v3/accounts/{id}/pricing?instruments=...` |
//! | Account summary  | GET    | `/v3/accounts/{id}/summary`                 |
//! | Create order     | POST   | `/v3/accounts/{id}/orders`                  |
//! | Order details    | GET    | `/v3/accounts/{id}/orders/{orderId}`        |
//! | Cancel order     | PUT    | `/v3/accounts/{id}/orders/{orderId}/cancel` |
//!
//! Authentication is a bearer token in the `Authorization` header. All
//! prices travel as strings on the wire; parsing lives in [`parse`].

pub mod parse;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fxo_core::types::{OrderAck, OrderKind, OrderRequest, OrderSnapshot};
use fxo_feed::{QuoteSource, RawQuote};
use serde_json::{Value, json};
use tracing::debug;

use crate::BrokerGateway;

/// Account credentials and endpoint, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub account_id: String,
    pub rest_url: String,
}

impl Credentials {
    /// Read credentials from the environment.
    ///
    /// `OANDA_API_KEY` plus `OANDA_PRIMARY_ACCOUNT_ID` or
    /// `OANDA_SECONDARY_ACCOUNT_ID` depending on the operator's account
    /// selection. `OANDA_REST_URL` may override the default live endpoint.
    pub fn from_env(primary: bool) -> Result<Self> {
        let api_key = std::env::var("OANDA_API_KEY").context("OANDA_API_KEY is not set")?;
        let account_var = if primary {
            "OANDA_PRIMARY_ACCOUNT_ID"
        } else {
            "OANDA_SECONDARY_ACCOUNT_ID"
        };
        let account_id =
            std::env::var(account_var).with_context(|| format!("{account_var} is not set"))?;
        let rest_url = std::env::var("OANDA_REST_URL")
            .unwrap_or_else(|_| "https://api-fxtrade.oanda.com".to_string());

        Ok(Self {
            api_key,
            account_id,
            rest_url,
        })
    }
}

/// OANDA v20 REST client. Implements both the quote-source seam for the
/// feed and the order operations for the lifecycle machine.
pub struct OandaClient {
    http: reqwest::Client,
    credentials: Credentials,
}

impl OandaClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
        }
    }

    fn account_url(&self, suffix: &str) -> String {
        format!(
            "{}/v3/accounts/{}{}",
            self.credentials.rest_url, self.credentials.account_id, suffix
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let body: Value = self
            .http
            .get(url)
            .bearer_auth(&self.credentials.api_key)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?
            .json()
            .await
            .context("response body was not JSON")?;
        Ok(body)
    }

    /// Build the v20 order body for a request.
    fn order_body(request: &OrderRequest) -> Value {
        let mut order = json!({
            "type": request.kind.as_wire_str(),
            "instrument": request.instrument,
            "units": request.units.to_string(),
            "timeInForce": request.time_in_force.as_wire_str(),
            "positionFill": "DEFAULT",
            "stopLossOnFill": {
                "timeInForce": "GTC",
                "price": request.stop_loss.to_string()
            },
            "takeProfitOnFill": {
                "price": request.take_profit.to_string()
            }
        });

        if request.kind == OrderKind::Limit {
            let price = request.price.unwrap_or_default();
            order["price"] = Value::String(price.to_string());
        }

        json!({ "order": order })
    }
}

#[async_trait]
impl QuoteSource for OandaClient {
    async fn fetch_quote(&self, symbol: &str) -> Result<RawQuote> {
        let url = self.account_url(&format!("/pricing?instruments={symbol}"));
        let body = self.get_json(&url).await?;
        parse::parse_pricing(&body)
    }
}

#[async_trait]
impl BrokerGateway for OandaClient {
    async fn fetch_account_balance(&self) -> Result<f64> {
        let body = self.get_json(&self.account_url("/summary")).await?;
        parse::parse_balance(&body)
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderAck> {
        let url = self.account_url("/orders");
        let payload = Self::order_body(request);
        debug!("[oanda] POST {url}: {payload}");

        let body: Value = self
            .http
            .post(&url)
            .bearer_auth(&self.credentials.api_key)
            .json(&payload)
            .send()
            .await
            .context("create-order request failed")?
            .error_for_status()
            .context("create-order returned an error status")?
            .json()
            .await
            .context("create-order response was not JSON")?;

        if let Some(reject) = body.get("orderRejectTransaction") {
            return Err(anyhow!("order rejected: {reject}"));
        }
        parse::parse_order_ack(&body)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<OrderSnapshot> {
        let url = self.account_url(&format!("/orders/{order_id}"));
        let body = self.get_json(&url).await?;
        parse::parse_order_snapshot(&body)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<()> {
        let url = self.account_url(&format!("/orders/{order_id}/cancel"));
        self.http
            .put(&url)
            .bearer_auth(&self.credentials.api_key)
            .send()
            .await
            .context("cancel-order request failed")?
            .error_for_status()
            .context("cancel-order returned an error status")?;
        Ok(())
    }
}
