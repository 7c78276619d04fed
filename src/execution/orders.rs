use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;

use crate::models::Side;
use crate::Result;

type HmacSha256 = Hmac<Sha256>;

const COINDCX_API_BASE: &str = "https://api.coindcx.com";

/// Raw outcome of a single order submission attempt
///
/// Whatever the exchange answered rides along verbatim; a transport failure
/// is captured as text. Either way the attempt is terminal, there is no
/// retry.
#[derive(Debug, Clone)]
pub enum OrderReport {
    Response(serde_json::Value),
    Failed(String),
}

/// Best-effort order submission, never raises to the caller
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit_order(&self, side: Side, pair: &str, price: f64, quantity: f64)
        -> OrderReport;
}

/// Client for the CoinDCX authenticated order API
pub struct CoinDcxOrders {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl CoinDcxOrders {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self::with_base_url(COINDCX_API_BASE, api_key, api_secret)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: String,
        api_secret: String,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
            api_secret,
        }
    }

    /// Market-order body in the exchange's wire format
    fn order_body(side: Side, pair: &str, quantity: f64) -> serde_json::Value {
        serde_json::json!({
            "market": pair.replace('-', "_"),
            "side": side.as_request(),
            "order_type": "market_order",
            "total_quantity": quantity,
            "timestamp": Utc::now().timestamp_millis(),
        })
    }

    /// HMAC-SHA256 of the serialized body, hex-encoded
    fn sign(&self, payload: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|_| "invalid API secret length")?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn submit_once(&self, side: Side, pair: &str, quantity: f64) -> Result<serde_json::Value> {
        let body = Self::order_body(side, pair, quantity);
        let payload = serde_json::to_string(&body)?;
        let signature = self.sign(&payload)?;

        let response = self
            .client
            .post(format!("{}/exchange/v1/orders/create", self.base_url))
            .header("Content-Type", "application/json")
            .header("X-AUTH-APIKEY", &self.api_key)
            .header("X-AUTH-SIGNATURE", signature)
            .body(payload)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl OrderGateway for CoinDcxOrders {
    async fn submit_order(
        &self,
        side: Side,
        pair: &str,
        price: f64,
        quantity: f64,
    ) -> OrderReport {
        tracing::info!(
            "Submitting {} market order: {} x{:.4} @ ~{:.2}",
            side,
            pair,
            quantity,
            price
        );

        match self.submit_once(side, pair, quantity).await {
            Ok(value) => OrderReport::Response(value),
            Err(e) => {
                tracing::error!("Order submission failed for {}: {}", pair, e);
                OrderReport::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_body_wire_format() {
        let body = CoinDcxOrders::order_body(Side::Buy, "SOL-INR", 2.5);

        assert_eq!(body["market"], "SOL_INR");
        assert_eq!(body["side"], "buy");
        assert_eq!(body["order_type"], "market_order");
        assert_eq!(body["total_quantity"], 2.5);
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_signature_is_hex_and_deterministic() {
        let gateway = CoinDcxOrders::new("key".to_string(), "secret".to_string());

        let first = gateway.sign(r#"{"market":"SOL_INR"}"#).unwrap();
        let second = gateway.sign(r#"{"market":"SOL_INR"}"#).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));

        // A different payload signs differently
        let other = gateway.sign(r#"{"market":"BTC_INR"}"#).unwrap();
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_submit_order_reports_exchange_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/exchange/v1/orders/create")
            .match_header("x-auth-apikey", "key")
            .with_header("content-type", "application/json")
            .with_body(r#"{"orders":[{"id":"abc","status":"open"}]}"#)
            .create_async()
            .await;

        let gateway =
            CoinDcxOrders::with_base_url(server.url(), "key".to_string(), "secret".to_string());
        let report = gateway.submit_order(Side::Buy, "SOL-INR", 100.0, 2.5).await;

        match report {
            OrderReport::Response(value) => {
                assert_eq!(value["orders"][0]["status"], "open");
            }
            OrderReport::Failed(message) => panic!("expected response, got failure: {}", message),
        }
    }

    #[tokio::test]
    async fn test_submit_order_captures_transport_failure() {
        // Nothing listens on this port
        let gateway = CoinDcxOrders::with_base_url(
            "http://127.0.0.1:9".to_string(),
            "key".to_string(),
            "secret".to_string(),
        );
        let report = gateway.submit_order(Side::Sell, "SOL-INR", 100.0, 2.5).await;

        assert!(matches!(report, OrderReport::Failed(_)));
    }
}
