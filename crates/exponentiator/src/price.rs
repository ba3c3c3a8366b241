//! USD price lookup via the CoinGecko simple-price API.

use crate::error::ExponentiatorError;

pub const COINGECKO_API: &str = "https://api.coingecko.com/api/v3";

pub struct PriceFeed {
    client: reqwest::Client,
    base_url: String,
    coin_id: String,
}

impl PriceFeed {
    pub fn new(coin_id: impl Into<String>) -> Result<Self, ExponentiatorError> {
        Self::with_base_url(COINGECKO_API, coin_id)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        coin_id: impl Into<String>,
    ) -> Result<Self, ExponentiatorError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ExponentiatorError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            coin_id: coin_id.into(),
        })
    }

    /// Current USD price of one token.
    pub async fn usd_price(&self) -> Result<f64, ExponentiatorError> {
        let url = format!("{}/simple/price", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("ids", self.coin_id.as_str()), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| ExponentiatorError::Price(format!("price request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ExponentiatorError::Price(format!(
                "price API returned HTTP {}",
                resp.status()
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ExponentiatorError::Price(format!("failed to parse price response: {e}")))?;
        parse_usd_price(&body, &self.coin_id)
    }
}

/// Extract `body[coin_id]["usd"]`.
pub fn parse_usd_price(body: &serde_json::Value, coin_id: &str) -> Result<f64, ExponentiatorError> {
    body.get(coin_id)
        .and_then(|coin| coin.get("usd"))
        .and_then(|usd| usd.as_f64())
        .ok_or_else(|| ExponentiatorError::Price(format!("no USD price for {coin_id}")))
}
