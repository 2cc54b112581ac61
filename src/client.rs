use anyhow::{bail, Context, Result};
use base64::prelude::*;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::calendar::OccupiedInterval;
use crate::models::{ApiConfig, Resource, TokenClaims};
use crate::projection::MonthlyCount;

const CLIENT_UA: &str = concat!("hotel-dashboard/", env!("CARGO_PKG_VERSION"));

pub struct HotelApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    claims: Option<TokenClaims>,
}

impl HotelApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            claims: None,
        })
    }

    /// Build a client and log in when the config carries credentials.
    pub async fn connect(api: &ApiConfig) -> Result<Self> {
        let mut client = Self::new(&api.base_url)?;
        if let (Some(user), Some(pass)) = (api.username.as_deref(), api.password.as_deref()) {
            client.login(user, pass).await?;
        }
        Ok(client)
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_UA));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            if let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, val);
            }
        }
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub fn claims(&self) -> Option<&TokenClaims> {
        self.claims.as_ref()
    }

    /// Authenticate and keep the bearer token for later requests.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<serde_json::Value> {
        let url = self.url("auth/login");

        let resp = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!(
                "username={}&password={}",
                urlencoding::encode(username),
                urlencoding::encode(password)
            ))
            .send()
            .await
            .context("Failed to send login request")?;

        let status = resp.status();
        let text = resp.text().await.context("Failed to read login response")?;
        debug!("Login response (status {}): {}", status, text);

        if !status.is_success() {
            bail!("Login rejected (status {status}): {text}");
        }

        let body: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse login response (status {status}): {text}"))?;

        let token = body
            .get("token")
            .or_else(|| body.get("data").and_then(|d| d.get("token")))
            .and_then(|t| t.as_str())
            .context("Login response carries no token")?;

        self.token = Some(token.to_string());
        self.claims = decode_claims(token);
        info!(
            "Logged in as {}",
            self.claims
                .as_ref()
                .and_then(|c| c.sub.as_deref())
                .unwrap_or(username)
        );

        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = self.url(path);

        let resp = self
            .client
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {what}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .with_context(|| format!("Failed to read {what} response"))?;
        debug!("{} response (status {}): {}", what, status, text);

        if !status.is_success() {
            bail!("Backend returned {status} for {what}: {text}");
        }

        let body: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {what} (status {status}): {text}"))?;
        let data = unwrap_data(body);

        serde_json::from_value(data.clone())
            .with_context(|| format!("Unexpected {what} payload: {data}"))
    }

    /// Fetch every row of a collection.
    pub async fn list(&self, resource: Resource) -> Result<Vec<serde_json::Value>> {
        let rows: Vec<serde_json::Value> = self.get(resource.path(), resource.path()).await?;
        debug!("Fetched {} {}", rows.len(), resource);
        Ok(rows)
    }

    pub async fn reservations_per_month(&self) -> Result<Vec<MonthlyCount>> {
        self.get("reservations/per-month", "reservations per month")
            .await
    }

    /// Occupied date ranges (inclusive) for one room.
    pub async fn occupied_dates(&self, room_id: &str) -> Result<Vec<OccupiedInterval>> {
        let path = format!("rooms/{}/occupied-dates", urlencoding::encode(room_id));
        self.get(&path, "occupied dates").await
    }
}

/// Lists may come bare or wrapped as `{"data": [...]}`.
fn unwrap_data(body: serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(mut obj) if obj.contains_key("data") => {
            obj.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

/// Read the payload segment of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data_wrapped_and_bare() {
        assert_eq!(unwrap_data(json!({"data": [1, 2]})), json!([1, 2]));
        assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
        assert_eq!(unwrap_data(json!({"rows": 1})), json!({"rows": 1}));
    }

    #[test]
    fn test_decode_claims() {
        let payload = BASE64_URL_SAFE_NO_PAD.encode(r#"{"sub":"admin","role":"MANAGER","exp":1900000000}"#);
        let token = format!("eyJhbGciOiJIUzI1NiJ9.{payload}.signature");
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("admin"));
        assert_eq!(claims.role.as_deref(), Some("MANAGER"));
        assert_eq!(claims.exp, Some(1_900_000_000));
    }

    #[test]
    fn test_decode_claims_rejects_opaque_token() {
        assert!(decode_claims("not-a-jwt").is_none());
        assert!(decode_claims("a.!!!.c").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HotelApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.url("rooms"), "http://localhost:8080/api/rooms");
    }
}
