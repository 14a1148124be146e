//! HTTP transport for the order service, built on `reqwest`.

use crate::{ClientError, ClientFactory, ClientRegistry, OrderServiceInterface};
use async_trait::async_trait;
use std::time::Duration;
use tracker_types::{
	ApiResponse, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString,
	ValidationError,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Order service transport over HTTP.
pub struct HttpOrderService {
	client: reqwest::Client,
	base_url: String,
}

impl HttpOrderService {
	/// Creates a transport for the service at `base_url`.
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(10)
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Configuration(e.to_string()))?;

		Ok(Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn send(&self, request: reqwest::RequestBuilder) -> Result<ApiResponse, ClientError> {
		let response = request
			.send()
			.await
			.map_err(|e| ClientError::Network(e.to_string()))?;

		let status = response.status().as_u16();
		let text = response
			.text()
			.await
			.map_err(|e| ClientError::Network(e.to_string()))?;
		Ok(ApiResponse::new(status, parse_body(&text)))
	}
}

/// Decodes a response body, falling back to `Null` for empty or non-JSON text.
fn parse_body(text: &str) -> serde_json::Value {
	if text.trim().is_empty() {
		return serde_json::Value::Null;
	}
	serde_json::from_str(text).unwrap_or_else(|_| {
		tracing::debug!(body_len = text.len(), "Response body is not JSON");
		serde_json::Value::Null
	})
}

#[async_trait]
impl OrderServiceInterface for HttpOrderService {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpOrderServiceSchema)
	}

	async fn get(
		&self,
		path: &str,
		query: &[(&str, &str)],
		token: &SecretString,
	) -> Result<ApiResponse, ClientError> {
		let request = self
			.client
			.get(self.url(path))
			.query(query)
			.bearer_auth(token.expose_secret());
		self.send(request).await
	}

	async fn patch(
		&self,
		path: &str,
		body: serde_json::Value,
		token: &SecretString,
	) -> Result<ApiResponse, ClientError> {
		let request = self
			.client
			.patch(self.url(path))
			.json(&body)
			.bearer_auth(token.expose_secret());
		self.send(request).await
	}
}

/// Configuration schema for HttpOrderService.
pub struct HttpOrderServiceSchema;

impl ConfigSchema for HttpOrderServiceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::String).with_validator(|v| {
				match v.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(()),
					_ => Err("base_url must start with http:// or https://".to_string()),
				}
			})],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		);
		schema.validate(config)
	}
}

/// Factory function to create an HTTP transport from configuration.
///
/// Configuration parameters:
/// - `base_url`: service root, e.g. "https://api.example.com" (required)
/// - `timeout_seconds`: request timeout (default: 30)
pub fn create_client(config: &toml::Value) -> Result<Box<dyn OrderServiceInterface>, ClientError> {
	HttpOrderServiceSchema
		.validate(config)
		.map_err(|e| ClientError::Configuration(e.to_string()))?;

	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(HttpOrderService::new(
		base_url,
		Duration::from_secs(timeout),
	)?))
}

/// Registry for the HTTP client implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = ClientFactory;

	fn factory() -> Self::Factory {
		create_client
	}
}

impl ClientRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_url_joining() {
		let service =
			HttpOrderService::new("https://api.example.com/", Duration::from_secs(5)).unwrap();
		assert_eq!(
			service.url("/api/orders/O1/status"),
			"https://api.example.com/api/orders/O1/status"
		);
	}

	#[test]
	fn test_parse_body() {
		assert_eq!(parse_body(""), serde_json::Value::Null);
		assert_eq!(parse_body("<html>"), serde_json::Value::Null);
		assert_eq!(parse_body("{\"status\":\"end\"}")["status"], "end");
	}

	#[test]
	fn test_factory_validation() {
		let missing = toml::Value::Table(toml::map::Map::new());
		assert!(matches!(
			create_client(&missing),
			Err(ClientError::Configuration(_))
		));

		let bad_scheme: toml::Value = toml::from_str("base_url = \"api.example.com\"").unwrap();
		assert!(create_client(&bad_scheme).is_err());

		let ok: toml::Value =
			toml::from_str("base_url = \"http://localhost:8000\"\ntimeout_seconds = 10").unwrap();
		assert!(create_client(&ok).is_ok());
	}
}
