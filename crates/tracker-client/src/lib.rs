//! Order service client for the progress tracker.
//!
//! Wraps the remote order service behind [`OrderServiceInterface`], a narrow
//! authenticated GET/PATCH seam, and exposes the four endpoints the tracker
//! uses through [`OrderClient`]. Responses come back as status code plus body;
//! a non-2xx code is not an error at this layer.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracker_types::{
	percent_encode, ApiResponse, ConfigSchema, DeliveryUpdateRequest, ImplementationRegistry,
	OrderStatus, SecretString, StatusUpdateRequest,
};

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors that can occur while talking to the order service.
#[derive(Debug, Error)]
pub enum ClientError {
	/// The request never produced a response.
	#[error("Network error: {0}")]
	Network(String),
	/// A request body could not be encoded.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Transport seam for the order service.
#[async_trait]
pub trait OrderServiceInterface: Send + Sync {
	/// Returns the configuration schema for this client implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Sends an authenticated GET request.
	async fn get(
		&self,
		path: &str,
		query: &[(&str, &str)],
		token: &SecretString,
	) -> Result<ApiResponse, ClientError>;

	/// Sends an authenticated PATCH request with a JSON body.
	async fn patch(
		&self,
		path: &str,
		body: serde_json::Value,
		token: &SecretString,
	) -> Result<ApiResponse, ClientError>;
}

/// Type alias for client factory functions.
pub type ClientFactory = fn(&toml::Value) -> Result<Box<dyn OrderServiceInterface>, ClientError>;

/// Registry trait for client implementations.
pub trait ClientRegistry: ImplementationRegistry<Factory = ClientFactory> {}

/// Get all registered client implementations.
pub fn get_all_implementations() -> Vec<(&'static str, ClientFactory)> {
	use implementations::http;

	vec![(http::Registry::NAME, http::Registry::factory())]
}

/// Path of the status endpoint for one order.
///
/// The identifier is percent-encoded into a single path segment.
pub fn status_path(order_id: &str) -> String {
	format!("/api/orders/{}/status", percent_encode(order_id))
}

/// Path of the delivery endpoint for one transaction.
pub fn delivery_path(transaction_id: &str) -> String {
	format!(
		"/api/orders/transactions/{}/delivery",
		percent_encode(transaction_id)
	)
}

/// Path of the seller's order listing.
pub const ORDERS_PATH: &str = "/api/orders";

/// Path of the seller profile.
pub const REFORMER_PATH: &str = "/api/user/reformer";

/// Typed access to the order service endpoints.
pub struct OrderClient {
	implementation: Box<dyn OrderServiceInterface>,
}

impl OrderClient {
	/// Creates a new OrderClient over the given transport.
	pub fn new(implementation: Box<dyn OrderServiceInterface>) -> Self {
		Self { implementation }
	}

	/// `PATCH /api/orders/{orderId}/status {status}`.
	pub async fn update_status(
		&self,
		order_id: &str,
		status: OrderStatus,
		token: &SecretString,
	) -> Result<ApiResponse, ClientError> {
		let body = to_body(&StatusUpdateRequest { status })?;
		tracing::debug!(path = %status_path(order_id), status = %status, "Requesting status update");
		self.implementation
			.patch(&status_path(order_id), body, token)
			.await
	}

	/// `PATCH /api/orders/transactions/{transactionId}/delivery`.
	pub async fn update_delivery(
		&self,
		transaction_id: &str,
		request: &DeliveryUpdateRequest,
		token: &SecretString,
	) -> Result<ApiResponse, ClientError> {
		let body = to_body(request)?;
		tracing::debug!(path = %delivery_path(transaction_id), "Requesting delivery update");
		self.implementation
			.patch(&delivery_path(transaction_id), body, token)
			.await
	}

	/// `GET /api/orders?type=reformer&status={status}`.
	pub async fn list_orders(
		&self,
		status: OrderStatus,
		token: &SecretString,
	) -> Result<ApiResponse, ClientError> {
		self.implementation
			.get(
				ORDERS_PATH,
				&[("type", "reformer"), ("status", status.as_str())],
				token,
			)
			.await
	}

	/// `GET /api/user/reformer`.
	pub async fn reformer_profile(&self, token: &SecretString) -> Result<ApiResponse, ClientError> {
		self.implementation.get(REFORMER_PATH, &[], token).await
	}
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ClientError> {
	serde_json::to_value(value).map_err(|e| ClientError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::{Arc, Mutex};
	use tracker_types::Schema;

	#[derive(Debug, Clone, PartialEq)]
	enum Call {
		Get(String, Vec<(String, String)>),
		Patch(String, serde_json::Value),
	}

	struct SchemaNone;

	impl ConfigSchema for SchemaNone {
		fn validate(&self, config: &toml::Value) -> Result<(), tracker_types::ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	#[derive(Default, Clone)]
	struct Recorder {
		calls: Arc<Mutex<Vec<Call>>>,
	}

	#[async_trait]
	impl OrderServiceInterface for Recorder {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(SchemaNone)
		}

		async fn get(
			&self,
			path: &str,
			query: &[(&str, &str)],
			_token: &SecretString,
		) -> Result<ApiResponse, ClientError> {
			let query = query
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect();
			self.calls.lock().unwrap().push(Call::Get(path.into(), query));
			Ok(ApiResponse::new(200, serde_json::json!([])))
		}

		async fn patch(
			&self,
			path: &str,
			body: serde_json::Value,
			_token: &SecretString,
		) -> Result<ApiResponse, ClientError> {
			self.calls.lock().unwrap().push(Call::Patch(path.into(), body));
			Ok(ApiResponse::new(200, serde_json::Value::Null))
		}
	}

	#[tokio::test]
	async fn test_endpoint_shapes() {
		let recorder = Recorder::default();
		let client = OrderClient::new(Box::new(recorder.clone()));
		let token = SecretString::from("t");

		client
			.update_status("O1", OrderStatus::Received, &token)
			.await
			.unwrap();
		client
			.update_delivery(
				"T1",
				&DeliveryUpdateRequest {
					delivery_company: "한진택배".into(),
					delivery_tracking_number: "42".into(),
				},
				&token,
			)
			.await
			.unwrap();
		client.list_orders(OrderStatus::Produced, &token).await.unwrap();
		client.reformer_profile(&token).await.unwrap();

		let calls = recorder.calls.lock().unwrap().clone();
		assert_eq!(
			calls,
			vec![
				Call::Patch(
					"/api/orders/O1/status".into(),
					serde_json::json!({"status": "received"})
				),
				Call::Patch(
					"/api/orders/transactions/T1/delivery".into(),
					serde_json::json!({
						"delivery_company": "한진택배",
						"delivery_tracking_number": "42"
					})
				),
				Call::Get(
					"/api/orders".into(),
					vec![
						("type".into(), "reformer".into()),
						("status".into(), "produced".into())
					]
				),
				Call::Get("/api/user/reformer".into(), vec![]),
			]
		);
	}

	#[tokio::test]
	async fn test_identifiers_stay_in_one_segment() {
		let recorder = Recorder::default();
		let client = OrderClient::new(Box::new(recorder.clone()));
		let token = SecretString::from("t");

		client
			.update_status("a/b?x=1", OrderStatus::Produced, &token)
			.await
			.unwrap();
		client
			.update_delivery(
				"T#1",
				&DeliveryUpdateRequest {
					delivery_company: "롯데택배".into(),
					delivery_tracking_number: "7".into(),
				},
				&token,
			)
			.await
			.unwrap();

		let paths: Vec<String> = recorder
			.calls
			.lock()
			.unwrap()
			.iter()
			.map(|call| match call {
				Call::Patch(path, _) | Call::Get(path, _) => path.clone(),
			})
			.collect();
		assert_eq!(
			paths,
			vec![
				"/api/orders/a%2Fb%3Fx%3D1/status".to_string(),
				"/api/orders/transactions/T%231/delivery".to_string(),
			]
		);
	}
}
