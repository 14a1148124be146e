//! Recording fakes shared by the unit tests.

use crate::cache::StepCache;
use crate::sync::StatusSyncController;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracker_client::{ClientError, OrderClient, OrderServiceInterface};
use tracker_credentials::implementations::fixed::FixedCredentials;
use tracker_credentials::CredentialService;
use tracker_storage::implementations::memory::{MemoryStorage, MemoryStorageSchema};
use tracker_storage::StorageService;
use tracker_types::{ApiResponse, ConfigSchema, OrderStatus, SecretString};

/// Canned reply of the fake order service.
#[derive(Debug, Clone)]
pub enum Reply {
	Respond(ApiResponse),
	Fail(String),
}

impl Reply {
	pub fn ok(body: serde_json::Value) -> Self {
		Reply::Respond(ApiResponse::new(200, body))
	}

	pub fn status(code: u16, body: serde_json::Value) -> Self {
		Reply::Respond(ApiResponse::new(code, body))
	}

	fn into_result(self) -> Result<ApiResponse, ClientError> {
		match self {
			Reply::Respond(response) => Ok(response),
			Reply::Fail(message) => Err(ClientError::Network(message)),
		}
	}
}

/// Request seen by the fake order service.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
	Get {
		path: String,
		query: Vec<(String, String)>,
	},
	Patch {
		path: String,
		body: serde_json::Value,
	},
}

#[derive(Default)]
struct FakeState {
	calls: Vec<Call>,
	status_reply: Option<Reply>,
	delivery_reply: Option<Reply>,
	profile_reply: Option<Reply>,
	bucket_replies: HashMap<String, Reply>,
}

/// Order service that records every request and answers from canned replies.
///
/// Unconfigured endpoints answer 200 with an empty body (`null`, `[]` for
/// buckets, `{}` for the profile).
#[derive(Clone, Default)]
pub struct FakeOrderService {
	state: Arc<Mutex<FakeState>>,
}

impl FakeOrderService {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn reply_to_status(&self, reply: Reply) {
		self.state.lock().unwrap().status_reply = Some(reply);
	}

	pub fn reply_to_delivery(&self, reply: Reply) {
		self.state.lock().unwrap().delivery_reply = Some(reply);
	}

	pub fn reply_to_profile(&self, reply: Reply) {
		self.state.lock().unwrap().profile_reply = Some(reply);
	}

	pub fn reply_to_bucket(&self, status: OrderStatus, reply: Reply) {
		self.state
			.lock()
			.unwrap()
			.bucket_replies
			.insert(status.as_str().to_string(), reply);
	}

	pub fn calls(&self) -> Vec<Call> {
		self.state.lock().unwrap().calls.clone()
	}

	/// `(order_id, status)` of every status PATCH.
	pub fn status_requests(&self) -> Vec<(String, String)> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				Call::Patch { path, body } => {
					let order_id = path
						.strip_prefix("/api/orders/")?
						.strip_suffix("/status")?
						.to_string();
					Some((order_id, body["status"].as_str()?.to_string()))
				},
				Call::Get { .. } => None,
			})
			.collect()
	}

	/// `(transaction_id, body)` of every delivery PATCH.
	pub fn delivery_requests(&self) -> Vec<(String, serde_json::Value)> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				Call::Patch { path, body } => {
					let transaction_id = path
						.strip_prefix("/api/orders/transactions/")?
						.strip_suffix("/delivery")?
						.to_string();
					Some((transaction_id, body))
				},
				Call::Get { .. } => None,
			})
			.collect()
	}

	pub fn client(&self) -> OrderClient {
		OrderClient::new(Box::new(self.clone()))
	}

	pub fn credentials(token: Option<&str>) -> CredentialService {
		CredentialService::new(Box::new(FixedCredentials::new(token.map(SecretString::from))))
	}

	pub fn controller(&self, token: Option<&str>) -> StatusSyncController {
		StatusSyncController::new(Arc::new(Self::credentials(token)), Arc::new(self.client()))
	}
}

#[async_trait]
impl OrderServiceInterface for FakeOrderService {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}

	async fn get(
		&self,
		path: &str,
		query: &[(&str, &str)],
		_token: &SecretString,
	) -> Result<ApiResponse, ClientError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::Get {
			path: path.to_string(),
			query: query
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
		});

		let reply = match query.iter().find(|(k, _)| *k == "status") {
			Some((_, status)) => state
				.bucket_replies
				.get(*status)
				.cloned()
				.unwrap_or_else(|| Reply::ok(serde_json::json!([]))),
			None => state
				.profile_reply
				.clone()
				.unwrap_or_else(|| Reply::ok(serde_json::json!({}))),
		};
		reply.into_result()
	}

	async fn patch(
		&self,
		path: &str,
		body: serde_json::Value,
		_token: &SecretString,
	) -> Result<ApiResponse, ClientError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::Patch {
			path: path.to_string(),
			body,
		});

		let reply = if path.ends_with("/delivery") {
			state.delivery_reply.clone()
		} else {
			state.status_reply.clone()
		};
		reply
			.unwrap_or_else(|| Reply::ok(serde_json::Value::Null))
			.into_result()
	}
}

/// Step cache over a fresh in-memory store.
pub fn memory_cache() -> (Arc<StepCache>, Arc<StorageService>) {
	let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
	(Arc::new(StepCache::new(storage.clone())), storage)
}
