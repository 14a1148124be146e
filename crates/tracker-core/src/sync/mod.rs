//! Status sync controller.
//!
//! Sends status-transition requests to the order service and reports the
//! status the service confirmed. The controller never touches local step
//! state: a failed request leaves whatever the caller already advanced.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use tracker_client::{ClientError, OrderClient};
use tracker_credentials::CredentialService;
use tracker_types::{
	confirmed_status, truncate_id, ApiResponse, DeliveryPayload, DeliveryUpdateRequest,
	OrderStatus, SecretString,
};

/// Request within a transition that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
	/// Recording carrier and tracking number on the transaction.
	Delivery,
	/// Updating the order status.
	Status,
}

impl fmt::Display for SyncStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncStage::Delivery => f.write_str("delivery update"),
			SyncStage::Status => f.write_str("status update"),
		}
	}
}

/// Errors returned by a transition request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
	/// No access token; nothing was sent.
	#[error("Login required")]
	AuthMissing,
	/// The service answered with a non-success status.
	#[error("{stage} rejected with status {status}{}", server_message(.message))]
	Rejected {
		stage: SyncStage,
		status: u16,
		message: Option<String>,
	},
	/// The request did not complete.
	#[error("{stage} failed: {message}")]
	Transport { stage: SyncStage, message: String },
}

impl SyncError {
	/// True when the delivery details were accepted before the failure.
	pub fn delivery_recorded(&self) -> bool {
		matches!(
			self,
			SyncError::Rejected {
				stage: SyncStage::Status,
				..
			} | SyncError::Transport {
				stage: SyncStage::Status,
				..
			}
		)
	}

	fn from_client(stage: SyncStage, error: ClientError) -> Self {
		SyncError::Transport {
			stage,
			message: error.to_string(),
		}
	}

	fn from_response(stage: SyncStage, response: &ApiResponse) -> Self {
		SyncError::Rejected {
			stage,
			status: response.status,
			message: response.message(),
		}
	}
}

fn server_message(message: &Option<String>) -> String {
	message
		.as_deref()
		.map(|m| format!(": {}", m))
		.unwrap_or_default()
}

/// Issues authenticated transition requests.
pub struct StatusSyncController {
	credentials: Arc<CredentialService>,
	client: Arc<OrderClient>,
}

impl StatusSyncController {
	/// Creates a controller over the given credential store and client.
	pub fn new(credentials: Arc<CredentialService>, client: Arc<OrderClient>) -> Self {
		Self {
			credentials,
			client,
		}
	}

	/// Requests that `order_id` move to `target`.
	///
	/// With a payload, the delivery details are recorded first and the status
	/// is only requested once the service accepted them. Returns the status
	/// confirmed by the service, or `target` when the response does not echo
	/// one.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), target = %target))]
	pub async fn request_transition(
		&self,
		order_id: &str,
		target: OrderStatus,
		payload: Option<&DeliveryPayload>,
	) -> Result<OrderStatus, SyncError> {
		let token = self.token().await?;

		if let Some(payload) = payload {
			self.record_delivery(payload, &token).await?;
		}

		let response = self
			.client
			.update_status(order_id, target, &token)
			.await
			.map_err(|e| SyncError::from_client(SyncStage::Status, e))?;
		if !response.is_success() {
			let error = SyncError::from_response(SyncStage::Status, &response);
			tracing::warn!(error = %error, "Status update rejected");
			return Err(error);
		}

		let confirmed = confirmed_status(&response.body).unwrap_or(target);
		tracing::info!(confirmed = %confirmed, "Status updated");
		Ok(confirmed)
	}

	async fn record_delivery(
		&self,
		payload: &DeliveryPayload,
		token: &SecretString,
	) -> Result<(), SyncError> {
		let request = DeliveryUpdateRequest::from(payload);
		let response = self
			.client
			.update_delivery(&payload.transaction_id, &request, token)
			.await
			.map_err(|e| SyncError::from_client(SyncStage::Delivery, e))?;
		if !response.is_success() {
			let error = SyncError::from_response(SyncStage::Delivery, &response);
			tracing::warn!(
				transaction_id = %truncate_id(&payload.transaction_id),
				error = %error,
				"Delivery update rejected"
			);
			return Err(error);
		}

		tracing::info!(
			transaction_id = %truncate_id(&payload.transaction_id),
			carrier = %payload.carrier,
			"Delivery details recorded"
		);
		Ok(())
	}

	async fn token(&self) -> Result<SecretString, SyncError> {
		self.credentials.get_access_token().await.ok_or_else(|| {
			tracing::warn!("No access token, transition not sent");
			SyncError::AuthMissing
		})
	}
}
