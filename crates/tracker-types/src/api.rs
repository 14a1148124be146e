//! Wire types for the remote order service.
//!
//! Requests and responses mirror the JSON bodies of the order service
//! endpoints. Responses are decoded leniently: optional display fields may be
//! missing, and `order_status` may be either a plain status string or a list
//! of status entries whose first element is the current status.

use crate::{DeliveryPayload, Mode, Order, OrderStatus, UnknownStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code and body of an order service response.
///
/// A non-2xx code is an application-level failure, not a transport error.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Decoded JSON body, `Null` when the body was empty or not JSON.
	pub body: serde_json::Value,
}

impl ApiResponse {
	/// Creates a response from a status code and body.
	pub fn new(status: u16, body: serde_json::Value) -> Self {
		Self { status, body }
	}

	/// Returns true for 2xx status codes.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Server-provided error message, if the body carries one.
	pub fn message(&self) -> Option<String> {
		self.body
			.get("message")
			.and_then(|v| v.as_str())
			.map(str::to_string)
	}
}

/// Body of `PATCH /api/orders/{orderId}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
	pub status: OrderStatus,
}

/// Body of `PATCH /api/orders/transactions/{transactionId}/delivery`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryUpdateRequest {
	pub delivery_company: String,
	pub delivery_tracking_number: String,
}

impl From<&DeliveryPayload> for DeliveryUpdateRequest {
	fn from(payload: &DeliveryPayload) -> Self {
		Self {
			delivery_company: payload.carrier.name().to_string(),
			delivery_tracking_number: payload.tracking_number.clone(),
		}
	}
}

/// Extracts the status confirmed by a status-update response body.
///
/// Accepts `{"status": ".."}` or `{"order_status": ".."}`; returns `None` when
/// the body carries neither.
pub fn confirmed_status(body: &serde_json::Value) -> Option<OrderStatus> {
	["status", "order_status"]
		.iter()
		.filter_map(|field| body.get(*field))
		.filter_map(|value| serde_json::from_value::<StatusField>(value.clone()).ok())
		.find_map(|field| field.current().ok().flatten())
}

/// Seller profile returned by `GET /api/user/reformer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReformerProfile {
	/// Link to the seller's open chat channel.
	#[serde(default)]
	pub reformer_link: Option<String>,
}

/// `order_status` as sent by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusField {
	/// A plain status string.
	Single(String),
	/// Status history, most recent first.
	History(Vec<StatusEntry>),
}

impl StatusField {
	/// Current status, `Ok(None)` when the history is empty.
	pub fn current(&self) -> Result<Option<OrderStatus>, UnknownStatus> {
		let raw = match self {
			StatusField::Single(status) => Some(status.as_str()),
			StatusField::History(entries) => entries.first().map(|e| e.status.as_str()),
		};
		raw.map(str::parse).transpose()
	}
}

/// One entry of a status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
	pub status: String,
}

/// Transaction block of an order record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
	#[serde(default)]
	pub transaction_option: Option<String>,
	#[serde(default)]
	pub transaction_uuid: Option<String>,
}

/// Service block of an order record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
	#[serde(default)]
	pub service_title: Option<String>,
}

/// Buyer block of an order record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdererInformation {
	#[serde(default)]
	pub orderer_name: Option<String>,
}

/// Image attached to an order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
	pub image_type: String,
	pub image: String,
}

/// An order as returned by `GET /api/orders?type=reformer&status={status}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
	pub order_uuid: String,
	#[serde(default)]
	pub order_status: Option<StatusField>,
	#[serde(default)]
	pub transaction: Option<TransactionRecord>,
	#[serde(default)]
	pub transaction_uuid: Option<String>,
	#[serde(default)]
	pub service_info: Option<ServiceInfo>,
	#[serde(default)]
	pub orderer_information: Option<OrdererInformation>,
	#[serde(default)]
	pub order_date: Option<String>,
	#[serde(default)]
	pub images: Vec<ImageRecord>,
}

/// Errors converting an order record into an [`Order`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderRecordError {
	#[error("Order {0} has no status")]
	MissingStatus(String),
	#[error("Order {order_id}: {source}")]
	InvalidStatus {
		order_id: String,
		source: UnknownStatus,
	},
}

impl OrderRecord {
	/// Converts the record, using `fallback` when it carries no status.
	///
	/// Buckets are fetched per status, so the bucket's status is the natural
	/// fallback.
	pub fn into_order(self, fallback: Option<OrderStatus>) -> Result<Order, OrderRecordError> {
		let current = match &self.order_status {
			Some(field) => field
				.current()
				.map_err(|source| OrderRecordError::InvalidStatus {
					order_id: self.order_uuid.clone(),
					source,
				})?,
			None => None,
		};
		let status = current
			.or(fallback)
			.ok_or_else(|| OrderRecordError::MissingStatus(self.order_uuid.clone()))?;

		let transaction = self.transaction.unwrap_or_default();
		let mode = Mode::from_transaction_option(transaction.transaction_option.as_deref());
		let image_url = self
			.images
			.into_iter()
			.find(|image| image.image_type == "order")
			.map(|image| image.image);

		Ok(Order {
			id: self.order_uuid,
			mode,
			status,
			transaction_id: transaction.transaction_uuid.or(self.transaction_uuid),
			service_title: self.service_info.and_then(|info| info.service_title),
			orderer_name: self.orderer_information.and_then(|info| info.orderer_name),
			order_date: self.order_date,
			image_url,
		})
	}
}

impl TryFrom<OrderRecord> for Order {
	type Error = OrderRecordError;

	fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
		record.into_order(None)
	}
}
