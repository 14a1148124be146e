//! Order types for the progress tracker.
//!
//! Defines the server-reported order status, the transaction mode that decides
//! which checklist an order shows, and the order record the screen renders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a status or mode string is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

/// Status of an order as reported by the order service.
///
/// The non-terminal statuses are totally ordered by fulfillment progress:
/// `Pending < Accepted < Received < Produced < Deliver < End`.
/// `Rejected` is terminal and sits outside that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Waiting for the seller to accept.
	Pending,
	/// Accepted by the seller; the visible checklist restarts here.
	Accepted,
	/// Materials received from the buyer.
	Received,
	/// Item produced.
	Produced,
	/// Delivery details entered and shipped.
	Deliver,
	/// Transaction complete.
	End,
	/// Rejected by the seller.
	Rejected,
}

impl OrderStatus {
	/// All statuses, in progress order followed by the terminal rejection.
	pub const ALL: [OrderStatus; 7] = [
		OrderStatus::Pending,
		OrderStatus::Accepted,
		OrderStatus::Received,
		OrderStatus::Produced,
		OrderStatus::Deliver,
		OrderStatus::End,
		OrderStatus::Rejected,
	];

	/// Position in the fulfillment order, `None` for `Rejected`.
	pub fn rank(&self) -> Option<u8> {
		match self {
			OrderStatus::Pending => Some(0),
			OrderStatus::Accepted => Some(1),
			OrderStatus::Received => Some(2),
			OrderStatus::Produced => Some(3),
			OrderStatus::Deliver => Some(4),
			OrderStatus::End => Some(5),
			OrderStatus::Rejected => None,
		}
	}

	/// Returns true when this status has progressed at least as far as `threshold`.
	///
	/// A rejected order has not progressed past anything.
	pub fn is_at_least(&self, threshold: OrderStatus) -> bool {
		match (self.rank(), threshold.rank()) {
			(Some(current), Some(required)) => current >= required,
			_ => false,
		}
	}

	/// Wire representation used by the order service.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Accepted => "accepted",
			OrderStatus::Received => "received",
			OrderStatus::Produced => "produced",
			OrderStatus::Deliver => "deliver",
			OrderStatus::End => "end",
			OrderStatus::Rejected => "rejected",
		}
	}

	/// Label shown to the seller next to the order identifier.
	pub fn label(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "수락 대기중",
			OrderStatus::Accepted => "수락",
			OrderStatus::Received => "재료 수령 완료",
			OrderStatus::Produced => "제작 완료",
			OrderStatus::Deliver => "배송 정보 입력",
			OrderStatus::End => "거래 완료",
			OrderStatus::Rejected => "거절됨",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| UnknownStatus(s.to_string()))
	}
}

/// How the physical goods change hands.
///
/// The mode fixes the number of steps in the checklist: in-person orders stop
/// after production, delivery orders add a delivery-details step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
	/// Face-to-face hand-over.
	InPerson,
	/// Shipped through a carrier.
	Delivery,
}

impl Mode {
	/// Maps the service's `transaction_option` field onto a mode.
	///
	/// Anything other than `"delivery"` is treated as in-person.
	pub fn from_transaction_option(option: Option<&str>) -> Self {
		match option {
			Some("delivery") => Mode::Delivery,
			_ => Mode::InPerson,
		}
	}

	/// Number of steps in the checklist for this mode.
	pub fn step_count(&self) -> usize {
		match self {
			Mode::InPerson => 3,
			Mode::Delivery => 4,
		}
	}

	/// Labels of the checklist steps, in order.
	pub fn step_labels(&self) -> &'static [&'static str] {
		const LABELS: [&str; 4] = ["입금 확인", "재료 수령 완료", "제작 완료", "배송 정보 입력"];
		&LABELS[..self.step_count()]
	}

	/// Label shown for the transaction mode.
	pub fn label(&self) -> &'static str {
		match self {
			Mode::InPerson => "대면",
			Mode::Delivery => "비대면",
		}
	}
}

/// An order as held by the in-progress screen.
///
/// Only `status` is ever replaced locally, and only with a value the order
/// service has confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Opaque order identifier.
	pub id: String,
	/// Transaction mode.
	pub mode: Mode,
	/// Last known server status.
	pub status: OrderStatus,
	/// Transaction identifier, required for recording delivery details.
	pub transaction_id: Option<String>,
	/// Title of the ordered service.
	pub service_title: Option<String>,
	/// Name of the buyer.
	pub orderer_name: Option<String>,
	/// Order date as reported by the service.
	pub order_date: Option<String>,
	/// Image attached to the order, if any.
	pub image_url: Option<String>,
}

impl Order {
	/// Creates an order with no display attributes.
	pub fn new(id: impl Into<String>, mode: Mode, status: OrderStatus) -> Self {
		Self {
			id: id.into(),
			mode,
			status,
			transaction_id: None,
			service_title: None,
			orderer_name: None,
			order_date: None,
			image_url: None,
		}
	}

	/// Sets the transaction identifier.
	pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
		self.transaction_id = Some(transaction_id.into());
		self
	}

	/// Sets the order date.
	pub fn with_order_date(mut self, order_date: impl Into<String>) -> Self {
		self.order_date = Some(order_date.into());
		self
	}
}

/// Sort direction for the in-progress list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	/// Oldest first ("오래된 순").
	#[default]
	Asc,
	/// Newest first ("최신순").
	Desc,
}

impl SortOrder {
	/// Label shown in the sort picker.
	pub fn label(&self) -> &'static str {
		match self {
			SortOrder::Asc => "오래된 순",
			SortOrder::Desc => "최신순",
		}
	}
}

impl FromStr for SortOrder {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"asc" => Ok(SortOrder::Asc),
			"desc" => Ok(SortOrder::Desc),
			other => Err(UnknownStatus(other.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_ordering() {
		assert!(OrderStatus::Deliver.is_at_least(OrderStatus::Received));
		assert!(OrderStatus::Received.is_at_least(OrderStatus::Received));
		assert!(!OrderStatus::Accepted.is_at_least(OrderStatus::Received));
		assert!(!OrderStatus::Rejected.is_at_least(OrderStatus::Pending));
		assert!(!OrderStatus::End.is_at_least(OrderStatus::Rejected));
	}

	#[test]
	fn test_status_wire_roundtrip() {
		for status in OrderStatus::ALL {
			assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
			let json = serde_json::to_string(&status).unwrap();
			assert_eq!(json, format!("\"{}\"", status.as_str()));
		}
		assert!("shipped".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn test_mode_steps() {
		assert_eq!(Mode::InPerson.step_count(), 3);
		assert_eq!(Mode::Delivery.step_count(), 4);
		assert_eq!(Mode::Delivery.step_labels()[3], "배송 정보 입력");
		assert_eq!(Mode::InPerson.step_labels().len(), 3);
	}

	#[test]
	fn test_mode_from_transaction_option() {
		assert_eq!(Mode::from_transaction_option(Some("delivery")), Mode::Delivery);
		assert_eq!(Mode::from_transaction_option(Some("pickup")), Mode::InPerson);
		assert_eq!(Mode::from_transaction_option(None), Mode::InPerson);
	}
}
