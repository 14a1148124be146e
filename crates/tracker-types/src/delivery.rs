//! Delivery details captured for delivery-mode orders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown in the carrier picker before a carrier is chosen.
pub const UNSELECTED_CARRIER: &str = "택배사 선택";

/// Parcel carriers the seller can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carrier {
	#[serde(rename = "CJ 대한통운")]
	CjLogistics,
	#[serde(rename = "우체국택배")]
	KoreaPost,
	#[serde(rename = "한진택배")]
	Hanjin,
	#[serde(rename = "롯데택배")]
	Lotte,
}

impl Carrier {
	/// Picker options, in display order.
	pub const OPTIONS: [Carrier; 4] = [
		Carrier::CjLogistics,
		Carrier::KoreaPost,
		Carrier::Hanjin,
		Carrier::Lotte,
	];

	/// Name sent to the order service and shown in the picker.
	pub fn name(&self) -> &'static str {
		match self {
			Carrier::CjLogistics => "CJ 대한통운",
			Carrier::KoreaPost => "우체국택배",
			Carrier::Hanjin => "한진택배",
			Carrier::Lotte => "롯데택배",
		}
	}
}

impl fmt::Display for Carrier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Carrier {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::OPTIONS
			.into_iter()
			.find(|carrier| carrier.name() == s.trim())
			.ok_or_else(|| format!("Unknown carrier: {}", s))
	}
}

/// Delivery details for one order.
///
/// `carrier == None` is the unselected state. Editing clears only
/// `submitted`; carrier and tracking number pre-fill the reopened form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryInfo {
	/// Chosen carrier.
	pub carrier: Option<Carrier>,
	/// Tracking number as typed.
	pub tracking_number: String,
	/// Whether the delivery details have been accepted by the order service.
	pub submitted: bool,
}

impl DeliveryInfo {
	/// Label of the carrier picker.
	pub fn carrier_label(&self) -> &'static str {
		self.carrier.map_or(UNSELECTED_CARRIER, |carrier| carrier.name())
	}
}

/// Delivery details attached to a `deliver` transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPayload {
	/// Transaction the delivery belongs to.
	pub transaction_id: String,
	/// Carrier shipping the goods.
	pub carrier: Carrier,
	/// Carrier tracking number.
	pub tracking_number: String,
}
