//! Storage key layout for the persisted per-order cache.

/// Fields persisted per order.
///
/// Each field is stored under its own key, `{prefix}_{order_id}`, so a single
/// failed write never corrupts the other fields of the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Whether delivery details were accepted (JSON boolean).
	DeliverySubmitted,
	/// Step completion flags (JSON array of booleans).
	Steps,
	/// Selected carrier name (raw string).
	Courier,
	/// Tracking number (raw string).
	Tracking,
}

impl StorageKey {
	/// Returns the key prefix.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::DeliverySubmitted => "deliverySubmitted",
			StorageKey::Steps => "steps",
			StorageKey::Courier => "courier",
			StorageKey::Tracking => "tracking",
		}
	}

	/// Returns the full key for one order.
	pub fn for_order(&self, order_id: &str) -> String {
		format!("{}_{}", self.as_str(), order_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_key_layout() {
		assert_eq!(
			StorageKey::DeliverySubmitted.for_order("O1"),
			"deliverySubmitted_O1"
		);
		assert_eq!(StorageKey::Steps.for_order("O1"), "steps_O1");
		assert_eq!(StorageKey::Courier.for_order("O1"), "courier_O1");
		assert_eq!(StorageKey::Tracking.for_order("O1"), "tracking_O1");
	}
}
