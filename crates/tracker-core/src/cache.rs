//! Per-order step cache.
//!
//! Persists step flags and delivery details in the key-value store, one key
//! per (order, field) pair. The cache never fails its caller: read errors
//! are logged and count as a miss, write errors are logged and dropped. The
//! in-memory state of the order stays authoritative for the session.

use std::sync::Arc;
use tracker_storage::StorageService;
use tracker_types::{truncate_id, Carrier, DeliveryInfo, Mode, StepVector, StorageKey};

/// Keyed store for per-order progress state.
pub struct StepCache {
	storage: Arc<StorageService>,
}

impl StepCache {
	/// Creates a cache over the given storage service.
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Loads the saved step flags, `None` on a miss or a read failure.
	pub async fn load_steps(&self, order_id: &str, mode: Mode) -> Option<StepVector> {
		let key = StorageKey::Steps.for_order(order_id);
		match self.storage.retrieve::<Vec<bool>>(&key).await {
			Ok(flags) => flags.map(|flags| StepVector::from_flags(mode, &flags)),
			Err(e) => {
				tracing::warn!(order_id = %truncate_id(order_id), key = %key, error = %e, "Failed to load steps");
				None
			},
		}
	}

	/// Saves the step flags.
	pub async fn save_steps(&self, order_id: &str, steps: &StepVector) {
		let key = StorageKey::Steps.for_order(order_id);
		if let Err(e) = self.storage.store(&key, &steps.as_slice()).await {
			tracing::warn!(order_id = %truncate_id(order_id), key = %key, error = %e, "Failed to save steps");
		}
	}

	/// Drops the saved step flags so a later status derives from scratch.
	pub async fn clear_steps(&self, order_id: &str) {
		let key = StorageKey::Steps.for_order(order_id);
		if let Err(e) = self.storage.remove(&key).await {
			tracing::warn!(order_id = %truncate_id(order_id), key = %key, error = %e, "Failed to clear steps");
		}
	}

	/// Loads the saved submitted flag, `None` on a miss or a read failure.
	pub async fn load_submitted(&self, order_id: &str) -> Option<bool> {
		let key = StorageKey::DeliverySubmitted.for_order(order_id);
		match self.storage.retrieve::<bool>(&key).await {
			Ok(submitted) => submitted,
			Err(e) => {
				tracing::warn!(order_id = %truncate_id(order_id), key = %key, error = %e, "Failed to load submitted flag");
				None
			},
		}
	}

	/// Saves the submitted flag.
	pub async fn save_submitted(&self, order_id: &str, submitted: bool) {
		let key = StorageKey::DeliverySubmitted.for_order(order_id);
		if let Err(e) = self.storage.store(&key, &submitted).await {
			tracing::warn!(order_id = %truncate_id(order_id), key = %key, error = %e, "Failed to save submitted flag");
		}
	}

	/// Loads carrier, tracking number and submitted flag.
	///
	/// Returns `None` when none of the three keys is present. A stored carrier
	/// name that is no longer offered loads as unselected.
	pub async fn load_delivery(&self, order_id: &str) -> Option<DeliveryInfo> {
		let courier = self.read_raw(order_id, StorageKey::Courier).await;
		let tracking = self.read_raw(order_id, StorageKey::Tracking).await;
		let submitted = self.load_submitted(order_id).await;

		if courier.is_none() && tracking.is_none() && submitted.is_none() {
			return None;
		}

		let carrier = courier.and_then(|name| match name.parse::<Carrier>() {
			Ok(carrier) => Some(carrier),
			Err(e) => {
				tracing::warn!(order_id = %truncate_id(order_id), error = %e, "Ignoring saved carrier");
				None
			},
		});

		Some(DeliveryInfo {
			carrier,
			tracking_number: tracking.unwrap_or_default(),
			submitted: submitted.unwrap_or(false),
		})
	}

	/// Saves carrier and tracking number. The submitted flag is saved separately.
	pub async fn save_delivery(&self, order_id: &str, delivery: &DeliveryInfo) {
		if let Some(carrier) = delivery.carrier {
			self.write_raw(order_id, StorageKey::Courier, carrier.name())
				.await;
		}
		self.write_raw(order_id, StorageKey::Tracking, &delivery.tracking_number)
			.await;
	}

	async fn read_raw(&self, order_id: &str, field: StorageKey) -> Option<String> {
		let key = field.for_order(order_id);
		match self.storage.get(&key).await {
			Ok(value) => value,
			Err(e) => {
				tracing::warn!(order_id = %truncate_id(order_id), key = %key, error = %e, "Failed to read cache entry");
				None
			},
		}
	}

	async fn write_raw(&self, order_id: &str, field: StorageKey, value: &str) {
		let key = field.for_order(order_id);
		if let Err(e) = self.storage.set(&key, value).await {
			tracing::warn!(order_id = %truncate_id(order_id), key = %key, error = %e, "Failed to write cache entry");
		}
	}
}
