//! Core of the order progress tracker.
//!
//! Tracks each order from seller acceptance to delivery as a checklist of
//! steps. Step flags are cached per order, reconciled with the status the
//! order service reports, and advanced by the seller; advancing a step or
//! submitting delivery details requests the matching status transition.
//!
//! - [`cache`]: per-order persisted step flags and delivery details
//! - [`state`]: status-to-steps derivation and toggle rules
//! - [`delivery`]: delivery form gating and validation
//! - [`sync`]: authenticated status-transition requests
//! - [`progress`]: the per-order state object tying these together
//! - [`screen`]: the in-progress order list

use std::sync::Arc;
use tracker_client::OrderClient;
use tracker_config::Config;
use tracker_credentials::CredentialService;
use tracker_storage::StorageService;

pub mod builder;
pub mod cache;
pub mod delivery;
pub mod progress;
pub mod screen;
pub mod state;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{BuilderError, TrackerBuilder, TrackerFactories};
pub use cache::StepCache;
pub use delivery::DeliveryFlowError;
pub use progress::{OrderProgress, ProgressError};
pub use screen::{
	BucketFailure, ChatError, InProgressOrders, LinkError, LinkOpener, RefreshError,
	RefreshSummary,
};
pub use state::StepError;
pub use sync::{StatusSyncController, SyncError, SyncStage};

/// Assembled tracker services.
///
/// Holds the shared collaborators; every screen and order built from it uses
/// the same storage, credentials and client.
pub struct Tracker {
	config: Config,
	credentials: Arc<CredentialService>,
	client: Arc<OrderClient>,
	cache: Arc<StepCache>,
	sync: Arc<StatusSyncController>,
}

impl Tracker {
	/// Creates a tracker from its collaborators.
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		credentials: Arc<CredentialService>,
		client: Arc<OrderClient>,
	) -> Self {
		let cache = Arc::new(StepCache::new(storage));
		let sync = Arc::new(StatusSyncController::new(
			credentials.clone(),
			client.clone(),
		));
		Self {
			config,
			credentials,
			client,
			cache,
			sync,
		}
	}

	/// Configuration the tracker was built from.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Step cache shared by every order.
	pub fn cache(&self) -> &Arc<StepCache> {
		&self.cache
	}

	/// Status sync controller shared by every order.
	pub fn sync(&self) -> &Arc<StatusSyncController> {
		&self.sync
	}

	/// Creates an in-progress screen using the configured buckets and sort.
	pub fn screen(&self) -> InProgressOrders {
		InProgressOrders::new(
			self.credentials.clone(),
			self.client.clone(),
			self.cache.clone(),
			self.sync.clone(),
			self.config.refresh.statuses.clone(),
			self.config.refresh.order,
		)
	}
}
