//! In-progress orders screen.
//!
//! Fetches the seller's orders from every configured status bucket, keeps
//! them sorted by order date, and hands out a [`OrderProgress`] per order.
//! Also loads the seller's chat link and opens it on request.

use crate::cache::StepCache;
use crate::progress::OrderProgress;
use crate::sync::StatusSyncController;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use tracker_client::OrderClient;
use tracker_credentials::CredentialService;
use tracker_types::{Order, OrderRecord, OrderStatus, ReformerProfile, SecretString, SortOrder};

/// Errors that stop a refresh entirely.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
	#[error("Login required")]
	AuthMissing,
}

/// Errors raised by an external link opener.
#[derive(Debug, Error)]
pub enum LinkError {
	#[error("Failed to open link: {0}")]
	Open(String),
}

/// Errors opening the seller's chat channel.
#[derive(Debug, Error)]
pub enum ChatError {
	/// The profile carried no link, or it was never loaded.
	#[error("Chat link is not available")]
	LinkMissing,
	#[error(transparent)]
	Open(#[from] LinkError),
}

/// Opens external links.
#[async_trait]
pub trait LinkOpener: Send + Sync {
	/// Opens `url` outside the app.
	async fn open(&self, url: &str) -> Result<(), LinkError>;
}

/// A bucket that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketFailure {
	pub status: OrderStatus,
	pub reason: String,
}

/// Outcome of a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
	/// Orders now shown.
	pub loaded: usize,
	/// Buckets left out of the list.
	pub failed: Vec<BucketFailure>,
}

impl RefreshSummary {
	/// True when some buckets failed and the list shows only the rest.
	pub fn is_partial(&self) -> bool {
		!self.failed.is_empty()
	}
}

/// The seller's list of orders in progress.
pub struct InProgressOrders {
	credentials: Arc<CredentialService>,
	client: Arc<OrderClient>,
	cache: Arc<StepCache>,
	sync: Arc<StatusSyncController>,
	statuses: Vec<OrderStatus>,
	sort_order: SortOrder,
	orders: Vec<Order>,
	reformer_link: Option<String>,
}

impl InProgressOrders {
	/// Creates an empty screen fetching the given status buckets.
	pub fn new(
		credentials: Arc<CredentialService>,
		client: Arc<OrderClient>,
		cache: Arc<StepCache>,
		sync: Arc<StatusSyncController>,
		statuses: Vec<OrderStatus>,
		sort_order: SortOrder,
	) -> Self {
		Self {
			credentials,
			client,
			cache,
			sync,
			statuses,
			sort_order,
			orders: Vec::new(),
			reformer_link: None,
		}
	}

	/// Orders currently shown, in the selected sort order.
	pub fn orders(&self) -> &[Order] {
		&self.orders
	}

	/// Looks up a shown order.
	pub fn find(&self, order_id: &str) -> Option<&Order> {
		self.orders.iter().find(|order| order.id == order_id)
	}

	/// Selected sort direction.
	pub fn sort_order(&self) -> SortOrder {
		self.sort_order
	}

	/// Changes the sort direction and re-sorts the shown orders.
	pub fn set_sort_order(&mut self, sort_order: SortOrder) {
		self.sort_order = sort_order;
		sort_orders(&mut self.orders, sort_order);
	}

	/// The seller's chat link, once loaded.
	pub fn reformer_link(&self) -> Option<&str> {
		self.reformer_link.as_deref()
	}

	/// Re-fetches every bucket and the chat link.
	///
	/// Buckets are requested in parallel. A failed bucket is logged and left
	/// out; the others still replace the list. Called on every screen focus,
	/// with no de-duplication against a refresh still running.
	#[instrument(skip_all, fields(buckets = self.statuses.len()))]
	pub async fn refresh(&mut self) -> Result<RefreshSummary, RefreshError> {
		let token = self.credentials.get_access_token().await.ok_or_else(|| {
			tracing::warn!("No access token, refresh skipped");
			RefreshError::AuthMissing
		})?;

		let buckets = join_all(
			self.statuses
				.iter()
				.map(|status| fetch_bucket(&self.client, *status, &token)),
		);
		let (results, link) = futures::join!(buckets, fetch_reformer_link(&self.client, &token));

		let mut orders = Vec::new();
		let mut failed = Vec::new();
		for (status, result) in self.statuses.iter().zip(results) {
			match result {
				Ok(bucket) => orders.extend(bucket),
				Err(reason) => {
					tracing::warn!(status = %status, reason = %reason, "Bucket fetch failed");
					failed.push(BucketFailure {
						status: *status,
						reason,
					});
				},
			}
		}

		sort_orders(&mut orders, self.sort_order);
		self.orders = orders;
		if link.is_some() {
			self.reformer_link = link;
		}

		let summary = RefreshSummary {
			loaded: self.orders.len(),
			failed,
		};
		tracing::info!(loaded = summary.loaded, failed = summary.failed.len(), "Refreshed");
		Ok(summary)
	}

	/// Mounts the progress state of a shown order.
	pub async fn progress(&self, order_id: &str) -> Option<OrderProgress> {
		let order = self.find(order_id)?.clone();
		Some(OrderProgress::mount(order, self.cache.clone(), self.sync.clone()).await)
	}

	/// Opens the seller's chat channel.
	///
	/// Without a loaded link the opener is not called.
	pub async fn open_chat(&self, opener: &dyn LinkOpener) -> Result<(), ChatError> {
		let link = self.reformer_link.as_deref().ok_or(ChatError::LinkMissing)?;
		opener.open(link).await?;
		Ok(())
	}
}

/// Sorts by the order date string. Orders without a date sort first.
fn sort_orders(orders: &mut [Order], sort_order: SortOrder) {
	match sort_order {
		SortOrder::Asc => orders.sort_by(|a, b| a.order_date.cmp(&b.order_date)),
		SortOrder::Desc => orders.sort_by(|a, b| b.order_date.cmp(&a.order_date)),
	}
}

/// Fetches one status bucket. Records that fail to decode are skipped.
async fn fetch_bucket(
	client: &OrderClient,
	status: OrderStatus,
	token: &SecretString,
) -> Result<Vec<Order>, String> {
	let response = client
		.list_orders(status, token)
		.await
		.map_err(|e| e.to_string())?;
	if !response.is_success() {
		return Err(format!("status {}", response.status));
	}
	let serde_json::Value::Array(records) = response.body else {
		return Err("response body is not a list".to_string());
	};

	let orders = records
		.into_iter()
		.filter_map(|value| {
			let record = serde_json::from_value::<OrderRecord>(value)
				.map_err(|e| tracing::warn!(status = %status, error = %e, "Skipping malformed order"))
				.ok()?;
			record
				.into_order(Some(status))
				.map_err(|e| tracing::warn!(status = %status, error = %e, "Skipping order"))
				.ok()
		})
		.collect();
	Ok(orders)
}

/// Loads the seller's chat link. Failures are logged only.
async fn fetch_reformer_link(client: &OrderClient, token: &SecretString) -> Option<String> {
	let response = match client.reformer_profile(token).await {
		Ok(response) if response.is_success() => response,
		Ok(response) => {
			tracing::warn!(status = response.status, "Failed to load reformer profile");
			return None;
		},
		Err(e) => {
			tracing::warn!(error = %e, "Failed to load reformer profile");
			return None;
		},
	};

	match serde_json::from_value::<ReformerProfile>(response.body) {
		Ok(profile) => profile.reformer_link.filter(|link| !link.is_empty()),
		Err(e) => {
			tracing::warn!(error = %e, "Malformed reformer profile");
			None
		},
	}
}
