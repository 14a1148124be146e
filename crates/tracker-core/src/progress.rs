//! Per-order progress state.
//!
//! [`OrderProgress`] owns everything one order card shows: the order, its step
//! vector and its delivery details. Each instance reads its cache entry once
//! when mounted and writes it on every change; no state is shared between
//! orders. A status of `accepted` restarts the checklist and drops the saved
//! flags along with the shown ones.
//!
//! Local changes are written ahead of the remote request and are not rolled
//! back when the request fails. The seller sees the step they ticked, and the
//! error, and may retry.

use crate::cache::StepCache;
use crate::delivery::{self, DeliveryFlowError};
use crate::state::{self, StepError};
use crate::sync::{StatusSyncController, SyncError};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use tracker_types::{truncate_id, Carrier, DeliveryInfo, Order, OrderStatus, StepVector};

/// Errors surfaced by user actions on an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
	#[error(transparent)]
	Step(#[from] StepError),
	#[error(transparent)]
	Delivery(#[from] DeliveryFlowError),
	#[error(transparent)]
	Sync(#[from] SyncError),
}

/// Progress state of one order.
pub struct OrderProgress {
	order: Order,
	steps: StepVector,
	delivery: DeliveryInfo,
	cache: Arc<StepCache>,
	sync: Arc<StatusSyncController>,
}

impl OrderProgress {
	/// Loads the cache entry for `order` and reconciles it with its status.
	#[instrument(skip_all, fields(order_id = %truncate_id(&order.id)))]
	pub async fn mount(order: Order, cache: Arc<StepCache>, sync: Arc<StatusSyncController>) -> Self {
		let cached = cache.load_steps(&order.id, order.mode).await;
		let delivery = cache.load_delivery(&order.id).await.unwrap_or_default();
		let steps = state::reconcile(order.status, order.mode, cached.as_ref());
		if order.status == OrderStatus::Accepted && cached.is_some() {
			cache.clear_steps(&order.id).await;
		}

		tracing::debug!(
			status = %order.status,
			steps = ?steps.as_slice(),
			submitted = delivery.submitted,
			"Mounted"
		);

		Self {
			order,
			steps,
			delivery,
			cache,
			sync,
		}
	}

	/// The order as last confirmed by the service.
	pub fn order(&self) -> &Order {
		&self.order
	}

	/// Current status.
	pub fn status(&self) -> OrderStatus {
		self.order.status
	}

	/// Current step vector.
	pub fn steps(&self) -> &StepVector {
		&self.steps
	}

	/// Current delivery details.
	pub fn delivery(&self) -> &DeliveryInfo {
		&self.delivery
	}

	/// Completed-step count used to size the progress indicator.
	pub fn progress(&self) -> usize {
		self.steps.progress()
	}

	/// Fraction of the progress line to fill.
	pub fn fill_ratio(&self) -> f64 {
		self.steps.fill_ratio()
	}

	/// Whether step checkboxes accept input.
	pub fn steps_locked(&self) -> bool {
		self.delivery.submitted
	}

	/// Whether the delivery form can be filled in.
	pub fn can_enter_delivery(&self) -> bool {
		delivery::can_enter(self.order.mode, &self.steps, self.delivery.submitted)
	}

	/// Whether the edit affordance is shown.
	pub fn can_edit_delivery(&self) -> bool {
		delivery::can_edit(self.order.mode, &self.steps)
	}

	/// Flips the step at `index` and requests the matching transition.
	///
	/// The flag is saved before any request goes out and stays flipped when
	/// the request fails. Returns the confirmed status when a transition was
	/// requested.
	#[instrument(skip_all, fields(order_id = %truncate_id(&self.order.id), index = index))]
	pub async fn toggle_step(&mut self, index: usize) -> Result<Option<OrderStatus>, ProgressError> {
		let outcome = state::toggle(&self.steps, index, self.delivery.submitted)?;
		self.steps = outcome.steps;
		self.cache.save_steps(&self.order.id, &self.steps).await;
		tracing::debug!(value = outcome.value, "Step toggled");

		let Some(target) = outcome.transition else {
			return Ok(None);
		};

		// Write-ahead: a failed request keeps the flag as ticked.
		let confirmed = self
			.sync
			.request_transition(&self.order.id, target, None)
			.await?;
		self.apply_status(confirmed).await;
		Ok(Some(confirmed))
	}

	/// Validates and submits delivery details, then requests `deliver`.
	///
	/// Carrier and tracking number are saved as soon as they validate, so a
	/// failed submission keeps them for the next attempt. `submitted` is set
	/// once the service accepted the details, even if the status request that
	/// follows fails.
	#[instrument(skip_all, fields(order_id = %truncate_id(&self.order.id)))]
	pub async fn submit_delivery(
		&mut self,
		carrier: Option<Carrier>,
		tracking_number: &str,
	) -> Result<OrderStatus, ProgressError> {
		delivery::check_enterable(self.order.mode, &self.steps, self.delivery.submitted)?;
		let (carrier, tracking_number) = delivery::validate(carrier, tracking_number)?;

		self.delivery.carrier = Some(carrier);
		self.delivery.tracking_number = tracking_number;
		self.cache.save_delivery(&self.order.id, &self.delivery).await;

		let payload = delivery::payload(self.order.transaction_id.as_deref(), &self.delivery)?;

		match self
			.sync
			.request_transition(&self.order.id, OrderStatus::Deliver, Some(&payload))
			.await
		{
			Ok(confirmed) => {
				self.mark_submitted(true).await;
				self.apply_status(confirmed).await;
				Ok(confirmed)
			},
			Err(e) => {
				if e.delivery_recorded() {
					self.mark_submitted(true).await;
				}
				Err(e.into())
			},
		}
	}

	/// Reopens submitted delivery details for editing.
	///
	/// Only the submitted flag is cleared; carrier and tracking number stay to
	/// pre-fill the form.
	#[instrument(skip_all, fields(order_id = %truncate_id(&self.order.id)))]
	pub async fn edit_delivery(&mut self) -> Result<(), ProgressError> {
		delivery::check_editable(self.order.mode, &self.steps)?;
		self.mark_submitted(false).await;
		Ok(())
	}

	/// Replaces the status and re-derives the steps from it.
	pub async fn apply_status(&mut self, status: OrderStatus) {
		self.order.status = status;
		self.steps = state::reconcile(status, self.order.mode, Some(&self.steps));
		if status == OrderStatus::Accepted {
			self.cache.clear_steps(&self.order.id).await;
		}
	}

	async fn mark_submitted(&mut self, submitted: bool) {
		self.delivery.submitted = submitted;
		self.cache.save_submitted(&self.order.id, submitted).await;
	}
}
