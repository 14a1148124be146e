//! Delivery sub-flow.
//!
//! Gating and validation for the carrier and tracking-number form shown on
//! delivery-mode orders. Submission itself runs through
//! [`OrderProgress::submit_delivery`](crate::OrderProgress::submit_delivery).

use crate::state::steps::PRODUCED_STEP;
use thiserror::Error;
use tracker_types::{Carrier, DeliveryInfo, DeliveryPayload, Mode, StepVector};

/// Errors that stop a delivery submission before anything is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryFlowError {
	/// The order is shipped in person.
	#[error("Order is not a delivery order")]
	NotDeliveryMode,
	/// The produced step is not complete yet.
	#[error("Delivery details can be entered once the item is produced")]
	NotProduced,
	/// Details were already submitted; edit first.
	#[error("Delivery details already submitted")]
	AlreadySubmitted,
	/// Carrier unselected or tracking number empty.
	#[error("Select a carrier and enter a tracking number")]
	MissingFields,
	/// The order has no transaction to attach the delivery to.
	#[error("Order has no transaction")]
	MissingTransaction,
}

/// Whether the form may be opened for editing.
pub fn can_enter(mode: Mode, steps: &StepVector, submitted: bool) -> bool {
	check_enterable(mode, steps, submitted).is_ok()
}

/// Whether the edit affordance is shown.
pub fn can_edit(mode: Mode, steps: &StepVector) -> bool {
	check_editable(mode, steps).is_ok()
}

/// Gate checked before reopening submitted details.
pub fn check_editable(mode: Mode, steps: &StepVector) -> Result<(), DeliveryFlowError> {
	if mode != Mode::Delivery {
		return Err(DeliveryFlowError::NotDeliveryMode);
	}
	if !steps.is_set(PRODUCED_STEP) {
		return Err(DeliveryFlowError::NotProduced);
	}
	Ok(())
}

/// Gate checked before a submission.
pub fn check_enterable(
	mode: Mode,
	steps: &StepVector,
	submitted: bool,
) -> Result<(), DeliveryFlowError> {
	check_editable(mode, steps)?;
	if submitted {
		return Err(DeliveryFlowError::AlreadySubmitted);
	}
	Ok(())
}

/// Validates the form fields.
///
/// The tracking number is trimmed; whitespace alone counts as empty.
pub fn validate(
	carrier: Option<Carrier>,
	tracking_number: &str,
) -> Result<(Carrier, String), DeliveryFlowError> {
	let tracking_number = tracking_number.trim();
	match carrier {
		Some(carrier) if !tracking_number.is_empty() => Ok((carrier, tracking_number.to_string())),
		_ => Err(DeliveryFlowError::MissingFields),
	}
}

/// Builds the transition payload from validated details.
pub fn payload(
	transaction_id: Option<&str>,
	delivery: &DeliveryInfo,
) -> Result<DeliveryPayload, DeliveryFlowError> {
	let transaction_id = transaction_id
		.filter(|id| !id.is_empty())
		.ok_or(DeliveryFlowError::MissingTransaction)?;
	let carrier = delivery.carrier.ok_or(DeliveryFlowError::MissingFields)?;
	Ok(DeliveryPayload {
		transaction_id: transaction_id.to_string(),
		carrier,
		tracking_number: delivery.tracking_number.clone(),
	})
}
