//! Derivation, reconciliation and toggle rules for step vectors.
//!
//! Steps are a one-way ratchet within a session: deriving from a status only
//! ever adds flags to what is already shown. The single exception is a status
//! of exactly `accepted`, which restarts the visible checklist.

use thiserror::Error;
use tracker_types::{Mode, OrderStatus, StepVector};

/// Index of the "produced" step, the gate for the delivery form.
pub const PRODUCED_STEP: usize = 2;

/// Index of the delivery step. It has no checkbox and is only ever derived.
pub const DELIVERY_STEP: usize = 3;

/// Status thresholds per step. Steps 0 and 1 share the `received` threshold.
const THRESHOLDS: [OrderStatus; 4] = [
	OrderStatus::Received,
	OrderStatus::Received,
	OrderStatus::Produced,
	OrderStatus::Deliver,
];

/// Errors rejecting a toggle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
	#[error("Step {index} does not exist in a {len}-step checklist")]
	OutOfRange { index: usize, len: usize },
	#[error("Step {0} is set by the order status and cannot be toggled")]
	NotToggleable(usize),
	#[error("Steps are locked while delivery details are submitted")]
	Locked,
}

/// Result of a successful toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
	/// Vector after the flip.
	pub steps: StepVector,
	/// New value of the toggled flag.
	pub value: bool,
	/// Transition to request from the order service, if any.
	pub transition: Option<OrderStatus>,
}

/// Computes the step vector implied by `status` alone.
pub fn derive_steps(status: OrderStatus, mode: Mode) -> StepVector {
	let mut steps = StepVector::new(mode);
	if status == OrderStatus::Accepted {
		return steps;
	}
	for (index, threshold) in THRESHOLDS.iter().enumerate().take(mode.step_count()) {
		steps.set(index, status.is_at_least(*threshold));
	}
	steps
}

/// Merges a status with the flags already shown or cached.
///
/// `accepted` resets to all-false regardless of `current`. Any other status is
/// OR-ed with `current`, so a lagging server read never hides a flag the
/// seller already ticked.
pub fn reconcile(status: OrderStatus, mode: Mode, current: Option<&StepVector>) -> StepVector {
	let derived = derive_steps(status, mode);
	match current {
		Some(current) if status != OrderStatus::Accepted => derived.union(current),
		_ => derived,
	}
}

/// Status requested when the step at `index` becomes true.
pub fn transition_for_index(index: usize) -> Option<OrderStatus> {
	match index {
		1 => Some(OrderStatus::Received),
		PRODUCED_STEP => Some(OrderStatus::Produced),
		_ => None,
	}
}

/// Flips the flag at `index`.
///
/// Only the checkbox steps (every step before the delivery step) can be
/// toggled, and none while delivery details are submitted. Turning a flag off
/// never requests a transition.
pub fn toggle(steps: &StepVector, index: usize, submitted: bool) -> Result<ToggleOutcome, StepError> {
	let current = steps.get(index).ok_or(StepError::OutOfRange {
		index,
		len: steps.len(),
	})?;
	if index >= DELIVERY_STEP {
		return Err(StepError::NotToggleable(index));
	}
	if submitted {
		return Err(StepError::Locked);
	}

	let value = !current;
	let mut next = *steps;
	next.set(index, value);

	Ok(ToggleOutcome {
		steps: next,
		value,
		transition: if value {
			transition_for_index(index)
		} else {
			None
		},
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_derivation_table() {
		let cases = [
			(OrderStatus::Pending, [false, false, false, false]),
			(OrderStatus::Accepted, [false, false, false, false]),
			(OrderStatus::Received, [true, true, false, false]),
			(OrderStatus::Produced, [true, true, true, false]),
			(OrderStatus::Deliver, [true, true, true, true]),
			(OrderStatus::End, [true, true, true, true]),
			(OrderStatus::Rejected, [false, false, false, false]),
		];
		for (status, expected) in cases {
			assert_eq!(
				derive_steps(status, Mode::Delivery).as_slice(),
				&expected,
				"{}",
				status
			);
			assert_eq!(
				derive_steps(status, Mode::InPerson).as_slice(),
				&expected[..3],
				"{}",
				status
			);
		}
	}

	#[test]
	fn test_derivation_is_idempotent() {
		for status in OrderStatus::ALL {
			for mode in [Mode::InPerson, Mode::Delivery] {
				let once = derive_steps(status, mode);
				assert_eq!(once, derive_steps(status, mode));
				assert_eq!(once, reconcile(status, mode, Some(&once)));
			}
		}
	}

	#[test]
	fn test_delivery_step_only_exists_in_delivery_mode() {
		for status in OrderStatus::ALL {
			let delivery = derive_steps(status, Mode::Delivery);
			assert_eq!(
				delivery.get(DELIVERY_STEP),
				Some(status.is_at_least(OrderStatus::Deliver))
			);

			let in_person = derive_steps(status, Mode::InPerson);
			assert_eq!(in_person.len(), 3);
			assert_eq!(in_person.get(DELIVERY_STEP), None);
		}
	}

	#[test]
	fn test_local_flags_survive_earlier_status() {
		let ticked = StepVector::from_flags(Mode::Delivery, &[true, true, true, false]);
		for status in [
			OrderStatus::Pending,
			OrderStatus::Received,
			OrderStatus::Rejected,
		] {
			let merged = reconcile(status, Mode::Delivery, Some(&ticked));
			assert_eq!(merged.as_slice(), ticked.as_slice(), "{}", status);
		}
	}

	#[test]
	fn test_accepted_resets_local_flags() {
		let ticked = StepVector::from_flags(Mode::Delivery, &[true, true, true, true]);
		let merged = reconcile(OrderStatus::Accepted, Mode::Delivery, Some(&ticked));
		assert_eq!(merged.as_slice(), &[false, false, false, false]);
	}

	#[test]
	fn test_reconcile_without_cache() {
		let merged = reconcile(OrderStatus::Produced, Mode::InPerson, None);
		assert_eq!(merged.as_slice(), &[true, true, true]);
	}

	#[test]
	fn test_toggle_requests_transition_only_when_set() {
		let steps = StepVector::new(Mode::Delivery);
		let on = toggle(&steps, 1, false).unwrap();
		assert!(on.value);
		assert_eq!(on.transition, Some(OrderStatus::Received));

		let off = toggle(&on.steps, 1, false).unwrap();
		assert!(!off.value);
		assert_eq!(off.transition, None);

		let produced = toggle(&steps, 2, false).unwrap();
		assert_eq!(produced.transition, Some(OrderStatus::Produced));

		let paid = toggle(&steps, 0, false).unwrap();
		assert_eq!(paid.transition, None);
		assert!(paid.steps.is_set(0));
	}

	#[test]
	fn test_toggle_rejections() {
		let delivery = StepVector::new(Mode::Delivery);
		assert_eq!(
			toggle(&delivery, DELIVERY_STEP, false),
			Err(StepError::NotToggleable(3))
		);
		assert_eq!(toggle(&delivery, 0, true), Err(StepError::Locked));

		let in_person = StepVector::new(Mode::InPerson);
		assert_eq!(
			toggle(&in_person, 3, false),
			Err(StepError::OutOfRange { index: 3, len: 3 })
		);
	}
}
