//! Step vector for the fulfillment checklist.
//!
//! The checklist has a fixed number of steps per transaction mode. Flags are
//! stored in a fixed-size array and only the first `mode.step_count()` entries
//! are meaningful.

use crate::Mode;

/// Largest step count of any mode.
pub const MAX_STEPS: usize = 4;

/// Ordered completion flags for one order's checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepVector {
	mode: Mode,
	flags: [bool; MAX_STEPS],
}

impl StepVector {
	/// Creates an all-false vector for the given mode.
	pub fn new(mode: Mode) -> Self {
		Self {
			mode,
			flags: [false; MAX_STEPS],
		}
	}

	/// Builds a vector from persisted flags.
	///
	/// Extra entries are ignored and missing entries are false, so a vector
	/// saved under a different mode still loads.
	pub fn from_flags(mode: Mode, flags: &[bool]) -> Self {
		let mut vector = Self::new(mode);
		for (slot, flag) in vector.flags.iter_mut().zip(flags).take(mode.step_count()) {
			*slot = *flag;
		}
		vector
	}

	/// Transaction mode this vector was built for.
	pub fn mode(&self) -> Mode {
		self.mode
	}

	/// Number of steps.
	pub fn len(&self) -> usize {
		self.mode.step_count()
	}

	/// Always false; a checklist has at least three steps.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The meaningful flags.
	pub fn as_slice(&self) -> &[bool] {
		&self.flags[..self.len()]
	}

	/// Flag at `index`, `None` when the index does not exist for this mode.
	pub fn get(&self, index: usize) -> Option<bool> {
		self.as_slice().get(index).copied()
	}

	/// Flag at `index`, false when out of range.
	pub fn is_set(&self, index: usize) -> bool {
		self.get(index).unwrap_or(false)
	}

	/// Sets the flag at `index`. Returns false when the index is out of range.
	pub fn set(&mut self, index: usize, value: bool) -> bool {
		if index >= self.len() {
			return false;
		}
		self.flags[index] = value;
		true
	}

	/// Element-wise OR with another vector of any mode.
	pub fn union(&self, other: &StepVector) -> StepVector {
		let mut merged = *self;
		for (index, flag) in other.as_slice().iter().enumerate() {
			if index < merged.len() {
				merged.flags[index] |= *flag;
			}
		}
		merged
	}

	/// Number of true flags anywhere in the vector.
	pub fn true_count(&self) -> usize {
		self.as_slice().iter().filter(|flag| **flag).count()
	}

	/// Number of contiguous true flags starting at index 0.
	pub fn contiguous_completed(&self) -> usize {
		self.as_slice().iter().take_while(|flag| **flag).count()
	}

	/// Progress metric used to size the progress indicator.
	///
	/// The final step is rendered separately, so the count is capped at
	/// `len() - 1`.
	pub fn progress(&self) -> usize {
		self.contiguous_completed().min(self.len() - 1)
	}

	/// Fraction of the progress line to fill, in `0.0..=1.0`.
	pub fn fill_ratio(&self) -> f64 {
		let segments = (self.len() - 1) as f64;
		(self.true_count() as f64 / segments).min(1.0)
	}
}
