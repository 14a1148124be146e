//! String formatting utilities.
//!
//! Order identifiers are UUIDs; logs only carry a short prefix of them.

/// Truncates an identifier for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((end, _)) => format!("{}..", &id[..end]),
		None => id.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_short_id() {
		assert_eq!(truncate_id("O1"), "O1");
		assert_eq!(truncate_id("12345678"), "12345678");
	}

	#[test]
	fn test_truncate_uuid() {
		assert_eq!(
			truncate_id("6f1c2a0e-93b1-4c7a-a1de-2f4e5b6c7d8e"),
			"6f1c2a0e.."
		);
	}
}
