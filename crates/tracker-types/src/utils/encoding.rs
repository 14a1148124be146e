//! Percent-encoding of identifiers embedded in paths.
//!
//! Order and transaction identifiers come from the order service and may
//! contain any character. They end up in URL path segments and in cache file
//! names, where separators must not leak through.

/// Percent-encodes every byte outside the RFC 3986 unreserved set.
///
/// The mapping is injective: distinct inputs always encode to distinct
/// outputs, and the result never contains `/`, `\`, `:`, `?` or `#`.
pub fn percent_encode(input: &str) -> String {
	let mut encoded = String::with_capacity(input.len());
	for byte in input.bytes() {
		if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
			encoded.push(char::from(byte));
		} else {
			encoded.push('%');
			encoded.push_str(&hex::encode_upper([byte]));
		}
	}
	encoded
}
