//! Registry trait for self-registering implementations.
//!
//! Every pluggable backend (storage, credentials, order client) declares the
//! name it is configured under together with its factory function.

/// Base trait for implementation registries.
///
/// Each implementation module must provide a Registry struct that implements
/// this trait, tying the configuration key to the factory that builds it.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example:
	/// - "memory" for storage.implementations.memory
	/// - "static" for credentials.implementations.static
	/// - "http" for the order service client
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
