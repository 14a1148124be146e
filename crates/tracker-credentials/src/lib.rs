//! Credential store for the order progress tracker.
//!
//! Every call to the order service needs a bearer token. This crate defines
//! where that token comes from. A store that has no token means the seller is
//! not logged in; callers short-circuit before touching the network.

use async_trait::async_trait;
use thiserror::Error;
use tracker_types::{ConfigSchema, ImplementationRegistry, SecretString};

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod fixed;
}

/// Errors that can occur while reading credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
	/// The backing store could not be read.
	#[error("Credential store unavailable: {0}")]
	Unavailable(String),
	/// The implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface for credential stores.
#[async_trait]
pub trait CredentialInterface: Send + Sync {
	/// Returns the configuration schema for this credential implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Returns the current access token, `None` when logged out.
	async fn access_token(&self) -> Result<Option<SecretString>, CredentialError>;
}

/// Type alias for credential factory functions.
pub type CredentialFactory =
	fn(&toml::Value) -> Result<Box<dyn CredentialInterface>, CredentialError>;

/// Registry trait for credential implementations.
pub trait CredentialRegistry: ImplementationRegistry<Factory = CredentialFactory> {}

/// Get all registered credential implementations.
pub fn get_all_implementations() -> Vec<(&'static str, CredentialFactory)> {
	use implementations::{file, fixed};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(fixed::Registry::NAME, fixed::Registry::factory()),
	]
}

/// Service that hands out access tokens.
pub struct CredentialService {
	implementation: Box<dyn CredentialInterface>,
}

impl CredentialService {
	/// Creates a new CredentialService over the given implementation.
	pub fn new(implementation: Box<dyn CredentialInterface>) -> Self {
		Self { implementation }
	}

	/// Returns the access token, or `None` when the seller is not logged in.
	///
	/// Blank tokens count as absent. A store that cannot be read is logged and
	/// also treated as logged out.
	pub async fn get_access_token(&self) -> Option<SecretString> {
		match self.implementation.access_token().await {
			Ok(Some(token)) if !token.is_blank() => Some(token),
			Ok(_) => None,
			Err(e) => {
				tracing::warn!(error = %e, "Failed to read access token");
				None
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::fixed::FixedCredentials;

	struct BrokenStore;

	#[async_trait]
	impl CredentialInterface for BrokenStore {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(implementations::fixed::FixedCredentialsSchema)
		}

		async fn access_token(&self) -> Result<Option<SecretString>, CredentialError> {
			Err(CredentialError::Unavailable("keychain locked".into()))
		}
	}

	#[tokio::test]
	async fn test_token_present() {
		let service = CredentialService::new(Box::new(FixedCredentials::new(Some("abc".into()))));
		assert_eq!(service.get_access_token().await, Some(SecretString::from("abc")));
	}

	#[tokio::test]
	async fn test_blank_and_missing_tokens_are_absent() {
		let blank = CredentialService::new(Box::new(FixedCredentials::new(Some("".into()))));
		assert_eq!(blank.get_access_token().await, None);

		let missing = CredentialService::new(Box::new(FixedCredentials::new(None)));
		assert_eq!(missing.get_access_token().await, None);
	}

	#[tokio::test]
	async fn test_unreadable_store_is_logged_out() {
		let service = CredentialService::new(Box::new(BrokenStore));
		assert_eq!(service.get_access_token().await, None);
	}
}
