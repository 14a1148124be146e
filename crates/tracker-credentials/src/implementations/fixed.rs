//! Credential store holding a token fixed at startup.
//!
//! Configured as `static`. The token usually comes from an environment
//! variable through `${VAR}` substitution in the config file; leaving it out
//! runs the tracker logged out.

use crate::{CredentialError, CredentialFactory, CredentialInterface, CredentialRegistry};
use async_trait::async_trait;
use tracker_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, ValidationError,
};

/// Credential store with a fixed token.
pub struct FixedCredentials {
	token: Option<SecretString>,
}

impl FixedCredentials {
	/// Creates a store returning `token` on every request.
	pub fn new(token: Option<SecretString>) -> Self {
		Self { token }
	}
}

#[async_trait]
impl CredentialInterface for FixedCredentials {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FixedCredentialsSchema)
	}

	async fn access_token(&self) -> Result<Option<SecretString>, CredentialError> {
		Ok(self.token.clone())
	}
}

/// Configuration schema for FixedCredentials.
pub struct FixedCredentialsSchema;

impl ConfigSchema for FixedCredentialsSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![Field::new("access_token", FieldType::String)]).validate(config)
	}
}

/// Factory function to create a fixed credential store from configuration.
///
/// Configuration parameters:
/// - `access_token`: bearer token (optional; absent means logged out)
pub fn create_credentials(
	config: &toml::Value,
) -> Result<Box<dyn CredentialInterface>, CredentialError> {
	FixedCredentialsSchema
		.validate(config)
		.map_err(|e| CredentialError::Configuration(e.to_string()))?;

	let token = config
		.get("access_token")
		.and_then(|v| v.as_str())
		.map(SecretString::from);

	Ok(Box::new(FixedCredentials::new(token)))
}

/// Registry for the fixed credential implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "static";
	type Factory = CredentialFactory;

	fn factory() -> Self::Factory {
		create_credentials
	}
}

impl CredentialRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_factory_reads_token() {
		let config: toml::Value = toml::from_str("access_token = \"abc\"").unwrap();
		let store = create_credentials(&config).unwrap();
		assert_eq!(
			store.access_token().await.unwrap(),
			Some(SecretString::from("abc"))
		);
	}

	#[tokio::test]
	async fn test_factory_without_token() {
		let store = create_credentials(&toml::Value::Table(toml::map::Map::new())).unwrap();
		assert_eq!(store.access_token().await.unwrap(), None);
	}

	#[test]
	fn test_factory_rejects_wrong_type() {
		let config: toml::Value = toml::from_str("access_token = 42").unwrap();
		assert!(matches!(
			create_credentials(&config),
			Err(CredentialError::Configuration(_))
		));
	}
}
