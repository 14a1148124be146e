//! Credential store reading the token from a file.
//!
//! The file is read on every request, so logging in or out in another process
//! takes effect on the next action without restarting.

use crate::{CredentialError, CredentialFactory, CredentialInterface, CredentialRegistry};
use async_trait::async_trait;
use std::path::PathBuf;
use tracker_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, ValidationError,
};

/// Credential store backed by a token file.
pub struct FileCredentials {
	token_path: PathBuf,
}

impl FileCredentials {
	/// Creates a store reading the token from `token_path`.
	pub fn new(token_path: PathBuf) -> Self {
		Self { token_path }
	}
}

#[async_trait]
impl CredentialInterface for FileCredentials {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileCredentialsSchema)
	}

	async fn access_token(&self) -> Result<Option<SecretString>, CredentialError> {
		match tokio::fs::read_to_string(&self.token_path).await {
			Ok(content) => Ok(Some(SecretString::new(content.trim().to_string()))),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(CredentialError::Unavailable(format!(
				"{}: {}",
				self.token_path.display(),
				e
			))),
		}
	}
}

/// Configuration schema for FileCredentials.
pub struct FileCredentialsSchema;

impl ConfigSchema for FileCredentialsSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![Field::new("token_path", FieldType::String)], vec![]).validate(config)
	}
}

/// Factory function to create a file credential store from configuration.
///
/// Configuration parameters:
/// - `token_path`: path of the file holding the bearer token (required)
pub fn create_credentials(
	config: &toml::Value,
) -> Result<Box<dyn CredentialInterface>, CredentialError> {
	FileCredentialsSchema
		.validate(config)
		.map_err(|e| CredentialError::Configuration(e.to_string()))?;

	let token_path = config
		.get("token_path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| CredentialError::Configuration("token_path is required".into()))?;

	Ok(Box::new(FileCredentials::new(PathBuf::from(token_path))))
}

/// Registry for the file credential implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = CredentialFactory;

	fn factory() -> Self::Factory {
		create_credentials
	}
}

impl CredentialRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_reads_and_trims_token() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("token");
		std::fs::write(&path, "abc\n").unwrap();

		let store = FileCredentials::new(path);
		assert_eq!(
			store.access_token().await.unwrap(),
			Some(SecretString::from("abc"))
		);
	}

	#[tokio::test]
	async fn test_missing_file_is_logged_out() {
		let dir = TempDir::new().unwrap();
		let store = FileCredentials::new(dir.path().join("absent"));
		assert_eq!(store.access_token().await.unwrap(), None);
	}

	#[test]
	fn test_factory_requires_path() {
		assert!(matches!(
			create_credentials(&toml::Value::Table(toml::map::Map::new())),
			Err(CredentialError::Configuration(_))
		));
	}
}
