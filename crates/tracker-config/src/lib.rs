//! Configuration module for the order progress tracker.
//!
//! Loads the tracker configuration from TOML, resolving `${VAR}` and
//! `${VAR:-default}` references against the environment and validating the
//! result before anything is built from it.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["client.toml", "storage.toml"]` to include other files
//! - Each top-level section must be unique across all files

pub mod builders {
	pub mod config;
}
mod loader;

pub use builders::config::ConfigBuilder;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracker_types::{OrderStatus, SortOrder};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the tracker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this tracker instance.
	pub tracker: TrackerConfig,
	/// Order service transport.
	pub client: ClientConfig,
	/// Backend for the per-order step cache.
	pub storage: StorageConfig,
	/// Source of the seller's access token.
	pub credentials: CredentialsConfig,
	/// In-progress list refresh settings.
	#[serde(default)]
	pub refresh: RefreshConfig,
}

/// Configuration specific to the tracker instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
	/// Identifier used in logs.
	pub id: String,
}

/// Configuration for the order service transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of client implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the credential store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of credential implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the in-progress list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
	/// Status buckets fetched on every refresh, in request order.
	#[serde(default = "default_refresh_statuses")]
	pub statuses: Vec<OrderStatus>,
	/// Initial sort direction by order date.
	#[serde(default)]
	pub order: SortOrder,
}

impl Default for RefreshConfig {
	fn default() -> Self {
		Self {
			statuses: default_refresh_statuses(),
			order: SortOrder::default(),
		}
	}
}

/// Returns the buckets the in-progress screen shows.
fn default_refresh_statuses() -> Vec<OrderStatus> {
	vec![
		OrderStatus::Accepted,
		OrderStatus::Received,
		OrderStatus::Produced,
		OrderStatus::Deliver,
	]
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates the configuration.
	///
	/// - Tracker ID is not empty
	/// - Each pluggable section names a primary that is configured
	/// - At least one refresh bucket, none of them repeated
	fn validate(&self) -> Result<(), ConfigError> {
		if self.tracker.id.is_empty() {
			return Err(ConfigError::Validation("Tracker ID cannot be empty".into()));
		}

		validate_primary("client", &self.client.primary, &self.client.implementations)?;
		validate_primary(
			"storage",
			&self.storage.primary,
			&self.storage.implementations,
		)?;
		validate_primary(
			"credentials",
			&self.credentials.primary,
			&self.credentials.implementations,
		)?;

		if self.refresh.statuses.is_empty() {
			return Err(ConfigError::Validation(
				"At least one refresh status must be configured".into(),
			));
		}
		for (i, status) in self.refresh.statuses.iter().enumerate() {
			if self.refresh.statuses[..i].contains(status) {
				return Err(ConfigError::Validation(format!(
					"Refresh status '{}' is listed more than once",
					status
				)));
			}
		}

		Ok(())
	}
}

fn validate_primary(
	section: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
) -> Result<(), ConfigError> {
	if implementations.is_empty() {
		return Err(ConfigError::Validation(format!(
			"At least one {} implementation must be configured",
			section
		)));
	}
	if primary.is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} primary implementation cannot be empty",
			section
		)));
	}
	if !implementations.contains_key(primary) {
		return Err(ConfigError::Validation(format!(
			"Primary {} '{}' not found in implementations",
			section, primary
		)));
	}
	Ok(())
}

/// Parses a TOML string, resolving environment variables and validating the
/// result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[tracker]
id = "seller-app"

[client]
primary = "http"
[client.implementations.http]
base_url = "http://localhost:8000"

[storage]
primary = "memory"
[storage.implementations.memory]

[credentials]
primary = "static"
[credentials.implementations.static]
access_token = "token"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TRACKER_TEST_HOST", "localhost");
		std::env::set_var("TRACKER_TEST_PORT", "8000");

		let input = "base_url = \"http://${TRACKER_TEST_HOST}:${TRACKER_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "base_url = \"http://localhost:8000\"");

		std::env::remove_var("TRACKER_TEST_HOST");
		std::env::remove_var("TRACKER_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${TRACKER_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${TRACKER_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("TRACKER_MISSING_VAR"));
	}

	#[test]
	fn test_defaults() {
		let config: Config = BASE.parse().unwrap();
		assert_eq!(config.tracker.id, "seller-app");
		assert_eq!(
			config.refresh.statuses,
			vec![
				OrderStatus::Accepted,
				OrderStatus::Received,
				OrderStatus::Produced,
				OrderStatus::Deliver
			]
		);
		assert_eq!(config.refresh.order, SortOrder::Asc);
	}

	#[test]
	fn test_refresh_section() {
		let config: Config = format!(
			"{}\n[refresh]\nstatuses = [\"produced\", \"deliver\"]\norder = \"desc\"\n",
			BASE
		)
		.parse()
		.unwrap();
		assert_eq!(
			config.refresh.statuses,
			vec![OrderStatus::Produced, OrderStatus::Deliver]
		);
		assert_eq!(config.refresh.order, SortOrder::Desc);
	}

	#[test]
	fn test_invalid_refresh_statuses() {
		let empty: Result<Config, _> = format!("{}\n[refresh]\nstatuses = []\n", BASE).parse();
		assert!(empty.unwrap_err().to_string().contains("At least one refresh"));

		let repeated: Result<Config, _> =
			format!("{}\n[refresh]\nstatuses = [\"received\", \"received\"]\n", BASE).parse();
		assert!(repeated.unwrap_err().to_string().contains("more than once"));

		let unknown: Result<Config, _> =
			format!("{}\n[refresh]\nstatuses = [\"shipped\"]\n", BASE).parse();
		assert!(matches!(unknown, Err(ConfigError::Parse(_))));
	}

	#[test]
	fn test_primary_must_be_configured() {
		let config = BASE.replace("primary = \"memory\"", "primary = \"file\"");
		let result: Result<Config, _> = config.parse();
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary storage 'file' not found"));
	}

	#[test]
	fn test_empty_tracker_id() {
		let config = BASE.replace("id = \"seller-app\"", "id = \"\"");
		let result: Result<Config, _> = config.parse();
		assert!(result.unwrap_err().to_string().contains("Tracker ID"));
	}
}
