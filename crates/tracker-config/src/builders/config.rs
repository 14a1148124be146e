//! Configuration builder for tests and local runs.

use crate::{ClientConfig, Config, CredentialsConfig, RefreshConfig, StorageConfig, TrackerConfig};
use std::collections::HashMap;
use tracker_types::{OrderStatus, SortOrder};

/// Builder for creating `Config` instances with a fluent API.
///
/// Defaults to the in-memory storage, a static token and an HTTP client
/// pointed at localhost.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	tracker_id: String,
	base_url: String,
	storage_primary: String,
	storage_config: toml::Value,
	access_token: Option<String>,
	refresh: RefreshConfig,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` with default values suitable for testing.
	pub fn new() -> Self {
		Self {
			tracker_id: "test-tracker".to_string(),
			base_url: "http://localhost:8000".to_string(),
			storage_primary: "memory".to_string(),
			storage_config: toml::Value::Table(toml::map::Map::new()),
			access_token: Some("test-token".to_string()),
			refresh: RefreshConfig::default(),
		}
	}

	/// Sets the tracker ID.
	pub fn tracker_id(mut self, id: impl Into<String>) -> Self {
		self.tracker_id = id.into();
		self
	}

	/// Sets the order service base URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();
		self
	}

	/// Sets the primary storage implementation and its configuration.
	pub fn storage(mut self, primary: impl Into<String>, config: toml::Value) -> Self {
		self.storage_primary = primary.into();
		self.storage_config = config;
		self
	}

	/// Sets the static access token; `None` builds a logged-out tracker.
	pub fn access_token(mut self, token: Option<String>) -> Self {
		self.access_token = token;
		self
	}

	/// Sets the refresh buckets.
	pub fn refresh_statuses(mut self, statuses: Vec<OrderStatus>) -> Self {
		self.refresh.statuses = statuses;
		self
	}

	/// Sets the initial sort direction.
	pub fn sort_order(mut self, order: SortOrder) -> Self {
		self.refresh.order = order;
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		let mut http = toml::map::Map::new();
		http.insert("base_url".into(), toml::Value::String(self.base_url));

		let mut credentials = toml::map::Map::new();
		if let Some(token) = self.access_token {
			credentials.insert("access_token".into(), toml::Value::String(token));
		}

		Config {
			tracker: TrackerConfig {
				id: self.tracker_id,
			},
			client: ClientConfig {
				primary: "http".to_string(),
				implementations: HashMap::from([("http".to_string(), toml::Value::Table(http))]),
			},
			storage: StorageConfig {
				primary: self.storage_primary.clone(),
				implementations: HashMap::from([(self.storage_primary, self.storage_config)]),
			},
			credentials: CredentialsConfig {
				primary: "static".to_string(),
				implementations: HashMap::from([(
					"static".to_string(),
					toml::Value::Table(credentials),
				)]),
			},
			refresh: self.refresh,
		}
	}
}
