//! Builder for assembling a [`Tracker`] from configuration.
//!
//! Each pluggable section of the configuration names its implementations and
//! a primary. The builder runs the matching factory for every configured
//! implementation and keeps the primary one.

use crate::Tracker;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracker_client::{ClientError, OrderClient, OrderServiceInterface};
use tracker_config::Config;
use tracker_credentials::{CredentialError, CredentialInterface, CredentialService};
use tracker_storage::{StorageError, StorageInterface, StorageService};

/// Errors that can occur while building a tracker.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Factory functions for each pluggable component, keyed by implementation name.
pub struct TrackerFactories<SF, CF, OF> {
	pub storage_factories: HashMap<String, SF>,
	pub credential_factories: HashMap<String, CF>,
	pub client_factories: HashMap<String, OF>,
}

/// Builder for constructing a Tracker with pluggable implementations.
pub struct TrackerBuilder {
	config: Config,
}

impl TrackerBuilder {
	/// Creates a new TrackerBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the Tracker using factories for each component type.
	pub fn build<SF, CF, OF>(
		self,
		factories: TrackerFactories<SF, CF, OF>,
	) -> Result<Tracker, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		CF: Fn(&toml::Value) -> Result<Box<dyn CredentialInterface>, CredentialError>,
		OF: Fn(&toml::Value) -> Result<Box<dyn OrderServiceInterface>, ClientError>,
	{
		let storage_backend = create_primary(
			"storage",
			&self.config.storage.primary,
			&self.config.storage.implementations,
			&factories.storage_factories,
		)?;
		let credential_store = create_primary(
			"credentials",
			&self.config.credentials.primary,
			&self.config.credentials.implementations,
			&factories.credential_factories,
		)?;
		let transport = create_primary(
			"client",
			&self.config.client.primary,
			&self.config.client.implementations,
			&factories.client_factories,
		)?;

		tracing::info!(tracker_id = %self.config.tracker.id, "Tracker assembled");

		Ok(Tracker::new(
			self.config,
			Arc::new(StorageService::new(storage_backend)),
			Arc::new(CredentialService::new(credential_store)),
			Arc::new(OrderClient::new(transport)),
		))
	}
}

/// Runs the factory of every configured implementation and returns the primary.
///
/// Implementations without a registered factory are skipped. A factory that
/// rejects its configuration fails the build, primary or not.
fn create_primary<T, E, F>(
	component: &'static str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
	factories: &HashMap<String, F>,
) -> Result<T, BuilderError>
where
	E: Display,
	F: Fn(&toml::Value) -> Result<T, E>,
{
	let mut created = HashMap::new();
	for (name, config) in implementations {
		let Some(factory) = factories.get(name) else {
			tracing::warn!(component, implementation = %name, "No factory registered");
			continue;
		};
		match factory(config) {
			Ok(implementation) => {
				let is_primary = primary == name;
				tracing::info!(component, implementation = %name, enabled = %is_primary, "Loaded");
				created.insert(name.clone(), implementation);
			},
			Err(e) => {
				tracing::error!(
					component,
					implementation = %name,
					error = %e,
					"Failed to create implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create {} implementation '{}': {}",
					component, name, e
				)));
			},
		}
	}

	created.remove(primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"Primary {} '{}' failed to load or has no registered factory",
			component, primary
		))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use tracker_client::ClientFactory;
	use tracker_config::ConfigBuilder;
	use tracker_credentials::CredentialFactory;
	use tracker_storage::StorageFactory;
	use tracker_types::{OrderStatus, SortOrder};

	fn factories() -> TrackerFactories<StorageFactory, CredentialFactory, ClientFactory> {
		TrackerFactories {
			storage_factories: tracker_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			credential_factories: tracker_credentials::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			client_factories: tracker_client::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_build_with_registered_implementations() {
		let config = ConfigBuilder::new()
			.refresh_statuses(vec![OrderStatus::Produced])
			.sort_order(SortOrder::Desc)
			.build();
		let tracker = TrackerBuilder::new(config).build(factories()).unwrap();

		let screen = tracker.screen();
		assert_eq!(screen.sort_order(), SortOrder::Desc);
		assert!(screen.orders().is_empty());
	}

	#[test]
	fn test_invalid_implementation_config_fails() {
		let config = ConfigBuilder::new().base_url("not-a-url").build();
		let err = TrackerBuilder::new(config)
			.build(factories())
			.err()
			.unwrap();
		assert!(err.to_string().contains("client implementation 'http'"));
	}

	#[test]
	fn test_unregistered_primary_fails() {
		let config = ConfigBuilder::new()
			.storage("redis", toml::Value::Table(toml::map::Map::new()))
			.build();
		let err = TrackerBuilder::new(config)
			.build(factories())
			.err()
			.unwrap();
		assert!(err.to_string().contains("Primary storage 'redis'"));
	}

	#[tokio::test]
	async fn test_file_storage_survives_rebuild() {
		let dir = tempfile::tempdir().unwrap();
		let mut storage_config = toml::map::Map::new();
		storage_config.insert(
			"storage_path".into(),
			toml::Value::String(dir.path().to_string_lossy().into_owned()),
		);
		let config = ConfigBuilder::new()
			.storage("file", toml::Value::Table(storage_config))
			.build();

		let first = TrackerBuilder::new(config.clone()).build(factories()).unwrap();
		first.cache().save_submitted("O1", true).await;

		let second = TrackerBuilder::new(config).build(factories()).unwrap();
		assert_eq!(second.cache().load_submitted("O1").await, Some(true));
	}
}
