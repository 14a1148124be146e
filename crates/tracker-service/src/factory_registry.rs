//! Factory registry for tracker implementations.
//!
//! Collects every implementation the collaborator crates register and selects
//! the ones a configuration names.

use std::collections::HashMap;
use std::sync::OnceLock;
use tracker_client::ClientFactory;
use tracker_config::Config;
use tracker_core::{Tracker, TrackerBuilder, TrackerFactories};
use tracker_credentials::CredentialFactory;
use tracker_storage::StorageFactory;

/// Registry of all implementation factories, keyed by name.
pub struct FactoryRegistry {
	pub storage: HashMap<String, StorageFactory>,
	pub credentials: HashMap<String, CredentialFactory>,
	pub client: HashMap<String, ClientFactory>,
}

impl FactoryRegistry {
	/// Creates a registry populated from every collaborator crate.
	fn collect() -> Self {
		let mut registry = Self {
			storage: HashMap::new(),
			credentials: HashMap::new(),
			client: HashMap::new(),
		};

		for (name, factory) in tracker_storage::get_all_implementations() {
			tracing::debug!("Registering storage implementation: {}", name);
			registry.storage.insert(name.to_string(), factory);
		}
		for (name, factory) in tracker_credentials::get_all_implementations() {
			tracing::debug!("Registering credentials implementation: {}", name);
			registry.credentials.insert(name.to_string(), factory);
		}
		for (name, factory) in tracker_client::get_all_implementations() {
			tracing::debug!("Registering client implementation: {}", name);
			registry.client.insert(name.to_string(), factory);
		}

		registry
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Get the global factory registry.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(FactoryRegistry::collect)
}

/// Picks the factories named by a config section, rejecting unknown names.
macro_rules! build_factories {
	($registry:expr, $config_impls:expr, $registry_field:ident, $type_name:literal) => {{
		let mut factories = HashMap::new();
		for name in $config_impls.keys() {
			if let Some(factory) = $registry.$registry_field.get(name) {
				factories.insert(name.clone(), *factory);
			} else {
				let mut available: Vec<_> = $registry.$registry_field.keys().cloned().collect();
				available.sort();
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$type_name,
					name,
					available.join(", ")
				)
				.into());
			}
		}
		factories
	}};
}

/// Builds a tracker from the registry and a configuration.
pub fn build_tracker_from_config(config: Config) -> Result<Tracker, Box<dyn std::error::Error>> {
	let registry = get_registry();

	let storage_factories =
		build_factories!(registry, config.storage.implementations, storage, "storage");
	let credential_factories = build_factories!(
		registry,
		config.credentials.implementations,
		credentials,
		"credentials"
	);
	let client_factories =
		build_factories!(registry, config.client.implementations, client, "client");

	let factories = TrackerFactories {
		storage_factories,
		credential_factories,
		client_factories,
	};

	Ok(TrackerBuilder::new(config).build(factories)?)
}
