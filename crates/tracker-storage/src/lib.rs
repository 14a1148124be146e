//! Storage module for the order progress tracker.
//!
//! Provides the persisted key-value store the per-order cache lives in. The
//! store is string-keyed; backends move raw bytes and [`StorageService`] layers
//! string and JSON access on top.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracker_types::{ConfigSchema, ImplementationRegistry};

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The requested key does not exist.
	#[error("Not found")]
	NotFound,
	/// A stored value could not be encoded or decoded.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The backend failed to read or write.
	#[error("Backend error: {0}")]
	Backend(String),
	/// The backend configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Low-level interface for key-value storage backends.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	///
	/// Returns [`StorageError::NotFound`] when the key was never written.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	///
	/// Deleting a missing key succeeds.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service with string and JSON access.
///
/// Missing keys surface as `Ok(None)`; only real backend failures are errors.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Reads a UTF-8 string value.
	pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		match self.backend.get_bytes(key).await {
			Ok(bytes) => String::from_utf8(bytes)
				.map(Some)
				.map_err(|e| StorageError::Serialization(e.to_string())),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Writes a string value.
	pub async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.backend.set_bytes(key, value.as_bytes().to_vec()).await
	}

	/// Reads and deserializes a JSON value.
	pub async fn retrieve<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
		match self.get(key).await? {
			Some(raw) => serde_json::from_str(&raw)
				.map(Some)
				.map_err(|e| StorageError::Serialization(e.to_string())),
			None => Ok(None),
		}
	}

	/// Serializes a value as JSON and stores it.
	pub async fn store<T: Serialize>(&self, key: &str, data: &T) -> Result<(), StorageError> {
		let raw =
			serde_json::to_string(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.set(key, &raw).await
	}

	/// Removes a value from storage.
	pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
		self.backend.delete(key).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	#[tokio::test]
	async fn test_missing_key_is_none() {
		let storage = service();
		assert_eq!(storage.get("steps_O1").await.unwrap(), None);
		let steps: Option<Vec<bool>> = storage.retrieve("steps_O1").await.unwrap();
		assert_eq!(steps, None);
	}

	#[tokio::test]
	async fn test_json_values() {
		let storage = service();
		storage
			.store("steps_O1", &vec![true, false, true])
			.await
			.unwrap();
		assert_eq!(
			storage.get("steps_O1").await.unwrap().as_deref(),
			Some("[true,false,true]")
		);
		let steps: Option<Vec<bool>> = storage.retrieve("steps_O1").await.unwrap();
		assert_eq!(steps, Some(vec![true, false, true]));
	}

	#[tokio::test]
	async fn test_malformed_json_is_serialization_error() {
		let storage = service();
		storage.set("deliverySubmitted_O1", "yes").await.unwrap();
		let result: Result<Option<bool>, _> = storage.retrieve("deliverySubmitted_O1").await;
		assert!(matches!(result, Err(StorageError::Serialization(_))));
	}

	#[tokio::test]
	async fn test_remove() {
		let storage = service();
		storage.set("courier_O1", "한진택배").await.unwrap();
		storage.remove("courier_O1").await.unwrap();
		assert_eq!(storage.get("courier_O1").await.unwrap(), None);
		storage.remove("courier_O1").await.unwrap();
	}
}
