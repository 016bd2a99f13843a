use std::{
	collections::{
		HashMap,
		hash_map::Entry
	},
	sync::Arc
};
use tokio::sync::{RwLock, RwLockWriteGuard};
use super::error::ServiceError;

pub type Key = String;
pub type Value = String;

/// Thread-safe key-value data store
///
/// A tokio lock is used because migration keeps the store
/// locked while pushing keys to another node.
#[derive(Clone)]
pub struct DataStore {
	data: Arc<RwLock<HashMap<Key, Value>>>
}

impl DataStore {
	pub fn new() -> Self {
		DataStore {
			data: Arc::new(RwLock::new(HashMap::new()))
		}
	}

	pub async fn get(&self, key: &str) -> Result<Value, ServiceError> {
		let data = self.data.read().await;
		data.get(key)
			.cloned()
			.ok_or(ServiceError::KeyNotFound)
	}

	/**
	 * Insert a new key
	 * Existing values are never overwritten
	 */
	pub async fn put(&self, key: Key, value: Value) -> Result<(), ServiceError> {
		let mut data = self.data.write().await;
		match data.entry(key) {
			Entry::Occupied(_) => Err(ServiceError::ValueExists),
			Entry::Vacant(entry) => {
				entry.insert(value);
				Ok(())
			}
		}
	}

	/// Exclusive access to the whole store
	pub async fn lock(&self) -> RwLockWriteGuard<'_, HashMap<Key, Value>> {
		self.data.write().await
	}

	/// Sorted copy of all entries
	pub async fn snapshot(&self) -> Vec<(Key, Value)> {
		let data = self.data.read().await;
		let mut entries: Vec<_> = data.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect();
		entries.sort();
		entries
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_get_put() {
		let store = DataStore::new();
		assert_eq!(store.get("x").await, Err(ServiceError::KeyNotFound));

		store.put("x".to_string(), "1".to_string()).await.unwrap();
		assert_eq!(store.get("x").await.unwrap(), "1");
	}

	#[tokio::test]
	async fn test_put_is_insert_only() {
		let store = DataStore::new();
		store.put("x".to_string(), "1".to_string()).await.unwrap();
		assert_eq!(
			store.put("x".to_string(), "2".to_string()).await,
			Err(ServiceError::ValueExists)
		);
		assert_eq!(store.get("x").await.unwrap(), "1");
	}

	#[tokio::test]
	async fn test_snapshot_and_lock() {
		let store = DataStore::new();
		store.put("b".to_string(), "2".to_string()).await.unwrap();
		store.put("a".to_string(), "1".to_string()).await.unwrap();
		assert_eq!(store.snapshot().await, vec![
			("a".to_string(), "1".to_string()),
			("b".to_string(), "2".to_string())
		]);

		{
			let mut data = store.lock().await;
			data.remove("a");
		}
		assert_eq!(store.get("a").await, Err(ServiceError::KeyNotFound));
		// clones share the same data
		let other = store.clone();
		assert_eq!(other.get("b").await.unwrap(), "2");
	}
}
