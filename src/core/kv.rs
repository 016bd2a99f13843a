//! Get and put keys on the ring through any member node.
//!
//! The entry node resolves the owner of a key itself,
//! so callers never need to know the ring layout.

use std::time::Duration;
use tarpc::context;
use log::{debug, warn};
use super::{
	hash_key,
	Node,
	NodeServer,
	data_store::{Key, Value},
	error::*
};

/// Get a value from the ring, entering at `node`
pub async fn get(node: Option<&NodeServer>, key: &str) -> DhtResult<Value> {
	match node {
		Some(n) => n.get(key).await,
		None => Err(DhtError::InvalidArgument("node cannot be empty".to_string()))
	}
}

/// Put a value into the ring, entering at `node`
pub async fn put(node: Option<&NodeServer>, key: &str, value: &str) -> DhtResult<()> {
	match node {
		Some(n) => n.put(key, value).await,
		None => Err(DhtError::InvalidArgument("node cannot be empty".to_string()))
	}
}

impl NodeServer {
	/// Find the node owning key
	pub async fn locate(&self, key: &str) -> DhtResult<Node> {
		let id = hash_key(key);
		let conn = self.get_connection(&self.node).await?;
		let owner = conn.find_successor_rpc(context::current(), id).await??;
		debug!("{}: key digest {} located at {}", self.node, id, owner);
		Ok(owner)
	}

	async fn get_from(&self, owner: &Node, key: &str) -> DhtResult<Value> {
		let conn = self.get_connection(owner).await?;
		let value = conn.get_rpc(context::current(), key.to_string()).await??;
		Ok(value)
	}

	/// Get key on the ring
	///
	/// A failed read is retried once after the retry interval,
	/// as the key may be moving to a newly joined node.
	pub async fn get(&self, key: &str) -> DhtResult<Value> {
		let owner = self.locate(key).await?;
		match self.get_from(&owner, key).await {
			Ok(value) => Ok(value),
			Err(e) => {
				warn!("{}: fail to get key from {}, retrying: {}", self.node, owner, e);
				tokio::time::sleep(Duration::from_millis(self.config.retry_interval)).await;

				// Ownership may have moved in the meantime
				let owner = self.locate(key).await?;
				self.get_from(&owner, key).await
			}
		}
	}

	/// Put key on the ring
	pub async fn put(&self, key: &str, value: &str) -> DhtResult<()> {
		let owner = self.locate(key).await?;
		let conn = self.get_connection(&owner).await?;
		conn.put_rpc(context::current(), Key::from(key), Value::from(value)).await??;
		Ok(())
	}
}
