use serde::{Serialize, Deserialize};
use tarpc::context;
use log::{debug, info, warn};
use super::{
	hash_key,
	Node,
	NodeServer,
	ring::*,
	error::*
};

/// Move every key in (from_id, to_node.id] to to_node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
	// None when the previous owner had no known predecessor
	pub from_id: Option<Digest>,
	pub to_node: Node
}

impl NodeServer {
	/// Push keys of the requested range to the new owner
	/// and delete them here once all of them are pushed.
	///
	/// The store stays locked during the whole transfer.
	pub async fn transfer_keys(&self, req: TransferRequest) -> DhtResult<()> {
		let to_node = req.to_node;
		// pushing to ourselves would wait on our own lock
		if ids_equal(to_node.id, self.node.id) {
			return Ok(());
		}
		// a routing-only node has nothing to hand over
		let store = match self.store.as_ref() {
			Some(s) => s,
			None => return Ok(())
		};

		let mut data = store.lock().await;
		let keys: Vec<_> = data.keys()
			.filter(|k| between_right_inclusive(hash_key(k), req.from_id, to_node.id))
			.cloned()
			.collect();
		if keys.is_empty() {
			return Ok(());
		}

		let conn = self.get_connection(&to_node).await?;
		for key in keys.iter() {
			let value = data[key].clone();
			match conn.put_rpc(context::current(), key.clone(), value.clone()).await? {
				Ok(()) => (),
				Err(ServiceError::ValueExists) => {
					// only the same value counts as pushed by an earlier transfer
					let existing = conn.get_rpc(context::current(), key.clone()).await??;
					if existing != value {
						warn!("{}: {} holds a different value for key {}", self.node, to_node, key);
						return Err(ServiceError::ValueExists.into());
					}
					debug!("{}: {} already has key {}", self.node, to_node, key);
				},
				Err(e) => return Err(e.into())
			};
		}

		for key in keys.iter() {
			data.remove(key);
		}
		info!("{}: transferred {} keys to {}", self.node, keys.len(), to_node);
		Ok(())
	}

	/// Request the keys this node now owns from its successor.
	/// Called by a joining node before the successor learns about it.
	// TODO: lock the successor when two nodes join in front of it at the same time
	pub async fn obtain_new_keys(&self) -> DhtResult<()> {
		let guard = self.successor.read().await;
		let succ = match guard.as_ref() {
			Some(s) => s,
			None => return Err(ServiceError::NoSuccessor.into())
		};

		let ctx = context::current();
		let conn = self.get_connection(succ).await?;
		// Not updated yet, still the owner before this node
		let prev_predecessor = conn.get_predecessor_rpc(ctx).await?;
		debug!("{}: obtaining keys from {} after {:?}", self.node, succ, prev_predecessor);

		let req = TransferRequest {
			from_id: prev_predecessor.map(|p| p.id),
			to_node: self.node.clone()
		};
		conn.transfer_keys_rpc(ctx, req).await??;
		Ok(())
	}
}
