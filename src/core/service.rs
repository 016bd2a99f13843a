use tarpc::context;
use log::{debug, error};
use super::{
	Node,
	NodeServer,
	TransferRequest,
	ring::Digest,
	data_store::{Key, Value},
	error::*
};
use crate::rpc::NodeService;

#[tarpc::server]
impl NodeService for NodeServer {
	async fn get_node_rpc(self, _: context::Context) -> Node {
		self.node.clone()
	}

	async fn get_predecessor_rpc(self, _: context::Context) -> Option<Node> {
		self.get_predecessor().await
	}

	async fn get_successor_rpc(self, _: context::Context) -> Option<Node> {
		self.get_successor().await
	}

	async fn set_predecessor_rpc(self, _: context::Context, node: Node) {
		self.set_predecessor(Some(node)).await
	}

	async fn set_successor_rpc(self, _: context::Context, node: Node) {
		self.set_successor(Some(node)).await
	}

	async fn notify_rpc(self, _: context::Context, node: Node) -> Result<(), ServiceError> {
		self.notify(node.clone()).await;

		// An empty predecessor means we notified ourselves
		match self.get_predecessor().await {
			Some(p) if p.id != node.id => Err(ServiceError::NotPredecessor),
			_ => Ok(())
		}
	}

	async fn closest_preceding_finger_rpc(self, _: context::Context, id: Digest) -> Result<Node, ServiceError> {
		self.closest_preceding_finger(id).await
			.ok_or(ServiceError::NoFinger)
	}

	async fn find_successor_rpc(self, _: context::Context, id: Digest) -> Result<Node, ServiceError> {
		self.find_successor(id).await.map_err(|e| {
			// expected while the ring is changing
			debug!("{}: find_successor_rpc({}) failed: {}", self.node, id, e);
			ServiceError::NoSuccessor
		})
	}

	async fn stabilize_rpc(self, _: context::Context) {
		self.stabilize().await
	}

	async fn get_rpc(self, _: context::Context, key: Key) -> Result<Value, ServiceError> {
		match self.store.as_ref() {
			Some(store) => store.get(&key).await,
			None => Err(ServiceError::NoDatastore)
		}
	}

	async fn put_rpc(self, _: context::Context, key: Key, value: Value) -> Result<(), ServiceError> {
		match self.store.as_ref() {
			Some(store) => store.put(key, value).await,
			None => Err(ServiceError::NoDatastore)
		}
	}

	async fn transfer_keys_rpc(self, _: context::Context, req: TransferRequest) -> Result<(), ServiceError> {
		self.transfer_keys(req).await.map_err(|e| {
			error!("{}: transfer_keys_rpc failed: {}", self.node, e);
			e.into()
		})
	}

	async fn dump_rpc(self, _: context::Context) -> Vec<(Key, Value)> {
		match self.store.as_ref() {
			Some(store) => store.snapshot().await,
			None => Vec::new()
		}
	}

	async fn lookup_rpc(self, _: context::Context, key: Key) -> Result<Value, ServiceError> {
		Ok(self.get(&key).await?)
	}

	async fn store_rpc(self, _: context::Context, key: Key, value: Value) -> Result<(), ServiceError> {
		Ok(self.put(&key, &value).await?)
	}
}
