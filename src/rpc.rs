use crate::core::{
	ring::Digest,
	Node,
	TransferRequest,
	ServiceError,
	data_store::{Key, Value}
};

#[tarpc::service]
pub trait NodeService {
	// Get or set fields at this node
	async fn get_node_rpc() -> Node;
	async fn get_predecessor_rpc() -> Option<Node>;
	async fn get_successor_rpc() -> Option<Node>;
	async fn set_predecessor_rpc(node: Node);
	async fn set_successor_rpc(node: Node);

	// Core functions for Chord
	async fn notify_rpc(node: Node) -> Result<(), ServiceError>;
	async fn closest_preceding_finger_rpc(id: Digest) -> Result<Node, ServiceError>;
	async fn find_successor_rpc(id: Digest) -> Result<Node, ServiceError>;
	async fn stabilize_rpc();

	// Get or put key locally
	async fn get_rpc(key: Key) -> Result<Value, ServiceError>;
	async fn put_rpc(key: Key, value: Value) -> Result<(), ServiceError>;
	async fn transfer_keys_rpc(req: TransferRequest) -> Result<(), ServiceError>;
	async fn dump_rpc() -> Vec<(Key, Value)>;

	// Get or put key on the ring
	async fn lookup_rpc(key: Key) -> Result<Value, ServiceError>;
	async fn store_rpc(key: Key, value: Value) -> Result<(), ServiceError>;
}
