use std::{
	collections::HashMap,
	sync::{Arc, RwLock as SyncRwLock}
};
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use tarpc::{
	context,
	tokio_serde::formats::Bincode,
	server::Channel
};
use tokio::sync::RwLock;
use futures::{future, prelude::*};
use log::{info, warn, debug, error};
use super::{
	ring::*,
	config::*,
	data_store::*,
	error::{
		*,
		DhtError::*
	}
};
use crate::{rpc::*, server::ServerManager};

// Data part of the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
	pub id: Digest,
	pub addr: String
}

impl std::fmt::Display for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Node({}, {})", self.id, self.addr)
	}
}

/// State of a node on the ring
///
/// predecessor, successor and store are locked independently.
/// No code path holds two of them at once except key migration,
/// which keeps the store locked while pushing keys.
#[derive(Clone)]
pub struct NodeServer {
	pub(crate) node: Node,
	pub(crate) store: Option<DataStore>,
	pub(crate) config: Config,
	pub(crate) predecessor: Arc<RwLock<Option<Node>>>,
	pub(crate) successor: Arc<RwLock<Option<Node>>>,
	// The first entry is maintained by successor
	finger_table: Arc<SyncRwLock<Vec<Node>>>,
	// connection to remote nodes
	connection_map: Arc<SyncRwLock<HashMap<Digest, NodeServiceClient>>>
}

impl NodeServer {
	pub fn new(node: Node, config: Config) -> Self {
		// init a ring with only one node
		// (see second part of n.join in Figure 6)
		let finger_table = vec![node.clone(); NUM_BITS];
		let store = if config.datastore {
			Some(DataStore::new())
		} else {
			None
		};

		NodeServer {
			node: node.clone(),
			store: store,
			config: config,
			predecessor: Arc::new(RwLock::new(Some(node.clone()))),
			successor: Arc::new(RwLock::new(Some(node.clone()))),
			finger_table: Arc::new(SyncRwLock::new(finger_table)),
			connection_map: Arc::new(SyncRwLock::new(HashMap::new()))
		}
	}

	pub fn get_node(&self) -> &Node {
		&self.node
	}

	pub async fn get_successor(&self) -> Option<Node> {
		self.successor.read().await.clone()
	}

	pub async fn set_successor(&self, node: Option<Node>) {
		*self.successor.write().await = node;
	}

	pub async fn get_predecessor(&self) -> Option<Node> {
		self.predecessor.read().await.clone()
	}

	pub async fn set_predecessor(&self, node: Option<Node>) {
		*self.predecessor.write().await = node;
	}

	/// Start the server
	/// Returns if the listener starts
	pub async fn start(&self, join_node: Option<Node>) -> DhtResult<ServerManager> {
		// channel used to shutdown (true means shutdown)
		let (tx, rx) = tokio::sync::watch::channel(false);

		// Listen locally first
		let mut listener = tarpc::serde_transport::tcp::listen(&self.node.addr, Bincode::default).await?;
		let server = self.clone();
		let mut listener_rx = rx.clone();
		// Listen for rpc call
		let listener_handle = tokio::spawn(async move {
			listener.config_mut().max_frame_length(usize::MAX);
			let listener_fut = listener
				.filter_map(|r| future::ready(r.ok()))
				.map(tarpc::server::BaseChannel::with_defaults)
				.map(|channel| async {
					// Clone a new server to share the data in Arc
					channel.execute(server.clone().serve()).await;
				})
				.buffer_unordered(server.config.max_connections as usize)
				.for_each(|_| async {});

			debug!("{}: listening", server.node);

			tokio::select! {
				_ = listener_fut => {
					warn!("{}: listener terminated", server.node);
				},
				_ = listener_rx.changed() => {
					debug!("{}: listener stopped gracefully", server.node);
				}
			};
		});

		// Join node after server starts
		if let Some(n) = join_node.as_ref() {
			if let Err(e) = self.join(n).await {
				tx.send(true).unwrap_or(());
				return Err(JoinFailure {
					node: n.clone(),
					message: e.to_string()
				});
			}
		}

		// Periodically stabilize
		let server = self.clone();
		let mut stabilize_rx = rx.clone();
		let stabilize_interval = self.config.stabilize_interval;
		let stabilize_handle = tokio::spawn(async move {
			if stabilize_interval > 0 {
				let mut interval = tokio::time::interval(
					tokio::time::Duration::from_millis(stabilize_interval)
				);

				tokio::select! {
					_ = async {
						loop {
							interval.tick().await;
							server.stabilize().await;
						}
					} => (),
					_ = stabilize_rx.changed() => {
						debug!("{}: stabilize task stopped gracefully", server.node);
					}
				};
			}
		});

		// Periodically refresh finger table
		let server = self.clone();
		let mut fix_finger_rx = rx.clone();
		let fix_finger_interval = self.config.fix_finger_interval;
		let fix_finger_handle = tokio::spawn(async move {
			if fix_finger_interval > 0 {
				let mut interval = tokio::time::interval(
					tokio::time::Duration::from_millis(fix_finger_interval)
				);
				// StdRng can be sent across threads
				let mut rng = rand::prelude::StdRng::from_entropy();

				tokio::select! {
					_ = async {
						loop {
							interval.tick().await;
							let index = rng.gen_range(1..NUM_BITS);
							server.fix_finger(index).await;
						}
					} => (),
					_ = fix_finger_rx.changed() => {
						debug!("{}: fix_finger task stopped gracefully", server.node);
					}
				};
			}
		});

		info!("{}: listening at {}", self.node, self.node.addr);
		// An aggregated handle for all tasks
		let joined_handle = future::join_all(vec![
			listener_handle,
			stabilize_handle,
			fix_finger_handle
		]);

		Ok(ServerManager {
			node: self.node.clone(),
			handle: joined_handle,
			tx: tx
		})
	}

	// Calculate start field of finger table (see Table 1)
	// k in [0, m)
	pub fn finger_table_start(&self, k: usize) -> Digest {
		self.node.id.wrapping_add(1 << k)
	}

	pub(crate) async fn get_connection(&self, node: &Node) -> DhtResult<NodeServiceClient> {
		// Use block to drop map immediately after use
		{
			let map = self.connection_map.read().unwrap();
			if let Some(c) = map.get(&node.id) {
				// client can be cloned with lost cost
				return Ok(c.clone());
			}
		}
		debug!("{}: connecting to {}", self.node, node);
		let c = crate::client::setup_client(&node.addr).await?;
		debug!("{}: connected to {}", self.node, node);
		let mut map = self.connection_map.write().unwrap();
		map.insert(node.id, c.clone());
		Ok(c)
	}

	// Figure 7: n.join
	pub async fn join(&self, node: &Node) -> DhtResult<()> {
		debug!("{}: joining {}", self.node, node);
		self.set_predecessor(None).await;
		let ctx = context::current();
		let n = self.get_connection(node).await?;
		let succ = n.find_successor_rpc(ctx, self.node.id).await??;
		self.set_successor(Some(succ)).await;

		// Must run before stabilize notifies the successor
		self.obtain_new_keys().await?;
		debug!("{}: joined {}", self.node, node);
		Ok(())
	}

	// Figure 7: n.stabilize
	pub async fn stabilize(&self) {
		let ctx = context::current();

		let mut succ = match self.get_successor().await {
			Some(s) => s,
			None => {
				warn!("{}: no successor to stabilize", self.node);
				return;
			}
		};
		let mut n = match self.get_connection(&succ).await {
			Ok(c) => c,
			Err(e) => {
				error!("{}: fail to connect to successor {}: {}", self.node, succ, e);
				return;
			}
		};

		match n.get_predecessor_rpc(ctx).await {
			Ok(Some(x)) => {
				if in_range(x.id, self.node.id, succ.id) {
					let conn = self.get_connection(&x).await;
					match conn {
						Ok(c) => {
							// update connection because succ changes
							n = c;
							succ = x;
							self.set_successor(Some(succ.clone())).await;
						},
						Err(e) => {
							error!("{}: fail to connect to new successor {}: {}", self.node, x, e);
						}
					};
				}
			},
			Ok(None) => {
				debug!("{}: empty predecessor of successor {}", self.node, succ);
			},
			Err(e) => {
				error!("{}: fail to stabilize: {}", self.node, e);
				return;
			}
		};

		// ignore claim conflicts here because it can only be fixed by stabilizing again
		match n.notify_rpc(ctx, self.node.clone()).await {
			Ok(Ok(())) => (),
			Ok(Err(e)) => debug!("{}: notify {} rejected: {}", self.node, succ, e),
			Err(e) => error!("{}: fail to notify {}: {}", self.node, succ, e)
		};
	}

	// Figure 7: n.fix_fingers
	pub async fn fix_finger(&self, index: usize) {
		match self.find_successor(self.finger_table_start(index)).await {
			Ok(succ) => {
				let mut table = self.finger_table.write().unwrap();
				table[index] = succ;
			},
			Err(e) => {
				error!("{}: failed to fix finger: {}", self.node, e);
			}
		};
	}

	// Figure 4: n.find_successor
	pub async fn find_successor(&self, id: Digest) -> DhtResult<Node> {
		let n = self.find_predecessor(id).await?;
		let succ = if n.id == self.node.id {
			self.get_successor().await
		} else {
			let c = self.get_connection(&n).await?;
			c.get_successor_rpc(context::current()).await?
		};
		Ok(succ.ok_or(ServiceError::NoSuccessor)?)
	}

	// Figure 4: n.find_predecessor
	async fn find_predecessor(&self, id: Digest) -> DhtResult<Node> {
		debug!("{}: find_predecessor({})", self.node, id);
		let mut n = self.node.clone();
		let mut succ = self.get_successor().await.ok_or(ServiceError::NoSuccessor)?;
		let ctx = context::current();

		// stop when id in (n, succ]
		while !between_right_inclusive(id, Some(n.id), succ.id) {
			debug!("{}: find_predecessor range ({}, {}]", self.node, n.id, succ.id);
			let conn = self.get_connection(&n).await?;
			n = conn.closest_preceding_finger_rpc(ctx, id).await??;
			let conn = self.get_connection(&n).await?;
			succ = conn.get_successor_rpc(ctx).await?.ok_or(ServiceError::NoSuccessor)?;
		}
		debug!("{}: find_predecessor({}) returns {}", self.node, id, n);
		Ok(n)
	}

	// Figure 4: n.closest_preceding_finger
	pub(crate) async fn closest_preceding_finger(&self, id: Digest) -> Option<Node> {
		// table[0] is maintained by successor
		let succ = self.get_successor().await;
		let table = self.finger_table.read().unwrap();
		for i in (1..NUM_BITS).rev() {
			if in_range(table[i].id, self.node.id, id) {
				return Some(table[i].clone());
			}
		}
		succ.filter(|s| in_range(s.id, self.node.id, id))
	}

	// Figure 7: n.notify
	pub(crate) async fn notify(&self, node: Node) {
		let mut pred = self.predecessor.write().await;
		if let Some(p) = pred.as_ref() {
			if !in_range(node.id, p.id, self.node.id) {
				return;
			}
		}

		debug!("{}: new predecessor set in notify: {}", self.node, node);
		*pred = Some(node);
	}
}
