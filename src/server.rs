use crate::core::{error::*, Node};
use futures::future;
use log::{info, warn};

/// Handle on the tasks of a running node
pub struct ServerManager {
	pub node: Node,
	pub handle: future::JoinAll<tokio::task::JoinHandle<()>>,
	pub tx: tokio::sync::watch::Sender<bool>
}

impl ServerManager {
	/// Wait for the server to terminate
	pub async fn wait(self) -> DhtResult<()> {
		let node = self.node;
		let res = self.handle.await
			.into_iter()
			.collect::<Result<Vec<_>, tokio::task::JoinError>>();
		if let Err(e) = res {
			warn!("{}: task failed: {}", node, e);
			return Err(e.into());
		}

		info!("{}: stopped", node);
		Ok(())
	}

	/// Stop the server gracefully
	pub async fn stop(self) -> DhtResult<()> {
		info!("{}: stopping", self.node);
		self.tx.send(true)?;
		self.wait().await
	}
}
