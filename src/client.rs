use crate::{
	rpc::NodeServiceClient,
	core::DhtResult
};

use tarpc::tokio_serde::formats::Bincode;

pub async fn setup_client(addr: &str) -> DhtResult<NodeServiceClient> {
	let transport = tarpc::serde_transport::tcp::connect(addr, Bincode::default).await?;
	Ok(NodeServiceClient::new(tarpc::client::Config::default(), transport).spawn())
}
