use thiserror::Error;
use serde::{Serialize, Deserialize};
use std::result::Result;
use super::Node;

/// Failures reported by a remote node as part of its response
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceError {
	#[error("Node does not have a datastore")]
	NoDatastore,
	#[error("Key does not exist")]
	KeyNotFound,
	#[error("Cannot modify an existing value")]
	ValueExists,
	#[error("Remote node is not the predecessor")]
	NotPredecessor,
	#[error("No closest preceding finger")]
	NoFinger,
	#[error("Cannot find successor")]
	NoSuccessor,
	// Failure of a call made on behalf of the caller
	#[error("{0}")]
	Remote(String)
}

#[derive(Error, Debug)]
pub enum DhtError {
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error(transparent)]
	Service(#[from] ServiceError),
	#[error("Failed to join {node}: {message}")]
	JoinFailure {
		node: Node,
		message: String
	},
	#[error("RPC error: {0}")]
	RpcError(#[from] tarpc::client::RpcError),
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Shutdown error")]
	ShutdownError(#[from] tokio::sync::watch::error::SendError<bool>),
	#[error("Task error: {0}")]
	TaskError(#[from] tokio::task::JoinError)
}

impl From<DhtError> for ServiceError {
	fn from(e: DhtError) -> Self {
		match e {
			DhtError::Service(e) => e,
			e => ServiceError::Remote(e.to_string())
		}
	}
}

pub type DhtResult<T> = Result<T, DhtError>;
