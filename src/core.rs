pub mod node;
pub mod ring;
pub mod config;
pub mod data_store;
pub mod error;
pub mod kv;
pub mod migration;
mod service;

pub use node::*;
pub use config::*;
pub use error::*;
pub use kv::{get, put};
pub use migration::TransferRequest;

use std::{
	collections::hash_map::DefaultHasher,
	hash::{Hash, Hasher}
};
use ring::Digest;

pub fn calculate_hash(data: &[u8]) -> Digest {
	let mut hasher = DefaultHasher::new();
	data.hash(&mut hasher);
	hasher.finish()
}

// Position of a key on the ring
pub fn hash_key(key: &str) -> Digest {
	calculate_hash(key.as_bytes())
}

pub fn construct_node(addr: &str) -> Node {
	Node {
		addr: addr.to_string(),
		id: calculate_hash(addr.as_bytes())
	}
}
