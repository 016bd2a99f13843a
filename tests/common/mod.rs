#![allow(dead_code)]

use chord_kv::core::{
	ring::{
		NUM_BITS,
		Digest,
		between_right_inclusive
	},
	config::Config,
	Node,
	NodeServer,
	hash_key
};
use rand::Rng;

pub fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_node(port: u16, id: Digest) -> Node {
	Node {
		addr: format!("localhost:{}", port),
		id: id
	}
}

// Disable auto fix_finger and stabilize
pub fn test_config() -> Config {
	Config {
		fix_finger_interval: 0,
		stabilize_interval: 0,
		retry_interval: 50,
		..Config::default()
	}
}

pub async fn fix_all_fingers(server: &NodeServer) {
	for i in 1..NUM_BITS {
		server.fix_finger(i).await;
	}
}

// Generate key whose digest is in range (start, end]
pub fn generate_key_in_range<T: Rng>(rng: &mut T, start: Digest, end: Digest) -> String {
	loop {
		let key = format!("key-{:016x}", rng.gen::<u64>());
		if between_right_inclusive(hash_key(&key), Some(start), end) {
			return key;
		}
	}
}

// Generate key whose digest is anywhere on the ring
pub fn generate_key<T: Rng>(rng: &mut T) -> String {
	format!("key-{:016x}", rng.gen::<u64>())
}
