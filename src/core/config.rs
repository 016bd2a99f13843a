use std::default::Default;

#[derive(Clone, Debug)]
pub struct Config {
	// intervals in ms (0 means disabling the task)
	pub stabilize_interval: u64,
	pub fix_finger_interval: u64,
	/// max number of concurrent connections buffered
	pub max_connections: u64,
	/// wait in ms before the single retry of a failed get
	pub retry_interval: u64,
	/// a node without datastore only routes requests
	pub datastore: bool
}

impl Default for Config {
	fn default() -> Self {
		Self {
			stabilize_interval: 200,
			fix_finger_interval: 200,
			max_connections: 16,
			retry_interval: 500,
			datastore: true
		}
	}
}
