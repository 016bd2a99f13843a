use chord_kv::core::{
	self,
	config::*,
	NodeServer,
	Node
};
use clap::Parser;

#[derive(Parser)]
struct Args {
	/// Local addr to bind (<host>:<port>)
	addr: String,

	/// Join an existing node on init (<host>:<port>)
	#[clap(short, long)]
	join: Option<String>,

	/// Wait before retrying a failed get (ms)
	#[clap(long, default_value_t = 500)]
	retry_interval: u64,

	/// Stabilize interval (ms, 0 to disable)
	#[clap(long, default_value_t = 200)]
	stabilize_interval: u64,

	/// Fix finger interval (ms, 0 to disable)
	#[clap(long, default_value_t = 200)]
	fix_finger_interval: u64,

	/// Only route requests without storing keys
	#[clap(long)]
	no_datastore: bool
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let node = core::construct_node(&args.addr);
	let join_node: Option<Node> = args.join.as_deref().map(core::construct_node);

	let config = Config {
		retry_interval: args.retry_interval,
		stabilize_interval: args.stabilize_interval,
		fix_finger_interval: args.fix_finger_interval,
		datastore: !args.no_datastore,
		..Config::default()
	};
	let s = NodeServer::new(node, config);
	let manager = s.start(join_node).await?;
	manager.wait().await?;
	Ok(())
}
