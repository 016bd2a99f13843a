pub mod core;
pub mod rpc;
pub mod client;
pub mod server;
