use chord_kv::{
	core::{
		self,
		config::*,
		DhtError,
		ServiceError,
		NodeServer
	},
	client::setup_client
};
use rand::prelude::*;
use tarpc::context;

mod common;
use common::*;

/// Test kv store operations
/// based on the ring of figure 5a but with a larger range
#[tokio::test]
async fn test_kv_store() -> anyhow::Result<()> {
	init_logger();
	let n0 = test_node(9800, 0);
	let n1 = test_node(9801, u64::MAX / 4);
	let n3 = test_node(9803, u64::MAX / 4 * 2);
	let n6 = test_node(9806, u64::MAX / 4 * 3);

	let config = test_config();
	// Node 0 initializes
	let s0 = NodeServer::new(n0.clone(), config.clone());
	let m0 = s0.start(None).await?;
	s0.stabilize().await;

	// Node 1 joins node 0
	let s1 = NodeServer::new(n1.clone(), config.clone());
	let m1 = s1.start(Some(n0.clone())).await?;
	s1.stabilize().await;
	s0.stabilize().await;

	fix_all_fingers(&s0).await;
	fix_all_fingers(&s1).await;

	// Node 3 joins node 1
	let s3 = NodeServer::new(n3.clone(), config.clone());
	let m3 = s3.start(Some(n1.clone())).await?;
	s3.stabilize().await;
	s1.stabilize().await;
	s0.stabilize().await;

	fix_all_fingers(&s0).await;
	fix_all_fingers(&s1).await;
	fix_all_fingers(&s3).await;

	// Node 6 joins node 0
	let s6 = NodeServer::new(n6.clone(), config.clone());
	let m6 = s6.start(Some(n0.clone())).await?;
	s6.stabilize().await;
	s3.stabilize().await;
	s1.stabilize().await;
	s0.stabilize().await;

	fix_all_fingers(&s0).await;
	fix_all_fingers(&s1).await;
	fix_all_fingers(&s3).await;
	fix_all_fingers(&s6).await;

	let c0 = setup_client(&n0.addr).await?;
	let c1 = setup_client(&n1.addr).await?;
	let c3 = setup_client(&n3.addr).await?;

	let mut rng = StdRng::seed_from_u64(0);
	// k1 should be placed at n1
	let k1 = generate_key_in_range(&mut rng, n0.id, n1.id);
	core::put(Some(&s0), &k1, "v1").await?;
	assert_eq!(s1.locate(&k1).await?, n1);
	assert_eq!(core::get(Some(&s0), &k1).await?, "v1");
	assert_eq!(core::get(Some(&s6), &k1).await?, "v1");
	assert_eq!(c1.get_rpc(context::current(), k1.clone()).await??, "v1");
	assert_eq!(c0.get_rpc(context::current(), k1.clone()).await?, Err(ServiceError::KeyNotFound));

	// k2 should be placed at n3, put through a remote client
	let k2 = generate_key_in_range(&mut rng, n1.id, n3.id);
	c1.store_rpc(context::current(), k2.clone(), "v2".to_string()).await??;
	assert_eq!(c0.lookup_rpc(context::current(), k2.clone()).await??, "v2");
	assert_eq!(core::get(Some(&s1), &k2).await?, "v2");
	assert_eq!(c3.get_rpc(context::current(), k2.clone()).await??, "v2");
	assert_eq!(c3.dump_rpc(context::current()).await?, vec![(k2.clone(), "v2".to_string())]);

	// k3 wraps around to n0
	let k3 = generate_key_in_range(&mut rng, n6.id, n0.id);
	core::put(Some(&s3), &k3, "v3").await?;
	assert_eq!(s6.locate(&k3).await?, n0);
	assert_eq!(c0.get_rpc(context::current(), k3.clone()).await??, "v3");

	// existing values are never modified
	let e = core::put(Some(&s6), &k1, "other").await.unwrap_err();
	assert!(matches!(e, DhtError::Service(ServiceError::ValueExists)));
	assert_eq!(core::get(Some(&s3), &k1).await?, "v1");

	// missing keys fail after the retry
	let k4 = generate_key(&mut rng);
	let e = core::get(Some(&s1), &k4).await.unwrap_err();
	assert!(matches!(e, DhtError::Service(ServiceError::KeyNotFound)));

	m0.stop().await?;
	m1.stop().await?;
	m3.stop().await?;
	m6.stop().await?;
	Ok(())
}

#[tokio::test]
async fn test_single_node() -> anyhow::Result<()> {
	init_logger();
	let n = test_node(9810, u64::MAX / 3);
	let s = NodeServer::new(n.clone(), test_config());
	let m = s.start(None).await?;

	core::put(Some(&s), "x", "1").await?;
	assert_eq!(core::get(Some(&s), "x").await?, "1");

	let e = core::put(Some(&s), "x", "2").await.unwrap_err();
	assert!(matches!(e, DhtError::Service(ServiceError::ValueExists)));
	assert_eq!(e.to_string(), "Cannot modify an existing value");
	assert_eq!(core::get(Some(&s), "x").await?, "1");

	m.stop().await?;
	Ok(())
}

#[tokio::test]
async fn test_empty_entry_node() {
	init_logger();
	let e = core::get(None, "x").await.unwrap_err();
	assert!(matches!(e, DhtError::InvalidArgument(_)));
	let e = core::put(None, "x", "1").await.unwrap_err();
	assert!(matches!(e, DhtError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_node_without_datastore() -> anyhow::Result<()> {
	init_logger();
	let n = test_node(9815, 42);
	let config = Config {
		datastore: false,
		..test_config()
	};
	let s = NodeServer::new(n.clone(), config);
	let m = s.start(None).await?;
	let c = setup_client(&n.addr).await?;

	assert_eq!(
		c.put_rpc(context::current(), "x".to_string(), "1".to_string()).await?,
		Err(ServiceError::NoDatastore)
	);
	assert_eq!(c.get_rpc(context::current(), "x".to_string()).await?, Err(ServiceError::NoDatastore));
	let e = core::put(Some(&s), "x", "1").await.unwrap_err();
	assert!(matches!(e, DhtError::Service(ServiceError::NoDatastore)));
	assert!(c.dump_rpc(context::current()).await?.is_empty());

	m.stop().await?;
	Ok(())
}
