//! Integration tests exercising the node runtime end-to-end:
//! configuration → LMDB-backed chain → block intake → background finalization.

use std::time::Duration;

use dagcore_crypto::{keypair_from_seed, Keyring};
use dagcore_ledger::{Block, BlockBuilder, ChainConfig, ImportResult};
use dagcore_node::{BlockSource, DagNode, NodeConfig};
use dagcore_types::{Amount, BlockAddress, NetworkId, Timestamp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn node_config(dir: &tempfile::TempDir) -> NodeConfig {
    NodeConfig {
        data_dir: dir.path().join("ledger"),
        map_size: 64 * 1024 * 1024,
        finalize_interval_ms: 10,
        chain: ChainConfig::devnet(),
        ..NodeConfig::default()
    }
}

fn keyring() -> Keyring {
    Keyring::new(vec![keypair_from_seed(&[5u8; 32]).unwrap()])
}

/// A block `epochs_ago` epochs before the current one.
fn block(epochs_ago: u64, links: &[BlockAddress]) -> Block {
    let epoch = Timestamp::now().epoch() - epochs_ago;
    let mut builder = BlockBuilder::new(NetworkId::Devnet, Timestamp::start_of_epoch(epoch));
    for link in links {
        builder = builder.output(*link, Amount::ZERO);
    }
    builder.build().unwrap()
}

async fn wait_for_nmain(node: &DagNode, nmain: u64) {
    for _ in 0..200 {
        if node.chain.stats().nmain >= nmain {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("finalizer did not reach {nmain} main blocks");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn finalizer_promotes_main_chain() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = DagNode::open(node_config(&dir), keyring()).unwrap();

    let g = block(5, &[]);
    let p = block(4, &[g.address()]);
    let r = block(3, &[p.address()]);
    for b in [&g, &p, &r] {
        assert!(node
            .block_processor
            .process(b.clone(), BlockSource::Network)
            .unwrap()
            .is_accepted());
    }

    node.spawn_finalizer();
    wait_for_nmain(&node, 2).await;

    assert_eq!(node.chain.main_block_at(1).unwrap().map(|i| i.address), Some(g.address()));
    assert_eq!(node.chain.main_block_at(2).unwrap().map(|i| i.address), Some(p.address()));
    let reward = node.chain.config().reward_start;
    assert_eq!(node.chain.balance_of(&p.address()).unwrap(), Some(reward));

    node.stop().await.unwrap();
}

#[tokio::test]
async fn out_of_order_blocks_resolve_and_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let g = block(5, &[]);
    let p = block(4, &[g.address()]);
    let r = block(3, &[p.address()]);

    {
        let node = DagNode::open(node_config(&dir), keyring()).unwrap();
        let bp = &node.block_processor;
        assert_eq!(
            bp.process_bytes(r.as_bytes(), BlockSource::Network).unwrap(),
            ImportResult::NoParent(p.address())
        );
        assert_eq!(
            bp.process_bytes(p.as_bytes(), BlockSource::Network).unwrap(),
            ImportResult::NoParent(g.address())
        );
        assert!(bp
            .process_bytes(g.as_bytes(), BlockSource::Network)
            .unwrap()
            .is_accepted());
        assert_eq!(bp.unchecked_len(), 0);
        assert_eq!(node.chain.head().top, Some(r.address()));
        node.stop().await.unwrap();
    }

    let node = DagNode::open(node_config(&dir), keyring()).unwrap();
    assert_eq!(node.chain.stats().nblocks, 3);
    assert_eq!(node.chain.head().top, Some(r.address()));
    assert_eq!(
        node.block_processor
            .process(g.clone(), BlockSource::Network)
            .unwrap(),
        ImportResult::Exists
    );
    node.stop().await.unwrap();
}

#[tokio::test]
async fn locally_assembled_block_is_owned() {
    let dir = tempfile::tempdir().unwrap();
    let node = DagNode::open(node_config(&dir), keyring()).unwrap();
    let g = block(5, &[]);
    node.block_processor.process(g.clone(), BlockSource::Network).unwrap();

    let link = node.chain.create_link_block(None).unwrap();
    assert!(node
        .block_processor
        .process(link.clone(), BlockSource::Local)
        .unwrap()
        .is_accepted());
    assert_eq!(node.chain.our_blocks().unwrap(), vec![(0, link.address())]);
    assert!(node.chain.block_info(&g.address()).unwrap().unwrap().flags.is_referenced());
    node.stop().await.unwrap();
}

#[tokio::test]
async fn stop_without_tasks_is_immediate() {
    let dir = tempfile::tempdir().unwrap();
    let node = DagNode::open(node_config(&dir), Keyring::empty()).unwrap();
    assert!(!node.shutdown.is_shutdown());
    let shutdown = std::sync::Arc::clone(&node.shutdown);
    node.stop().await.unwrap();
    assert!(shutdown.is_shutdown());
}

#[test]
fn config_file_drives_chain_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.toml");
    std::fs::write(
        &path,
        format!(
            r#"
            data_dir = "{}"
            finalize_interval_ms = 50

            [chain]
            network = "testnet"
            max_extra_blocks = 8
            "#,
            dir.path().join("db").display()
        ),
    )
    .unwrap();

    let config = NodeConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.finalize_interval_ms, 50);
    assert_eq!(config.chain.network, NetworkId::Testnet);

    let node = DagNode::open(config, Keyring::empty()).unwrap();
    assert_eq!(node.chain.config().max_extra_blocks, 8);
    assert_eq!(node.chain.stats().nblocks, 0);
}
