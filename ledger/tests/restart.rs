//! Reopening a chain from LMDB.

use std::path::Path;
use std::sync::Arc;

use dagcore_crypto::{keypair_from_seed, Keyring};
use dagcore_ledger::{BlockBuilder, ChainConfig, Dagchain, ImportResult, PLACEHOLDER_NONCE};
use dagcore_nullables::NullClock;
use dagcore_store_lmdb::LmdbEnvironment;
use dagcore_types::{Amount, NetworkId, Timestamp};

fn open(path: &Path) -> Dagchain<LmdbEnvironment> {
    let env = LmdbEnvironment::open(path, 8, 64 * 1024 * 1024).unwrap();
    let key = keypair_from_seed(&[3u8; 32]).unwrap();
    let clock = Arc::new(NullClock::new(Timestamp::start_of_epoch(30)));
    Dagchain::open(Arc::new(env), ChainConfig::devnet(), Keyring::new(vec![key]), clock).unwrap()
}

fn at(epoch: u64, offset: u64) -> Timestamp {
    Timestamp::new(Timestamp::start_of_epoch(epoch).ticks() + offset)
}

#[test]
fn head_and_balances_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let key = keypair_from_seed(&[3u8; 32]).unwrap();

    let g = BlockBuilder::new(NetworkId::Devnet, at(10, 5))
        .sign_output(&key)
        .build()
        .unwrap();
    let p = BlockBuilder::new(NetworkId::Devnet, at(11, 5))
        .output(g.address(), Amount::ZERO)
        .build()
        .unwrap();
    let r = BlockBuilder::new(NetworkId::Devnet, at(12, 5))
        .output(p.address(), Amount::ZERO)
        .build()
        .unwrap();

    let (stats, head) = {
        let chain = open(dir.path());
        for block in [&g, &p, &r] {
            assert!(chain.admit(block.clone()).unwrap().is_accepted());
        }
        assert_eq!(chain.check_finalization().unwrap(), Some(g.address()));
        (chain.stats(), chain.head())
    };

    let chain = open(dir.path());
    assert_eq!(chain.stats(), stats);
    assert_eq!(chain.head(), head);
    assert_eq!(chain.head().top, Some(r.address()));
    assert_eq!(chain.admit(p.clone()).unwrap(), ImportResult::Exists);

    let g_info = chain.block_info(&g.address()).unwrap().unwrap();
    assert!(g_info.flags.is_finalized());
    assert_eq!(g_info.balance, chain.config().reward_start);
    assert_eq!(chain.main_block_at(1).unwrap().map(|i| i.address), Some(g.address()));
    assert_eq!(chain.our_blocks().unwrap(), vec![(0, g.address())]);

    // Finalization resumes where it stopped.
    assert_eq!(chain.check_finalization().unwrap(), Some(p.address()));
}

#[test]
fn extra_top_is_replaced_by_its_best_link() {
    let dir = tempfile::tempdir().unwrap();
    let g = BlockBuilder::new(NetworkId::Devnet, at(10, 5)).build().unwrap();
    let extra = BlockBuilder::new(NetworkId::Devnet, at(11, 0).end_of_epoch())
        .output(g.address(), Amount::ZERO)
        .nonce(PLACEHOLDER_NONCE)
        .build()
        .unwrap();

    {
        let chain = open(dir.path());
        chain.admit(g.clone()).unwrap();
        assert_eq!(
            chain.admit(extra.clone()).unwrap(),
            ImportResult::Accepted { new_best: true }
        );
        assert_eq!(chain.extra_len(), 1);
        assert_eq!(chain.stats().nblocks, 2);
    }

    let chain = open(dir.path());
    assert!(!chain.contains(&extra.address()).unwrap());
    assert_eq!(chain.head().top, Some(g.address()));
    let stats = chain.stats();
    assert_eq!((stats.nblocks, stats.nextra), (1, 0));
    assert_eq!(stats.difficulty, g.own_difficulty());
}
