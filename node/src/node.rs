//! A running node: the LMDB-backed chain plus its background tasks.

use std::sync::Arc;
use std::time::Duration;

use dagcore_crypto::Keyring;
use dagcore_ledger::Dagchain;
use dagcore_store_lmdb::{environment::DATABASE_COUNT, LmdbEnvironment};
use dagcore_types::SystemClock;
use tokio::task::JoinHandle;

use crate::block_processor::BlockProcessor;
use crate::config::NodeConfig;
use crate::shutdown::ShutdownController;
use crate::NodeError;

/// Timeout for waiting on background tasks during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Most finalizations performed in one tick, so a long backlog does not hold
/// the chain's write lock for a whole catch-up.
const MAX_FINALIZATIONS_PER_TICK: usize = 64;

pub struct DagNode {
    pub config: NodeConfig,
    pub chain: Arc<Dagchain<LmdbEnvironment>>,
    pub block_processor: Arc<BlockProcessor<LmdbEnvironment>>,
    pub shutdown: Arc<ShutdownController>,
    /// Handles for spawned background tasks (joined during shutdown).
    task_handles: Vec<JoinHandle<()>>,
}

impl DagNode {
    /// Open the LMDB environment under `config.data_dir` and the chain on top of it.
    pub fn open(config: NodeConfig, keyring: Keyring) -> Result<Self, NodeError> {
        let env = LmdbEnvironment::open(&config.data_dir, DATABASE_COUNT, config.map_size)?;
        let chain = Arc::new(Dagchain::open(
            Arc::new(env),
            config.chain.clone(),
            keyring,
            Arc::new(SystemClock),
        )?);
        let block_processor = Arc::new(BlockProcessor::new(
            Arc::clone(&chain),
            config.unchecked_max_size,
        ));

        let stats = chain.stats();
        tracing::info!(
            data_dir = %config.data_dir.display(),
            network = config.chain.network.as_str(),
            nblocks = stats.nblocks,
            nmain = stats.nmain,
            "node opened"
        );

        Ok(Self {
            config,
            chain,
            block_processor,
            shutdown: Arc::new(ShutdownController::new()),
            task_handles: Vec::new(),
        })
    }

    /// Run finalization and unchecked expiry every `finalize_interval_ms`
    /// until shutdown.
    pub fn spawn_finalizer(&mut self) {
        let chain = Arc::clone(&self.chain);
        let processor = Arc::clone(&self.block_processor);
        let mut shutdown_rx = self.shutdown.subscribe();
        let period = Duration::from_millis(self.config.finalize_interval_ms.max(1));
        let max_age = self.config.unchecked_max_age_secs;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    biased;
                    _ = ShutdownController::wait(&mut shutdown_rx) => {
                        tracing::info!("finalizer shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        for _ in 0..MAX_FINALIZATIONS_PER_TICK {
                            match chain.check_finalization() {
                                Ok(Some(address)) => {
                                    tracing::debug!(%address, "finalizer promoted block");
                                }
                                Ok(None) => break,
                                Err(e) => {
                                    tracing::error!(error = %e, "finalization failed");
                                    break;
                                }
                            }
                        }
                        processor.clear_expired(max_age);
                    }
                }
            }
        });
        self.task_handles.push(handle);
    }

    /// Signal shutdown and wait for every background task.
    pub async fn stop(mut self) -> Result<(), NodeError> {
        self.shutdown.shutdown();
        let handles = std::mem::take(&mut self.task_handles);
        let joined = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "background task ended abnormally");
                }
            }
        })
        .await;
        if joined.is_err() {
            return Err(NodeError::ShutdownTimeout);
        }
        tracing::info!("node stopped");
        Ok(())
    }
}
