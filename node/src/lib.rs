//! dagcore node runtime.
//!
//! Wires the consensus core to durable storage and a tokio runtime:
//! - Loads [`NodeConfig`] from TOML
//! - Installs structured logging
//! - Opens the LMDB-backed [`Dagchain`](dagcore_ledger::Dagchain)
//! - Parks blocks with unknown links until their dependencies arrive
//! - Runs finalization periodically until shutdown

pub mod block_processor;
pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod shutdown;
pub mod unchecked;

pub use block_processor::{BlockProcessor, BlockSource};
pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::DagNode;
pub use shutdown::ShutdownController;
pub use unchecked::UncheckedMap;
