//! Database schema version check.
//!
//! Tracks a monotonically increasing schema version in the meta database.
//! There is a single schema so far; the hook exists so later layouts can
//! upgrade older databases in place.

use crate::{LmdbError, LmdbMetaStore};

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub struct Migrator;

impl Migrator {
    /// Stamp a fresh database, accept a current one, refuse a newer one.
    pub fn run(meta: &LmdbMetaStore) -> Result<(), LmdbError> {
        let current = meta.schema_version()?;

        if current == CURRENT_SCHEMA_VERSION {
            tracing::debug!(version = current, "database schema is up to date");
            return Ok(());
        }

        if current > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found: current,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        meta.set_schema_version(CURRENT_SCHEMA_VERSION)?;
        tracing::info!(version = CURRENT_SCHEMA_VERSION, "database schema initialised");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::LmdbEnvironment;

    use super::*;

    fn open(path: &Path) -> Result<LmdbEnvironment, LmdbError> {
        LmdbEnvironment::open(path, 8, 16 * 1024 * 1024)
    }

    #[test]
    fn fresh_database_is_stamped() {
        let dir = tempfile::tempdir().unwrap();
        let env = open(dir.path()).unwrap();
        assert_eq!(env.meta.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = open(dir.path()).unwrap();
            env.meta.set_schema_version(CURRENT_SCHEMA_VERSION + 1).unwrap();
        }
        assert!(matches!(
            open(dir.path()),
            Err(LmdbError::SchemaTooNew { .. })
        ));
    }
}
