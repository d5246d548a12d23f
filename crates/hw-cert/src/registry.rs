//! Per-root store registry
//!
//! The config flow and the polling clients both need the same [`CertStore`]
//! for a given storage root; minting two stores would give each its own
//! pending-operation map and defeat the per-path serialization.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;

use crate::store::{CertStore, CertStoreError};

static STORES: OnceLock<DashMap<PathBuf, Arc<CertStore>>> = OnceLock::new();

/// Idempotent accessor: opens a [`CertStore`] for `root` on first use and
/// hands the same instance back on every later call with the same path.
pub async fn ensure_store(root: impl AsRef<Path>) -> Result<Arc<CertStore>, CertStoreError> {
    let key = root.as_ref().to_path_buf();
    let stores = STORES.get_or_init(DashMap::new);

    if let Some(existing) = stores.get(&key) {
        return Ok(Arc::clone(&existing));
    }

    let store = Arc::new(CertStore::open(&key).await?);
    debug!(root = ?key, "opened certificate store");
    Ok(Arc::clone(stores.entry(key).or_insert(store).value()))
}
