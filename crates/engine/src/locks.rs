//! Bounded lock acquisition.
//!
//! Every wait is capped by the configured lock timeout; running out of time
//! surfaces as `EngineError::Busy` so the caller can back off and retry.
//!
//! Lock order: document or payment (payment first when both), approval,
//! periods, accounts, ledger. Shorter prefixes are fine; going backwards is not.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{
    Mutex, MutexGuard, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use tokio::time::timeout;
use tracing::warn;

use crate::error::EngineError;

fn busy(resource: impl Into<String>) -> EngineError {
    let resource = resource.into();
    warn!(resource = %resource, "Lock wait timed out");
    EngineError::Busy { resource }
}

pub(crate) async fn read<'a, T>(
    lock: &'a RwLock<T>,
    wait: Duration,
    resource: &'static str,
) -> Result<RwLockReadGuard<'a, T>, EngineError> {
    timeout(wait, lock.read()).await.map_err(|_| busy(resource))
}

pub(crate) async fn write<'a, T>(
    lock: &'a RwLock<T>,
    wait: Duration,
    resource: &'static str,
) -> Result<RwLockWriteGuard<'a, T>, EngineError> {
    timeout(wait, lock.write()).await.map_err(|_| busy(resource))
}

pub(crate) async fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    wait: Duration,
    resource: &'static str,
) -> Result<MutexGuard<'a, T>, EngineError> {
    timeout(wait, mutex.lock()).await.map_err(|_| busy(resource))
}

/// Locks one entry of a lock table (document, payment, approval).
pub(crate) async fn lock_owned<T>(
    handle: Arc<Mutex<T>>,
    wait: Duration,
    resource: impl Into<String>,
) -> Result<OwnedMutexGuard<T>, EngineError> {
    timeout(wait, handle.lock_owned())
        .await
        .map_err(|_| busy(resource))
}
