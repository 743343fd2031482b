//! Poison-recovering lock guards for store state.
//!
//! A panicking task must not wedge every later reader, so poisoned locks
//! are logged and recovered. Store state is always rebuildable from the
//! backend; stale-after-panic is acceptable, deadlocked-forever is not.

use std::sync::{
    Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use tracing::warn;

fn recover<G>(
    result: Result<G, PoisonError<G>>,
    target: &'static str,
    op: &'static str,
    lock_kind: &'static str,
) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            op,
            target_module = target,
            lock_kind,
            "recovered from poisoned store lock; state may be stale after a panic"
        );
        poisoned.into_inner()
    })
}

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), target, op, "rwlock.read")
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), target, op, "rwlock.write")
}

pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    recover(lock.lock(), target, op, "mutex.lock")
}
