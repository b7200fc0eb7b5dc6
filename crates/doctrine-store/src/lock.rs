//! Cooperative exclusive edit locks.
//!
//! The lock is the application-level claim exposed to users: acquiring it
//! prevents other users from creating versions of the same item until an
//! explicit release. It is independent of the repository's internal
//! per-item serialization. Locks do not expire unless a TTL is
//! configured; a disconnected holder otherwise keeps the lock until the
//! administrative override releases it (documented staleness risk).

use chrono::{DateTime, Duration, Utc};
use doctrine_version::UserId;
use serde::{Deserialize, Serialize};

/// The identity holding a lock and when it was acquired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockHolder {
    /// Holder identity
    pub user: UserId,
    /// Acquisition time
    pub locked_at: DateTime<Utc>,
}

/// Lock descriptor on a content item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    holder: Option<LockHolder>,
}

impl LockState {
    /// An unlocked state.
    #[must_use]
    pub fn unlocked() -> Self {
        Self::default()
    }

    /// Whether any holder is recorded (ignores TTL).
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.holder.is_some()
    }

    /// Current holder, if any (ignores TTL).
    #[inline]
    #[must_use]
    pub fn holder(&self) -> Option<&LockHolder> {
        self.holder.as_ref()
    }

    /// Acquire the lock for `user`.
    ///
    /// Re-acquisition by the current holder is an idempotent no-op (the
    /// original acquisition time is kept). An expired lock, when a TTL is
    /// configured, is treated as released.
    ///
    /// # Errors
    /// Returns [`LockError::AlreadyLocked`] if a different user holds a
    /// live lock
    pub fn acquire(
        &mut self,
        user: &UserId,
        now: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> Result<(), LockError> {
        match &self.holder {
            Some(holder) if holder.user == *user => Ok(()),
            Some(holder) if !expired(holder, now, ttl) => Err(LockError::AlreadyLocked {
                holder: holder.user.clone(),
            }),
            _ => {
                self.holder = Some(LockHolder {
                    user: user.clone(),
                    locked_at: now,
                });
                Ok(())
            }
        }
    }

    /// Release the lock.
    ///
    /// Only the current holder or the designated administrative override
    /// identity may release.
    ///
    /// # Errors
    /// Returns [`LockError::NotLockHolder`] otherwise, including when the
    /// lock is not held at all
    pub fn release(
        &mut self,
        user: &UserId,
        admin_override: Option<&UserId>,
    ) -> Result<(), LockError> {
        match &self.holder {
            Some(holder) if holder.user == *user || admin_override == Some(user) => {
                self.holder = None;
                Ok(())
            }
            Some(holder) => Err(LockError::NotLockHolder {
                holder: Some(holder.user.clone()),
            }),
            None => Err(LockError::NotLockHolder { holder: None }),
        }
    }

    /// The holder blocking `user` from mutating the item, if any.
    ///
    /// `None` when the item is unlocked, locked by `user`, or the lock
    /// has expired under the configured TTL.
    #[must_use]
    pub fn blocking_holder(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> Option<UserId> {
        match &self.holder {
            Some(holder) if holder.user != *user && !expired(holder, now, ttl) => {
                Some(holder.user.clone())
            }
            _ => None,
        }
    }
}

fn expired(holder: &LockHolder, now: DateTime<Utc>, ttl: Option<Duration>) -> bool {
    match ttl {
        Some(ttl) => now - holder.locked_at > ttl,
        None => false,
    }
}

/// Lock acquisition/release failures
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// A different user holds the lock
    #[error("already locked by {holder}")]
    AlreadyLocked {
        /// The current holder
        holder: UserId,
    },

    /// Release attempted by someone other than the holder or the
    /// administrative override
    #[error("caller does not hold the lock")]
    NotLockHolder {
        /// The actual holder, if the lock is held
        holder: Option<UserId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> UserId {
        UserId::new("x")
    }

    fn y() -> UserId {
        UserId::new("y")
    }

    #[test]
    fn acquire_is_exclusive() {
        let mut lock = LockState::unlocked();
        lock.acquire(&x(), Utc::now(), None).unwrap();
        let result = lock.acquire(&y(), Utc::now(), None);
        assert!(matches!(result, Err(LockError::AlreadyLocked { holder }) if holder == x()));
    }

    #[test]
    fn reacquire_by_holder_is_idempotent() {
        let mut lock = LockState::unlocked();
        let t0 = Utc::now();
        lock.acquire(&x(), t0, None).unwrap();
        lock.acquire(&x(), t0 + Duration::seconds(5), None).unwrap();
        assert_eq!(lock.holder().unwrap().locked_at, t0);
    }

    #[test]
    fn release_by_non_holder_fails() {
        let mut lock = LockState::unlocked();
        lock.acquire(&x(), Utc::now(), None).unwrap();
        let result = lock.release(&y(), None);
        assert!(matches!(result, Err(LockError::NotLockHolder { .. })));
        assert!(lock.is_locked());
    }

    #[test]
    fn release_of_unlocked_fails() {
        let mut lock = LockState::unlocked();
        let result = lock.release(&x(), None);
        assert!(matches!(
            result,
            Err(LockError::NotLockHolder { holder: None })
        ));
    }

    #[test]
    fn admin_override_may_release() {
        let mut lock = LockState::unlocked();
        lock.acquire(&x(), Utc::now(), None).unwrap();
        let admin = UserId::new("admin");
        lock.release(&admin, Some(&admin)).unwrap();
        assert!(!lock.is_locked());
    }

    #[test]
    fn blocking_holder_respects_ttl() {
        let mut lock = LockState::unlocked();
        let t0 = Utc::now();
        lock.acquire(&x(), t0, None).unwrap();

        let later = t0 + Duration::minutes(31);
        let ttl = Some(Duration::minutes(30));
        assert_eq!(lock.blocking_holder(&y(), later, None), Some(x()));
        assert_eq!(lock.blocking_holder(&y(), later, ttl), None);
    }

    #[test]
    fn expired_lock_can_be_taken_over() {
        let mut lock = LockState::unlocked();
        let t0 = Utc::now();
        lock.acquire(&x(), t0, None).unwrap();

        let later = t0 + Duration::hours(1);
        lock.acquire(&y(), later, Some(Duration::minutes(30))).unwrap();
        assert_eq!(lock.holder().unwrap().user, y());
    }
}
