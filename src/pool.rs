//! Free-lists of reusable codec objects.

use std::ops::{Deref, DerefMut};

use crossbeam_queue::ArrayQueue;

use crate::level::{normalize, SLOTS};

/// A bounded, lock-free free-list.
///
/// Objects released into a full pool are dropped; nothing relies on an object surviving.
#[derive(Debug)]
pub(crate) struct Pool<T> {
    idle: ArrayQueue<T>,
}

impl<T> Pool<T> {
    pub(crate) fn new(max_idle: usize) -> Self {
        Self {
            idle: ArrayQueue::new(max_idle.max(1)),
        }
    }

    /// Take an idle object, preparing it with `reset`, or build a new one with `create`.
    ///
    /// The object goes back into the pool when the returned guard is dropped.
    pub(crate) fn acquire(
        &self,
        create: impl FnOnce() -> T,
        reset: impl FnOnce(&mut T),
    ) -> Pooled<'_, T> {
        let value = match self.idle.pop() {
            Some(mut value) => {
                reset(&mut value);
                value
            }
            None => {
                log::trace!("pool empty, creating a new {}", std::any::type_name::<T>());
                create()
            }
        };
        Pooled {
            value: Some(value),
            pool: self,
        }
    }

    pub(crate) fn take(&self) -> Option<T> {
        self.idle.pop()
    }

    pub(crate) fn release(&self, value: T) {
        if self.idle.push(value).is_err() {
            log::trace!("pool full, dropping an idle {}", std::any::type_name::<T>());
        }
    }

    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.idle.len()
    }
}

/// Exclusive access to a pooled object, returned to its pool on drop.
#[derive(Debug)]
pub(crate) struct Pooled<'a, T> {
    value: Option<T>,
    pool: &'a Pool<T>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `None` while dropping.
        self.value.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.release(value);
        }
    }
}

/// One [`Pool`] per normalized compression level.
#[derive(Debug)]
pub(crate) struct LevelPools<T> {
    slots: [Pool<T>; SLOTS],
}

impl<T> LevelPools<T> {
    pub(crate) fn new(max_idle: usize) -> Self {
        Self {
            slots: std::array::from_fn(|_| Pool::new(max_idle)),
        }
    }

    pub(crate) fn slot(&self, level: i32) -> &Pool<T> {
        &self.slots[normalize(level)]
    }
}

#[cfg(test)]
mod tests {
    use super::{LevelPools, Pool};
    use crate::level::{BEST_COMPRESSION, BEST_SPEED, DEFAULT_COMPRESSION};

    #[test]
    fn reuses_released_objects() {
        let pool = Pool::new(4);

        let mut first = pool.acquire(|| vec![1u8], |_| unreachable!());
        first.push(2);
        drop(first);
        assert_eq!(pool.idle(), 1);

        let second = pool.acquire(|| unreachable!(), |v: &mut Vec<u8>| v.clear());
        assert!(second.is_empty());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn full_pool_drops_objects() {
        let pool = Pool::new(1);
        pool.release(1);
        pool.release(2);

        assert_eq!(pool.idle(), 1);
        assert_eq!(pool.take(), Some(1));
        assert_eq!(pool.take(), None);
    }

    #[test]
    fn zero_capacity_still_pools_one() {
        let pool = Pool::new(0);
        pool.release(());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn levels_do_not_share_slots() {
        let pools = LevelPools::new(4);
        pools.slot(BEST_SPEED).release(BEST_SPEED);

        assert_eq!(pools.slot(BEST_COMPRESSION).take(), None);
        assert_eq!(pools.slot(BEST_SPEED).take(), Some(BEST_SPEED));
    }

    #[test]
    fn default_and_invalid_levels_share_slot() {
        let pools = LevelPools::new(4);
        pools.slot(42).release(42);

        assert_eq!(pools.slot(DEFAULT_COMPRESSION).take(), Some(42));
    }
}
