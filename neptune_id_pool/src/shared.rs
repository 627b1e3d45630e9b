use crate::IdPool;
use std::sync::{Arc, Mutex, MutexGuard};

/// An [`IdPool`] behind a mutex so several owners can allocate from it.
#[derive(Clone)]
pub struct SharedIdPool(Arc<Mutex<IdPool>>);

impl SharedIdPool {
    pub fn new(pool_size: u32) -> Self {
        Self::from_pool(IdPool::new(pool_size))
    }

    pub fn from_pool(pool: IdPool) -> Self {
        Self(Arc::new(Mutex::new(pool)))
    }

    pub fn lock(&self) -> MutexGuard<IdPool> {
        self.0.lock().unwrap()
    }

    /// Allocates `count` consecutive ids that go back to the pool when the returned
    /// [`IdAllocation`] is dropped.
    pub fn allocate(&self, count: u32) -> Option<IdAllocation> {
        let (first, generation) = {
            let mut pool = self.lock();
            let first = if count == 1 {
                pool.create_id()
            } else {
                pool.create_range_id(count)
            }?;
            (first, pool.generation())
        };

        Some(IdAllocation {
            first,
            count,
            generation,
            pool: self.clone(),
        })
    }
}

/// Ids allocated from a [`SharedIdPool`].
///
/// If the pool is `destroy_all`ed while this is alive the ids are forfeit, dropping it
/// afterwards leaves the pool alone.
pub struct IdAllocation {
    first: u32,
    count: u32,
    generation: u32,
    pool: SharedIdPool,
}

impl IdAllocation {
    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn ids(&self) -> std::ops::Range<u32> {
        self.first..(self.first + self.count)
    }
}

impl std::fmt::Debug for IdAllocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdAllocation")
            .field("first", &self.first)
            .field("count", &self.count)
            .finish()
    }
}

impl Drop for IdAllocation {
    fn drop(&mut self) {
        let mut pool = self.pool.lock();
        if pool.generation() != self.generation {
            warn!(
                "Ids {}+{} outlived a destroy_all of their pool, not returning them",
                self.first, self.count
            );
            return;
        }

        if let Err(err) = pool.destroy_range_id(self.first, self.count) {
            warn!(
                "Failed to return ids {}+{} on drop: {}",
                self.first, self.count, err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn allocation_returns_ids_on_drop() {
        let pool = SharedIdPool::new(8);
        let a = pool.allocate(1).unwrap();
        let b = pool.allocate(3).unwrap();
        assert_eq!(a.first(), 0);
        assert_eq!(b.ids(), 1..4);
        assert_eq!(pool.lock().used_count(), 4);

        drop(a);
        assert_eq!(pool.lock().used_count(), 3);
        assert!(pool.lock().is_free(0));

        drop(b);
        assert_eq!(pool.lock().used_count(), 0);
        assert_eq!(pool.lock().free_ranges().len(), 1);
    }

    #[test]
    fn allocation_fails_when_full() {
        let pool = SharedIdPool::new(2);
        let _all = pool.allocate(2).unwrap();
        assert!(pool.allocate(1).is_none());
        assert!(pool.allocate(0).is_none());
    }

    #[test]
    fn drop_after_destroy_all_is_harmless() {
        let pool = SharedIdPool::new(4);
        let allocation = pool.allocate(2).unwrap();
        pool.lock().destroy_all();

        drop(allocation);
        assert_eq!(pool.lock().used_count(), 0);
        pool.lock().check_ranges();
    }

    #[test]
    fn stale_allocation_does_not_free_new_owner() {
        let pool = SharedIdPool::new(4);
        let stale = pool.allocate(2).unwrap();
        pool.lock().destroy_all();

        let owner = pool.allocate(2).unwrap();
        assert_eq!(owner.ids(), 0..2);

        drop(stale);
        assert_eq!(pool.lock().used_count(), 2);
        assert!(!pool.lock().is_free(0));
        assert!(!pool.lock().is_free(1));

        let next = pool.allocate(2).unwrap();
        assert_eq!(next.ids(), 2..4);

        drop(owner);
        drop(next);
        assert_eq!(pool.lock().used_count(), 0);
    }

    #[test]
    fn threads_get_unique_ids() {
        let pool = SharedIdPool::new(400);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || {
                    (0..100)
                        .map(|_| pool.lock().create_id().unwrap())
                        .collect::<Vec<u32>>()
                })
            })
            .collect();

        let mut ids: Vec<u32> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..400).collect::<Vec<u32>>());
        assert_eq!(pool.lock().create_id(), None);
    }
}
