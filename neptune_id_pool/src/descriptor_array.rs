use crate::{IdPool, IdPoolError};

/// Slot book-keeping for one binding of a bindless descriptor set.
///
/// Indices come from an [`IdPool`] so freed slots are reused lowest first. Every change
/// is queued as an `(index, value)` write for the renderer to flush with
/// [`DescriptorArray::take_updates`], removed slots get `empty_value` written back so
/// stale descriptors are never left bound.
pub struct DescriptorArray<T> {
    index_pool: IdPool,
    empty_value: T,
    updates: Vec<(u32, T)>,
}

impl<T: Clone> DescriptorArray<T> {
    pub fn new(count: u32, empty_value: T) -> Self {
        Self {
            index_pool: IdPool::new(count),
            empty_value,
            updates: Vec::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.index_pool.capacity()
    }

    pub fn len(&self) -> u32 {
        self.index_pool.used_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&mut self, value: T) -> Option<u32> {
        let index = self.index_pool.create_id()?;
        self.updates.push((index, value));
        Some(index)
    }

    pub fn update(&mut self, index: u32, value: T) -> crate::Result<()> {
        if index >= self.capacity() {
            return Err(IdPoolError::OutOfBounds {
                id: index,
                count: 1,
                capacity: self.capacity(),
            });
        }
        if self.index_pool.is_free(index) {
            return Err(IdPoolError::NotAllocated { id: index });
        }

        self.updates.push((index, value));
        Ok(())
    }

    pub fn remove(&mut self, index: u32) -> crate::Result<()> {
        self.index_pool.destroy_id(index)?;
        self.updates.push((index, self.empty_value.clone()));
        Ok(())
    }

    pub fn take_updates(&mut self) -> Vec<(u32, T)> {
        std::mem::take(&mut self.updates)
    }

    /// Frees every slot and drops the queued writes.
    pub fn reset(&mut self) {
        self.index_pool.destroy_all();
        self.updates.clear();
    }
}
