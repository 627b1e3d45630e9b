use crate::IdPoolError;
use std::fmt;

/// A closed interval `[first, last]` of unallocated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FreeRange {
    pub first: u32,
    pub last: u32,
}

#[allow(clippy::len_without_is_empty)]
impl FreeRange {
    pub fn new(first: u32, last: u32) -> Self {
        debug_assert!(first <= last, "FreeRange({}, {}) is inverted", first, last);
        Self { first, last }
    }

    pub fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn contains(&self, id: u32) -> bool {
        self.first <= id && id <= self.last
    }
}

impl fmt::Display for FreeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else if self.first < self.last {
            write!(f, "{}-{}", self.first, self.last)
        } else {
            write!(f, "-")
        }
    }
}

/// Hands out ids from `[0, capacity)`, tracking the unused ones as a sorted list of
/// disjoint, non-touching [`FreeRange`]s.
///
/// Allocation always takes the lowest id that fits, and freed blocks are merged with
/// their neighbours so the list stays as short as the holes in the pool allow. An empty
/// list means every id is allocated.
///
/// The pool is not synchronized, wrap it in a [`crate::SharedIdPool`] to share it.
#[derive(Debug, Clone)]
pub struct IdPool {
    capacity: u32,
    used_count: u32,
    generation: u32,
    free_ranges: Vec<FreeRange>,
}

impl IdPool {
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: u32) -> Self {
        assert!(pool_size >= 1, "IdPool must hold at least one id");
        let mut free_ranges = Vec::with_capacity(1);
        free_ranges.push(FreeRange::new(0, pool_size - 1));
        Self {
            capacity: pool_size,
            used_count: 0,
            generation: 0,
            free_ranges,
        }
    }

    /// Tears the pool down. Every id must have been returned first, anything else is a
    /// leak in the caller and panics.
    pub fn deinit(self) {
        assert_eq!(
            self.used_count, 0,
            "IdPool deinit with {} ids still allocated",
            self.used_count
        );
        trace!("Deinit IdPool({})", self.capacity);
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn used_count(&self) -> u32 {
        self.used_count
    }

    pub fn free_count(&self) -> u32 {
        self.capacity - self.used_count
    }

    /// Bumped by every [`IdPool::destroy_all`]. Ids handed out under an older
    /// generation no longer belong to their holder.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn free_ranges(&self) -> &[FreeRange] {
        &self.free_ranges
    }

    pub fn create_id(&mut self) -> Option<u32> {
        if self.free_ranges.is_empty() {
            debug!("IdPool({}) is full", self.capacity);
            return None;
        }

        let id = self.take_front(0, 1);
        trace!("Create id {}", id);
        self.debug_check();
        Some(id)
    }

    /// Allocates `count` consecutive ids from the first free range big enough to hold
    /// them and returns the first one.
    pub fn create_range_id(&mut self, count: u32) -> Option<u32> {
        if count == 0 {
            warn!("Tried to create an empty id range");
            return None;
        }

        let index = match self
            .free_ranges
            .iter()
            .position(|range| range.len() >= count)
        {
            Some(index) => index,
            None => {
                debug!("IdPool({}) has no free range of {} ids", self.capacity, count);
                return None;
            }
        };

        let first = self.take_front(index, count);
        trace!("Create id range {}+{}", first, count);
        self.debug_check();
        Some(first)
    }

    pub fn destroy_id(&mut self, id: u32) -> crate::Result<()> {
        self.destroy_range_id(id, 1)
    }

    /// Returns the block `[id, id + count)` to the pool.
    ///
    /// Fails without touching the pool if the block leaves the pool or overlaps any id
    /// that is already free.
    pub fn destroy_range_id(&mut self, id: u32, count: u32) -> crate::Result<()> {
        if count == 0 {
            warn!("Tried to destroy an empty id range at {}", id);
            return Err(IdPoolError::EmptyRange);
        }

        let last = match id.checked_add(count) {
            Some(end) if end <= self.capacity => end - 1,
            _ => {
                warn!(
                    "Id range {}+{} is outside of IdPool({})",
                    id, count, self.capacity
                );
                return Err(IdPoolError::OutOfBounds {
                    id,
                    count,
                    capacity: self.capacity,
                });
            }
        };

        // First range that ends at or after `id`, everything before it lies entirely below.
        let index = self.free_ranges.partition_point(|range| range.last < id);

        let next = self.free_ranges.get(index).copied();
        if let Some(next) = next {
            if next.first <= last {
                warn!("Id range {}+{} is already free ({})", id, count, next);
                return Err(IdPoolError::AlreadyFree { id, count });
            }
        }

        let touches_prev = index > 0 && self.free_ranges[index - 1].last + 1 == id;
        let touches_next = next.map_or(false, |next| last + 1 == next.first);

        match (touches_prev, touches_next) {
            (true, true) => {
                self.free_ranges[index - 1].last = self.free_ranges[index].last;
                self.free_ranges.remove(index);
            }
            (true, false) => self.free_ranges[index - 1].last = last,
            (false, true) => self.free_ranges[index].first = id,
            (false, false) => self.free_ranges.insert(index, FreeRange::new(id, last)),
        }

        self.used_count -= count;
        trace!("Destroy id range {}+{}", id, count);
        self.debug_check();
        Ok(())
    }

    /// True if some single free range can hold `count` consecutive ids. Always false for
    /// a `count` of 0, which [`IdPool::create_range_id`] never satisfies.
    pub fn is_range_available(&self, count: u32) -> bool {
        count > 0 && self.free_ranges.iter().any(|range| range.len() >= count)
    }

    pub fn is_free(&self, id: u32) -> bool {
        let index = self.free_ranges.partition_point(|range| range.last < id);
        self.free_ranges
            .get(index)
            .map_or(false, |range| range.contains(id))
    }

    /// Lowest of the largest free ranges.
    pub fn largest_free_range(&self) -> Option<FreeRange> {
        self.free_ranges
            .iter()
            .copied()
            .reduce(|best, range| if range.len() > best.len() { range } else { best })
    }

    /// Frees every id at once, whether or not the owners gave them back.
    pub fn destroy_all(&mut self) {
        trace!(
            "Destroy all ids in IdPool({}), {} were allocated",
            self.capacity,
            self.used_count
        );
        self.free_ranges.clear();
        self.free_ranges.push(FreeRange::new(0, self.capacity - 1));
        self.used_count = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Dumps the free ranges to stdout, meant to be called from a debugger.
    pub fn print_ranges(&self) {
        println!("{}", self);
    }

    /// Panics if the free range list is corrupt.
    pub fn check_ranges(&self) {
        let mut free_count = 0u64;
        for (index, range) in self.free_ranges.iter().enumerate() {
            assert!(
                range.first <= range.last,
                "IdPool range {} is inverted: {:?}",
                index,
                range
            );
            assert!(
                range.last < self.capacity,
                "IdPool range {} ({}) exceeds max id {}",
                index,
                range,
                self.capacity - 1
            );
            if let Some(next) = self.free_ranges.get(index + 1) {
                assert!(
                    range.last + 1 < next.first,
                    "IdPool ranges {} and {} are out of order or touching: {}, {}",
                    index,
                    index + 1,
                    range,
                    next
                );
            }
            free_count += range.len() as u64;
        }
        assert_eq!(
            self.used_count as u64 + free_count,
            self.capacity as u64,
            "IdPool used/free counts do not add up to the capacity"
        );
    }

    fn take_front(&mut self, index: usize, count: u32) -> u32 {
        let range = self.free_ranges[index];
        if range.len() == count {
            self.free_ranges.remove(index);
        } else {
            self.free_ranges[index].first += count;
        }
        self.used_count += count;
        range.first
    }

    #[inline]
    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            self.check_ranges();
        }
    }
}

impl fmt::Display for IdPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.free_ranges.is_empty() {
            return write!(f, "-");
        }

        for (index, range) in self.free_ranges.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", range)?;
        }
        Ok(())
    }
}
