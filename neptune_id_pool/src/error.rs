#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPoolError {
    #[error("Tried to free an empty range")]
    EmptyRange,

    #[error("Range {id}+{count} is outside of the pool (capacity {capacity})")]
    OutOfBounds { id: u32, count: u32, capacity: u32 },

    #[error("Range {id}+{count} overlaps ids that are already free")]
    AlreadyFree { id: u32, count: u32 },

    #[error("Id {id} is not allocated")]
    NotAllocated { id: u32 },
}
