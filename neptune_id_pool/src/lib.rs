mod descriptor_array;
mod error;
mod id_pool;
mod shared;

pub use descriptor_array::*;
pub use error::*;
pub use id_pool::*;
pub use shared::*;

#[macro_use]
extern crate log;

pub type Result<T> = std::result::Result<T, IdPoolError>;
