//! Video record store.
//!
//! The `VideoStore` trait is the seam between the HTTP layer and whatever
//! holds video metadata. `MemoryVideoStore` keeps records in process.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{MemoryVideoStore, VideoStore};
