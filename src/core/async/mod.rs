//! Thread-safe counterparts of the core components
//!
//! - **AsyncTransactionBook**: transaction registry backed by `DashMap`,
//!   with one critical section per transaction
//! - **BatchProcessor**: partitions batches by transaction reference and
//!   processes partitions on concurrent tokio tasks
//!
//! Operations on different transactions proceed in parallel; operations on
//! the same transaction are serialized. There is no global lock.

pub mod batch_processor;
pub mod book;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use book::AsyncTransactionBook;
