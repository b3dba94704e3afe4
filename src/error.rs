//! Error types for fallible growth and the binary codec.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Growth could not obtain memory. The container that reported it is left
/// exactly as it was before the call.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("capacity overflow")]
    CapacityOverflow,
    #[error(transparent)]
    Reserve(#[from] TryReserveError),
    #[error("{capacity} buckets cannot hold {len} keys")]
    CapacityTooSmall { capacity: usize, len: usize },
    #[error("allocation budget exhausted: requested {requested} bytes, {remaining} remaining")]
    BudgetExhausted { requested: usize, remaining: usize },
}

/// Reading or writing the binary layout failed.
///
/// A container whose `decode` failed is never returned, so there is no
/// partially read state to reuse.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Alloc(#[from] AllocError),
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("invalid tag byte {0}")]
    InvalidTag(u8),
    #[error("encoded length {0} does not fit in memory")]
    LengthOverflow(u64),
    #[error("encoded table holds the empty sentinel as a key")]
    SentinelKey,
    #[error("encoded table repeats a key")]
    DuplicateKey,
}
