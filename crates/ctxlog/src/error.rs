use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors produced while drawing random bytes.
#[derive(Debug, Error)]
pub enum RandError {
    #[error("entropy source failed: {0}")]
    Entropy(#[from] io::Error),

    #[error("entropy source returned too few bytes, {got} < {want}")]
    ShortRead { got: usize, want: usize },

    #[error("{triads} triads is too long to generate")]
    TooLong { triads: usize },

    #[error("cannot allocate {len} random bytes")]
    Allocation { len: usize, source: TryReserveError },
}

pub type RandResult<T> = Result<T, RandError>;
