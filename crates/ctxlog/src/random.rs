//! Random bytes and URL-safe identifiers.

use std::io;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::error::{RandError, RandResult};

/// A source of cryptographically secure bytes.
pub trait EntropySource {
    /// Fill `buf`, returning how many bytes were written.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        getrandom::fill(buf)?;
        Ok(buf.len())
    }
}

/// `len` random bytes from the operating system.
pub fn rand_bytes(len: usize) -> RandResult<Vec<u8>> {
    rand_bytes_from(&mut OsEntropy, len)
}

/// `len` random bytes from `source`.
///
/// A `len` that cannot be allocated is reported as
/// [`RandError::Allocation`] instead of aborting.
pub fn rand_bytes_from<S: EntropySource + ?Sized>(source: &mut S, len: usize) -> RandResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| RandError::Allocation { len, source: e })?;
    buf.resize(len, 0u8);
    let got = source.fill(&mut buf)?;
    if got != len {
        return Err(RandError::ShortRead { got, want: len });
    }
    Ok(buf)
}

/// `num_triads * 3` random bytes, URL-safe base64 encoded.
///
/// Each triad encodes to exactly four characters. Returns an empty string if
/// the bytes cannot be generated; the failure is logged.
pub fn rand_string_b64(num_triads: usize) -> String {
    rand_string_b64_or_empty(&mut OsEntropy, num_triads)
}

/// [`rand_string_b64`] drawing from `source`.
pub(crate) fn rand_string_b64_or_empty<S: EntropySource + ?Sized>(
    source: &mut S,
    num_triads: usize,
) -> String {
    match rand_string_b64_from(source, num_triads) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, num_triads, "Failed to generate random identifier");
            String::new()
        }
    }
}

/// Fallible form of [`rand_string_b64`] drawing from `source`.
pub fn rand_string_b64_from<S: EntropySource + ?Sized>(
    source: &mut S,
    num_triads: usize,
) -> RandResult<String> {
    let len = num_triads
        .checked_mul(3)
        .ok_or(RandError::TooLong { triads: num_triads })?;
    let buf = rand_bytes_from(source, len)?;
    Ok(URL_SAFE.encode(buf))
}
