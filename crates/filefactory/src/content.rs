//! Deterministic contents for regular files

use crate::error::{Error, Result};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate `size` pseudo-random bytes from `seed`
///
/// Same inputs always give the same bytes, on every platform and with every
/// build, so a regular file's contents can be verified without keeping a
/// reference copy. The seed's little-endian bytes key a ChaCha8 stream.
pub fn pseudo_random_bytes(size: u64, seed: u64) -> Result<Vec<u8>> {
    let len = usize::try_from(size).map_err(|_| Error::SizeTooLarge(size))?;
    let mut key = [0u8; 32];
    key[..8].copy_from_slice(&seed.to_le_bytes());

    let mut rng = ChaCha8Rng::from_seed(key);
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    Ok(bytes)
}
