//! Block-level primitives shared by the keystream and hash components.
//!
//! Everything in GCM moves in 16-byte units: the cipher block, the hash
//! block, and the counter block are all the same width. The helpers here
//! are deliberately tiny so each component stays readable.

/// Width in bytes of one cipher/hash/counter block.
pub const BLOCK_SIZE: usize = 16;

/// A single 16-byte block.
pub(crate) type Block = [u8; BLOCK_SIZE];

/// Increment the trailing 32-bit field of a counter block, wrapping modulo
/// 2^32. Carries are confined to the last 4 bytes; the leading 12 bytes
/// (the IV-derived prefix) never change.
#[inline]
pub(crate) fn inc32(block: &mut Block) {
    let ctr = u32::from_be_bytes([block[12], block[13], block[14], block[15]]);
    block[12..].copy_from_slice(&ctr.wrapping_add(1).to_be_bytes());
}

/// Split a block into big-endian `u64` halves (high, low).
#[inline]
pub(crate) fn block_to_words(block: &Block) -> (u64, u64) {
    let v = u128::from_be_bytes(*block);
    ((v >> 64) as u64, v as u64)
}

/// Reassemble big-endian `u64` halves into a block.
#[inline]
pub(crate) fn words_to_block(hi: u64, lo: u64) -> Block {
    (((hi as u128) << 64) | lo as u128).to_be_bytes()
}

/// XOR `input` with `keystream` into `output`, pairwise; stops at the
/// shortest of the three slices.
#[inline]
pub(crate) fn xor_into(output: &mut [u8], input: &[u8], keystream: &[u8]) {
    for ((out, a), b) in output.iter_mut().zip(input).zip(keystream) {
        *out = a ^ b;
    }
}
