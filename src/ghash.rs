//! GHASH - the GF(2^128) universal hash that authenticates GCM data.
//!
//! GHASH folds 16-byte blocks into a 128-bit accumulator:
//!
//! ```text
//! state := (state XOR block) * H
//! ```
//!
//! where `H` is the hash subkey (the encryption of the all-zero block under
//! the session key) and `*` is multiplication in GF(2^128) modulo
//! x^128 + x^7 + x^2 + x + 1, with GCM's reflected bit order.
//!
//! The multiply here is the portable bitwise Russian-peasant form. Each of
//! the 128 steps performs the same arithmetic regardless of the key and
//! data bits: conditional contributions are selected with all-ones/all-zero
//! masks rather than branches, so the data-dependent timing of a naive
//! `if bit == 1` formulation is avoided. Carry-less-multiply hardware
//! (PCLMULQDQ and friends) would be faster but is out of scope.
//!
//! <https://en.wikipedia.org/wiki/Galois/Counter_Mode#Mathematical_basis>

use crate::block::{BLOCK_SIZE, block_to_words, words_to_block};
use crate::{Error, Result};

/// The GCM reduction constant: the field polynomial's low terms
/// (x^7 + x^2 + x + 1) in reflected order, sitting in the top byte of the
/// high word. XORed in whenever a right shift drops a set bit off the low
/// end (NIST SP 800-38D calls this value R).
const R: u64 = 0xE100_0000_0000_0000;

/// Multiply `x` by `y` in GF(2^128).
///
/// `x` drives the loop 1 bit at a time, most significant first; `y` is the
/// working copy that halves (shift right with reduction) each step. Exactly
/// 128 conditional accumulations happen, 64 driven by the high word of `x`
/// and 64 by the low word, all via arithmetic masks.
fn gf128_mul(x: (u64, u64), y: (u64, u64)) -> (u64, u64) {
    let mut z = (0u64, 0u64);
    let mut v = y;
    for word in [x.0, x.1] {
        for i in 0..64 {
            // mask = all ones when the driving bit is set, else all zeros
            let mask = ((word >> (63 - i)) & 1).wrapping_neg();
            z.0 ^= v.0 & mask;
            z.1 ^= v.1 & mask;
            // v = v * x^-1: shift the 128-bit value right one bit, folding
            // the dropped bit back in as the reduction constant
            let dropped = (v.1 & 1).wrapping_neg();
            v.1 = (v.1 >> 1) | (v.0 << 63);
            v.0 = (v.0 >> 1) ^ (dropped & R);
        }
    }
    z
}

/// The GHASH accumulator, keyed by the 16-byte subkey H.
///
/// Owns only the running 128-bit state plus the immutable subkey; all
/// block framing (padding partial blocks, the trailing length block) is
/// the caller's responsibility, which is why [`update`](Self::update)
/// insists on whole blocks.
pub struct Ghash {
    /// H split into big-endian halves; never changes after construction.
    subkey: (u64, u64),
    /// Running hash state.
    state: (u64, u64),
    /// Snapshot taken by [`save`](Self::save), if any.
    saved: Option<(u64, u64)>,
}

impl Ghash {
    /// Key the hash with subkey `H`.
    ///
    /// Returns [`Error::InvalidSubkey`] unless `subkey_h` is exactly
    /// 16 bytes.
    pub fn new(subkey_h: &[u8]) -> Result<Self> {
        if subkey_h.len() != BLOCK_SIZE {
            return Err(Error::InvalidSubkey);
        }
        let mut h = [0u8; BLOCK_SIZE];
        h.copy_from_slice(subkey_h);
        Ok(Self {
            subkey: block_to_words(&h),
            state: (0, 0),
            saved: None,
        })
    }

    /// Absorb `data`, which must be a whole number of 16-byte blocks.
    ///
    /// Returns [`Error::UnalignedLength`] otherwise. Zero-padding partial
    /// blocks is deliberately left to the caller: the padded and unpadded
    /// byte counts differ, and only the caller knows which one belongs in
    /// the final length block.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        if data.len() % BLOCK_SIZE != 0 {
            return Err(Error::UnalignedLength(data.len()));
        }
        for chunk in data.chunks_exact(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            let (hi, lo) = block_to_words(&block);
            self.state = gf128_mul((self.state.0 ^ hi, self.state.1 ^ lo), self.subkey);
        }
        Ok(())
    }

    /// Produce the 16-byte hash of everything absorbed so far and **clear
    /// the accumulator to zero**.
    ///
    /// This is a consuming read, not a peek: a second `digest` without an
    /// intervening [`update`](Self::update) returns the hash of the empty
    /// state (all zeros). There is no non-destructive way to read the
    /// state; callers that need to come back to this point must
    /// [`save`](Self::save) first.
    pub fn digest(&mut self) -> [u8; BLOCK_SIZE] {
        let out = words_to_block(self.state.0, self.state.1);
        self.reset();
        out
    }

    /// Zero the accumulator. The subkey is unaffected.
    pub fn reset(&mut self) {
        self.state = (0, 0);
    }

    /// Snapshot the 128-bit state.
    pub fn save(&mut self) {
        self.saved = Some(self.state);
    }

    /// Roll the state back to the last [`save`](Self::save). Without a
    /// prior save this does nothing. The snapshot is kept, so a restore
    /// can be repeated.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved {
            self.state = state;
        }
    }
}

#[cfg(feature = "zeroize")]
impl Drop for Ghash {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.subkey.zeroize();
        self.state.zeroize();
        self.saved.zeroize();
    }
}
