//! Block-cipher seam between GCM and the underlying cipher.
//!
//! GCM needs exactly one capability from its cipher: encrypt a single
//! 16-byte block under an already-established key. [`BlockCipher`] captures
//! that capability, and everything above it is cipher-agnostic. Note that
//! GCM never calls the cipher's *decryption* direction: CTR-style modes
//! encrypt counter blocks on both the encrypt and decrypt paths.
//!
//! Key schedule setup and key-length validation live in the cipher
//! implementation, not in the mode; a [`BlockCipher`] value handed to the
//! mode is already keyed.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`aes`] | Built-in pure-Rust AES-128/192/256, encrypt-only |

pub mod aes;

use crate::block::BLOCK_SIZE;

/// A keyed block cipher that can encrypt one 16-byte block at a time.
///
/// Implementations are expected to be deterministic and side-effect free:
/// the mode may call [`encrypt_block`](Self::encrypt_block) any number of
/// times, in any order, including re-encrypting a block it has seen before.
pub trait BlockCipher {
    /// Encrypt `block` and return the ciphertext block.
    fn encrypt_block(&self, block: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE];
}
