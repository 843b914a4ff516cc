//! GaloisCounterMode - the AEAD orchestrator combining GCTR and GHASH.
//!
//! GCM (NIST SP 800-38D) encrypts with a CTR keystream and authenticates
//! the ciphertext plus any associated data with GHASH:
//!
//! ```text
//!                  IV
//!                   │
//!              derive J0 ────────────────┐
//!                   │                    │
//!               inc32(J0)             E_K(J0)
//!                   │                    │
//! plaintext ──►  GCTR  ──► ciphertext    │
//!                               │        │
//!       AAD ───────────────► GHASH       │
//!                               │        │
//!                         length block   │
//!                               │        │
//!                            digest ──► XOR ──► tag
//! ```
//!
//! The wire format produced is `ciphertext || tag`; the tag defaults to
//! 16 bytes ([`TAG_SIZE`]) and may be shortened to 12 at construction.
//! A 12-byte IV is used directly as the counter prefix (the recommended
//! fast path); every other IV length is folded through GHASH first.
//!
//! ## Decryption buffers everything
//!
//! The decrypt path holds all input internally and releases plaintext only
//! after the tag has verified: handing out unverified plaintext, even
//! "temporarily", turns a decryption API into a forgery oracle. So
//! [`decrypt`](GaloisCounterMode::decrypt) only accumulates, and
//! [`decrypt_final`](GaloisCounterMode::decrypt_final) writes the whole
//! message at once - after comparing the full tag width in constant time.
//! This is a contract of the type, not an optimization opportunity.
//!
//! Associated data must be supplied before any payload; the first payload
//! operation seals the AAD into the hash and further
//! [`update_aad`](GaloisCounterMode::update_aad) calls fail.

use std::mem;

use subtle::ConstantTimeEq;

use crate::block::{BLOCK_SIZE, Block, inc32};
use crate::cipher::BlockCipher;
use crate::gctr::Gctr;
use crate::ghash::Ghash;
use crate::{Error, Result};

/// Default authentication tag length in bytes (one full block).
pub const TAG_SIZE: usize = 16;

/// Authenticated encryption with associated data over any [`BlockCipher`].
///
/// One value represents one in-flight encryption *or* decryption operation
/// under a fixed key, IV, and tag length; [`reset`](Self::reset) re-arms it
/// for another run with the same parameters. All state lives behind
/// `&mut self` - sharing a value across threads requires external locking,
/// and nothing here performs I/O or blocks.
pub struct GaloisCounterMode<C> {
    /// The keyed cipher; also cloned into the fresh J0 keystream that
    /// encrypts the final digest into the tag.
    cipher: C,
    /// Pre-counter block, reserved for the tag derivation. Payload
    /// keystream begins at `inc32(j0)`.
    j0: Block,
    tag_len: usize,
    /// Payload keystream generator.
    gctr: Gctr<C>,
    /// Authenticator over AAD, ciphertext, and the trailing length block.
    ghash: Ghash,
    /// Associated data collected so far; `None` once sealed into the hash.
    aad_buf: Option<Vec<u8>>,
    /// Byte length of the sealed AAD, for the length block.
    size_of_aad: u64,
    /// Payload bytes processed so far, for the length block.
    processed: u64,
    /// Decrypting mode only: all ciphertext seen so far, held back until
    /// the tag verifies. `None` in encrypting mode.
    ibuffer: Option<Vec<u8>>,
    saved: Option<Snapshot>,
}

/// Deep copy of the rollback-friendly parts of the mode state. The GCTR
/// counter and GHASH accumulator snapshot themselves.
#[derive(Clone)]
struct Snapshot {
    aad_buf: Option<Vec<u8>>,
    size_of_aad: u64,
    processed: u64,
    ibuffer: Option<Vec<u8>>,
}

impl<C: BlockCipher + Clone> GaloisCounterMode<C> {
    /// Set up an operation with the default 16-byte tag.
    ///
    /// `decrypting` selects which half of the API is live: the encrypt
    /// methods or the decrypt methods. `cipher` must already be keyed.
    pub fn new(cipher: C, decrypting: bool, iv: &[u8]) -> Result<Self> {
        Self::with_tag_len(cipher, decrypting, iv, TAG_SIZE)
    }

    /// Set up an operation with an explicit tag length of 12 to 16 bytes.
    ///
    /// Derives the hash subkey `H = E_K(0^128)`, the pre-counter block J0
    /// from the IV, and seeds the payload keystream at `inc32(J0)`.
    /// Returns [`Error::InvalidParameter`] for an empty IV or a tag length
    /// outside `12..=16`.
    pub fn with_tag_len(cipher: C, decrypting: bool, iv: &[u8], tag_len: usize) -> Result<Self> {
        if iv.is_empty() {
            return Err(Error::InvalidParameter("IV must not be empty"));
        }
        if !(12..=16).contains(&tag_len) {
            return Err(Error::InvalidParameter("tag length must be 12 to 16 bytes"));
        }

        let subkey = cipher.encrypt_block(&[0u8; BLOCK_SIZE]);
        let mut ghash = Ghash::new(&subkey)?;
        let j0 = derive_j0(iv, &mut ghash)?;
        let mut icb = j0;
        inc32(&mut icb);
        let gctr = Gctr::new(cipher.clone(), &icb)?;

        Ok(Self {
            cipher,
            j0,
            tag_len,
            gctr,
            ghash,
            aad_buf: Some(Vec::new()),
            size_of_aad: 0,
            processed: 0,
            ibuffer: decrypting.then(Vec::new),
            saved: None,
        })
    }

    /// Append associated data. May be called any number of times, but only
    /// before the first payload operation; afterwards the AAD is sealed
    /// into the hash and this fails with [`Error::State`].
    pub fn update_aad(&mut self, aad: &[u8]) -> Result<()> {
        let Some(buf) = self.aad_buf.as_mut() else {
            return Err(Error::State("associated data must precede payload"));
        };
        buf.extend_from_slice(aad);
        Ok(())
    }

    /// Seal the collected AAD into the hash. Idempotent; called by every
    /// payload operation.
    fn process_aad(&mut self) -> Result<()> {
        let Some(aad) = self.aad_buf.take() else {
            return Ok(());
        };
        self.size_of_aad = aad.len() as u64;
        hash_padded(&mut self.ghash, &aad)
    }

    /// Encrypt a whole number of blocks of `input` into `output` and fold
    /// the resulting *ciphertext* into the authenticator.
    ///
    /// Returns the bytes written. Partial trailing data belongs in
    /// [`encrypt_final`](Self::encrypt_final); a length that is not a
    /// multiple of 16 fails with [`Error::UnalignedLength`].
    pub fn encrypt(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if self.ibuffer.is_some() {
            return Err(Error::State("cipher is initialized for decryption"));
        }
        self.process_aad()?;
        let written = self.gctr.update(input, output)?;
        self.ghash.update(&output[..written])?;
        self.processed += written as u64;
        Ok(written)
    }

    /// Encrypt any remaining `input` (including a final partial block),
    /// then append the authentication tag.
    ///
    /// Writes `input.len() + tag_len()` bytes into `output` and returns
    /// that count; fails with [`Error::ShortBuffer`] up front if `output`
    /// cannot hold them. The tag is the final GHASH digest (over AAD,
    /// ciphertext, and the bit-length block) encrypted with a fresh
    /// keystream seeded at J0 rather than the payload counter.
    pub fn encrypt_final(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if self.ibuffer.is_some() {
            return Err(Error::State("cipher is initialized for decryption"));
        }
        let total = input.len() + self.tag_len;
        if output.len() < total {
            return Err(Error::ShortBuffer {
                needed: total,
                provided: output.len(),
            });
        }
        self.process_aad()?;

        if !input.is_empty() {
            let written = self.gctr.do_final(input, &mut output[..input.len()])?;
            hash_padded(&mut self.ghash, &output[..written])?;
            self.processed += written as u64;
        }

        let tag = self.compute_tag()?;
        output[input.len()..total].copy_from_slice(&tag[..self.tag_len]);
        Ok(total)
    }

    /// Buffer `input` for decryption.
    ///
    /// No plaintext is produced before [`decrypt_final`](Self::decrypt_final)
    /// has verified the tag, so this always returns `Ok(0)`; the return
    /// type keeps the bytes-produced contract symmetric with
    /// [`encrypt`](Self::encrypt).
    pub fn decrypt(&mut self, input: &[u8]) -> Result<usize> {
        if self.ibuffer.is_none() {
            return Err(Error::State("cipher is initialized for encryption"));
        }
        self.process_aad()?;
        if let Some(buf) = self.ibuffer.as_mut() {
            buf.extend_from_slice(input);
        }
        Ok(0)
    }

    /// Verify the buffered message and, on success, decrypt it into
    /// `output`.
    ///
    /// The trailing `tag_len()` bytes of the buffered input are the
    /// received tag; everything before them is ciphertext. The expected
    /// tag is recomputed and compared over its full width in constant
    /// time. On [`Error::BadTag`] - missing or mismatched tag - nothing
    /// has been written to `output`; the buffered input is consumed either
    /// way. Returns the plaintext length.
    pub fn decrypt_final(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let (data, ct_len) = {
            let Some(buf) = self.ibuffer.as_mut() else {
                return Err(Error::State("cipher is initialized for encryption"));
            };
            buf.extend_from_slice(input);
            if buf.len() < self.tag_len {
                return Err(Error::BadTag("input too short to hold a tag"));
            }
            let ct_len = buf.len() - self.tag_len;
            if output.len() < ct_len {
                return Err(Error::ShortBuffer {
                    needed: ct_len,
                    provided: output.len(),
                });
            }
            (mem::take(buf), ct_len)
        };
        self.process_aad()?;

        let (ciphertext, received) = data.split_at(ct_len);
        hash_padded(&mut self.ghash, ciphertext)?;
        self.processed += ct_len as u64;
        let expected = self.compute_tag()?;

        if expected[..self.tag_len].ct_eq(received).unwrap_u8() != 1 {
            return Err(Error::BadTag("tag mismatch"));
        }

        // the tag verified; only now does plaintext reach caller memory
        self.gctr.do_final(ciphertext, output)?;
        Ok(ct_len)
    }

    /// Hash the length block, take the digest, and encrypt it under a
    /// fresh J0-seeded keystream. Shared by both finalization paths.
    fn compute_tag(&mut self) -> Result<Block> {
        self.ghash
            .update(&length_block(self.size_of_aad, self.processed))?;
        let digest = self.ghash.digest();
        let mut tag = [0u8; BLOCK_SIZE];
        let mut tag_gctr = Gctr::new(self.cipher.clone(), &self.j0)?;
        tag_gctr.do_final(&digest, &mut tag)?;
        Ok(tag)
    }

    /// Return the object to its just-constructed state - same key, IV, and
    /// tag length - ready for a fresh operation: empty AAD buffer, zeroed
    /// counters, reset keystream and hash, emptied input buffer.
    pub fn reset(&mut self) {
        self.aad_buf = Some(Vec::new());
        self.size_of_aad = 0;
        self.processed = 0;
        self.gctr.reset();
        self.ghash.reset();
        if let Some(buf) = self.ibuffer.as_mut() {
            buf.clear();
        }
    }

    /// Checkpoint the whole operation state: AAD buffer, processed
    /// lengths, counter, hash accumulator, and buffered input.
    pub fn save(&mut self) {
        self.gctr.save();
        self.ghash.save();
        self.saved = Some(Snapshot {
            aad_buf: self.aad_buf.clone(),
            size_of_aad: self.size_of_aad,
            processed: self.processed,
            ibuffer: self.ibuffer.clone(),
        });
    }

    /// Roll back to the last [`save`](Self::save), so a failed or
    /// abandoned finalization can be retried without re-deriving key
    /// material. Repeatable; does nothing if no snapshot was taken.
    pub fn restore(&mut self) {
        self.gctr.restore();
        self.ghash.restore();
        if let Some(snapshot) = &self.saved {
            self.aad_buf = snapshot.aad_buf.clone();
            self.size_of_aad = snapshot.size_of_aad;
            self.processed = snapshot.processed;
            self.ibuffer = snapshot.ibuffer.clone();
        }
    }

    /// The tag length in bytes fixed at construction.
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    /// Bytes currently buffered for decryption; always 0 when encrypting.
    pub fn buffered_len(&self) -> usize {
        self.ibuffer.as_ref().map_or(0, Vec::len)
    }
}

/// Compute the pre-counter block J0 from the IV.
///
/// A 12-byte IV fills the counter prefix directly, with the 32-bit counter
/// field starting at 1. Any other length is hashed: GHASH over the
/// zero-padded IV followed by a length block carrying the IV's bit length.
/// The digest call leaves the accumulator cleared for the AAD and payload
/// passes that follow.
fn derive_j0(iv: &[u8], ghash: &mut Ghash) -> Result<Block> {
    let mut j0 = [0u8; BLOCK_SIZE];
    if iv.len() == 12 {
        j0[..12].copy_from_slice(iv);
        j0[15] = 1;
    } else {
        hash_padded(ghash, iv)?;
        ghash.update(&length_block(0, iv.len() as u64))?;
        j0 = ghash.digest();
    }
    Ok(j0)
}

/// Feed `data` to the hash, zero-padding a trailing partial block. The
/// padding exists only inside the hash computation; it is never part of
/// any output.
fn hash_padded(ghash: &mut Ghash, data: &[u8]) -> Result<()> {
    let full = data.len() - data.len() % BLOCK_SIZE;
    ghash.update(&data[..full])?;
    if full < data.len() {
        let mut last = [0u8; BLOCK_SIZE];
        last[..data.len() - full].copy_from_slice(&data[full..]);
        ghash.update(&last)?;
    }
    Ok(())
}

/// The final GHASH block: AAD length and ciphertext length, in bits, as
/// two big-endian u64 halves.
fn length_block(aad_bytes: u64, text_bytes: u64) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block[..8].copy_from_slice(&(aad_bytes * 8).to_be_bytes());
    block[8..].copy_from_slice(&(text_bytes * 8).to_be_bytes());
    block
}

/// Encrypt `plaintext` in one call, authenticating `aad`, and return
/// `ciphertext || tag` with the default 16-byte tag.
pub fn seal<C: BlockCipher + Clone>(
    cipher: C,
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let mut gcm = GaloisCounterMode::new(cipher, false, iv)?;
    gcm.update_aad(aad)?;
    let mut out = vec![0u8; plaintext.len() + TAG_SIZE];
    let written = gcm.encrypt_final(plaintext, &mut out)?;
    out.truncate(written);
    Ok(out)
}

/// Verify and decrypt a `ciphertext || tag` message produced by [`seal`].
/// No plaintext is returned unless the tag verifies.
pub fn open<C: BlockCipher + Clone>(
    cipher: C,
    iv: &[u8],
    aad: &[u8],
    sealed: &[u8],
) -> Result<Vec<u8>> {
    let mut gcm = GaloisCounterMode::new(cipher, true, iv)?;
    gcm.update_aad(aad)?;
    let mut out = vec![0u8; sealed.len().saturating_sub(TAG_SIZE)];
    let written = gcm.decrypt_final(sealed, &mut out)?;
    out.truncate(written);
    Ok(out)
}
