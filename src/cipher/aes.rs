//! Pure-Rust AES block encryption (AES-128/192/256, encrypt-only).
//!
//! Only the forward cipher is implemented: GCM turns the block cipher into
//! a stream cipher by encrypting counter blocks, so the inverse cipher is
//! never needed - not even for decryption.
//!
//! ## Implementation note
//!
//! To keep the dependency footprint at zero, AES is implemented with the
//! classic byte-oriented approach: an S-box lookup table plus GF(2^8)
//! arithmetic for MixColumns. Table lookups indexed by secret data are not
//! constant-time on ordinary hardware (cache timing), so prefer a
//! hardware-backed implementation of [`BlockCipher`] where an adversary can
//! take fine-grained timing measurements. For tests, tooling, and offline
//! processing this implementation is correct and sufficient.
//!
//! <https://en.wikipedia.org/wiki/Advanced_Encryption_Standard>

use crate::block::BLOCK_SIZE;
use crate::cipher::BlockCipher;
use crate::{Error, Result};

// The AES S-box: the multiplicative inverse of each byte in GF(2^8) (with 0
// mapped to 0) followed by a fixed affine transform over GF(2). The inverse
// supplies non-linearity; the affine step destroys the remaining field
// structure so the cipher cannot be written as a low-degree function.
// Values are fixed by FIPS-197 §5.1.1.
// https://en.wikipedia.org/wiki/Rijndael_S-box
const SBOX: [u8; 256] = [
    0x63, 0x7C, 0x77, 0x7B, 0xF2, 0x6B, 0x6F, 0xC5, 0x30, 0x01, 0x67, 0x2B, 0xFE, 0xD7, 0xAB, 0x76,
    0xCA, 0x82, 0xC9, 0x7D, 0xFA, 0x59, 0x47, 0xF0, 0xAD, 0xD4, 0xA2, 0xAF, 0x9C, 0xA4, 0x72, 0xC0,
    0xB7, 0xFD, 0x93, 0x26, 0x36, 0x3F, 0xF7, 0xCC, 0x34, 0xA5, 0xE5, 0xF1, 0x71, 0xD8, 0x31, 0x15,
    0x04, 0xC7, 0x23, 0xC3, 0x18, 0x96, 0x05, 0x9A, 0x07, 0x12, 0x80, 0xE2, 0xEB, 0x27, 0xB2, 0x75,
    0x09, 0x83, 0x2C, 0x1A, 0x1B, 0x6E, 0x5A, 0xA0, 0x52, 0x3B, 0xD6, 0xB3, 0x29, 0xE3, 0x2F, 0x84,
    0x53, 0xD1, 0x00, 0xED, 0x20, 0xFC, 0xB1, 0x5B, 0x6A, 0xCB, 0xBE, 0x39, 0x4A, 0x4C, 0x58, 0xCF,
    0xD0, 0xEF, 0xAA, 0xFB, 0x43, 0x4D, 0x33, 0x85, 0x45, 0xF9, 0x02, 0x7F, 0x50, 0x3C, 0x9F, 0xA8,
    0x51, 0xA3, 0x40, 0x8F, 0x92, 0x9D, 0x38, 0xF5, 0xBC, 0xB6, 0xDA, 0x21, 0x10, 0xFF, 0xF3, 0xD2,
    0xCD, 0x0C, 0x13, 0xEC, 0x5F, 0x97, 0x44, 0x17, 0xC4, 0xA7, 0x7E, 0x3D, 0x64, 0x5D, 0x19, 0x73,
    0x60, 0x81, 0x4F, 0xDC, 0x22, 0x2A, 0x90, 0x88, 0x46, 0xEE, 0xB8, 0x14, 0xDE, 0x5E, 0x0B, 0xDB,
    0xE0, 0x32, 0x3A, 0x0A, 0x49, 0x06, 0x24, 0x5C, 0xC2, 0xD3, 0xAC, 0x62, 0x91, 0x95, 0xE4, 0x79,
    0xE7, 0xC8, 0x37, 0x6D, 0x8D, 0xD5, 0x4E, 0xA9, 0x6C, 0x56, 0xF4, 0xEA, 0x65, 0x7A, 0xAE, 0x08,
    0xBA, 0x78, 0x25, 0x2E, 0x1C, 0xA6, 0xB4, 0xC6, 0xE8, 0xDD, 0x74, 0x1F, 0x4B, 0xBD, 0x8B, 0x8A,
    0x70, 0x3E, 0xB5, 0x66, 0x48, 0x03, 0xF6, 0x0E, 0x61, 0x35, 0x57, 0xB9, 0x86, 0xC1, 0x1D, 0x9E,
    0xE1, 0xF8, 0x98, 0x11, 0x69, 0xD9, 0x8E, 0x94, 0x9B, 0x1E, 0x87, 0xE9, 0xCE, 0x55, 0x28, 0xDF,
    0x8C, 0xA1, 0x89, 0x0D, 0xBF, 0xE6, 0x42, 0x68, 0x41, 0x99, 0x2D, 0x0F, 0xB0, 0x54, 0xBB, 0x16,
];

// Round constants for the key schedule: successive powers of x in GF(2^8).
// They break the symmetry between rounds; AES-128 consumes all ten,
// AES-192 eight, AES-256 seven.
const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1B, 0x36];

// Largest key schedule any variant needs: 15 round keys of 16 bytes each
// (AES-256, 14 rounds plus the whitening key).
const MAX_SCHEDULE: usize = 240;

// Multiply two bytes in GF(2^8) modulo the Rijndael polynomial
// x^8 + x^4 + x^3 + x + 1 (0x11B). Addition in this field is XOR;
// multiplication is shift-and-conditionally-reduce, one bit of `b` at a
// time. Used by MixColumns to form linear combinations of column bytes.
// https://en.wikipedia.org/wiki/Finite_field_arithmetic
#[inline]
fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut p = 0u8;
    for _ in 0..8 {
        if b & 1 != 0 {
            p ^= a;
        }
        let overflow = a & 0x80 != 0;
        a <<= 1;
        if overflow {
            a ^= 0x1B; // reduce: 0x1B is 0x11B with the x^8 term dropped
        }
        b >>= 1;
    }
    p
}

// The AES state is a 4x4 byte matrix stored column-major: bytes 0..4 are
// column 0 and so on. Row and column conventions below follow FIPS-197;
// getting them wrong produces a cipher that is internally consistent but
// interoperates with nothing.
type State = [u8; BLOCK_SIZE];

// SubBytes: run every state byte through the S-box. The cipher's only
// non-linear step.
fn sub_bytes(s: &mut State) {
    for b in s.iter_mut() {
        *b = SBOX[*b as usize];
    }
}

// ShiftRows: rotate row r of the matrix left by r positions. In
// column-major storage row r occupies indices {r, r+4, r+8, r+12}. This
// moves bytes between columns so that MixColumns diffuses across the whole
// state rather than within each column forever.
fn shift_rows(s: &mut State) {
    // row 1: left by 1
    let t = s[1];
    s[1] = s[5];
    s[5] = s[9];
    s[9] = s[13];
    s[13] = t;
    // row 2: left by 2, which is just two swaps
    s.swap(2, 10);
    s.swap(6, 14);
    // row 3: left by 3 = right by 1
    let t = s[15];
    s[15] = s[11];
    s[11] = s[7];
    s[7] = s[3];
    s[3] = t;
}

// MixColumns: multiply each column, viewed as a polynomial over GF(2^8),
// by the fixed polynomial {03}x^3 + {01}x^2 + {01}x + {02} mod x^4 + 1 -
// equivalently, by an MDS matrix whose rows are rotations of [2, 3, 1, 1].
// One flipped input byte reaches all four output bytes of its column, and
// combined with ShiftRows the full state after two rounds.
// https://en.wikipedia.org/wiki/Rijndael_MixColumns
fn mix_columns(s: &mut State) {
    for col in 0..4 {
        let i = col * 4;
        let (a0, a1, a2, a3) = (s[i], s[i + 1], s[i + 2], s[i + 3]);
        s[i] = gmul(0x02, a0) ^ gmul(0x03, a1) ^ a2 ^ a3;
        s[i + 1] = a0 ^ gmul(0x02, a1) ^ gmul(0x03, a2) ^ a3;
        s[i + 2] = a0 ^ a1 ^ gmul(0x02, a2) ^ gmul(0x03, a3);
        s[i + 3] = gmul(0x03, a0) ^ a1 ^ a2 ^ gmul(0x02, a3);
    }
}

// AddRoundKey: XOR one 16-byte round key into the state. The only step
// that touches key material.
fn add_round_key(s: &mut State, round_key: &[u8]) {
    for (b, k) in s.iter_mut().zip(round_key) {
        *b ^= k;
    }
}

/// A keyed AES instance holding the expanded round keys.
///
/// Construct with [`Aes::new`] from a 16-, 24-, or 32-byte key; the
/// variant (AES-128/192/256) follows from the key length. The value
/// implements [`BlockCipher`] and can be handed to
/// [`GaloisCounterMode`](crate::gcm::GaloisCounterMode) or either of the
/// one-shot helpers in [`crate::gcm`].
#[derive(Clone)]
pub struct Aes {
    /// Expanded key schedule; only the first `16 * (rounds + 1)` bytes are
    /// meaningful.
    round_keys: [u8; MAX_SCHEDULE],
    /// 10, 12, or 14.
    rounds: usize,
}

impl Aes {
    /// Expand `key` into a full AES key schedule.
    ///
    /// Returns [`Error::InvalidKey`] unless the key is 16, 24, or 32 bytes.
    ///
    /// The schedule derives each 4-byte word from the word `nk` positions
    /// back XORed with the previous word, where every `nk`-th word first
    /// passes through RotWord, SubWord, and a round-constant XOR. AES-256
    /// additionally applies SubWord (alone) halfway through each stretch of
    /// eight words - the `i % nk == 4` arm below.
    /// <https://en.wikipedia.org/wiki/AES_key_schedule>
    pub fn new(key: &[u8]) -> Result<Self> {
        // nk = key length in 32-bit words; the round count follows from it.
        let nk = match key.len() {
            16 => 4,
            24 => 6,
            32 => 8,
            n => return Err(Error::InvalidKey(n)),
        };
        let rounds = nk + 6;

        let mut w = [0u8; MAX_SCHEDULE];
        w[..key.len()].copy_from_slice(key); // words 0..nk are the key itself

        for i in nk..4 * (rounds + 1) {
            let mut t = [
                w[(i - 1) * 4],
                w[(i - 1) * 4 + 1],
                w[(i - 1) * 4 + 2],
                w[(i - 1) * 4 + 3],
            ];
            if i % nk == 0 {
                // RotWord then SubWord then the round constant on byte 0.
                t = [t[1], t[2], t[3], t[0]];
                t = t.map(|b| SBOX[b as usize]);
                t[0] ^= RCON[i / nk - 1];
            } else if nk > 6 && i % nk == 4 {
                // AES-256 only: an extra SubWord without rotation.
                t = t.map(|b| SBOX[b as usize]);
            }
            for j in 0..4 {
                w[i * 4 + j] = w[(i - nk) * 4 + j] ^ t[j];
            }
        }

        Ok(Self {
            round_keys: w,
            rounds,
        })
    }
}

impl BlockCipher for Aes {
    // The round structure is the same for every variant: whitening key,
    // then rounds - 1 full rounds, then a final round that skips
    // MixColumns (FIPS-197 §5.1).
    fn encrypt_block(&self, block: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        let mut s = *block;
        add_round_key(&mut s, &self.round_keys[..16]);
        for round in 1..self.rounds {
            sub_bytes(&mut s);
            shift_rows(&mut s);
            mix_columns(&mut s);
            add_round_key(&mut s, &self.round_keys[round * 16..(round + 1) * 16]);
        }
        sub_bytes(&mut s);
        shift_rows(&mut s);
        add_round_key(
            &mut s,
            &self.round_keys[self.rounds * 16..(self.rounds + 1) * 16],
        );
        s
    }
}

#[cfg(feature = "zeroize")]
impl Drop for Aes {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.round_keys.zeroize();
    }
}
