//! **gcmkit** - AES-GCM authenticated encryption built from its NIST SP 800-38D parts.
//!
//! # Components
//! | Module | Role |
//! |--------|------|
//! | [`cipher`] | Block cipher seam and the bundled AES-128/192/256 |
//! | [`ghash`]  | GHASH - universal hash authenticator over GF(2^128) |
//! | [`gctr`]   | GCTR - counter-mode keystream over any block cipher |
//! | [`gcm`]    | GaloisCounterMode - the AEAD combining the two, plus `seal`/`open` |
//! | [`block`]  | 16-byte block helpers (counter increment, keystream XOR) |
//! | [`error`]  | Crate-wide error and result types |

pub mod block;
pub mod cipher;
pub mod error;
pub mod gcm;
pub mod gctr;
pub mod ghash;

pub use error::{Error, Result};
