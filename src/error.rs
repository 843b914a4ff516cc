//! Library-wide error and result types.

use std::fmt;

/// Result alias used throughout gcmkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Error messages are kept intentionally terse; callers that need richer
/// context should wrap `Error` in their own type. None of the messages
/// ever contain key, nonce, or payload bytes.
#[derive(Debug)]
pub enum Error {
    /// The cipher key length is unsupported (payload is the length seen).
    InvalidKey(usize),
    /// The GHASH subkey was not exactly 16 bytes.
    InvalidSubkey,
    /// A construction-time argument was unusable (message names the
    /// expectation).
    InvalidParameter(&'static str),
    /// A streaming update was given a length that is not a multiple of the
    /// 16-byte block size.
    UnalignedLength(usize),
    /// An output buffer cannot hold the bytes the call would produce.
    ShortBuffer {
        /// Bytes the call needed to write.
        needed: usize,
        /// Bytes the caller's buffer could hold.
        provided: usize,
    },
    /// A call arrived in the wrong order or mode for this cipher state
    /// (message describes which rule was broken).
    State(&'static str),
    /// Authentication failed: the tag was missing or did not verify.
    ///
    /// When decryption fails with this error, no plaintext has been
    /// released to the caller.
    BadTag(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKey(n) => write!(f, "invalid key length: {n} bytes"),
            Error::InvalidSubkey => write!(f, "hash subkey must be 16 bytes"),
            Error::InvalidParameter(s) => write!(f, "invalid parameter: {s}"),
            Error::UnalignedLength(n) => {
                write!(f, "length {n} is not a multiple of the block size")
            }
            Error::ShortBuffer { needed, provided } => {
                write!(f, "output too small: need {needed} bytes, have {provided}")
            }
            Error::State(s) => write!(f, "illegal state: {s}"),
            Error::BadTag(s) => write!(f, "authentication failed: {s}"),
        }
    }
}

impl std::error::Error for Error {}
