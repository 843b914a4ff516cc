//! GCTR - the CTR-mode keystream half of GCM.
//!
//! A block cipher becomes a stream cipher by encrypting successive counter
//! blocks and XORing the result against the data; encryption and decryption
//! are the same operation. GCM's counter convention is narrower than
//! generic CTR: only the trailing 32 bits of the 16-byte counter block
//! increment (wrapping modulo 2^32), while the leading 12 bytes carry the
//! IV-derived prefix untouched for the whole operation.
//!
//! The counter state is private to this type. Streaming callers advance it
//! with [`update`](Gctr::update); [`do_final`](Gctr::do_final) handles a
//! trailing partial block and then puts the counter back at its initial
//! value so the generator can be reused.
//!
//! <https://en.wikipedia.org/wiki/Block_cipher_mode_of_operation#Counter_(CTR)>

use crate::block::{BLOCK_SIZE, Block, inc32, xor_into};
use crate::cipher::BlockCipher;
use crate::{Error, Result};

/// CTR keystream generator over any [`BlockCipher`].
pub struct Gctr<C> {
    cipher: C,
    /// The initial counter block; `reset`/`do_final` return to it.
    icb: Block,
    /// The live counter, advanced one block at a time.
    counter: Block,
    /// Snapshot taken by [`save`](Self::save), if any.
    saved: Option<Block>,
}

impl<C: BlockCipher> Gctr<C> {
    /// Seed a generator at `initial_counter_block`.
    ///
    /// Returns [`Error::InvalidParameter`] unless the block is exactly
    /// 16 bytes. The cipher must already be keyed.
    pub fn new(cipher: C, initial_counter_block: &[u8]) -> Result<Self> {
        let icb: Block = initial_counter_block
            .try_into()
            .map_err(|_| Error::InvalidParameter("initial counter block must be 16 bytes"))?;
        Ok(Self {
            cipher,
            icb,
            counter: icb,
            saved: None,
        })
    }

    /// XOR keystream over a whole number of blocks of `input` into
    /// `output`, advancing the counter one step per block.
    ///
    /// Returns the byte count written. Fails with
    /// [`Error::UnalignedLength`] for a partial block (use
    /// [`do_final`](Self::do_final) for the tail) and
    /// [`Error::ShortBuffer`] if `output` is shorter than `input`.
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if input.len() % BLOCK_SIZE != 0 {
            return Err(Error::UnalignedLength(input.len()));
        }
        if output.len() < input.len() {
            return Err(Error::ShortBuffer {
                needed: input.len(),
                provided: output.len(),
            });
        }
        for (chunk_in, chunk_out) in input
            .chunks_exact(BLOCK_SIZE)
            .zip(output.chunks_exact_mut(BLOCK_SIZE))
        {
            let keystream = self.cipher.encrypt_block(&self.counter);
            xor_into(chunk_out, chunk_in, &keystream);
            inc32(&mut self.counter);
        }
        Ok(input.len())
    }

    /// XOR keystream over `input` of any length - full blocks first, then
    /// one more counter encryption for the trailing partial block.
    ///
    /// The counter is restored to the initial block on exit, success or
    /// failure, so the generator can be reused immediately; only the bytes
    /// of keystream actually consumed are ever produced.
    pub fn do_final(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let result = self.xor_keystream(input, output);
        self.counter = self.icb;
        result
    }

    fn xor_keystream(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if output.len() < input.len() {
            return Err(Error::ShortBuffer {
                needed: input.len(),
                provided: output.len(),
            });
        }
        let full = input.len() - input.len() % BLOCK_SIZE;
        self.update(&input[..full], &mut output[..full])?;
        if full < input.len() {
            let keystream = self.cipher.encrypt_block(&self.counter);
            xor_into(&mut output[full..input.len()], &input[full..], &keystream);
        }
        Ok(input.len())
    }

    /// Put the counter back at the initial block and discard any saved
    /// snapshot.
    pub fn reset(&mut self) {
        self.counter = self.icb;
        self.saved = None;
    }

    /// Snapshot the current counter value.
    pub fn save(&mut self) {
        self.saved = Some(self.counter);
    }

    /// Roll the counter back to the last [`save`](Self::save). Without a
    /// prior save this does nothing; the snapshot survives the restore.
    pub fn restore(&mut self) {
        if let Some(counter) = self.saved {
            self.counter = counter;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::aes::Aes;
    use hex_literal::hex;

    fn zero_key() -> Aes {
        Aes::new(&[0u8; 16]).unwrap()
    }

    // J0 + 1 for a zero 12-byte IV: the counter block GCM uses for the
    // first payload block.
    const ICB: [u8; 16] = hex!("00000000000000000000000000000002");

    #[test]
    fn rejects_wrong_size_counter_blocks() {
        assert!(matches!(
            Gctr::new(zero_key(), &[0u8; 12]),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            Gctr::new(zero_key(), &[0u8; 17]),
            Err(Error::InvalidParameter(_))
        ));
    }

    // The single-block keystream from NIST SP 800-38D test case 2: a zero
    // plaintext block under the zero key comes out as the raw keystream.
    #[test]
    fn nist_keystream_block() {
        let mut gctr = Gctr::new(zero_key(), &ICB).unwrap();
        let mut out = [0u8; 16];
        let written = gctr.do_final(&[0u8; 16], &mut out).unwrap();
        assert_eq!(written, 16);
        assert_eq!(out, hex!("0388dace60b6a392f328c2b971b2fe78"));
    }

    #[test]
    fn update_requires_whole_blocks() {
        let mut gctr = Gctr::new(zero_key(), &ICB).unwrap();
        let mut out = [0u8; 24];
        match gctr.update(&[0u8; 24], &mut out) {
            Err(Error::UnalignedLength(n)) => assert_eq!(n, 24),
            other => panic!("expected UnalignedLength, got {other:?}"),
        }
    }

    #[test]
    fn short_output_is_rejected_before_any_work() {
        let mut gctr = Gctr::new(zero_key(), &ICB).unwrap();
        let mut out = [0u8; 8];
        assert!(matches!(
            gctr.update(&[0u8; 16], &mut out),
            Err(Error::ShortBuffer {
                needed: 16,
                provided: 8
            })
        ));
        assert!(matches!(
            gctr.do_final(&[0u8; 10], &mut out[..4]),
            Err(Error::ShortBuffer {
                needed: 10,
                provided: 4
            })
        ));
    }

    #[test]
    fn do_final_handles_partial_blocks() {
        // keystream for 32 zero bytes, via the aligned path
        let mut gctr = Gctr::new(zero_key(), &ICB).unwrap();
        let mut stream = [0u8; 32];
        gctr.update(&[0u8; 32], &mut stream).unwrap();

        // 20 zero bytes through do_final must equal the stream prefix
        let mut gctr = Gctr::new(zero_key(), &ICB).unwrap();
        let mut out = [0u8; 20];
        let written = gctr.do_final(&[0u8; 20], &mut out).unwrap();
        assert_eq!(written, 20);
        assert_eq!(out, stream[..20]);
    }

    #[test]
    fn do_final_returns_the_counter_to_its_initial_value() {
        let mut gctr = Gctr::new(zero_key(), &ICB).unwrap();
        let mut first = [0u8; 24];
        let mut second = [0u8; 24];
        gctr.do_final(&[0u8; 24], &mut first).unwrap();
        gctr.do_final(&[0u8; 24], &mut second).unwrap();
        assert_eq!(first, second, "reused generator must restart its stream");
    }

    #[test]
    fn streaming_matches_one_shot() {
        let data = [0x5Au8; 48];
        let mut one_shot = Gctr::new(zero_key(), &ICB).unwrap();
        let mut expected = [0u8; 48];
        one_shot.update(&data, &mut expected).unwrap();

        let mut streamed = Gctr::new(zero_key(), &ICB).unwrap();
        let mut out = [0u8; 48];
        streamed.update(&data[..16], &mut out[..16]).unwrap();
        streamed.update(&data[16..], &mut out[16..]).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn save_and_restore_replay_the_stream() {
        let mut gctr = Gctr::new(zero_key(), &ICB).unwrap();
        let mut skip = [0u8; 16];
        gctr.update(&[0u8; 16], &mut skip).unwrap();

        gctr.save();
        let mut first = [0u8; 16];
        gctr.update(&[0u8; 16], &mut first).unwrap();

        gctr.restore();
        let mut replay = [0u8; 16];
        gctr.update(&[0u8; 16], &mut replay).unwrap();
        assert_eq!(first, replay);
        assert_ne!(first, skip, "distinct counter blocks produce distinct keystream");
    }

    #[test]
    fn reset_discards_the_snapshot() {
        let mut gctr = Gctr::new(zero_key(), &ICB).unwrap();
        let mut out = [0u8; 16];
        gctr.update(&[0u8; 16], &mut out).unwrap();
        gctr.save();
        gctr.update(&[0u8; 16], &mut out).unwrap();
        gctr.reset();
        // restore after reset must not resurrect the pre-reset counter
        gctr.restore();
        let mut replay = [0u8; 16];
        gctr.update(&[0u8; 16], &mut replay).unwrap();
        let mut fresh = Gctr::new(zero_key(), &ICB).unwrap();
        let mut expected = [0u8; 16];
        fresh.update(&[0u8; 16], &mut expected).unwrap();
        assert_eq!(replay, expected);
    }
}
