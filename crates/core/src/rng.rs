use core::num::NonZeroU32;
use rand_core::{impls, Error, RngCore};

/// xorshift32 (13, 17, 5). Fast and NOT cryptographic: it only randomizes
/// experiment inputs.
///
/// The state is never zero. Zero is the transition's only fixed point, and a
/// non-zero seed is enforced by the constructor.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(seed: NonZeroU32) -> Self {
        Self { state: seed.get() }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advances the state once and returns the new state.
    pub fn next_word(&mut self) -> u32 {
        self.state = step(self.state);
        self.state
    }

    /// Fills `buf` with `ceil(len / 4)` draws.
    ///
    /// Whole words go out least-significant byte first. A 1-3 byte tail
    /// takes one more word and writes from its most-significant byte down,
    /// dropping the low bytes. Consumers depend on this exact layout.
    pub fn fill(&mut self, buf: &mut [u8]) {
        let mut chunks = buf.chunks_exact_mut(4);
        for chunk in &mut chunks {
            let word = self.next_word();
            for (i, b) in chunk.iter_mut().enumerate() {
                *b = byte(word, i);
            }
        }

        let tail = chunks.into_remainder();
        if tail.is_empty() {
            return;
        }
        let word = self.next_word();
        for (i, b) in tail.iter_mut().enumerate() {
            *b = byte(word, 3 - i);
        }
    }
}

/// One xorshift32 transition.
pub fn step(mut x: u32) -> u32 {
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

fn byte(word: u32, index: usize) -> u8 {
    ((word >> (index * 8)) & 0xFF) as u8
}

impl RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill(dest);
        Ok(())
    }
}
