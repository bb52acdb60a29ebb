//! 16-bit Galois LFSR used to shuffle tracks.
//!
//! Each step shifts the register right by one and, when the bit shifted out was a 1, XORs
//! in the tap mask `0xB400` (taps 16, 14, 13, 11). The polynomial is primitive, so from
//! any non-zero state the register walks through all 65535 non-zero values before
//! repeating and never reaches zero.
//!
//! The register starts from a fixed value, so without seeding every power-up would play
//! the same sequence. [`Lfsr16::seed_once`] mixes in a free-running counter the first time
//! a track is picked and never again.
//!
//! Not cryptographically secure.

use crate::board::EntropySource;
use crate::consts::{LFSR_INITIAL, LFSR_TAPS};

/// The generator state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Lfsr16 {
    state: u16,
    seeded: bool,
}

impl Default for Lfsr16 {
    fn default() -> Self {
        Self::new()
    }
}

impl Lfsr16 {
    /// Creates an unseeded generator at the fixed initial state `0xACE1`.
    pub const fn new() -> Self {
        Self {
            state: LFSR_INITIAL,
            seeded: false,
        }
    }

    /// Creates an unseeded generator at `state`. Zero would stall the register and is
    /// replaced by the initial state.
    pub const fn with_state(state: u16) -> Self {
        Self {
            state: if state == 0 { LFSR_INITIAL } else { state },
            seeded: false,
        }
    }

    /// The current register value.
    pub const fn state(&self) -> u16 {
        self.state
    }

    /// True once [`seed_once`](Self::seed_once) has run.
    pub const fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Advances the register one step and returns the new value.
    pub fn next_u16(&mut self) -> u16 {
        let lsb = self.state & 1;
        self.state >>= 1;
        if lsb != 0 {
            self.state ^= LFSR_TAPS;
        }
        self.state
    }

    /// Draws a value in `0..bound`, or 0 when `bound` is 0.
    ///
    /// Plain modulo, so small bounds carry a slight bias towards low values; irrelevant
    /// at the bounds used for track picking.
    pub fn below(&mut self, bound: u16) -> u16 {
        self.next_u16().checked_rem(bound).unwrap_or(0)
    }

    /// XORs the entropy source into the register, the first time only.
    ///
    /// The source is not read once the generator is seeded. A sample that would zero the
    /// register is discarded, leaving the state untouched; the generator still counts as
    /// seeded.
    pub fn seed_once<E: EntropySource>(&mut self, entropy: &mut E) {
        if self.seeded {
            return;
        }
        let sample = entropy.sample();
        let mixed = self.state ^ sample;
        if mixed != 0 {
            self.state = mixed;
        }
        self.seeded = true;
        debug!("rng seeded with {}", sample);
    }
}

impl Iterator for Lfsr16 {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        Some(self.next_u16())
    }
}
