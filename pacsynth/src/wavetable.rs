//! Wavetable generation and lookup.
//!
//! Tables are generated once at startup (see [fill_tone] and [fill_noise])
//! into storage owned by the caller, and are then borrowed immutably by any
//! number of oscillators through a [Wavetable].  Table lengths must be powers
//! of two so that both phase indexing and overflow-count indexing reduce to
//! a shift or a mask.

use crate::SampleFormat;
use num_traits::Float;
use rand::{RngCore, SeedableRng};

/// The largest supported table, one entry per value of a 16 bit phase
pub const MAX_TABLE_SIZE: usize = 1 << 16;

/// A borrowed, immutable wavetable
#[derive(Clone, Copy, Debug)]
pub struct Wavetable<'a, S: SampleFormat> {
    samples: &'a [S],
    index_bits: u32,
}

impl<'a, S: SampleFormat> Wavetable<'a, S> {
    /// Wrap `samples` as a wavetable, or return an error if its length is not
    /// a power of two between 1 and [MAX_TABLE_SIZE]
    pub fn new(samples: &'a [S]) -> Result<Self, &'static str> {
        let len = samples.len();
        if !len.is_power_of_two() {
            return Err("Wavetable length must be a power of two");
        }
        if len > MAX_TABLE_SIZE {
            return Err("Wavetable length must not exceed 65536");
        }
        Ok(Self {
            samples,
            index_bits: len.trailing_zeros(),
        })
    }
    /// The number of entries in the table
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    /// Always false: a wavetable has at least one entry
    pub fn is_empty(&self) -> bool {
        false
    }
    /// log2 of the number of entries in the table
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }
    /// Look up an entry, wrapping `index` modulo the table length
    #[inline]
    pub fn get(&self, index: u32) -> S {
        self.samples[(index as usize) & (self.samples.len() - 1)]
    }
    /// Look up the entry for a 16 bit phase value, using the top
    /// [Wavetable::index_bits] bits of the phase as the index
    #[inline]
    pub fn at_phase(&self, phase: u16) -> S {
        self.samples[((phase as u32) >> (16 - self.index_bits)) as usize]
    }
    /// The underlying samples
    pub fn samples(&self) -> &'a [S] {
        self.samples
    }
}

/// Fill `table` with one period of a full-scale sine wave.
///
/// Entry `i` is `CENTER + round(AMPLITUDE * sin(2 * pi * i / len))`.
pub fn fill_tone<S: SampleFormat>(table: &mut [S]) {
    let len = table.len() as f64;
    let amplitude = S::AMPLITUDE as f64;
    for (i, smp) in table.iter_mut().enumerate() {
        let theta = core::f64::consts::TAU * (i as f64) / len;
        let value = Float::round(amplitude * Float::sin(theta)) as i32;
        *smp = S::from_wide_saturating(S::CENTER + value);
    }
}

/// Build a tone table in a fixed size array (see [fill_tone]).  Intended for
/// small tables that live in static storage on embedded targets.
pub fn build_tone_table<S: SampleFormat, const N: usize>() -> [S; N] {
    let mut table = [S::default(); N];
    fill_tone(&mut table);
    table
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
/// The distribution used to fill a noise table
pub enum NoiseKind {
    /// Each entry is an independent draw spread uniformly across the whole
    /// output range
    #[default]
    Uniform,
    /// Normally distributed entries (generated with the Box-Muller
    /// transform) with a standard deviation of half the format amplitude,
    /// clamped to the output range
    Gaussian,
}

/// Fill `table` with noise drawn from `rng`, distributed according to `kind`.
/// All entries are clamped to the range of the sample format.
pub fn fill_noise<S: SampleFormat, R: RngCore>(table: &mut [S], kind: NoiseKind, rng: &mut R) {
    match kind {
        NoiseKind::Uniform => {
            for smp in table.iter_mut() {
                *smp = S::from_uniform(rng.next_u32());
            }
        }
        NoiseKind::Gaussian => {
            let sigma = S::AMPLITUDE as f64 / 2.0;
            for pair in table.chunks_mut(2) {
                let (a, b) = box_muller(rng);
                pair[0] = scale_gaussian(a, sigma);
                if let Some(second) = pair.get_mut(1) {
                    *second = scale_gaussian(b, sigma);
                }
            }
        }
    }
}

/// Build a noise table in a fixed size array (see [fill_noise])
pub fn build_noise_table<S: SampleFormat, R: RngCore, const N: usize>(
    kind: NoiseKind,
    rng: &mut R,
) -> [S; N] {
    let mut table = [S::default(); N];
    fill_noise(&mut table, kind, rng);
    table
}

fn scale_gaussian<S: SampleFormat>(value: f64, sigma: f64) -> S {
    // clamp in floating point first so huge tails can't overflow the cast
    let max_dev = (S::MAX - S::MIN) as f64;
    let dev = Float::round(value * sigma).clamp(-max_dev, max_dev) as i32;
    S::from_wide_saturating(S::CENTER + dev)
}

/// Map the top 24 bits of `bits` onto `(0, 1]`.  Never returns zero, so the
/// result is always safe to take the logarithm of.
fn uniform_open_closed(bits: u32) -> f64 {
    const SCALE: f64 = 1.0 / (1u32 << 24) as f64;
    (((bits >> 8) + 1) as f64) * SCALE
}

/// Draw a pair of independent standard normal values
fn box_muller<R: RngCore>(rng: &mut R) -> (f64, f64) {
    let u1 = uniform_open_closed(rng.next_u32());
    let u2 = uniform_open_closed(rng.next_u32());
    let r = Float::sqrt(-2.0 * Float::ln(u1));
    let theta = core::f64::consts::TAU * u2;
    (r * Float::cos(theta), r * Float::sin(theta))
}

/// A linear congruential pseudorandom number generator, with the classic
/// `state * 1103515245 + 12345` recurrence.
///
/// This is tiny and fast enough to run on an 8 bit micro at startup.  The low
/// bits of an LCG are poor, so output is taken from the upper half of the
/// state.  For better quality noise use [rand::rngs::SmallRng] instead; any
/// [RngCore] works with [fill_noise].
#[derive(Clone, Debug, Default)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Create a generator with the given initial state
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345);
        self.state
    }
    /// Advance the generator and return bits 16 to 23 of the new state
    pub fn next_byte(&mut self) -> u8 {
        (self.step() >> 16) as u8
    }
    fn next_half(&mut self) -> u32 {
        self.step() >> 16
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        let hi = self.next_half();
        let lo = self.next_half();
        (hi << 16) | lo
    }
    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = self.next_byte();
        }
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 4];
    fn from_seed(seed: [u8; 4]) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
