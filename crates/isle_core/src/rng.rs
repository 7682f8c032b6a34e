//! Seeded random source.
//!
//! Map generation and unit spawning draw from a caller-supplied
//! [`RandomSource`]. Reproducibility is keyed to the generator algorithm
//! as well as the seed, so the crate fixes one: [`Mulberry32`], a 32-bit
//! counter-based generator. Swapping the algorithm changes every map.

/// Uniform random source producing values in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Mulberry32 generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    const INCREMENT: u32 = 0x6D2B_79F5;

    /// Create a generator from a 32-bit seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl RandomSource for Mulberry32 {
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}
