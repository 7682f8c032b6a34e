//! Hash-based value noise and fractal Brownian motion.
//!
//! All functions are pure: the same inputs always give the same output on
//! a given platform. Values are in `[0, 1)`.

/// Number of octaves summed by [`fbm`].
pub const FBM_OCTAVES: u32 = 4;

/// Pseudo-random lattice value for integer-ish coordinates.
#[must_use]
pub fn hash_noise(x: f64, y: f64, seed: u32) -> f64 {
    let n = (x * 127.1 + y * 311.7 + f64::from(seed) * 0.001).sin() * 43_758.545_312_3;
    n - n.floor()
}

#[inline]
fn smooth_step(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Bilinear value noise with smoothstep easing between lattice points.
#[must_use]
pub fn value_noise(x: f64, y: f64, seed: u32) -> f64 {
    let x0 = x.floor();
    let y0 = y.floor();
    let x1 = x0 + 1.0;
    let y1 = y0 + 1.0;
    let sx = smooth_step(x - x0);
    let sy = smooth_step(y - y0);

    let n00 = hash_noise(x0, y0, seed);
    let n10 = hash_noise(x1, y0, seed);
    let n01 = hash_noise(x0, y1, seed);
    let n11 = hash_noise(x1, y1, seed);

    let ix0 = n00 + (n10 - n00) * sx;
    let ix1 = n01 + (n11 - n01) * sx;
    ix0 + (ix1 - ix0) * sy
}

/// Fractal noise: [`FBM_OCTAVES`] octaves of [`value_noise`], each halving
/// amplitude and doubling frequency, normalised by total amplitude.
#[must_use]
pub fn fbm(x: f64, y: f64, seed: u32) -> f64 {
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    let mut total = 0.0;
    let mut norm = 0.0;
    for _ in 0..FBM_OCTAVES {
        total += value_noise(x * frequency, y * frequency, seed) * amplitude;
        norm += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    total / norm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_noise_range() {
        for i in 0..500 {
            let v = hash_noise(f64::from(i) * 0.37, f64::from(i) * -1.3, 42);
            assert!((0.0..1.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn test_value_noise_matches_lattice() {
        // At integer coordinates the interpolation weights are zero
        let v = value_noise(3.0, 5.0, 7);
        assert!((v - hash_noise(3.0, 5.0, 7)).abs() < 1e-12);
    }

    #[test]
    fn test_fbm_is_pure_and_bounded() {
        for i in 0..200 {
            let x = f64::from(i) * 0.09 + 412.7;
            let y = f64::from(i) * 0.21 + 88.1;
            let a = fbm(x, y, 99);
            assert_eq!(a.to_bits(), fbm(x, y, 99).to_bits());
            assert!((0.0..1.0).contains(&a));
        }
    }
}
