//! Multi-octave fractal Brownian motion (fBm) height function.
//!
//! Composites octaves of simplex noise at absolute world coordinates and maps
//! the result into a fixed `[min_height, max_height]` band, so neighbouring
//! chunks sampling the same world point always agree.

use noise::{NoiseFn, Simplex};

/// Largest noise-space coordinate passed to Simplex unchanged. Larger
/// magnitudes are wrapped into `[-NOISE_EXTENT, NOISE_EXTENT)`.
const NOISE_EXTENT: f64 = 1e15;

/// Configuration for the height function.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightParams {
    /// World seed for deterministic generation.
    pub seed: u64,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves. Default: 0.5.
    pub persistence: f64,
    /// Frequency of the first octave. Default: 0.01 (one cycle per 100 units).
    pub base_frequency: f64,
    /// Amplitude of the first octave, before mapping into the height band.
    pub amplitude: f64,
    /// Lowest terrain height in world units.
    pub min_height: f64,
    /// Highest terrain height in world units.
    pub max_height: f64,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 5,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 0.01,
            amplitude: 1.0,
            min_height: -8.0,
            max_height: 24.0,
        }
    }
}

impl HeightParams {
    /// Default parameters with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

/// Deterministic terrain height over the world XZ plane.
///
/// `generate_height` is a pure function of `(seed, x, z)`: it holds no
/// mutable state and can be shared across threads.
pub struct HeightGen {
    noise: Simplex,
    params: HeightParams,
    max_amplitude: f64,
    /// Output band: finite, `low <= high`.
    low: f64,
    high: f64,
}

impl HeightGen {
    /// Create a height function with default parameters.
    pub fn new(seed: u64) -> Self {
        Self::with_params(HeightParams::with_seed(seed))
    }

    /// Create a height function with explicit parameters.
    ///
    /// An inverted band is swapped and a non-finite bound falls back to its
    /// default.
    pub fn with_params(params: HeightParams) -> Self {
        let noise = Simplex::new(fold_seed(params.seed));
        let max_amplitude = geometric_amplitude(&params);
        let (low, high) = height_band(&params);
        Self {
            noise,
            params,
            max_amplitude,
            low,
            high,
        }
    }

    /// Terrain height at world `(x, z)`, in `[min_height, max_height]`.
    ///
    /// Defined for every `f64` input, including infinities and NaN. A
    /// zero-amplitude configuration yields the midpoint of the band.
    pub fn generate_height(&self, x: f64, z: f64) -> f64 {
        let (low, high) = (self.low, self.high);

        if self.max_amplitude == 0.0 {
            return low * 0.5 + high * 0.5;
        }

        // [-max_amp, +max_amp] -> [0, 1] -> [low, high]
        let mut normalized = (self.fbm(x, z) / self.max_amplitude + 1.0) * 0.5;
        if !normalized.is_finite() {
            normalized = 0.5;
        }
        (low + normalized * (high - low)).max(low).min(high)
    }

    /// Raw fBm sum at world `(x, z)`, roughly in `[-max_amplitude, max_amplitude]`.
    pub fn fbm(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;

        for _ in 0..self.params.octaves {
            let point = [noise_coord(x * frequency), noise_coord(z * frequency)];
            total += self.noise.get(point) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Theoretical maximum absolute fBm value (geometric series sum).
    pub fn max_amplitude(&self) -> f64 {
        self.max_amplitude
    }

    pub fn seed(&self) -> u64 {
        self.params.seed
    }

    pub fn params(&self) -> &HeightParams {
        &self.params
    }

    /// The `(low, high)` band heights are clamped into.
    pub fn band(&self) -> (f64, f64) {
        (self.low, self.high)
    }
}

/// Noise-space coordinate Simplex can sample. Identity within
/// `NOISE_EXTENT`; larger magnitudes wrap, non-finite values map to 0.
fn noise_coord(v: f64) -> f64 {
    if !v.is_finite() {
        0.0
    } else if v.abs() <= NOISE_EXTENT {
        v
    } else {
        (v + NOISE_EXTENT).rem_euclid(2.0 * NOISE_EXTENT) - NOISE_EXTENT
    }
}

fn height_band(params: &HeightParams) -> (f64, f64) {
    let defaults = HeightParams::default();
    let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
    let a = finite_or(params.min_height, defaults.min_height);
    let b = finite_or(params.max_height, defaults.max_height);
    if a <= b { (a, b) } else { (b, a) }
}

/// Simplex takes a 32-bit seed; fold the high half in so both halves matter.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

fn geometric_amplitude(params: &HeightParams) -> f64 {
    let mut sum = 0.0;
    let mut amp = params.amplitude;
    for _ in 0..params.octaves {
        sum += amp.abs();
        amp *= params.persistence;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_same_seed_same_coord_is_identical() {
        let a = HeightGen::new(42);
        let b = HeightGen::new(42);
        for (x, z) in [(0.0, 0.0), (100.0, -200.0), (63.999, 64.0), (-1e6, 3.25)] {
            let h1 = a.generate_height(x, z);
            let h2 = b.generate_height(x, z);
            assert_eq!(
                h1.to_bits(),
                h2.to_bits(),
                "Same seed + same coord must produce identical height at ({x}, {z}): {h1} vs {h2}"
            );
            assert_eq!(h1.to_bits(), a.generate_height(x, z).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_produce_different_heights() {
        let a = HeightGen::new(1);
        let b = HeightGen::new(999);
        let differs = (0..16).any(|i| {
            let p = i as f64 * 37.0;
            (a.generate_height(p, p) - b.generate_height(p, p)).abs() > EPSILON
        });
        assert!(differs, "Different seeds should produce different terrain");
    }

    #[test]
    fn test_high_seed_bits_matter() {
        assert_ne!(fold_seed(1), fold_seed(1 | (1 << 40)));
    }

    #[test]
    fn test_height_within_band() {
        let generator = HeightGen::new(7);
        let params = generator.params().clone();
        for x in (-50..50).map(|i| i as f64 * 13.0) {
            for z in (-50..50).map(|i| i as f64 * 13.0) {
                let h = generator.generate_height(x, z);
                assert!(
                    (params.min_height..=params.max_height).contains(&h),
                    "Height {h} outside [{}, {}] at ({x}, {z})",
                    params.min_height,
                    params.max_height
                );
            }
        }
    }

    #[test]
    fn test_smooth_gradient_no_discontinuities() {
        let generator = HeightGen::new(42);
        let params = generator.params();
        let step = 0.01;
        let max_allowed_delta = (params.max_height - params.min_height) * 0.05;

        for i in 0..10_000 {
            let x = i as f64 * step;
            let delta = (generator.generate_height(x + step, 3.0) - generator.generate_height(x, 3.0)).abs();
            assert!(
                delta < max_allowed_delta,
                "Discontinuity at x={x}: delta={delta} exceeds max={max_allowed_delta}"
            );
        }
    }

    #[test]
    fn test_max_amplitude_calculation() {
        let generator = HeightGen::with_params(HeightParams {
            amplitude: 1000.0,
            persistence: 0.5,
            octaves: 4,
            ..Default::default()
        });
        let expected = 1875.0;
        assert!(
            (generator.max_amplitude() - expected).abs() < EPSILON,
            "Max amplitude should be {expected}, got {}",
            generator.max_amplitude()
        );
    }

    #[test]
    fn test_zero_amplitude_returns_midpoint() {
        let generator = HeightGen::with_params(HeightParams {
            amplitude: 0.0,
            ..Default::default()
        });
        let h = generator.generate_height(123.0, 456.0);
        assert!(
            (h - 8.0).abs() < EPSILON,
            "Zero amplitude should map to the band midpoint, got {h}"
        );
    }

    #[test]
    fn test_defaults() {
        let params = HeightParams::with_seed(5);
        assert_eq!(params.seed, 5);
        assert_eq!(params.octaves, 5);
        assert_eq!(params.min_height, -8.0);
        assert_eq!(params.max_height, 24.0);
        assert_eq!(HeightGen::new(5).seed(), 5);
    }

    #[test]
    fn test_extreme_coordinates_do_not_panic() {
        let generator = HeightGen::new(42);
        let (low, high) = generator.band();
        let extremes = [
            f64::MAX,
            -f64::MAX,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NAN,
            1e300,
            -1e20,
        ];
        for x in extremes {
            for z in [0.0, x] {
                let h = generator.generate_height(x, z);
                assert!(h.is_finite(), "Height at ({x}, {z}) must be finite, got {h}");
                assert!(
                    (low..=high).contains(&h),
                    "Height {h} at ({x}, {z}) outside [{low}, {high}]"
                );
                assert_eq!(
                    h.to_bits(),
                    generator.generate_height(x, z).to_bits(),
                    "Height at ({x}, {z}) must be repeatable"
                );
            }
        }
    }

    #[test]
    fn test_noise_coord_is_identity_in_range() {
        for v in [0.0, -0.25, 1234.5, -1e12, NOISE_EXTENT, -NOISE_EXTENT] {
            assert_eq!(noise_coord(v).to_bits(), v.to_bits());
        }
        for v in [1e16, -1e16, f64::MAX, -f64::MAX] {
            let wrapped = noise_coord(v);
            assert!(
                (-NOISE_EXTENT..=NOISE_EXTENT).contains(&wrapped),
                "{v} wrapped to {wrapped}"
            );
        }
        assert_eq!(noise_coord(f64::NAN), 0.0);
        assert_eq!(noise_coord(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_inverted_band_is_swapped() {
        let inverted = HeightGen::with_params(HeightParams {
            min_height: 10.0,
            max_height: 0.0,
            ..Default::default()
        });
        assert_eq!(inverted.band(), (0.0, 10.0));
        for (x, z) in [(3.0, 4.0), (-250.0, 91.5)] {
            let h = inverted.generate_height(x, z);
            assert!((0.0..=10.0).contains(&h), "Height {h} outside the swapped band");
        }

        let ordered = HeightGen::with_params(HeightParams {
            min_height: 0.0,
            max_height: 10.0,
            ..Default::default()
        });
        assert_eq!(
            inverted.generate_height(3.0, 4.0).to_bits(),
            ordered.generate_height(3.0, 4.0).to_bits()
        );
    }

    #[test]
    fn test_non_finite_params_stay_in_band() {
        let generator = HeightGen::with_params(HeightParams {
            min_height: f64::NAN,
            max_height: f64::INFINITY,
            amplitude: f64::NAN,
            base_frequency: f64::INFINITY,
            ..Default::default()
        });
        let defaults = HeightParams::default();
        assert_eq!(generator.band(), (defaults.min_height, defaults.max_height));

        let h = generator.generate_height(10.0, 20.0);
        assert!(
            (defaults.min_height..=defaults.max_height).contains(&h),
            "Height {h} outside the default band"
        );
    }
}
