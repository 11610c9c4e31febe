//! Miscellaneous utilities: a seedable uniform index generator used by the
//! samplers and a small real-root polynomial solver used by the seven-point
//! fundamental matrix solver.

use rand::distributions::Uniform;
use rand::prelude::*;

/// Uniform index generator over a seedable `StdRng`.
///
/// Production code seeds it from OS entropy; tests construct it from a fixed
/// seed for reproducible behavior.
pub struct UniformRandomGenerator {
    rng: StdRng,
}

impl Default for UniformRandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformRandomGenerator {
    /// Construct with an entropy seed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Construct with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a single value in `[min, max]`.
    pub fn next_in(&mut self, min: usize, max: usize) -> usize {
        self.rng.gen_range(min..=max)
    }

    /// Fill `out` with distinct values in `[min, max]`.
    ///
    /// Rejection sampling, suited to the small sample sizes of minimal solvers.
    /// The range must hold at least `out.len()` values.
    pub fn gen_unique(&mut self, out: &mut [usize], min: usize, max: usize) {
        debug_assert!(max >= min && max - min + 1 >= out.len());
        let dist = Uniform::new_inclusive(min, max);
        for i in 0..out.len() {
            loop {
                let candidate = self.rng.sample(dist);
                if out[..i].iter().all(|&v| v != candidate) {
                    out[i] = candidate;
                    break;
                }
            }
        }
    }
}

/// Real roots of `a x^3 + b x^2 + c x + d = 0`.
///
/// Falls back to the quadratic (or linear) case when the leading coefficient
/// vanishes relative to the others. Roots are polished with Newton steps and
/// returned in ascending order; repeated roots may appear once.
pub fn real_cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    let scale = b.abs().max(c.abs()).max(d.abs());
    if a.abs() <= 1e-12 * scale || a == 0.0 {
        return real_quadratic_roots(b, c, d);
    }

    let p2 = b / a;
    let p1 = c / a;
    let p0 = d / a;

    let q = (3.0 * p1 - p2 * p2) / 9.0;
    let r = (9.0 * p2 * p1 - 27.0 * p0 - 2.0 * p2 * p2 * p2) / 54.0;
    let disc = q * q * q + r * r;
    let shift = -p2 / 3.0;

    let mut roots = if disc > 0.0 {
        let sqrt_disc = disc.sqrt();
        let s = (r + sqrt_disc).cbrt();
        let t = (r - sqrt_disc).cbrt();
        vec![shift + s + t]
    } else if q.abs() < f64::EPSILON {
        vec![shift]
    } else {
        let m = 2.0 * (-q).sqrt();
        let theta = (r / (-q * q * q).sqrt()).clamp(-1.0, 1.0).acos();
        (0..3)
            .map(|k| {
                let angle = (theta + 2.0 * std::f64::consts::PI * k as f64) / 3.0;
                shift + m * angle.cos()
            })
            .collect()
    };

    for root in roots.iter_mut() {
        for _ in 0..2 {
            let x = *root;
            let f = ((x + p2) * x + p1) * x + p0;
            let df = (3.0 * x + 2.0 * p2) * x + p1;
            if df.abs() < f64::EPSILON {
                break;
            }
            *root = x - f / df;
        }
    }

    roots.sort_by(|x, y| x.total_cmp(y));
    roots
}

/// Real roots of `a x^2 + b x + c = 0`, ascending.
pub fn real_quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 || a.abs() <= 1e-12 * b.abs().max(c.abs()) {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }

    // Numerically stable form avoiding cancellation.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        return vec![0.0];
    }
    let mut roots = vec![q / a, c / q];
    roots.sort_by(|x, y| x.total_cmp(y));
    roots
}
