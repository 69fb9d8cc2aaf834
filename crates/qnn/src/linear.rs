//! Scalar affine output layer, `y = w * x + b`.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A `Linear(1, 1)` layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    pub weight: f64,
    pub bias: f64,
}

impl Linear {
    pub fn new(weight: f64, bias: f64) -> Self {
        Self { weight, bias }
    }

    /// Uniform initialisation in `[-1/sqrt(fan_in), 1/sqrt(fan_in)]` with a
    /// fan-in of 1.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            weight: rng.gen_range(-1.0..=1.0),
            bias: rng.gen_range(-1.0..=1.0),
        }
    }

    #[inline]
    pub fn forward(&self, x: f64) -> f64 {
        self.weight * x + self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_forward() {
        assert_eq!(Linear::new(2.0, 0.5).forward(3.0), 6.5);
    }

    #[test]
    fn test_random_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let l = Linear::random(&mut rng);
            assert!((-1.0..=1.0).contains(&l.weight));
            assert!((-1.0..=1.0).contains(&l.bias));
        }
    }
}
