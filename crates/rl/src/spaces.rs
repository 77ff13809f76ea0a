use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// A closed box `[low, high]` in `R^n`.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl BoxSpace {
    /// # Panics
    ///
    /// If the bounds differ in length or any `low > high`.
    #[must_use]
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Self {
        assert_eq!(low.len(), high.len(), "bounds must have the same length");
        assert!(
            low.iter().zip(&high).all(|(l, h)| l <= h),
            "low must not exceed high"
        );
        Self { low, high }
    }

    /// `dim` copies of `[low, high]`.
    #[must_use]
    pub fn uniform(low: f32, high: f32, dim: usize) -> Self {
        Self::new(vec![low; dim], vec![high; dim])
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    #[must_use]
    pub fn low(&self) -> &[f32] {
        &self.low
    }

    #[must_use]
    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Uniform sample from the box.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        self.low
            .iter()
            .zip(&self.high)
            .map(|(&l, &h)| Uniform::new_inclusive(l, h).sample(rng))
            .collect()
    }

    /// Clamps each element into its bound. Extra elements are dropped.
    #[must_use]
    pub fn clip(&self, x: &[f32]) -> Vec<f32> {
        x.iter()
            .zip(self.low.iter().zip(&self.high))
            .map(|(v, (l, h))| v.clamp(*l, *h))
            .collect()
    }
}
