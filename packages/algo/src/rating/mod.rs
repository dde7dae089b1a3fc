//! Elo-style paired-comparison rating model
//!
//! Learner ability and item difficulty live on the same scale. A single
//! observed answer moves both: an unexpected correct answer raises the ability
//! and lowers the item's difficulty by the same amount, and vice versa.
//!
//! - Expected correctness: `1 / (1 + 10^((d - a) / (2 * spread)))`
//! - Update: `a' = a + K (o - p)`, `d' = d - K (o - p)`
//! - Information value: binary entropy of the expected correctness (bits)
//!
//! The gain `K` comes from a pluggable [`GainPolicy`].

pub mod gain;

pub use gain::{FixedGain, GainPolicy, TrendGain};

use crate::config::{DynamicGainConfig, RatingConfig};
use crate::sanitize::clamp_probability;
use crate::types::RatingUpdate;

#[derive(Debug)]
pub struct RatingModel {
    config: RatingConfig,
    gain: Box<dyn GainPolicy>,
}

impl RatingModel {
    pub fn new(config: RatingConfig, gain: Box<dyn GainPolicy>) -> Self {
        Self { config, gain }
    }

    /// Constant gain taken from `config.gain`.
    pub fn fixed(config: RatingConfig) -> Self {
        Self::new(config, Box::new(FixedGain(config.gain)))
    }

    /// Trend-driven gain.
    pub fn dynamic(config: RatingConfig, gain_config: DynamicGainConfig) -> Self {
        Self::new(config, Box::new(TrendGain::new(gain_config)))
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn current_gain(&self) -> f64 {
        self.gain.current_gain()
    }

    /// Probability that a learner of `ability` answers an item of
    /// `difficulty` correctly. Always strictly inside (0, 1).
    pub fn expected_correctness(&self, ability: f64, difficulty: f64) -> f64 {
        expected_correctness(ability, difficulty, self.config.spread)
    }

    /// Expected information (bits) from asking an item of `difficulty`.
    pub fn information_value(&self, ability: f64, difficulty: f64) -> f64 {
        binary_entropy(self.expected_correctness(ability, difficulty))
    }

    /// Two-sided update after one observed answer.
    pub fn update(&mut self, ability: f64, difficulty: f64, correct: bool) -> RatingUpdate {
        debug_assert!(ability.is_finite() && difficulty.is_finite());

        let expected = self.expected_correctness(ability, difficulty);
        let observed = if correct { 1.0 } else { 0.0 };
        let gain = self.gain.next_gain(ability);
        let delta = gain * (observed - expected);

        RatingUpdate {
            ability: ability + delta,
            difficulty: difficulty - delta,
            expected,
            gain,
        }
    }

    pub fn reset(&mut self) {
        self.gain.reset();
    }
}

impl Default for RatingModel {
    fn default() -> Self {
        Self::fixed(RatingConfig::default())
    }
}

/// Logistic expected score, base 10, clamped away from 0 and 1.
pub fn expected_correctness(ability: f64, difficulty: f64, spread: f64) -> f64 {
    let exponent = (difficulty - ability) / (2.0 * spread);
    clamp_probability(1.0 / (1.0 + 10f64.powf(exponent)))
}

/// Shannon entropy of a Bernoulli(p) outcome, in bits.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
}
