//! Gain (K-factor) policies for the rating model.

use std::collections::VecDeque;
use std::fmt::Debug;

use crate::config::DynamicGainConfig;

/// Decides the step size of each rating update.
pub trait GainPolicy: Debug + Send {
    /// Gain for the next update, given the learner's ability before it.
    fn next_gain(&mut self, ability: f64) -> f64;

    /// Gain the next update would use, without recording anything.
    fn current_gain(&self) -> f64;

    fn reset(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedGain(pub f64);

impl GainPolicy for FixedGain {
    fn next_gain(&mut self, _ability: f64) -> f64 {
        self.0
    }

    fn current_gain(&self) -> f64 {
        self.0
    }
}

/// Widens the gain while the learner's ability keeps moving in one direction
/// and falls back to a stable minimum once it settles.
///
/// The trend statistic is the sum of first differences over the last
/// `window` abilities, compared against `window * unit_threshold`.
#[derive(Debug, Clone)]
pub struct TrendGain {
    config: DynamicGainConfig,
    history: VecDeque<f64>,
}

impl TrendGain {
    pub fn new(config: DynamicGainConfig) -> Self {
        Self {
            config,
            history: VecDeque::with_capacity(config.window.saturating_add(1).min(1024)),
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &f64> {
        self.history.iter()
    }

    fn trend(&self) -> f64 {
        self.history
            .iter()
            .zip(self.history.iter().skip(1))
            .map(|(prev, next)| next - prev)
            .sum()
    }

    fn gain_for_history(&self) -> f64 {
        if self.history.len() < self.config.window {
            return self.config.base_gain;
        }
        let threshold = self.config.window as f64 * self.config.unit_threshold;
        if self.trend().abs() > threshold {
            self.config.max_gain
        } else {
            self.config.min_gain
        }
    }
}

impl GainPolicy for TrendGain {
    fn next_gain(&mut self, ability: f64) -> f64 {
        self.history.push_back(ability);
        while self.history.len() > self.config.window {
            self.history.pop_front();
        }
        self.gain_for_history()
    }

    fn current_gain(&self) -> f64 {
        self.gain_for_history()
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}
