//! Item selection
//!
//! Exploitation picks the most informative item near the learner's ability,
//! widening the difficulty tolerance (T, then 2T, then unbounded) until
//! something qualifies. With probability `exploration_rate` a uniformly random
//! non-excluded item is served instead. Recently shown items are excluded for
//! `recent_window` turns; when the recency window would exclude the whole
//! remaining catalog it is relaxed and only the caller's exclusions apply.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::Catalog;
use crate::config::SelectionConfig;
use crate::rating::RatingModel;
use crate::types::{seeded_rng, Item};

/// Bounded, order-preserving history of shown item identifiers.
///
/// Holds up to `2 * window` entries; only the last `window` are excluded.
#[derive(Debug, Clone, Default)]
pub struct RecentlyShown {
    window: usize,
    ids: VecDeque<String>,
}

impl RecentlyShown {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            ids: VecDeque::with_capacity(window.saturating_mul(2).min(1024)),
        }
    }

    pub fn push(&mut self, id: &str) {
        self.ids.push_back(id.to_string());
        let cap = self.window.saturating_mul(2);
        while self.ids.len() > cap {
            self.ids.pop_front();
        }
    }

    /// The last `window` identifiers, oldest first.
    pub fn window(&self) -> impl Iterator<Item = &str> {
        let skip = self.ids.len().saturating_sub(self.window);
        self.ids.iter().skip(skip).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.window().any(|recent| recent == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

#[derive(Debug, Clone)]
pub struct ItemSelector<R: Rng = ChaCha8Rng> {
    config: SelectionConfig,
    recent: RecentlyShown,
    rng: R,
}

impl ItemSelector<ChaCha8Rng> {
    pub fn new(config: SelectionConfig, seed: Option<u64>) -> Self {
        Self::with_rng(config, seeded_rng(seed))
    }
}

impl<R: Rng> ItemSelector<R> {
    pub fn with_rng(config: SelectionConfig, rng: R) -> Self {
        Self {
            recent: RecentlyShown::new(config.recent_window),
            config,
            rng,
        }
    }

    pub fn recent(&self) -> &RecentlyShown {
        &self.recent
    }

    /// Session restart: forget what was shown.
    pub fn clear_recent(&mut self) {
        self.recent.clear();
    }

    /// Seed the recency window, e.g. from a resumed session.
    pub fn restore_recent<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.recent.push(id);
        }
    }

    /// Next item for an already-rated learner, or `None` when every item is
    /// excluded by the caller.
    pub fn select<'c>(
        &mut self,
        catalog: &'c Catalog,
        model: &RatingModel,
        ability: f64,
        excluded: &[&str],
    ) -> Option<&'c Item> {
        let caller: HashSet<&str> = excluded.iter().copied().collect();
        let mut exclusions = caller.clone();
        exclusions.extend(self.recent.window());

        let mut available: Vec<&'c Item> = catalog
            .iter()
            .filter(|item| !exclusions.contains(item.id.as_str()))
            .collect();

        if available.is_empty() {
            tracing::debug!(
                recent = self.recent.len(),
                catalog = catalog.len(),
                "Recency window covers the catalog; relaxing"
            );
            available = catalog
                .iter()
                .filter(|item| !caller.contains(item.id.as_str()))
                .collect();
        }
        if available.is_empty() {
            return None;
        }

        if self.rng.gen::<f64>() < self.config.exploration_rate {
            if let Some(&item) = available.choose(&mut self.rng) {
                tracing::debug!(item_id = %item.id, "Exploration pick");
                self.recent.push(&item.id);
                return Some(item);
            }
        }

        let tolerance = self.config.tolerance;
        let mut candidates = within(&available, ability, tolerance);
        if candidates.is_empty() {
            candidates = within(&available, ability, tolerance * 2.0);
        }
        if candidates.is_empty() {
            tracing::debug!(ability, "No item within 2T; using every available item");
            candidates = available;
        }

        let mut best: Option<(&'c Item, f64)> = None;
        for item in candidates {
            let info = model.information_value(ability, item.difficulty());
            match best {
                Some((_, best_info)) if info <= best_info => {}
                _ => best = Some((item, info)),
            }
        }

        let (item, _) = best?;
        self.recent.push(&item.id);
        Some(item)
    }

    /// Deterministic pick for a calibration question: the item closest to
    /// `target_difficulty` that is neither excluded by the caller nor in the
    /// recency window. The recency window is dropped first when nothing else
    /// is left; caller exclusions always hold.
    pub fn select_for_calibration<'c>(
        &mut self,
        catalog: &'c Catalog,
        target_difficulty: f64,
        excluded: &[&str],
    ) -> Option<&'c Item> {
        let distance = |item: &&Item| (item.difficulty() - target_difficulty).abs();
        let closest = |items: Vec<&'c Item>| {
            items.into_iter().min_by(|a, b| {
                distance(a)
                    .partial_cmp(&distance(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        };

        let allowed: Vec<&'c Item> = catalog
            .iter()
            .filter(|item| !excluded.contains(&item.id.as_str()))
            .collect();
        let fresh: Vec<&'c Item> = allowed
            .iter()
            .copied()
            .filter(|item| !self.recent.contains(&item.id))
            .collect();
        let item = if fresh.is_empty() {
            closest(allowed)
        } else {
            closest(fresh)
        }?;

        self.recent.push(&item.id);
        Some(item)
    }
}

fn within<'c>(items: &[&'c Item], ability: f64, tolerance: f64) -> Vec<&'c Item> {
    items
        .iter()
        .copied()
        .filter(|item| (item.difficulty() - ability).abs() <= tolerance)
        .collect()
}
