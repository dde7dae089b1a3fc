//! Distractor generation
//!
//! Wrong answers are drawn with escalating fallbacks:
//! 1. same part of speech within `tight_band` of the target difficulty
//! 2. any part of speech within `wide_band`
//! 3. anything left in the catalog
//!
//! Each tier is shuffled before it is drawn from.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::Catalog;
use crate::config::DistractorConfig;
use crate::error::{EngineError, Result};
use crate::types::{seeded_rng, Item, Question};

#[derive(Debug, Clone)]
pub struct DistractorBuilder<R: Rng = ChaCha8Rng> {
    config: DistractorConfig,
    rng: R,
}

impl DistractorBuilder<ChaCha8Rng> {
    pub fn new(config: DistractorConfig, seed: Option<u64>) -> Self {
        Self::with_rng(config, seeded_rng(seed))
    }
}

impl<R: Rng> DistractorBuilder<R> {
    pub fn with_rng(config: DistractorConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &DistractorConfig {
        &self.config
    }

    /// `n` distinct items other than `correct`.
    ///
    /// Fails with [`EngineError::InsufficientDistractors`] when the catalog
    /// cannot supply `n` of them; no padding or duplicates are returned.
    pub fn build<'c>(
        &mut self,
        catalog: &'c Catalog,
        correct: &Item,
        n: usize,
    ) -> Result<Vec<&'c Item>> {
        let mut chosen: Vec<&'c Item> = Vec::with_capacity(n);
        if n == 0 {
            return Ok(chosen);
        }

        let target = correct.difficulty();
        let mut used: HashSet<&str> = HashSet::with_capacity(n + 1);
        used.insert(correct.id.as_str());

        let mut tight: Vec<&'c Item> = catalog
            .indices_for_pos(correct.part_of_speech)
            .iter()
            .filter_map(|&i| catalog.get(i))
            .filter(|item| {
                !used.contains(item.id.as_str())
                    && (item.difficulty() - target).abs() <= self.config.tight_band
            })
            .collect();
        self.draw(&mut tight, &mut chosen, &mut used, n);

        if chosen.len() < n {
            let mut wide: Vec<&'c Item> = catalog
                .iter()
                .filter(|item| {
                    !used.contains(item.id.as_str())
                        && (item.difficulty() - target).abs() <= self.config.wide_band
                })
                .collect();
            self.draw(&mut wide, &mut chosen, &mut used, n);
        }

        if chosen.len() < n {
            let mut rest: Vec<&'c Item> = catalog
                .iter()
                .filter(|item| !used.contains(item.id.as_str()))
                .collect();
            self.draw(&mut rest, &mut chosen, &mut used, n);
        }

        if chosen.len() < n {
            tracing::warn!(
                item_id = %correct.id,
                requested = n,
                available = chosen.len(),
                "Catalog cannot supply enough distractors"
            );
            return Err(EngineError::InsufficientDistractors {
                requested: n,
                available: chosen.len(),
            });
        }
        Ok(chosen)
    }

    /// Definitions of `n` distractors.
    pub fn build_definitions(
        &mut self,
        catalog: &Catalog,
        correct: &Item,
        n: usize,
    ) -> Result<Vec<String>> {
        Ok(self
            .build(catalog, correct, n)?
            .into_iter()
            .map(|item| item.definition.clone())
            .collect())
    }

    /// Multiple-choice question with `choice_count` shuffled definitions.
    pub fn create_question(
        &mut self,
        catalog: &Catalog,
        item: &Item,
        choice_count: usize,
    ) -> Result<Question> {
        if choice_count < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "a question needs at least 2 choices, got {choice_count}"
            )));
        }

        let distractors = self.build(catalog, item, choice_count - 1)?;
        let mut choices: Vec<(&str, bool)> = Vec::with_capacity(choice_count);
        choices.push((item.definition.as_str(), true));
        choices.extend(distractors.iter().map(|d| (d.definition.as_str(), false)));
        choices.shuffle(&mut self.rng);

        let correct_index = choices
            .iter()
            .position(|(_, is_correct)| *is_correct)
            .unwrap_or(0);

        Ok(Question {
            item_id: item.id.clone(),
            part_of_speech: item.part_of_speech,
            choices: choices.into_iter().map(|(text, _)| text.to_string()).collect(),
            correct_index,
            difficulty: item.difficulty(),
        })
    }

    /// Question sized by the configured `choice_count`.
    pub fn create_default_question(&mut self, catalog: &Catalog, item: &Item) -> Result<Question> {
        self.create_question(catalog, item, self.config.choice_count)
    }

    fn draw<'u, 'c: 'u>(
        &mut self,
        pool: &mut [&'c Item],
        chosen: &mut Vec<&'c Item>,
        used: &mut HashSet<&'u str>,
        n: usize,
    ) {
        pool.shuffle(&mut self.rng);
        for &item in pool.iter() {
            if chosen.len() >= n {
                break;
            }
            if used.insert(item.id.as_str()) {
                chosen.push(item);
            }
        }
    }
}
