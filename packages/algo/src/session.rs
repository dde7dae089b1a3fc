//! Quiz session
//!
//! Drives one learner through calibration and then the adaptive loop:
//! select → build question → (host presents it) → submit answer → update.
//! A session owns its catalog copy, so item difficulties have a single writer.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationSession;
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::distractor::DistractorBuilder;
use crate::error::{EngineError, Result};
use crate::rating::RatingModel;
use crate::sanitize::ensure_finite;
use crate::selection::ItemSelector;
use crate::types::{
    Attempt, CalibrationState, CalibrationStatus, LearnerStats, Question, RatingUpdate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Calibrating,
    Adaptive,
}

/// What the host gets back after an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub item_id: String,
    pub is_correct: bool,
    /// Present for adaptive answers; calibration answers do not rate.
    pub rating: Option<RatingUpdate>,
    /// Present while calibrating and on the answer that completes it.
    pub calibration: Option<CalibrationStatus>,
    pub ability: f64,
    pub phase: SessionPhase,
}

/// Learner state the host persists between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerSnapshot {
    pub ability: f64,
    pub stats: LearnerStats,
    pub calibration: Option<CalibrationState>,
    #[serde(default)]
    pub recent_items: Vec<String>,
}

#[derive(Debug)]
pub struct QuizSession {
    config: EngineConfig,
    catalog: Catalog,
    model: RatingModel,
    calibration: Option<CalibrationSession>,
    selector: ItemSelector,
    distractors: DistractorBuilder,
    ability: f64,
    stats: LearnerStats,
    history: VecDeque<Attempt>,
}

impl QuizSession {
    /// New learner: starts with calibration.
    pub fn new(catalog: Catalog, config: EngineConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let calibration = CalibrationSession::new(&config.calibration)?;
        let ability = config.initial_ability;
        let mut session = Self::assemble(catalog, config, ability, seed);
        session.calibration = Some(calibration);
        tracing::info!(items = session.catalog.len(), "Session started in calibration");
        Ok(session)
    }

    /// Returning learner with a known ability: skips calibration.
    pub fn with_ability(
        catalog: Catalog,
        config: EngineConfig,
        ability: f64,
        seed: Option<u64>,
    ) -> Result<Self> {
        config.validate()?;
        ensure_finite("ability", ability)?;
        let session = Self::assemble(catalog, config, ability, seed);
        tracing::info!(ability, "Session started");
        Ok(session)
    }

    /// Restore a learner from a snapshot written by [`QuizSession::snapshot`].
    pub fn resume(
        catalog: Catalog,
        config: EngineConfig,
        snapshot: LearnerSnapshot,
        seed: Option<u64>,
    ) -> Result<Self> {
        config.validate()?;
        ensure_finite("ability", snapshot.ability)?;
        let calibration = snapshot
            .calibration
            .filter(|state| !state.complete)
            .map(|state| CalibrationSession::from_state(&config.calibration, state))
            .transpose()?;

        let mut session = Self::assemble(catalog, config, snapshot.ability, seed);
        session.stats = snapshot.stats;
        session.stats.current = snapshot.ability;
        session.calibration = calibration;
        session
            .selector
            .restore_recent(snapshot.recent_items.iter().map(String::as_str));
        tracing::info!(ability = snapshot.ability, "Session resumed");
        Ok(session)
    }

    fn assemble(catalog: Catalog, config: EngineConfig, ability: f64, seed: Option<u64>) -> Self {
        let model = if config.use_dynamic_gain {
            RatingModel::dynamic(config.rating, config.dynamic_gain)
        } else {
            RatingModel::fixed(config.rating)
        };
        let selector = ItemSelector::new(config.selection, seed);
        let distractors =
            DistractorBuilder::new(config.distractor, seed.map(|s| s.wrapping_add(1)));
        Self {
            history: VecDeque::with_capacity(config.history_limit.min(1024)),
            stats: LearnerStats::new(ability),
            config,
            catalog,
            model,
            calibration: None,
            selector,
            distractors,
            ability,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.calibration.is_some() {
            SessionPhase::Calibrating
        } else {
            SessionPhase::Adaptive
        }
    }

    pub fn ability(&self) -> f64 {
        self.ability
    }

    pub fn stats(&self) -> &LearnerStats {
        &self.stats
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model(&self) -> &RatingModel {
        &self.model
    }

    pub fn history(&self) -> impl Iterator<Item = &Attempt> {
        self.history.iter()
    }

    /// Most recent attempts first.
    pub fn recent_history(&self, limit: usize) -> Vec<&Attempt> {
        self.history.iter().rev().take(limit).collect()
    }

    pub fn calibration_status(&self) -> Option<CalibrationStatus> {
        self.calibration.as_ref().map(CalibrationSession::status)
    }

    pub fn next_question(&mut self) -> Result<Question> {
        self.next_question_excluding(&[])
    }

    /// Next question, never drawing an item listed in `excluded`.
    pub fn next_question_excluding(&mut self, excluded: &[&str]) -> Result<Question> {
        let item = match &self.calibration {
            Some(calibration) => {
                let target = calibration.current_difficulty();
                self.selector
                    .select_for_calibration(&self.catalog, target, excluded)
            }
            None => self
                .selector
                .select(&self.catalog, &self.model, self.ability, excluded),
        }
        .ok_or(EngineError::NoItemAvailable)?;

        self.distractors
            .create_question(&self.catalog, item, self.config.distractor.choice_count)
    }

    pub fn submit_answer(&mut self, item_id: &str, correct: bool) -> Result<AnswerOutcome> {
        let index = self
            .catalog
            .index_of(item_id)
            .ok_or_else(|| EngineError::UnknownItem {
                id: item_id.to_string(),
            })?;
        let item_difficulty = self.catalog.items()[index].difficulty();
        let ability_before = ensure_finite("ability", self.ability)?;
        let calibrating = self.calibration.is_some();

        let mut rating = None;
        let mut calibration_status = None;

        if let Some(calibration) = self.calibration.as_mut() {
            let status = calibration.record_answer(correct);
            if let Some(seed) = status.seed_ability {
                self.ability = seed;
                self.calibration = None;
                self.model.reset();
            }
            calibration_status = Some(status);
        } else {
            let update = self.model.update(ability_before, item_difficulty, correct);
            ensure_finite("ability", update.ability)?;
            self.catalog.set_difficulty(index, update.difficulty)?;
            self.ability = update.ability;
            tracing::debug!(
                item_id,
                correct,
                ability = update.ability,
                difficulty = update.difficulty,
                expected = update.expected,
                "Rating updated"
            );
            rating = Some(update);
        }

        self.stats.questions_answered += 1;
        if correct {
            self.stats.correct_answers += 1;
        }
        self.stats.current = self.ability;
        self.stats.highest = self.stats.highest.max(self.ability);

        self.history.push_back(Attempt {
            item_id: item_id.to_string(),
            item_difficulty,
            is_correct: correct,
            ability_before,
            ability_after: self.ability,
            calibration: calibrating,
        });
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }

        Ok(AnswerOutcome {
            item_id: item_id.to_string(),
            is_correct: correct,
            rating,
            calibration: calibration_status,
            ability: self.ability,
            phase: self.phase(),
        })
    }

    /// Start calibration over, keeping the current ability until it completes.
    pub fn recalibrate(&mut self) -> Result<()> {
        self.calibration = Some(CalibrationSession::new(&self.config.calibration)?);
        tracing::info!(ability = self.ability, "Recalibration started");
        Ok(())
    }

    /// New session for the same learner: forget recently shown items.
    pub fn restart(&mut self) {
        self.selector.clear_recent();
        self.history.clear();
    }

    pub fn snapshot(&self) -> LearnerSnapshot {
        LearnerSnapshot {
            ability: self.ability,
            stats: self.stats,
            calibration: self.calibration.as_ref().map(|c| c.state().clone()),
            recent_items: self.selector.recent().to_vec(),
        }
    }

    /// Hand the catalog back, e.g. to merge difficulties into shared storage.
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}
