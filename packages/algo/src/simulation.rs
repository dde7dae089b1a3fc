//! Synthetic learners
//!
//! Plays whole sessions against a learner whose true ability is known, for
//! checking that calibration and the rating loop land where they should.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::rating::expected_correctness;
use crate::session::{QuizSession, SessionPhase};
use crate::types::seeded_rng;

/// Answers correctly with the model's own expected probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticLearner {
    pub true_ability: f64,
}

impl SyntheticLearner {
    pub fn new(true_ability: f64) -> Self {
        Self { true_ability }
    }

    pub fn answer<R: Rng>(&self, difficulty: f64, spread: f64, rng: &mut R) -> bool {
        rng.gen::<f64>() < expected_correctness(self.true_ability, difficulty, spread)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub true_ability: f64,
    /// Ability handed over by calibration, if it finished
    pub calibration_seed: Option<f64>,
    pub calibration_questions: u64,
    pub final_ability: f64,
    /// Ability after every answer
    pub trajectory: Vec<f64>,
    pub accuracy: f64,
}

impl SimulationReport {
    pub fn error(&self) -> f64 {
        self.final_ability - self.true_ability
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: usize,
    pub mean_final_ability: f64,
    pub mean_abs_error: f64,
    pub mean_accuracy: f64,
}

impl BatchSummary {
    pub fn from_reports(reports: &[SimulationReport]) -> Self {
        let runs = reports.len();
        if runs == 0 {
            return Self {
                runs,
                mean_final_ability: 0.0,
                mean_abs_error: 0.0,
                mean_accuracy: 0.0,
            };
        }
        let n = runs as f64;
        Self {
            runs,
            mean_final_ability: reports.iter().map(|r| r.final_ability).sum::<f64>() / n,
            mean_abs_error: reports.iter().map(|r| r.error().abs()).sum::<f64>() / n,
            mean_accuracy: reports.iter().map(|r| r.accuracy).sum::<f64>() / n,
        }
    }
}

/// Run `turns` questions for a new learner, calibration included.
pub fn simulate_session(
    catalog: Catalog,
    config: EngineConfig,
    learner: SyntheticLearner,
    turns: usize,
    seed: u64,
) -> Result<SimulationReport> {
    let session = QuizSession::new(catalog, config, Some(seed))?;
    play(session, learner, turns, seed)
}

/// Run `turns` adaptive questions for a learner whose estimate starts at
/// `start_ability`, skipping calibration.
pub fn simulate_from_ability(
    catalog: Catalog,
    config: EngineConfig,
    learner: SyntheticLearner,
    start_ability: f64,
    turns: usize,
    seed: u64,
) -> Result<SimulationReport> {
    let session = QuizSession::with_ability(catalog, config, start_ability, Some(seed))?;
    play(session, learner, turns, seed)
}

fn play(
    mut session: QuizSession,
    learner: SyntheticLearner,
    turns: usize,
    seed: u64,
) -> Result<SimulationReport> {
    let spread = session.model().config().spread;
    let mut rng: ChaCha8Rng = seeded_rng(Some(seed.wrapping_add(2)));

    let mut trajectory = Vec::with_capacity(turns);
    let mut calibration_seed = None;
    let mut calibration_questions = 0;

    for _ in 0..turns {
        let question = session.next_question()?;
        let correct = learner.answer(question.difficulty, spread, &mut rng);
        let outcome = session.submit_answer(&question.item_id, correct)?;

        if let Some(status) = outcome.calibration {
            calibration_questions += 1;
            if status.is_complete {
                calibration_seed = status.seed_ability;
            }
        }
        trajectory.push(outcome.ability);
    }

    if session.phase() == SessionPhase::Calibrating {
        tracing::debug!(seed, turns, "Simulation ended before calibration finished");
    }

    Ok(SimulationReport {
        seed,
        true_ability: learner.true_ability,
        calibration_seed,
        calibration_questions,
        final_ability: session.ability(),
        trajectory,
        accuracy: session.stats().accuracy(),
    })
}

/// [`simulate_session`] for every seed, in parallel.
pub fn simulate_batch(
    catalog: &Catalog,
    config: &EngineConfig,
    learner: SyntheticLearner,
    turns: usize,
    seeds: &[u64],
) -> Result<Vec<SimulationReport>> {
    seeds
        .par_iter()
        .map(|&seed| simulate_session(catalog.clone(), config.clone(), learner, turns, seed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::ladder_catalog;

    fn catalog() -> Catalog {
        ladder_catalog(120, 700.0, 10.0)
    }

    #[test]
    fn test_learner_answers_follow_expectation() {
        let mut rng = seeded_rng(Some(0));
        let strong = SyntheticLearner::new(1800.0);
        let weak = SyntheticLearner::new(800.0);
        let strong_hits = (0..500).filter(|_| strong.answer(1200.0, 200.0, &mut rng)).count();
        let weak_hits = (0..500).filter(|_| weak.answer(1200.0, 200.0, &mut rng)).count();
        assert!(strong_hits > 450);
        assert!(weak_hits < 50);
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let learner = SyntheticLearner::new(1350.0);
        let a = simulate_session(catalog(), EngineConfig::default(), learner, 30, 9).unwrap();
        let b = simulate_session(catalog(), EngineConfig::default(), learner, 30, 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trajectory.len(), 30);
        assert!(a.calibration_seed.is_some());
        assert!(a.calibration_questions >= 3 && a.calibration_questions <= 8);
    }

    #[test]
    fn test_returning_learner_converges_within_100() {
        // true ability 1400, estimate 1200, 50 turns at gain 25
        let config = EngineConfig::default();
        assert_eq!(config.rating.gain, 25.0);
        let learner = SyntheticLearner::new(1400.0);

        let report = simulate_from_ability(catalog(), config.clone(), learner, 1200.0, 50, 5).unwrap();
        assert_eq!(report.trajectory.len(), 50);
        assert!(report.calibration_seed.is_none());
        assert!(
            (report.final_ability - 1400.0).abs() < 100.0,
            "final {}",
            report.final_ability
        );

        let again = simulate_from_ability(catalog(), config, learner, 1200.0, 50, 5).unwrap();
        assert_eq!(report, again);
    }

    #[test]
    fn test_batch_converges_near_true_ability() {
        let learner = SyntheticLearner::new(1400.0);
        let seeds: Vec<u64> = (0..16).collect();
        let reports =
            simulate_batch(&catalog(), &EngineConfig::default(), learner, 60, &seeds).unwrap();
        assert_eq!(reports.len(), seeds.len());

        let summary = BatchSummary::from_reports(&reports);
        assert_eq!(summary.runs, 16);
        assert!(
            (summary.mean_final_ability - 1400.0).abs() < 150.0,
            "mean final {}",
            summary.mean_final_ability
        );
    }

    #[test]
    fn test_stronger_learner_rates_higher() {
        let seeds: Vec<u64> = (100..108).collect();
        let config = EngineConfig::default();
        let mean = |ability| {
            let reports =
                simulate_batch(&catalog(), &config, SyntheticLearner::new(ability), 50, &seeds)
                    .unwrap();
            BatchSummary::from_reports(&reports).mean_final_ability
        };
        assert!(mean(1650.0) > mean(1000.0) + 200.0);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BatchSummary::from_reports(&[]).runs, 0);
    }
}
