//! Cold-start calibration
//!
//! Walks a ladder of calibration difficulties: two same-direction answers in a row
//! move one rung, three in a row (or the question budget) end the walk. The
//! rung the walk ends on becomes the learner's seed ability.

use crate::config::CalibrationConfig;
use crate::error::{EngineError, Result};
use crate::sanitize::ensure_all_finite;
use crate::types::{CalibrationState, CalibrationStatus, Confidence};

/// Questions below which the result is only a rough guess
const LOW_CONFIDENCE_QUESTIONS: u32 = 5;

pub(crate) fn validate_ladder(ladder: &[f64]) -> Result<()> {
    if ladder.len() < 2 {
        return Err(EngineError::DegenerateLadder { len: ladder.len() });
    }
    ensure_all_finite("calibration ladder", ladder)?;
    if ladder.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(EngineError::InvalidConfig(
            "calibration ladder must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

/// Start at the middle rung, the lower one for even ladders.
fn initial_state(ladder: &[f64]) -> CalibrationState {
    CalibrationState {
        current_index: (ladder.len() - 1) / 2,
        ladder: ladder.to_vec(),
        consecutive_correct: 0,
        consecutive_wrong: 0,
        total_asked: 0,
        complete: false,
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationSession {
    step_after: u32,
    complete_after: u32,
    max_questions: u32,
    state: CalibrationState,
}

impl CalibrationSession {
    pub fn new(config: &CalibrationConfig) -> Result<Self> {
        validate_ladder(&config.ladder)?;
        let state = initial_state(&config.ladder);
        Ok(Self::from_parts(config, state))
    }

    /// Shorthand for a ladder with the default thresholds.
    pub fn with_ladder(ladder: Vec<f64>) -> Result<Self> {
        Self::new(&CalibrationConfig {
            ladder,
            ..CalibrationConfig::default()
        })
    }

    /// Resume from a persisted state.
    pub fn from_state(config: &CalibrationConfig, state: CalibrationState) -> Result<Self> {
        validate_ladder(&state.ladder)?;
        if state.current_index >= state.ladder.len() {
            return Err(EngineError::InvalidConfig(format!(
                "calibration index {} outside ladder of {}",
                state.current_index,
                state.ladder.len()
            )));
        }
        Ok(Self::from_parts(config, state))
    }

    fn from_parts(config: &CalibrationConfig, state: CalibrationState) -> Self {
        Self {
            step_after: config.step_after,
            complete_after: config.complete_after,
            max_questions: config.max_questions,
            state,
        }
    }

    /// Difficulty of the next calibration question.
    pub fn current_difficulty(&self) -> f64 {
        self.state.ladder[self.state.current_index]
    }

    pub fn record_answer(&mut self, correct: bool) -> CalibrationStatus {
        if self.state.complete {
            return self.status();
        }

        let state = &mut self.state;
        state.total_asked += 1;
        let from = state.current_index;

        if correct {
            state.consecutive_correct += 1;
            state.consecutive_wrong = 0;
            if state.consecutive_correct >= self.step_after
                && state.current_index < state.ladder.len() - 1
            {
                state.current_index += 1;
                state.consecutive_correct = 0;
            }
        } else {
            state.consecutive_wrong += 1;
            state.consecutive_correct = 0;
            if state.consecutive_wrong >= self.step_after && state.current_index > 0 {
                state.current_index -= 1;
                state.consecutive_wrong = 0;
            }
        }

        if state.current_index != from {
            tracing::info!(
                from = state.ladder[from],
                to = state.ladder[state.current_index],
                asked = state.total_asked,
                "Calibration level moved"
            );
        }

        if state.consecutive_correct >= self.complete_after
            || state.consecutive_wrong >= self.complete_after
            || state.total_asked >= self.max_questions
        {
            state.complete = true;
            tracing::info!(
                seed_ability = state.ladder[state.current_index],
                asked = state.total_asked,
                "Calibration complete"
            );
        }

        self.status()
    }

    pub fn is_complete(&self) -> bool {
        self.state.complete
    }

    /// Seed ability, available once calibration is complete.
    pub fn seed_ability(&self) -> Option<f64> {
        self.state.complete.then(|| self.current_difficulty())
    }

    pub fn confidence(&self) -> Confidence {
        let state = &self.state;
        if state.total_asked < LOW_CONFIDENCE_QUESTIONS {
            Confidence::Low
        } else if state.consecutive_correct >= self.complete_after
            || state.consecutive_wrong >= self.complete_after
        {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }

    pub fn status(&self) -> CalibrationStatus {
        CalibrationStatus {
            is_complete: self.is_complete(),
            seed_ability: self.seed_ability(),
            confidence: self.confidence(),
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }
}

impl Default for CalibrationSession {
    fn default() -> Self {
        let config = CalibrationConfig::default();
        let state = initial_state(&config.ladder);
        Self::from_parts(&config, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_level() -> CalibrationSession {
        CalibrationSession::with_ladder(vec![1000.0, 1200.0, 1400.0]).unwrap()
    }

    #[test]
    fn test_starts_at_middle() {
        assert_eq!(three_level().current_difficulty(), 1200.0);
        assert_eq!(CalibrationSession::default().current_difficulty(), 1300.0);
    }

    #[test]
    fn test_even_ladder_starts_at_lower_middle() {
        let cal = CalibrationSession::with_ladder(vec![900.0, 1100.0, 1300.0, 1500.0]).unwrap();
        assert_eq!(cal.current_difficulty(), 1100.0);
    }

    #[test]
    fn test_degenerate_ladders_rejected() {
        assert!(matches!(
            CalibrationSession::with_ladder(vec![]),
            Err(EngineError::DegenerateLadder { len: 0 })
        ));
        assert!(matches!(
            CalibrationSession::with_ladder(vec![1200.0]),
            Err(EngineError::DegenerateLadder { len: 1 })
        ));
    }

    #[test]
    fn test_unordered_or_non_finite_ladder_rejected() {
        assert!(CalibrationSession::with_ladder(vec![1200.0, 1000.0]).is_err());
        assert!(matches!(
            CalibrationSession::with_ladder(vec![1000.0, f64::NAN]),
            Err(EngineError::NonFiniteInput { .. })
        ));
    }

    #[test]
    fn test_moves_up_on_two_correct() {
        let mut cal = three_level();
        cal.record_answer(true);
        assert_eq!(cal.current_difficulty(), 1200.0);
        cal.record_answer(true);
        assert_eq!(cal.current_difficulty(), 1400.0);
        assert_eq!(cal.state().consecutive_correct, 0);
        assert!(!cal.is_complete());
    }

    #[test]
    fn test_moves_down_on_two_wrong() {
        let mut cal = three_level();
        cal.record_answer(false);
        cal.record_answer(false);
        assert_eq!(cal.current_difficulty(), 1000.0);
        assert!(!cal.is_complete());
    }

    #[test]
    fn test_completes_after_three_correct_at_top() {
        let mut cal = three_level();
        cal.record_answer(true);
        cal.record_answer(true);
        for _ in 0..2 {
            assert!(!cal.record_answer(true).is_complete);
        }
        let status = cal.record_answer(true);
        assert!(status.is_complete);
        assert_eq!(status.seed_ability, Some(1400.0));
        assert_eq!(status.confidence, Confidence::High);
    }

    #[test]
    fn test_completes_after_three_wrong_at_floor() {
        let mut cal = three_level();
        cal.record_answer(false);
        cal.record_answer(false);
        cal.record_answer(false);
        cal.record_answer(false);
        let status = cal.record_answer(false);
        assert!(status.is_complete);
        assert_eq!(status.seed_ability, Some(1000.0));
    }

    #[test]
    fn test_three_same_direction_from_resumed_top_index() {
        let config = CalibrationConfig {
            ladder: vec![1000.0, 1200.0, 1400.0],
            ..CalibrationConfig::default()
        };
        let state = CalibrationState {
            ladder: config.ladder.clone(),
            current_index: 2,
            consecutive_correct: 0,
            consecutive_wrong: 0,
            total_asked: 0,
            complete: false,
        };
        let mut cal = CalibrationSession::from_state(&config, state).unwrap();
        cal.record_answer(true);
        cal.record_answer(true);
        cal.record_answer(true);
        assert!(cal.is_complete());
        // only three questions asked
        assert_eq!(cal.confidence(), Confidence::Low);
    }

    #[test]
    fn test_completes_after_max_questions() {
        let mut cal = CalibrationSession::default();
        for i in 0..7 {
            assert!(!cal.record_answer(i % 2 == 0).is_complete);
        }
        let status = cal.record_answer(false);
        assert!(status.is_complete);
        assert_eq!(cal.state().total_asked, 8);
        assert_eq!(status.confidence, Confidence::Medium);
    }

    #[test]
    fn test_confidence_levels() {
        let mut cal = CalibrationSession::default();
        cal.record_answer(true);
        assert_eq!(cal.confidence(), Confidence::Low);
        assert_eq!(cal.seed_ability(), None);

        for correct in [false, true, false, true] {
            cal.record_answer(correct);
        }
        assert_eq!(cal.confidence(), Confidence::Medium);
    }

    #[test]
    fn test_answers_after_completion_are_ignored() {
        let mut cal = three_level();
        for i in 0..8 {
            cal.record_answer(i % 2 == 0);
        }
        assert!(cal.is_complete());
        let before = cal.state().clone();
        cal.record_answer(true);
        assert_eq!(cal.state(), &before);
    }

    #[test]
    fn test_level_moves_and_completion_log_at_info() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl Write for Buffer {
            fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(bytes);
                Ok(bytes.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut cal = three_level();
            for _ in 0..5 {
                cal.record_answer(true);
            }
            assert!(cal.is_complete());
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Calibration level moved"), "{output}");
        assert!(output.contains("Calibration complete"), "{output}");
    }

    #[test]
    fn test_from_state_rejects_out_of_range_index() {
        let config = CalibrationConfig::default();
        let mut state = CalibrationSession::new(&config).unwrap().state().clone();
        state.current_index = 99;
        assert!(CalibrationSession::from_state(&config, state).is_err());
    }
}
