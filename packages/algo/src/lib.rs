//! # vocab-trainer-algo - adaptive vocabulary testing engine
//!
//! Pure Rust core of an adaptive vocabulary quiz:
//!
//! - **Rating** - Elo-style paired-comparison updates of learner ability and
//!   item difficulty, with fixed or trend-driven gain
//! - **Calibration** - cold-start ladder walk that seeds a new learner's ability
//! - **Selection** - most-informative item near the learner, with exploration
//!   and a recency window
//! - **Distractors** - plausible wrong definitions with tiered fallbacks
//!
//! ## Modules
//!
//! - [`rating`] - expected correctness, information value, rating updates
//! - [`calibration`] - ladder stepper and confidence
//! - [`selection`] - item selector and recently-shown window
//! - [`distractor`] - distractor builder and question assembly
//! - [`catalog`] - indexed item storage, the only writer of difficulties
//! - [`session`] - calibration → adaptive quiz loop for one learner
//! - [`simulation`] - synthetic learners for offline evaluation
//! - [`config`] - engine settings, env/dotenv overlay
//! - [`logging`] - tracing subscriber setup
//! - [`sanitize`] - numeric validation
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use vocab_trainer_algo::{Catalog, EngineConfig, QuizSession};
//!
//! let json = r#"[
//!     {"word": "abate", "pos": "v", "definition": "become less intense", "difficulty": 1250},
//!     {"word": "candid", "pos": "a", "definition": "truthful and straightforward", "difficulty": 1180},
//!     {"word": "dearth", "pos": "n", "definition": "a scarcity or lack", "difficulty": 1320},
//!     {"word": "ebullient", "pos": "a", "definition": "cheerful and full of energy", "difficulty": 1410}
//! ]"#;
//! let catalog = Catalog::from_json_str(json).unwrap();
//! let mut session = QuizSession::with_ability(catalog, EngineConfig::default(), 1250.0, Some(7)).unwrap();
//!
//! let question = session.next_question().unwrap();
//! assert_eq!(question.choices.len(), 4);
//! let outcome = session.submit_answer(&question.item_id, question.is_correct(0)).unwrap();
//! assert!(outcome.rating.is_some());
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod calibration;
pub mod catalog;
pub mod config;
pub mod distractor;
pub mod error;
pub mod logging;
pub mod rating;
pub mod sanitize;
pub mod selection;
pub mod session;
pub mod simulation;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use calibration::CalibrationSession;
pub use catalog::Catalog;
pub use config::{
    CalibrationConfig, DistractorConfig, DynamicGainConfig, EngineConfig, RatingConfig,
    SelectionConfig,
};
pub use distractor::DistractorBuilder;
pub use error::{EngineError, Result};
pub use rating::{binary_entropy, expected_correctness, FixedGain, GainPolicy, RatingModel, TrendGain};
pub use selection::{ItemSelector, RecentlyShown};
pub use session::{AnswerOutcome, LearnerSnapshot, QuizSession, SessionPhase};
pub use simulation::{
    simulate_batch, simulate_from_ability, simulate_session, BatchSummary, SimulationReport,
    SyntheticLearner,
};
