//! Common Types and Constants
//!
//! Shared data structures used across the rating, calibration, selection and
//! distractor modules.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Constants ====================

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

/// Default learner ability before calibration or persistence supplies one
pub const DEFAULT_ABILITY: f64 = 1200.0;

/// Upper bounds of the easy/medium/hard bands; anything above is expert
pub const BAND_EASY_MAX: f64 = 1200.0;
pub const BAND_MEDIUM_MAX: f64 = 1400.0;
pub const BAND_HARD_MAX: f64 = 1600.0;

// ==================== Randomness ====================

/// Seeded generator for the selectors; falls back to the clock when no seed
/// is given.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    let seed = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    });
    ChaCha8Rng::seed_from_u64(seed)
}

// ==================== Catalog Types ====================

/// Part-of-speech tag, WordNet style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    #[serde(rename = "n")]
    Noun,
    #[serde(rename = "v")]
    Verb,
    #[serde(rename = "a", alias = "s")]
    Adjective,
    #[serde(rename = "r")]
    Adverb,
}

impl PartOfSpeech {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "n" | "noun" => Some(PartOfSpeech::Noun),
            "v" | "verb" => Some(PartOfSpeech::Verb),
            "a" | "s" | "adj" | "adjective" => Some(PartOfSpeech::Adjective),
            "r" | "adv" | "adverb" => Some(PartOfSpeech::Adverb),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "n",
            PartOfSpeech::Verb => "v",
            PartOfSpeech::Adjective => "a",
            PartOfSpeech::Adverb => "r",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Raw catalog record handed over by the ingestion layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(alias = "word")]
    pub identifier: String,
    #[serde(alias = "pos")]
    pub part_of_speech: PartOfSpeech,
    pub definition: String,
    #[serde(default)]
    pub example: String,
    pub difficulty: f64,
}

/// A quiz item. Only the catalog writes `difficulty`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: String,
    pub part_of_speech: PartOfSpeech,
    pub definition: String,
    pub example: String,
    pub(crate) difficulty: f64,
}

impl Item {
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn band(&self) -> DifficultyBand {
        DifficultyBand::for_difficulty(self.difficulty)
    }
}

impl From<CatalogRecord> for Item {
    fn from(record: CatalogRecord) -> Self {
        Self {
            id: record.identifier,
            part_of_speech: record.part_of_speech,
            definition: record.definition,
            example: record.example,
            difficulty: record.difficulty,
        }
    }
}

/// Coarse difficulty band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyBand {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl DifficultyBand {
    pub fn for_difficulty(difficulty: f64) -> Self {
        if difficulty < BAND_EASY_MAX {
            DifficultyBand::Easy
        } else if difficulty < BAND_MEDIUM_MAX {
            DifficultyBand::Medium
        } else if difficulty < BAND_HARD_MAX {
            DifficultyBand::Hard
        } else {
            DifficultyBand::Expert
        }
    }
}

// ==================== Quiz Types ====================

/// Multiple-choice question handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub item_id: String,
    pub part_of_speech: PartOfSpeech,
    /// Definitions in presentation order
    pub choices: Vec<String>,
    pub correct_index: usize,
    pub difficulty: f64,
}

impl Question {
    pub fn is_correct(&self, chosen_index: usize) -> bool {
        chosen_index == self.correct_index
    }
}

/// Result of a single rating update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub ability: f64,
    pub difficulty: f64,
    /// Expected correctness before the update
    pub expected: f64,
    /// Gain used for this update
    pub gain: f64,
}

// ==================== Calibration Types ====================

/// Advisory confidence in a calibration result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable calibration progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub ladder: Vec<f64>,
    pub current_index: usize,
    pub consecutive_correct: u32,
    pub consecutive_wrong: u32,
    pub total_asked: u32,
    pub complete: bool,
}

/// Calibration status exposed to the session layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStatus {
    pub is_complete: bool,
    /// Present once calibration is complete
    pub seed_ability: Option<f64>,
    pub confidence: Confidence,
}

// ==================== Session Types ====================

/// Running learner statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnerStats {
    pub current: f64,
    pub highest: f64,
    pub questions_answered: u64,
    pub correct_answers: u64,
}

impl LearnerStats {
    pub fn new(ability: f64) -> Self {
        Self {
            current: ability,
            highest: ability,
            questions_answered: 0,
            correct_answers: 0,
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.questions_answered == 0 {
            0.0
        } else {
            self.correct_answers as f64 / self.questions_answered as f64
        }
    }
}

/// One answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub item_id: String,
    pub item_difficulty: f64,
    pub is_correct: bool,
    pub ability_before: f64,
    pub ability_after: f64,
    pub calibration: bool,
}
