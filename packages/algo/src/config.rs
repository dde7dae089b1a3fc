use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::sanitize::has_invalid_values;
use crate::types::DEFAULT_ABILITY;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    /// K-factor: step size applied to the prediction error
    pub gain: f64,
    /// Rating disparity; a gap of `2 * spread` shifts odds by a factor of ten
    pub spread: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            gain: 25.0,
            spread: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicGainConfig {
    pub base_gain: f64,
    pub min_gain: f64,
    pub max_gain: f64,
    pub window: usize,
    /// Per-sample trend magnitude above which the learner is still moving
    pub unit_threshold: f64,
}

impl Default for DynamicGainConfig {
    fn default() -> Self {
        Self {
            base_gain: 20.0,
            min_gain: 10.0,
            max_gain: 40.0,
            window: 5,
            unit_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub exploration_rate: f64,
    pub tolerance: f64,
    pub recent_window: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            exploration_rate: 0.1,
            tolerance: 100.0,
            recent_window: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistractorConfig {
    pub tight_band: f64,
    pub wide_band: f64,
    pub choice_count: usize,
}

impl Default for DistractorConfig {
    fn default() -> Self {
        Self {
            tight_band: 200.0,
            wide_band: 300.0,
            choice_count: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub ladder: Vec<f64>,
    /// Same-direction answers needed to move one rung
    pub step_after: u32,
    /// Same-direction answers that end calibration
    pub complete_after: u32,
    pub max_questions: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            ladder: vec![1000.0, 1150.0, 1300.0, 1450.0, 1600.0],
            step_after: 2,
            complete_after: 3,
            max_questions: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_ability: f64,
    pub rating: RatingConfig,
    pub use_dynamic_gain: bool,
    pub dynamic_gain: DynamicGainConfig,
    pub selection: SelectionConfig,
    pub distractor: DistractorConfig,
    pub calibration: CalibrationConfig,
    /// Attempts kept in the in-memory session history
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_ability: DEFAULT_ABILITY,
            rating: RatingConfig::default(),
            use_dynamic_gain: false,
            dynamic_gain: DynamicGainConfig::default(),
            selection: SelectionConfig::default(),
            distractor: DistractorConfig::default(),
            calibration: CalibrationConfig::default(),
            history_limit: 200,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with the process environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::overlay_env(Self::default())
    }

    /// Same as [`EngineConfig::from_env`] but loads the given dotenv file first.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::from_path(path.as_ref()).map_err(|err| {
            EngineError::InvalidConfig(format!(
                "failed to load {}: {err}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self::overlay_env(Self::default()))
    }

    fn overlay_env(mut config: Self) -> Self {
        if let Some(val) = env_parse::<f64>("INITIAL_USER_RATING") {
            config.initial_ability = val;
        }
        if let Some(val) = env_parse::<f64>("INITIAL_K_FACTOR") {
            config.rating.gain = val;
        }
        if let Some(val) = env_parse::<f64>("ELO_BETA") {
            config.rating.spread = val;
        }
        if let Some(val) = env_parse::<bool>("DYNAMIC_K_FACTOR") {
            config.use_dynamic_gain = val;
        }
        if let Some(val) = env_parse::<f64>("EXPLORATION_RATE") {
            config.selection.exploration_rate = val;
        }
        if let Some(val) = env_parse::<f64>("RATING_TOLERANCE") {
            config.selection.tolerance = val;
        }
        if let Some(val) = env_parse::<usize>("RECENT_WORDS_WINDOW") {
            config.selection.recent_window = val;
        }
        if let Some(val) = env_parse::<usize>("CHOICE_COUNT") {
            config.distractor.choice_count = val;
        }
        if let Ok(raw) = std::env::var("CALIBRATION_LEVELS") {
            let levels: std::result::Result<Vec<f64>, _> =
                raw.split(',').map(|s| s.trim().parse::<f64>()).collect();
            match levels {
                Ok(levels) => config.calibration.ladder = levels,
                Err(err) => {
                    tracing::warn!(error = %err, value = %raw, "Ignoring CALIBRATION_LEVELS")
                }
            }
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        let numbers = [
            self.initial_ability,
            self.rating.gain,
            self.rating.spread,
            self.dynamic_gain.base_gain,
            self.dynamic_gain.min_gain,
            self.dynamic_gain.max_gain,
            self.dynamic_gain.unit_threshold,
            self.selection.exploration_rate,
            self.selection.tolerance,
            self.distractor.tight_band,
            self.distractor.wide_band,
        ];
        if has_invalid_values(&numbers) {
            return Err(EngineError::InvalidConfig(
                "numeric settings must be finite".to_string(),
            ));
        }
        if self.rating.gain <= 0.0 || self.rating.spread <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "rating gain and spread must be positive".to_string(),
            ));
        }
        let dg = &self.dynamic_gain;
        if dg.min_gain <= 0.0 || dg.min_gain > dg.max_gain || dg.window < 2 {
            return Err(EngineError::InvalidConfig(
                "dynamic gain needs 0 < min_gain <= max_gain and window >= 2".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.selection.exploration_rate) {
            return Err(EngineError::InvalidConfig(format!(
                "exploration_rate must lie in [0, 1], got {}",
                self.selection.exploration_rate
            )));
        }
        if self.selection.tolerance <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "tolerance must be positive".to_string(),
            ));
        }
        if self.distractor.tight_band < 0.0 || self.distractor.wide_band < self.distractor.tight_band
        {
            return Err(EngineError::InvalidConfig(
                "distractor bands must satisfy 0 <= tight_band <= wide_band".to_string(),
            ));
        }
        if self.distractor.choice_count < 2 {
            return Err(EngineError::InvalidConfig(
                "choice_count must be at least 2".to_string(),
            ));
        }
        crate::calibration::validate_ladder(&self.calibration.ladder)?;
        let calibration = &self.calibration;
        if calibration.step_after == 0
            || calibration.complete_after == 0
            || calibration.max_questions == 0
        {
            return Err(EngineError::InvalidConfig(
                "calibration thresholds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
