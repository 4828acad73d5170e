// Data-driven evolution configuration.
//
// Every tunable constant of a run lives in `EvolutionConfig`: how many
// select/mutate rounds to run, the population budget that triggers pruning,
// the escalating prune thresholds, the selection floor, and the nested
// `MutationConfig` and `FitnessConfig` groups. `Default` reproduces the
// standard run; a JSON file may override any subset of fields since every
// struct is `#[serde(default)]`.
//
// `validate()` guards against configurations that would make the prune loops
// in `evolution.rs` spin forever (a threshold step of zero never escalates).

use crate::error::ConfigError;
use crate::note::PITCH_MAX;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters for the whole select -> mutate -> prune run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Emit per-node selection and reproduction lines.
    pub verbose: bool,
    /// Select/mutate rounds before the first generation.
    pub pre_evolve_rounds: u32,
    /// Select/mutate rounds inside each generation.
    pub rounds_per_generation: u32,
    /// Node count above which a generation prunes.
    pub max_population: usize,
    /// Node count the final prune shrinks the tree to.
    pub final_population: usize,
    /// Threshold each generation's prune loop starts from.
    pub initial_prune_threshold: f64,
    /// Threshold increment per prune pass inside a generation.
    pub generation_threshold_step: f64,
    /// Threshold increment per pass of the final prune.
    pub final_threshold_step: f64,
    /// Every node is selected with at least this probability.
    pub min_selection_probability: f64,
    pub mutation: MutationConfig,
    pub fitness: FitnessConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            verbose: false,
            pre_evolve_rounds: 4,
            rounds_per_generation: 4,
            max_population: 200,
            final_population: 2,
            initial_prune_threshold: 10.0,
            generation_threshold_step: 1.0,
            final_threshold_step: 0.01,
            min_selection_probability: 0.10,
            mutation: MutationConfig::default(),
            fitness: FitnessConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// Parse from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot terminate or make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.max_population == 0 {
            return invalid("max_population must be at least 1");
        }
        if self.final_population == 0 {
            return invalid("final_population must be at least 1");
        }
        if !positive(self.generation_threshold_step) {
            return invalid("generation_threshold_step must be positive");
        }
        if !positive(self.final_threshold_step) {
            return invalid("final_threshold_step must be positive");
        }
        if !self.initial_prune_threshold.is_finite() {
            return invalid("initial_prune_threshold must be finite");
        }
        if !positive(self.min_selection_probability) || self.min_selection_probability > 1.0 {
            return invalid("min_selection_probability must lie in (0, 1]");
        }
        self.mutation.validate()?;
        self.fitness.validate()
    }
}

fn positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

/// Bounds of the random perturbation applied to each note.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Pitch moves by a uniform integer in `[-max_pitch_step, max_pitch_step]`.
    pub max_pitch_step: u8,
    /// Duration moves by a uniform number of hundredths of a beat in
    /// `[-max, max]`.
    pub max_duration_step_hundredths: u8,
}

impl Default for MutationConfig {
    fn default() -> Self {
        MutationConfig {
            max_pitch_step: 2,
            max_duration_step_hundredths: 10,
        }
    }
}

impl MutationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pitch_step > PITCH_MAX {
            return Err(ConfigError::Invalid(format!(
                "max_pitch_step {} exceeds the pitch range",
                self.max_pitch_step
            )));
        }
        Ok(())
    }
}

/// Parameters of the harmonic fitness model.
///
/// Each reward or penalty is a uniform integer in `[0, max)`, so scoring the
/// same motif twice generally gives two different answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Magnitude bound for in-scale rewards and out-of-scale penalties.
    pub scale_reward_max: u32,
    /// Magnitude bound for consonant/dissonant interval terms.
    pub interval_reward_max: u32,
    /// Magnitude bound for each out-of-range penalty.
    pub range_penalty_max: u32,
    /// Inclusive pitch range that draws no penalty.
    pub acceptable_pitch: [u8; 2],
    /// Inclusive pitch range outside which a second penalty applies.
    pub extreme_pitch: [u8; 2],
    /// Raw harmonic score mapped to 0.
    pub raw_worst: f64,
    /// Raw harmonic score mapped to 100.
    pub raw_best: f64,
    /// Clamp the rescaled score into [0, 100].
    pub clamp: bool,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        FitnessConfig {
            scale_reward_max: 10,
            interval_reward_max: 10,
            range_penalty_max: 5,
            acceptable_pitch: [48, 84], // C3-C6
            extreme_pitch: [36, 96],    // C2-C7
            raw_worst: -100.0,
            raw_best: 100.0,
            clamp: true,
        }
    }
}

impl FitnessConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let [lo, hi] = self.acceptable_pitch;
        let [xlo, xhi] = self.extreme_pitch;
        if lo > hi || xlo > xhi {
            return Err(ConfigError::Invalid("pitch ranges must have min <= max".into()));
        }
        if xlo > lo || xhi < hi {
            return Err(ConfigError::Invalid(
                "extreme_pitch must contain acceptable_pitch".into(),
            ));
        }
        if !positive(self.raw_best - self.raw_worst) {
            return Err(ConfigError::Invalid("raw_best must exceed raw_worst".into()));
        }
        Ok(())
    }
}
