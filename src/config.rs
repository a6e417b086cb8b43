// Configuration module for reading Snake.toml
// Every tunable number used by the search, the evaluator and the bot lives here

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::EngineError;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub evaluation: EvaluationConfig,
    pub debug: DebugConfig,
}

/// Turn budget constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Budget used when the game does not report its own timeout
    pub response_time_budget_ms: u64,
    /// Safety margin subtracted from every turn's deadline
    pub network_overhead_ms: u64,
    /// Share of (budget - latency) handed to the search
    pub budget_fraction: f64,
}

impl TimingConfig {
    /// Milliseconds the search may spend given the turn budget and the latency already consumed
    pub fn search_budget_ms(&self, budget_ms: u64, latency_ms: u64) -> u64 {
        let available = budget_ms.saturating_sub(latency_ms) as f64 * self.budget_fraction;
        (available.max(0.0) as u64).saturating_sub(self.network_overhead_ms)
    }
}

/// Search shape constants
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub iterative_deepening: bool,
    pub pv_ordering: bool,
}

/// Evaluation weights, see Evaluator for how each one is applied
#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationConfig {
    // Health danger
    pub health_critical_threshold: i32,
    pub health_critical_penalty: f64,
    pub health_low_threshold: i32,
    pub health_low_penalty: f64,

    // Growth and space
    pub length_weight: f64,
    pub space_weight: f64,

    // Entrapment cutoffs
    pub trap_severe_fraction: f64,
    pub trap_severe_score: f64,
    pub trap_fraction: f64,
    pub trap_score: f64,

    // Food
    pub food_weight: f64,

    // Walls
    pub edge_penalty: f64,
    pub edge_trap_bonus: f64,
    pub edge_trapped_penalty: f64,

    // Head-to-head
    pub head_to_head_distance: i32,
    pub head_to_head_bonus: f64,
    pub head_to_head_penalty: f64,
    pub hunt_distance: i32,
    pub hunt_weight: f64,

    // Survival
    pub turn_weight: f64,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(EngineError::ConfigRead)?;
        toml::from_str(&contents).map_err(EngineError::ConfigParse)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, EngineError> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 500,
                network_overhead_ms: 60,
                budget_fraction: 0.8,
            },
            search: SearchConfig {
                max_depth: 5,
                iterative_deepening: true,
                pv_ordering: true,
            },
            evaluation: EvaluationConfig {
                health_critical_threshold: 15,
                health_critical_penalty: -400.0,
                health_low_threshold: 40,
                health_low_penalty: -100.0,
                length_weight: 100.0,
                space_weight: 2.0,
                trap_severe_fraction: 0.5,
                trap_severe_score: -5000.0,
                trap_fraction: 1.0,
                trap_score: -2500.0,
                food_weight: 40.0,
                edge_penalty: -25.0,
                edge_trap_bonus: 300.0,
                edge_trapped_penalty: -300.0,
                head_to_head_distance: 2,
                head_to_head_bonus: 200.0,
                head_to_head_penalty: -800.0,
                hunt_distance: 4,
                hunt_weight: 10.0,
                turn_weight: 0.1,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_budget_calculation() {
        let config = Config::default_hardcoded();
        // (500 - 0) * 0.8 - 60
        assert_eq!(config.timing.search_budget_ms(500, 0), 340);
        // (500 - 100) * 0.8 - 60
        assert_eq!(config.timing.search_budget_ms(500, 100), 260);
    }

    #[test]
    fn test_search_budget_saturates() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.search_budget_ms(50, 400), 0);
        assert_eq!(config.timing.search_budget_ms(70, 0), 0);
    }

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.max_depth, 5);
        assert_eq!(config.evaluation.space_weight, 2.0);
    }

    #[test]
    fn test_snake_toml_can_be_parsed() {
        let result = Config::from_file("Snake.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Snake.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Snake.toml").expect("Snake.toml should be parseable");
        let hardcoded = Config::default_hardcoded();

        // Timing
        assert_eq!(
            file_config.timing.response_time_budget_ms,
            hardcoded.timing.response_time_budget_ms
        );
        assert_eq!(
            file_config.timing.network_overhead_ms,
            hardcoded.timing.network_overhead_ms
        );
        assert_eq!(
            file_config.timing.budget_fraction,
            hardcoded.timing.budget_fraction
        );

        // Search
        assert_eq!(file_config.search.max_depth, hardcoded.search.max_depth);
        assert_eq!(
            file_config.search.iterative_deepening,
            hardcoded.search.iterative_deepening
        );
        assert_eq!(file_config.search.pv_ordering, hardcoded.search.pv_ordering);

        // Evaluation
        let (f, h) = (&file_config.evaluation, &hardcoded.evaluation);
        assert_eq!(f.health_critical_threshold, h.health_critical_threshold);
        assert_eq!(f.health_critical_penalty, h.health_critical_penalty);
        assert_eq!(f.health_low_threshold, h.health_low_threshold);
        assert_eq!(f.health_low_penalty, h.health_low_penalty);
        assert_eq!(f.length_weight, h.length_weight);
        assert_eq!(f.space_weight, h.space_weight);
        assert_eq!(f.trap_severe_fraction, h.trap_severe_fraction);
        assert_eq!(f.trap_severe_score, h.trap_severe_score);
        assert_eq!(f.trap_fraction, h.trap_fraction);
        assert_eq!(f.trap_score, h.trap_score);
        assert_eq!(f.food_weight, h.food_weight);
        assert_eq!(f.edge_penalty, h.edge_penalty);
        assert_eq!(f.edge_trap_bonus, h.edge_trap_bonus);
        assert_eq!(f.edge_trapped_penalty, h.edge_trapped_penalty);
        assert_eq!(f.head_to_head_distance, h.head_to_head_distance);
        assert_eq!(f.head_to_head_bonus, h.head_to_head_bonus);
        assert_eq!(f.head_to_head_penalty, h.head_to_head_penalty);
        assert_eq!(f.hunt_distance, h.hunt_distance);
        assert_eq!(f.hunt_weight, h.hunt_weight);
        assert_eq!(f.turn_weight, h.turn_weight);

        // Debug
        assert_eq!(file_config.debug.enabled, hardcoded.debug.enabled);
        assert_eq!(
            file_config.debug.log_file_path,
            hardcoded.debug.log_file_path
        );
    }

    #[test]
    fn test_threshold_ordering() {
        let config = Config::load_or_default();
        let eval = &config.evaluation;
        assert!(eval.health_critical_threshold < eval.health_low_threshold);
        assert!(eval.health_critical_penalty < eval.health_low_penalty);
        assert!(eval.trap_severe_fraction < eval.trap_fraction);
        assert!(eval.trap_severe_score < eval.trap_score);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(matches!(result, Err(EngineError::ConfigRead(_))));
    }
}
