//! Configuration for the Colloquy conversation engine.
//!
//! Maps directly to `colloquy.toml`. Every section and field is optional and
//! falls back to the tuned defaults below.

use serde::{Deserialize, Serialize};

/// Top-level Colloquy configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColloquyConfig {
    /// Turn loop and session settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Success-chance formula.
    #[serde(default)]
    pub chance: ChanceConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ColloquyConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ColloquyError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::ColloquyError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check values that parse but cannot drive a conversation.
    ///
    /// # Errors
    /// Returns `ColloquyError::Config` naming the first bad field.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.engine.validate()?;
        self.chance.validate()
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Turn loop and session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hand size above which the hand reports overflow.
    #[serde(default = "default_7")]
    pub hand_limit: usize,
    /// Turns an NPC tolerates before the conversation ends.
    #[serde(default = "default_12")]
    pub default_patience: u32,
    /// Reshuffle the discard pile into the live pool when a LISTEN runs dry.
    #[serde(default = "default_true")]
    pub reshuffle_on_exhaustion: bool,
    /// Turns a drawn goal card stays in the hand before expiring.
    #[serde(default = "default_3")]
    pub goal_urgency_turns: u32,
    /// Comfort at which a SPEAK moves the NPC one step along the state ladder.
    /// Reaching `-comfort_threshold` moves it one step down.
    #[serde(default = "default_comfort_threshold")]
    pub comfort_threshold: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hand_limit: 7,
            default_patience: 12,
            reshuffle_on_exhaustion: true,
            goal_urgency_turns: 3,
            comfort_threshold: 3,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.comfort_threshold < 1 {
            return Err(crate::ColloquyError::Config(format!(
                "engine.comfort_threshold must be at least 1, got {}",
                self.comfort_threshold
            )));
        }
        Ok(())
    }
}

/// Success-chance formula: `base_rate - weight_penalty * weight + token_bonus * tokens`,
/// clamped to `[min_chance, max_chance]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChanceConfig {
    /// Chance of a weight-0 card with no tokens.
    #[serde(default = "default_70")]
    pub base_rate: i32,
    /// Percentage points lost per point of weight.
    #[serde(default = "default_10")]
    pub weight_penalty: i32,
    /// Percentage points gained per token of the card's connection type.
    #[serde(default = "default_5")]
    pub token_bonus: i32,
    /// Floor of the clamped chance.
    #[serde(default = "default_5")]
    pub min_chance: i32,
    /// Ceiling of the clamped chance.
    #[serde(default = "default_95")]
    pub max_chance: i32,
}

impl Default for ChanceConfig {
    fn default() -> Self {
        Self {
            base_rate: 70,
            weight_penalty: 10,
            token_bonus: 5,
            min_chance: 5,
            max_chance: 95,
        }
    }
}

impl ChanceConfig {
    /// Require `0 <= min_chance <= max_chance <= 100`.
    ///
    /// # Errors
    /// Returns `ColloquyError::Config` when the bounds are out of range or inverted.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(0..=100).contains(&self.min_chance)
            || !(0..=100).contains(&self.max_chance)
            || self.min_chance > self.max_chance
        {
            return Err(crate::ColloquyError::Config(format!(
                "chance bounds must satisfy 0 <= min_chance <= max_chance <= 100, \
                 got min_chance = {} and max_chance = {}",
                self.min_chance, self.max_chance
            )));
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde requires named functions)
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}
fn default_3() -> u32 {
    3
}
fn default_comfort_threshold() -> i32 {
    3
}
fn default_5() -> i32 {
    5
}
fn default_7() -> usize {
    7
}
fn default_10() -> i32 {
    10
}
fn default_12() -> u32 {
    12
}
fn default_70() -> i32 {
    70
}
fn default_95() -> i32 {
    95
}
fn default_log_level() -> String {
    "info".to_string()
}
