//! Strategy selection and match configuration
//!
//! Lexical and semantic scores live on different scales, so the acceptance
//! threshold is always read in the scale of the configured strategy:
//!
//! | strategy | score | range | default threshold |
//! |---|---|---|---|
//! | `lexical` | token-sort ratio | 0 – 100 | 80 |
//! | `semantic` | cosine similarity | -1 – 1 | 0.7 |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tasador_core::{Error, Result};

/// Default batch size for embedding calls
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Token-order-insensitive fuzzy string match
    #[default]
    Lexical,
    /// Sentence embeddings compared by cosine similarity
    Semantic,
}

impl Strategy {
    pub fn min_score(self) -> f64 {
        match self {
            Strategy::Lexical => 0.0,
            Strategy::Semantic => -1.0,
        }
    }

    pub fn max_score(self) -> f64 {
        match self {
            Strategy::Lexical => 100.0,
            Strategy::Semantic => 1.0,
        }
    }

    pub fn default_threshold(self) -> f64 {
        match self {
            Strategy::Lexical => 80.0,
            Strategy::Semantic => 0.7,
        }
    }

    pub fn validate_threshold(self, threshold: f64) -> Result<()> {
        if threshold.is_nan() || threshold < self.min_score() || threshold > self.max_score() {
            return Err(Error::InvalidThreshold {
                strategy: self.to_string(),
                value: threshold,
                min: self.min_score(),
                max: self.max_score(),
            });
        }
        Ok(())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "fuzzy" => Ok(Strategy::Lexical),
            "semantic" | "embedding" => Ok(Strategy::Semantic),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Lexical => f.write_str("lexical"),
            Strategy::Semantic => f.write_str("semantic"),
        }
    }
}

/// How query items are matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub strategy: Strategy,
    /// Minimum score, in the strategy's own scale, to accept a match
    pub threshold: f64,
    /// Assign the price of a reference item with the same code before
    /// falling back to text similarity
    #[serde(default)]
    pub exact_code_match: bool,
    #[serde(default = "default_batch_size")]
    pub embed_batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_EMBED_BATCH_SIZE
}

impl MatchConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            threshold: strategy.default_threshold(),
            exact_code_match: false,
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_exact_code_match(mut self, enabled: bool) -> Self {
        self.exact_code_match = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy.validate_threshold(self.threshold)?;
        if self.embed_batch_size == 0 {
            return Err(Error::InvalidConfig("embed_batch_size must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}
