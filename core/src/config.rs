//! Recommendation settings.

use serde::{Deserialize, Serialize};

/// Upper bound on the number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Number of items to return, clamped to `1..=MAX_RECOMMENDATIONS`.
    pub top_k: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self { top_k: MAX_RECOMMENDATIONS }
    }
}

impl RecommenderConfig {
    pub fn with_top_k(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn effective_top_k(&self) -> usize {
        self.top_k.clamp(1, MAX_RECOMMENDATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_is_clamped() {
        assert_eq!(RecommenderConfig::default().effective_top_k(), 10);
        assert_eq!(RecommenderConfig::with_top_k(0).effective_top_k(), 1);
        assert_eq!(RecommenderConfig::with_top_k(50).effective_top_k(), 10);
        assert_eq!(RecommenderConfig::with_top_k(3).effective_top_k(), 3);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: RecommenderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.top_k, 10);
    }
}
