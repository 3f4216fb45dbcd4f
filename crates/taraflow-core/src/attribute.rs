//! Stage-1 output: how strongly a security property applies to an asset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("relevance score {0} is out of range, expected 0..=5")]
pub struct InvalidScore(pub u8);

/// Result of the attribute-analysis stage for one (asset, property) unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAssessment {
    /// 0 means the property is irrelevant for the asset, 5 highly relevant.
    pub relevance_score: u8,
    pub rationale: String,
}

impl PropertyAssessment {
    pub fn validate(&self) -> Result<(), InvalidScore> {
        if self.relevance_score > 5 {
            return Err(InvalidScore(self.relevance_score));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_range() {
        let ok = PropertyAssessment {
            relevance_score: 5,
            rationale: "externally reachable interface".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = PropertyAssessment {
            relevance_score: 9,
            rationale: String::new(),
        };
        assert_eq!(bad.validate(), Err(InvalidScore(9)));
    }
}
