//! Static guidance bands for a predicted score.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_score(score: i64) -> Self {
        match score {
            i64::MIN..=2 => RiskBand::Low,
            3..=4 => RiskBand::Moderate,
            _ => RiskBand::High,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            RiskBand::Low => {
                "Mental health appears stable. Keep up a balanced routine, physical \
                 activity and social contact."
            }
            RiskBand::Moderate => {
                "Signs of mild to moderate strain. Prioritize sleep, stress relief and \
                 talking to someone you trust."
            }
            RiskBand::High => {
                "Elevated risk. Reaching out to a mental health professional is \
                 recommended."
            }
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            RiskBand::Low => "low",
            RiskBand::Moderate => "moderate",
            RiskBand::High => "high",
        };
        write!(f, "{}", label)
    }
}
