//! Stage-3 output: threat scenarios, attack paths, and attack feasibility.
//!
//! The attack-potential dimensions and their weights follow the ISO 21434
//! attack-feasibility table: each dimension contributes an additive
//! difficulty score, and the summed difficulty maps onto a rating.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeConsuming {
    #[serde(rename = "no_more_than_1d", alias = "<=1d")]
    NoMoreThanOneDay,
    #[serde(rename = "no_more_than_1w", alias = "<=1w")]
    NoMoreThanOneWeek,
    #[serde(rename = "no_more_than_1m", alias = "<=1m")]
    NoMoreThanOneMonth,
    #[serde(rename = "no_more_than_6m", alias = "<=6m")]
    NoMoreThanSixMonths,
    #[serde(rename = "more_than_6m", alias = ">6m")]
    MoreThanSixMonths,
}

impl TimeConsuming {
    pub fn weight(self) -> u8 {
        match self {
            TimeConsuming::NoMoreThanOneDay => 0,
            TimeConsuming::NoMoreThanOneWeek => 1,
            TimeConsuming::NoMoreThanOneMonth => 4,
            TimeConsuming::NoMoreThanSixMonths => 17,
            TimeConsuming::MoreThanSixMonths => 19,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeConsuming::NoMoreThanOneDay => "<=1d",
            TimeConsuming::NoMoreThanOneWeek => "<=1w",
            TimeConsuming::NoMoreThanOneMonth => "<=1m",
            TimeConsuming::NoMoreThanSixMonths => "<=6m",
            TimeConsuming::MoreThanSixMonths => ">6m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expertise {
    Layman,
    Proficient,
    Expert,
    #[serde(rename = "multiple expert", alias = "multiple_expert")]
    MultipleExpert,
}

impl Expertise {
    pub fn weight(self) -> u8 {
        match self {
            Expertise::Layman => 0,
            Expertise::Proficient => 3,
            Expertise::Expert => 6,
            Expertise::MultipleExpert => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Expertise::Layman => "layman",
            Expertise::Proficient => "proficient",
            Expertise::Expert => "expert",
            Expertise::MultipleExpert => "multiple expert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeOfToe {
    Public,
    Restricted,
    Confidential,
    #[serde(rename = "strictly confidential", alias = "strictly_confidential")]
    StrictlyConfidential,
}

impl KnowledgeOfToe {
    pub fn weight(self) -> u8 {
        match self {
            KnowledgeOfToe::Public => 0,
            KnowledgeOfToe::Restricted => 3,
            KnowledgeOfToe::Confidential => 7,
            KnowledgeOfToe::StrictlyConfidential => 11,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KnowledgeOfToe::Public => "public",
            KnowledgeOfToe::Restricted => "restricted",
            KnowledgeOfToe::Confidential => "confidential",
            KnowledgeOfToe::StrictlyConfidential => "strictly confidential",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowOfOpportunity {
    Unlimited,
    Easy,
    Moderate,
    Difficult,
}

impl WindowOfOpportunity {
    pub fn weight(self) -> u8 {
        match self {
            WindowOfOpportunity::Unlimited => 0,
            WindowOfOpportunity::Easy => 1,
            WindowOfOpportunity::Moderate => 4,
            WindowOfOpportunity::Difficult => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WindowOfOpportunity::Unlimited => "unlimited",
            WindowOfOpportunity::Easy => "easy",
            WindowOfOpportunity::Moderate => "moderate",
            WindowOfOpportunity::Difficult => "difficult",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Equipment {
    Standard,
    // "specialied" shows up in the wild as a common misspelling in TARA
    // worksheets, accept it on input.
    #[serde(alias = "specialied")]
    Specialized,
    Bespoke,
    #[serde(rename = "multiple bespoke", alias = "multiple_bespoke")]
    MultipleBespoke,
}

impl Equipment {
    pub fn weight(self) -> u8 {
        match self {
            Equipment::Standard => 0,
            Equipment::Specialized => 4,
            Equipment::Bespoke => 7,
            Equipment::MultipleBespoke => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Equipment::Standard => "standard",
            Equipment::Specialized => "specialized",
            Equipment::Bespoke => "bespoke",
            Equipment::MultipleBespoke => "multiple bespoke",
        }
    }
}

/// Feasibility of an attack path, derived from its summed difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackFeasibilityRating {
    #[serde(rename = "verylow", alias = "very_low")]
    VeryLow,
    Low,
    Medium,
    High,
}

impl AttackFeasibilityRating {
    pub fn as_str(self) -> &'static str {
        match self {
            AttackFeasibilityRating::VeryLow => "verylow",
            AttackFeasibilityRating::Low => "low",
            AttackFeasibilityRating::Medium => "medium",
            AttackFeasibilityRating::High => "high",
        }
    }
}

/// Result of the threat-scenario stage: one threat scenario with one
/// assessed attack path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatScenarioAttackFeasibility {
    pub threat_scenario: String,
    pub attack_path: String,
    pub time_consuming: TimeConsuming,
    pub expertise: Expertise,
    pub knowledge_about_toe: KnowledgeOfToe,
    pub window_of_opportunity: WindowOfOpportunity,
    pub equipment: Equipment,
}

impl ThreatScenarioAttackFeasibility {
    /// Summed attack-potential difficulty across all five dimensions.
    pub fn difficulty(&self) -> u8 {
        self.time_consuming.weight()
            + self.expertise.weight()
            + self.knowledge_about_toe.weight()
            + self.window_of_opportunity.weight()
            + self.equipment.weight()
    }

    pub fn feasibility_rating(&self) -> AttackFeasibilityRating {
        match self.difficulty() {
            25.. => AttackFeasibilityRating::VeryLow,
            20..=24 => AttackFeasibilityRating::Low,
            14..=19 => AttackFeasibilityRating::Medium,
            _ => AttackFeasibilityRating::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threat(
        time: TimeConsuming,
        expertise: Expertise,
        knowledge: KnowledgeOfToe,
        window: WindowOfOpportunity,
        equipment: Equipment,
    ) -> ThreatScenarioAttackFeasibility {
        ThreatScenarioAttackFeasibility {
            threat_scenario: "Spoofed diagnostic session".to_string(),
            attack_path: "OBD port -> UDS session -> reflash".to_string(),
            time_consuming: time,
            expertise,
            knowledge_about_toe: knowledge,
            window_of_opportunity: window,
            equipment,
        }
    }

    #[test]
    fn test_difficulty_is_additive() {
        let t = threat(
            TimeConsuming::NoMoreThanOneMonth,
            Expertise::Expert,
            KnowledgeOfToe::Restricted,
            WindowOfOpportunity::Moderate,
            Equipment::Specialized,
        );
        assert_eq!(t.difficulty(), 4 + 6 + 3 + 4 + 4);
    }

    #[test]
    fn test_rating_thresholds() {
        let easy = threat(
            TimeConsuming::NoMoreThanOneDay,
            Expertise::Layman,
            KnowledgeOfToe::Public,
            WindowOfOpportunity::Unlimited,
            Equipment::Standard,
        );
        assert_eq!(easy.difficulty(), 0);
        assert_eq!(easy.feasibility_rating(), AttackFeasibilityRating::High);

        let medium = threat(
            TimeConsuming::NoMoreThanOneMonth,
            Expertise::Expert,
            KnowledgeOfToe::Public,
            WindowOfOpportunity::Moderate,
            Equipment::Standard,
        );
        assert_eq!(medium.difficulty(), 14);
        assert_eq!(medium.feasibility_rating(), AttackFeasibilityRating::Medium);

        let hard = threat(
            TimeConsuming::MoreThanSixMonths,
            Expertise::MultipleExpert,
            KnowledgeOfToe::StrictlyConfidential,
            WindowOfOpportunity::Difficult,
            Equipment::MultipleBespoke,
        );
        assert!(hard.difficulty() >= 25);
        assert_eq!(hard.feasibility_rating(), AttackFeasibilityRating::VeryLow);
    }

    #[test]
    fn test_dimension_tokens_round_trip() {
        let raw = r#"{
            "threat_scenario": "CAN message injection",
            "attack_path": "physical access to the bus",
            "time_consuming": "no_more_than_1w",
            "expertise": "proficient",
            "knowledge_about_toe": "restricted",
            "window_of_opportunity": "easy",
            "equipment": "specialied"
        }"#;
        let parsed: ThreatScenarioAttackFeasibility = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.time_consuming, TimeConsuming::NoMoreThanOneWeek);
        assert_eq!(parsed.equipment, Equipment::Specialized);
    }
}
