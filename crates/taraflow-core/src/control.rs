//! Stage-5 output: cybersecurity control and derived requirement.

use serde::{Deserialize, Deserializer, Serialize};

fn de_yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YesNo {
        Bool(bool),
        Text(String),
    }

    match YesNo::deserialize(deserializer)? {
        YesNo::Bool(b) => Ok(b),
        YesNo::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(true),
            "no" | "n" | "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected yes/no, got `{other}`"
            ))),
        },
    }
}

/// Result of the control-requirement stage for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequirement {
    pub cybersecurity_control_id: String,
    pub cybersecurity_control: String,
    /// Whether the control is allocated to the device itself (as opposed to
    /// the surrounding item or backend). Models answer "yes"/"no".
    #[serde(deserialize_with = "de_yes_no")]
    pub allocated_to_device: bool,
    pub cybersecurity_requirement_id: String,
    pub cybersecurity_requirement: String,
}
