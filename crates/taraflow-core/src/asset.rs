//! Asset records and the security properties analyzed for them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of an electronic asset under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssetKind {
    #[default]
    #[serde(alias = "hardware")]
    Hardware,
    #[serde(alias = "software")]
    Software,
    #[serde(alias = "data")]
    Data,
    #[serde(alias = "communication")]
    Communication,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Hardware => "Hardware",
            AssetKind::Software => "Software",
            AssetKind::Data => "Data",
            AssetKind::Communication => "Communication",
        }
    }
}

/// One cybersecurity property of an asset. Each relevant property becomes
/// its own analysis unit and is carried through the full stage chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityProperty {
    #[serde(alias = "authenticity")]
    Authenticity,
    #[serde(alias = "integrity")]
    Integrity,
    #[serde(rename = "Non-repudiation", alias = "NonRepudiation", alias = "non-repudiation")]
    NonRepudiation,
    #[serde(alias = "confidentiality")]
    Confidentiality,
    #[serde(alias = "availability")]
    Availability,
    #[serde(alias = "authorization")]
    Authorization,
    #[serde(alias = "privacy")]
    Privacy,
}

impl SecurityProperty {
    pub const ALL: [SecurityProperty; 7] = [
        SecurityProperty::Authenticity,
        SecurityProperty::Integrity,
        SecurityProperty::NonRepudiation,
        SecurityProperty::Confidentiality,
        SecurityProperty::Availability,
        SecurityProperty::Authorization,
        SecurityProperty::Privacy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityProperty::Authenticity => "Authenticity",
            SecurityProperty::Integrity => "Integrity",
            SecurityProperty::NonRepudiation => "Non-repudiation",
            SecurityProperty::Confidentiality => "Confidentiality",
            SecurityProperty::Availability => "Availability",
            SecurityProperty::Authorization => "Authorization",
            SecurityProperty::Privacy => "Privacy",
        }
    }
}

impl std::fmt::Display for SecurityProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset record is missing an asset_id")]
    MissingId,
    #[error("asset {0} is missing an asset_name")]
    MissingName(String),
}

/// An asset record as supplied by the asset source. Immutable for the
/// lifetime of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: String,
    pub asset_name: String,
    #[serde(default, alias = "asset_type")]
    pub kind: AssetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_protocol: Option<String>,
    #[serde(default)]
    pub remarks: String,
    /// Optional explicit property selection. When empty, the kind-based
    /// defaults from [`Asset::relevant_properties`] apply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<SecurityProperty>,
}

impl Asset {
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.asset_id.trim().is_empty() {
            return Err(AssetError::MissingId);
        }
        if self.asset_name.trim().is_empty() {
            return Err(AssetError::MissingName(self.asset_id.clone()));
        }
        Ok(())
    }

    /// The security properties this asset expands into at run start.
    ///
    /// An explicit `properties` list in the asset record wins; otherwise the
    /// set is fixed by the asset kind.
    pub fn relevant_properties(&self) -> Vec<SecurityProperty> {
        if !self.properties.is_empty() {
            let mut seen = Vec::new();
            for property in &self.properties {
                if !seen.contains(property) {
                    seen.push(*property);
                }
            }
            return seen;
        }
        match self.kind {
            AssetKind::Hardware => vec![
                SecurityProperty::Authenticity,
                SecurityProperty::Integrity,
                SecurityProperty::Availability,
                SecurityProperty::Authorization,
            ],
            AssetKind::Software => vec![
                SecurityProperty::Authenticity,
                SecurityProperty::Integrity,
                SecurityProperty::Availability,
                SecurityProperty::Authorization,
                SecurityProperty::NonRepudiation,
            ],
            AssetKind::Data => vec![
                SecurityProperty::Integrity,
                SecurityProperty::Confidentiality,
                SecurityProperty::Privacy,
                SecurityProperty::Availability,
            ],
            AssetKind::Communication => vec![
                SecurityProperty::Authenticity,
                SecurityProperty::Integrity,
                SecurityProperty::Confidentiality,
                SecurityProperty::Availability,
                SecurityProperty::NonRepudiation,
            ],
        }
    }
}
