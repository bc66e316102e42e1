//! Release status of a history record

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a version of an entity was published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    Added,
    Revised,
    Abolished,
}

impl ReleaseStatus {
    pub const ALL: [ReleaseStatus; 3] = [
        ReleaseStatus::Added,
        ReleaseStatus::Revised,
        ReleaseStatus::Abolished,
    ];

    /// Numeric code stored in the `release_status` column
    pub fn code(self) -> i64 {
        match self {
            ReleaseStatus::Added => 0,
            ReleaseStatus::Revised => 1,
            ReleaseStatus::Abolished => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ReleaseStatus::Added),
            1 => Some(ReleaseStatus::Revised),
            2 => Some(ReleaseStatus::Abolished),
            _ => None,
        }
    }

    /// Series label for charts
    pub fn label(self) -> &'static str {
        match self {
            ReleaseStatus::Added => "added",
            ReleaseStatus::Revised => "revised",
            ReleaseStatus::Abolished => "abolished",
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReleaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "add" | "added" => Ok(ReleaseStatus::Added),
            "1" | "revise" | "revised" => Ok(ReleaseStatus::Revised),
            "2" | "abolish" | "abolished" => Ok(ReleaseStatus::Abolished),
            other => Err(format!("unknown release status: {}", other)),
        }
    }
}
