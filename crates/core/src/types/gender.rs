//! Gender enum shared by administrator profiles and delivery personnel.

use serde::{Deserialize, Serialize};

/// Gender as stored in profile documents.
///
/// Wire values are capitalized (`"Male"`, `"Female"`, `"Other"`) to match
/// existing stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Self::Male),
            "Female" => Ok(Self::Female),
            "Other" => Ok(Self::Other),
            _ => Err(format!("invalid gender: {s}")),
        }
    }
}
