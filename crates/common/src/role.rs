//! User role of the active session
//!
//! The role is stamped on every saved artifact and is the only key used to
//! scope what a session can see.

use serde::{Deserialize, Serialize};

/// Acting role, stored as `NONE | TEACHER | STUDENT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    None,
    Teacher,
    Student,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::None => write!(f, "NONE"),
            UserRole::Teacher => write!(f, "TEACHER"),
            UserRole::Student => write!(f, "STUDENT"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(UserRole::None),
            "TEACHER" => Ok(UserRole::Teacher),
            "STUDENT" => Ok(UserRole::Student),
            other => Err(crate::Error::Validation(format!(
                "Unknown role '{}'. Expected one of: none, teacher, student",
                other
            ))),
        }
    }
}
