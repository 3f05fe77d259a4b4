//! Strongly-typed identifiers for domain entities
//!
//! Plans, scenarios and conditions are keyed by human-readable codes
//! supplied by the data loader (e.g. `discovery-classic-saver-2025`).
//! Newtype wrappers keep the different key spaces from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_code {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a code, normalizing surrounding whitespace and case
            pub fn new(code: impl AsRef<str>) -> Result<Self, CoreError> {
                let normalized = code.as_ref().trim().to_ascii_lowercase();
                if normalized.is_empty() {
                    return Err(CoreError::validation(concat!($kind, " code must not be empty")));
                }
                if normalized.chars().any(char::is_whitespace) {
                    return Err(CoreError::validation(format!(
                        "{} code must not contain whitespace: {:?}",
                        $kind, normalized
                    )));
                }
                Ok(Self(normalized))
            }

            /// Returns the code as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the kind of entity this code identifies
            pub fn kind() -> &'static str {
                $kind
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> String {
                code.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_code!(PlanCode, "plan");
define_code!(SchemeCode, "scheme");
define_code!(ScenarioCode, "scenario");
define_code!(ConditionCode, "condition");
