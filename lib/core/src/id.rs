//! Strongly-typed identifier types.
//!
//! Identifiers are opaque strings: facts may carry ids assigned by the
//! assistant, and workflow ids are issued by the hosted service. Locally
//! generated ids use a type prefix followed by a ULID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a string-backed ID wrapper.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from an already-validated string.
            ///
            /// Use [`str::parse`] for untrusted input.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a fresh ID of the form `<prefix>_<ULID>`.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, Ulid::new()))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the prefix used for generated IDs.
            #[must_use]
            pub const fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        id_type: stringify!($name),
                        reason: "identifier must not be empty".to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a fact extracted from conversation.
    FactId,
    "fact"
);

define_id!(
    /// Identifier of a hosted ChatKit workflow.
    WorkflowId,
    "wf"
);

define_id!(
    /// Identifier of the end user a ChatKit session is issued for.
    EndUserId,
    "user"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_fact_id_has_prefix() {
        let id = FactId::generate();
        let rest = id
            .as_str()
            .strip_prefix("fact_")
            .expect("generated ids carry the type prefix");
        assert!(Ulid::from_string(rest).is_ok());
    }

    #[test]
    fn generated_ids_are_unique() {
        use std::collections::HashSet;

        let ids: HashSet<EndUserId> = (0..32).map(|_| EndUserId::generate()).collect();
        assert_eq!(ids.len(), 32);
    }

    #[test]
    fn parse_accepts_foreign_ids_verbatim() {
        let id: WorkflowId = "wf_68e6daaa077c8190".parse().expect("should parse");
        assert_eq!(id.as_str(), "wf_68e6daaa077c8190");

        let id: FactId = "  abc-123 ".parse().expect("should parse");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn parse_rejects_blank() {
        let err = "   ".parse::<FactId>().unwrap_err();
        assert_eq!(err.id_type, "FactId");
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn deserialize_trims_like_parse() {
        let id: FactId = serde_json::from_str("\"  f1 \"").expect("deserialize");
        assert_eq!(id, "f1".parse::<FactId>().expect("parse"));
    }

    #[test]
    fn deserialize_rejects_blank() {
        let err = serde_json::from_str::<FactId>("\"   \"").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = FactId::new("fact_1");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"fact_1\"");
    }
}
