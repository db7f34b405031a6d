//! Correlation types for verification runs
//!
//! A `RunId` identifies one verification run end to end; each invocation of
//! the system under test inside that run carries its own `RequestId` so the
//! collaborator's logs can be matched against ours. Both are UUIDv7 strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_v7_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Fresh time-ordered identifier
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an identifier read back from a report or log
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

uuid_v7_id!(
    /// Unique identifier for a single invocation of the system under test
    RequestId
);

uuid_v7_id!(
    /// Identifier for one verification run
    RunId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_invocations_never_share_an_id() {
        let first = RequestId::new();
        let second = RequestId::new();
        assert_ne!(first, second);
    }

    #[test]
    fn test_display_is_the_raw_id() {
        let id = RunId::from_string("run-7".to_string());
        assert_eq!(id.to_string(), "run-7");
        assert_eq!(id.as_str(), "run-7");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = RequestId::from_string("req-1".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"req-1\"");
        let back: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
