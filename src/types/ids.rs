//! Newtype wrappers for GitHub identifiers.
//!
//! GitHub assigns every object a positive integer id that is unique within its
//! kind. Wrapping them keeps a `UserId` from being used where an
//! `InstallationId` is expected, which matters once several of them are keys in
//! the same cache.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw integer id.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name(n)
            }
        }
    };
}

numeric_id!(
    /// A GitHub user (or organization) account id.
    UserId
);

numeric_id!(
    /// The id of an installation of this app on an account.
    InstallationId
);

numeric_id!(
    /// A repository id.
    RepositoryId
);

numeric_id!(
    /// An issue id. Not the per-repository issue number.
    IssueId
);

numeric_id!(
    /// An issue comment id.
    CommentId
);

numeric_id!(
    /// The GitHub App id.
    AppId
);

/// A GitHub webhook delivery ID (`X-GitHub-Delivery`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn new(s: impl Into<String>) -> Self {
        DeliveryId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeliveryId {
    fn from(s: String) -> Self {
        DeliveryId(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod numeric {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_is_transparent(n: u64) {
                let id = UserId(n);
                let json = serde_json::to_string(&id).unwrap();
                prop_assert_eq!(&json, &n.to_string());
                let parsed: UserId = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(id, parsed);
            }

            #[test]
            fn display_is_bare_number(n: u64) {
                prop_assert_eq!(format!("{}", InstallationId(n)), n.to_string());
            }

            #[test]
            fn comparison_matches_underlying(a: u64, b: u64) {
                prop_assert_eq!(IssueId(a) == IssueId(b), a == b);
                prop_assert_eq!(IssueId(a) < IssueId(b), a < b);
            }
        }

        #[test]
        fn from_and_get_agree() {
            let id = RepositoryId::from(42);
            assert_eq!(id.get(), 42);
        }
    }

    mod delivery_id {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(s in "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}") {
                let id = DeliveryId::new(&s);
                let json = serde_json::to_string(&id).unwrap();
                let parsed: DeliveryId = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(id, parsed);
            }
        }

        #[test]
        fn display_is_raw_string() {
            let id = DeliveryId::from("72d3162e-cc78-11e3-81ab-4c9367dc0958".to_string());
            assert_eq!(id.to_string(), "72d3162e-cc78-11e3-81ab-4c9367dc0958");
            assert_eq!(id.as_str(), "72d3162e-cc78-11e3-81ab-4c9367dc0958");
        }
    }
}
