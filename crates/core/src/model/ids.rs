use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An id string that is not a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {raw:?}")]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

/// Integer ids assigned by the remote API. Display prints the bare number so
/// ids can be spliced into request paths.
macro_rules! remote_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                    raw: s.to_owned(),
                })
            }
        }
    };
}

remote_id!(
    /// Key of a question in the directory; the join key to submissions.
    QuestionId
);
remote_id!(
    /// Ledger entry id.
    SubmissionId
);
remote_id!(
    /// Learner id as carried by session credentials.
    LearnerId
);
