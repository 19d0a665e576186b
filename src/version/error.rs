//! Version model error definitions.

use thiserror::Error;

/// Errors raised while building or ordering version values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// An app version was constructed without any platform set.
    #[error("an app version needs at least one platform version")]
    Invalid,

    /// Two versions have no shared platform axis that decides their order.
    #[error("cannot order {left} against {right}: no shared platform decides")]
    Ambiguous { left: String, right: String },

    /// A platform version string is not dotted-numeric.
    #[error("malformed platform version {0:?}")]
    Malformed(String),
}

pub type VersionResult<T> = Result<T, VersionError>;
