//! core::error
//!
//! Error taxonomy for the patchset domain.
//!
//! Lazily resolved ref fields never surface these errors. They degrade to
//! sentinel values instead so listings stay best-effort per entry.

use thiserror::Error;

/// Errors from patchset reference handling and workflows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchsetError {
    /// The reference string cannot be decomposed into a name.
    #[error("unexpected refname: {0}")]
    NameRef(String),

    /// The reference is not under the `patchset/` namespace.
    #[error("ref is not like patchset: {0}")]
    BadPatchRef(String),

    /// Deleting a patchset version failed.
    #[error("unable to delete patchset: {0}")]
    PatchRef(String),

    /// Anything else; carries a human-readable message only.
    #[error("{0}")]
    Other(String),
}

impl PatchsetError {
    /// Create a generic error from any displayable message.
    pub fn other(message: impl Into<String>) -> Self {
        PatchsetError::Other(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formatting() {
        assert_eq!(
            PatchsetError::NameRef("refs/heads/".into()).to_string(),
            "unexpected refname: refs/heads/"
        );
        assert_eq!(
            PatchsetError::BadPatchRef("main".into()).to_string(),
            "ref is not like patchset: main"
        );
        assert_eq!(PatchsetError::other("boom").to_string(), "boom");
    }
}
