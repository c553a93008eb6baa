//! Values that can check themselves and report every problem found.
//!
//! # Invariants
//! - A value is valid exactly when `iter_invalid` yields nothing.

use nonempty::NonEmpty;

/// A value that is either valid or described by a nonempty list of issues.
pub trait Validate {
    type ValidationError;

    fn validate(&self) -> Result<(), NonEmpty<Self::ValidationError>> {
        collect_errors(self.iter_invalid())
    }

    /// Iterates over every issue, in a stable order.
    fn iter_invalid(&self) -> impl Iterator<Item = Self::ValidationError>;
}

/// Collects issues into a `Result`.
pub fn collect_errors<E>(iter: impl Iterator<Item = E>) -> Result<(), NonEmpty<E>> {
    match NonEmpty::collect(iter) {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}
