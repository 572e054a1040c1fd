//! Filter record error types.

use thiserror::Error;

/// Failure modes of the [`FilterRecord`](super::FilterRecord) contract.
///
/// Construction, flag flips and equality never fail. The only fallible
/// operation is ordering two revisions of the same filter when one of them
/// has no creation date.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FilterError {
    /// Two records named `name` were compared and at least one of them has
    /// no creation date, so their relative age is unknown.
    #[error("cannot order revisions of filter '{name}': creation date is missing")]
    MissingCreationDate { name: String },
}
