//! Crate-level error type.

use crate::cidr::CidrError;
use crate::resolve::ResolveError;
use crate::units::UnitError;

/// Result type for benchkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from any benchkit operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A scaled quantity could not be read.
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// A CIDR range could not be built.
    #[error(transparent)]
    Cidr(#[from] CidrError),

    /// A host name could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl Error {
    /// Check if the input itself was malformed, as opposed to a lookup
    /// failing at runtime.
    ///
    /// Input errors will fail again on retry with the same text.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::Unit(_) => true,
            Error::Cidr(CidrError::AddressResolution { source, .. }) | Error::Resolve(source) => {
                !matches!(source, ResolveError::Io(_))
            }
            Error::Cidr(_) => true,
        }
    }
}
