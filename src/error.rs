use thiserror::Error;

/// Result alias for `mtree`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned when configuring a tree.
///
/// Lookups and searches never fail: a missing key, `k == 0` or a negative
/// radius simply produce nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Spheres must be allowed at least `min` members, otherwise a split
    /// cannot produce two legal halves.
    #[error("fan-out {fan_out} is too small, must be at least {min}")]
    InvalidFanOut { fan_out: usize, min: usize },
}
