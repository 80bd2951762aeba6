use crate::Scalar;
use thiserror::Error;

/// Result type of fallible spline operations.
pub type SplineResult<T> = Result<T, SplineError>;

/// Errors happening within spline operations.
///
/// Contract violations (evaluating a polynomial outside `[0; 1]`, indexing past
/// the handle list, NaN locations) are not represented here: they panic.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum SplineError {
    /// Spline needs more handles (or Bezier segments) than it was given.
    #[error("not enough handles: required at least {required}, got {actual}")]
    NotEnoughHandles { required: usize, actual: usize },
    /// End of Bezier segment `segment` does not meet the start of the next one.
    #[error("bezier segment {segment} is discontinuous with its successor (gap: {gap})")]
    Discontinuous { segment: usize, gap: Scalar },
    /// Location lies outside of the spline beyond the configured tolerance.
    #[error("location {location} is out of range [0; {max}]")]
    LocationOutOfRange { location: Scalar, max: Scalar },
    /// Bulk normalization input was not sorted ascending.
    #[error("locations are not in ascending order at index {index}")]
    NotAscending { index: usize },
    /// Target handle distance for resampling is not a positive finite number.
    #[error("invalid handle distance: {0}")]
    InvalidHandleDistance(Scalar),
}
