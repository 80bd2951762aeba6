use crate::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a spline segment, in `[0; segment_count)`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SplineSegmentIndex(pub usize);

/// Index of a spline handle, in `[0; handle_count)`.
///
/// For Catmull-Rom splines index 0 is the begin margin handle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SplineHandleIndex(pub usize);

/// Location along a spline expressed as segment index plus local progress.
///
/// Integer part selects a segment, fractional part is the local parameter of
/// that segment. Value equal to segment count denotes the very end.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Scalar", into = "Scalar")]
pub struct NormalizedSplineLocation(Scalar);

impl NormalizedSplineLocation {
    pub const ZERO: Self = Self(0.0);

    /// # Panics
    /// When `value` is NaN.
    pub fn new(value: Scalar) -> Self {
        assert!(!value.is_nan(), "Normalized spline location cannot be NaN");
        Self(value)
    }

    pub fn value(self) -> Scalar {
        self.0
    }

    /// Splits location into segment index and local progress, clamping to the
    /// last segment when the location lies at or past `segment_count`.
    pub fn segment_and_progress(self, segment_count: usize) -> (SplineSegmentIndex, Scalar) {
        let last = segment_count.saturating_sub(1);
        let floor = self.0.max(0.0).floor();
        let index = (floor as usize).min(last);
        let progress = (self.0 - index as Scalar).clamp(0.0, 1.0);
        (SplineSegmentIndex(index), progress)
    }
}

impl From<SplineSegmentIndex> for NormalizedSplineLocation {
    fn from(value: SplineSegmentIndex) -> Self {
        Self(value.0 as Scalar)
    }
}

impl TryFrom<Scalar> for NormalizedSplineLocation {
    type Error = String;

    fn try_from(value: Scalar) -> Result<Self, Self::Error> {
        if value.is_nan() {
            Err("normalized spline location cannot be NaN".to_owned())
        } else {
            Ok(Self(value))
        }
    }
}

impl From<NormalizedSplineLocation> for Scalar {
    fn from(value: NormalizedSplineLocation) -> Self {
        value.0
    }
}

impl fmt::Display for NormalizedSplineLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute location along a spline: arc-length distance from its start.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SplineLocation(pub Scalar);

impl SplineLocation {
    pub const ZERO: Self = Self(0.0);

    pub fn value(self) -> Scalar {
        self.0
    }
}

impl fmt::Display for SplineLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_and_progress() {
        let (index, progress) = NormalizedSplineLocation::new(1.25).segment_and_progress(3);
        assert_eq!(index, SplineSegmentIndex(1));
        assert!((progress - 0.25).abs() < 1.0e-6);

        let (index, progress) = NormalizedSplineLocation::new(3.0).segment_and_progress(3);
        assert_eq!(index, SplineSegmentIndex(2));
        assert_eq!(progress, 1.0);

        let (index, progress) = NormalizedSplineLocation::new(0.0).segment_and_progress(3);
        assert_eq!(index, SplineSegmentIndex(0));
        assert_eq!(progress, 0.0);
    }

    #[test]
    #[should_panic(expected = "cannot be NaN")]
    fn test_nan_location_panics() {
        let _ = NormalizedSplineLocation::new(Scalar::NAN);
    }

    #[test]
    fn test_nan_location_is_rejected_on_deserialization() {
        let valid: NormalizedSplineLocation = serde_json::from_str("1.5").unwrap();
        assert_eq!(valid.value(), 1.5);
        assert!(NormalizedSplineLocation::try_from(Scalar::NAN).is_err());
        assert!(NormalizedSplineLocation::try_from(2.0 as Scalar).is_ok());
    }
}
