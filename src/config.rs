use crate::Scalar;
use serde::{Deserialize, Serialize};

/// Tolerances and tunables shared by every spline operation.
///
/// Every boundary tolerance used by this crate is read from here.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineConfig {
    /// How far (in normalized units) a location may run past the last segment
    /// boundary and still be clamped to the final segment.
    pub segment_overshoot: Scalar,
    /// How far (in length units) an absolute location may run past the total
    /// spline length and still be snapped to the end.
    pub location_overshoot: Scalar,
    /// Distance (in length units) from a segment boundary below which local
    /// progress snaps to exactly 0 or 1.
    pub snapping_epsilon: Scalar,
    /// Chords shorter than this are treated as degenerate when computing
    /// Catmull-Rom time deltas.
    pub min_chord_length: Scalar,
    /// Largest allowed gap between the end of one Bezier segment and the start
    /// of the next.
    pub continuity_epsilon: Scalar,
    /// Number of chords used to approximate the arc length of one segment.
    pub length_samples: usize,
    /// Coarse samples per segment taken before Newton refinement in
    /// closest-point queries.
    pub closest_point_samples: usize,
    /// Fixed Newton iteration budget for closest-point refinement.
    pub newton_iterations: usize,
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            segment_overshoot: 0.01,
            location_overshoot: 0.1,
            snapping_epsilon: 0.001,
            min_chord_length: 1.0e-4,
            continuity_epsilon: 0.001,
            length_samples: 32,
            closest_point_samples: 5,
            newton_iterations: 5,
        }
    }
}

impl SplineConfig {
    pub fn with_segment_overshoot(mut self, value: Scalar) -> Self {
        self.segment_overshoot = value.max(0.0);
        self
    }

    pub fn with_location_overshoot(mut self, value: Scalar) -> Self {
        self.location_overshoot = value.max(0.0);
        self
    }

    pub fn with_snapping_epsilon(mut self, value: Scalar) -> Self {
        self.snapping_epsilon = value.max(0.0);
        self
    }

    pub fn with_min_chord_length(mut self, value: Scalar) -> Self {
        self.min_chord_length = value.max(0.0);
        self
    }

    pub fn with_continuity_epsilon(mut self, value: Scalar) -> Self {
        self.continuity_epsilon = value.max(0.0);
        self
    }

    pub fn with_length_samples(mut self, value: usize) -> Self {
        self.length_samples = value.max(1);
        self
    }

    pub fn with_closest_point_samples(mut self, value: usize) -> Self {
        self.closest_point_samples = value.max(1);
        self
    }

    pub fn with_newton_iterations(mut self, value: usize) -> Self {
        self.newton_iterations = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_partial_deserialization() {
        let config: SplineConfig =
            serde_json::from_str(r#"{ "newton_iterations": 12, "segment_overshoot": 0.05 }"#)
                .unwrap();
        assert_eq!(config.newton_iterations, 12);
        assert_eq!(config.segment_overshoot, 0.05);
        assert_eq!(config.location_overshoot, 0.1);
        assert_eq!(config.length_samples, 32);
    }

    #[test]
    fn test_config_builders_keep_values_sane() {
        let config = SplineConfig::default()
            .with_length_samples(0)
            .with_closest_point_samples(0)
            .with_snapping_epsilon(-1.0);
        assert_eq!(config.length_samples, 1);
        assert_eq!(config.closest_point_samples, 1);
        assert_eq!(config.snapping_epsilon, 0.0);
    }
}
