use crate::{
    config::SplineConfig,
    error::{SplineError, SplineResult},
    geometry::GeometricOperations,
    location::{NormalizedSplineLocation, SplineLocation, SplineSegmentIndex},
    polynomial::Polynomial,
    utils::{factor_iter, snap_to_bounds},
    Scalar,
};
use std::marker::PhantomData;

/// Position, velocity and acceleration of spline at some location.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineSample<Pos, Diff> {
    pub position: Pos,
    /// First derivative.
    pub tangent: Diff,
    /// Second derivative.
    pub curvature: Diff,
}

/// Result of closest point query.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosestPoint<Pos> {
    pub location: NormalizedSplineLocation,
    pub position: Pos,
    pub distance: Scalar,
}

/// Common interface of splines made out of polynomial segments.
///
/// Implementors provide segment polynomials and their (cached) lengths; all
/// location conversions and queries are built on top of those.
pub trait Spline<Pos, Diff> {
    type Operations: GeometricOperations<Pos, Diff>;
    type Segment: Polynomial<Pos, Diff>;

    fn operations(&self) -> &Self::Operations;

    fn config(&self) -> &SplineConfig;

    /// Number of segments, always at least one.
    fn segment_count(&self) -> usize;

    /// Gets polynomial of given segment.
    ///
    /// # Panics
    /// When `index` is not a valid segment index.
    fn polynomial(&self, index: SplineSegmentIndex) -> &Self::Segment;

    /// Gets arc length of given segment. Repeated calls return identical values.
    ///
    /// # Panics
    /// When `index` is not a valid segment index.
    fn segment_length(&self, index: SplineSegmentIndex) -> Scalar;

    /// Distances from spline start to the beginning of each segment, followed
    /// by total length.
    fn segment_offsets(&self) -> &[Scalar];

    /// Gets arc length of whole spline.
    fn length(&self) -> Scalar {
        self.segment_offsets()
            .last()
            .copied()
            .unwrap_or_default()
    }

    /// Gets normalized location of spline end.
    fn end_location(&self) -> NormalizedSplineLocation {
        NormalizedSplineLocation::new(self.segment_count() as Scalar)
    }

    /// Resolves normalized location into segment index and local parameter.
    ///
    /// Locations up to `segment_overshoot` past the end resolve to the end of
    /// the last segment.
    fn resolve(&self, location: NormalizedSplineLocation) -> SplineResult<(SplineSegmentIndex, Scalar)> {
        let value = location.value();
        let max = self.segment_count() as Scalar;
        if value < 0.0 || value > max + self.config().segment_overshoot {
            log::debug!("Normalized location {} is out of range [0; {}]", value, max);
            return Err(SplineError::LocationOutOfRange {
                location: value,
                max,
            });
        }
        Ok(location.segment_and_progress(self.segment_count()))
    }

    /// Samples position and derivatives at normalized location.
    ///
    /// This is the indexing-by-location operation of every spline: segment
    /// and local parameter come from [`Spline::resolve`], so locations up to
    /// `segment_overshoot` past the end sample the spline end.
    fn sample(&self, location: NormalizedSplineLocation) -> SplineResult<SplineSample<Pos, Diff>> {
        let (index, t) = self.resolve(location)?;
        let polynomial = self.polynomial(index);
        let ops = self.operations();
        Ok(SplineSample {
            position: polynomial.evaluate(ops, t),
            tangent: polynomial.evaluate_derivative(ops, t),
            curvature: polynomial.evaluate_second_derivative(ops, t),
        })
    }

    fn position_at(&self, location: NormalizedSplineLocation) -> SplineResult<Pos> {
        let (index, t) = self.resolve(location)?;
        Ok(self.polynomial(index).evaluate(self.operations(), t))
    }

    fn tangent_at(&self, location: NormalizedSplineLocation) -> SplineResult<Diff> {
        let (index, t) = self.resolve(location)?;
        Ok(self.polynomial(index).evaluate_derivative(self.operations(), t))
    }

    /// Samples position at absolute (arc-length) location.
    fn position_at_distance(&self, location: SplineLocation) -> SplineResult<Pos> {
        let location = self.normalize(location)?;
        self.position_at(location)
    }

    /// Converts absolute location into normalized one.
    ///
    /// Local progress inside a segment is linear in distance and snaps to the
    /// segment bounds within `snapping_epsilon`. Locations up to
    /// `location_overshoot` outside the spline snap to its start or end.
    fn normalize(&self, location: SplineLocation) -> SplineResult<NormalizedSplineLocation> {
        NormalizationCursor::<Self, Pos, Diff>::new(self).advance(location)
    }

    /// Converts normalized location into absolute one.
    fn denormalize(&self, location: NormalizedSplineLocation) -> SplineResult<SplineLocation> {
        self.resolve(location)?;
        let mut remaining = location.value().min(self.segment_count() as Scalar);
        let mut result = 0.0;
        for index in 0..self.segment_count() {
            if remaining <= 0.0 {
                break;
            }
            result += self.segment_length(SplineSegmentIndex(index)) * remaining.min(1.0);
            remaining -= 1.0;
        }
        Ok(SplineLocation(result))
    }

    /// Normalizes ascending sequence of absolute locations in a single pass.
    ///
    /// Produces exactly the same values as calling [`Spline::normalize`] on
    /// each location, but walks the segments only once. Input must be sorted
    /// ascending, otherwise [`SplineError::NotAscending`] is returned.
    fn bulk_normalize_ordered(
        &self,
        locations: &[SplineLocation],
    ) -> SplineResult<Vec<NormalizedSplineLocation>> {
        let mut cursor = NormalizationCursor::<Self, Pos, Diff>::new(self);
        let mut previous = Scalar::NEG_INFINITY;
        locations
            .iter()
            .enumerate()
            .map(|(index, location)| {
                if location.value() < previous {
                    return Err(SplineError::NotAscending { index });
                }
                previous = location.value();
                cursor.advance(*location)
            })
            .collect()
    }

    /// Finds point of spline closest to `target`.
    ///
    /// Coarse samples across all segments select the winning segment, then
    /// Newton-Raphson refines the result inside of it.
    fn closest_point_to(&self, target: &Pos) -> ClosestPoint<Pos> {
        let ops = self.operations();
        let config = self.config();
        let mut best = (SplineSegmentIndex(0), 0.0, Scalar::INFINITY);
        for index in (0..self.segment_count()).map(SplineSegmentIndex) {
            let polynomial = self.polynomial(index);
            for t in factor_iter(config.closest_point_samples.max(1)) {
                let distance = ops.distance_squared(&polynomial.evaluate(ops, t), target);
                if distance < best.2 {
                    best = (index, t, distance);
                }
            }
        }
        let (index, guess, coarse) = best;
        // boundary sample is shared with the neighbor segment, refine both sides
        let mut candidates = vec![(index, guess)];
        if guess >= 1.0 && index.0 + 1 < self.segment_count() {
            candidates.push((SplineSegmentIndex(index.0 + 1), 0.0));
        } else if guess <= 0.0 && index.0 > 0 {
            candidates.push((SplineSegmentIndex(index.0 - 1), 1.0));
        }
        let start = self.polynomial(index).evaluate(ops, guess);
        let mut result = (index, guess, start, coarse);
        for (index, guess) in candidates {
            let polynomial = self.polynomial(index);
            let refined = polynomial.evaluate_closest_point_from(
                ops,
                target,
                guess,
                config.newton_iterations,
            );
            let position = polynomial.evaluate(ops, refined);
            let distance = ops.distance_squared(&position, target);
            if distance <= result.3 {
                result = (index, refined, position, distance);
            }
        }
        let (index, t, position, _) = result;
        let distance = ops.distance(&position, target);
        ClosestPoint {
            location: NormalizedSplineLocation::new(index.0 as Scalar + t),
            position,
            distance,
        }
    }
}

/// Running position of a forward walk over spline segments.
struct NormalizationCursor<'a, S: ?Sized, Pos, Diff> {
    spline: &'a S,
    index: usize,
    begin: Scalar,
    end: Scalar,
    _phantom: PhantomData<fn() -> (Pos, Diff)>,
}

impl<'a, S, Pos, Diff> NormalizationCursor<'a, S, Pos, Diff>
where
    S: Spline<Pos, Diff> + ?Sized,
{
    fn new(spline: &'a S) -> Self {
        Self {
            spline,
            index: 0,
            begin: 0.0,
            end: spline.segment_length(SplineSegmentIndex(0)),
            _phantom: PhantomData,
        }
    }

    fn advance(&mut self, location: SplineLocation) -> SplineResult<NormalizedSplineLocation> {
        let distance = location.value();
        assert!(!distance.is_nan(), "Spline location cannot be NaN");
        let config = self.spline.config();
        let segment_count = self.spline.segment_count();
        if distance < 0.0 {
            if -distance <= config.location_overshoot {
                return Ok(NormalizedSplineLocation::ZERO);
            }
            log::debug!("Spline location {} lies before spline start", distance);
            return Err(SplineError::LocationOutOfRange {
                location: distance,
                max: self.spline.length(),
            });
        }
        while distance > self.end && self.index + 1 < segment_count {
            self.index += 1;
            self.begin = self.end;
            self.end = self.begin + self.spline.segment_length(SplineSegmentIndex(self.index));
        }
        if distance > self.end {
            if distance - self.end <= config.location_overshoot {
                return Ok(NormalizedSplineLocation::new(segment_count as Scalar));
            }
            log::debug!(
                "Spline location {} lies past spline end {}",
                distance,
                self.end
            );
            return Err(SplineError::LocationOutOfRange {
                location: distance,
                max: self.end,
            });
        }
        let length = self.end - self.begin;
        let remainder = snap_to_bounds(distance - self.begin, length, config.snapping_epsilon);
        let progress = if length > 0.0 {
            (remainder / length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Ok(NormalizedSplineLocation::new(self.index as Scalar + progress))
    }
}
