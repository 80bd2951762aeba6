use crate::{
    cache::SegmentCache,
    config::SplineConfig,
    error::{SplineError, SplineResult},
    geometry::GeometricOperations,
    location::{SplineHandleIndex, SplineSegmentIndex},
    polynomial::{CubicPolynomial, Polynomial, QuinticPolynomial},
    spline::Spline,
    Scalar,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{convert::TryFrom, ops::Index};

/// Control points of single Bezier segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BezierSegment<Pos> {
    Quadratic([Pos; 3]),
    Cubic([Pos; 4]),
    Quintic([Pos; 6]),
}

impl<Pos> BezierSegment<Pos> {
    pub fn points(&self) -> &[Pos] {
        match self {
            Self::Quadratic(points) => points,
            Self::Cubic(points) => points,
            Self::Quintic(points) => points,
        }
    }

    pub fn degree(&self) -> usize {
        self.points().len() - 1
    }

    pub fn start(&self) -> &Pos {
        &self.points()[0]
    }

    pub fn end(&self) -> &Pos {
        let points = self.points();
        &points[points.len() - 1]
    }

    /// Produces segment of the same degree with every control point mapped.
    pub fn map<T>(&self, mut f: impl FnMut(&Pos) -> T) -> BezierSegment<T> {
        match self {
            Self::Quadratic(points) => BezierSegment::Quadratic(points.each_ref().map(&mut f)),
            Self::Cubic(points) => BezierSegment::Cubic(points.each_ref().map(&mut f)),
            Self::Quintic(points) => BezierSegment::Quintic(points.each_ref().map(&mut f)),
        }
    }

    /// Reverses order of control points.
    pub fn reverse(&self) -> Self
    where
        Pos: Clone,
    {
        let mut result = self.clone();
        match &mut result {
            Self::Quadratic(points) => points.reverse(),
            Self::Cubic(points) => points.reverse(),
            Self::Quintic(points) => points.reverse(),
        }
        result
    }
}

/// Polynomial of Bezier segment of any supported degree.
#[derive(Debug, Clone, PartialEq)]
pub enum BezierPolynomial<Pos, Diff> {
    /// Quadratic and cubic segments.
    Cubic(CubicPolynomial<Pos, Diff>),
    Quintic(QuinticPolynomial<Pos, Diff>),
}

impl<Pos, Diff> BezierPolynomial<Pos, Diff> {
    pub fn new<G>(ops: &G, segment: &BezierSegment<Pos>) -> Self
    where
        Pos: Clone,
        G: GeometricOperations<Pos, Diff>,
    {
        match segment {
            BezierSegment::Quadratic(points) => {
                Self::Cubic(CubicPolynomial::from_bezier(ops, points))
            }
            BezierSegment::Cubic(points) => Self::Cubic(CubicPolynomial::from_bezier(ops, points)),
            BezierSegment::Quintic(points) => {
                Self::Quintic(QuinticPolynomial::from_bezier(ops, points))
            }
        }
    }
}

impl<Pos, Diff> Polynomial<Pos, Diff> for BezierPolynomial<Pos, Diff> {
    fn evaluate<G>(&self, ops: &G, t: Scalar) -> Pos
    where
        G: GeometricOperations<Pos, Diff>,
    {
        match self {
            Self::Cubic(polynomial) => polynomial.evaluate(ops, t),
            Self::Quintic(polynomial) => polynomial.evaluate(ops, t),
        }
    }

    fn evaluate_derivative<G>(&self, ops: &G, t: Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>,
    {
        match self {
            Self::Cubic(polynomial) => polynomial.evaluate_derivative(ops, t),
            Self::Quintic(polynomial) => polynomial.evaluate_derivative(ops, t),
        }
    }

    fn evaluate_second_derivative<G>(&self, ops: &G, t: Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>,
    {
        match self {
            Self::Cubic(polynomial) => polynomial.evaluate_second_derivative(ops, t),
            Self::Quintic(polynomial) => polynomial.evaluate_second_derivative(ops, t),
        }
    }
}

/// Serializable definition of Bezier spline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BezierSplineDef<Pos> {
    pub segments: Vec<BezierSegment<Pos>>,
    #[serde(default)]
    pub config: SplineConfig,
}

/// Spline made out of Bezier segments joined end to start.
///
/// End point of every segment must match start point of the next one within
/// `continuity_epsilon`. Segments may mix degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BezierSplineDef<Pos>")]
#[serde(into = "BezierSplineDef<Pos>")]
#[serde(bound = "Pos: Clone + Serialize + DeserializeOwned, Diff: Clone, G: GeometricOperations<Pos, Diff> + Clone + Default")]
pub struct BezierSpline<Pos, Diff, G> {
    segments: Vec<BezierSegment<Pos>>,
    /// Control points of all segments in order, shared end points repeated.
    handles: Vec<Pos>,
    operations: G,
    config: SplineConfig,
    cache: SegmentCache<BezierPolynomial<Pos, Diff>>,
}

impl<Pos, Diff, G> BezierSpline<Pos, Diff, G>
where
    Pos: Clone,
    G: GeometricOperations<Pos, Diff>,
{
    pub fn new(segments: Vec<BezierSegment<Pos>>, operations: G) -> SplineResult<Self> {
        Self::with_config(segments, operations, SplineConfig::default())
    }

    pub fn with_config(
        segments: Vec<BezierSegment<Pos>>,
        operations: G,
        config: SplineConfig,
    ) -> SplineResult<Self> {
        if segments.is_empty() {
            return Err(SplineError::NotEnoughHandles {
                required: 3,
                actual: 0,
            });
        }
        for (index, pair) in segments.windows(2).enumerate() {
            let gap = operations.distance(pair[0].end(), pair[1].start());
            if !(gap <= config.continuity_epsilon) {
                log::debug!(
                    "Rejected Bezier spline: gap {} after segment {}",
                    gap,
                    index
                );
                return Err(SplineError::Discontinuous {
                    segment: index,
                    gap,
                });
            }
        }
        let handles = segments
            .iter()
            .flat_map(|segment| segment.points().iter().cloned())
            .collect();
        log::debug!("Built Bezier spline with {} segments", segments.len());
        Ok(Self {
            cache: SegmentCache::new(segments.len()),
            segments,
            handles,
            operations,
            config,
        })
    }

    /// Reverses spline direction.
    pub fn reversed(&self) -> SplineResult<Self>
    where
        G: Clone,
    {
        Self::with_config(
            self.segments.iter().rev().map(BezierSegment::reverse).collect(),
            self.operations.clone(),
            self.config,
        )
    }

    pub fn segments(&self) -> &[BezierSegment<Pos>] {
        &self.segments
    }

    /// Gets control points of all segments in order.
    pub fn handles(&self) -> &[Pos] {
        &self.handles
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Gets control points of given segment.
    ///
    /// # Panics
    /// When `index` is not a valid segment index.
    pub fn segment(&self, index: SplineSegmentIndex) -> &BezierSegment<Pos> {
        &self.segments[index.0]
    }

    /// Counts segments which length was already computed.
    pub fn measured_segments(&self) -> usize {
        self.cache.measured_segments()
    }
}

impl<Pos, Diff, G> Spline<Pos, Diff> for BezierSpline<Pos, Diff, G>
where
    Pos: Clone,
    G: GeometricOperations<Pos, Diff>,
{
    type Operations = G;
    type Segment = BezierPolynomial<Pos, Diff>;

    fn operations(&self) -> &G {
        &self.operations
    }

    fn config(&self) -> &SplineConfig {
        &self.config
    }

    fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn polynomial(&self, index: SplineSegmentIndex) -> &BezierPolynomial<Pos, Diff> {
        self.cache.polynomial(index.0, || {
            BezierPolynomial::new(&self.operations, &self.segments[index.0])
        })
    }

    fn segment_length(&self, index: SplineSegmentIndex) -> Scalar {
        self.cache.length(index.0, || {
            self.polynomial(index)
                .length(&self.operations, self.config.length_samples)
        })
    }

    fn segment_offsets(&self) -> &[Scalar] {
        self.cache
            .offsets(|index| self.segment_length(SplineSegmentIndex(index)))
    }
}

impl<Pos, Diff, G> Index<SplineHandleIndex> for BezierSpline<Pos, Diff, G> {
    type Output = Pos;

    fn index(&self, index: SplineHandleIndex) -> &Pos {
        &self.handles[index.0]
    }
}

impl<Pos, Diff, G> Index<SplineSegmentIndex> for BezierSpline<Pos, Diff, G>
where
    Pos: Clone,
    G: GeometricOperations<Pos, Diff>,
{
    type Output = BezierPolynomial<Pos, Diff>;

    fn index(&self, index: SplineSegmentIndex) -> &Self::Output {
        self.polynomial(index)
    }
}

impl<Pos, Diff, G> TryFrom<BezierSplineDef<Pos>> for BezierSpline<Pos, Diff, G>
where
    Pos: Clone,
    G: GeometricOperations<Pos, Diff> + Default,
{
    type Error = SplineError;

    fn try_from(value: BezierSplineDef<Pos>) -> Result<Self, Self::Error> {
        Self::with_config(value.segments, G::default(), value.config)
    }
}

impl<Pos, Diff, G> From<BezierSpline<Pos, Diff, G>> for BezierSplineDef<Pos> {
    fn from(v: BezierSpline<Pos, Diff, G>) -> Self {
        Self {
            segments: v.segments,
            config: v.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::Euclidean,
        location::{NormalizedSplineLocation, SplineLocation},
    };
    use approx::assert_relative_eq;

    type Point2 = [Scalar; 2];
    type Bezier2 = BezierSpline<Point2, Point2, Euclidean>;

    fn mixed() -> Bezier2 {
        BezierSpline::new(
            vec![
                BezierSegment::Cubic([[0.0, 0.0], [1.0, 2.0], [2.0, 2.0], [3.0, 0.0]]),
                BezierSegment::Quadratic([[3.0, 0.0], [4.0, -2.0], [5.0, 0.0]]),
                BezierSegment::Quintic([
                    [5.0, 0.0],
                    [6.0, 1.0],
                    [7.0, 1.0],
                    [8.0, -1.0],
                    [9.0, -1.0],
                    [10.0, 0.0],
                ]),
            ],
            Euclidean,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_bezier_spline() {
        assert!(matches!(
            Bezier2::new(vec![], Euclidean),
            Err(SplineError::NotEnoughHandles { .. })
        ));
    }

    #[test]
    fn test_discontinuous_segments() {
        let result = Bezier2::new(
            vec![
                BezierSegment::Cubic([[0.0, 0.0], [1.0, 1.0], [2.0, 1.0], [3.0, 0.0]]),
                BezierSegment::Cubic([[3.1, 0.0], [4.0, 1.0], [5.0, 1.0], [6.0, 0.0]]),
            ],
            Euclidean,
        );
        match result {
            Err(SplineError::Discontinuous { segment, gap }) => {
                assert_eq!(segment, 0);
                assert_relative_eq!(gap, 0.1, epsilon = 1.0e-5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_small_gap_is_tolerated() {
        let result = Bezier2::new(
            vec![
                BezierSegment::Cubic([[0.0, 0.0], [1.0, 1.0], [2.0, 1.0], [3.0, 0.0]]),
                BezierSegment::Cubic([[3.0005, 0.0], [4.0, 1.0], [5.0, 1.0], [6.0, 0.0]]),
            ],
            Euclidean,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_segment_end_points() {
        let spline = mixed();
        assert_eq!(spline.segment_count(), 3);
        assert_eq!(spline.handle_count(), 13);
        for (index, segment) in spline.segments().iter().enumerate() {
            let start = spline
                .position_at(NormalizedSplineLocation::new(index as Scalar))
                .unwrap();
            assert!(Euclidean.distance(&start, segment.start()) < 1.0e-4);
        }
        let end = spline.position_at(spline.end_location()).unwrap();
        assert!(Euclidean.distance(&end, &[10.0, 0.0]) < 1.0e-4);
        assert_eq!(spline[SplineHandleIndex(4)], [3.0, 0.0]);
    }

    #[test]
    fn test_round_trip_normalization() {
        let spline = mixed();
        for index in 0..=30 {
            let location = NormalizedSplineLocation::new(index as Scalar * 0.1);
            let distance = spline.denormalize(location).unwrap();
            let back = spline.normalize(distance).unwrap();
            assert_relative_eq!(back.value(), location.value(), epsilon = 1.0e-3);
        }
        let total = spline.length();
        assert!(total > 10.0);
        let back = spline.denormalize(spline.normalize(SplineLocation(total)).unwrap());
        assert_relative_eq!(back.unwrap().value(), total, epsilon = 1.0e-3);
    }

    #[test]
    fn test_closest_point_on_mixed_spline() {
        let spline = mixed();
        let closest = spline.closest_point_to(&[4.0, -3.0]);
        assert!(closest.location.value() > 1.0 && closest.location.value() < 2.0);
        assert!(closest.distance < 2.5);
    }

    #[test]
    fn test_reversed() {
        let spline = mixed();
        let reversed = spline.reversed().unwrap();
        assert_eq!(reversed.segments()[0].start(), &[10.0, 0.0]);
        assert_eq!(reversed.segments()[2].end(), &[0.0, 0.0]);
        assert_relative_eq!(reversed.length(), spline.length(), epsilon = 1.0e-3);
    }

    #[test]
    fn test_serde_round_trip() {
        let spline = mixed();
        let json = serde_json::to_string(&spline).unwrap();
        let restored: Bezier2 = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.segments(), spline.segments());
        assert_eq!(restored.measured_segments(), 0);
    }
}
