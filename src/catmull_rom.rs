use crate::{
    cache::SegmentCache,
    config::SplineConfig,
    error::{SplineError, SplineResult},
    geometry::GeometricOperations,
    location::{NormalizedSplineLocation, SplineHandleIndex, SplineSegmentIndex},
    polynomial::{CubicPolynomial, Polynomial},
    spline::Spline,
    Scalar,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{convert::TryFrom, ops::Index};

/// Minimal number of handles of Catmull-Rom spline: two margins and two visited handles.
pub const CATMULL_ROM_MIN_HANDLES: usize = 4;

/// Catmull-Rom parameterization.
///
/// Selects exponent applied to chord lengths when computing segment time deltas.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplineType {
    /// `alpha = 0`
    Uniform,
    /// `alpha = 0.5`, free of cusps and self-intersections within a segment.
    #[default]
    Centripetal,
    /// `alpha = 1`
    Chordal,
}

impl SplineType {
    pub fn alpha(self) -> Scalar {
        match self {
            Self::Uniform => 0.0,
            Self::Centripetal => 0.5,
            Self::Chordal => 1.0,
        }
    }
}

/// Four consecutive handles defining one Catmull-Rom segment.
///
/// The segment itself goes from `p1` to `p2`; `p0` and `p3` only shape it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatmullRomSegment<Pos> {
    pub p0: Pos,
    pub p1: Pos,
    pub p2: Pos,
    pub p3: Pos,
}

impl<Pos> CatmullRomSegment<Pos> {
    /// Computes chord based time deltas `[dt0, dt1, dt2]` as `chord^alpha`.
    ///
    /// Chords shorter than `min_chord_length` take time delta of a neighboring
    /// non-degenerate chord, so tangents never divide by zero.
    pub fn time_deltas<Diff, G>(
        &self,
        ops: &G,
        spline_type: SplineType,
        min_chord_length: Scalar,
    ) -> [Scalar; 3]
    where
        G: GeometricOperations<Pos, Diff>,
    {
        let alpha = spline_type.alpha();
        let chords = [
            ops.distance(&self.p0, &self.p1),
            ops.distance(&self.p1, &self.p2),
            ops.distance(&self.p2, &self.p3),
        ];
        let degenerate = |chord: Scalar| chord < min_chord_length;
        let [c0, c1, c2] = chords;
        let dt1 = if !degenerate(c1) {
            c1.powf(alpha)
        } else if !degenerate(c0) {
            c0.powf(alpha)
        } else if !degenerate(c2) {
            c2.powf(alpha)
        } else {
            1.0
        };
        let dt0 = if degenerate(c0) { dt1 } else { c0.powf(alpha) };
        let dt2 = if degenerate(c2) { dt1 } else { c2.powf(alpha) };
        [dt0, dt1, dt2]
    }
}

/// Serializable definition of Catmull-Rom spline.
///
/// Geometric operations are not serialized: they are restored from `Default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatmullRomSplineDef<Pos> {
    /// Handles including both margins.
    pub handles: Vec<Pos>,
    #[serde(default)]
    pub spline_type: SplineType,
    #[serde(default)]
    pub config: SplineConfig,
}

/// Catmull-Rom spline passing through all of its handles except the two margins.
///
/// Handles are `[begin margin, h0, h1, .., hn, end margin]` and never change
/// after construction; every modification produces a new spline. Segment
/// polynomials and lengths are computed on first use and cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CatmullRomSplineDef<Pos>")]
#[serde(into = "CatmullRomSplineDef<Pos>")]
#[serde(bound = "Pos: Clone + Serialize + DeserializeOwned, Diff: Clone, G: GeometricOperations<Pos, Diff> + Clone + Default")]
pub struct CatmullRomSpline<Pos, Diff, G> {
    handles: Vec<Pos>,
    spline_type: SplineType,
    operations: G,
    config: SplineConfig,
    cache: SegmentCache<CubicPolynomial<Pos, Diff>>,
}

impl<Pos, Diff, G> CatmullRomSpline<Pos, Diff, G>
where
    Pos: Clone,
    Diff: Clone,
    G: GeometricOperations<Pos, Diff>,
{
    /// Builds spline out of handles including both margin handles.
    pub fn new(handles: Vec<Pos>, spline_type: SplineType, operations: G) -> SplineResult<Self> {
        Self::with_config(handles, spline_type, operations, SplineConfig::default())
    }

    /// Builds spline out of handles including both margin handles, using given tolerances.
    pub fn with_config(
        handles: Vec<Pos>,
        spline_type: SplineType,
        operations: G,
        config: SplineConfig,
    ) -> SplineResult<Self> {
        if handles.len() < CATMULL_ROM_MIN_HANDLES {
            return Err(SplineError::NotEnoughHandles {
                required: CATMULL_ROM_MIN_HANDLES,
                actual: handles.len(),
            });
        }
        let segment_count = handles.len() - 3;
        log::debug!(
            "Built {:?} Catmull-Rom spline with {} segments",
            spline_type,
            segment_count
        );
        Ok(Self {
            handles,
            spline_type,
            operations,
            config,
            cache: SegmentCache::new(segment_count),
        })
    }

    /// Builds spline out of explicit margins and visited handles.
    pub fn with_margins(
        begin_margin: Pos,
        handles: impl IntoIterator<Item = Pos>,
        end_margin: Pos,
        spline_type: SplineType,
        operations: G,
    ) -> SplineResult<Self> {
        let handles = std::iter::once(begin_margin)
            .chain(handles)
            .chain(std::iter::once(end_margin))
            .collect();
        Self::new(handles, spline_type, operations)
    }

    /// Builds spline going through all `handles`, mirroring first and last
    /// handle pairs to get margins.
    pub fn from_interior(
        handles: Vec<Pos>,
        spline_type: SplineType,
        operations: G,
    ) -> SplineResult<Self> {
        if handles.len() < 2 {
            return Err(SplineError::NotEnoughHandles {
                required: 2,
                actual: handles.len(),
            });
        }
        let count = handles.len();
        let begin = mirror(&operations, &handles[0], &handles[1]);
        let end = mirror(&operations, &handles[count - 1], &handles[count - 2]);
        Self::with_margins(begin, handles, end, spline_type, operations)
    }

    /// Builds new spline of the same type, operations and config out of other handles.
    pub(crate) fn rebuild(&self, handles: Vec<Pos>) -> SplineResult<Self>
    where
        G: Clone,
    {
        Self::with_config(
            handles,
            self.spline_type,
            self.operations.clone(),
            self.config,
        )
    }

    /// Reverses spline direction.
    pub fn reversed(&self) -> SplineResult<Self>
    where
        G: Clone,
    {
        self.rebuild(self.handles.iter().rev().cloned().collect())
    }

    pub fn spline_type(&self) -> SplineType {
        self.spline_type
    }

    /// Gets all handles, margins included.
    pub fn handles(&self) -> &[Pos] {
        &self.handles
    }

    /// Gets handles the spline goes through, margins excluded.
    pub fn interior_handles(&self) -> &[Pos] {
        &self.handles[1..self.handles.len() - 1]
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    pub fn begin_margin(&self) -> &Pos {
        &self.handles[0]
    }

    pub fn end_margin(&self) -> &Pos {
        &self.handles[self.handles.len() - 1]
    }

    /// Gets handles window of given segment.
    ///
    /// # Panics
    /// When `index` is not a valid segment index.
    pub fn segment(&self, index: SplineSegmentIndex) -> CatmullRomSegment<Pos> {
        assert!(
            index.0 < self.cache.segment_count(),
            "Segment index out of range: {} (segments count: {})",
            index.0,
            self.cache.segment_count()
        );
        let window = &self.handles[index.0..index.0 + 4];
        CatmullRomSegment {
            p0: window[0].clone(),
            p1: window[1].clone(),
            p2: window[2].clone(),
            p3: window[3].clone(),
        }
    }

    /// Gets handles window surrounding given normalized location.
    ///
    /// Locations slightly past the last segment (within `segment_overshoot`)
    /// resolve to the last segment.
    pub fn segment_at(
        &self,
        location: NormalizedSplineLocation,
    ) -> SplineResult<CatmullRomSegment<Pos>> {
        let (index, _) = self.resolve(location)?;
        Ok(self.segment(index))
    }

    /// Counts segments which length was already computed.
    pub fn measured_segments(&self) -> usize {
        self.cache.measured_segments()
    }
}

/// Reflects `neighbor` through `anchor`.
pub(crate) fn mirror<Pos, Diff, G>(ops: &G, anchor: &Pos, neighbor: &Pos) -> Pos
where
    G: GeometricOperations<Pos, Diff>,
{
    ops.sub_diff(anchor, &ops.sub(neighbor, anchor))
}

impl<Pos, Diff, G> Spline<Pos, Diff> for CatmullRomSpline<Pos, Diff, G>
where
    Pos: Clone,
    Diff: Clone,
    G: GeometricOperations<Pos, Diff>,
{
    type Operations = G;
    type Segment = CubicPolynomial<Pos, Diff>;

    fn operations(&self) -> &G {
        &self.operations
    }

    fn config(&self) -> &SplineConfig {
        &self.config
    }

    fn segment_count(&self) -> usize {
        self.cache.segment_count()
    }

    fn polynomial(&self, index: SplineSegmentIndex) -> &CubicPolynomial<Pos, Diff> {
        self.cache.polynomial(index.0, || {
            CubicPolynomial::from_catmull_rom(
                &self.operations,
                &self.segment(index),
                self.spline_type,
                self.config.min_chord_length,
            )
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

impl<Pos, Diff, G> Index<SplineHandleIndex> for CatmullRomSpline<Pos, Diff, G> {
    type Output = Pos;

    fn index(&self, index: SplineHandleIndex) -> &Pos {
        &self.handles[index.0]
    }
}

impl<Pos, Diff, G> Index<SplineSegmentIndex> for CatmullRomSpline<Pos, Diff, G>
where
    Pos: Clone,
    Diff: Clone,
    G: GeometricOperations<Pos, Diff>,
{
    type Output = CubicPolynomial<Pos, Diff>;

    fn index(&self, index: SplineSegmentIndex) -> &Self::Output {
        self.polynomial(index)
    }
}

impl<Pos, Diff, G> TryFrom<CatmullRomSplineDef<Pos>> for CatmullRomSpline<Pos, Diff, G>
where
    Pos: Clone,
    Diff: Clone,
    G: GeometricOperations<Pos, Diff> + Default,
{
    type Error = SplineError;

    fn try_from(value: CatmullRomSplineDef<Pos>) -> Result<Self, Self::Error> {
        Self::with_config(value.handles, value.spline_type, G::default(), value.config)
    }
}

impl<Pos, Diff, G> From<CatmullRomSpline<Pos, Diff, G>> for CatmullRomSplineDef<Pos> {
    fn from(v: CatmullRomSpline<Pos, Diff, G>) -> Self {
        Self {
            handles: v.handles,
            spline_type: v.spline_type,
            config: v.config,
        }
    }
}
