use crate::Scalar;
use std::sync::OnceLock;

/// Lazily populated per-segment data of a spline.
///
/// Every slot is filled at most once, on first access, from a pure function of
/// the spline's immutable handles. Cache content is never persisted: splines
/// rebuild an empty cache whenever they are constructed or deserialized.
#[derive(Debug, Clone)]
pub struct SegmentCache<P> {
    polynomials: Vec<OnceLock<P>>,
    lengths: Vec<OnceLock<Scalar>>,
    offsets: OnceLock<Vec<Scalar>>,
}

impl<P> SegmentCache<P> {
    pub fn new(segment_count: usize) -> Self {
        Self {
            polynomials: (0..segment_count).map(|_| OnceLock::new()).collect(),
            lengths: (0..segment_count).map(|_| OnceLock::new()).collect(),
            offsets: OnceLock::new(),
        }
    }

    pub fn segment_count(&self) -> usize {
        self.polynomials.len()
    }

    /// Gets polynomial of given segment, building it with `build` on first access.
    ///
    /// # Panics
    /// When `index` is not a valid segment index.
    pub fn polynomial(&self, index: usize, build: impl FnOnce() -> P) -> &P {
        self.check_index(index);
        self.polynomials[index].get_or_init(build)
    }

    /// Gets arc length of given segment, measuring it with `measure` on first access.
    ///
    /// # Panics
    /// When `index` is not a valid segment index.
    pub fn length(&self, index: usize, measure: impl FnOnce() -> Scalar) -> Scalar {
        self.check_index(index);
        *self.lengths[index].get_or_init(|| {
            let length = measure();
            log::trace!("Cached length of segment {}: {}", index, length);
            length
        })
    }

    /// Gets distances from spline start to the beginning of every segment,
    /// followed by the total length.
    pub fn offsets(&self, mut length_of: impl FnMut(usize) -> Scalar) -> &[Scalar] {
        self.offsets.get_or_init(|| {
            let mut distance = 0.0;
            let mut result = Vec::with_capacity(self.segment_count() + 1);
            result.push(distance);
            for index in 0..self.segment_count() {
                distance += length_of(index);
                result.push(distance);
            }
            result
        })
    }

    /// Counts segments which length was already measured.
    pub fn measured_segments(&self) -> usize {
        self.lengths
            .iter()
            .filter(|length| length.get().is_some())
            .count()
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.segment_count(),
            "Segment index out of range: {} (segments count: {})",
            index,
            self.segment_count()
        );
    }
}
