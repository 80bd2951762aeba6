//! Derivation of new splines out of existing ones.

use crate::{
    bezier::BezierSpline,
    catmull_rom::{mirror, CatmullRomSpline},
    error::{SplineError, SplineResult},
    geometry::GeometricOperations,
    location::{NormalizedSplineLocation, SplineLocation},
    spline::Spline,
    utils::range_iter,
    Scalar,
};

/// Upper bound of segments produced by resampling a spline.
pub const MAX_RESAMPLE_STEPS: usize = 1 << 20;

impl<Pos, Diff, G> CatmullRomSpline<Pos, Diff, G>
where
    Pos: Clone,
    Diff: Clone,
    G: GeometricOperations<Pos, Diff> + Clone,
{
    /// Builds new spline with every handle moved by `-tangent_to_offset(tangent)`,
    /// where `tangent` is the first derivative of this spline at that handle.
    ///
    /// Margin handles use the tangent at the spline end they are attached to.
    /// Tangent length follows handle spacing, normalize it inside the callback
    /// for constant width offsets.
    pub fn copy_with_offset(
        &self,
        mut tangent_to_offset: impl FnMut(&Diff) -> Diff,
    ) -> SplineResult<Self> {
        let ops = self.operations();
        let handles = self
            .handles()
            .iter()
            .enumerate()
            .map(|(index, handle)| {
                let location = index.saturating_sub(1).min(self.segment_count());
                let tangent = self.tangent_at(NormalizedSplineLocation::new(location as Scalar))?;
                let offset = tangent_to_offset(&tangent);
                Ok(ops.sub_diff(handle, &offset))
            })
            .collect::<SplineResult<Vec<_>>>()?;
        self.rebuild(handles)
    }

    /// Builds new spline with every handle translated by `offset`.
    pub fn copy_with_static_offset(&self, offset: &Diff) -> SplineResult<Self> {
        let ops = self.operations();
        self.rebuild(
            self.handles()
                .iter()
                .map(|handle| ops.add(handle, offset))
                .collect(),
        )
    }

    /// Resamples spline into handles spread uniformly along its arc length.
    ///
    /// Actual spacing is the closest one to `handle_distance` that divides the
    /// spline length evenly. New margins lie one spacing away from the end
    /// handles, towards the original margins.
    pub fn copy_with_different_handle_distance(
        &self,
        handle_distance: Scalar,
    ) -> SplineResult<Self> {
        if !handle_distance.is_finite() || handle_distance <= 0.0 {
            return Err(SplineError::InvalidHandleDistance(handle_distance));
        }
        let ops = self.operations();
        let length = self.length();
        let steps = (length / handle_distance).round();
        if !(steps <= MAX_RESAMPLE_STEPS as Scalar) {
            log::debug!(
                "Handle distance {} yields {} steps over spline length {}",
                handle_distance,
                steps,
                length
            );
            return Err(SplineError::InvalidHandleDistance(handle_distance));
        }
        let steps = (steps as usize).max(1);
        let spacing = length / steps as Scalar;
        let locations = range_iter(steps, 0.0, length)
            .map(SplineLocation)
            .collect::<Vec<_>>();
        let interior = self
            .bulk_normalize_ordered(&locations)?
            .into_iter()
            .map(|location| self.position_at(location))
            .collect::<SplineResult<Vec<_>>>()?;
        log::debug!(
            "Resampled spline of length {} into {} handles (spacing: {})",
            length,
            interior.len(),
            spacing
        );
        let count = interior.len();
        let begin = self.margin_towards(&interior[0], &interior[1], self.begin_margin(), spacing);
        let end = self.margin_towards(
            &interior[count - 1],
            &interior[count - 2],
            self.end_margin(),
            spacing,
        );
        let handles = std::iter::once(begin)
            .chain(interior)
            .chain(std::iter::once(end))
            .collect();
        self.rebuild(handles)
    }

    /// Places margin `spacing` away from `anchor` in direction of `original`
    /// margin, or mirrors `neighbor` when original margin coincides with anchor.
    fn margin_towards(&self, anchor: &Pos, neighbor: &Pos, original: &Pos, spacing: Scalar) -> Pos {
        let ops = self.operations();
        let distance = ops.distance(anchor, original);
        if distance > self.config().min_chord_length {
            ops.lerp(anchor, original, spacing / distance)
        } else {
            mirror(ops, anchor, neighbor)
        }
    }
}

impl<Pos, Diff, G> BezierSpline<Pos, Diff, G>
where
    Pos: Clone,
    G: GeometricOperations<Pos, Diff> + Clone,
{
    /// Builds new spline with every control point translated by `offset`.
    pub fn copy_with_static_offset(&self, offset: &Diff) -> SplineResult<Self> {
        let ops = self.operations();
        Self::with_config(
            self.segments()
                .iter()
                .map(|segment| segment.map(|point| ops.add(point, offset)))
                .collect(),
            ops.clone(),
            *self.config(),
        )
    }
}
