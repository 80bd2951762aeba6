use crate::Scalar;

/// Return iterator over uniformly spread samples of `steps` in 0 to 1 range.
pub fn factor_iter(steps: usize) -> impl Iterator<Item = Scalar> {
    (0..=steps).map(move |index| {
        if index == steps {
            1.0
        } else {
            index as Scalar / steps as Scalar
        }
    })
}

/// Return iterator over uniformly spread samples of `steps` in `from` to `to` range.
///
/// Last sample is exactly `to`, free of accumulated rounding error.
pub fn range_iter(steps: usize, from: Scalar, to: Scalar) -> impl Iterator<Item = Scalar> {
    let diff = to - from;
    (0..=steps).map(move |index| {
        if index == steps {
            to
        } else {
            from + diff * index as Scalar / steps as Scalar
        }
    })
}

/// Snaps `value` to `0` or `limit` when it lies within `epsilon` of either.
pub fn snap_to_bounds(value: Scalar, limit: Scalar, epsilon: Scalar) -> Scalar {
    if value <= epsilon {
        0.0
    } else if limit - value <= epsilon {
        limit
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterators_hit_bounds() {
        let factors = factor_iter(3).collect::<Vec<_>>();
        assert_eq!(factors.len(), 4);
        assert_eq!(factors[0], 0.0);
        assert_eq!(factors[3], 1.0);

        let range = range_iter(7, 0.0, 0.7).collect::<Vec<_>>();
        assert_eq!(range.len(), 8);
        assert_eq!(*range.last().unwrap(), 0.7);
    }

    #[test]
    fn test_snap_to_bounds() {
        assert_eq!(snap_to_bounds(0.0005, 2.0, 0.001), 0.0);
        assert_eq!(snap_to_bounds(1.9995, 2.0, 0.001), 2.0);
        assert_eq!(snap_to_bounds(1.0, 2.0, 0.001), 1.0);
    }
}
