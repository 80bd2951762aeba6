use crate::Scalar;
use serde::{Deserialize, Serialize};

/// Vector space arithmetic over position type `Pos` and displacement type `Diff`.
///
/// Implementations are stateless behavior objects: every spline of one coordinate
/// system shares the same operations value. All methods must be pure, since
/// splines memoize results derived from them.
pub trait GeometricOperations<Pos, Diff> {
    /// `position + offset`
    fn add(&self, position: &Pos, offset: &Diff) -> Pos;
    /// `to - from`
    fn sub(&self, to: &Pos, from: &Pos) -> Diff;
    /// `position - offset`
    fn sub_diff(&self, position: &Pos, offset: &Diff) -> Pos;
    /// `a - b`
    fn sub_diffs(&self, a: &Diff, b: &Diff) -> Diff;
    /// `a + b`
    fn add_diffs(&self, a: &Diff, b: &Diff) -> Diff;
    fn mul(&self, value: &Diff, factor: Scalar) -> Diff;
    fn div(&self, value: &Diff, divisor: Scalar) -> Diff;
    fn dot(&self, a: &Diff, b: &Diff) -> Scalar;
    fn distance(&self, a: &Pos, b: &Pos) -> Scalar;
    fn lerp(&self, from: &Pos, to: &Pos, factor: Scalar) -> Pos;

    fn length_squared(&self, value: &Diff) -> Scalar {
        self.dot(value, value)
    }

    fn length(&self, value: &Diff) -> Scalar {
        self.length_squared(value).sqrt()
    }

    fn distance_squared(&self, a: &Pos, b: &Pos) -> Scalar {
        self.length_squared(&self.sub(b, a))
    }

    fn negate(&self, value: &Diff) -> Diff {
        self.mul(value, -1.0)
    }

    /// Zero displacement, derived from any position of the space.
    fn zero(&self, anchor: &Pos) -> Diff {
        self.sub(anchor, anchor)
    }

    /// Unit length copy of `value`, or `value` itself when it has no length.
    fn normalize(&self, value: &Diff) -> Diff {
        let length = self.length(value);
        if length > 0.0 {
            self.div(value, length)
        } else {
            self.mul(value, 0.0)
        }
    }
}

/// Euclidean operations over plain scalar tuples and arrays, where positions
/// and displacements share one representation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Euclidean;

impl GeometricOperations<Scalar, Scalar> for Euclidean {
    fn add(&self, position: &Scalar, offset: &Scalar) -> Scalar {
        position + offset
    }

    fn sub(&self, to: &Scalar, from: &Scalar) -> Scalar {
        to - from
    }

    fn sub_diff(&self, position: &Scalar, offset: &Scalar) -> Scalar {
        position - offset
    }

    fn sub_diffs(&self, a: &Scalar, b: &Scalar) -> Scalar {
        a - b
    }

    fn add_diffs(&self, a: &Scalar, b: &Scalar) -> Scalar {
        a + b
    }

    fn mul(&self, value: &Scalar, factor: Scalar) -> Scalar {
        value * factor
    }

    fn div(&self, value: &Scalar, divisor: Scalar) -> Scalar {
        value / divisor
    }

    fn dot(&self, a: &Scalar, b: &Scalar) -> Scalar {
        a * b
    }

    fn distance(&self, a: &Scalar, b: &Scalar) -> Scalar {
        (b - a).abs()
    }

    fn lerp(&self, from: &Scalar, to: &Scalar, factor: Scalar) -> Scalar {
        (to - from) * factor + from
    }
}

impl<const N: usize> GeometricOperations<[Scalar; N], [Scalar; N]> for Euclidean {
    fn add(&self, position: &[Scalar; N], offset: &[Scalar; N]) -> [Scalar; N] {
        std::array::from_fn(|index| position[index] + offset[index])
    }

    fn sub(&self, to: &[Scalar; N], from: &[Scalar; N]) -> [Scalar; N] {
        std::array::from_fn(|index| to[index] - from[index])
    }

    fn sub_diff(&self, position: &[Scalar; N], offset: &[Scalar; N]) -> [Scalar; N] {
        std::array::from_fn(|index| position[index] - offset[index])
    }

    fn sub_diffs(&self, a: &[Scalar; N], b: &[Scalar; N]) -> [Scalar; N] {
        std::array::from_fn(|index| a[index] - b[index])
    }

    fn add_diffs(&self, a: &[Scalar; N], b: &[Scalar; N]) -> [Scalar; N] {
        std::array::from_fn(|index| a[index] + b[index])
    }

    fn mul(&self, value: &[Scalar; N], factor: Scalar) -> [Scalar; N] {
        std::array::from_fn(|index| value[index] * factor)
    }

    fn div(&self, value: &[Scalar; N], divisor: Scalar) -> [Scalar; N] {
        std::array::from_fn(|index| value[index] / divisor)
    }

    fn dot(&self, a: &[Scalar; N], b: &[Scalar; N]) -> Scalar {
        a.iter().zip(b.iter()).map(|(a, b)| a * b).sum()
    }

    fn distance(&self, a: &[Scalar; N], b: &[Scalar; N]) -> Scalar {
        a.iter()
            .zip(b.iter())
            .map(|(a, b)| (b - a) * (b - a))
            .sum::<Scalar>()
            .sqrt()
    }

    fn lerp(&self, from: &[Scalar; N], to: &[Scalar; N], factor: Scalar) -> [Scalar; N] {
        std::array::from_fn(|index| (to[index] - from[index]) * factor + from[index])
    }
}

impl GeometricOperations<(Scalar, Scalar), (Scalar, Scalar)> for Euclidean {
    fn add(&self, position: &(Scalar, Scalar), offset: &(Scalar, Scalar)) -> (Scalar, Scalar) {
        (position.0 + offset.0, position.1 + offset.1)
    }

    fn sub(&self, to: &(Scalar, Scalar), from: &(Scalar, Scalar)) -> (Scalar, Scalar) {
        (to.0 - from.0, to.1 - from.1)
    }

    fn sub_diff(
        &self,
        position: &(Scalar, Scalar),
        offset: &(Scalar, Scalar),
    ) -> (Scalar, Scalar) {
        (position.0 - offset.0, position.1 - offset.1)
    }

    fn sub_diffs(&self, a: &(Scalar, Scalar), b: &(Scalar, Scalar)) -> (Scalar, Scalar) {
        (a.0 - b.0, a.1 - b.1)
    }

    fn add_diffs(&self, a: &(Scalar, Scalar), b: &(Scalar, Scalar)) -> (Scalar, Scalar) {
        (a.0 + b.0, a.1 + b.1)
    }

    fn mul(&self, value: &(Scalar, Scalar), factor: Scalar) -> (Scalar, Scalar) {
        (value.0 * factor, value.1 * factor)
    }

    fn div(&self, value: &(Scalar, Scalar), divisor: Scalar) -> (Scalar, Scalar) {
        (value.0 / divisor, value.1 / divisor)
    }

    fn dot(&self, a: &(Scalar, Scalar), b: &(Scalar, Scalar)) -> Scalar {
        a.0 * b.0 + a.1 * b.1
    }

    fn distance(&self, a: &(Scalar, Scalar), b: &(Scalar, Scalar)) -> Scalar {
        let dx = b.0 - a.0;
        let dy = b.1 - a.1;
        (dx * dx + dy * dy).sqrt()
    }

    fn lerp(
        &self,
        from: &(Scalar, Scalar),
        to: &(Scalar, Scalar),
        factor: Scalar,
    ) -> (Scalar, Scalar) {
        (
            (to.0 - from.0) * factor + from.0,
            (to.1 - from.1) * factor + from.1,
        )
    }
}

type Tuple3 = (Scalar, Scalar, Scalar);

impl GeometricOperations<Tuple3, Tuple3> for Euclidean {
    fn add(&self, position: &Tuple3, offset: &Tuple3) -> Tuple3 {
        (
            position.0 + offset.0,
            position.1 + offset.1,
            position.2 + offset.2,
        )
    }

    fn sub(&self, to: &Tuple3, from: &Tuple3) -> Tuple3 {
        (to.0 - from.0, to.1 - from.1, to.2 - from.2)
    }

    fn sub_diff(&self, position: &Tuple3, offset: &Tuple3) -> Tuple3 {
        (
            position.0 - offset.0,
            position.1 - offset.1,
            position.2 - offset.2,
        )
    }

    fn sub_diffs(&self, a: &Tuple3, b: &Tuple3) -> Tuple3 {
        (a.0 - b.0, a.1 - b.1, a.2 - b.2)
    }

    fn add_diffs(&self, a: &Tuple3, b: &Tuple3) -> Tuple3 {
        (a.0 + b.0, a.1 + b.1, a.2 + b.2)
    }

    fn mul(&self, value: &Tuple3, factor: Scalar) -> Tuple3 {
        (value.0 * factor, value.1 * factor, value.2 * factor)
    }

    fn div(&self, value: &Tuple3, divisor: Scalar) -> Tuple3 {
        (value.0 / divisor, value.1 / divisor, value.2 / divisor)
    }

    fn dot(&self, a: &Tuple3, b: &Tuple3) -> Scalar {
        a.0 * b.0 + a.1 * b.1 + a.2 * b.2
    }

    fn distance(&self, a: &Tuple3, b: &Tuple3) -> Scalar {
        let delta = self.sub(b, a);
        self.dot(&delta, &delta).sqrt()
    }

    fn lerp(&self, from: &Tuple3, to: &Tuple3, factor: Scalar) -> Tuple3 {
        (
            (to.0 - from.0) * factor + from.0,
            (to.1 - from.1) * factor + from.1,
            (to.2 - from.2) * factor + from.2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_array_operations() {
        let ops = Euclidean;
        let a: [Scalar; 3] = [1.0, 2.0, 3.0];
        let b: [Scalar; 3] = [4.0, 6.0, 3.0];
        assert_eq!(ops.sub(&b, &a), [3.0, 4.0, 0.0]);
        assert_eq!(ops.add(&a, &[1.0, 1.0, 1.0]), [2.0, 3.0, 4.0]);
        assert_eq!(ops.sub_diff(&a, &[1.0, 1.0, 1.0]), [0.0, 1.0, 2.0]);
        assert_relative_eq!(ops.distance(&a, &b), 5.0);
        assert_relative_eq!(ops.dot(&a, &b), 25.0);
        assert_eq!(ops.lerp(&a, &b, 0.5), [2.5, 4.0, 3.0]);
        assert_eq!(ops.zero(&a), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_tuple_operations_agree_with_arrays() {
        let ops = Euclidean;
        let a: (Scalar, Scalar) = (1.0, -2.0);
        let b: (Scalar, Scalar) = (-3.0, 1.0);
        let distance_tuple = ops.distance(&a, &b);
        let distance_array = ops.distance(&[1.0 as Scalar, -2.0], &[-3.0, 1.0]);
        assert_relative_eq!(distance_tuple, distance_array);
        assert_relative_eq!(distance_tuple, 5.0);

        let c: Tuple3 = (1.0, 2.0, 2.0);
        assert_relative_eq!(ops.length(&c), 3.0);
        let unit = ops.normalize(&c);
        assert_relative_eq!(ops.length(&unit), 1.0);
    }

    #[test]
    fn test_normalize_zero_length() {
        let ops = Euclidean;
        let zero: [Scalar; 2] = [0.0, 0.0];
        assert_eq!(ops.normalize(&zero), zero);
        assert_eq!(ops.negate(&(2.0 as Scalar)), -2.0);
    }
}
