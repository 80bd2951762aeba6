use crate::{
    catmull_rom::{CatmullRomSegment, SplineType},
    geometry::GeometricOperations,
    utils::factor_iter,
    Scalar,
};

/// Parametric polynomial segment evaluated over local parameter `t` in `[0; 1]`.
///
/// Evaluation outside of that domain is a contract violation and panics:
/// callers are expected to normalize locations before evaluating.
pub trait Polynomial<Pos, Diff> {
    fn evaluate<G>(&self, ops: &G, t: Scalar) -> Pos
    where
        G: GeometricOperations<Pos, Diff>;

    fn evaluate_derivative<G>(&self, ops: &G, t: Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>;

    fn evaluate_second_derivative<G>(&self, ops: &G, t: Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>;

    /// Finds local parameter closest to `target`, starting Newton-Raphson
    /// iteration from the middle of the segment.
    fn evaluate_closest_point_to<G>(&self, ops: &G, target: &Pos, iterations: usize) -> Scalar
    where
        G: GeometricOperations<Pos, Diff>,
    {
        self.evaluate_closest_point_from(ops, target, 0.5, iterations)
    }

    /// Minimizes `d(t) = |P(t) - target|^2` by Newton-Raphson on `d'(t) = 0`.
    ///
    /// Runs exactly `iterations` steps unless `d''(t)` vanishes, in which case
    /// current estimate is returned. Result is a local minimum reachable from
    /// `guess`, not necessarily the global one.
    fn evaluate_closest_point_from<G>(
        &self,
        ops: &G,
        target: &Pos,
        guess: Scalar,
        iterations: usize,
    ) -> Scalar
    where
        G: GeometricOperations<Pos, Diff>,
    {
        let mut time = guess.clamp(0.0, 1.0);
        for iteration in 0..iterations {
            let position = self.evaluate(ops, time);
            let tangent = self.evaluate_derivative(ops, time);
            let curvature = self.evaluate_second_derivative(ops, time);
            let difference = ops.sub(&position, target);
            let first = 2.0 * ops.dot(&difference, &tangent);
            let second = 2.0 * (ops.dot(&tangent, &tangent) + ops.dot(&difference, &curvature));
            if second.abs() < Scalar::EPSILON {
                log::trace!(
                    "Closest point search stalled at t = {} after {} iterations",
                    time,
                    iteration
                );
                break;
            }
            // floating point error can push the estimate slightly out of domain
            time = (time - first / second).clamp(0.0, 1.0);
        }
        time
    }

    /// Approximates arc length by summing `samples` uniformly spaced chords.
    fn length<G>(&self, ops: &G, samples: usize) -> Scalar
    where
        G: GeometricOperations<Pos, Diff>,
    {
        let mut previous: Option<Pos> = None;
        let mut result = 0.0;
        for factor in factor_iter(samples.max(1)) {
            let position = self.evaluate(ops, factor);
            if let Some(previous) = previous.as_ref() {
                result += ops.distance(previous, &position);
            }
            previous = Some(position);
        }
        result
    }
}

fn check_domain(t: Scalar) {
    assert!(
        (0.0..=1.0).contains(&t),
        "Polynomial parameter must be within [0; 1], got: {}",
        t
    );
}

fn binomial(n: usize, k: usize) -> Scalar {
    (0..k).fold(1.0, |result, i| result * (n - i) as Scalar / (i + 1) as Scalar)
}

/// Converts Bezier control polygon into power basis coefficients of `t^1..t^n`,
/// all relative to the first control point.
fn bezier_power_basis<Pos, Diff, G>(ops: &G, points: &[Pos]) -> Vec<Diff>
where
    G: GeometricOperations<Pos, Diff>,
{
    let degree = points.len() - 1;
    let deltas = points[1..]
        .iter()
        .map(|point| ops.sub(point, &points[0]))
        .collect::<Vec<_>>();
    (1..=degree)
        .map(|k| {
            let mut sum = ops.mul(&deltas[0], 0.0);
            for i in 1..=k {
                let sign = if (k - i) % 2 == 0 { 1.0 } else { -1.0 };
                let term = ops.mul(&deltas[i - 1], sign * binomial(k, i));
                sum = ops.add_diffs(&sum, &term);
            }
            ops.mul(&sum, binomial(degree, k))
        })
        .collect()
}

/// Cubic polynomial segment `P(t) = a*t^3 + b*t^2 + c*t + d`.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicPolynomial<Pos, Diff> {
    pub a: Diff,
    pub b: Diff,
    pub c: Diff,
    pub d: Pos,
}

impl<Pos, Diff> CubicPolynomial<Pos, Diff> {
    pub fn new(a: Diff, b: Diff, c: Diff, d: Pos) -> Self {
        Self { a, b, c, d }
    }

    /// Builds cubic Hermite polynomial going from `from` to `to` with given end tangents.
    pub fn hermite<G>(ops: &G, from: &Pos, to: &Pos, from_tangent: &Diff, to_tangent: &Diff) -> Self
    where
        Pos: Clone,
        Diff: Clone,
        G: GeometricOperations<Pos, Diff>,
    {
        let chord = ops.sub(to, from);
        let tangents = ops.add_diffs(from_tangent, to_tangent);
        let a = ops.add_diffs(&ops.mul(&chord, -2.0), &tangents);
        let b = ops.sub_diffs(
            &ops.sub_diffs(&ops.mul(&chord, 3.0), &ops.mul(from_tangent, 2.0)),
            to_tangent,
        );
        Self::new(a, b, from_tangent.clone(), from.clone())
    }

    /// Builds polynomial of Catmull-Rom segment going from `p1` to `p2`.
    ///
    /// Tangents are scaled by chord based time deltas (see
    /// [`CatmullRomSegment::time_deltas`]), so that centripetal and chordal
    /// parameterizations do not produce cusps on uneven handle spacing.
    pub fn from_catmull_rom<G>(
        ops: &G,
        segment: &CatmullRomSegment<Pos>,
        spline_type: SplineType,
        min_chord_length: Scalar,
    ) -> Self
    where
        Pos: Clone,
        Diff: Clone,
        G: GeometricOperations<Pos, Diff>,
    {
        let CatmullRomSegment { p0, p1, p2, p3 } = segment;
        let [dt0, dt1, dt2] = segment.time_deltas(ops, spline_type, min_chord_length);
        let tangent = |from: &Pos, center: &Pos, to: &Pos, dt_in: Scalar, dt_out: Scalar| {
            let incoming = ops.div(&ops.sub(center, from), dt_in);
            let across = ops.div(&ops.sub(to, from), dt_in + dt_out);
            let outgoing = ops.div(&ops.sub(to, center), dt_out);
            let result = ops.add_diffs(&ops.sub_diffs(&incoming, &across), &outgoing);
            ops.mul(&result, dt1)
        };
        let t1 = tangent(p0, p1, p2, dt0, dt1);
        let t2 = tangent(p1, p2, p3, dt1, dt2);
        Self::hermite(ops, p1, p2, &t1, &t2)
    }

    /// Builds polynomial of quadratic (3 points) or cubic (4 points) Bezier curve.
    ///
    /// # Panics
    /// When number of control points is neither 3 nor 4.
    pub fn from_bezier<G>(ops: &G, points: &[Pos]) -> Self
    where
        Pos: Clone,
        G: GeometricOperations<Pos, Diff>,
    {
        assert!(
            points.len() == 3 || points.len() == 4,
            "Cubic polynomial needs 3 or 4 Bezier control points, got: {}",
            points.len()
        );
        let mut coefficients = bezier_power_basis(ops, points).into_iter();
        let c = coefficients.next().unwrap_or_else(|| ops.zero(&points[0]));
        let b = coefficients.next().unwrap_or_else(|| ops.zero(&points[0]));
        let a = coefficients.next().unwrap_or_else(|| ops.zero(&points[0]));
        Self::new(a, b, c, points[0].clone())
    }
}

impl<Pos, Diff> Polynomial<Pos, Diff> for CubicPolynomial<Pos, Diff> {
    fn evaluate<G>(&self, ops: &G, t: Scalar) -> Pos
    where
        G: GeometricOperations<Pos, Diff>,
    {
        check_domain(t);
        // Horner: ((a*t + b)*t + c)*t + d
        let result = ops.add_diffs(&ops.mul(&self.a, t), &self.b);
        let result = ops.add_diffs(&ops.mul(&result, t), &self.c);
        ops.add(&self.d, &ops.mul(&result, t))
    }

    fn evaluate_derivative<G>(&self, ops: &G, t: Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>,
    {
        check_domain(t);
        let result = ops.add_diffs(&ops.mul(&self.a, 3.0 * t), &ops.mul(&self.b, 2.0));
        ops.add_diffs(&ops.mul(&result, t), &self.c)
    }

    fn evaluate_second_derivative<G>(&self, ops: &G, t: Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>,
    {
        check_domain(t);
        ops.add_diffs(&ops.mul(&self.a, 6.0 * t), &ops.mul(&self.b, 2.0))
    }
}

/// Quintic polynomial segment `P(t) = origin + sum(coefficients[k-1] * t^k)` for `k` in `1..=5`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuinticPolynomial<Pos, Diff> {
    pub coefficients: [Diff; 5],
    pub origin: Pos,
}

impl<Pos, Diff> QuinticPolynomial<Pos, Diff> {
    pub fn new(coefficients: [Diff; 5], origin: Pos) -> Self {
        Self {
            coefficients,
            origin,
        }
    }

    /// Builds polynomial of quintic Bezier curve.
    pub fn from_bezier<G>(ops: &G, points: &[Pos; 6]) -> Self
    where
        Pos: Clone,
        G: GeometricOperations<Pos, Diff>,
    {
        let mut coefficients = bezier_power_basis(ops, points).into_iter();
        let mut next = || match coefficients.next() {
            Some(value) => value,
            None => ops.zero(&points[0]),
        };
        let coefficients = [next(), next(), next(), next(), next()];
        Self::new(coefficients, points[0].clone())
    }

    /// Sums `coefficients[k] * weight(k + 1)` over all coefficients.
    fn weighted_sum<G>(&self, ops: &G, weight: impl Fn(usize) -> Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>,
    {
        let mut result = ops.mul(&self.coefficients[0], weight(1));
        for (index, coefficient) in self.coefficients.iter().enumerate().skip(1) {
            result = ops.add_diffs(&result, &ops.mul(coefficient, weight(index + 1)));
        }
        result
    }
}

impl<Pos, Diff> Polynomial<Pos, Diff> for QuinticPolynomial<Pos, Diff> {
    fn evaluate<G>(&self, ops: &G, t: Scalar) -> Pos
    where
        G: GeometricOperations<Pos, Diff>,
    {
        check_domain(t);
        let offset = self.weighted_sum(ops, |power| t.powi(power as i32));
        ops.add(&self.origin, &offset)
    }

    fn evaluate_derivative<G>(&self, ops: &G, t: Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>,
    {
        check_domain(t);
        self.weighted_sum(ops, |power| power as Scalar * t.powi(power as i32 - 1))
    }

    fn evaluate_second_derivative<G>(&self, ops: &G, t: Scalar) -> Diff
    where
        G: GeometricOperations<Pos, Diff>,
    {
        check_domain(t);
        self.weighted_sum(ops, |power| {
            if power < 2 {
                0.0
            } else {
                (power * (power - 1)) as Scalar * t.powi(power as i32 - 2)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Euclidean;
    use approx::assert_relative_eq;

    type Point2 = [Scalar; 2];
    type Point3 = [Scalar; 3];

    fn catmull_rom(points: [Point2; 4]) -> CubicPolynomial<Point2, Point2> {
        let [p0, p1, p2, p3] = points;
        CubicPolynomial::from_catmull_rom(
            &Euclidean,
            &CatmullRomSegment { p0, p1, p2, p3 },
            SplineType::Centripetal,
            1.0e-4,
        )
    }

    #[test]
    fn test_linear_catmull_rom() {
        let polynomial: CubicPolynomial<Point3, Point3> = CubicPolynomial::from_catmull_rom(
            &Euclidean,
            &CatmullRomSegment {
                p0: [-1.0, 0.0, 0.0],
                p1: [0.0, 0.0, 0.0],
                p2: [1.0, 0.0, 0.0],
                p3: [2.0, 0.0, 0.0],
            },
            SplineType::Centripetal,
            1.0e-4,
        );
        let position = polynomial.evaluate(&Euclidean, 0.5);
        assert_relative_eq!(position[0], 0.5, epsilon = 1.0e-5);
        assert_relative_eq!(position[1], 0.0);
        assert_relative_eq!(position[2], 0.0);
        let tangent = polynomial.evaluate_derivative(&Euclidean, 0.5);
        assert!(tangent[0] > 0.0);
        assert_relative_eq!(tangent[1], 0.0);
        assert_relative_eq!(tangent[2], 0.0);
    }

    #[test]
    fn test_catmull_rom_passes_through_inner_handles() {
        let polynomial = catmull_rom([[0.0, 0.0], [1.0, 1.0], [2.0, 1.0], [3.0, 0.0]]);
        let from = polynomial.evaluate(&Euclidean, 0.0);
        let to = polynomial.evaluate(&Euclidean, 1.0);
        assert_relative_eq!(from[0], 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(from[1], 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(to[0], 2.0, epsilon = 1.0e-5);
        assert_relative_eq!(to[1], 1.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_closest_point_newton() {
        let polynomial = catmull_rom([[0.0, 0.0], [1.0, 1.0], [2.0, 1.0], [3.0, 0.0]]);
        let target = [1.5, 2.0];
        let time = polynomial.evaluate_closest_point_to(&Euclidean, &target, 5);
        assert!((0.0..=1.0).contains(&time));
        let best = Euclidean.distance(&polynomial.evaluate(&Euclidean, time), &target);
        let start = Euclidean.distance(&polynomial.evaluate(&Euclidean, 0.0), &target);
        let end = Euclidean.distance(&polynomial.evaluate(&Euclidean, 1.0), &target);
        assert!(best < start, "best: {} | start: {}", best, start);
        assert!(best < end, "best: {} | end: {}", best, end);
    }

    #[test]
    fn test_closest_point_stays_in_domain() {
        let polynomial = catmull_rom([[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]);
        let time = polynomial.evaluate_closest_point_to(&Euclidean, &[10.0, 0.0], 10);
        assert_eq!(time, 1.0);
        let time = polynomial.evaluate_closest_point_to(&Euclidean, &[-10.0, 0.0], 10);
        assert_eq!(time, 0.0);
    }

    #[test]
    fn test_closest_point_degenerate_polynomial() {
        let point: Point2 = [1.0, 1.0];
        let polynomial = CubicPolynomial::from_bezier(&Euclidean, &[point, point, point, point]);
        let time = polynomial.evaluate_closest_point_to(&Euclidean, &[5.0, 5.0], 5);
        assert_eq!(time, 0.5);
    }

    #[test]
    #[should_panic(expected = "within [0; 1]")]
    fn test_evaluate_out_of_domain() {
        let polynomial = catmull_rom([[0.0, 0.0], [1.0, 1.0], [2.0, 1.0], [3.0, 0.0]]);
        polynomial.evaluate(&Euclidean, 1.1);
    }

    #[test]
    fn test_bezier_cubic_matches_de_casteljau() {
        let points: [Point2; 4] = [[0.0, 0.0], [100.0, 0.0], [0.0, 100.0], [100.0, 100.0]];
        let polynomial = CubicPolynomial::from_bezier(&Euclidean, &points);
        for t in factor_iter(10) {
            let a = Euclidean.lerp(&points[0], &points[1], t);
            let b = Euclidean.lerp(&points[1], &points[2], t);
            let c = Euclidean.lerp(&points[2], &points[3], t);
            let d = Euclidean.lerp(&a, &b, t);
            let e = Euclidean.lerp(&b, &c, t);
            let expected = Euclidean.lerp(&d, &e, t);
            let actual = polynomial.evaluate(&Euclidean, t);
            assert_relative_eq!(actual[0], expected[0], epsilon = 1.0e-3);
            assert_relative_eq!(actual[1], expected[1], epsilon = 1.0e-3);
        }
    }

    #[test]
    fn test_bezier_quadratic_has_no_cubic_term() {
        let points: [Point2; 3] = [[0.0, 0.0], [1.0, 2.0], [2.0, 0.0]];
        let polynomial = CubicPolynomial::from_bezier(&Euclidean, &points);
        assert_eq!(polynomial.a, [0.0, 0.0]);
        let middle = polynomial.evaluate(&Euclidean, 0.5);
        assert_relative_eq!(middle[0], 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(middle[1], 1.0, epsilon = 1.0e-5);
        let second = polynomial.evaluate_second_derivative(&Euclidean, 0.3);
        assert_relative_eq!(second[1], -8.0, epsilon = 1.0e-4);
    }

    #[test]
    fn test_quintic_end_points_and_derivatives() {
        let points: [Point2; 6] = [
            [0.0, 0.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [3.0, -1.0],
            [4.0, -1.0],
            [5.0, 0.0],
        ];
        let polynomial = QuinticPolynomial::from_bezier(&Euclidean, &points);
        let start = polynomial.evaluate(&Euclidean, 0.0);
        let end = polynomial.evaluate(&Euclidean, 1.0);
        assert_relative_eq!(start[0], 0.0);
        assert_relative_eq!(end[0], 5.0, epsilon = 1.0e-4);
        assert_relative_eq!(end[1], 0.0, epsilon = 1.0e-4);
        // Bezier end tangent is degree * (p1 - p0)
        let tangent = polynomial.evaluate_derivative(&Euclidean, 0.0);
        assert_relative_eq!(tangent[0], 5.0, epsilon = 1.0e-4);
        assert_relative_eq!(tangent[1], 5.0, epsilon = 1.0e-4);
    }

    #[test]
    fn test_length_of_straight_segment() {
        let points: [Point2; 4] = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]];
        let polynomial = CubicPolynomial::from_bezier(&Euclidean, &points);
        assert_relative_eq!(polynomial.length(&Euclidean, 16), 3.0, epsilon = 1.0e-4);
    }
}
