use nalgebra::Vector3;

use crate::curve::{ControlPoint, NurbsCurve};
use crate::error::CurveError;
use crate::knot::KnotVector;
use crate::misc::FloatingPoint;

use super::{ControlNet, EvaluationOptions, FlatControlNet};

/// Rational B-spline evaluator
///
/// Holds nothing but its tolerances: every call is a pure function of its inputs,
/// so one evaluator can be shared freely between threads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluator<T: FloatingPoint> {
    options: EvaluationOptions<T>,
}

impl<T: FloatingPoint> Default for Evaluator<T> {
    fn default() -> Self {
        Self::new(EvaluationOptions::default())
    }
}

impl<T: FloatingPoint> Evaluator<T> {
    pub fn new(options: EvaluationOptions<T>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EvaluationOptions<T> {
        &self.options
    }

    pub fn is_ready(&self, curve: &NurbsCurve<T>) -> bool {
        curve.is_ready()
    }

    /// Evaluate the curve at `u`
    /// `u` is clamped into the knot domain. The returned point has a weight of one.
    /// # Failures
    /// - if the curve does not have more control points than its degree
    pub fn evaluate(&self, curve: &NurbsCurve<T>, u: T) -> Result<ControlPoint<T>, CurveError> {
        let knots = curve.knots().ok_or(CurveError::NotReady {
            points: curve.num_control_points(),
            degree: curve.degree(),
        })?;
        Ok(self.point(curve.control_points(), &knots, curve.degree(), u))
    }

    /// Sample the curve at `num_points` regularly spaced parameters over the knot domain
    /// Returns an empty vector if the curve is not ready.
    pub fn generate_points(&self, curve: &NurbsCurve<T>, num_points: usize) -> Vec<ControlPoint<T>> {
        self.generate_points_with_parameter(curve, num_points)
            .into_iter()
            .map(|(_, p)| p)
            .collect()
    }

    /// Sample the curve at `num_points` regularly spaced parameters
    /// Return the vector of tuples of parameter and point
    pub fn generate_points_with_parameter(
        &self,
        curve: &NurbsCurve<T>,
        num_points: usize,
    ) -> Vec<(T, ControlPoint<T>)> {
        if num_points == 0 {
            return vec![];
        }
        match curve.knots() {
            Some(knots) => self.sample(curve.control_points(), &knots, curve.degree(), num_points),
            None => vec![],
        }
    }

    /// Sample a curve given as parallel coordinate and weight slices
    /// The knot vector is always the clamped uniform one.
    /// Returns `[x0, y0, x1, y1, ...]`, or an empty vector when the control points are too few for the degree.
    pub fn generate_flat(
        &self,
        control_points_x: &[T],
        control_points_y: &[T],
        weights: &[T],
        degree: usize,
        num_points: usize,
    ) -> Vec<T> {
        if degree < 1 {
            log::warn!("cannot sample a curve of degree {degree}");
            return vec![];
        }

        let net = FlatControlNet::new(control_points_x, control_points_y, weights);
        if num_points == 0 || net.len() <= degree {
            return vec![];
        }

        let knots = KnotVector::clamped_uniform(net.len(), degree);
        let mut flat = Vec::with_capacity(num_points * 2);
        for (_, p) in self.sample(&net, &knots, degree, num_points) {
            flat.push(p.x());
            flat.push(p.y());
        }
        flat
    }

    /// Evaluate every regularly spaced parameter of the domain
    /// The knot spans are walked forward instead of searched per parameter.
    fn sample<N: ControlNet<T> + ?Sized>(
        &self,
        net: &N,
        knots: &KnotVector<T>,
        degree: usize,
        num_points: usize,
    ) -> Vec<(T, ControlPoint<T>)> {
        log::trace!("sampling {num_points} points over {} control points", net.len());
        let (parameters, knot_spans, bases) = knots.regularly_spaced_basis_functions(
            net.len() - 1,
            degree,
            num_points,
            self.options.knot_tolerance,
        );
        parameters
            .into_iter()
            .zip(knot_spans)
            .zip(bases)
            .map(|((u, knot_span_index), basis)| {
                (u, self.rational_point(net, knot_span_index, degree, &basis))
            })
            .collect()
    }

    /// Evaluate the rational curve at `u`
    /// `knots` must hold exactly `net.len() + degree + 1` knots and `net` more than `degree` points.
    pub(crate) fn point<N: ControlNet<T> + ?Sized>(
        &self,
        net: &N,
        knots: &KnotVector<T>,
        degree: usize,
        u: T,
    ) -> ControlPoint<T> {
        let n = net.len() - 1;
        let u = knots.clamp(degree, u);
        let knot_span_index = knots.find_knot_span_index(n, degree, u);
        let basis = knots.basis_functions(knot_span_index, u, degree, self.options.knot_tolerance);
        self.rational_point(net, knot_span_index, degree, &basis)
    }

    /// Combine the active control points with their basis values and project back to the plane
    fn rational_point<N: ControlNet<T> + ?Sized>(
        &self,
        net: &N,
        knot_span_index: usize,
        degree: usize,
        basis: &[T],
    ) -> ControlPoint<T> {
        let mut position = Vector3::<T>::zeros();
        for i in 0..=degree {
            position += net.homogeneous(knot_span_index - degree + i) * basis[i];
        }

        let w = position.z;
        if w.abs() > self.options.weight_tolerance {
            let x = position.x / w;
            let y = position.y / w;
            if x.is_finite() && y.is_finite() {
                return ControlPoint::evaluated(x, y);
            }
        }

        self.nearest_control_point(net, knot_span_index, degree, basis)
    }

    /// The control point of the active span with the largest basis value, the first one on ties
    fn nearest_control_point<N: ControlNet<T> + ?Sized>(
        &self,
        net: &N,
        knot_span_index: usize,
        degree: usize,
        basis: &[T],
    ) -> ControlPoint<T> {
        let (offset, _) = basis
            .iter()
            .enumerate()
            .fold((0, T::zero()), |(best, max), (i, b)| {
                if *b > max {
                    (i, *b)
                } else {
                    (best, max)
                }
            });
        let index = knot_span_index - degree + offset;
        log::debug!("degenerate weighted basis in span {knot_span_index}, using control point {index}");
        net.position(index).into()
    }
}
