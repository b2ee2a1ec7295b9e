pub mod control_net;
pub mod evaluation_options;
pub mod evaluator;
pub use control_net::*;
pub use evaluation_options::*;
pub use evaluator::*;

use crate::curve::{ControlPoint, NurbsCurve};
use crate::error::CurveError;
use crate::misc::FloatingPoint;

/// Whether the curve has enough control points to be evaluated
pub fn is_ready<T: FloatingPoint>(curve: &NurbsCurve<T>) -> bool {
    Evaluator::default().is_ready(curve)
}

/// Evaluate the curve at `u` with the default tolerances
pub fn evaluate<T: FloatingPoint>(
    curve: &NurbsCurve<T>,
    u: T,
) -> Result<ControlPoint<T>, CurveError> {
    Evaluator::default().evaluate(curve, u)
}

/// Sample `num_points` points at regularly spaced parameters with the default tolerances
pub fn generate_points<T: FloatingPoint>(
    curve: &NurbsCurve<T>,
    num_points: usize,
) -> Vec<ControlPoint<T>> {
    Evaluator::default().generate_points(curve, num_points)
}

/// Sample a curve given as parallel arrays, returning `[x0, y0, x1, y1, ...]`
/// # Example
/// ```
/// use nurbs_engine::prelude::*;
///
/// let flat = generate_flat(&[0., 10., 20.], &[0., 10., 0.], &[1., 1., 1.], 2, 3);
/// assert_eq!(flat, vec![0., 0., 10., 5., 20., 0.]);
/// ```
pub fn generate_flat<T: FloatingPoint>(
    control_points_x: &[T],
    control_points_y: &[T],
    weights: &[T],
    degree: usize,
    num_points: usize,
) -> Vec<T> {
    Evaluator::default().generate_flat(
        control_points_x,
        control_points_y,
        weights,
        degree,
        num_points,
    )
}
