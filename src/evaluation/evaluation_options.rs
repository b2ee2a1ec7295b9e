use crate::misc::FloatingPoint;

/// Tolerances used while evaluating a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluationOptions<T: FloatingPoint> {
    /// A knot difference whose magnitude is within this value is treated as zero in the basis recursion.
    pub knot_tolerance: T,
    /// If the sum of weighted basis functions is within this value of zero,
    /// the nearest control point is returned instead of dividing by it.
    pub weight_tolerance: T,
}

impl<T: FloatingPoint> Default for EvaluationOptions<T> {
    fn default() -> Self {
        Self {
            knot_tolerance: T::from_f64(1e-10).unwrap(),
            weight_tolerance: T::from_f64(1e-10).unwrap(),
        }
    }
}

impl<T: FloatingPoint> EvaluationOptions<T> {
    pub fn with_knot_tolerance(mut self, knot_tolerance: T) -> Self {
        self.knot_tolerance = knot_tolerance;
        self
    }

    pub fn with_weight_tolerance(mut self, weight_tolerance: T) -> Self {
        self.weight_tolerance = weight_tolerance;
        self
    }
}
