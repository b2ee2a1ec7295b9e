use nalgebra::{Point2, Vector3};

use crate::curve::control_point::sanitize_weight;
use crate::curve::ControlPoint;
use crate::misc::FloatingPoint;

/// Read-only view over an ordered set of weighted control points
///
/// The evaluator only talks to control points through this trait, so an array of
/// [`ControlPoint`]s and parallel coordinate slices go through the exact same arithmetic.
pub trait ControlNet<T: FloatingPoint> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(w * x, w * y, w)` of the control point at `index`
    fn homogeneous(&self, index: usize) -> Vector3<T>;

    fn position(&self, index: usize) -> Point2<T>;
}

impl<T: FloatingPoint> ControlNet<T> for [ControlPoint<T>] {
    fn len(&self) -> usize {
        <[ControlPoint<T>]>::len(self)
    }

    fn homogeneous(&self, index: usize) -> Vector3<T> {
        self[index].to_homogeneous()
    }

    fn position(&self, index: usize) -> Point2<T> {
        self[index].position()
    }
}

/// Structure-of-arrays control points
/// The control net is as long as the shortest of the three slices.
#[derive(Clone, Debug)]
pub struct FlatControlNet<'a, T> {
    xs: &'a [T],
    ys: &'a [T],
    weights: Vec<T>,
}

impl<'a, T: FloatingPoint> FlatControlNet<'a, T> {
    /// Invalid weights are clamped once here, the same way [`ControlPoint::new`] does
    pub fn new(xs: &'a [T], ys: &'a [T], weights: &[T]) -> Self {
        let len = xs.len().min(ys.len()).min(weights.len());
        Self {
            xs: &xs[..len],
            ys: &ys[..len],
            weights: weights[..len].iter().map(|w| sanitize_weight(*w)).collect(),
        }
    }
}

impl<T: FloatingPoint> ControlNet<T> for FlatControlNet<'_, T> {
    fn len(&self) -> usize {
        self.weights.len()
    }

    fn homogeneous(&self, index: usize) -> Vector3<T> {
        let w = self.weights[index];
        Vector3::new(self.xs[index] * w, self.ys[index] * w, w)
    }

    fn position(&self, index: usize) -> Point2<T> {
        Point2::new(self.xs[index], self.ys[index])
    }
}
