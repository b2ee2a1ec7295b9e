use std::borrow::Cow;

use crate::error::CurveError;
use crate::evaluation::Evaluator;
use crate::knot::KnotVector;
use crate::misc::FloatingPoint;

use super::ControlPoint;

/// NURBS curve model
/// Owns the ordered control points and the degree of a 2D curve.
/// Evaluation lives in [`Evaluator`]; the convenience methods here delegate to the default one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NurbsCurve<T> {
    degree: usize,
    /// the insertion order is the parametric order of the curve
    control_points: Vec<ControlPoint<T>>,
    /// explicit knot vector set by the caller
    /// when absent, a clamped uniform knot vector is synthesized on demand
    knots: Option<KnotVector<T>>,
}

impl<T: FloatingPoint> NurbsCurve<T> {
    /// Create an empty curve of the given degree
    /// # Failures
    /// - if the degree is less than 1
    ///
    /// # Example
    /// ```
    /// use nurbs_engine::prelude::*;
    ///
    /// let mut curve = NurbsCurve::try_new(2).unwrap();
    /// curve.add_control_point(ControlPoint::new(0., 0., 1.));
    /// curve.add_control_point(ControlPoint::new(10., 10., 1.));
    /// assert!(!curve.is_ready());
    ///
    /// curve.add_control_point(ControlPoint::new(20., 0., 1.));
    /// assert!(curve.is_ready());
    ///
    /// let mid = curve.point_at(0.5).unwrap();
    /// assert_eq!((mid.x(), mid.y()), (10., 5.));
    ///
    /// assert!(NurbsCurve::<f64>::try_new(0).is_err());
    /// ```
    pub fn try_new(degree: usize) -> Result<Self, CurveError> {
        if degree < 1 {
            return Err(CurveError::InvalidDegree { degree });
        }
        Ok(Self {
            degree,
            control_points: vec![],
            knots: None,
        })
    }

    /// Create a curve from its parts, validating the knot vector eagerly
    /// # Failures
    /// - if the degree is less than 1
    /// - if the number of control points is not greater than the degree
    /// - if the knot vector is malformed for the control points and degree
    pub fn try_from_parts(
        degree: usize,
        control_points: Vec<ControlPoint<T>>,
        knots: Vec<T>,
    ) -> anyhow::Result<Self> {
        let mut curve = Self::try_new(degree)?;
        anyhow::ensure!(
            control_points.len() > degree,
            "Too few control points for curve, got {}, expected at least {}",
            control_points.len(),
            degree + 1
        );
        let knots = KnotVector::new(knots);
        knots.try_validate(control_points.len(), degree)?;

        curve.control_points = control_points;
        curve.knots = Some(knots);
        Ok(curve)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Change the degree of the curve
    /// An explicit knot vector no longer fits the new degree and is discarded.
    pub fn set_degree(&mut self, degree: usize) -> Result<(), CurveError> {
        if degree < 1 {
            return Err(CurveError::InvalidDegree { degree });
        }
        if degree != self.degree {
            self.degree = degree;
            self.knots = None;
        }
        Ok(())
    }

    pub fn num_control_points(&self) -> usize {
        self.control_points.len()
    }

    pub fn control_points(&self) -> &[ControlPoint<T>] {
        &self.control_points
    }

    pub fn weights(&self) -> Vec<T> {
        self.control_points.iter().map(|p| p.weight()).collect()
    }

    /// Append a control point to the end of the curve
    pub fn add_control_point(&mut self, point: ControlPoint<T>) {
        self.control_points.push(point);
        self.knots = None;
    }

    /// Insert a control point before `index`, `index == len` appends
    pub fn insert_control_point(
        &mut self,
        index: usize,
        point: ControlPoint<T>,
    ) -> Result<(), CurveError> {
        let len = self.control_points.len();
        if index > len {
            return Err(CurveError::NotFound { index, len });
        }
        self.control_points.insert(index, point);
        self.knots = None;
        Ok(())
    }

    pub fn get_control_point(&self, index: usize) -> Option<ControlPoint<T>> {
        self.control_points.get(index).copied()
    }

    pub fn get_control_point_mut(&mut self, index: usize) -> Option<&mut ControlPoint<T>> {
        self.control_points.get_mut(index)
    }

    /// Replace the control point at `index`
    /// Returns false and leaves the curve untouched when the index is out of range.
    pub fn update_control_point(&mut self, index: usize, x: T, y: T, weight: T) -> bool {
        match self.control_points.get_mut(index) {
            Some(point) => {
                *point = ControlPoint::new(x, y, weight);
                true
            }
            None => false,
        }
    }

    /// Remove the control point at `index`, shifting the following points down
    /// Returns `None` without touching the curve when the index is out of range.
    pub fn remove_control_point(&mut self, index: usize) -> Option<ControlPoint<T>> {
        if index >= self.control_points.len() {
            return None;
        }
        self.knots = None;
        Some(self.control_points.remove(index))
    }

    /// Set an explicit knot vector
    /// The vector is stored as given. If it does not fit the current control points and degree,
    /// a warning is logged once here and evaluation silently uses the clamped uniform knots instead.
    pub fn set_knots(&mut self, knots: Vec<T>) {
        let knots = KnotVector::new(knots);
        match knots.try_validate(self.control_points.len(), self.degree) {
            Ok(()) if !knots.is_clamped(self.degree) => {
                log::debug!("unclamped knot vector, the curve will not reach its end control points");
            }
            Ok(()) => {}
            Err(e) => log::warn!("explicit knot vector will be ignored: {e}"),
        }
        self.knots = Some(knots);
    }

    /// Drop the explicit knot vector and go back to the synthesized one
    pub fn clear_knots(&mut self) {
        self.knots = None;
    }

    pub fn explicit_knots(&self) -> Option<&KnotVector<T>> {
        self.knots.as_ref()
    }

    /// The knot vector evaluation runs on
    /// the explicit knots when they fit the curve, otherwise a clamped uniform knot vector.
    /// Returns `None` while the curve is not ready.
    pub fn knots(&self) -> Option<Cow<'_, KnotVector<T>>> {
        if !self.is_ready() {
            return None;
        }

        if let Some(knots) = &self.knots {
            if knots
                .try_validate(self.control_points.len(), self.degree)
                .is_ok()
            {
                return Some(Cow::Borrowed(knots));
            }
        }

        Some(Cow::Owned(KnotVector::clamped_uniform(
            self.control_points.len(),
            self.degree,
        )))
    }

    pub fn knots_domain(&self) -> Option<(T, T)> {
        self.knots().map(|knots| knots.domain(self.degree))
    }

    /// Whether the curve starts and ends on its first and last control points
    /// Synthesized knots are always clamped; explicit knots may not be.
    pub fn is_clamped(&self) -> bool {
        self.knots()
            .map(|knots| knots.is_clamped(self.degree))
            .unwrap_or(false)
    }

    /// Whether the curve has enough control points for its degree
    pub fn is_ready(&self) -> bool {
        self.control_points.len() > self.degree
    }

    /// Evaluate the curve at a given parameter with the default evaluator
    pub fn point_at(&self, u: T) -> Result<ControlPoint<T>, CurveError> {
        Evaluator::default().evaluate(self, u)
    }

    /// Sample the curve at regularly spaced parameters with the default evaluator
    pub fn generate_points(&self, num_points: usize) -> Vec<ControlPoint<T>> {
        Evaluator::default().generate_points(self, num_points)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for NurbsCurve<T>
where
    T: FloatingPoint + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(bound(deserialize = "U: FloatingPoint + serde::Deserialize<'de>"))]
        struct RawNurbsCurve<U> {
            degree: usize,
            control_points: Vec<ControlPoint<U>>,
            knots: Option<KnotVector<U>>,
        }

        let raw = RawNurbsCurve::<T>::deserialize(deserializer)?;
        let mut curve = Self::try_new(raw.degree).map_err(serde::de::Error::custom)?;
        curve.control_points = raw.control_points;
        if let Some(knots) = raw.knots {
            curve.set_knots(knots.to_vec());
        }
        Ok(curve)
    }
}
