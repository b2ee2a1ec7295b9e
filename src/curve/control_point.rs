use nalgebra::{Point2, Vector3};

use crate::{error::CurveError, misc::FloatingPoint};

/// Smallest weight a control point can carry
/// non-positive or non-finite weights are raised to this value at the boundary
pub const MIN_WEIGHT: f64 = 1e-10;

/// A weighted 2D control point
/// Also used as the output of evaluation, where the weight is always one
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ControlPoint<T> {
    x: T,
    y: T,
    weight: T,
}

impl<T: FloatingPoint> ControlPoint<T> {
    /// Create a new control point
    /// An invalid weight is replaced by `MIN_WEIGHT`
    ///
    /// # Example
    /// ```
    /// use nurbs_engine::prelude::*;
    /// let p = ControlPoint::new(10., 20., 2.);
    /// assert_eq!((p.x(), p.y(), p.weight()), (10., 20., 2.));
    ///
    /// let clamped = ControlPoint::new(0., 0., -1.);
    /// assert_eq!(clamped.weight(), MIN_WEIGHT);
    /// ```
    pub fn new(x: T, y: T, weight: T) -> Self {
        Self {
            x,
            y,
            weight: sanitize_weight(weight),
        }
    }

    /// Create a new control point, rejecting a non-positive or non-finite weight
    pub fn try_new(x: T, y: T, weight: T) -> Result<Self, CurveError> {
        if !is_valid_weight(weight) {
            return Err(CurveError::InvalidWeight {
                weight: weight.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(Self { x, y, weight })
    }

    /// A point sampled on a curve has no weight of its own
    pub(crate) fn evaluated(x: T, y: T) -> Self {
        Self {
            x,
            y,
            weight: T::one(),
        }
    }

    pub fn x(&self) -> T {
        self.x
    }

    pub fn y(&self) -> T {
        self.y
    }

    pub fn weight(&self) -> T {
        self.weight
    }

    pub fn set_x(&mut self, x: T) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: T) {
        self.y = y;
    }

    pub fn set_weight(&mut self, weight: T) {
        self.weight = sanitize_weight(weight);
    }

    pub fn position(&self) -> Point2<T> {
        Point2::new(self.x, self.y)
    }

    /// Homogeneous coordinates `(w * x, w * y, w)`
    pub fn to_homogeneous(&self) -> Vector3<T> {
        Vector3::new(self.x * self.weight, self.y * self.weight, self.weight)
    }
}

impl<T: FloatingPoint> From<Point2<T>> for ControlPoint<T> {
    fn from(p: Point2<T>) -> Self {
        Self::evaluated(p.x, p.y)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for ControlPoint<T>
where
    T: FloatingPoint + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct RawControlPoint<U> {
            x: U,
            y: U,
            weight: U,
        }

        let RawControlPoint { x, y, weight } = RawControlPoint::<T>::deserialize(deserializer)?;
        Self::try_new(x, y, weight).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn is_valid_weight<T: FloatingPoint>(weight: T) -> bool {
    weight.is_finite() && weight > T::zero()
}

pub(crate) fn sanitize_weight<T: FloatingPoint>(weight: T) -> T {
    if is_valid_weight(weight) {
        weight
    } else {
        log::warn!("invalid control point weight {weight:?}, clamped to {MIN_WEIGHT:e}");
        T::from_f64(MIN_WEIGHT).unwrap()
    }
}
