/// Errors surfaced by the structural operations of a curve.
///
/// Numeric edge cases inside the basis recursion are never reported through this type;
/// they are absorbed by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("degree must be at least 1, got {degree}")]
    InvalidDegree { degree: usize },
    #[error("control point weight must be positive and finite, got {weight}")]
    InvalidWeight { weight: f64 },
    #[error("no control point at index {index}, curve has {len}")]
    NotFound { index: usize, len: usize },
    #[error("curve of degree {degree} needs more than {degree} control points, got {points}")]
    NotReady { points: usize, degree: usize },
}
