use std::ops::Index;

use itertools::Itertools;

use crate::misc::FloatingPoint;

/// Knot vector representation
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnotVector<T>(Vec<T>);

impl<T: FloatingPoint> KnotVector<T> {
    pub fn new(knots: Vec<T>) -> Self {
        Self(knots)
    }

    /// Create a clamped uniform knot vector over `[0, 1]`
    /// the first and last knots have a `degree + 1` multiplicity and the interior knots are evenly spaced
    /// # Example
    /// ```
    /// use nurbs_engine::prelude::KnotVector;
    /// let knots: KnotVector<f64> = KnotVector::clamped_uniform(4, 2);
    /// assert_eq!(knots.to_vec(), vec![0., 0., 0., 0.5, 1., 1., 1.]);
    /// ```
    pub fn clamped_uniform(num_control_points: usize, degree: usize) -> Self {
        let m = num_control_points + degree + 1;
        let segments = T::from_usize(num_control_points.saturating_sub(degree).max(1)).unwrap();
        let knots = (0..m)
            .map(|i| {
                if i <= degree {
                    T::zero()
                } else if i >= num_control_points {
                    T::one()
                } else {
                    T::from_usize(i - degree).unwrap() / segments
                }
            })
            .collect();
        Self(knots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Get the domain of the knot vector by degree
    pub fn domain(&self, degree: usize) -> (T, T) {
        (self.0[degree], self.0[self.0.len() - 1 - degree])
    }

    /// Clamp a parameter into the domain
    /// NaN is mapped to the start of the domain
    pub fn clamp(&self, degree: usize, u: T) -> T {
        let (min, max) = self.domain(degree);
        if u >= max {
            max
        } else if u > min {
            u
        } else {
            min
        }
    }

    /// Check that the knot vector can drive a curve with the given number of control points and degree
    /// # Failures
    /// - the number of knots is not equal to the number of control points + the degree + 1
    /// - a knot is not finite
    /// - the knots are decreasing somewhere
    pub fn try_validate(&self, num_control_points: usize, degree: usize) -> anyhow::Result<()> {
        let expected = num_control_points + degree + 1;
        anyhow::ensure!(
            self.len() == expected,
            "Invalid number of knots, got {}, expected {}",
            self.len(),
            expected
        );
        anyhow::ensure!(
            self.iter().all(|knot| knot.is_finite()),
            "Knot vector contains a non-finite value"
        );
        anyhow::ensure!(
            self.iter().tuple_windows().all(|(a, b)| a <= b),
            "Knot vector must be non-decreasing"
        );
        Ok(())
    }

    /// Number of times the first and the last knot repeat
    /// # Example
    /// ```
    /// use nurbs_engine::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3.]);
    /// assert_eq!(knots.end_multiplicities(), (3, 2));
    /// ```
    pub fn end_multiplicities(&self) -> (usize, usize) {
        let (Some(first), Some(last)) = (self.0.first(), self.0.last()) else {
            return (0, 0);
        };
        let eps = T::default_epsilon();
        let start = self.iter().take_while(|k| (**k - *first).abs() <= eps).count();
        let end = self.iter().rev().take_while(|k| (**k - *last).abs() <= eps).count();
        (start, end)
    }

    /// Check if the knot vector is clamped
    /// `clamped` means the first and last knots have a multiplicity greater than the degree,
    /// so the curve starts and ends on its first and last control points
    /// e.g. [0, 0, 0, 1, 2, 3, 3, 3] with degree 2 is clamped
    pub fn is_clamped(&self, degree: usize) -> bool {
        let (start, end) = self.end_multiplicities();
        start > degree && end > degree
    }

    /// Find the knot span index `k` such that `knots[k] <= u < knots[k + 1]`
    /// `n` is the index of the last control point.
    /// A parameter at (or past) the end of the domain falls into the last non-empty span.
    ///
    /// # Example
    /// ```
    /// use nurbs_engine::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// assert_eq!(knots.find_knot_span_index(4, 2, 2.5), 4);
    /// assert_eq!(knots.find_knot_span_index(4, 2, 3.), 4);
    /// assert_eq!(knots.find_knot_span_index(4, 2, 0.), 2);
    /// ```
    pub fn find_knot_span_index(&self, n: usize, degree: usize, u: T) -> usize {
        let end = self[n + 1];
        if u >= end {
            let mut span = n;
            while span > degree && self[span] >= end {
                span -= 1;
            }
            return span;
        }

        // binary search over the spans of the domain
        let count = self.0[degree..=n].partition_point(|knot| *knot <= u);
        degree + count.saturating_sub(1)
    }

    /// Compute the non-vanishing basis functions `N[span - degree ..= span]` at `u`
    ///
    /// Any denominator whose magnitude is within `tolerance` of zero contributes nothing.
    pub fn basis_functions(&self, knot_span_index: usize, u: T, degree: usize, tolerance: T) -> Vec<T> {
        let mut basis_functions = vec![T::zero(); degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        basis_functions[0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_span_index + 1 - j];
            right[j] = self[knot_span_index + j] - u;
            let mut saved = T::zero();

            for r in 0..j {
                let denominator = right[r + 1] + left[j - r];
                let temp = if denominator.abs() <= tolerance {
                    T::zero()
                } else {
                    basis_functions[r] / denominator
                };
                basis_functions[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }

            basis_functions[j] = saved;
        }

        basis_functions
    }

    /// Compute `count` regularly spaced parameters over the domain
    /// Both ends are included when `count >= 2`; a single parameter sits at the start of the domain.
    pub fn regularly_spaced_parameters(&self, degree: usize, count: usize) -> Vec<T> {
        let (start, end) = self.domain(degree);
        match count {
            0 => vec![],
            1 => vec![start],
            _ => {
                let step = (end - start) / T::from_usize(count - 1).unwrap();
                (0..count)
                    .map(|i| {
                        if i == count - 1 {
                            end
                        } else {
                            start + T::from_usize(i).unwrap() * step
                        }
                    })
                    .collect()
            }
        }
    }

    /// Find the knot spans of non-decreasing parameters
    /// Only the first parameter is searched; the following spans are found by walking forward.
    /// Every span equals `find_knot_span_index` of its parameter.
    pub fn walk_knot_spans(&self, n: usize, degree: usize, parameters: &[T]) -> Vec<usize> {
        let Some(first) = parameters.first() else {
            return vec![];
        };

        let end = self[n + 1];
        let mut knot_index = self.find_knot_span_index(n, degree, *first);
        parameters
            .iter()
            .map(|u| {
                while knot_index < n && *u >= self[knot_index + 1] && self[knot_index + 1] < end {
                    knot_index += 1;
                }
                knot_index
            })
            .collect()
    }

    /// Compute the basis functions at `count` regularly spaced parameters
    /// Returns a tuple of parameters, knot spans and basis functions
    pub fn regularly_spaced_basis_functions(
        &self,
        n: usize,
        degree: usize,
        count: usize,
        tolerance: T,
    ) -> (Vec<T>, Vec<usize>, Vec<Vec<T>>) {
        let parameters = self.regularly_spaced_parameters(degree, count);
        let knot_spans = self.walk_knot_spans(n, degree, &parameters);
        let bases = parameters
            .iter()
            .zip(&knot_spans)
            .map(|(u, span)| self.basis_functions(*span, *u, degree, tolerance))
            .collect();
        (parameters, knot_spans, bases)
    }
}

impl<T> Index<usize> for KnotVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::KnotVector;

    #[test]
    fn clamped_uniform_knots() {
        let knots = KnotVector::<f64>::clamped_uniform(3, 2);
        assert_eq!(knots.to_vec(), vec![0., 0., 0., 1., 1., 1.]);
        assert!(knots.is_clamped(2));

        let knots = KnotVector::<f64>::clamped_uniform(6, 3);
        assert_eq!(knots.len(), 10);
        assert!(knots.is_clamped(3));
        assert_eq!(knots.domain(3), (0., 1.));
        assert_relative_eq!(knots[4], 1. / 3.);
        assert_relative_eq!(knots[5], 2. / 3.);
        assert!(knots.try_validate(6, 3).is_ok());
    }

    #[test]
    fn degree_one_knots_are_evenly_spaced() {
        let knots = KnotVector::<f64>::clamped_uniform(5, 1);
        assert_eq!(knots.to_vec(), vec![0., 0., 0.25, 0.5, 0.75, 1., 1.]);
    }

    #[test]
    fn validation() {
        let knots = KnotVector::new(vec![0., 0., 0., 1., 1., 1.]);
        assert!(knots.try_validate(3, 2).is_ok());
        assert!(knots.try_validate(4, 2).is_err());

        let decreasing = KnotVector::new(vec![0., 0., 1., 0.5, 1., 1.]);
        assert!(decreasing.try_validate(3, 2).is_err());

        let non_finite = KnotVector::new(vec![0., 0., 0., f64::NAN, 1., 1., 1.]);
        assert!(non_finite.try_validate(4, 2).is_err());
    }

    #[test]
    fn span_with_repeated_interior_knots() {
        let knots = KnotVector::new(vec![0., 0., 0., 0.5, 0.5, 1., 1., 1.]);
        assert_eq!(knots.find_knot_span_index(4, 2, 0.25), 2);
        assert_eq!(knots.find_knot_span_index(4, 2, 0.5), 4);
        assert_eq!(knots.find_knot_span_index(4, 2, 0.75), 4);
        assert_eq!(knots.find_knot_span_index(4, 2, 1.), 4);
    }

    #[test]
    fn walked_spans_match_binary_search() {
        let cases = [
            (vec![0., 0., 0., 0.5, 0.5, 1., 1., 1.], 2),
            (vec![0., 0., 0., 0.25, 0.5, 0.5, 0.5, 1., 1., 1.], 2),
            (vec![0., 0., 0., 0., 0.3, 0.3, 0.6, 1., 1., 1., 1.], 3),
            (vec![0., 0., 0., 1., 1., 1., 1.], 2),
            (vec![0.; 6], 2),
        ];
        for (knots, degree) in cases {
            let knots = KnotVector::new(knots);
            let n = knots.len() - degree - 2;
            let mut parameters = knots.regularly_spaced_parameters(degree, 41);
            parameters.extend([0.25, 0.3, 0.5, 1.]);
            parameters.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let parameters: Vec<f64> = parameters.into_iter().map(|u| knots.clamp(degree, u)).collect();

            let walked = knots.walk_knot_spans(n, degree, &parameters);
            for (u, span) in parameters.iter().zip(walked) {
                assert_eq!(span, knots.find_knot_span_index(n, degree, *u), "u = {u}");
            }
        }
    }

    #[test]
    fn regularly_spaced_basis_functions_match_single_evaluation() {
        let knots = KnotVector::new(vec![0., 0., 0., 0.4, 0.4, 0.7, 1., 1., 1.]);
        let (parameters, spans, bases) = knots.regularly_spaced_basis_functions(5, 2, 11, 1e-10);
        assert_eq!(parameters.len(), 11);
        assert_eq!(spans.len(), 11);
        for ((u, span), basis) in parameters.iter().zip(spans).zip(bases) {
            assert_eq!(span, knots.find_knot_span_index(5, 2, *u));
            assert_eq!(basis, knots.basis_functions(span, *u, 2, 1e-10));
        }
    }

    #[test]
    fn end_multiplicities() {
        let knots = KnotVector::new(vec![0., 0., 0.5, 1., 1., 1.]);
        assert_eq!(knots.end_multiplicities(), (2, 3));
        assert!(knots.is_clamped(1));
        assert!(!knots.is_clamped(2));
        assert_eq!(KnotVector::<f64>::new(vec![]).end_multiplicities(), (0, 0));
    }

    #[test]
    fn span_at_end_skips_empty_spans() {
        let knots = KnotVector::new(vec![0., 0., 0., 1., 1., 1., 1.]);
        assert_eq!(knots.find_knot_span_index(3, 2, 1.), 2);
    }

    #[test]
    fn basis_functions_partition_unity() {
        let knots = KnotVector::new(vec![0., 0., 0., 0., 0.3, 0.6, 1., 1., 1., 1.]);
        for u in [0., 0.1, 0.3, 0.45, 0.6, 0.99, 1.] {
            let span = knots.find_knot_span_index(5, 3, u);
            let basis = knots.basis_functions(span, u, 3, 1e-10);
            assert_eq!(basis.len(), 4);
            assert!(basis.iter().all(|b| *b >= 0.));
            assert_relative_eq!(basis.iter().sum::<f64>(), 1., epsilon = 1e-12);
        }
    }

    #[test]
    fn degenerate_knots_produce_zero_basis() {
        let knots = KnotVector::new(vec![0.; 6]);
        let span = knots.find_knot_span_index(2, 2, 0.);
        assert_eq!(span, 2);
        let basis = knots.basis_functions(span, 0., 2, 1e-10);
        assert!(basis.iter().all(|b| *b == 0.));
    }

    #[test]
    fn clamp_to_domain() {
        let knots = KnotVector::new(vec![0., 1., 2., 3.]);
        assert_eq!(knots.domain(1), (1., 2.));
        assert_eq!(knots.clamp(1, -5.), 1.);
        assert_eq!(knots.clamp(1, 1.5), 1.5);
        assert_eq!(knots.clamp(1, 7.), 2.);
        assert_eq!(knots.clamp(1, f64::NAN), 1.);
    }

    #[test]
    fn regular_parameters() {
        let knots = KnotVector::<f64>::clamped_uniform(4, 3);
        assert!(knots.regularly_spaced_parameters(3, 0).is_empty());
        assert_eq!(knots.regularly_spaced_parameters(3, 1), vec![0.]);
        assert_eq!(
            knots.regularly_spaced_parameters(3, 5),
            vec![0., 0.25, 0.5, 0.75, 1.]
        );
    }
}
