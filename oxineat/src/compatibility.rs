//! Genetic compatibility between genomes, computed
//! by aligning their genes on innovation number.
//!
//! Gene sequences are compared with a single linear
//! merge, so both must be sorted by innovation number.
//! [`check_innovation_order`] validates this precondition.
use crate::errors::{ConfigError, IntegrityError};
use crate::Innovation;

use serde::{Deserialize, Serialize};

/// Normalization applied to the excess and disjoint terms.
///
/// Classic NEAT divides by the size of the larger genome;
/// a constant 1 is used here, as recommended for small
/// genomes. Threshold tuning depends on this choice.
pub const NORMALIZATION: f32 = 1.0;

/// Weighting factors of the compatibility distance terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityCoefficients {
    /// Weight of excess genes.
    pub excess: f32,
    /// Weight of disjoint genes.
    pub disjoint: f32,
    /// Weight of the mean weight difference of matched genes.
    pub matched: f32,
}

impl CompatibilityCoefficients {
    /// Returns coefficients with every factor set to 0.
    ///
    /// # Examples
    /// ```
    /// use oxineat::compatibility::CompatibilityCoefficients;
    ///
    /// let only_excess = CompatibilityCoefficients {
    ///     excess: 1.0,
    ///     ..CompatibilityCoefficients::zero()
    /// };
    /// ```
    pub const fn zero() -> CompatibilityCoefficients {
        CompatibilityCoefficients {
            excess: 0.0,
            disjoint: 0.0,
            matched: 0.0,
        }
    }

    /// Checks that every coefficient is finite and non-negative.
    ///
    /// # Errors
    /// Returns the first offending coefficient.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("excess", self.excess),
            ("disjoint", self.disjoint),
            ("matched", self.matched),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCoefficient { name, value });
            }
        }
        Ok(())
    }
}

impl Default for CompatibilityCoefficients {
    /// The factors from the 2002 NEAT paper: 1.0, 1.0, 0.4.
    fn default() -> CompatibilityCoefficients {
        CompatibilityCoefficients {
            excess: 1.0,
            disjoint: 1.0,
            matched: 0.4,
        }
    }
}

/// Result of aligning two gene sequences.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeneAlignment {
    /// Genes present in both sequences.
    pub matched: usize,
    /// Unmatched genes within the range of the other sequence.
    pub disjoint: usize,
    /// Unmatched genes past the end of the other sequence.
    pub excess: usize,
    /// Sum of absolute weight differences of matched genes.
    pub weight_difference: f32,
}

impl GeneAlignment {
    /// Aligns two sequences of `(innovation, weight)` pairs,
    /// each sorted by increasing innovation number.
    ///
    /// # Examples
    /// ```
    /// use oxineat::compatibility::GeneAlignment;
    ///
    /// let alignment = GeneAlignment::of(
    ///     [(1, 0.5), (3, 1.0), (4, 0.0)],
    ///     [(1, 1.0), (2, 0.0), (4, 0.0), (7, 2.0), (8, 2.0)],
    /// );
    ///
    /// assert_eq!(alignment.matched, 2);
    /// assert_eq!(alignment.disjoint, 2);
    /// assert_eq!(alignment.excess, 2);
    /// assert_eq!(alignment.weight_difference, 0.5);
    /// ```
    pub fn of<A, B>(first: A, second: B) -> GeneAlignment
    where
        A: IntoIterator<Item = (Innovation, f32)>,
        B: IntoIterator<Item = (Innovation, f32)>,
    {
        let mut first = first.into_iter().peekable();
        let mut second = second.into_iter().peekable();
        let mut alignment = GeneAlignment::default();

        loop {
            match (first.peek().copied(), second.peek().copied()) {
                (Some((id1, w1)), Some((id2, w2))) => {
                    if id1 == id2 {
                        alignment.matched += 1;
                        alignment.weight_difference += (w1 - w2).abs();
                        first.next();
                        second.next();
                    } else {
                        alignment.disjoint += 1;
                        if id1 < id2 {
                            first.next();
                        } else {
                            second.next();
                        }
                    }
                }
                (Some(_), None) => {
                    alignment.excess += first.by_ref().count();
                    break;
                }
                (None, Some(_)) => {
                    alignment.excess += second.by_ref().count();
                    break;
                }
                (None, None) => break,
            }
        }

        alignment
    }

    /// Mean absolute weight difference of matched genes.
    /// Sequences with no matched genes have a mean difference of 0.
    pub fn mean_weight_difference(&self) -> f32 {
        if self.matched == 0 {
            0.0
        } else {
            self.weight_difference / self.matched as f32
        }
    }

    /// Combines the alignment into a single distance value.
    pub fn score(&self, coefficients: &CompatibilityCoefficients) -> f32 {
        coefficients.excess * self.excess as f32 / NORMALIZATION
            + coefficients.disjoint * self.disjoint as f32 / NORMALIZATION
            + coefficients.matched * self.mean_weight_difference()
    }
}

/// Returns the compatibility distance between two gene sequences.
///
/// # Examples
/// ```
/// use oxineat::compatibility::{distance, CompatibilityCoefficients};
/// # use assert_approx_eq::assert_approx_eq;
///
/// let a = [(1, 0.5), (2, 0.5), (3, 0.5)];
/// let b = [(1, 0.6), (2, 0.5), (3, 0.4), (4, 1.0)];
///
/// // One excess gene, plus 0.4 ⨯ the mean weight difference.
/// let d = distance(a, b, &CompatibilityCoefficients::default());
/// assert_approx_eq!(d, 1.0 + 0.4 * (0.2 / 3.0), 1e-5);
/// ```
pub fn distance<A, B>(first: A, second: B, coefficients: &CompatibilityCoefficients) -> f32
where
    A: IntoIterator<Item = (Innovation, f32)>,
    B: IntoIterator<Item = (Innovation, f32)>,
{
    GeneAlignment::of(first, second).score(coefficients)
}

/// Checks that innovation numbers are strictly increasing.
///
/// # Errors
/// Returns an error at the first duplicate or out-of-order number.
///
/// # Examples
/// ```
/// use oxineat::compatibility::check_innovation_order;
///
/// assert!(check_innovation_order([0, 2, 5]).is_ok());
/// assert!(check_innovation_order([0, 2, 2]).is_err());
/// assert!(check_innovation_order([3, 1]).is_err());
/// ```
pub fn check_innovation_order<I>(innovations: I) -> Result<(), IntegrityError>
where
    I: IntoIterator<Item = Innovation>,
{
    let mut innovations = innovations.into_iter();
    let mut previous = match innovations.next() {
        Some(first) => first,
        None => return Ok(()),
    };
    for next in innovations {
        if next == previous {
            return Err(IntegrityError::DuplicateInnovation(next));
        } else if next < previous {
            return Err(IntegrityError::UnsortedInnovations { previous, next });
        }
        previous = next;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn genes(ids: &[Innovation], weight: f32) -> Vec<(Innovation, f32)> {
        ids.iter().map(|id| (*id, weight)).collect()
    }

    #[test]
    fn reference_scenario() {
        let a = vec![(1, 0.5), (2, 0.5), (3, 0.5)];
        let b = vec![(1, 0.6), (2, 0.5), (3, 0.4), (4, 0.0)];

        let alignment = GeneAlignment::of(a.clone(), b.clone());
        assert_eq!(alignment.matched, 3);
        assert_eq!(alignment.disjoint, 0);
        assert_eq!(alignment.excess, 1);
        assert_approx_eq!(alignment.weight_difference, 0.2, 1e-6);

        let d = distance(a, b, &CompatibilityCoefficients::default());
        assert_approx_eq!(d, 1.0267, 1e-4);
    }

    #[test]
    fn symmetric() {
        let pairs = [
            (vec![(0, 1.0), (2, -1.0), (5, 0.3)], vec![(1, 0.0), (2, 2.0)]),
            (vec![], vec![(3, 1.0), (4, 1.0)]),
            (
                vec![(1, 0.1), (4, 0.2), (9, 0.3), (10, 0.4)],
                vec![(2, 0.5), (4, 0.6), (6, 0.7)],
            ),
        ];
        let coefficients = CompatibilityCoefficients {
            excess: 0.7,
            disjoint: 1.3,
            matched: 2.0,
        };
        for (a, b) in pairs {
            assert_eq!(
                distance(a.clone(), b.clone(), &coefficients),
                distance(b, a, &coefficients)
            );
        }
    }

    #[test]
    fn zero_self_distance() {
        let a = vec![(0, 1.0), (3, -2.5), (4, 0.25), (11, 4.0)];
        assert_eq!(
            distance(a.clone(), a, &CompatibilityCoefficients::default()),
            0.0
        );
    }

    #[test]
    fn appended_excess_genes_add_excess_factor() {
        let coefficients = CompatibilityCoefficients::default();
        let a = vec![(0, 1.0), (2, 0.5), (3, 0.0)];
        let mut b = vec![(0, 0.0), (1, 0.5), (3, 0.5), (5, 0.5)];
        let before = distance(a.clone(), b.clone(), &coefficients);

        b.extend([(8, 1.0), (9, -1.0), (12, 0.0)]);
        let after = distance(a, b, &coefficients);

        assert_approx_eq!(after - before, coefficients.excess * 3.0, 1e-5);
    }

    #[test]
    fn no_matched_genes_is_finite() {
        let coefficients = CompatibilityCoefficients::default();

        let d = distance(genes(&[0, 2], 1.0), genes(&[1, 3], 1.0), &coefficients);
        assert!(d.is_finite());
        // 0 and 2 are disjoint to 1, 1 is disjoint to 2, 3 is excess.
        assert_eq!(d, 3.0 * coefficients.disjoint + coefficients.excess);

        let empty = distance(Vec::new(), Vec::new(), &coefficients);
        assert_eq!(empty, 0.0);

        let one_sided = distance(genes(&[0, 1, 2], 1.0), Vec::new(), &coefficients);
        assert_eq!(one_sided, 3.0 * coefficients.excess);
    }

    #[test]
    fn disjoint_and_excess_classification() {
        let alignment = GeneAlignment::of(genes(&[1, 2, 3, 6, 9, 10], 0.0), genes(&[1, 4, 6], 0.0));
        assert_eq!(alignment.matched, 2);
        // 2, 3 from first and 4 from second.
        assert_eq!(alignment.disjoint, 3);
        // 9 and 10 past the end of the second sequence.
        assert_eq!(alignment.excess, 2);
    }

    #[test]
    fn coefficient_validation() {
        assert!(CompatibilityCoefficients::default().validate().is_ok());
        assert!(CompatibilityCoefficients::zero().validate().is_ok());
        assert_eq!(
            CompatibilityCoefficients {
                disjoint: -1.0,
                ..CompatibilityCoefficients::default()
            }
            .validate(),
            Err(ConfigError::InvalidCoefficient {
                name: "disjoint",
                value: -1.0
            })
        );
        assert!(CompatibilityCoefficients {
            matched: f32::NAN,
            ..CompatibilityCoefficients::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn innovation_order() {
        assert!(check_innovation_order(Vec::new()).is_ok());
        assert_eq!(
            check_innovation_order([1, 4, 4]),
            Err(IntegrityError::DuplicateInnovation(4))
        );
        assert_eq!(
            check_innovation_order([1, 4, 2]),
            Err(IntegrityError::UnsortedInnovations {
                previous: 4,
                next: 2
            })
        );
    }
}
