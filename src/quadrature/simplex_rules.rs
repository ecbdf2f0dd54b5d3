//! Get rules on simplices.
//!
//! Symmetric Gauss rules on the reference interval [0, 1], the reference
//! triangle with vertices (0,0), (1,0), (0,1) and the reference
//! tetrahedron with vertices (0,0,0), (1,0,0), (0,1,0), (0,0,1).

use std::collections::HashMap;

use crate::quadrature::types::{QuadratureError, QuadratureRule};
use crate::types::{RealScalar, ReferenceCellType};

type RuleData = (usize, Vec<f64>, Vec<f64>);

lazy_static! {
    /// Tabulated (order, points, weights) per cell, sorted by order
    static ref SIMPLEX_RULE_DEFINITIONS: HashMap<ReferenceCellType, Vec<RuleData>> =
        HashMap::from([
            (
                ReferenceCellType::Interval,
                vec![
                    (1, vec![0.5], vec![1.0]),
                    (
                        3,
                        vec![0.211324865405187, 0.788675134594813],
                        vec![0.5, 0.5],
                    ),
                    (
                        5,
                        vec![0.112701665379258, 0.5, 0.887298334620742],
                        vec![
                            0.277777777777778,
                            0.444444444444444,
                            0.277777777777778,
                        ],
                    ),
                    (
                        7,
                        vec![
                            0.069431844202974,
                            0.330009478207572,
                            0.669990521792428,
                            0.930568155797026,
                        ],
                        vec![
                            0.173927422568727,
                            0.326072577431273,
                            0.326072577431273,
                            0.173927422568727,
                        ],
                    ),
                ],
            ),
            (
                ReferenceCellType::Triangle,
                vec![
                    (
                        1,
                        vec![1.0 / 3.0, 1.0 / 3.0],
                        vec![0.5],
                    ),
                    (
                        2,
                        vec![
                            1.0 / 6.0, 1.0 / 6.0,
                            2.0 / 3.0, 1.0 / 6.0,
                            1.0 / 6.0, 2.0 / 3.0,
                        ],
                        vec![1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0],
                    ),
                    (
                        3,
                        vec![
                            1.0 / 3.0, 1.0 / 3.0,
                            0.6, 0.2,
                            0.2, 0.6,
                            0.2, 0.2,
                        ],
                        vec![-0.28125, 0.260416666666667, 0.260416666666667, 0.260416666666667],
                    ),
                    (
                        4,
                        vec![
                            0.445948490915965, 0.445948490915965,
                            0.108103018168070, 0.445948490915965,
                            0.445948490915965, 0.108103018168070,
                            0.091576213509771, 0.091576213509771,
                            0.816847572980459, 0.091576213509771,
                            0.091576213509771, 0.816847572980459,
                        ],
                        vec![
                            0.111690794839005,
                            0.111690794839005,
                            0.111690794839005,
                            0.054975871827661,
                            0.054975871827661,
                            0.054975871827661,
                        ],
                    ),
                    (
                        5,
                        vec![
                            1.0 / 3.0, 1.0 / 3.0,
                            0.470142064105115, 0.470142064105115,
                            0.059715871789770, 0.470142064105115,
                            0.470142064105115, 0.059715871789770,
                            0.101286507323456, 0.101286507323456,
                            0.797426985353087, 0.101286507323456,
                            0.101286507323456, 0.797426985353087,
                        ],
                        vec![
                            0.1125,
                            0.066197076394253,
                            0.066197076394253,
                            0.066197076394253,
                            0.062969590272414,
                            0.062969590272414,
                            0.062969590272414,
                        ],
                    ),
                ],
            ),
            (
                ReferenceCellType::Tetrahedron,
                vec![
                    (
                        1,
                        vec![0.25, 0.25, 0.25],
                        vec![1.0 / 6.0],
                    ),
                    (
                        2,
                        vec![
                            0.585410196624969, 0.138196601125011, 0.138196601125011,
                            0.138196601125011, 0.585410196624969, 0.138196601125011,
                            0.138196601125011, 0.138196601125011, 0.585410196624969,
                            0.138196601125011, 0.138196601125011, 0.138196601125011,
                        ],
                        vec![1.0 / 24.0, 1.0 / 24.0, 1.0 / 24.0, 1.0 / 24.0],
                    ),
                    (
                        3,
                        vec![
                            0.25, 0.25, 0.25,
                            0.5, 1.0 / 6.0, 1.0 / 6.0,
                            1.0 / 6.0, 0.5, 1.0 / 6.0,
                            1.0 / 6.0, 1.0 / 6.0, 0.5,
                            1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0,
                        ],
                        vec![-2.0 / 15.0, 0.075, 0.075, 0.075, 0.075],
                    ),
                ],
            ),
        ]);
}

fn cell_dim(cell: ReferenceCellType) -> usize {
    crate::element::reference_cell::dim(cell)
}

/// The orders for which rules are tabulated on a cell
pub fn available_orders(cell: ReferenceCellType) -> Vec<usize> {
    match SIMPLEX_RULE_DEFINITIONS.get(&cell) {
        Some(rules) => rules.iter().map(|(order, _, _)| *order).collect(),
        None => vec![],
    }
}

/// Return the smallest tabulated rule exact for polynomials of the given
/// degree on the given cell.
///
/// Fails with [`QuadratureError::NoRuleAvailable`] above the tabulated
/// ceiling of the cell.
pub fn simplex_rule<T: RealScalar>(
    cell: ReferenceCellType,
    degree: usize,
) -> Result<QuadratureRule<T>, QuadratureError> {
    if cell == ReferenceCellType::Point {
        // Facet integrals on intervals evaluate the integrand at a point.
        return Ok(QuadratureRule {
            dim: 0,
            order: degree,
            npoints: 1,
            points: vec![],
            weights: vec![num::cast::<f64, T>(1.0).unwrap()],
        });
    }
    let rules = SIMPLEX_RULE_DEFINITIONS.get(&cell).ok_or(
        QuadratureError::NoRuleAvailable {
            cell,
            degree,
            ceiling: 0,
        },
    )?;
    let (order, points, weights) = rules
        .iter()
        .find(|(order, _, _)| *order >= degree)
        .ok_or_else(|| QuadratureError::NoRuleAvailable {
            cell,
            degree,
            ceiling: rules.last().map(|(order, _, _)| *order).unwrap_or(0),
        })?;
    Ok(QuadratureRule {
        dim: cell_dim(cell),
        order: *order,
        npoints: weights.len(),
        points: points
            .iter()
            .map(|p| num::cast::<f64, T>(*p).unwrap())
            .collect(),
        weights: weights
            .iter()
            .map(|w| num::cast::<f64, T>(*w).unwrap())
            .collect(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::reference_cell;
    use approx::assert_relative_eq;
    use paste::paste;

    macro_rules! test_cell {

        ($($cell:ident),+) => {

        $(
            paste! {

                #[test]
                fn [<test_volume_ $cell:lower>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    for order in available_orders(cell) {
                        let rule = simplex_rule::<f64>(cell, order).unwrap();
                        let volume_actual: f64 = rule.weights.iter().sum();
                        let volume_expected = reference_cell::volume(cell);
                        assert_relative_eq!(volume_actual, volume_expected, max_relative = 1e-13);
                        assert_eq!(rule.points.len(), rule.npoints * rule.dim);
                    }
                }

            }
        )*
        };
    }

    test_cell!(Interval, Triangle, Tetrahedron);

    #[test]
    fn test_rule_at_least_requested_degree() {
        for degree in 0..=5 {
            let rule = simplex_rule::<f64>(ReferenceCellType::Triangle, degree).unwrap();
            assert!(rule.order >= degree);
        }
    }

    #[test]
    fn test_no_rule_above_ceiling() {
        let err = simplex_rule::<f64>(ReferenceCellType::Triangle, 6).unwrap_err();
        assert_eq!(
            err,
            QuadratureError::NoRuleAvailable {
                cell: ReferenceCellType::Triangle,
                degree: 6,
                ceiling: 5,
            }
        );
    }

    #[test]
    fn test_unknown_cell_has_no_rules() {
        let err = simplex_rule::<f64>(ReferenceCellType::Prism, 1).unwrap_err();
        assert!(matches!(err, QuadratureError::NoRuleAvailable { .. }));
    }
}
