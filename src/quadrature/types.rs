//! Type definitions.

use crate::types::ReferenceCellType;

/// Quadrature error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum QuadratureError {
    /// No tabulated rule is exact for the requested degree
    #[error(
        "no quadrature rule available on a {cell} for polynomial degree {degree} \
         (rules are tabulated up to degree {ceiling})"
    )]
    NoRuleAvailable {
        /// The integration cell
        cell: ReferenceCellType,
        /// The requested polynomial degree
        degree: usize,
        /// The largest tabulated degree for the cell
        ceiling: usize,
    },
}

/// Definition of a numerical quadrature rule.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule<T> {
    /// The dimension d of a single point.
    pub dim: usize,

    /// The largest polynomial degree the rule integrates exactly.
    pub order: usize,

    /// The number of points of the rule.
    pub npoints: usize,

    /// The point coordinates of the rule.
    ///
    /// A single point has the coordinates p_1, ..., p_d. The vector
    /// stores all points in consecutive order, so the first point starts
    /// at position zero, the second at position d, and so on.
    pub points: Vec<T>,

    /// The weights of the rule.
    pub weights: Vec<T>,
}
