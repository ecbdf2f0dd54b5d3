//! The expression tree

use std::fmt;

use crate::element::reference_cell;
use crate::symbolic::function::FunctionHandle;
use crate::symbolic::measure::Measure;
use crate::traits::ElementType;
use crate::types::ReferenceCellType;

/// A node of a symbolic expression
///
/// Expressions form immutable trees with parent nodes owning their
/// children. Nodes are built through the checking constructors in
/// [`crate::symbolic::ops`], which resolve rank compatibility at build
/// time; the variants themselves carry no validity information.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric constant
    Constant(f64),
    /// A test, trial or coefficient function
    Function(FunctionHandle),
    /// The outward unit normal of a facet
    FacetNormal {
        /// Spatial dimension of the normal
        dim: usize,
    },
    /// Negation
    Neg(Box<Expr>),
    /// Spatial gradient, raising the rank by one
    Grad(Box<Expr>),
    /// Spatial divergence, lowering the rank by one
    Div(Box<Expr>),
    /// Sum of two equal-rank expressions
    Add(Box<Expr>, Box<Expr>),
    /// Difference of two equal-rank expressions
    Sub(Box<Expr>, Box<Expr>),
    /// Product: scalar scaling, or full contraction of equal-rank operands
    Mul(Box<Expr>, Box<Expr>),
    /// Full contraction (inner product) of two equal-rank operands
    Dot(Box<Expr>, Box<Expr>),
    /// An integrand scoped by an integration measure
    Integral {
        /// The expression being integrated
        integrand: Box<Expr>,
        /// Where the integral is evaluated
        measure: Measure,
    },
}

impl Expr {
    /// The value shape of the expression
    pub fn value_shape(&self) -> Vec<usize> {
        match self {
            Expr::Constant(_) => vec![],
            Expr::Function(handle) => handle.value_shape(),
            Expr::FacetNormal { dim } => vec![*dim],
            Expr::Neg(inner) => inner.value_shape(),
            Expr::Grad(inner) => {
                let mut shape = inner.value_shape();
                let dim = self
                    .cell_type()
                    .map(reference_cell::dim)
                    .unwrap_or_default();
                shape.push(dim);
                shape
            }
            Expr::Div(inner) => {
                let mut shape = inner.value_shape();
                shape.pop();
                shape
            }
            Expr::Add(lhs, _) | Expr::Sub(lhs, _) => lhs.value_shape(),
            Expr::Mul(lhs, rhs) => {
                if lhs.rank() == 0 {
                    rhs.value_shape()
                } else if rhs.rank() == 0 {
                    lhs.value_shape()
                } else {
                    // Equal-rank contraction
                    vec![]
                }
            }
            Expr::Dot(_, _) => vec![],
            Expr::Integral { .. } => vec![],
        }
    }

    /// The tensor rank of the expression (0 scalar, 1 vector, 2 tensor)
    pub fn rank(&self) -> usize {
        self.value_shape().len()
    }

    /// An upper bound on the polynomial degree of the expression
    ///
    /// Degrees of factors are summed along product chains and the maximum
    /// is taken over the branches of sums. Differential operators lower
    /// the bound by one: the estimate targets affine cells, where
    /// differentiation loses one polynomial degree.
    pub fn degree_bound(&self) -> usize {
        match self {
            Expr::Constant(_) => 0,
            Expr::Function(handle) => handle.terminal_element().embedded_superdegree(),
            Expr::FacetNormal { .. } => 0,
            Expr::Neg(inner) => inner.degree_bound(),
            Expr::Grad(inner) | Expr::Div(inner) => inner.degree_bound().saturating_sub(1),
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) => {
                lhs.degree_bound().max(rhs.degree_bound())
            }
            Expr::Mul(lhs, rhs) | Expr::Dot(lhs, rhs) => lhs.degree_bound() + rhs.degree_bound(),
            Expr::Integral { integrand, .. } => integrand.degree_bound(),
        }
    }

    /// The reference cell of the first function space referenced by the
    /// expression, if any
    pub fn cell_type(&self) -> Option<ReferenceCellType> {
        let mut cell = None;
        self.for_each_function(&mut |handle: &FunctionHandle| {
            cell.get_or_insert(handle.element().cell_type());
        });
        cell
    }

    /// True if the expression is an integral or a combination of integrals
    pub fn is_form_term(&self) -> bool {
        match self {
            Expr::Integral { .. } => true,
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) => {
                lhs.is_form_term() && rhs.is_form_term()
            }
            Expr::Neg(inner) => inner.is_form_term(),
            _ => false,
        }
    }

    /// Visit every function handle in the tree
    pub fn for_each_function(&self, visit: &mut impl FnMut(&FunctionHandle)) {
        match self {
            Expr::Constant(_) | Expr::FacetNormal { .. } => {}
            Expr::Function(handle) => visit(handle),
            Expr::Neg(inner) | Expr::Grad(inner) | Expr::Div(inner) => {
                inner.for_each_function(visit)
            }
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Dot(lhs, rhs) => {
                lhs.for_each_function(visit);
                rhs.for_each_function(visit);
            }
            Expr::Integral { integrand, .. } => integrand.for_each_function(visit),
        }
    }
}

fn fmt_operand(expr: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expr::Add(_, _) | Expr::Sub(_, _) => write!(f, "({expr})"),
        _ => write!(f, "{expr}"),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{value}"),
            Expr::Function(handle) => write!(f, "{handle}"),
            Expr::FacetNormal { .. } => write!(f, "n"),
            Expr::Neg(inner) => {
                write!(f, "-")?;
                fmt_operand(inner, f)
            }
            Expr::Grad(inner) => write!(f, "grad({inner})"),
            Expr::Div(inner) => write!(f, "div({inner})"),
            Expr::Add(lhs, rhs) => write!(f, "{lhs} + {rhs}"),
            Expr::Sub(lhs, rhs) => {
                write!(f, "{lhs} - ")?;
                fmt_operand(rhs, f)
            }
            Expr::Mul(lhs, rhs) => {
                fmt_operand(lhs, f)?;
                write!(f, "*")?;
                fmt_operand(rhs, f)
            }
            Expr::Dot(lhs, rhs) => write!(f, "dot({lhs}, {rhs})"),
            Expr::Integral { integrand, measure } => match integrand.as_ref() {
                Expr::Add(_, _) | Expr::Sub(_, _) | Expr::Mul(_, _) => {
                    write!(f, "({integrand})*{measure}")
                }
                _ => write!(f, "{integrand}*{measure}"),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::{Element, ElementRegistry};
    use crate::symbolic::measure::dx;
    use crate::types::{Continuity, ElementFamily, ReferenceCellType};
    use std::sync::Arc;

    fn bdm1() -> Arc<Element> {
        Arc::new(
            ElementRegistry::standard()
                .construct(
                    ElementFamily::BrezziDouglasMarini,
                    ReferenceCellType::Triangle,
                    1,
                    Continuity::Standard,
                )
                .unwrap()
                .into(),
        )
    }

    #[test]
    fn test_shapes_and_degrees() {
        let v = Expr::Function(FunctionHandle::test(bdm1()));
        let u = Expr::Function(FunctionHandle::trial(bdm1()));
        assert_eq!(v.rank(), 1);
        assert_eq!(v.value_shape(), vec![2]);

        let dot = Expr::Dot(Box::new(v.clone()), Box::new(u));
        assert_eq!(dot.rank(), 0);
        assert_eq!(dot.degree_bound(), 2);

        let div = Expr::Div(Box::new(v));
        assert_eq!(div.rank(), 0);
        assert_eq!(div.degree_bound(), 0);
    }

    #[test]
    fn test_display() {
        let v = Expr::Function(FunctionHandle::test(bdm1()));
        let u = Expr::Function(FunctionHandle::trial(bdm1()));
        let expr = Expr::Integral {
            integrand: Box::new(Expr::Dot(Box::new(v), Box::new(u))),
            measure: dx(),
        };
        assert_eq!(format!("{expr}"), "dot(v_0, u_0)*dx");
    }

    #[test]
    fn test_form_term_detection() {
        let v = Expr::Function(FunctionHandle::test(bdm1()));
        let u = Expr::Function(FunctionHandle::trial(bdm1()));
        let integral = Expr::Integral {
            integrand: Box::new(Expr::Dot(Box::new(v.clone()), Box::new(u))),
            measure: dx(),
        };
        assert!(integral.is_form_term());
        assert!(Expr::Add(Box::new(integral.clone()), Box::new(integral.clone())).is_form_term());
        assert!(!v.is_form_term());
        assert!(!Expr::Add(Box::new(integral), Box::new(v)).is_form_term());
    }
}
