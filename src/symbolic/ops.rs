//! Rank-checked expression constructors
//!
//! Every operator has one construction function that resolves operand
//! compatibility at tree-build time. An `Err` here means the form is
//! ill-typed; no tree node is created.

use crate::symbolic::expr::Expr;
use crate::symbolic::measure::Measure;
use crate::symbolic::SymbolicError;

fn reject_form_term(op: &'static str, operands: &[&Expr]) -> Result<(), SymbolicError> {
    for expr in operands {
        if expr.is_form_term() {
            return Err(SymbolicError::MisplacedIntegral {
                op,
                expr: expr.to_string(),
            });
        }
    }
    Ok(())
}

/// Sum of two expressions of equal rank, or of two integral-scoped terms
pub fn add(lhs: Expr, rhs: Expr) -> Result<Expr, SymbolicError> {
    if lhs.is_form_term() || rhs.is_form_term() {
        let bare = if lhs.is_form_term() { &rhs } else { &lhs };
        if !bare.is_form_term() {
            return Err(SymbolicError::UnmeasuredIntegrand {
                term: bare.to_string(),
            });
        }
        return Ok(Expr::Add(Box::new(lhs), Box::new(rhs)));
    }
    if lhs.value_shape() != rhs.value_shape() {
        return Err(SymbolicError::RankMismatch {
            op: "+",
            expr: format!("{lhs} + {rhs}"),
            detail: format!(
                "operands have ranks {} and {}",
                lhs.rank(),
                rhs.rank()
            ),
        });
    }
    Ok(Expr::Add(Box::new(lhs), Box::new(rhs)))
}

/// Difference of two expressions of equal rank, or of two integral-scoped
/// terms
pub fn sub(lhs: Expr, rhs: Expr) -> Result<Expr, SymbolicError> {
    if lhs.is_form_term() || rhs.is_form_term() {
        let bare = if lhs.is_form_term() { &rhs } else { &lhs };
        if !bare.is_form_term() {
            return Err(SymbolicError::UnmeasuredIntegrand {
                term: bare.to_string(),
            });
        }
        return Ok(Expr::Sub(Box::new(lhs), Box::new(rhs)));
    }
    if lhs.value_shape() != rhs.value_shape() {
        return Err(SymbolicError::RankMismatch {
            op: "-",
            expr: format!("{lhs} - {rhs}"),
            detail: format!(
                "operands have ranks {} and {}",
                lhs.rank(),
                rhs.rank()
            ),
        });
    }
    Ok(Expr::Sub(Box::new(lhs), Box::new(rhs)))
}

/// Negation
pub fn neg(expr: Expr) -> Expr {
    Expr::Neg(Box::new(expr))
}

/// Product of two expressions
///
/// At least one operand must be scalar, unless both operands have the
/// same shape of rank >= 1, in which case the product is their full
/// contraction.
pub fn multiply(lhs: Expr, rhs: Expr) -> Result<Expr, SymbolicError> {
    reject_form_term("*", &[&lhs, &rhs])?;
    let scalar_scaling = lhs.rank() == 0 || rhs.rank() == 0;
    let contraction = lhs.rank() >= 1 && lhs.value_shape() == rhs.value_shape();
    if !scalar_scaling && !contraction {
        return Err(SymbolicError::RankMismatch {
            op: "*",
            expr: format!("{lhs}*{rhs}"),
            detail: format!(
                "operands of ranks {} and {} have no scalar factor and no common shape",
                lhs.rank(),
                rhs.rank()
            ),
        });
    }
    Ok(Expr::Mul(Box::new(lhs), Box::new(rhs)))
}

/// Full contraction (inner product) of two equal-shape operands of rank
/// >= 1
pub fn dot(lhs: Expr, rhs: Expr) -> Result<Expr, SymbolicError> {
    reject_form_term("dot", &[&lhs, &rhs])?;
    if lhs.rank() == 0 || lhs.value_shape() != rhs.value_shape() {
        return Err(SymbolicError::RankMismatch {
            op: "dot",
            expr: format!("dot({lhs}, {rhs})"),
            detail: format!(
                "operands must have equal shapes of rank >= 1, got ranks {} and {}",
                lhs.rank(),
                rhs.rank()
            ),
        });
    }
    Ok(Expr::Dot(Box::new(lhs), Box::new(rhs)))
}

/// Full contraction of two equal-shape operands. Alias of [`dot`].
pub fn inner(lhs: Expr, rhs: Expr) -> Result<Expr, SymbolicError> {
    dot(lhs, rhs)
}

/// Spatial gradient
///
/// The operand must reference at least one function space, which fixes
/// the spatial dimension of the gradient axis.
pub fn grad(expr: Expr) -> Result<Expr, SymbolicError> {
    reject_form_term("grad", &[&expr])?;
    if expr.cell_type().is_none() {
        return Err(SymbolicError::RankMismatch {
            op: "grad",
            expr: expr.to_string(),
            detail: "operand references no function space".to_string(),
        });
    }
    Ok(Expr::Grad(Box::new(expr)))
}

/// Spatial divergence of an operand of rank >= 1
pub fn div(expr: Expr) -> Result<Expr, SymbolicError> {
    reject_form_term("div", &[&expr])?;
    if expr.rank() == 0 {
        return Err(SymbolicError::RankMismatch {
            op: "div",
            expr: expr.to_string(),
            detail: "operand must have rank >= 1".to_string(),
        });
    }
    Ok(Expr::Div(Box::new(expr)))
}

/// Scope a scalar integrand by an integration measure
pub fn scale(expr: Expr, measure: Measure) -> Result<Expr, SymbolicError> {
    reject_form_term("measure", &[&expr])?;
    if expr.rank() != 0 {
        return Err(SymbolicError::RankMismatch {
            op: "measure",
            expr: expr.to_string(),
            detail: format!("integrand must be scalar, got rank {}", expr.rank()),
        });
    }
    Ok(Expr::Integral {
        integrand: Box::new(expr),
        measure,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::{Element, ElementRegistry};
    use crate::symbolic::function::FunctionHandle;
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

    fn dg0() -> Arc<Element> {
        Arc::new(
            ElementRegistry::standard()
                .construct(
                    ElementFamily::Lagrange,
                    ReferenceCellType::Triangle,
                    0,
                    Continuity::Discontinuous,
                )
                .unwrap()
                .into(),
        )
    }

    #[test]
    fn test_dot_requires_equal_ranks() {
        let v = Expr::Function(FunctionHandle::test(bdm1()));
        let p = Expr::Function(FunctionHandle::trial(dg0()));
        let err = dot(v, p).unwrap_err();
        assert!(matches!(err, SymbolicError::RankMismatch { op: "dot", .. }));
    }

    #[test]
    fn test_multiply_rejects_vector_vector_of_unequal_shape() {
        let v = Expr::Function(FunctionHandle::test(bdm1()));
        let n = Expr::FacetNormal { dim: 3 };
        let err = multiply(v, n).unwrap_err();
        assert!(matches!(err, SymbolicError::RankMismatch { op: "*", .. }));
    }

    #[test]
    fn test_multiply_contracts_equal_shapes() {
        let v = Expr::Function(FunctionHandle::test(bdm1()));
        let n = Expr::FacetNormal { dim: 2 };
        let product = multiply(v, n).unwrap();
        assert_eq!(product.rank(), 0);
    }

    #[test]
    fn test_scale_requires_scalar() {
        let v = Expr::Function(FunctionHandle::test(bdm1()));
        let err = scale(v, dx()).unwrap_err();
        assert!(matches!(err, SymbolicError::RankMismatch { op: "measure", .. }));
    }

    #[test]
    fn test_add_rejects_bare_and_integral() {
        let v = Expr::Function(FunctionHandle::test(bdm1()));
        let u = Expr::Function(FunctionHandle::trial(bdm1()));
        let term = scale(dot(v.clone(), u).unwrap(), dx()).unwrap();
        let err = add(term, Expr::Constant(1.0)).unwrap_err();
        assert!(matches!(err, SymbolicError::UnmeasuredIntegrand { .. }));
    }

    #[test]
    fn test_grad_of_constant_rejected() {
        let err = grad(Expr::Constant(2.0)).unwrap_err();
        assert!(matches!(err, SymbolicError::RankMismatch { op: "grad", .. }));
    }
}
