//! Directional (Gateaux) derivatives of forms
//!
//! Linearizes a form about a coefficient function: every occurrence of the
//! coefficient is replaced, one factor at a time, by a trial function
//! pointing in the perturbation direction. Differentiating a linear
//! (arity 1) residual form yields the bilinear (arity 2) Jacobian form.

use crate::form::{Form, Integral};
use crate::symbolic::expr::Expr;
use crate::symbolic::function::{FunctionHandle, FunctionRole};
use crate::symbolic::SymbolicError;

/// The directional derivative of `form` with respect to `coefficient` in
/// the direction of the trial function `direction`
pub fn derivative(
    form: &Form,
    coefficient: &FunctionHandle,
    direction: &FunctionHandle,
) -> Result<Form, SymbolicError> {
    if coefficient.role() != FunctionRole::Coefficient {
        return Err(SymbolicError::InvalidDerivative {
            detail: format!("`{coefficient}` is not a coefficient"),
        });
    }
    if direction.role() != FunctionRole::Trial {
        return Err(SymbolicError::InvalidDerivative {
            detail: format!("direction `{direction}` is not a trial function"),
        });
    }
    if coefficient.element().as_ref() != direction.element().as_ref() {
        return Err(SymbolicError::InvalidDerivative {
            detail: format!(
                "direction `{direction}` is not over the coefficient's element"
            ),
        });
    }

    let mut integrals = vec![];
    for integral in form.integrals() {
        if let Some(integrand) = diff(&integral.integrand, coefficient, direction) {
            integrals.push(Integral {
                integrand,
                measure: integral.measure,
            });
        }
    }
    Ok(Form::from_integrals(integrals))
}

/// Differentiate one expression; `None` means the derivative is zero.
fn diff(
    expr: &Expr,
    coefficient: &FunctionHandle,
    direction: &FunctionHandle,
) -> Option<Expr> {
    match expr {
        Expr::Constant(_) | Expr::FacetNormal { .. } => None,
        Expr::Function(handle) => {
            if handle.same_function(coefficient) {
                let replacement = match handle.slot() {
                    Some(slot) => direction.slot_handle(slot),
                    None => direction.clone(),
                };
                Some(Expr::Function(replacement))
            } else {
                None
            }
        }
        Expr::Neg(inner) => diff(inner, coefficient, direction)
            .map(|d| Expr::Neg(Box::new(d))),
        Expr::Grad(inner) => diff(inner, coefficient, direction)
            .map(|d| Expr::Grad(Box::new(d))),
        Expr::Div(inner) => diff(inner, coefficient, direction)
            .map(|d| Expr::Div(Box::new(d))),
        Expr::Add(lhs, rhs) => combine(
            diff(lhs, coefficient, direction),
            diff(rhs, coefficient, direction),
            Expr::Add,
        ),
        Expr::Sub(lhs, rhs) => match (
            diff(lhs, coefficient, direction),
            diff(rhs, coefficient, direction),
        ) {
            (Some(dl), Some(dr)) => Some(Expr::Sub(Box::new(dl), Box::new(dr))),
            (Some(dl), None) => Some(dl),
            (None, Some(dr)) => Some(Expr::Neg(Box::new(dr))),
            (None, None) => None,
        },
        Expr::Mul(lhs, rhs) => product_rule(lhs, rhs, coefficient, direction, Expr::Mul),
        Expr::Dot(lhs, rhs) => product_rule(lhs, rhs, coefficient, direction, Expr::Dot),
        Expr::Integral { integrand, measure } => diff(integrand, coefficient, direction)
            .map(|d| Expr::Integral {
                integrand: Box::new(d),
                measure: *measure,
            }),
    }
}

fn combine(
    lhs: Option<Expr>,
    rhs: Option<Expr>,
    node: fn(Box<Expr>, Box<Expr>) -> Expr,
) -> Option<Expr> {
    match (lhs, rhs) {
        (Some(dl), Some(dr)) => Some(node(Box::new(dl), Box::new(dr))),
        (Some(dl), None) => Some(dl),
        (None, Some(dr)) => Some(dr),
        (None, None) => None,
    }
}

fn product_rule(
    lhs: &Expr,
    rhs: &Expr,
    coefficient: &FunctionHandle,
    direction: &FunctionHandle,
    node: fn(Box<Expr>, Box<Expr>) -> Expr,
) -> Option<Expr> {
    let left = diff(lhs, coefficient, direction)
        .map(|dl| node(Box::new(dl), Box::new(rhs.clone())));
    let right = diff(rhs, coefficient, direction)
        .map(|dr| node(Box::new(lhs.clone()), Box::new(dr)));
    combine(left, right, Expr::Add)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::{Element, ElementRegistry};
    use crate::form::analysis::analyze;
    use crate::symbolic::measure::dx;
    use crate::symbolic::ops;
    use crate::types::{Continuity, ElementFamily, ReferenceCellType};
    use std::sync::Arc;

    fn p1() -> Arc<Element> {
        Arc::new(
            ElementRegistry::standard()
                .construct(
                    ElementFamily::Lagrange,
                    ReferenceCellType::Triangle,
                    1,
                    Continuity::Standard,
                )
                .unwrap()
                .into(),
        )
    }

    #[test]
    fn test_derivative_of_quadratic_residual_is_bilinear() {
        let element = p1();
        let r = FunctionHandle::test(Arc::clone(&element));
        let s = FunctionHandle::coefficient(Arc::clone(&element));
        let du = FunctionHandle::trial(Arc::clone(&element));

        // residual r*s*s*dx, nonlinear in s
        let residual = Form::from_expr(
            ops::scale(
                ops::multiply(
                    Expr::Function(r),
                    ops::multiply(
                        Expr::Function(s.clone()),
                        Expr::Function(s.clone()),
                    )
                    .unwrap(),
                )
                .unwrap(),
                dx(),
            )
            .unwrap(),
        )
        .unwrap();

        assert_eq!(analyze(&residual).unwrap().arity, 1);
        let jacobian = derivative(&residual, &s, &du).unwrap();
        assert_eq!(analyze(&jacobian).unwrap().arity, 2);
    }

    #[test]
    fn test_derivative_of_constant_term_vanishes() {
        let element = p1();
        let r = FunctionHandle::test(Arc::clone(&element));
        let s = FunctionHandle::coefficient(Arc::clone(&element));
        let g = FunctionHandle::coefficient(Arc::clone(&element)).with_argument_index(1);
        let du = FunctionHandle::trial(Arc::clone(&element));

        // r*g*dx does not reference s at all
        let form = Form::from_expr(
            ops::scale(
                ops::multiply(Expr::Function(r), Expr::Function(g)).unwrap(),
                dx(),
            )
            .unwrap(),
        )
        .unwrap();

        let derived = derivative(&form, &s, &du).unwrap();
        assert!(derived.integrals().is_empty());
    }

    #[test]
    fn test_derivative_rejects_non_coefficient() {
        let element = p1();
        let r = FunctionHandle::test(Arc::clone(&element));
        let du = FunctionHandle::trial(Arc::clone(&element));
        let form = Form::from_expr(
            ops::scale(Expr::Function(r.clone()), dx()).unwrap(),
        )
        .unwrap();
        let err = derivative(&form, &r, &du).unwrap_err();
        assert!(matches!(err, SymbolicError::InvalidDerivative { .. }));
    }
}
