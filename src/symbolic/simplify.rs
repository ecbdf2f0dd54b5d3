//! Expression normalization
//!
//! Local rewrites only: constant folding, additive zeros, multiplicative
//! identities. Rewrites never change the rank of a node, so a zero
//! constant is only folded away where the surrounding context is scalar.

use crate::symbolic::expr::Expr;

fn is_zero(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(value) if *value == 0.0)
}

fn is_one(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(value) if *value == 1.0)
}

/// Normalize an expression
///
/// Idempotent: simplifying a simplified tree returns it unchanged. The
/// input tree is left intact.
pub fn simplify(expr: &Expr) -> Expr {
    let simplified = rewrite(expr);
    debug_assert_eq!(simplified.rank(), expr.rank());
    simplified
}

fn rewrite(expr: &Expr) -> Expr {
    match expr {
        Expr::Constant(_) | Expr::Function(_) | Expr::FacetNormal { .. } => expr.clone(),
        Expr::Neg(inner) => match rewrite(inner) {
            Expr::Constant(value) => Expr::Constant(-value),
            Expr::Neg(inner) => *inner,
            inner => Expr::Neg(Box::new(inner)),
        },
        Expr::Add(lhs, rhs) => {
            let lhs = rewrite(lhs);
            let rhs = rewrite(rhs);
            match (&lhs, &rhs) {
                (Expr::Constant(a), Expr::Constant(b)) => Expr::Constant(a + b),
                _ if is_zero(&lhs) && rhs.rank() == 0 => rhs,
                _ if is_zero(&rhs) && lhs.rank() == 0 => lhs,
                _ => Expr::Add(Box::new(lhs), Box::new(rhs)),
            }
        }
        Expr::Sub(lhs, rhs) => {
            let lhs = rewrite(lhs);
            let rhs = rewrite(rhs);
            match (&lhs, &rhs) {
                (Expr::Constant(a), Expr::Constant(b)) => Expr::Constant(a - b),
                _ if is_zero(&rhs) && lhs.rank() == 0 => lhs,
                _ if is_zero(&lhs) && rhs.rank() == 0 => {
                    match rhs {
                        Expr::Neg(inner) => *inner,
                        rhs => Expr::Neg(Box::new(rhs)),
                    }
                }
                _ => Expr::Sub(Box::new(lhs), Box::new(rhs)),
            }
        }
        Expr::Mul(lhs, rhs) => {
            let lhs = rewrite(lhs);
            let rhs = rewrite(rhs);
            match (&lhs, &rhs) {
                (Expr::Constant(a), Expr::Constant(b)) => Expr::Constant(a * b),
                _ if is_one(&lhs) => rhs,
                _ if is_one(&rhs) => lhs,
                _ if is_zero(&lhs) && rhs.rank() == 0 => Expr::Constant(0.0),
                _ if is_zero(&rhs) && lhs.rank() == 0 => Expr::Constant(0.0),
                _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
            }
        }
        Expr::Dot(lhs, rhs) => Expr::Dot(Box::new(rewrite(lhs)), Box::new(rewrite(rhs))),
        Expr::Grad(inner) => Expr::Grad(Box::new(rewrite(inner))),
        Expr::Div(inner) => Expr::Div(Box::new(rewrite(inner))),
        Expr::Integral { integrand, measure } => Expr::Integral {
            integrand: Box::new(rewrite(integrand)),
            measure: *measure,
        },
    }
}
