//! Forms
//!
//! A form is a sequence of measure-scoped integrals. Building a form from
//! an expression distributes top-level sums over the integral terms and
//! rejects any term that is not scoped by a measure.

pub mod analysis;

use crate::symbolic::expr::Expr;
use crate::symbolic::measure::Measure;
use crate::symbolic::simplify::simplify;
use crate::symbolic::SymbolicError;

/// One measure-scoped term of a form
#[derive(Debug, Clone, PartialEq)]
pub struct Integral {
    /// The scalar integrand
    pub integrand: Expr,
    /// Where the term is integrated
    pub measure: Measure,
}

/// A variational form: a sum of integrals
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    integrals: Vec<Integral>,
}

impl Form {
    /// Build a form from a sum of integral-scoped terms
    ///
    /// Sums and differences are distributed over the integral terms; a
    /// bare term with no measure fails with `UnmeasuredIntegrand`.
    pub fn from_expr(expr: Expr) -> Result<Self, SymbolicError> {
        let mut integrals = vec![];
        flatten(expr, false, &mut integrals)?;
        Ok(Self { integrals })
    }

    pub(crate) fn from_integrals(integrals: Vec<Integral>) -> Self {
        Self { integrals }
    }

    /// The form's integrals, in declaration order
    pub fn integrals(&self) -> &[Integral] {
        &self.integrals
    }

    /// The form with every integrand normalized
    pub fn simplify(&self) -> Self {
        Self {
            integrals: self
                .integrals
                .iter()
                .map(|integral| Integral {
                    integrand: simplify(&integral.integrand),
                    measure: integral.measure,
                })
                .collect(),
        }
    }
}

/// Forms over the same spaces can be summed term by term
impl std::ops::Add for Form {
    type Output = Form;

    fn add(mut self, rhs: Form) -> Form {
        self.integrals.extend(rhs.integrals);
        self
    }
}

fn flatten(
    expr: Expr,
    negate: bool,
    integrals: &mut Vec<Integral>,
) -> Result<(), SymbolicError> {
    match expr {
        Expr::Integral { integrand, measure } => {
            let integrand = if negate {
                Expr::Neg(integrand)
            } else {
                *integrand
            };
            integrals.push(Integral { integrand, measure });
            Ok(())
        }
        Expr::Add(lhs, rhs) => {
            flatten(*lhs, negate, integrals)?;
            flatten(*rhs, negate, integrals)
        }
        Expr::Sub(lhs, rhs) => {
            flatten(*lhs, negate, integrals)?;
            flatten(*rhs, !negate, integrals)
        }
        Expr::Neg(inner) => flatten(*inner, !negate, integrals),
        other => Err(SymbolicError::UnmeasuredIntegrand {
            term: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::{Element, ElementRegistry};
    use crate::symbolic::function::FunctionHandle;
    use crate::symbolic::measure::{ds, dx};
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
    fn test_from_expr_distributes_sums() {
        let v = Expr::Function(FunctionHandle::test(p1()));
        let w = Expr::Function(FunctionHandle::coefficient(p1()));
        let term1 = ops::scale(
            ops::multiply(v.clone(), w.clone()).unwrap(),
            dx(),
        )
        .unwrap();
        let term2 = ops::scale(ops::multiply(v, w).unwrap(), ds().on(1)).unwrap();
        let form = Form::from_expr(ops::sub(term1, term2).unwrap()).unwrap();
        assert_eq!(form.integrals().len(), 2);
        assert_eq!(form.integrals()[0].measure, dx());
        assert_eq!(form.integrals()[1].measure, ds().on(1));
        assert!(matches!(form.integrals()[1].integrand, Expr::Neg(_)));
    }

    #[test]
    fn test_from_expr_rejects_unmeasured_term() {
        let v = Expr::Function(FunctionHandle::test(p1()));
        let err = Form::from_expr(v).unwrap_err();
        assert!(matches!(err, SymbolicError::UnmeasuredIntegrand { .. }));
    }

    #[test]
    fn test_form_addition_concatenates() {
        let v = Expr::Function(FunctionHandle::test(p1()));
        let w = Expr::Function(FunctionHandle::coefficient(p1()));
        let product = ops::multiply(v, w).unwrap();
        let form1 =
            Form::from_expr(ops::scale(product.clone(), dx()).unwrap()).unwrap();
        let form2 = Form::from_expr(ops::scale(product, ds()).unwrap()).unwrap();
        let sum = form1 + form2;
        assert_eq!(sum.integrals().len(), 2);
    }
}
