//! Quadrature degree estimation
//!
//! The degree bound of an integrand sums the bounds of all factors along
//! each product chain and takes the maximum over the branches of sums.
//! The same estimate is used for cell and facet integrals; what changes
//! for facet measures is the cell the rule is selected on.

use crate::element::reference_cell;
use crate::form::Integral;
use crate::symbolic::measure::MeasureType;
use crate::types::ReferenceCellType;

/// The polynomial degree a quadrature rule must integrate exactly for the
/// given integral
pub fn required_degree(integral: &Integral) -> usize {
    integral.integrand.degree_bound()
}

/// The reference cell the integral's quadrature rule is defined on
///
/// `None` when a facet integral is requested on a cell whose facets are
/// not all of one type.
pub fn integration_cell(
    cell: ReferenceCellType,
    measure_type: MeasureType,
) -> Option<ReferenceCellType> {
    match measure_type {
        MeasureType::Cell => Some(cell),
        MeasureType::ExteriorFacet | MeasureType::InteriorFacet => {
            reference_cell::facet_type(cell)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::{Element, ElementRegistry};
    use crate::form::Form;
    use crate::symbolic::expr::Expr;
    use crate::symbolic::function::FunctionHandle;
    use crate::symbolic::measure::{ds, dx};
    use crate::symbolic::ops;
    use crate::types::{Continuity, ElementFamily};
    use std::sync::Arc;

    fn bdm2() -> Arc<Element> {
        Arc::new(
            ElementRegistry::standard()
                .construct(
                    ElementFamily::BrezziDouglasMarini,
                    ReferenceCellType::Triangle,
                    2,
                    Continuity::Standard,
                )
                .unwrap()
                .into(),
        )
    }

    #[test]
    fn test_product_degrees_sum() {
        let v = Expr::Function(FunctionHandle::test(bdm2()));
        let u = Expr::Function(FunctionHandle::trial(bdm2()));
        let form = Form::from_expr(
            ops::scale(ops::dot(v, u).unwrap(), dx()).unwrap(),
        )
        .unwrap();
        assert_eq!(required_degree(&form.integrals()[0]), 4);
    }

    #[test]
    fn test_sum_degrees_max() {
        let v = Expr::Function(FunctionHandle::test(bdm2()));
        let u = Expr::Function(FunctionHandle::trial(bdm2()));
        let quartic = ops::dot(v.clone(), u.clone()).unwrap();
        let linear = ops::multiply(Expr::Constant(2.0), ops::div(u).unwrap()).unwrap();
        let form = Form::from_expr(
            ops::scale(ops::add(quartic, linear).unwrap(), dx()).unwrap(),
        )
        .unwrap();
        assert_eq!(required_degree(&form.integrals()[0]), 4);
    }

    #[test]
    fn test_facet_measures_integrate_on_facets() {
        assert_eq!(
            integration_cell(ReferenceCellType::Triangle, ds().measure_type),
            Some(ReferenceCellType::Interval)
        );
        assert_eq!(
            integration_cell(ReferenceCellType::Triangle, dx().measure_type),
            Some(ReferenceCellType::Triangle)
        );
        assert_eq!(
            integration_cell(ReferenceCellType::Prism, ds().measure_type),
            None
        );
    }
}
