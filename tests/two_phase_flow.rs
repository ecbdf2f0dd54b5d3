//! Linearization of a two-phase porous flow residual
//!
//! A three-field mixed space (flux, pressure, saturation) with a residual
//! that is nonlinear in the saturation coefficient. The Jacobian form is
//! obtained by directional differentiation with respect to the packed
//! coefficient, and must come out bilinear.

use std::sync::Arc;

use formc::compile::{compile_form, CompilerOptions, FormDeclaration};
use formc::element::{Element, ElementRegistry, MixedElement};
use formc::form::analysis::analyze;
use formc::form::Form;
use formc::symbolic::expr::Expr;
use formc::symbolic::function::FunctionHandle;
use formc::symbolic::measure::{ds, dx};
use formc::symbolic::{derivative, ops, unpack};
use formc::types::{Continuity, ElementFamily, ReferenceCellType};

fn mixed_space() -> Arc<Element> {
    let registry = ElementRegistry::standard();
    let bdm = registry
        .construct(
            ElementFamily::BrezziDouglasMarini,
            ReferenceCellType::Triangle,
            1,
            Continuity::Standard,
        )
        .unwrap();
    let dg = registry
        .construct(
            ElementFamily::Lagrange,
            ReferenceCellType::Triangle,
            0,
            Continuity::Discontinuous,
        )
        .unwrap();
    let cg = registry
        .construct(
            ElementFamily::Lagrange,
            ReferenceCellType::Triangle,
            1,
            Continuity::Standard,
        )
        .unwrap();
    Arc::new(Element::Mixed(
        MixedElement::compose(vec![bdm.into(), dg.into(), cg.into()]).unwrap(),
    ))
}

/// The residual of the pressure equation, nonlinear in the saturation:
///
///   dot(v, s*u)*dx - div(v)*p*dx + dot(v, pbar*n)*ds(1)
fn residual(space: &Arc<Element>, pbar: &FunctionHandle) -> Form {
    let test = FunctionHandle::test(Arc::clone(space));
    let state = FunctionHandle::coefficient(Arc::clone(space));
    let (v, _q, _r) = {
        let slots = unpack(&test);
        (slots[0].clone(), slots[1].clone(), slots[2].clone())
    };
    let (u, p, s) = {
        let slots = unpack(&state);
        (slots[0].clone(), slots[1].clone(), slots[2].clone())
    };

    let mobility_term = ops::scale(
        ops::dot(
            Expr::Function(v.clone()),
            ops::multiply(Expr::Function(s), Expr::Function(u)).unwrap(),
        )
        .unwrap(),
        dx(),
    )
    .unwrap();
    let pressure_term = ops::scale(
        ops::multiply(
            ops::div(Expr::Function(v.clone())).unwrap(),
            Expr::Function(p),
        )
        .unwrap(),
        dx(),
    )
    .unwrap();
    let boundary_term = ops::scale(
        ops::dot(
            Expr::Function(v),
            ops::multiply(
                Expr::Function(pbar.clone()),
                Expr::FacetNormal { dim: 2 },
            )
            .unwrap(),
        )
        .unwrap(),
        ds().on(1),
    )
    .unwrap();

    Form::from_expr(
        ops::add(
            ops::sub(mobility_term, pressure_term).unwrap(),
            boundary_term,
        )
        .unwrap(),
    )
    .unwrap()
}

#[test]
fn test_residual_is_linear_in_test_argument() {
    let space = mixed_space();
    let registry = ElementRegistry::standard();
    let pbar = FunctionHandle::coefficient(Arc::new(
        registry
            .construct(
                ElementFamily::Lagrange,
                ReferenceCellType::Triangle,
                1,
                Continuity::Standard,
            )
            .unwrap()
            .into(),
    ))
    .with_argument_index(1);
    let form = residual(&space, &pbar);
    let metadata = analyze(&form).unwrap();
    assert_eq!(metadata.arity, 1);
    assert_eq!(metadata.coefficient_slots.len(), 2);
}

#[test]
fn test_jacobian_is_bilinear() {
    let space = mixed_space();
    let registry = ElementRegistry::standard();
    let pbar = FunctionHandle::coefficient(Arc::new(
        registry
            .construct(
                ElementFamily::Lagrange,
                ReferenceCellType::Triangle,
                1,
                Continuity::Standard,
            )
            .unwrap()
            .into(),
    ))
    .with_argument_index(1);
    // Handles name arguments by (role, index, space object), so a fresh
    // handle over the same space names the same coefficient.
    let state = FunctionHandle::coefficient(Arc::clone(&space));
    let direction = FunctionHandle::trial(Arc::clone(&space));

    let form = residual(&space, &pbar);
    let jacobian = derivative(&form, &state, &direction).unwrap();
    let metadata = analyze(&jacobian).unwrap();
    assert_eq!(metadata.arity, 2);

    // The boundary term does not reference the state, so it vanishes
    assert_eq!(jacobian.integrals().len(), 2);

    let compiled = compile_form(
        &FormDeclaration::bilinear("a", jacobian),
        &CompilerOptions::default(),
    )
    .unwrap();
    assert_eq!(compiled.kernels.len(), 2);
}
