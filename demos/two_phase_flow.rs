//! Pressure-driven two-phase flow through porous media, discretized with
//! a three-field mixed space: flux in BDM_1, pressure in DG_0 and
//! saturation in CG_1. The nonlinear residual is linearized with a
//! directional derivative and both forms are compiled.

use formc::compile::{
    compile_forms, CompileErrorKind, CompilerOptions, FormDeclaration,
};
use formc::element::{Element, ElementRegistry, MixedElement};
use formc::form::Form;
use formc::symbolic::expr::Expr;
use formc::symbolic::function::FunctionHandle;
use formc::symbolic::measure::{ds, dx};
use formc::symbolic::{derivative, ops, unpack};
use formc::types::{Continuity, ElementFamily, ReferenceCellType};
use std::sync::Arc;

fn declarations() -> Result<Vec<FormDeclaration>, CompileErrorKind> {
    let registry = ElementRegistry::standard();
    let cell = ReferenceCellType::Triangle;
    let bdm = registry.construct(
        ElementFamily::BrezziDouglasMarini,
        cell,
        1,
        Continuity::Standard,
    )?;
    let dg = registry.construct(ElementFamily::Lagrange, cell, 0, Continuity::Discontinuous)?;
    let cg = registry.construct(ElementFamily::Lagrange, cell, 1, Continuity::Standard)?;
    let space = Arc::new(Element::Mixed(MixedElement::compose(vec![
        bdm.into(),
        dg.into(),
        cg.clone().into(),
    ])?));

    let test = FunctionHandle::test(Arc::clone(&space));
    let state = FunctionHandle::coefficient(Arc::clone(&space));
    let state0 = FunctionHandle::coefficient(Arc::clone(&space)).with_argument_index(1);
    let direction = FunctionHandle::trial(Arc::clone(&space));
    let pbar =
        FunctionHandle::coefficient(Arc::new(cg.into())).with_argument_index(2);

    let (v, q, r) = {
        let slots = unpack(&test);
        (slots[0].clone(), slots[1].clone(), slots[2].clone())
    };
    let (u, p, s) = {
        let slots = unpack(&state);
        (slots[0].clone(), slots[1].clone(), slots[2].clone())
    };
    let s0 = unpack(&state0)[2].clone();
    let normal = Expr::FacetNormal { dim: 2 };
    let dt = Expr::Constant(0.01);

    // Midpoint saturation weighting the mobility
    let s_mid = ops::multiply(
        Expr::Constant(0.5),
        ops::add(Expr::Function(s0.clone()), Expr::Function(s.clone()))?,
    )?;

    // Pressure equation residual:
    //   dot(v, s_mid*u)*dx - div(v)*p*dx + dot(v, pbar*n)*ds(1) + ... + ds(4)
    let mut pressure = ops::sub(
        ops::scale(
            ops::dot(
                Expr::Function(v.clone()),
                ops::multiply(s_mid.clone(), Expr::Function(u.clone()))?,
            )?,
            dx(),
        )?,
        ops::scale(
            ops::multiply(ops::div(Expr::Function(v.clone()))?, Expr::Function(p))?,
            dx(),
        )?,
    )?;
    for boundary in 1..5 {
        pressure = ops::add(
            pressure,
            ops::scale(
                ops::dot(
                    Expr::Function(v.clone()),
                    ops::multiply(Expr::Function(pbar.clone()), normal.clone())?,
                )?,
                ds().on(boundary),
            )?,
        )?;
    }

    // Mass conservation: q*div(u)*dx
    let conservation = ops::scale(
        ops::multiply(Expr::Function(q), ops::div(Expr::Function(u.clone()))?)?,
        dx(),
    )?;

    // Saturation transport: r*(s - s0)*dx - dt*dot(grad(r), s_mid*u)*dx
    let transport = ops::sub(
        ops::scale(
            ops::multiply(
                Expr::Function(r.clone()),
                ops::sub(Expr::Function(s), Expr::Function(s0))?,
            )?,
            dx(),
        )?,
        ops::scale(
            ops::multiply(
                dt,
                ops::dot(
                    ops::grad(Expr::Function(r))?,
                    ops::multiply(s_mid, Expr::Function(u))?,
                )?,
            )?,
            dx(),
        )?,
    )?;

    let residual = Form::from_expr(pressure)?
        + Form::from_expr(conservation)?
        + Form::from_expr(transport)?;
    let jacobian = derivative(&residual, &state, &direction)?;

    Ok(vec![
        FormDeclaration::linear("L", residual),
        FormDeclaration::bilinear("a", jacobian),
    ])
}

fn main() {
    let declarations = match declarations() {
        Ok(declarations) => declarations,
        Err(error) => {
            eprintln!("failed to build forms: {error}");
            std::process::exit(1);
        }
    };
    let mut failed = false;
    for (name, result) in compile_forms(&declarations, &CompilerOptions::default()) {
        match result {
            Ok(compiled) => {
                println!("=== manifest of `{name}` ===");
                println!("{}", compiled.manifest.to_text());
                println!("=== source of `{name}` ===");
                println!("{}", compiled.source);
            }
            Err(error) => {
                eprintln!("{error}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}
