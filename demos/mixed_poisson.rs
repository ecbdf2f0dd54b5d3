use formc::compile::{compile_forms, CompilerOptions, FormDeclaration};
use formc::element::{Element, ElementRegistry, MixedElement};
use formc::form::Form;
use formc::symbolic::expr::Expr;
use formc::symbolic::function::FunctionHandle;
use formc::symbolic::measure::dx;
use formc::symbolic::{ops, test_functions, trial_functions};
use formc::types::{Continuity, ElementFamily, ReferenceCellType};
use std::sync::Arc;

fn main() {
    // First-order mixed Poisson: flux in BDM_1, potential in DG_0
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
    let space = Arc::new(Element::Mixed(
        MixedElement::compose(vec![bdm.into(), dg.clone().into()]).unwrap(),
    ));

    let test = test_functions(Arc::clone(&space));
    let trial = trial_functions(Arc::clone(&space));
    let (tau, v) = (test[0].clone(), test[1].clone());
    let (sigma, u) = (trial[0].clone(), trial[1].clone());
    let f = FunctionHandle::coefficient(Arc::new(dg.into()));

    // a = (dot(sigma, tau) + div(tau)*u + div(sigma)*v)*dx
    let a = Form::from_expr(
        ops::scale(
            ops::add(
                ops::add(
                    ops::dot(Expr::Function(sigma.clone()), Expr::Function(tau.clone()))
                        .unwrap(),
                    ops::multiply(
                        ops::div(Expr::Function(tau)).unwrap(),
                        Expr::Function(u),
                    )
                    .unwrap(),
                )
                .unwrap(),
                ops::multiply(
                    ops::div(Expr::Function(sigma)).unwrap(),
                    Expr::Function(v.clone()),
                )
                .unwrap(),
            )
            .unwrap(),
            dx(),
        )
        .unwrap(),
    )
    .unwrap();

    // L = f*v*dx
    let l = Form::from_expr(
        ops::scale(
            ops::multiply(Expr::Function(f), Expr::Function(v)).unwrap(),
            dx(),
        )
        .unwrap(),
    )
    .unwrap();

    let declarations = vec![
        FormDeclaration::bilinear("a", a),
        FormDeclaration::linear("L", l),
    ];
    for (name, result) in compile_forms(&declarations, &CompilerOptions::default()) {
        match result {
            Ok(compiled) => {
                println!("=== manifest of `{name}` ===");
                println!("{}", compiled.manifest.to_text());
                println!("=== source of `{name}` ===");
                println!("{}", compiled.source);
            }
            Err(error) => println!("{error}"),
        }
    }
}
