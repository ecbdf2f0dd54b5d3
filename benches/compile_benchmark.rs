use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formc::compile::{compile_form, CompilerOptions, FormDeclaration};
use formc::element::{Element, ElementRegistry, MixedElement};
use formc::form::Form;
use formc::symbolic::expr::Expr;
use formc::symbolic::function::FunctionHandle;
use formc::symbolic::measure::dx;
use formc::symbolic::{ops, unpack};
use formc::types::{Continuity, ElementFamily, ReferenceCellType};
use std::sync::Arc;

fn mixed_poisson_form(degree: usize) -> Form {
    let registry = ElementRegistry::standard();
    let bdm = registry
        .construct(
            ElementFamily::BrezziDouglasMarini,
            ReferenceCellType::Triangle,
            degree,
            Continuity::Standard,
        )
        .unwrap();
    let dg = registry
        .construct(
            ElementFamily::Lagrange,
            ReferenceCellType::Triangle,
            degree - 1,
            Continuity::Discontinuous,
        )
        .unwrap();
    let space = Arc::new(Element::Mixed(
        MixedElement::compose(vec![bdm.into(), dg.into()]).unwrap(),
    ));

    let test = FunctionHandle::test(Arc::clone(&space));
    let trial = FunctionHandle::trial(Arc::clone(&space));
    let (tau, v) = {
        let slots = unpack(&test);
        (slots[0].clone(), slots[1].clone())
    };
    let (sigma, u) = {
        let slots = unpack(&trial);
        (slots[0].clone(), slots[1].clone())
    };

    let integrand = ops::add(
        ops::add(
            ops::dot(Expr::Function(sigma.clone()), Expr::Function(tau.clone())).unwrap(),
            ops::multiply(ops::div(Expr::Function(tau)).unwrap(), Expr::Function(u)).unwrap(),
        )
        .unwrap(),
        ops::multiply(ops::div(Expr::Function(sigma)).unwrap(), Expr::Function(v)).unwrap(),
    )
    .unwrap();
    Form::from_expr(ops::scale(integrand, dx()).unwrap()).unwrap()
}

pub fn compile_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for degree in 1..3 {
        let form = mixed_poisson_form(degree);
        let options = CompilerOptions::default();
        group.bench_function(
            format!("Compilation of mixed Poisson bilinear form, degree {degree}"),
            |b| {
                b.iter(|| {
                    black_box(
                        compile_form(
                            &FormDeclaration::bilinear("a", form.clone()),
                            &options,
                        )
                        .unwrap(),
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, compile_benchmark);
criterion_main!(benches);
