//! Kernel emission backends
//!
//! Emitted kernels share one calling convention regardless of target
//! language: the caller zero-initializes the local tensor `a`, passes the
//! quadrature weights `qw`, the geometry scale factors `detj` (one per
//! quadrature point; the facet Jacobian norm for facet kernels), the
//! facet normal `n` where used, and the flat basis tables named by the
//! kernel's table requests.

use itertools::Itertools;

use crate::codegen::kernel::LocalKernel;
use crate::traits::KernelBackend;

fn loop_dims(kernel: &LocalKernel) -> (Option<usize>, Option<usize>) {
    (
        kernel.test_space.as_ref().map(|space| space.dof_count),
        kernel.trial_space.as_ref().map(|space| space.dof_count),
    )
}

/// Accumulation statement for the kernel's arity
fn accumulate(kernel: &LocalKernel) -> String {
    let (test, trial) = loop_dims(kernel);
    let target = match (test, trial) {
        (Some(_), Some(nd_trial)) => format!("a[i * {nd_trial} + j]"),
        (Some(_), None) => "a[i]".to_string(),
        _ => "a[0]".to_string(),
    };
    format!(
        "{target} += qw[q] * detj[q] * {};",
        kernel.integrand_code
    )
}

/// Emits kernels as plain Rust functions over flat `f64` slices
pub struct RustBackend;

impl KernelBackend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn file_extension(&self) -> &'static str {
        "rs"
    }

    fn emit_kernel(&self, kernel: &LocalKernel) -> String {
        let mut params = vec![
            "a: &mut [f64]".to_string(),
            "qw: &[f64]".to_string(),
            "detj: &[f64]".to_string(),
        ];
        if kernel.uses_facet_normal {
            params.push("n: &[f64]".to_string());
        }
        for table in &kernel.tables {
            params.push(format!("{}: &[f64]", table.array));
        }

        let mut out = String::new();
        out.push_str(&format!(
            "/// {} integral {} on a {}, exact to degree {}.\n",
            kernel.measure, kernel.name, kernel.integration_cell, kernel.rule.order
        ));
        out.push_str("/// The caller zero-initializes `a`.\n");
        out.push_str(&format!(
            "pub fn {}({}) {{\n",
            kernel.name,
            params.iter().join(", ")
        ));

        let (test, trial) = loop_dims(kernel);
        let statement = accumulate(kernel);
        out.push_str(&format!("    for q in 0..{} {{\n", kernel.rule.npoints));
        match (test, trial) {
            (Some(nd_test), Some(nd_trial)) => {
                out.push_str(&format!("        for i in 0..{nd_test} {{\n"));
                out.push_str(&format!("            for j in 0..{nd_trial} {{\n"));
                out.push_str(&format!("                {statement}\n"));
                out.push_str("            }\n");
                out.push_str("        }\n");
            }
            (Some(nd_test), None) => {
                out.push_str(&format!("        for i in 0..{nd_test} {{\n"));
                out.push_str(&format!("            {statement}\n"));
                out.push_str("        }\n");
            }
            _ => {
                out.push_str(&format!("        {statement}\n"));
            }
        }
        out.push_str("    }\n");
        out.push_str("}\n");
        out
    }
}

/// Emits kernels as C functions over flat `double` arrays
pub struct CBackend;

impl KernelBackend for CBackend {
    fn name(&self) -> &'static str {
        "c"
    }

    fn file_extension(&self) -> &'static str {
        "c"
    }

    fn emit_kernel(&self, kernel: &LocalKernel) -> String {
        let mut params = vec![
            "double* restrict a".to_string(),
            "const double* qw".to_string(),
            "const double* detj".to_string(),
        ];
        if kernel.uses_facet_normal {
            params.push("const double* n".to_string());
        }
        for table in &kernel.tables {
            params.push(format!("const double* {}", table.array));
        }

        let mut out = String::new();
        out.push_str(&format!(
            "/* {} integral {} on a {}, exact to degree {}. */\n",
            kernel.measure, kernel.name, kernel.integration_cell, kernel.rule.order
        ));
        out.push_str("/* The caller zero-initializes a. */\n");
        out.push_str(&format!(
            "void {}({})\n{{\n",
            kernel.name,
            params.iter().join(", ")
        ));

        let (test, trial) = loop_dims(kernel);
        let statement = accumulate(kernel);
        out.push_str(&format!(
            "    for (int q = 0; q < {}; ++q) {{\n",
            kernel.rule.npoints
        ));
        match (test, trial) {
            (Some(nd_test), Some(nd_trial)) => {
                out.push_str(&format!(
                    "        for (int i = 0; i < {nd_test}; ++i) {{\n"
                ));
                out.push_str(&format!(
                    "            for (int j = 0; j < {nd_trial}; ++j) {{\n"
                ));
                out.push_str(&format!("                {statement}\n"));
                out.push_str("            }\n");
                out.push_str("        }\n");
            }
            (Some(nd_test), None) => {
                out.push_str(&format!(
                    "        for (int i = 0; i < {nd_test}; ++i) {{\n"
                ));
                out.push_str(&format!("            {statement}\n"));
                out.push_str("        }\n");
            }
            _ => {
                out.push_str(&format!("        {statement}\n"));
            }
        }
        out.push_str("    }\n");
        out.push_str("}\n");
        out
    }
}
