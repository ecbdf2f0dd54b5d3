//! Compilation manifests
//!
//! A manifest accompanies the emitted kernel source and tells the
//! consuming assembly runtime everything it needs that is not visible in
//! the source: quadrature demands, dof layouts per space and the basis
//! tables to tabulate. Rendered as plain `key: value` text.

use itertools::Itertools;

use crate::codegen::kernel::{LocalKernel, SpaceDescriptor};

/// Manifest entry for one emitted kernel
#[derive(Debug, Clone)]
pub struct KernelManifest {
    /// The emitted symbol
    pub symbol: String,
    /// The measure the kernel integrates
    pub measure: String,
    /// The cell the quadrature rule is defined on
    pub integration_cell: String,
    /// The degree the rule is exact for
    pub quadrature_degree: usize,
    /// Points in the rule
    pub quadrature_points: usize,
    /// Basis tables the kernel reads, in parameter order
    pub tables: Vec<String>,
}

/// The manifest of one compiled form
#[derive(Debug, Clone)]
pub struct Manifest {
    /// The form's binding name
    pub form_name: String,
    /// The form's arity
    pub arity: usize,
    /// The backend that emitted the source
    pub backend: String,
    /// The largest quadrature degree any kernel requires
    pub required_degree: usize,
    /// Rendered dof layout, one entry per space and block
    pub layout: Vec<String>,
    /// Per-kernel entries
    pub kernels: Vec<KernelManifest>,
}

fn describe_space(space: &SpaceDescriptor, layout: &mut Vec<String>) {
    layout.push(format!(
        "space {} ({} argument {}): {} dofs, {} components, {}",
        space.name,
        space.role,
        space.argument_index,
        space.dof_count,
        space.value_size,
        space.description
    ));
    if space.blocks.len() > 1 {
        for block in &space.blocks {
            layout.push(format!(
                "block {}/{}: dofs [{}, {}), components [{}, {}), {}",
                space.name,
                block.slot,
                block.dof_offset,
                block.dof_offset + block.dof_count,
                block.component_offset,
                block.component_offset + block.value_size,
                block.description
            ));
        }
    }
}

impl Manifest {
    /// Build the manifest for a form's kernels
    pub fn new(form_name: &str, arity: usize, backend: &str, kernels: &[LocalKernel]) -> Self {
        let mut layout = vec![];
        if let Some(kernel) = kernels.first() {
            if let Some(space) = &kernel.test_space {
                describe_space(space, &mut layout);
            }
            if let Some(space) = &kernel.trial_space {
                describe_space(space, &mut layout);
            }
            for space in &kernel.coefficients {
                describe_space(space, &mut layout);
            }
        }
        Self {
            form_name: form_name.to_string(),
            arity,
            backend: backend.to_string(),
            required_degree: kernels
                .iter()
                .map(|kernel| kernel.required_degree)
                .max()
                .unwrap_or(0),
            layout,
            kernels: kernels
                .iter()
                .map(|kernel| KernelManifest {
                    symbol: kernel.name.clone(),
                    measure: kernel.measure.to_string(),
                    integration_cell: kernel.integration_cell.to_string(),
                    quadrature_degree: kernel.required_degree,
                    quadrature_points: kernel.rule.npoints,
                    tables: kernel
                        .tables
                        .iter()
                        .map(|table| table.array.clone())
                        .collect(),
                })
                .collect(),
        }
    }

    /// Render the manifest as plain text
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("form: {}", self.form_name),
            format!("arity: {}", self.arity),
            format!("backend: {}", self.backend),
            format!("quadrature degree: {}", self.required_degree),
        ];
        lines.extend(self.layout.iter().cloned());
        for kernel in &self.kernels {
            lines.push(format!(
                "kernel {}: measure {}, cell {}, degree {}, {} points, tables [{}]",
                kernel.symbol,
                kernel.measure,
                kernel.integration_cell,
                kernel.quadrature_degree,
                kernel.quadrature_points,
                kernel.tables.iter().join(", ")
            ));
        }
        lines.join("\n") + "\n"
    }
}
