//! Batch compilation driver
//!
//! Compiles a set of named top-level form bindings. Forms are independent
//! immutable values, so sibling forms are compiled in parallel and one
//! failing form never aborts the others.

use std::collections::HashMap;

use log::{debug, info};
use rayon::prelude::*;

use crate::codegen::{CBackend, CodegenError, LocalKernel, Manifest, RustBackend};
use crate::element::ElementError;
use crate::form::analysis::{analyze, AnalysisError, FormMetadata};
use crate::form::Form;
use crate::quadrature::QuadratureError;
use crate::symbolic::SymbolicError;
use crate::traits::KernelBackend;
use crate::types::ReferenceCellType;

/// What went wrong while compiling one form
#[derive(thiserror::Error, Debug)]
pub enum CompileErrorKind {
    /// Element construction or composition failed
    #[error(transparent)]
    Element(#[from] ElementError),
    /// Expression building or rewriting failed
    #[error(transparent)]
    Symbolic(#[from] SymbolicError),
    /// Form classification failed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// Quadrature selection failed
    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
    /// Kernel generation failed
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// A compilation failure, tagged with the offending binding
#[derive(thiserror::Error, Debug)]
#[error("form `{binding}`: {kind}")]
pub struct CompileError {
    /// The top-level binding that failed
    pub binding: String,
    /// The failure
    pub kind: CompileErrorKind,
}

impl CompileError {
    fn new(binding: &str, kind: impl Into<CompileErrorKind>) -> Self {
        Self {
            binding: binding.to_string(),
            kind: kind.into(),
        }
    }
}

/// The emission target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Plain Rust functions over `f64` slices
    #[default]
    Rust,
    /// C functions over `double` arrays
    C,
}

impl Target {
    /// The backend implementing the target
    pub fn backend(&self) -> &'static dyn KernelBackend {
        match self {
            Target::Rust => &RustBackend,
            Target::C => &CBackend,
        }
    }
}

/// Options for a form compilation
pub struct CompilerOptions {
    /// Emission target
    pub target: Target,
    /// Forced quadrature degrees per integration cell, overriding the
    /// estimate derived from the form
    pub quadrature_degrees: HashMap<ReferenceCellType, usize>,
    /// Normalize integrands before generating kernels
    pub simplify: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            target: Target::Rust,
            quadrature_degrees: HashMap::new(),
            simplify: true,
        }
    }
}

impl CompilerOptions {
    /// Force the quadrature degree used on a cell type
    pub fn set_quadrature_degree(&mut self, cell: ReferenceCellType, degree: usize) {
        self.quadrature_degrees.insert(cell, degree);
    }
}

/// A named top-level form binding
pub struct FormDeclaration {
    /// The binding name (`a`, `L`, ...)
    pub name: String,
    /// The arity the binding requires: 2 for a bilinear binding, 1 for a
    /// linear binding, `None` for unconstrained bindings
    pub expected_arity: Option<usize>,
    /// The form bound to the name
    pub form: Form,
}

impl FormDeclaration {
    /// A binding that must hold a bilinear form
    pub fn bilinear(name: &str, form: Form) -> Self {
        Self {
            name: name.to_string(),
            expected_arity: Some(2),
            form,
        }
    }

    /// A binding that must hold a linear form
    pub fn linear(name: &str, form: Form) -> Self {
        Self {
            name: name.to_string(),
            expected_arity: Some(1),
            form,
        }
    }
}

/// The output of one successfully compiled form
#[derive(Debug)]
pub struct CompiledForm {
    /// The binding name
    pub name: String,
    /// The form's classification
    pub metadata: FormMetadata,
    /// The generated kernels, one per integral
    pub kernels: Vec<LocalKernel>,
    /// The manifest for the assembly runtime
    pub manifest: Manifest,
    /// The emitted kernel source
    pub source: String,
}

/// Compile a single form binding
pub fn compile_form(
    declaration: &FormDeclaration,
    options: &CompilerOptions,
) -> Result<CompiledForm, CompileError> {
    let name = declaration.name.as_str();
    debug!("analyzing form `{name}`");
    let metadata = analyze(&declaration.form).map_err(|e| CompileError::new(name, e))?;
    match declaration.expected_arity {
        Some(2) => metadata
            .expect_bilinear()
            .map_err(|e| CompileError::new(name, e))?,
        Some(1) => metadata
            .expect_linear()
            .map_err(|e| CompileError::new(name, e))?,
        _ => {}
    }

    let form = if options.simplify {
        declaration.form.simplify()
    } else {
        declaration.form.clone()
    };

    let kernels = crate::codegen::generate(name, &form, &metadata, options)
        .map_err(|e| CompileError::new(name, e))?;
    let backend = options.target.backend();
    let source = kernels
        .iter()
        .map(|kernel| backend.emit_kernel(kernel))
        .collect::<Vec<_>>()
        .join("\n");
    let manifest = Manifest::new(name, metadata.arity, backend.name(), &kernels);

    info!(
        "compiled form `{name}`: arity {}, {} kernel(s), quadrature degree {}",
        metadata.arity,
        kernels.len(),
        manifest.required_degree
    );
    Ok(CompiledForm {
        name: name.to_string(),
        metadata,
        kernels,
        manifest,
        source,
    })
}

/// Compile a batch of form bindings
///
/// Forms are compiled in parallel; each result is reported under its
/// binding name and failures leave sibling forms untouched.
pub fn compile_forms(
    declarations: &[FormDeclaration],
    options: &CompilerOptions,
) -> Vec<(String, Result<CompiledForm, CompileError>)> {
    declarations
        .par_iter()
        .map(|declaration| (declaration.name.clone(), compile_form(declaration, options)))
        .collect()
}
