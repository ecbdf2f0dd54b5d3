//! Kernel generation
//!
//! One-shot translation of an analyzed form into per-cell local kernels:
//! a quadrature rule, the basis tables the runtime must tabulate, and the
//! loop nest accumulating the local tensor. Generation either completes
//! or fails; no kernel is ever emitted for a form that failed a stage.

pub mod backends;
pub mod kernel;
pub mod manifest;

pub use backends::{CBackend, RustBackend};
pub use kernel::{generate, BlockLayout, LocalKernel, SpaceDescriptor, TableKind, TableRequest};
pub use manifest::Manifest;

use crate::quadrature::QuadratureError;

/// Errors raised while generating kernels
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CodegenError {
    /// The expression has no lowering to kernel code
    #[error("cannot generate code for `{expr}`: {detail}")]
    UnsupportedExpression {
        /// Display form of the offending expression
        expr: String,
        /// Why no code can be generated
        detail: String,
    },
    /// No quadrature rule satisfies the form's degree demand
    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
}
