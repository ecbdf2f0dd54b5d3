//! Code generation backend traits

use crate::codegen::LocalKernel;

/// A target language for emitted local kernels
pub trait KernelBackend {
    /// Identifier of the backend, used in manifests and diagnostics
    fn name(&self) -> &'static str;

    /// File extension of the emitted source
    fn file_extension(&self) -> &'static str;

    /// Emit the source of a single per-cell kernel
    fn emit_kernel(&self, kernel: &LocalKernel) -> String;
}
