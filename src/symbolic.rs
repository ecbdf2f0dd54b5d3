//! Symbolic expressions
//!
//! Test, trial and coefficient functions and the expression trees built
//! over them. All values are immutable once constructed; rewriting passes
//! (simplification, differentiation) produce new trees and leave their
//! input intact for diagnostics.

pub mod derivative;
pub mod expr;
pub mod function;
pub mod measure;
pub mod ops;
pub mod simplify;

pub use derivative::derivative;
pub use expr::Expr;
pub use function::{test_functions, trial_functions, unpack, FunctionHandle, FunctionRole};
pub use measure::{dx, Measure, MeasureType};
pub use simplify::simplify;

/// Errors raised while building or rewriting expressions
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SymbolicError {
    /// Operand ranks are incompatible for an operator
    #[error("rank mismatch in `{op}`: {detail} (in `{expr}`)")]
    RankMismatch {
        /// The operator being applied
        op: &'static str,
        /// Display form of the offending expression
        expr: String,
        /// What was expected of the operand ranks
        detail: String,
    },
    /// A bare expression was used where an integral-scoped term is required
    #[error("term `{term}` is not scoped by an integration measure")]
    UnmeasuredIntegrand {
        /// Display form of the unmeasured term
        term: String,
    },
    /// An integral-scoped expression was used as an operand
    #[error("integral-scoped expression `{expr}` cannot be an operand of `{op}`")]
    MisplacedIntegral {
        /// The operator being applied
        op: &'static str,
        /// Display form of the integral-scoped operand
        expr: String,
    },
    /// A directional derivative was requested with unusable arguments
    #[error("invalid derivative: {detail}")]
    InvalidDerivative {
        /// Why the derivative cannot be formed
        detail: String,
    },
}
