//! Form analysis
//!
//! Classifies a form by walking its expression trees and collecting the
//! distinct test/trial arguments it references. The walk never mutates
//! the form.

use itertools::Itertools;

use crate::form::Form;
use crate::symbolic::function::{FunctionHandle, FunctionRole};

/// Errors raised while classifying a form
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    /// Two distinct functions claim the same argument slot
    #[error(
        "argument conflict: `{first}` and `{second}` both claim {role} argument {index} \
         but are over different spaces"
    )]
    ArityConflict {
        /// The contested role
        role: FunctionRole,
        /// The contested argument index
        index: usize,
        /// Display form of the first claimant
        first: String,
        /// Display form of the second claimant
        second: String,
    },
    /// A binding expecting a bilinear form was given a form of another arity
    #[error("expected a bilinear form (one test and one trial argument), found arity {arity}")]
    NonBilinearForm {
        /// The arity found
        arity: usize,
    },
    /// A binding expecting a linear form was given a form of another arity
    #[error("expected a linear form (one test argument, no trial argument), found arity {arity}")]
    NonLinearForm {
        /// The arity found
        arity: usize,
    },
}

/// One distinct test or trial argument of a form
#[derive(Debug, Clone)]
pub struct ArgumentSlot {
    /// The argument's role
    pub role: FunctionRole,
    /// The argument's index
    pub index: usize,
    /// A handle naming the argument (slot information stripped)
    pub handle: FunctionHandle,
}

/// The classification of a form
#[derive(Debug, Clone)]
pub struct FormMetadata {
    /// Number of distinct test/trial argument slots
    pub arity: usize,
    /// The distinct test/trial arguments, tests first, then by index
    pub argument_slots: Vec<ArgumentSlot>,
    /// The distinct coefficients, by index
    pub coefficient_slots: Vec<FunctionHandle>,
}

impl FormMetadata {
    /// The test argument, if the form has exactly one
    pub fn test_argument(&self) -> Option<&ArgumentSlot> {
        self.arguments_of(FunctionRole::Test).into_iter().exactly_one().ok()
    }

    /// The trial argument, if the form has exactly one
    pub fn trial_argument(&self) -> Option<&ArgumentSlot> {
        self.arguments_of(FunctionRole::Trial).into_iter().exactly_one().ok()
    }

    fn arguments_of(&self, role: FunctionRole) -> Vec<&ArgumentSlot> {
        self.argument_slots
            .iter()
            .filter(|slot| slot.role == role)
            .collect()
    }

    /// Check that the form is bilinear: exactly one test and one trial
    /// argument
    pub fn expect_bilinear(&self) -> Result<(), AnalysisError> {
        if self.arguments_of(FunctionRole::Test).len() == 1
            && self.arguments_of(FunctionRole::Trial).len() == 1
        {
            Ok(())
        } else {
            Err(AnalysisError::NonBilinearForm { arity: self.arity })
        }
    }

    /// Check that the form is linear: exactly one test argument and no
    /// trial argument
    pub fn expect_linear(&self) -> Result<(), AnalysisError> {
        if self.arguments_of(FunctionRole::Test).len() == 1
            && self.arguments_of(FunctionRole::Trial).is_empty()
        {
            Ok(())
        } else {
            Err(AnalysisError::NonLinearForm { arity: self.arity })
        }
    }
}

/// Classify a form
pub fn analyze(form: &Form) -> Result<FormMetadata, AnalysisError> {
    let mut arguments: Vec<FunctionHandle> = vec![];
    let mut coefficients: Vec<FunctionHandle> = vec![];
    let mut conflict = None;

    for integral in form.integrals() {
        integral.integrand.for_each_function(&mut |handle| {
            if conflict.is_some() {
                return;
            }
            let seen = match handle.role() {
                FunctionRole::Coefficient => &mut coefficients,
                _ => &mut arguments,
            };
            match seen.iter().find(|known| {
                known.role() == handle.role()
                    && known.argument_index() == handle.argument_index()
            }) {
                None => seen.push(handle.clone()),
                Some(known) if known.same_function(handle) => {}
                Some(known) => {
                    conflict = Some(AnalysisError::ArityConflict {
                        role: handle.role(),
                        index: handle.argument_index(),
                        first: known.to_string(),
                        second: handle.to_string(),
                    });
                }
            }
        });
    }
    if let Some(conflict) = conflict {
        return Err(conflict);
    }

    let argument_slots: Vec<ArgumentSlot> = arguments
        .into_iter()
        .map(|handle| ArgumentSlot {
            role: handle.role(),
            index: handle.argument_index(),
            handle,
        })
        .sorted_by_key(|slot| (slot.role, slot.index))
        .collect();
    let coefficient_slots: Vec<FunctionHandle> = coefficients
        .into_iter()
        .sorted_by_key(|handle| handle.argument_index())
        .collect();

    Ok(FormMetadata {
        arity: argument_slots.len(),
        argument_slots,
        coefficient_slots,
    })
}
