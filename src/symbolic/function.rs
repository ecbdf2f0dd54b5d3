//! Symbolic function handles
//!
//! A handle names a position in a form: a test function, a trial function
//! or a known coefficient over some element. Handles reference their
//! element through an [`Arc`] and never own it; unpacking a handle over a
//! mixed element produces sub-handles that keep a back-reference to the
//! parent element plus a slot index, with no new element storage.

use std::fmt;
use std::sync::Arc;

use crate::element::Element;
use crate::traits::ElementType;

/// The role a function plays in a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FunctionRole {
    /// A test function (first argument of a form)
    Test,
    /// A trial function (second argument of a form)
    Trial,
    /// A known coefficient
    Coefficient,
}

impl fmt::Display for FunctionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionRole::Test => write!(f, "test"),
            FunctionRole::Trial => write!(f, "trial"),
            FunctionRole::Coefficient => write!(f, "coefficient"),
        }
    }
}

/// A symbolic handle to a test, trial or coefficient function
#[derive(Debug, Clone)]
pub struct FunctionHandle {
    element: Arc<Element>,
    role: FunctionRole,
    argument_index: usize,
    slot: Option<usize>,
}

impl FunctionHandle {
    fn new(element: Arc<Element>, role: FunctionRole) -> Self {
        Self {
            element,
            role,
            argument_index: 0,
            slot: None,
        }
    }

    /// A test function over the given element
    pub fn test(element: Arc<Element>) -> Self {
        Self::new(element, FunctionRole::Test)
    }

    /// A trial function over the given element
    pub fn trial(element: Arc<Element>) -> Self {
        Self::new(element, FunctionRole::Trial)
    }

    /// A coefficient function over the given element
    pub fn coefficient(element: Arc<Element>) -> Self {
        Self::new(element, FunctionRole::Coefficient)
    }

    /// Disambiguate between several functions of the same role
    pub fn with_argument_index(mut self, argument_index: usize) -> Self {
        self.argument_index = argument_index;
        self
    }

    /// The element of the full function (the parent for slot handles)
    pub fn element(&self) -> &Arc<Element> {
        &self.element
    }

    /// The handle's role
    pub fn role(&self) -> FunctionRole {
        self.role
    }

    /// The argument index disambiguating functions of equal role
    pub fn argument_index(&self) -> usize {
        self.argument_index
    }

    /// The slot in the parent mixed element, if this is a sub-handle
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    /// The sub-handle for one slot of a handle over a mixed element
    pub(crate) fn slot_handle(&self, slot: usize) -> Self {
        debug_assert!(self.element.as_mixed().is_some());
        Self {
            element: Arc::clone(&self.element),
            role: self.role,
            argument_index: self.argument_index,
            slot: Some(slot),
        }
    }

    /// The element this handle evaluates in: the slot's sub-element for
    /// sub-handles, the full element otherwise
    pub fn terminal_element(&self) -> &Element {
        match (self.slot, self.element.as_ref()) {
            (Some(slot), Element::Mixed(mixed)) => mixed.sub_element(slot),
            (Some(_), _) => unreachable!("slot handle over a non-mixed element"),
            (None, element) => element,
        }
    }

    /// The first local dof of this handle's block in the parent layout
    pub fn dof_offset(&self) -> usize {
        match (self.slot, self.element.as_ref()) {
            (Some(slot), Element::Mixed(mixed)) => mixed.dof_offset(slot),
            _ => 0,
        }
    }

    /// The first component of this handle in the parent's stacked value
    pub fn component_offset(&self) -> usize {
        match (self.slot, self.element.as_ref()) {
            (Some(slot), Element::Mixed(mixed)) => mixed.component_offset(slot),
            _ => 0,
        }
    }

    /// The value shape of the handle
    pub fn value_shape(&self) -> Vec<usize> {
        self.terminal_element().value_shape()
    }

    /// True if two handles name the same underlying function argument
    ///
    /// Sub-handles of one unpacked function all name the same argument;
    /// the slot is deliberately ignored.
    pub fn same_function(&self, other: &Self) -> bool {
        self.role == other.role
            && self.argument_index == other.argument_index
            && Arc::ptr_eq(&self.element, &other.element)
    }
}

impl PartialEq for FunctionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_function(other) && self.slot == other.slot
    }
}

impl fmt::Display for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.role {
            FunctionRole::Test => "v",
            FunctionRole::Trial => "u",
            FunctionRole::Coefficient => "w",
        };
        write!(f, "{}_{}", prefix, self.argument_index)?;
        if let Some(slot) = self.slot {
            write!(f, "[{slot}]")?;
        }
        Ok(())
    }
}

/// Unpack a handle over a mixed element into one sub-handle per slot, in
/// declaration order
///
/// Each sub-handle carries a back-reference to the parent element and its
/// slot index. For a handle over a non-mixed element the handle itself is
/// returned, unchanged.
pub fn unpack(handle: &FunctionHandle) -> Vec<FunctionHandle> {
    match handle.element.as_mixed() {
        Some(mixed) => (0..mixed.len()).map(|i| handle.slot_handle(i)).collect(),
        None => vec![handle.clone()],
    }
}

/// A test function over the element, already unpacked into its slots
pub fn test_functions(element: Arc<Element>) -> Vec<FunctionHandle> {
    unpack(&FunctionHandle::test(element))
}

/// A trial function over the element, already unpacked into its slots
pub fn trial_functions(element: Arc<Element>) -> Vec<FunctionHandle> {
    unpack(&FunctionHandle::trial(element))
}
