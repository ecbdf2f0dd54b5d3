//! Finite element definitions
//!
//! Elements are immutable symbolic values: they carry the declared
//! parameters of a finite element space (family, cell, degree) together
//! with derived metadata (dof counts, value shapes, degree bounds), but no
//! tabulated basis data. Tabulation is the job of the runtime consuming
//! the generated kernels.

pub mod reference_cell;
pub mod registry;

pub use registry::ElementRegistry;

use crate::traits::ElementType;
use crate::types::{Continuity, ElementFamily, ReferenceCellType};

/// Errors arising when constructing elements
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ElementError {
    /// The (family, continuity, cell) combination is not registered
    #[error("no {family} element registered on a {cell}")]
    UnknownFamily {
        /// The requested family
        family: ElementFamily,
        /// The requested cell type
        cell: ReferenceCellType,
    },
    /// The degree is outside the registered range for the family
    #[error("{family} elements on a {cell} do not support degree {degree}")]
    UnsupportedDegree {
        /// The requested family
        family: ElementFamily,
        /// The requested cell type
        cell: ReferenceCellType,
        /// The requested degree
        degree: usize,
    },
    /// A mixed element was composed from zero sub-elements
    #[error("cannot compose a mixed element from zero sub-elements")]
    EmptyComposition,
    /// Sub-elements of a mixed element are defined on different cells
    #[error("cannot mix elements on a {expected} with elements on a {found}")]
    CellMismatch {
        /// Cell type of the first sub-element
        expected: ReferenceCellType,
        /// The mismatched cell type
        found: ReferenceCellType,
    },
}

/// A scalar- or vector-valued finite element from a registered family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiniteElement {
    family: ElementFamily,
    cell_type: ReferenceCellType,
    degree: usize,
    continuity: Continuity,
    dof_count: usize,
    embedded_superdegree: usize,
    value_shape: Vec<usize>,
}

impl FiniteElement {
    /// Create an element. Only the registry constructs elements, so that
    /// every element in existence is a registered combination.
    pub(crate) fn new(
        family: ElementFamily,
        cell_type: ReferenceCellType,
        degree: usize,
        continuity: Continuity,
        dof_count: usize,
        embedded_superdegree: usize,
        value_shape: Vec<usize>,
    ) -> Self {
        Self {
            family,
            cell_type,
            degree,
            continuity,
            dof_count,
            embedded_superdegree,
            value_shape,
        }
    }

    /// The element's family
    pub fn family(&self) -> ElementFamily {
        self.family
    }

    /// The element's inter-cell continuity
    pub fn continuity(&self) -> Continuity {
        self.continuity
    }
}

impl ElementType for FiniteElement {
    fn cell_type(&self) -> ReferenceCellType {
        self.cell_type
    }
    fn degree(&self) -> usize {
        self.degree
    }
    fn embedded_superdegree(&self) -> usize {
        self.embedded_superdegree
    }
    fn dof_count(&self) -> usize {
        self.dof_count
    }
    fn value_shape(&self) -> Vec<usize> {
        self.value_shape.clone()
    }
}

/// A vector-valued element made of `dim` copies of a scalar base element
///
/// The base element is owned by the wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorElement {
    base: FiniteElement,
    dim: usize,
}

impl VectorElement {
    /// Wrap a scalar element, replicating it once per topological dimension
    /// of its cell
    pub fn new(base: FiniteElement) -> Self {
        let dim = reference_cell::dim(base.cell_type());
        Self { base, dim }
    }

    /// Wrap a scalar element, replicating it `dim` times
    pub fn with_dim(base: FiniteElement, dim: usize) -> Self {
        Self { base, dim }
    }

    /// The scalar element being replicated
    pub fn base(&self) -> &FiniteElement {
        &self.base
    }

    /// The number of copies of the base element
    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl ElementType for VectorElement {
    fn cell_type(&self) -> ReferenceCellType {
        self.base.cell_type()
    }
    fn degree(&self) -> usize {
        self.base.degree()
    }
    fn embedded_superdegree(&self) -> usize {
        self.base.embedded_superdegree()
    }
    fn dof_count(&self) -> usize {
        self.dim * self.base.dof_count()
    }
    fn value_shape(&self) -> Vec<usize> {
        // Replicating a vector-valued base is not supported, so the shape
        // is always a single axis.
        debug_assert!(self.base.value_rank() == 0);
        vec![self.dim]
    }
}

/// An ordered composition of sub-elements with a block-structured dof layout
///
/// Sub-element order is fixed at construction and determines the slot index
/// of each unpacked function, the dof offset of each block and the component
/// offset of each slot in the stacked value vector.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedElement {
    sub_elements: Vec<Element>,
    dof_offsets: Vec<usize>,
    component_offsets: Vec<usize>,
}

impl MixedElement {
    /// Compose a mixed element from an ordered sequence of sub-elements
    pub fn compose(sub_elements: Vec<Element>) -> Result<Self, ElementError> {
        let Some(first) = sub_elements.first() else {
            return Err(ElementError::EmptyComposition);
        };
        let cell = first.cell_type();
        for e in &sub_elements {
            if e.cell_type() != cell {
                return Err(ElementError::CellMismatch {
                    expected: cell,
                    found: e.cell_type(),
                });
            }
        }
        let mut dof_offsets = Vec::with_capacity(sub_elements.len());
        let mut component_offsets = Vec::with_capacity(sub_elements.len());
        let mut dofs = 0;
        let mut components = 0;
        for e in &sub_elements {
            dof_offsets.push(dofs);
            component_offsets.push(components);
            dofs += e.dof_count();
            components += e.value_size();
        }
        Ok(Self {
            sub_elements,
            dof_offsets,
            component_offsets,
        })
    }

    /// The number of sub-elements
    pub fn len(&self) -> usize {
        self.sub_elements.len()
    }

    /// True if the composition has no sub-elements. Unreachable for
    /// elements built via [`MixedElement::compose`].
    pub fn is_empty(&self) -> bool {
        self.sub_elements.is_empty()
    }

    /// The sub-element in the given slot
    pub fn sub_element(&self, slot: usize) -> &Element {
        &self.sub_elements[slot]
    }

    /// The sub-elements in declaration order
    pub fn sub_elements(&self) -> &[Element] {
        &self.sub_elements
    }

    /// The first local dof index of the given slot's block
    pub fn dof_offset(&self, slot: usize) -> usize {
        self.dof_offsets[slot]
    }

    /// The first component of the given slot in the stacked value vector
    pub fn component_offset(&self, slot: usize) -> usize {
        self.component_offsets[slot]
    }
}

impl ElementType for MixedElement {
    fn cell_type(&self) -> ReferenceCellType {
        self.sub_elements[0].cell_type()
    }
    fn degree(&self) -> usize {
        self.sub_elements.iter().map(|e| e.degree()).max().unwrap()
    }
    fn embedded_superdegree(&self) -> usize {
        self.sub_elements
            .iter()
            .map(|e| e.embedded_superdegree())
            .max()
            .unwrap()
    }
    fn dof_count(&self) -> usize {
        self.sub_elements.iter().map(|e| e.dof_count()).sum()
    }
    fn value_shape(&self) -> Vec<usize> {
        vec![self.sub_elements.iter().map(|e| e.value_size()).sum()]
    }
}

/// Any element usable in a function space declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A scalar- or vector-valued element from a registered family
    Scalar(FiniteElement),
    /// A replicated scalar element
    Vector(VectorElement),
    /// A block composition of elements
    Mixed(MixedElement),
}

impl Element {
    /// The mixed element, if this is one
    pub fn as_mixed(&self) -> Option<&MixedElement> {
        match self {
            Element::Mixed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FiniteElement> for Element {
    fn from(e: FiniteElement) -> Self {
        Element::Scalar(e)
    }
}

impl From<VectorElement> for Element {
    fn from(e: VectorElement) -> Self {
        Element::Vector(e)
    }
}

impl From<MixedElement> for Element {
    fn from(e: MixedElement) -> Self {
        Element::Mixed(e)
    }
}

impl ElementType for Element {
    fn cell_type(&self) -> ReferenceCellType {
        match self {
            Element::Scalar(e) => e.cell_type(),
            Element::Vector(e) => e.cell_type(),
            Element::Mixed(e) => e.cell_type(),
        }
    }
    fn degree(&self) -> usize {
        match self {
            Element::Scalar(e) => e.degree(),
            Element::Vector(e) => e.degree(),
            Element::Mixed(e) => e.degree(),
        }
    }
    fn embedded_superdegree(&self) -> usize {
        match self {
            Element::Scalar(e) => e.embedded_superdegree(),
            Element::Vector(e) => e.embedded_superdegree(),
            Element::Mixed(e) => e.embedded_superdegree(),
        }
    }
    fn dof_count(&self) -> usize {
        match self {
            Element::Scalar(e) => e.dof_count(),
            Element::Vector(e) => e.dof_count(),
            Element::Mixed(e) => e.dof_count(),
        }
    }
    fn value_shape(&self) -> Vec<usize> {
        match self {
            Element::Scalar(e) => e.value_shape(),
            Element::Vector(e) => e.value_shape(),
            Element::Mixed(e) => e.value_shape(),
        }
    }
}

impl std::fmt::Display for FiniteElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} degree {} on a {}", self.family, self.degree, self.cell_type)?;
        if self.continuity == Continuity::Discontinuous {
            write!(f, " (discontinuous)")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for VectorElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vector of {} x ({})", self.dim, self.base)
    }
}

impl std::fmt::Display for MixedElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mixed(")?;
        for (slot, element) in self.sub_elements.iter().enumerate() {
            if slot > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{element}")?;
        }
        write!(f, ")")
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Scalar(e) => write!(f, "{e}"),
            Element::Vector(e) => write!(f, "{e}"),
            Element::Mixed(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Continuity, ElementFamily, ReferenceCellType};

    fn bdm2() -> FiniteElement {
        ElementRegistry::standard()
            .construct(
                ElementFamily::BrezziDouglasMarini,
                ReferenceCellType::Triangle,
                2,
                Continuity::Standard,
            )
            .unwrap()
    }

    fn dg1() -> FiniteElement {
        ElementRegistry::standard()
            .construct(
                ElementFamily::Lagrange,
                ReferenceCellType::Triangle,
                1,
                Continuity::Discontinuous,
            )
            .unwrap()
    }

    #[test]
    fn test_compose_offsets() {
        let mixed =
            MixedElement::compose(vec![bdm2().into(), dg1().into()]).unwrap();
        assert_eq!(mixed.len(), 2);
        assert_eq!(mixed.dof_offset(0), 0);
        assert_eq!(mixed.dof_offset(1), bdm2().dof_count());
        assert_eq!(mixed.dof_offset(1), 9);
        assert_eq!(mixed.dof_count(), 12);
        assert_eq!(mixed.component_offset(0), 0);
        assert_eq!(mixed.component_offset(1), 2);
        assert_eq!(mixed.value_size(), 3);
    }

    #[test]
    fn test_compose_empty() {
        assert_eq!(
            MixedElement::compose(vec![]).unwrap_err(),
            ElementError::EmptyComposition
        );
    }

    #[test]
    fn test_compose_cell_mismatch() {
        let registry = ElementRegistry::standard();
        let p1_interval = registry
            .construct(
                ElementFamily::Lagrange,
                ReferenceCellType::Interval,
                1,
                Continuity::Standard,
            )
            .unwrap();
        let err =
            MixedElement::compose(vec![bdm2().into(), p1_interval.into()]).unwrap_err();
        assert_eq!(
            err,
            ElementError::CellMismatch {
                expected: ReferenceCellType::Triangle,
                found: ReferenceCellType::Interval,
            }
        );
    }

    #[test]
    fn test_vector_element_default_dim() {
        let v = VectorElement::new(dg1());
        assert_eq!(v.dim(), 2);
        assert_eq!(v.dof_count(), 6);
        assert_eq!(v.value_shape(), vec![2]);
    }
}
