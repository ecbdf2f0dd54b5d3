//! The element family registry
//!
//! The registry is an explicit value, populated once and read-only
//! afterwards. Every element is constructed through it, so a constructed
//! element is always a registered (family, cell, degree) combination.

use log::debug;

use crate::element::{reference_cell, ElementError, FiniteElement, VectorElement};
use crate::types::{Continuity, ElementFamily, ReferenceCellType};

/// Closed-form dof count of an element family on a cell
pub type DofRule = fn(ReferenceCellType, usize) -> usize;

/// Value shape of an element family on a cell
pub type ValueShapeRule = fn(ReferenceCellType) -> Vec<usize>;

/// A registered element family
pub struct FamilySpec {
    /// The family
    pub family: ElementFamily,
    /// The continuity this entry covers
    pub continuity: Continuity,
    /// The cells the family is defined on
    pub allowed_cells: Vec<ReferenceCellType>,
    /// The smallest supported degree
    pub min_degree: usize,
    /// The largest supported degree, unbounded if `None`
    pub max_degree: Option<usize>,
    /// Closed-form dof count
    pub dof_rule: DofRule,
    /// Value shape of the family's basis functions
    pub value_shape: ValueShapeRule,
}

/// Catalog of element families
pub struct ElementRegistry {
    families: Vec<FamilySpec>,
}

impl ElementRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { families: vec![] }
    }

    /// Create a registry preloaded with the standard families
    ///
    /// Continuous Lagrange (degree >= 1) and discontinuous Lagrange
    /// (degree >= 0) on intervals, triangles and tetrahedra, and
    /// Brezzi-Douglas-Marini (degree >= 1) on triangles and tetrahedra.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(FamilySpec {
            family: ElementFamily::Lagrange,
            continuity: Continuity::Standard,
            allowed_cells: vec![
                ReferenceCellType::Interval,
                ReferenceCellType::Triangle,
                ReferenceCellType::Tetrahedron,
            ],
            min_degree: 1,
            max_degree: None,
            dof_rule: lagrange_dof_count,
            value_shape: scalar_value_shape,
        });
        registry.register(FamilySpec {
            family: ElementFamily::Lagrange,
            continuity: Continuity::Discontinuous,
            allowed_cells: vec![
                ReferenceCellType::Interval,
                ReferenceCellType::Triangle,
                ReferenceCellType::Tetrahedron,
            ],
            min_degree: 0,
            max_degree: None,
            dof_rule: lagrange_dof_count,
            value_shape: scalar_value_shape,
        });
        registry.register(FamilySpec {
            family: ElementFamily::BrezziDouglasMarini,
            continuity: Continuity::Standard,
            allowed_cells: vec![ReferenceCellType::Triangle, ReferenceCellType::Tetrahedron],
            min_degree: 1,
            max_degree: None,
            dof_rule: bdm_dof_count,
            value_shape: vector_value_shape,
        });
        registry
    }

    /// Register a family
    pub fn register(&mut self, spec: FamilySpec) {
        debug!(
            "registering {} ({:?}) elements on {} cell types",
            spec.family,
            spec.continuity,
            spec.allowed_cells.len()
        );
        self.families.push(spec);
    }

    fn lookup(
        &self,
        family: ElementFamily,
        cell: ReferenceCellType,
        continuity: Continuity,
    ) -> Result<&FamilySpec, ElementError> {
        self.families
            .iter()
            .find(|spec| {
                spec.family == family
                    && spec.continuity == continuity
                    && spec.allowed_cells.contains(&cell)
            })
            .ok_or(ElementError::UnknownFamily { family, cell })
    }

    /// Construct an element of a registered family
    pub fn construct(
        &self,
        family: ElementFamily,
        cell: ReferenceCellType,
        degree: usize,
        continuity: Continuity,
    ) -> Result<FiniteElement, ElementError> {
        let spec = self.lookup(family, cell, continuity)?;
        if degree < spec.min_degree || spec.max_degree.is_some_and(|max| degree > max) {
            return Err(ElementError::UnsupportedDegree {
                family,
                cell,
                degree,
            });
        }
        Ok(FiniteElement::new(
            family,
            cell,
            degree,
            continuity,
            (spec.dof_rule)(cell, degree),
            degree,
            (spec.value_shape)(cell),
        ))
    }

    /// Construct a vector element replicating a registered scalar family
    /// over the cell's topological dimension
    pub fn construct_vector(
        &self,
        family: ElementFamily,
        cell: ReferenceCellType,
        degree: usize,
        continuity: Continuity,
    ) -> Result<VectorElement, ElementError> {
        Ok(VectorElement::new(self.construct(
            family, cell, degree, continuity,
        )?))
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn scalar_value_shape(_cell: ReferenceCellType) -> Vec<usize> {
    vec![]
}

fn vector_value_shape(cell: ReferenceCellType) -> Vec<usize> {
    vec![reference_cell::dim(cell)]
}

/// Dofs of a degree k Lagrange space: the dimension of the complete
/// polynomial space of degree k on the cell
fn lagrange_dof_count(cell: ReferenceCellType, degree: usize) -> usize {
    let k = degree;
    match cell {
        ReferenceCellType::Interval => k + 1,
        ReferenceCellType::Triangle => (k + 1) * (k + 2) / 2,
        ReferenceCellType::Tetrahedron => (k + 1) * (k + 2) * (k + 3) / 6,
        _ => unreachable!("family not registered on {cell}"),
    }
}

/// Dofs of a degree k Brezzi-Douglas-Marini space: k + 1 normal-component
/// moments per facet
fn bdm_dof_count(cell: ReferenceCellType, degree: usize) -> usize {
    let k = degree;
    match cell {
        ReferenceCellType::Triangle => 3 * (k + 1),
        ReferenceCellType::Tetrahedron => 4 * (k + 1) * (k + 2) / 2,
        _ => unreachable!("family not registered on {cell}"),
    }
}
