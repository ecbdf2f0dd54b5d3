//! Element traits

use crate::types::ReferenceCellType;

/// A finite element
///
/// Implemented by scalar, vector and mixed elements. All quantities are
/// derived from the element's declared parameters at construction time and
/// never change afterwards.
pub trait ElementType {
    /// The reference cell the element is defined on
    fn cell_type(&self) -> ReferenceCellType;

    /// The polynomial degree of the element
    fn degree(&self) -> usize;

    /// The degree of the smallest complete polynomial space containing the
    /// element's basis
    ///
    /// Used as the per-factor degree bound when estimating the quadrature
    /// degree of an integrand.
    fn embedded_superdegree(&self) -> usize;

    /// The number of degrees of freedom (basis functions) of the element
    fn dof_count(&self) -> usize;

    /// The value shape of the element's basis functions
    fn value_shape(&self) -> Vec<usize>;

    /// The number of components of the element's basis functions
    fn value_size(&self) -> usize {
        self.value_shape().iter().product()
    }

    /// The tensor rank of the element's basis functions
    fn value_rank(&self) -> usize {
        self.value_shape().len()
    }
}
