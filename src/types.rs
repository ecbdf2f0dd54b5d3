//! Types specific to formc

/// Scalar type for quadrature point and weight data.
pub trait RealScalar: num::Float {}

impl<T: num::Float> RealScalar for T {}

/// The type of a reference cell
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum ReferenceCellType {
    /// A point
    Point = 0,
    /// A line interval
    Interval = 1,
    /// A triangle
    Triangle = 2,
    /// A quadrilateral
    Quadrilateral = 3,
    /// A tetrahedron (whose faces are all triangles)
    Tetrahedron = 4,
    /// A hexahedron (whose faces are all quadrilaterals)
    Hexahedron = 5,
    /// A triangular prism
    Prism = 6,
    /// A square-based pyramid
    Pyramid = 7,
}

/// The continuity of the basis functions of an element across cell facets
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Continuity {
    /// The element's natural inter-cell continuity
    Standard,
    /// No inter-cell continuity
    Discontinuous,
}

/// An element family
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ElementFamily {
    /// Lagrange (nodal) elements
    Lagrange,
    /// Brezzi-Douglas-Marini H(div) elements
    BrezziDouglasMarini,
}

impl std::fmt::Display for ReferenceCellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReferenceCellType::Point => "point",
            ReferenceCellType::Interval => "interval",
            ReferenceCellType::Triangle => "triangle",
            ReferenceCellType::Quadrilateral => "quadrilateral",
            ReferenceCellType::Tetrahedron => "tetrahedron",
            ReferenceCellType::Hexahedron => "hexahedron",
            ReferenceCellType::Prism => "prism",
            ReferenceCellType::Pyramid => "pyramid",
        };
        write!(f, "{name}")
    }
}

impl std::fmt::Display for ElementFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementFamily::Lagrange => write!(f, "Lagrange"),
            ElementFamily::BrezziDouglasMarini => write!(f, "Brezzi-Douglas-Marini"),
        }
    }
}
