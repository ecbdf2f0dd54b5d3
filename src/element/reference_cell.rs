//! Cell definitions

use crate::types::ReferenceCellType;

/// The topological dimension of the cell
pub fn dim(cell: ReferenceCellType) -> usize {
    match cell {
        ReferenceCellType::Point => 0,
        ReferenceCellType::Interval => 1,
        ReferenceCellType::Triangle => 2,
        ReferenceCellType::Quadrilateral => 2,
        ReferenceCellType::Tetrahedron => 3,
        ReferenceCellType::Hexahedron => 3,
        ReferenceCellType::Prism => 3,
        ReferenceCellType::Pyramid => 3,
    }
}

/// Is the cell a simplex?
pub fn is_simplex(cell: ReferenceCellType) -> bool {
    match cell {
        ReferenceCellType::Point => true,
        ReferenceCellType::Interval => true,
        ReferenceCellType::Triangle => true,
        ReferenceCellType::Quadrilateral => false,
        ReferenceCellType::Tetrahedron => true,
        ReferenceCellType::Hexahedron => false,
        ReferenceCellType::Prism => false,
        ReferenceCellType::Pyramid => false,
    }
}

/// The number of entities of each dimension, vertices first
pub fn entity_counts(cell: ReferenceCellType) -> Vec<usize> {
    match cell {
        ReferenceCellType::Point => vec![1, 0, 0, 0],
        ReferenceCellType::Interval => vec![2, 1, 0, 0],
        ReferenceCellType::Triangle => vec![3, 3, 1, 0],
        ReferenceCellType::Quadrilateral => vec![4, 4, 1, 0],
        ReferenceCellType::Tetrahedron => vec![4, 6, 4, 1],
        ReferenceCellType::Hexahedron => vec![8, 12, 6, 1],
        ReferenceCellType::Prism => vec![6, 9, 5, 1],
        ReferenceCellType::Pyramid => vec![5, 8, 5, 1],
    }
}

/// The number of facets (codimension-1 entities) of the cell
pub fn facet_count(cell: ReferenceCellType) -> usize {
    entity_counts(cell)[dim(cell) - 1]
}

/// The cell type of the cell's facets
///
/// Facet integrals are integrals over cells of this type, so quadrature
/// rules for `ds` and `dS` measures are selected on the facet cell.
/// `None` for cells whose facets are not all of one type.
pub fn facet_type(cell: ReferenceCellType) -> Option<ReferenceCellType> {
    match cell {
        ReferenceCellType::Point => None,
        ReferenceCellType::Interval => Some(ReferenceCellType::Point),
        ReferenceCellType::Triangle => Some(ReferenceCellType::Interval),
        ReferenceCellType::Quadrilateral => Some(ReferenceCellType::Interval),
        ReferenceCellType::Tetrahedron => Some(ReferenceCellType::Triangle),
        ReferenceCellType::Hexahedron => Some(ReferenceCellType::Quadrilateral),
        ReferenceCellType::Prism => None,
        ReferenceCellType::Pyramid => None,
    }
}

/// The volume of the reference cell
pub fn volume(cell: ReferenceCellType) -> f64 {
    match cell {
        ReferenceCellType::Point => 0.0,
        ReferenceCellType::Interval => 1.0,
        ReferenceCellType::Triangle => 0.5,
        ReferenceCellType::Quadrilateral => 1.0,
        ReferenceCellType::Tetrahedron => 1.0 / 6.0,
        ReferenceCellType::Hexahedron => 1.0,
        ReferenceCellType::Prism => 0.5,
        ReferenceCellType::Pyramid => 1.0 / 3.0,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use paste::paste;

    macro_rules! test_cell {

        ($($cell:ident),+) => {

        $(
            paste! {

                #[test]
                fn [<test_entities_ $cell:lower>]() {
                    let cell = ReferenceCellType::[<$cell>];
                    let counts = entity_counts(cell);
                    let d = dim(cell);
                    for count in counts.iter().skip(d + 1) {
                        assert_eq!(*count, 0);
                    }
                    if d > 0 {
                        assert_eq!(facet_count(cell), counts[d - 1]);
                    }
                    if let Some(facet) = facet_type(cell) {
                        assert_eq!(dim(facet) + 1, d);
                    }
                }

            }
        )*
        };
    }

    test_cell!(
        Interval,
        Triangle,
        Quadrilateral,
        Tetrahedron,
        Hexahedron,
        Prism,
        Pyramid
    );
}
