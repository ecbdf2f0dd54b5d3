//! Integration measures

use std::fmt;

/// Where an integral is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureType {
    /// Cell interiors (`dx`)
    Cell,
    /// Exterior facets (`ds`)
    ExteriorFacet,
    /// Interior facets (`dS`)
    InteriorFacet,
}

/// An integration measure, optionally restricted to a tagged subdomain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Measure {
    /// The measure type
    pub measure_type: MeasureType,
    /// Subdomain tag, integrating everywhere if `None`
    pub subdomain: Option<usize>,
}

impl Measure {
    fn new(measure_type: MeasureType) -> Self {
        Self {
            measure_type,
            subdomain: None,
        }
    }

    /// Restrict the measure to a tagged subdomain
    pub fn on(self, subdomain: usize) -> Self {
        Self {
            subdomain: Some(subdomain),
            ..self
        }
    }

    /// A short name usable in generated symbol names
    pub fn short_name(&self) -> String {
        let kind = match self.measure_type {
            MeasureType::Cell => "cell",
            MeasureType::ExteriorFacet => "exterior_facet",
            MeasureType::InteriorFacet => "interior_facet",
        };
        match self.subdomain {
            Some(id) => format!("{kind}_{id}"),
            None => kind.to_string(),
        }
    }
}

/// The cell interior measure
pub fn dx() -> Measure {
    Measure::new(MeasureType::Cell)
}

/// The exterior facet measure
pub fn ds() -> Measure {
    Measure::new(MeasureType::ExteriorFacet)
}

/// The interior facet measure
#[allow(non_snake_case)]
pub fn dS() -> Measure {
    Measure::new(MeasureType::InteriorFacet)
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.measure_type {
            MeasureType::Cell => "dx",
            MeasureType::ExteriorFacet => "ds",
            MeasureType::InteriorFacet => "dS",
        };
        match self.subdomain {
            Some(id) => write!(f, "{symbol}({id})"),
            None => write!(f, "{symbol}"),
        }
    }
}
