//! Quadrature rule selection
//!
//! Rules are selected on the reference cell an integral is evaluated on:
//! the cell itself for `dx`, the facet cell for `ds` and `dS`.

pub mod degree;
pub mod simplex_rules;
pub mod types;

pub use degree::{integration_cell, required_degree};
pub use simplex_rules::{available_orders, simplex_rule};
pub use types::{QuadratureError, QuadratureRule};
