//! Formc
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

#[macro_use]
extern crate lazy_static;

pub mod codegen;
pub mod compile;
pub mod element;
pub mod form;
pub mod quadrature;
pub mod symbolic;
pub mod traits;
pub mod types;
