//! Lowering of integrands to per-cell kernels
//!
//! Basis tables are flat row-major arrays tabulated by the runtime from
//! the element registry's metadata, one per (function, derivative) pair
//! used by the integrand:
//!
//! - values:      `name[(q*ndofs + dof)*vs + c]`
//! - gradients:   `grad_name[((q*ndofs + dof)*vs + c)*gdim + d]`
//! - divergences: `div_name[q*ndofs + dof]`
//!
//! Coefficient tables drop the dof axis: the runtime contracts the
//! coefficient's dof values with its basis ahead of the kernel, leaving
//! values per quadrature point. The trailing component axis is dropped
//! for single-component tables.

use itertools::Itertools;
use log::{debug, warn};

use crate::codegen::CodegenError;
use crate::compile::CompilerOptions;
use crate::element::reference_cell;
use crate::form::analysis::FormMetadata;
use crate::form::Form;
use crate::quadrature::{integration_cell, required_degree, simplex_rule, QuadratureRule};
use crate::symbolic::expr::Expr;
use crate::symbolic::function::{FunctionHandle, FunctionRole};
use crate::symbolic::measure::Measure;
use crate::traits::ElementType;
use crate::types::ReferenceCellType;

/// The dof block of one slot of a mixed space
#[derive(Debug, Clone)]
pub struct BlockLayout {
    /// The slot index
    pub slot: usize,
    /// First local dof of the block
    pub dof_offset: usize,
    /// Number of dofs in the block
    pub dof_count: usize,
    /// First component of the block in the stacked value vector
    pub component_offset: usize,
    /// Number of components of the block
    pub value_size: usize,
    /// Human-readable description of the slot's element
    pub description: String,
}

/// The local layout of one function space referenced by a kernel
#[derive(Debug, Clone)]
pub struct SpaceDescriptor {
    /// Short name, used as the stem of the space's table arrays
    pub name: String,
    /// The function's role
    pub role: FunctionRole,
    /// The function's argument index
    pub argument_index: usize,
    /// Local dofs of the space on one cell
    pub dof_count: usize,
    /// Components of the space's stacked value
    pub value_size: usize,
    /// Description of the space's element
    pub description: String,
    /// Per-slot blocks; one entry for non-mixed spaces
    pub blocks: Vec<BlockLayout>,
}

impl SpaceDescriptor {
    fn from_handle(name: String, handle: &FunctionHandle) -> Self {
        let element = handle.element().as_ref();
        let blocks = match element.as_mixed() {
            Some(mixed) => (0..mixed.len())
                .map(|slot| BlockLayout {
                    slot,
                    dof_offset: mixed.dof_offset(slot),
                    dof_count: mixed.sub_element(slot).dof_count(),
                    component_offset: mixed.component_offset(slot),
                    value_size: mixed.sub_element(slot).value_size(),
                    description: mixed.sub_element(slot).to_string(),
                })
                .collect(),
            None => vec![BlockLayout {
                slot: 0,
                dof_offset: 0,
                dof_count: element.dof_count(),
                component_offset: 0,
                value_size: element.value_size(),
                description: element.to_string(),
            }],
        };
        Self {
            name,
            role: handle.role(),
            argument_index: handle.argument_index(),
            dof_count: element.dof_count(),
            value_size: element.value_size(),
            description: element.to_string(),
            blocks,
        }
    }
}

/// The derivative of a basis table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Basis function values
    Value,
    /// Basis function gradients
    Gradient,
    /// Basis function divergences
    Divergence,
}

/// A basis table the runtime must tabulate for a kernel
#[derive(Debug, Clone)]
pub struct TableRequest {
    /// The array name used in the kernel
    pub array: String,
    /// The space the table belongs to
    pub space: String,
    /// What the table holds
    pub kind: TableKind,
    /// Slot restriction, for divergences of one block of a mixed space
    pub slot: Option<usize>,
}

/// A per-cell computation for one integral of a form
#[derive(Debug, Clone)]
pub struct LocalKernel {
    /// Symbol name of the kernel
    pub name: String,
    /// Arity of the form the kernel belongs to
    pub arity: usize,
    /// The cell the form's spaces live on
    pub cell_type: ReferenceCellType,
    /// The cell the quadrature rule is defined on
    pub integration_cell: ReferenceCellType,
    /// The integral's measure
    pub measure: Measure,
    /// The estimated polynomial degree of the integrand
    pub required_degree: usize,
    /// The selected quadrature rule
    pub rule: QuadratureRule<f64>,
    /// The test space, for arity >= 1
    pub test_space: Option<SpaceDescriptor>,
    /// The trial space, for arity 2
    pub trial_space: Option<SpaceDescriptor>,
    /// The coefficient spaces, by argument index
    pub coefficients: Vec<SpaceDescriptor>,
    /// The basis tables the kernel reads, sorted by array name
    pub tables: Vec<TableRequest>,
    /// True if the kernel reads the facet normal
    pub uses_facet_normal: bool,
    /// The scalar integrand, lowered to flat-array index arithmetic
    pub integrand_code: String,
}

/// Generate one kernel per integral of an analyzed form
pub fn generate(
    name: &str,
    form: &Form,
    metadata: &FormMetadata,
    options: &CompilerOptions,
) -> Result<Vec<LocalKernel>, CodegenError> {
    let test = metadata.test_argument();
    let trial = metadata.trial_argument();
    if metadata.arity != test.is_some() as usize + trial.is_some() as usize {
        return Err(CodegenError::UnsupportedExpression {
            expr: name.to_string(),
            detail: "kernels are generated for at most one test and one trial argument"
                .to_string(),
        });
    }
    let cell = test
        .map(|slot| slot.handle.element().cell_type())
        .or_else(|| trial.map(|slot| slot.handle.element().cell_type()))
        .or_else(|| {
            metadata
                .coefficient_slots
                .first()
                .map(|handle| handle.element().cell_type())
        })
        .ok_or_else(|| CodegenError::UnsupportedExpression {
            expr: name.to_string(),
            detail: "form references no function space".to_string(),
        })?;

    let mut kernels = vec![];
    for (index, integral) in form.integrals().iter().enumerate() {
        let integration_cell = integration_cell(cell, integral.measure.measure_type)
            .ok_or_else(|| CodegenError::UnsupportedExpression {
                expr: format!("{}", integral.measure),
                detail: format!("facet integrals are not supported on a {cell}"),
            })?;
        let estimated = required_degree(integral);
        let degree = match options.quadrature_degrees.get(&integration_cell) {
            Some(&forced) => {
                if forced < estimated {
                    warn!(
                        "quadrature degree {forced} forced on {integration_cell} is below \
                         the estimated degree {estimated}"
                    );
                }
                forced
            }
            None => estimated,
        };
        let rule = simplex_rule::<f64>(integration_cell, degree)?;
        debug!(
            "integral {index} of `{name}`: degree {degree} on {integration_cell}, \
             {} quadrature points",
            rule.npoints
        );

        let mut lowerer = Lowerer {
            gdim: reference_cell::dim(cell),
            tables: vec![],
            uses_facet_normal: false,
        };
        let integrand_code = lowerer.lower(&integral.integrand, &[])?;
        let tables = lowerer
            .tables
            .into_iter()
            .sorted_by(|a, b| a.array.cmp(&b.array))
            .collect();

        kernels.push(LocalKernel {
            name: format!("{name}_{}_{index}", integral.measure.short_name()),
            arity: metadata.arity,
            cell_type: cell,
            integration_cell,
            measure: integral.measure,
            required_degree: degree,
            rule,
            test_space: test
                .map(|slot| SpaceDescriptor::from_handle(space_name(&slot.handle), &slot.handle)),
            trial_space: trial
                .map(|slot| SpaceDescriptor::from_handle(space_name(&slot.handle), &slot.handle)),
            coefficients: metadata
                .coefficient_slots
                .iter()
                .map(|handle| SpaceDescriptor::from_handle(space_name(handle), handle))
                .collect(),
            tables,
            uses_facet_normal: lowerer.uses_facet_normal,
            integrand_code,
        });
    }
    Ok(kernels)
}

fn space_name(handle: &FunctionHandle) -> String {
    let prefix = match handle.role() {
        FunctionRole::Test => "v",
        FunctionRole::Trial => "u",
        FunctionRole::Coefficient => "w",
    };
    format!("{prefix}{}", handle.argument_index())
}

fn dof_var(role: FunctionRole) -> Option<&'static str> {
    match role {
        FunctionRole::Test => Some("i"),
        FunctionRole::Trial => Some("j"),
        FunctionRole::Coefficient => None,
    }
}

fn linearize(idx: &[usize], shape: &[usize]) -> usize {
    debug_assert_eq!(idx.len(), shape.len());
    idx.iter()
        .zip(shape)
        .fold(0, |position, (i, dim)| position * dim + i)
}

fn float_literal(value: f64) -> String {
    format!("{value:?}")
}

struct Lowerer {
    gdim: usize,
    tables: Vec<TableRequest>,
    uses_facet_normal: bool,
}

impl Lowerer {
    fn ensure_table(&mut self, array: String, space: String, kind: TableKind, slot: Option<usize>) {
        if !self.tables.iter().any(|table| table.array == array) {
            self.tables.push(TableRequest {
                array,
                space,
                kind,
                slot,
            });
        }
    }

    /// Access into a value or gradient table of `handle`, at stacked
    /// component `comp` and, for gradients, spatial direction `d`
    fn table_access(
        &mut self,
        handle: &FunctionHandle,
        comp: usize,
        gradient_direction: Option<usize>,
    ) -> String {
        let name = space_name(handle);
        let vs = handle.element().value_size();
        let nd = handle.element().dof_count();
        let (array, kind) = match gradient_direction {
            None => (name.clone(), TableKind::Value),
            Some(_) => (format!("grad_{name}"), TableKind::Gradient),
        };
        self.ensure_table(array.clone(), name, kind, None);

        // Point index, then dof index for arguments, then component, then
        // direction, all flattened row-major.
        let mut index = "q".to_string();
        if let Some(var) = dof_var(handle.role()) {
            index = format!("(q*{nd} + {var})");
        }
        if vs > 1 {
            index = format!("({index}*{vs} + {comp})");
        }
        if let Some(d) = gradient_direction {
            index = format!("({index}*{} + {d})", self.gdim);
        }
        // Strip redundant outer parentheses from the final index
        let index = index
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .map(|s| s.to_string())
            .unwrap_or(index);
        format!("{array}[{index}]")
    }

    fn divergence_access(&mut self, handle: &FunctionHandle) -> Result<String, CodegenError> {
        let name = space_name(handle);
        let array = match handle.slot() {
            Some(slot) => format!("div_{name}_s{slot}"),
            None => format!("div_{name}"),
        };
        self.ensure_table(array.clone(), name, TableKind::Divergence, handle.slot());
        match dof_var(handle.role()) {
            Some(var) => {
                let nd = handle.element().dof_count();
                Ok(format!("{array}[q*{nd} + {var}]"))
            }
            None => Ok(format!("{array}[q]")),
        }
    }

    fn lower(&mut self, expr: &Expr, idx: &[usize]) -> Result<String, CodegenError> {
        match expr {
            Expr::Constant(value) => Ok(float_literal(*value)),
            Expr::Function(handle) => {
                let comp = handle.component_offset() + linearize(idx, &handle.value_shape());
                Ok(self.table_access(handle, comp, None))
            }
            Expr::FacetNormal { .. } => {
                self.uses_facet_normal = true;
                Ok(format!("n[{}]", idx[0]))
            }
            Expr::Neg(inner) => Ok(format!("(-{})", self.lower(inner, idx)?)),
            Expr::Grad(inner) => {
                let (d, comp_idx) = idx.split_last().ok_or_else(|| {
                    CodegenError::UnsupportedExpression {
                        expr: expr.to_string(),
                        detail: "gradient lowered without a direction index".to_string(),
                    }
                })?;
                self.lower_gradient(inner, comp_idx, *d)
            }
            Expr::Div(inner) => {
                if inner.rank() != 1 {
                    return Err(CodegenError::UnsupportedExpression {
                        expr: expr.to_string(),
                        detail: "divergence is generated for rank 1 operands only".to_string(),
                    });
                }
                self.lower_divergence(inner)
            }
            Expr::Add(lhs, rhs) => Ok(format!(
                "({} + {})",
                self.lower(lhs, idx)?,
                self.lower(rhs, idx)?
            )),
            Expr::Sub(lhs, rhs) => Ok(format!(
                "({} - {})",
                self.lower(lhs, idx)?,
                self.lower(rhs, idx)?
            )),
            Expr::Mul(lhs, rhs) => {
                if lhs.rank() == 0 {
                    Ok(format!(
                        "({} * {})",
                        self.lower(lhs, &[])?,
                        self.lower(rhs, idx)?
                    ))
                } else if rhs.rank() == 0 {
                    Ok(format!(
                        "({} * {})",
                        self.lower(lhs, idx)?,
                        self.lower(rhs, &[])?
                    ))
                } else {
                    // Equal-rank contraction
                    self.lower_contraction(lhs, rhs)
                }
            }
            Expr::Dot(lhs, rhs) => self.lower_contraction(lhs, rhs),
            Expr::Integral { .. } => Err(CodegenError::UnsupportedExpression {
                expr: expr.to_string(),
                detail: "nested integrals have no kernel lowering".to_string(),
            }),
        }
    }

    fn lower_contraction(&mut self, lhs: &Expr, rhs: &Expr) -> Result<String, CodegenError> {
        let shape = lhs.value_shape();
        let terms: Vec<String> = shape
            .iter()
            .map(|dim| 0..*dim)
            .multi_cartesian_product()
            .map(|index| {
                Ok(format!(
                    "{}*{}",
                    self.lower(lhs, &index)?,
                    self.lower(rhs, &index)?
                ))
            })
            .collect::<Result<_, CodegenError>>()?;
        Ok(format!("({})", terms.iter().join(" + ")))
    }

    fn lower_gradient(
        &mut self,
        expr: &Expr,
        comp_idx: &[usize],
        direction: usize,
    ) -> Result<String, CodegenError> {
        match expr {
            Expr::Function(handle) => {
                let comp =
                    handle.component_offset() + linearize(comp_idx, &handle.value_shape());
                Ok(self.table_access(handle, comp, Some(direction)))
            }
            Expr::Add(lhs, rhs) => Ok(format!(
                "({} + {})",
                self.lower_gradient(lhs, comp_idx, direction)?,
                self.lower_gradient(rhs, comp_idx, direction)?
            )),
            Expr::Sub(lhs, rhs) => Ok(format!(
                "({} - {})",
                self.lower_gradient(lhs, comp_idx, direction)?,
                self.lower_gradient(rhs, comp_idx, direction)?
            )),
            Expr::Neg(inner) => Ok(format!(
                "(-{})",
                self.lower_gradient(inner, comp_idx, direction)?
            )),
            other => Err(CodegenError::UnsupportedExpression {
                expr: other.to_string(),
                detail: "gradients are generated for function terminals and their sums"
                    .to_string(),
            }),
        }
    }

    fn lower_divergence(&mut self, expr: &Expr) -> Result<String, CodegenError> {
        match expr {
            Expr::Function(handle) => self.divergence_access(handle),
            Expr::Add(lhs, rhs) => Ok(format!(
                "({} + {})",
                self.lower_divergence(lhs)?,
                self.lower_divergence(rhs)?
            )),
            Expr::Sub(lhs, rhs) => Ok(format!(
                "({} - {})",
                self.lower_divergence(lhs)?,
                self.lower_divergence(rhs)?
            )),
            Expr::Neg(inner) => Ok(format!("(-{})", self.lower_divergence(inner)?)),
            other => Err(CodegenError::UnsupportedExpression {
                expr: other.to_string(),
                detail: "divergences are generated for function terminals and their sums"
                    .to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::{Element, ElementRegistry};
    use crate::form::analysis::analyze;
    use crate::symbolic::measure::dx;
    use crate::symbolic::ops;
    use crate::types::{Continuity, ElementFamily};
    use std::sync::Arc;

    fn bdm1() -> Arc<Element> {
        Arc::new(
            ElementRegistry::standard()
                .construct(
                    ElementFamily::BrezziDouglasMarini,
                    ReferenceCellType::Triangle,
                    1,
                    Continuity::Standard,
                )
                .unwrap()
                .into(),
        )
    }

    #[test]
    fn test_mass_kernel_lowering() {
        let v = FunctionHandle::test(bdm1());
        let u = FunctionHandle::trial(bdm1());
        let form = Form::from_expr(
            ops::scale(
                ops::dot(Expr::Function(v), Expr::Function(u)).unwrap(),
                dx(),
            )
            .unwrap(),
        )
        .unwrap();
        let metadata = analyze(&form).unwrap();
        let kernels =
            generate("a", &form, &metadata, &CompilerOptions::default()).unwrap();
        assert_eq!(kernels.len(), 1);
        let kernel = &kernels[0];
        assert_eq!(kernel.name, "a_cell_0");
        assert_eq!(kernel.arity, 2);
        assert_eq!(kernel.required_degree, 2);
        // Unrolled over the two vector components
        assert_eq!(
            kernel.integrand_code,
            "(v0[(q*6 + i)*2 + 0]*u0[(q*6 + j)*2 + 0] + v0[(q*6 + i)*2 + 1]*u0[(q*6 + j)*2 + 1])"
        );
        assert_eq!(kernel.tables.len(), 2);
        assert!(!kernel.uses_facet_normal);
    }

    #[test]
    fn test_divergence_tables_requested() {
        let v = FunctionHandle::test(bdm1());
        let p = FunctionHandle::trial(Arc::new(
            ElementRegistry::standard()
                .construct(
                    ElementFamily::Lagrange,
                    ReferenceCellType::Triangle,
                    0,
                    Continuity::Discontinuous,
                )
                .unwrap()
                .into(),
        ));
        let form = Form::from_expr(
            ops::scale(
                ops::multiply(
                    ops::div(Expr::Function(v)).unwrap(),
                    Expr::Function(p),
                )
                .unwrap(),
                dx(),
            )
            .unwrap(),
        )
        .unwrap();
        let metadata = analyze(&form).unwrap();
        let kernels =
            generate("a", &form, &metadata, &CompilerOptions::default()).unwrap();
        let kernel = &kernels[0];
        assert_eq!(kernel.integrand_code, "(div_v0[q*6 + i] * u0[q*1 + j])");
        assert!(kernel
            .tables
            .iter()
            .any(|table| table.kind == TableKind::Divergence));
    }
}
