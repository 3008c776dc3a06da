//! Essential (Dirichlet) boundary conditions on tagged grid sides.

use crate::{
  error::ConfigError,
  grid::{NodeIdx, RectGrid, Tag},
  util,
};

use indexmap::IndexMap;
use itertools::Itertools;

use std::{fmt, rc::Rc};

pub type BcFn = dyn Fn(&na::DVector<f64>, f64) -> f64;

/// Prescribed value, either constant or a function of position and time.
pub enum BcValue {
  Constant(f64),
  Function(Box<BcFn>),
}

impl BcValue {
  pub fn function(f: impl Fn(&na::DVector<f64>, f64) -> f64 + 'static) -> Self {
    Self::Function(Box::new(f))
  }
  pub fn eval(&self, x: &na::DVector<f64>, t: f64) -> f64 {
    match self {
      Self::Constant(c) => *c,
      Self::Function(f) => f(x, t),
    }
  }
}

impl From<f64> for BcValue {
  fn from(c: f64) -> Self {
    Self::Constant(c)
  }
}

impl fmt::Debug for BcValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
      Self::Function(_) => f.write_str("Function(..)"),
    }
  }
}

#[derive(Debug)]
pub struct BcRecord {
  pub tag: Tag,
  pub field: String,
  pub value: BcValue,
}

#[derive(Debug, Clone)]
struct NodeBc {
  /// every tag covering this node, in registration order
  tags: Vec<Tag>,
  /// latest record for this node
  irecord: usize,
}

/// Set of essential boundary conditions over a grid.
///
/// A node may be covered by several tags of the same field (e.g. a corner);
/// all of them are kept and the most recently registered value is used.
pub struct BoundaryConds {
  grid: Rc<RectGrid>,
  fields: Vec<String>,
  records: Vec<BcRecord>,
  /// `[field][node]`
  registry: Vec<IndexMap<NodeIdx, NodeBc>>,
}

impl BoundaryConds {
  pub fn new<S: Into<String>>(grid: Rc<RectGrid>, fields: impl IntoIterator<Item = S>) -> Self {
    let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
    let registry = vec![IndexMap::new(); fields.len()];
    Self {
      grid,
      fields,
      records: Vec::new(),
      registry,
    }
  }

  /// Single field named `"u"`.
  pub fn new_scalar(grid: Rc<RectGrid>) -> Self {
    Self::new(grid, ["u"])
  }

  fn field_index(&self, field: &str) -> Result<usize, ConfigError> {
    self
      .fields
      .iter()
      .position(|f| f == field)
      .ok_or_else(|| ConfigError::UnknownField {
        field: field.to_string(),
        available: self.fields.clone(),
      })
  }

  /// Prescribes `value` for `field` on every node of the side `tag`.
  pub fn add(
    &mut self,
    tag: Tag,
    field: &str,
    value: impl Into<BcValue>,
  ) -> Result<&mut Self, ConfigError> {
    let ifield = self.field_index(field)?;
    let nodes = self
      .grid
      .boundary_nodes(tag)
      .ok_or(ConfigError::TagNotFound(tag))?;

    let irecord = self.records.len();
    let registry = &mut self.registry[ifield];
    for &inode in nodes {
      let entry = registry.entry(inode).or_insert_with(|| NodeBc {
        tags: Vec::new(),
        irecord,
      });
      entry.irecord = irecord;
      if !entry.tags.contains(&tag) {
        entry.tags.push(tag);
      }
    }
    self.records.push(BcRecord {
      tag,
      field: field.to_string(),
      value: value.into(),
    });
    Ok(self)
  }

  /// Prescribes zero for `field` on every side of the grid.
  pub fn set_homogeneous(&mut self, field: &str) -> Result<&mut Self, ConfigError> {
    let tags: Vec<_> = self.grid.tags().collect();
    for tag in tags {
      self.add(tag, field, 0.0)?;
    }
    Ok(self)
  }

  /// Tags and value of the condition on `node` for `field` at time `t`.
  ///
  /// `None` if the node is not constrained for this field.
  pub fn value(&self, node: NodeIdx, field: &str, t: f64) -> Option<(&[Tag], f64)> {
    let ifield = self.field_index(field).ok()?;
    let bc = self.registry[ifield].get(&node)?;
    let x = self.grid.node_coords(node);
    let value = self.records[bc.irecord].value.eval(&x, t);
    Some((&bc.tags, value))
  }

  /// Sorted list of nodes constrained for any field.
  pub fn nodes_list(&self) -> Vec<NodeIdx> {
    let all: Vec<_> = self
      .registry
      .iter()
      .flat_map(|nodes| nodes.keys().copied())
      .collect();
    util::sorted_unique(&all)
  }

  /// Sorted list of nodes constrained for `field`.
  pub fn nodes_list_for(&self, field: &str) -> Vec<NodeIdx> {
    match self.field_index(field) {
      Ok(ifield) => self.registry[ifield].keys().copied().sorted_unstable().collect(),
      Err(_) => Vec::new(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
  pub fn records(&self) -> &[BcRecord] {
    &self.records
  }
  pub fn fields(&self) -> &[String] {
    &self.fields
  }
  pub fn has_field(&self, field: &str) -> bool {
    self.fields.iter().any(|f| f == field)
  }
  pub fn grid(&self) -> &Rc<RectGrid> {
    &self.grid
  }
}

impl fmt::Debug for BoundaryConds {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BoundaryConds")
      .field("fields", &self.fields)
      .field("records", &self.records)
      .finish_non_exhaustive()
  }
}

/// One line per constrained node, with the values at `t = 0`.
impl fmt::Display for BoundaryConds {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let width = util::ndigits(self.grid.nnodes());
    for inode in self.nodes_list() {
      write!(f, "node = {inode:>width$}")?;
      for field in &self.fields {
        if let Some((tags, value)) = self.value(inode, field, 0.0) {
          write!(f, "  {field}={value} tags={tags:?}")?;
        }
      }
      writeln!(f)?;
    }
    Ok(())
  }
}
