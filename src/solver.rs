//! Solver for linear problems `L{u} = s` with essential boundary conditions.
//!
//! The full system `A U = F` is partitioned by the prescribed nodes and only
//! the reduced system `Auu xu = bu - Auk xk` is factorized and solved.
//! Reactions `bk = Aku xu + Akk xk` at the prescribed nodes are recovered on demand.

use crate::{
  assemble::{Blocks, RowBlock},
  bc::BoundaryConds,
  dofs::DofMap,
  error::{ConfigError, InvariantError, Result},
  grid::RectGrid,
  linalg::{CsrMatrix, LinSolKind, Matrix, SparseDirectSolver, Vector},
  operators::{Method, Operator, SpcLaplacian},
  params::Params,
  spectral::{LagrangeInterp, NodeDistribution},
};

use std::{fmt, rc::Rc};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SolverState {
  Unconfigured,
  BoundaryConditionsSet,
  Assembled,
  Factorized,
  Solved,
  ReactionsComputed,
}

impl fmt::Display for SolverState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Unconfigured => "unconfigured",
      Self::BoundaryConditionsSet => "boundary-conditions-set",
      Self::Assembled => "assembled",
      Self::Factorized => "factorized",
      Self::Solved => "solved",
      Self::ReactionsComputed => "reactions-computed",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
  /// Field of the boundary conditions that holds the prescribed values.
  pub field: String,
  pub linear_solver: LinSolKind,
}

impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      field: "u".to_string(),
      linear_solver: LinSolKind::default(),
    }
  }
}

struct Partition {
  bcs: BoundaryConds,
  dofs: DofMap,
}

struct System {
  blocks: Blocks,
  auk: CsrMatrix,
  /// `Aku` and `Akk`, built the first time reactions are requested
  reaction_blocks: Option<(CsrMatrix, CsrMatrix)>,
  linsol: Option<SparseDirectSolver>,
}

pub struct Solver {
  config: SolverConfig,
  grid: Rc<RectGrid>,
  operator: Operator,
  state: SolverState,
  partition: Option<Partition>,
  system: Option<System>,
  u: Option<Vector>,
  f: Option<Vector>,
}

// constructors
impl Solver {
  pub fn new(grid: Rc<RectGrid>, operator: impl Into<Operator>) -> Self {
    Self {
      config: SolverConfig::default(),
      grid,
      operator: operator.into(),
      state: SolverState::Unconfigured,
      partition: None,
      system: None,
      u: None,
      f: None,
    }
  }

  pub fn with_config(mut self, config: SolverConfig) -> Self {
    self.config = config;
    self
  }

  /// Builds grid and operator on the box `[xmin, xmax]` with `ndiv` divisions per axis.
  ///
  /// The finite difference grid is uniform. The spectral grid uses the
  /// nodes of one Lagrange interpolator of degree `ndiv[d]` per axis.
  pub fn new_grid(
    method: Method,
    nodes: NodeDistribution,
    params: &Params,
    xmin: &[f64],
    xmax: &[f64],
    ndiv: &[usize],
  ) -> Result<Self> {
    let ndim = xmin.len();
    if xmax.len() != ndim {
      return Err(
        ConfigError::DimensionMismatch {
          context: "length of xmax",
          expected: ndim,
          actual: xmax.len(),
        }
        .into(),
      );
    }
    if ndiv.len() != ndim {
      return Err(
        ConfigError::DimensionMismatch {
          context: "length of ndiv",
          expected: ndim,
          actual: ndiv.len(),
        }
        .into(),
      );
    }

    let (grid, operator) = match method {
      Method::FiniteDifference => {
        if nodes != NodeDistribution::Uniform {
          warn!("FDM grids are always uniform, ignoring {nodes:?} nodes");
        }
        let grid = RectGrid::new_uniform(xmin, xmax, ndiv)?;
        (grid, Operator::fdm(params)?)
      }
      Method::SpectralCollocation => {
        let lips = (0..ndim)
          .map(|d| LagrangeInterp::new(ndiv[d], nodes)?.mapped(xmin[d], xmax[d]))
          .collect::<std::result::Result<Vec<_>, _>>()?;
        let grid = RectGrid::from_axes(lips.iter().map(|lip| lip.nodes().to_vec()).collect())?;
        let op = SpcLaplacian::from_interpolators(params, &lips)?;
        (grid, Operator::Spc(op))
      }
    };
    debug!("{method} solver on grid with npts={:?}", grid.npts());
    Ok(Self::new(Rc::new(grid), operator))
  }
}

// getters
impl Solver {
  pub fn state(&self) -> SolverState {
    self.state
  }
  pub fn config(&self) -> &SolverConfig {
    &self.config
  }
  pub fn grid(&self) -> &Rc<RectGrid> {
    &self.grid
  }
  pub fn operator(&self) -> &Operator {
    &self.operator
  }
  pub fn bcs(&self) -> Option<&BoundaryConds> {
    self.partition.as_ref().map(|p| &p.bcs)
  }
  pub fn dofs(&self) -> Option<&DofMap> {
    self.partition.as_ref().map(|p| &p.dofs)
  }
  pub fn blocks(&self) -> Option<&Blocks> {
    self.system.as_ref().map(|s| &s.blocks)
  }
  /// Solution at all grid nodes.
  pub fn u(&self) -> Option<&Vector> {
    self.u.as_ref()
  }
  /// Right-hand side at all grid nodes, with the reactions at the prescribed ones.
  pub fn f(&self) -> Option<&Vector> {
    self.f.as_ref()
  }

  /// Solution of a 2D problem laid out as `[ny][nx]`.
  ///
  /// `None` before a successful solve or on grids that are not 2D.
  pub fn u_grid2d(&self) -> Option<Matrix> {
    if self.grid.ndim() != 2 {
      return None;
    }
    let u = self.u.as_ref()?;
    let npts = self.grid.npts();
    let (nx, ny) = (npts[0], npts[1]);
    Some(Matrix::from_fn(ny, nx, |j, i| u[i + j * nx]))
  }
}

impl Solver {
  fn invalid_state(&self, required: SolverState) -> InvariantError {
    InvariantError::InvalidState {
      required,
      actual: self.state,
    }
  }

  /// Partitions the equations into unknown and prescribed ones.
  ///
  /// Discards any previous assembly and solution.
  pub fn set_boundary_conditions(&mut self, bcs: BoundaryConds) -> Result<()> {
    let nnodes = self.grid.nnodes();
    if bcs.grid().nnodes() != nnodes {
      return Err(
        ConfigError::DimensionMismatch {
          context: "number of nodes of the boundary conditions grid",
          expected: nnodes,
          actual: bcs.grid().nnodes(),
        }
        .into(),
      );
    }
    if !Rc::ptr_eq(bcs.grid(), &self.grid) && bcs.grid().axes() != self.grid.axes() {
      return Err(
        ConfigError::InvalidGrid(
          "boundary conditions were registered on a different grid".to_string(),
        )
        .into(),
      );
    }
    let field = &self.config.field;
    if !bcs.has_field(field) {
      return Err(
        ConfigError::UnknownField {
          field: field.clone(),
          available: bcs.fields().to_vec(),
        }
        .into(),
      );
    }

    let prescribed = bcs.nodes_list();
    if let Some(&node) = prescribed
      .iter()
      .find(|&&node| bcs.value(node, field, 0.0).is_none())
    {
      return Err(
        ConfigError::MissingFieldValue {
          node,
          field: field.clone(),
        }
        .into(),
      );
    }

    let dofs = DofMap::new(nnodes, &prescribed)?;
    if dofs.nunknown() == 0 {
      return Err(ConfigError::NoUnknowns(nnodes).into());
    }
    info!(
      "partitioned {} equations into N1={} unknown and N2={} prescribed",
      dofs.n(),
      dofs.nunknown(),
      dofs.nprescribed()
    );

    self.partition = Some(Partition { bcs, dofs });
    self.system = None;
    self.u = None;
    self.f = None;
    self.state = SolverState::BoundaryConditionsSet;
    Ok(())
  }

  /// Assembles `Auu` and `Auk` and factorizes `Auu`.
  pub fn assemble(&mut self) -> Result<()> {
    let Some(partition) = &self.partition else {
      return Err(self.invalid_state(SolverState::BoundaryConditionsSet).into());
    };
    let dofs = &partition.dofs;

    let mut blocks = Blocks::new(dofs);
    blocks.start_unknown_rows();
    let triplets = self.operator.assemble(&self.grid, dofs, RowBlock::Unknown)?;
    blocks.put_all(dofs, triplets);
    debug!(
      "Auu: {} triplets, Auk: {} triplets",
      blocks.uu().ntriplets(),
      blocks.uk().ntriplets()
    );

    let auk = blocks.uk().to_nalgebra_csr();
    let auu = blocks.uu().to_nalgebra_csr();
    self.system = Some(System {
      blocks,
      auk,
      reaction_blocks: None,
      linsol: None,
    });
    self.u = None;
    self.f = None;
    self.state = SolverState::Assembled;

    let linsol = SparseDirectSolver::factorize(auu, self.config.linear_solver)?;
    info!(
      "factorized Auu of size {} with {:?}",
      linsol.nrows(),
      linsol.kind()
    );
    if let Some(system) = &mut self.system {
      system.linsol = Some(linsol);
    }
    self.state = SolverState::Factorized;
    Ok(())
  }

  /// Solves for the unknowns with the boundary values at `time`.
  ///
  /// With `reactions` the right-hand side at the prescribed nodes is recovered too.
  /// Assembly and factorization are reused between calls.
  pub fn solve(&mut self, time: f64, reactions: bool) -> Result<()> {
    let ready = self
      .system
      .as_ref()
      .is_some_and(|system| system.linsol.is_some());
    if !ready {
      return Err(self.invalid_state(SolverState::Factorized).into());
    }
    self.u = None;
    self.f = None;
    self.state = SolverState::Factorized;

    let (u, f) = self.solve_impl(time, reactions)?;
    self.state = if f.is_some() {
      SolverState::ReactionsComputed
    } else {
      SolverState::Solved
    };
    self.u = Some(u);
    self.f = f;
    Ok(())
  }

  fn solve_impl(&mut self, time: f64, mut reactions: bool) -> Result<(Vector, Option<Vector>)> {
    let not_ready = self.invalid_state(SolverState::Factorized);
    let (Some(partition), Some(system)) = (&self.partition, &mut self.system) else {
      return Err(not_ready.into());
    };
    let (dofs, bcs) = (&partition.dofs, &partition.bcs);
    let field = &self.config.field;

    if reactions && dofs.nprescribed() == 0 {
      warn!("no prescribed equations, skipping reactions");
      reactions = false;
    }

    let mut bu = Vector::zeros(dofs.nunknown());
    self
      .operator
      .add_source_term(&self.grid, dofs, time, &mut bu);

    let bu_copy = reactions.then(|| bu.clone());
    if reactions && system.reaction_blocks.is_none() {
      system.blocks.start_prescribed_rows(dofs);
      let triplets = self
        .operator
        .assemble(&self.grid, dofs, RowBlock::Prescribed)?;
      system.blocks.put_all(dofs, triplets);
      if let (Some(aku), Some(akk)) = (system.blocks.ku(), system.blocks.kk()) {
        debug!(
          "Aku: {} triplets, Akk: {} triplets",
          aku.ntriplets(),
          akk.ntriplets()
        );
        system.reaction_blocks = Some((aku.to_nalgebra_csr(), akk.to_nalgebra_csr()));
      }
    }

    let mut xk = Vector::zeros(dofs.nprescribed());
    for (ik, &inode) in dofs.prescribed_to_full().iter().enumerate() {
      let (_, value) = bcs
        .value(inode, field, time)
        .ok_or_else(|| ConfigError::MissingFieldValue {
          node: inode,
          field: field.clone(),
        })?;
      xk[ik] = value;
    }

    if dofs.nprescribed() > 0 {
      bu -= &system.auk * &xk;
    }

    let Some(linsol) = &system.linsol else {
      return Err(not_ready.into());
    };
    let xu = linsol.solve(&bu)?;
    let u = dofs.join(&xu, &xk);

    let f = match (bu_copy, &system.reaction_blocks) {
      (Some(bu_copy), Some((aku, akk))) => {
        let bk = aku * &xu + akk * &xk;
        Some(dofs.join(&bu_copy, &bk))
      }
      _ => None,
    };
    Ok((u, f))
  }
}

impl fmt::Debug for Solver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Solver")
      .field("config", &self.config)
      .field("operator", &self.operator)
      .field("state", &self.state)
      .field("npts", &self.grid.npts())
      .finish_non_exhaustive()
  }
}
