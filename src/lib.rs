extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod bc;
pub mod dofs;
pub mod error;
pub mod grid;
pub mod linalg;
pub mod operators;
pub mod params;
pub mod solver;
pub mod sparse;
pub mod spectral;
pub mod util;

pub use error::{Error, Result};
