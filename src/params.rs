use crate::error::ConfigError;

use indexmap::IndexMap;

use std::fmt;

/// Ordered set of named scalar parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(IndexMap<String, f64>);

impl Params {
  pub fn new() -> Self {
    Self::default()
  }
  pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
    self.set(name, value);
    self
  }
  pub fn set(&mut self, name: impl Into<String>, value: f64) {
    self.0.insert(name.into(), value);
  }
  pub fn get(&self, name: &str) -> Option<f64> {
    self.0.get(name).copied()
  }
  pub fn require(&self, name: &str, context: &'static str) -> Result<f64, ConfigError> {
    self.get(name).ok_or_else(|| ConfigError::MissingParameter {
      name: name.to_string(),
      context,
    })
  }
  pub fn len(&self) -> usize {
    self.0.len()
  }
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
    self.0.iter().map(|(k, &v)| (k.as_str(), v))
  }
}

impl<const N: usize> From<[(&str, f64); N]> for Params {
  fn from(entries: [(&str, f64); N]) -> Self {
    Self(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
  }
}

impl fmt::Display for Params {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let entries: Vec<_> = self.iter().map(|(k, v)| format!("{k:?}: {v}")).collect();
    write!(f, "{{{}}}", entries.join(", "))
  }
}

/// Diffusion coefficients of the anisotropic Laplacian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
  pub kx: f64,
  pub ky: f64,
  pub kz: Option<f64>,
}

impl Coefficients {
  /// Reads `kx` and `ky`, and `kz` if present.
  pub fn from_params(params: &Params, context: &'static str) -> Result<Self, ConfigError> {
    Ok(Self {
      kx: params.require("kx", context)?,
      ky: params.require("ky", context)?,
      kz: params.get("kz"),
    })
  }

  pub fn isotropic(k: f64) -> Self {
    Self {
      kx: k,
      ky: k,
      kz: Some(k),
    }
  }

  /// Coefficient along `axis`; `kz` is only required once the z axis is asked for.
  pub fn along(&self, axis: usize, context: &'static str) -> Result<f64, ConfigError> {
    match axis {
      0 => Ok(self.kx),
      1 => Ok(self.ky),
      2 => self.kz.ok_or_else(|| ConfigError::MissingParameter {
        name: "kz".to_string(),
        context,
      }),
      _ => Err(ConfigError::DimensionMismatch {
        context,
        expected: 3,
        actual: axis + 1,
      }),
    }
  }
}
