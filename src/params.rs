//! Parameter metadata for sizing policies
//!
//! This module describes the inputs each box-size policy takes, enabling:
//! - Input form generation in a presentation layer
//! - Parameter documentation (`pnf policies`)
//! - Building a [`SizingPolicy`] from a policy name and raw widget values
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use yapnf::prelude::*;
//!
//! let mut values = HashMap::new();
//! values.insert("atr_period", 14.0);
//!
//! let policy = SizingPolicy::from_params("ATR", &values).unwrap();
//! assert_eq!(policy, SizingPolicy::atr(14).unwrap());
//! ```

use std::collections::HashMap;

use crate::{
  sizing::{SizingPolicy, MIN_BOX_SIZE},
  PnfError, Result,
};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Period value (positive integer)
  Period,
  /// Percentage of price in (0, 100]
  Percent,
  /// Absolute price amount
  Price,
}

/// Metadata for a single policy parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "atr_period")
  pub name: &'static str,
  /// Parameter type
  pub param_type: ParamType,
  /// Default value offered to the user
  pub default: f64,
  /// Input bounds: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn percent(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Percent, default, range, description }
  }

  pub const fn price(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Price, default, range, description }
  }
}

// ============================================================
// POLICY PARAMETERS
// ============================================================

pub static ATR_PERIOD: ParamMeta = ParamMeta::period(
  "atr_period",
  14.0,
  (1.0, f64::MAX, 1.0),
  "Number of trailing closes averaged for the close-to-close range",
);

pub static PERCENT: ParamMeta = ParamMeta::percent(
  "percent",
  1.0,
  (0.01, 100.0, 0.01),
  "Box size as a percentage of the last bar's (high + low) / 2",
);

pub static MANUAL_VALUE: ParamMeta = ParamMeta::price(
  "value",
  1.0,
  (MIN_BOX_SIZE, f64::MAX, 0.01),
  "Fixed box size in price units, rounded to cents",
);

/// Policy names accepted by [`SizingPolicy::from_params`]
pub const POLICY_NAMES: [&str; 4] = ["ATR", "Percentage", "Manual", "Traditional"];

/// Parameters taken by the named policy (case-insensitive)
pub fn policy_params(method: &str) -> Result<&'static [ParamMeta]> {
  match method.to_ascii_lowercase().as_str() {
    "atr" => Ok(std::slice::from_ref(&ATR_PERIOD)),
    "percentage" => Ok(std::slice::from_ref(&PERCENT)),
    "manual" => Ok(std::slice::from_ref(&MANUAL_VALUE)),
    "traditional" => Ok(&[]),
    other => Err(PnfError::InvalidConfig(format!(
      "unknown sizing method '{}', expected one of {:?}",
      other, POLICY_NAMES
    ))),
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Fetch a required parameter
pub fn require(params: &HashMap<&str, f64>, meta: &ParamMeta) -> Result<f64> {
  params.get(meta.name).copied().ok_or(PnfError::InvalidPolicyParameter {
    field: meta.name,
    value: f64::NAN,
    reason: "missing",
  })
}

/// Fetch a period parameter, rejecting fractional and non-positive values
pub fn require_period(params: &HashMap<&str, f64>, meta: &ParamMeta) -> Result<usize> {
  let value = require(params, meta)?;
  if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
    return Err(PnfError::InvalidPolicyParameter {
      field: meta.name,
      value,
      reason: "must be a positive integer",
    });
  }
  Ok(value as usize)
}

impl SizingPolicy {
  /// Build a policy from its display name plus raw parameter values.
  ///
  /// Missing required parameters are errors; no default is substituted.
  pub fn from_params(method: &str, params: &HashMap<&str, f64>) -> Result<Self> {
    policy_params(method)?;
    match method.to_ascii_lowercase().as_str() {
      "atr" => SizingPolicy::atr(require_period(params, &ATR_PERIOD)?),
      "percentage" => SizingPolicy::percentage(require(params, &PERCENT)?),
      "manual" => SizingPolicy::manual(require(params, &MANUAL_VALUE)?),
      _ => Ok(SizingPolicy::traditional()),
    }
  }
}

// ============================================================
// TESTS
// ============================================================
