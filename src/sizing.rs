//! Box size determination
//!
//! Maps a series plus a [`SizingPolicy`] to a single [`BoxSize`]. Every policy
//! result is rounded to cents with round-half-away-from-zero before it is
//! validated, so a policy that rounds down to zero is reported as
//! [`PnfError::DegenerateBoxSize`] instead of being charted.

use log::debug;

use crate::{BoxSize, OHLCExt, Percent, Period, PnfError, Result, OHLC};

/// Percentage of the last bar's midpoint used by the traditional policy
pub const TRADITIONAL_PERCENT: f64 = 1.0;

/// Smallest manual box size; anything below rounds away at cent precision
pub const MIN_BOX_SIZE: f64 = 0.01;

/// How the box size is derived from the series
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SizingPolicy {
    /// Absolute close-to-close changes summed over the last `period` closes,
    /// divided by the number of closes in that window
    Atr { period: Period },
    /// Percentage of the last bar's (high + low) / 2
    Percentage { percent: Percent },
    /// Fixed user value
    Manual { value: f64 },
    /// 1% of the last bar's (high + low) / 2
    #[default]
    Traditional,
}

impl SizingPolicy {
    pub fn atr(period: usize) -> Result<Self> {
        Period::new(period)
            .map(|period| Self::Atr { period })
            .map_err(|_| PnfError::InvalidPolicyParameter {
                field: "atr_period",
                value: period as f64,
                reason: "must be >= 1",
            })
    }

    pub fn percentage(percent: f64) -> Result<Self> {
        Ok(Self::Percentage {
            percent: Percent::new(percent)?,
        })
    }

    pub fn manual(value: f64) -> Result<Self> {
        let policy = Self::Manual { value };
        policy.validate()?;
        Ok(policy)
    }

    pub fn traditional() -> Self {
        Self::Traditional
    }

    /// Display name as used by the presentation layer
    pub fn name(&self) -> &'static str {
        match self {
            Self::Atr { .. } => "ATR",
            Self::Percentage { .. } => "Percentage",
            Self::Manual { .. } => "Manual",
            Self::Traditional => "Traditional",
        }
    }

    /// Check the parameters a deserialized policy carries.
    ///
    /// `Period` and `Percent` are validated on construction; the manual value
    /// is a bare float and is checked here.
    pub fn validate(&self) -> Result<()> {
        if let Self::Manual { value } = *self {
            if !value.is_finite() || value < MIN_BOX_SIZE {
                return Err(PnfError::InvalidPolicyParameter {
                    field: "value",
                    value,
                    reason: "must be >= 0.01",
                });
            }
        }
        Ok(())
    }
}

/// Round to 2 decimal places, halves away from zero.
#[inline]
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the box size for `bars` under `policy`.
///
/// Policy parameters are checked before the series is looked at. The ATR
/// policy over a single bar (or over a flat series) yields 0, which is
/// reported as [`PnfError::DegenerateBoxSize`].
pub fn compute_box_size<T: OHLC>(bars: &[T], policy: &SizingPolicy) -> Result<BoxSize> {
    policy.validate()?;
    let last = bars.last().ok_or(PnfError::EmptySeries)?;

    let raw = match *policy {
        SizingPolicy::Atr { period } => mean_close_change(bars, period.get()),
        SizingPolicy::Percentage { percent } => last.midpoint() * (percent.get() / 100.0),
        SizingPolicy::Manual { value } => value,
        SizingPolicy::Traditional => last.midpoint() * (TRADITIONAL_PERCENT / 100.0),
    };

    debug!(
        "{} box size over {} bars: raw {} -> {}",
        policy.name(),
        bars.len(),
        raw,
        round_to_cents(raw)
    );

    BoxSize::new(raw)
}

/// Sum of absolute changes between consecutive closes in the trailing window,
/// divided by the window length (closes, not changes).
fn mean_close_change<T: OHLC>(bars: &[T], period: usize) -> f64 {
    let window = period.min(bars.len());
    if window < period {
        debug!(
            "ATR period {} clamped to series length {}",
            period, window
        );
    }

    if window < 2 {
        return 0.0;
    }

    let closes = &bars[bars.len() - window..];
    let sum: f64 = closes
        .windows(2)
        .map(|w| (w[1].close() - w[0].close()).abs())
        .sum();
    sum / window as f64
}
