//! # YAPNF - Yet Another Point-and-Figure engine
//!
//! Box sizing, Point-and-Figure chart construction and reversal pattern
//! scanning for daily OHLC series.
//!
//! ## Quick Start
//!
//! ```rust
//! use yapnf::prelude::*;
//!
//! // Define your OHLC data
//! struct Day { o: f64, h: f64, l: f64, c: f64 }
//!
//! impl OHLC for Day {
//!     fn open(&self) -> f64 { self.o }
//!     fn high(&self) -> f64 { self.h }
//!     fn low(&self) -> f64 { self.l }
//!     fn close(&self) -> f64 { self.c }
//! }
//!
//! // Engine with the classic 3-box reversal and all four reversal patterns
//! let engine = EngineBuilder::new().reversal(3).build().unwrap();
//!
//! let days = vec![
//!     Day { o: 100.0, h: 100.4, l: 99.7, c: 100.0 },
//!     Day { o: 100.0, h: 104.2, l: 99.9, c: 104.0 },
//! ];
//! let policy = SizingPolicy::manual(1.0).unwrap();
//! let analysis = engine.analyze(&days, &policy).unwrap();
//! assert_eq!(analysis.chart.columns().len(), 1);
//! ```

pub mod chart;
pub mod config;
pub mod params;
pub mod patterns;
pub mod report;
pub mod sizing;

pub mod prelude {
    pub use crate::{
        // Chart construction
        chart::{construct, BarResolution, BoxKind, Chart, Column, PnfBox},
        // Configuration
        config::AnalysisConfig,
        // Parameters
        params::{ParamMeta, ParamType},
        // Pattern scanning
        patterns::{PatternFinding, PatternKind, PatternRule},
        // Sizing
        sizing::{compute_box_size, round_to_cents, SizingPolicy},
        // Parallel
        analyze_parallel,
        // Engine
        Analysis,
        AnalysisError,
        AnalysisResult,
        // Types
        Bar,
        BoxSize,
        EngineBuilder,
        EngineConfig,
        OHLCExt,
        Percent,
        Period,
        PnfEngine,
        // Errors
        PnfError,
        Result,
        ReversalBoxes,
        OHLC,
    };
}

use chart::{BarResolution, Chart, PnfBox};
use patterns::{PatternFinding, PatternKind, PatternRule};
use sizing::SizingPolicy;

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PnfError>;

/// Errors raised while sizing boxes or building a chart
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PnfError {
    #[error("Invalid {field} = {value}: {reason}")]
    InvalidPolicyParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Degenerate box size {value}: box size must be > 0")]
    DegenerateBoxSize { value: f64 },

    #[error("Empty series: at least one bar is required")]
    EmptySeries,

    #[error("Invalid reversal = {value}: must be at least 1 box")]
    InvalidReversal { value: usize },

    #[error("Invalid OHLC at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("Series out of chronological order at index {index}")]
    UnorderedSeries { index: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Lookback period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PnfError::InvalidPolicyParameter {
                field: "period",
                value: 0.0,
                reason: "must be >= 1",
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

/// Percentage of price in the half-open range (0, 100]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(f64);

impl Percent {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 || value > 100.0 {
            return Err(PnfError::InvalidPolicyParameter {
                field: "percent",
                value,
                reason: "must be in (0, 100]",
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Percent {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Percent {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Percent::new(value).map_err(serde::de::Error::custom)
    }
}

/// Price increment represented by one box.
///
/// Always rounded to 2 decimal places and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BoxSize(f64);

impl BoxSize {
    /// Round `value` to cents and reject anything that is not > 0 afterwards
    pub fn new(value: f64) -> Result<Self> {
        let rounded = sizing::round_to_cents(value);
        if !rounded.is_finite() || rounded <= 0.0 {
            return Err(PnfError::DegenerateBoxSize { value: rounded });
        }
        Ok(Self(rounded))
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for BoxSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl serde::Serialize for BoxSize {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for BoxSize {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        BoxSize::new(value).map_err(serde::de::Error::custom)
    }
}

/// Number of boxes price must retrace before a new column starts (>= 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReversalBoxes(usize);

impl ReversalBoxes {
    /// The conventional 3-box reversal
    pub const CLASSIC: ReversalBoxes = ReversalBoxes(3);

    pub fn new(value: usize) -> Result<Self> {
        if value < 1 {
            return Err(PnfError::InvalidReversal { value });
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ReversalBoxes {
    fn default() -> Self {
        Self::CLASSIC
    }
}

impl serde::Serialize for ReversalBoxes {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for ReversalBoxes {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        ReversalBoxes::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core OHLC data trait
pub trait OHLC {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn date(&self) -> Option<chrono::NaiveDate> {
        None
    }
}

/// Extension trait with computed properties for OHLC data
pub trait OHLCExt: OHLC {
    /// Midpoint of the bar's range, the reference price for percentage sizing
    #[inline]
    fn midpoint(&self) -> f64 {
        (self.high() + self.low()) / 2.0
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Validate OHLC data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(PnfError::InvalidBar {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(PnfError::InvalidBar {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if prices.iter().any(|p| *p <= 0.0) {
            return Err(PnfError::InvalidBar {
                index: 0,
                reason: "non-positive price",
            });
        }
        if self.high() < self.low() {
            return Err(PnfError::InvalidBar {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: OHLC> OHLCExt for T {}

/// One daily observation as delivered by a data source.
///
/// Field aliases accept the capitalised `Date,Open,High,Low,Close` headers most
/// market-data exports use.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    #[serde(alias = "Date")]
    pub date: chrono::NaiveDate,
    #[serde(alias = "Open")]
    pub open: f64,
    #[serde(alias = "High")]
    pub high: f64,
    #[serde(alias = "Low")]
    pub low: f64,
    #[serde(alias = "Close")]
    pub close: f64,
}

impl Bar {
    pub fn new(date: chrono::NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }
}

impl OHLC for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn date(&self) -> Option<chrono::NaiveDate> {
        Some(self.date)
    }
}

// ============================================================
// PNF ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub reversal: ReversalBoxes,
    pub resolution: BarResolution,
    pub validate_data: bool,
    pub pattern_filter: Option<Vec<PatternKind>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reversal: ReversalBoxes::CLASSIC,
            resolution: BarResolution::default(),
            validate_data: false,
            pattern_filter: None,
        }
    }
}

/// Output of a full sizing → construction → scanning pass
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub box_size: BoxSize,
    pub chart: Chart,
    pub findings: Vec<PatternFinding>,
}

/// Main Point-and-Figure engine.
///
/// Holds only immutable configuration; every call recomputes from the bars it
/// is given.
#[derive(Debug, Clone)]
pub struct PnfEngine {
    rules: Vec<&'static PatternRule>,
    config: EngineConfig,
}

impl Default for PnfEngine {
    fn default() -> Self {
        Self {
            rules: patterns::RULES.to_vec(),
            config: EngineConfig::default(),
        }
    }
}

impl PnfEngine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pattern rules in the order they are swept
    pub fn rules(&self) -> &[&'static PatternRule] {
        &self.rules
    }

    /// Compute the box size for `bars` under `policy`.
    pub fn box_size<T: OHLC>(&self, bars: &[T], policy: &SizingPolicy) -> Result<BoxSize> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }
        sizing::compute_box_size(bars, policy)
    }

    /// Fold `bars` into a Point-and-Figure chart.
    pub fn construct<T: OHLC>(&self, bars: &[T], box_size: BoxSize) -> Result<Chart> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }
        chart::construct(bars, box_size, self.config.reversal, self.config.resolution)
    }

    /// Scan a box sequence with the enabled pattern rules.
    pub fn detect_patterns(&self, boxes: &[PnfBox]) -> Vec<PatternFinding> {
        patterns::scan(boxes, &self.rules)
    }

    /// Size, construct and scan in one pass.
    pub fn analyze<T: OHLC>(&self, bars: &[T], policy: &SizingPolicy) -> Result<Analysis> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }
        let box_size = sizing::compute_box_size(bars, policy)?;
        let chart = chart::construct(bars, box_size, self.config.reversal, self.config.resolution)?;
        let findings = self.detect_patterns(chart.boxes());

        log::info!(
            "{} bars -> box size {} ({}), {} columns, {} boxes, {} patterns",
            bars.len(),
            box_size,
            policy.name(),
            chart.columns().len(),
            chart.boxes().len(),
            findings.len()
        );

        Ok(Analysis {
            box_size,
            chart,
            findings,
        })
    }
}

fn validate_bars<T: OHLC>(bars: &[T]) -> Result<()> {
    let mut previous: Option<chrono::NaiveDate> = None;
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            PnfError::InvalidBar { reason, .. } => PnfError::InvalidBar { index: i, reason },
            other => other,
        })?;
        if let Some(date) = bar.date() {
            if previous.is_some_and(|prev| date <= prev) {
                return Err(PnfError::UnorderedSeries { index: i });
            }
            previous = Some(date);
        }
    }
    Ok(())
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PnfEngine instances
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    reversal: Option<usize>,
    resolution: BarResolution,
    validate_data: bool,
    pattern_filter: Option<Vec<PatternKind>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration
    pub fn from_config(config: &config::AnalysisConfig) -> Self {
        Self {
            reversal: Some(config.reversal.get()),
            resolution: config.resolution,
            validate_data: config.validate_data,
            pattern_filter: config.patterns.clone(),
        }
    }

    /// Number of boxes needed for a reversal (validated in `build`)
    pub fn reversal(mut self, boxes: usize) -> Self {
        self.reversal = Some(boxes);
        self
    }

    /// Same-bar extension/reversal policy
    pub fn resolution(mut self, resolution: BarResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Enable/disable bar validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.validate_data = enable;
        self
    }

    /// Scan for the given pattern kinds only
    pub fn only_patterns(mut self, kinds: impl IntoIterator<Item = PatternKind>) -> Self {
        self.pattern_filter = Some(kinds.into_iter().collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PnfEngine> {
        let reversal = match self.reversal {
            Some(boxes) => ReversalBoxes::new(boxes)?,
            None => ReversalBoxes::default(),
        };

        let rules = patterns::RULES
            .iter()
            .copied()
            .filter(|rule| {
                self.pattern_filter
                    .as_ref()
                    .map_or(true, |kinds| kinds.contains(&rule.kind))
            })
            .collect();

        Ok(PnfEngine {
            rules,
            config: EngineConfig {
                reversal,
                resolution: self.resolution,
                validate_data: self.validate_data,
                pattern_filter: self.pattern_filter,
            },
        })
    }
}

// ============================================================
// PARALLEL ANALYSIS
// ============================================================

use rayon::prelude::*;

/// Result of analysing a single instrument
#[derive(Debug)]
pub struct AnalysisResult {
    pub symbol: String,
    pub analysis: Analysis,
}

/// Error from analysing a single instrument
#[derive(Debug)]
pub struct AnalysisError {
    pub symbol: String,
    pub error: PnfError,
}

/// Analyse several independent instruments in parallel with one policy
pub fn analyze_parallel<'a, T, I>(
    engine: &PnfEngine,
    policy: &SizingPolicy,
    instruments: I,
) -> (Vec<AnalysisResult>, Vec<AnalysisError>)
where
    T: OHLC + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .analyze(bars, policy)
                .map(|analysis| AnalysisResult {
                    symbol: symbol.to_string(),
                    analysis,
                })
                .map_err(|error| {
                    log::warn!("{}: {}", symbol, error);
                    AnalysisError {
                        symbol: symbol.to_string(),
                        error,
                    }
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
