//! Analysis configuration
//!
//! One immutable value carries every user choice (sizing policy, reversal,
//! same-bar resolution, enabled patterns) into the engine. It can be written
//! as TOML:
//!
//! ```toml
//! reversal = 3
//! resolution = "extension_first"
//! patterns = ["double_top", "triple_top"]
//!
//! [sizing]
//! method = "atr"
//! period = 14
//! ```

use std::path::Path;

use crate::{
    chart::BarResolution, patterns::PatternKind, sizing::SizingPolicy, EngineBuilder, PnfEngine,
    PnfError, Result, ReversalBoxes,
};

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub reversal: ReversalBoxes,
    pub resolution: BarResolution,
    pub validate_data: bool,
    /// Pattern kinds to scan for; all when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<PatternKind>>,
    /// Must stay the last field: it serializes as a trailing `[sizing]` table
    pub sizing: SizingPolicy,
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PnfError::InvalidConfig(e.to_string()))?;
        config.sizing.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PnfError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| PnfError::InvalidConfig(e.to_string()))
    }

    /// Build the engine this configuration describes
    pub fn engine(&self) -> Result<PnfEngine> {
        EngineBuilder::from_config(self).build()
    }
}
