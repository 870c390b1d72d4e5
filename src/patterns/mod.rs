//! Reversal pattern scanning over a box sequence
//!
//! The scanner works purely on `(kind, level)` pairs by position and never
//! looks at the bars again. Rules are data ([`rules`]); a new pattern kind is a
//! new table row.
//!
//! # Pattern Kinds
//!
//! - **Double Top / Double Bottom**: center box flanked by two boxes of the
//!   opposite kind, level equal to the box before it.
//! - **Triple Top / Triple Bottom**: same-kind boxes two positions away on both
//!   sides at the center's level, opposite-kind boxes directly adjacent.

pub mod rules;

pub use rules::{PatternRule, DOUBLE_BOTTOM, DOUBLE_TOP, RULES, TRIPLE_BOTTOM, TRIPLE_TOP};

use crate::chart::PnfBox;

/// Named reversal pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    DoubleTop,
    DoubleBottom,
    TripleTop,
    TripleBottom,
}

impl PatternKind {
    /// All kinds in sweep order
    pub const ALL: [PatternKind; 4] = [
        PatternKind::DoubleTop,
        PatternKind::DoubleBottom,
        PatternKind::TripleTop,
        PatternKind::TripleBottom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::DoubleTop => "Double Top",
            PatternKind::DoubleBottom => "Double Bottom",
            PatternKind::TripleTop => "Triple Top",
            PatternKind::TripleBottom => "Triple Bottom",
        }
    }

    /// The kind matched when every box's direction is flipped
    pub fn mirrored(self) -> Self {
        match self {
            PatternKind::DoubleTop => PatternKind::DoubleBottom,
            PatternKind::DoubleBottom => PatternKind::DoubleTop,
            PatternKind::TripleTop => PatternKind::TripleBottom,
            PatternKind::TripleBottom => PatternKind::TripleTop,
        }
    }

    pub fn rule(self) -> &'static PatternRule {
        match self {
            PatternKind::DoubleTop => &DOUBLE_TOP,
            PatternKind::DoubleBottom => &DOUBLE_BOTTOM,
            PatternKind::TripleTop => &TRIPLE_TOP,
            PatternKind::TripleBottom => &TRIPLE_BOTTOM,
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A pattern found in a box sequence
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PatternFinding {
    pub kind: PatternKind,
    /// Level of the pattern's center box
    pub level: f64,
    /// Position of the center box in the sequence
    pub index: usize,
}

/// Sweep `boxes` once per rule, left to right, in the order the rules are given.
///
/// Findings are not deduplicated: one index may satisfy several rules.
pub fn scan(boxes: &[PnfBox], rules: &[&PatternRule]) -> Vec<PatternFinding> {
    let mut findings = Vec::new();

    for rule in rules {
        let reach = rule.reach();
        if boxes.len() <= 2 * reach {
            continue;
        }
        for index in reach..boxes.len() - reach {
            if rule.matches(boxes, index) {
                findings.push(PatternFinding {
                    kind: rule.kind,
                    level: boxes[index].level,
                    index,
                });
            }
        }
    }

    findings
}

/// Scan with every builtin rule
pub fn detect_patterns(boxes: &[PnfBox]) -> Vec<PatternFinding> {
    scan(boxes, &RULES)
}
