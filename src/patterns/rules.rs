//! Pattern rule table
//!
//! Each reversal pattern is a center box plus fixed-offset neighbors. A rule
//! lists the required kind at each offset and the offsets whose level must
//! equal the center's level.

use super::PatternKind;
use crate::chart::{BoxKind, PnfBox};

/// Fixed-offset signature of one pattern kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    pub kind: PatternKind,
    /// Required kind of the center box
    pub center: BoxKind,
    /// `(offset, kind)` pairs relative to the center
    pub neighbors: &'static [(isize, BoxKind)],
    /// Offsets whose level must equal the center level
    pub same_level: &'static [isize],
}

use BoxKind::{Falling, Rising};

pub static DOUBLE_TOP: PatternRule = PatternRule {
    kind: PatternKind::DoubleTop,
    center: Rising,
    neighbors: &[(-1, Falling), (1, Falling)],
    same_level: &[-1],
};

pub static DOUBLE_BOTTOM: PatternRule = PatternRule {
    kind: PatternKind::DoubleBottom,
    center: Falling,
    neighbors: &[(-1, Rising), (1, Rising)],
    same_level: &[-1],
};

pub static TRIPLE_TOP: PatternRule = PatternRule {
    kind: PatternKind::TripleTop,
    center: Rising,
    neighbors: &[(-2, Rising), (-1, Falling), (1, Falling), (2, Rising)],
    same_level: &[-2, 2],
};

pub static TRIPLE_BOTTOM: PatternRule = PatternRule {
    kind: PatternKind::TripleBottom,
    center: Falling,
    neighbors: &[(-2, Falling), (-1, Rising), (1, Rising), (2, Falling)],
    same_level: &[-2, 2],
};

/// All builtin rules in sweep order: doubles before triples
pub static RULES: [&PatternRule; 4] = [&DOUBLE_TOP, &DOUBLE_BOTTOM, &TRIPLE_TOP, &TRIPLE_BOTTOM];

impl PatternRule {
    /// Largest neighbor distance on either side
    pub fn reach(&self) -> usize {
        self.neighbors
            .iter()
            .map(|(offset, _)| offset.unsigned_abs())
            .chain(self.same_level.iter().map(|offset| offset.unsigned_abs()))
            .max()
            .unwrap_or(0)
    }

    /// Whether the boxes around `index` match this rule.
    ///
    /// Indices without the full set of neighbors never match.
    pub fn matches(&self, boxes: &[PnfBox], index: usize) -> bool {
        let reach = self.reach();
        if index < reach || index + reach >= boxes.len() {
            return false;
        }

        let center = &boxes[index];
        if center.kind != self.center {
            return false;
        }

        let at = |offset: isize| &boxes[index.wrapping_add_signed(offset)];

        self.neighbors.iter().all(|&(offset, kind)| at(offset).kind == kind)
            && self.same_level.iter().all(|&offset| at(offset).level == center.level)
    }
}
