//! Point-and-Figure chart construction
//!
//! [`construct`] folds a series into an ordered box sequence using the
//! high/low method: each bar's high and low (never its close) drive the
//! [`state`] machine. Box levels are integer multiples of the box size
//! measured from zero.

pub mod state;

use log::debug;

use crate::{sizing::round_to_cents, BoxSize, PnfError, Result, ReversalBoxes, OHLC};
use state::{box_floor, step, BoxSpan, Move, TrendState};

/// Direction of a box/column (historically X and O)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BoxKind {
    Rising,
    Falling,
}

impl BoxKind {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            BoxKind::Rising => BoxKind::Falling,
            BoxKind::Falling => BoxKind::Rising,
        }
    }

    /// Classic chart symbol
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            BoxKind::Rising => 'X',
            BoxKind::Falling => 'O',
        }
    }

    #[inline]
    pub fn is_rising(self) -> bool {
        matches!(self, BoxKind::Rising)
    }
}

/// Same-bar extension/reversal tie-break
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarResolution {
    /// A bar that extends the current column cannot also reverse it
    #[default]
    ExtensionFirst,
    /// After extending, the bar's opposite extreme may still reverse the column
    ExtendThenReverse,
}

/// One charted box
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PnfBox {
    /// 0-based column position, left to right
    pub column: usize,
    pub kind: BoxKind,
    /// Price the box stands for
    pub level: f64,
}

impl PnfBox {
    pub fn new(column: usize, kind: BoxKind, level: f64) -> Self {
        Self {
            column,
            kind,
            level,
        }
    }
}

/// Summary of one column
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Column {
    pub index: usize,
    pub kind: BoxKind,
    /// Lowest box level in the column
    pub low: f64,
    /// Highest box level in the column
    pub high: f64,
    pub box_count: usize,
    /// Index of the bar that opened the column
    pub first_bar: usize,
    /// Index of the last bar that added boxes to the column
    pub last_bar: usize,
}

/// A constructed Point-and-Figure chart
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    box_size: BoxSize,
    reversal: ReversalBoxes,
    boxes: Vec<PnfBox>,
    columns: Vec<Column>,
}

impl Chart {
    pub fn box_size(&self) -> BoxSize {
        self.box_size
    }

    pub fn reversal(&self) -> ReversalBoxes {
        self.reversal
    }

    /// All boxes in construction order (column by column, bottom-up for
    /// rising columns, top-down for falling ones)
    pub fn boxes(&self) -> &[PnfBox] {
        &self.boxes
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Boxes belonging to column `index`
    pub fn column_boxes(&self, index: usize) -> &[PnfBox] {
        let start = self.boxes.partition_point(|b| b.column < index);
        let end = self.boxes.partition_point(|b| b.column <= index);
        &self.boxes[start..end]
    }

    /// Direction of the last column, if any
    pub fn trend(&self) -> Option<BoxKind> {
        self.columns.last().map(|c| c.kind)
    }

    /// Box number of a level on this chart's scale
    pub fn box_number(&self, level: f64) -> i64 {
        (level / self.box_size.get()).round() as i64
    }
}

/// Column being accumulated, in box numbers
#[derive(Debug, Clone, Copy)]
struct ColumnRun {
    kind: BoxKind,
    from: i64,
    to: i64,
    first_bar: usize,
    last_bar: usize,
}

/// Fold `bars` into a chart.
///
/// Pure function of its arguments. The box size and reversal are already
/// validated by their types; an empty series is rejected.
pub fn construct<T: OHLC>(
    bars: &[T],
    box_size: BoxSize,
    reversal: ReversalBoxes,
    resolution: BarResolution,
) -> Result<Chart> {
    let first = bars.first().ok_or(PnfError::EmptySeries)?;
    let size = box_size.get();
    let reversal_boxes = reversal.get() as i64;

    let mut state = TrendState::NoTrend {
        anchor: box_floor(first.close(), size),
    };
    let mut runs: Vec<ColumnRun> = Vec::new();

    for (i, bar) in bars.iter().enumerate() {
        let transition = step(state, BoxSpan::of(bar, size), reversal_boxes, resolution);
        for mv in transition.moves() {
            match mv {
                Move::Open { kind, from, to } => {
                    debug!(
                        "bar {}: column {} {:?} opens {} -> {}",
                        i,
                        runs.len(),
                        kind,
                        level_of(from, size),
                        level_of(to, size)
                    );
                    runs.push(ColumnRun {
                        kind,
                        from,
                        to,
                        first_bar: i,
                        last_bar: i,
                    });
                }
                Move::Extend { to } => {
                    if let Some(run) = runs.last_mut() {
                        run.to = to;
                        run.last_bar = i;
                    }
                }
            }
        }
        state = transition.next;
    }

    Ok(materialize(&runs, box_size, reversal))
}

fn materialize(runs: &[ColumnRun], box_size: BoxSize, reversal: ReversalBoxes) -> Chart {
    let size = box_size.get();
    let total: usize = runs.iter().map(|r| (r.to - r.from).unsigned_abs() as usize + 1).sum();
    let mut boxes = Vec::with_capacity(total);
    let mut columns = Vec::with_capacity(runs.len());

    for (index, run) in runs.iter().enumerate() {
        let (low, high) = (run.from.min(run.to), run.from.max(run.to));
        boxes.extend((0..=high - low).map(|offset| {
            let number = if run.kind.is_rising() { low + offset } else { high - offset };
            PnfBox::new(index, run.kind, level_of(number, size))
        }));

        columns.push(Column {
            index,
            kind: run.kind,
            low: level_of(low, size),
            high: level_of(high, size),
            box_count: (high - low) as usize + 1,
            first_bar: run.first_bar,
            last_bar: run.last_bar,
        });
    }

    Chart {
        box_size,
        reversal,
        boxes,
        columns,
    }
}

#[inline]
fn level_of(number: i64, box_size: f64) -> f64 {
    round_to_cents(number as f64 * box_size)
}
