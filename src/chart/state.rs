//! Column/reversal state machine (high/low method)
//!
//! Prices are handled as box numbers: box `n` stands for the price
//! `n * box_size`. The transition function is pure so each rule can be
//! exercised without building a chart.

use super::{BarResolution, BoxKind};
use crate::OHLC;

/// Tolerance applied before snapping a price to a box number, so that a high
/// of exactly `n * box_size` is not lost to float noise.
const SNAP_EPSILON: f64 = 1e-9;

/// Highest box fully reached by `price`
#[inline]
pub fn box_floor(price: f64, box_size: f64) -> i64 {
    (price / box_size + SNAP_EPSILON).floor() as i64
}

/// Lowest box fully reached by `price`
#[inline]
pub fn box_ceil(price: f64, box_size: f64) -> i64 {
    (price / box_size - SNAP_EPSILON).ceil() as i64
}

/// A bar's high and low expressed as box numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSpan {
    pub high: i64,
    pub low: i64,
}

impl BoxSpan {
    pub fn of<T: OHLC>(bar: &T, box_size: f64) -> Self {
        Self {
            high: box_floor(bar.high(), box_size),
            low: box_ceil(bar.low(), box_size),
        }
    }
}

/// Construction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendState {
    /// No column yet; `anchor` is the reference box taken from the first close
    NoTrend { anchor: i64 },
    /// Current column is rising and tops out at box `top`
    Rising { top: i64 },
    /// Current column is falling and bottoms out at box `bottom`
    Falling { bottom: i64 },
}

impl TrendState {
    pub fn kind(self) -> Option<BoxKind> {
        match self {
            TrendState::NoTrend { .. } => None,
            TrendState::Rising { .. } => Some(BoxKind::Rising),
            TrendState::Falling { .. } => Some(BoxKind::Falling),
        }
    }
}

/// Chart mutation produced by one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Grow the current column through box `to`
    Extend { to: i64 },
    /// Start a new column of `kind` covering boxes `from..=to`
    Open { kind: BoxKind, from: i64, to: i64 },
}

/// Result of feeding one bar to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: TrendState,
    moves: [Option<Move>; 2],
}

impl Transition {
    fn stay(state: TrendState) -> Self {
        Self {
            next: state,
            moves: [None, None],
        }
    }

    fn single(next: TrendState, first: Move) -> Self {
        Self {
            next,
            moves: [Some(first), None],
        }
    }

    /// Moves in the order they must be applied
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves.iter().flatten().copied()
    }
}

/// Advance the state machine by one bar.
///
/// The extending extreme is evaluated before the reversing one. Under
/// [`BarResolution::ExtensionFirst`] a bar that extends (or opens) a column
/// never also reverses it.
pub fn step(
    state: TrendState,
    span: BoxSpan,
    reversal: i64,
    resolution: BarResolution,
) -> Transition {
    match state {
        TrendState::NoTrend { anchor } => {
            if span.high > anchor {
                let opened = Move::Open {
                    kind: BoxKind::Rising,
                    from: anchor + 1,
                    to: span.high,
                };
                follow_through(TrendState::Rising { top: span.high }, opened, span, reversal, resolution)
            } else if span.low < anchor {
                let opened = Move::Open {
                    kind: BoxKind::Falling,
                    from: anchor - 1,
                    to: span.low,
                };
                follow_through(
                    TrendState::Falling { bottom: span.low },
                    opened,
                    span,
                    reversal,
                    resolution,
                )
            } else {
                Transition::stay(state)
            }
        }
        TrendState::Rising { top } if span.high > top => follow_through(
            TrendState::Rising { top: span.high },
            Move::Extend { to: span.high },
            span,
            reversal,
            resolution,
        ),
        TrendState::Falling { bottom } if span.low < bottom => follow_through(
            TrendState::Falling { bottom: span.low },
            Move::Extend { to: span.low },
            span,
            reversal,
            resolution,
        ),
        _ => match reverse(state, span, reversal) {
            Some((next, opened)) => Transition::single(next, opened),
            None => Transition::stay(state),
        },
    }
}

/// After an extension, optionally let the opposite extreme reverse the column.
fn follow_through(
    next: TrendState,
    first: Move,
    span: BoxSpan,
    reversal: i64,
    resolution: BarResolution,
) -> Transition {
    let mut transition = Transition::single(next, first);
    if resolution == BarResolution::ExtendThenReverse {
        if let Some((after, opened)) = reverse(next, span, reversal) {
            transition.next = after;
            transition.moves[1] = Some(opened);
        }
    }
    transition
}

/// Reversal check against the current column's extreme
fn reverse(state: TrendState, span: BoxSpan, reversal: i64) -> Option<(TrendState, Move)> {
    match state {
        TrendState::Rising { top } if top - span.low >= reversal => Some((
            TrendState::Falling { bottom: span.low },
            Move::Open {
                kind: BoxKind::Falling,
                from: top - 1,
                to: span.low,
            },
        )),
        TrendState::Falling { bottom } if span.high - bottom >= reversal => Some((
            TrendState::Rising { top: span.high },
            Move::Open {
                kind: BoxKind::Rising,
                from: bottom + 1,
                to: span.high,
            },
        )),
        _ => None,
    }
}
