//! Integration tests for reversal pattern scanning.
//!
//! These tests drive the scanner both with hand-built box sequences and with
//! sequences produced by chart construction.

use proptest::prelude::*;
use yapnf::prelude::*;
use yapnf::chart::BoxKind::{Falling, Rising};
use yapnf::{patterns, report};

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(h: f64, l: f64, c: f64) -> Self {
        Self { h, l, c }
    }
}

impl OHLC for TestBar {
    fn open(&self) -> f64 {
        self.c
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }
}

fn seq(rows: &[(BoxKind, f64)]) -> Vec<PnfBox> {
    rows.iter()
        .enumerate()
        .map(|(i, &(kind, level))| PnfBox::new(i, kind, level))
        .collect()
}

/// Alternating one-box swings: up to 102, back to 101, up to 102, ...
fn swing_bars() -> Vec<TestBar> {
    vec![
        TestBar::new(100.5, 99.5, 100.0),
        TestBar::new(102.2, 100.2, 102.0),
        TestBar::new(101.8, 100.8, 101.0),
        TestBar::new(102.1, 101.2, 102.0),
        TestBar::new(101.8, 100.8, 101.0),
        TestBar::new(102.1, 101.2, 102.0),
    ]
}

#[test]
fn test_double_bottom_in_short_sequence() {
    let boxes = seq(&[(Rising, 100.0), (Falling, 100.0), (Rising, 101.0)]);
    let findings = patterns::detect_patterns(&boxes);
    assert_eq!(
        findings,
        vec![PatternFinding {
            kind: PatternKind::DoubleBottom,
            level: 100.0,
            index: 1,
        }]
    );
}

#[test]
fn test_triple_top() {
    let boxes = seq(&[
        (Rising, 100.0),
        (Falling, 99.0),
        (Rising, 100.0),
        (Falling, 98.0),
        (Rising, 100.0),
    ]);
    let findings = patterns::detect_patterns(&boxes);
    assert_eq!(
        findings,
        vec![PatternFinding {
            kind: PatternKind::TripleTop,
            level: 100.0,
            index: 2,
        }]
    );
}

#[test]
fn test_triple_bottom() {
    let boxes = seq(&[
        (Falling, 50.0),
        (Rising, 51.0),
        (Falling, 50.0),
        (Rising, 52.0),
        (Falling, 50.0),
    ]);
    let kinds: Vec<PatternKind> = patterns::detect_patterns(&boxes).iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![PatternKind::TripleBottom]);
}

#[test]
fn test_double_top() {
    let boxes = seq(&[
        (Rising, 100.0),
        (Falling, 101.0),
        (Rising, 101.0),
        (Falling, 100.0),
    ]);
    let findings = patterns::detect_patterns(&boxes);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, PatternKind::DoubleTop);
    assert_eq!((findings[0].index, findings[0].level), (2, 101.0));
}

#[test]
fn test_edges_never_match() {
    // Index 0 and the last index lack a neighbor on one side
    let boxes = seq(&[(Falling, 100.0), (Rising, 100.0)]);
    assert!(patterns::detect_patterns(&boxes).is_empty());

    let boxes = seq(&[(Rising, 100.0), (Falling, 100.0)]);
    assert!(patterns::detect_patterns(&boxes).is_empty());
}

#[test]
fn test_triple_top_on_constructed_chart() {
    let chart = construct(
        &swing_bars(),
        BoxSize::new(1.0).unwrap(),
        ReversalBoxes::new(1).unwrap(),
        BarResolution::ExtensionFirst,
    )
    .unwrap();

    assert_eq!(
        chart.boxes().iter().map(|b| (b.kind, b.level)).collect::<Vec<_>>(),
        vec![
            (Rising, 101.0),
            (Rising, 102.0),
            (Falling, 101.0),
            (Rising, 102.0),
            (Falling, 101.0),
            (Rising, 102.0),
        ]
    );

    let findings = patterns::detect_patterns(chart.boxes());
    assert_eq!(
        findings,
        vec![PatternFinding {
            kind: PatternKind::TripleTop,
            level: 102.0,
            index: 3,
        }]
    );
}

#[test]
fn test_engine_analyze_reports_findings() {
    let engine = EngineBuilder::new().reversal(1).build().unwrap();
    let analysis = engine
        .analyze(&swing_bars(), &SizingPolicy::manual(1.0).unwrap())
        .unwrap();

    assert_eq!(analysis.findings.len(), 1);
    assert_eq!(
        report::describe_findings(&analysis.findings),
        vec!["Pattern detected: Triple Top at value 102".to_string()]
    );

    // Filtering the rules out leaves nothing to report
    let doubles = EngineBuilder::new()
        .reversal(1)
        .only_patterns([PatternKind::DoubleTop, PatternKind::DoubleBottom])
        .build()
        .unwrap();
    let analysis = doubles
        .analyze(&swing_bars(), &SizingPolicy::manual(1.0).unwrap())
        .unwrap();
    assert_eq!(
        report::describe_findings(&analysis.findings),
        vec![report::NO_PATTERNS.to_string()]
    );
}

#[test]
fn test_findings_serialize() {
    let finding = PatternFinding {
        kind: PatternKind::TripleBottom,
        level: 42.5,
        index: 7,
    };
    let json = serde_json::to_value(finding).unwrap();
    assert_eq!(json["kind"], "triple_bottom");
    assert_eq!(json["level"], 42.5);
    assert_eq!(json["index"], 7);
}

// ============================================================
// PROPERTIES
// ============================================================

fn box_sequence() -> impl Strategy<Value = Vec<PnfBox>> {
    prop::collection::vec((any::<bool>(), 95i32..105), 0..40).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (rising, level))| {
                let kind = if rising { Rising } else { Falling };
                PnfBox::new(i, kind, level as f64)
            })
            .collect()
    })
}

fn sorted(findings: &[PatternFinding]) -> Vec<(usize, PatternKind)> {
    let mut keys: Vec<(usize, PatternKind)> = findings.iter().map(|f| (f.index, f.kind)).collect();
    keys.sort_by_key(|&(index, kind)| (index, kind as u8));
    keys
}

proptest! {
    #[test]
    fn prop_flipped_kinds_mirror_findings(boxes in box_sequence()) {
        let flipped: Vec<PnfBox> = boxes
            .iter()
            .map(|b| PnfBox::new(b.column, b.kind.opposite(), b.level))
            .collect();

        let expected: Vec<PatternFinding> = patterns::detect_patterns(&boxes)
            .into_iter()
            .map(|f| PatternFinding { kind: f.kind.mirrored(), ..f })
            .collect();

        let found = patterns::detect_patterns(&flipped);
        prop_assert_eq!(sorted(&found), sorted(&expected));
        for finding in &found {
            prop_assert_eq!(finding.level, boxes[finding.index].level);
        }
    }

    #[test]
    fn prop_findings_stay_inside_the_sequence(boxes in box_sequence()) {
        for finding in patterns::detect_patterns(&boxes) {
            let reach = finding.kind.rule().reach();
            prop_assert!(finding.index >= reach);
            prop_assert!(finding.index + reach < boxes.len());
            prop_assert_eq!(finding.level, boxes[finding.index].level);
        }
    }

    #[test]
    fn prop_findings_follow_sweep_order(boxes in box_sequence()) {
        let findings = patterns::detect_patterns(&boxes);
        let rank = |kind: PatternKind| PatternKind::ALL.iter().position(|k| *k == kind);
        for pair in findings.windows(2) {
            let (a, b) = (rank(pair[0].kind), rank(pair[1].kind));
            prop_assert!(a < b || (a == b && pair[0].index < pair[1].index));
        }
    }
}
