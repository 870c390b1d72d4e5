//! Integration tests for box size determination.

use proptest::prelude::*;
use yapnf::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
        Self { o, h, l, c }
    }

    fn close_only(c: f64) -> Self {
        Self::new(c, c, c, c)
    }
}

impl OHLC for TestBar {
    fn open(&self) -> f64 {
        self.o
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

fn closes(values: &[f64]) -> Vec<TestBar> {
    values.iter().map(|&c| TestBar::close_only(c)).collect()
}

#[test]
fn test_flat_series_atr_is_degenerate() {
    let bars = closes(&[10.0, 10.0, 10.0, 10.0, 10.0]);
    let policy = SizingPolicy::atr(4).unwrap();
    assert!(matches!(
        compute_box_size(&bars, &policy),
        Err(PnfError::DegenerateBoxSize { .. })
    ));
}

#[test]
fn test_percentage_of_last_midpoint() {
    let bars = vec![
        TestBar::new(9.5, 10.0, 9.0, 9.8),
        TestBar::new(10.2, 11.0, 10.0, 10.8),
    ];
    let policy = SizingPolicy::percentage(1.0).unwrap();
    assert_eq!(compute_box_size(&bars, &policy).unwrap().get(), 0.11);
}

#[test]
fn test_negative_manual_value_rejected_before_construction() {
    assert!(matches!(
        SizingPolicy::manual(-1.0),
        Err(PnfError::InvalidPolicyParameter { field: "value", .. })
    ));

    // A hand-built policy is still checked before the series is looked at
    let policy = SizingPolicy::Manual { value: -1.0 };
    let empty: Vec<TestBar> = vec![];
    assert!(matches!(
        compute_box_size(&empty, &policy),
        Err(PnfError::InvalidPolicyParameter { .. })
    ));

    let engine = PnfEngine::default();
    assert!(matches!(
        engine.analyze(&closes(&[10.0, 11.0]), &policy),
        Err(PnfError::InvalidPolicyParameter { .. })
    ));
}

#[test]
fn test_traditional_is_one_percent() {
    let bars = vec![TestBar::new(250.0, 260.0, 240.0, 255.0)];
    let size = compute_box_size(&bars, &SizingPolicy::traditional()).unwrap();
    assert_eq!(size.get(), 2.5);

    let same = compute_box_size(&bars, &SizingPolicy::percentage(1.0).unwrap()).unwrap();
    assert_eq!(size, same);
}

#[test]
fn test_atr_uses_trailing_window() {
    // Last 3 closes: 20, 22, 26 -> changes 2 and 4 -> 6 over 3 closes
    let bars = closes(&[10.0, 10.5, 20.0, 22.0, 26.0]);
    let size = compute_box_size(&bars, &SizingPolicy::atr(3).unwrap()).unwrap();
    assert_eq!(size.get(), 2.0);
}

#[test]
fn test_atr_divides_by_window_length() {
    let bars = closes(&[10.0, 11.0, 13.0]);
    let size = compute_box_size(&bars, &SizingPolicy::atr(3).unwrap()).unwrap();
    assert_eq!(size.get(), 1.0);
}

#[test]
fn test_atr_period_longer_than_series() {
    // Clamped to all 3 closes: changes 1 and 2 over 3 closes
    let bars = closes(&[10.0, 11.0, 13.0]);
    let size = compute_box_size(&bars, &SizingPolicy::atr(14).unwrap()).unwrap();
    assert_eq!(size.get(), 1.0);
}

#[test]
fn test_atr_single_bar_is_degenerate() {
    let bars = closes(&[42.0]);
    assert!(matches!(
        compute_box_size(&bars, &SizingPolicy::atr(14).unwrap()),
        Err(PnfError::DegenerateBoxSize { .. })
    ));
}

#[test]
fn test_empty_series() {
    let empty: Vec<TestBar> = vec![];
    assert_eq!(
        compute_box_size(&empty, &SizingPolicy::traditional()),
        Err(PnfError::EmptySeries)
    );
}

#[test]
fn test_manual_value_below_one_cent_rejected() {
    assert!(matches!(
        SizingPolicy::manual(0.004),
        Err(PnfError::InvalidPolicyParameter { field: "value", .. })
    ));

    // Rejected as a parameter, not charted as a zero box
    let policy = SizingPolicy::Manual { value: 0.004 };
    assert!(matches!(
        compute_box_size(&closes(&[10.0]), &policy),
        Err(PnfError::InvalidPolicyParameter { .. })
    ));

    let size = compute_box_size(&closes(&[10.0]), &SizingPolicy::manual(0.01).unwrap()).unwrap();
    assert_eq!(size.get(), 0.01);
}

#[test]
fn test_policy_parameter_errors() {
    assert!(matches!(
        SizingPolicy::atr(0),
        Err(PnfError::InvalidPolicyParameter { field: "atr_period", .. })
    ));
    assert!(matches!(
        SizingPolicy::percentage(0.0),
        Err(PnfError::InvalidPolicyParameter { field: "percent", .. })
    ));
    assert!(SizingPolicy::percentage(100.0).is_ok());
    assert!(SizingPolicy::percentage(100.01).is_err());
}

#[test]
fn test_policy_json_shape() {
    let policy = SizingPolicy::atr(14).unwrap();
    let json = serde_json::to_string(&policy).unwrap();
    assert_eq!(json, r#"{"method":"atr","period":14}"#);

    let back: SizingPolicy = serde_json::from_str(&json).unwrap();
    assert_eq!(back, policy);

    assert!(serde_json::from_str::<SizingPolicy>(r#"{"method":"atr","period":0}"#).is_err());
}

// ============================================================
// PROPERTIES
// ============================================================

fn series() -> impl Strategy<Value = Vec<TestBar>> {
    prop::collection::vec((1.0f64..500.0, 0.0f64..20.0), 1..60).prop_map(|rows| {
        rows.into_iter()
            .map(|(close, spread)| TestBar::new(close, close + spread, close, close))
            .collect()
    })
}

fn any_policy() -> impl Strategy<Value = SizingPolicy> {
    prop_oneof![
        (1usize..30).prop_map(|period| SizingPolicy::atr(period).unwrap()),
        (0.01f64..100.0).prop_map(|percent| SizingPolicy::percentage(percent).unwrap()),
        (0.01f64..1000.0).prop_map(|value| SizingPolicy::manual(value).unwrap()),
        Just(SizingPolicy::traditional()),
    ]
}

proptest! {
    #[test]
    fn prop_box_size_is_already_rounded(bars in series(), policy in any_policy()) {
        match compute_box_size(&bars, &policy) {
            Ok(size) => {
                prop_assert!(size.get() > 0.0);
                prop_assert_eq!(round_to_cents(size.get()), size.get());
            }
            Err(err) => {
                prop_assert!(matches!(err, PnfError::DegenerateBoxSize { .. }), "unexpected error: {:?}", err);
            }
        }
    }

    #[test]
    fn prop_box_size_is_deterministic(bars in series(), policy in any_policy()) {
        prop_assert_eq!(compute_box_size(&bars, &policy), compute_box_size(&bars, &policy));
    }
}
