//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Disabled gates never reject, whatever the setup looks like
//! 2. Position size is the largest whole share count within the risk budget
//! 3. Scale-out split: first half + remainder == original size
//! 4. R-multiple sign matches P&L sign for any price path
//! 5. Indicators carry no look-ahead

use chrono::NaiveDate;
use proptest::prelude::*;
use orblab_core::domain::{Bar, ConsolidationBase, EntryPlan, OpeningRange, Side};
use orblab_core::entry::position_size;
use orblab_core::exit::{EmaTrailExit, ExitRule, ScaleOutExit};
use orblab_core::gates::{
    BaseTightnessGate, GateChain, RangeWidthGate, SetupContext, SetupGate, VwapProximityGate,
};
use orblab_core::indicators::{Atr, Ema, Indicator, IndicatorValues, Vwap, EMA_FAST};
use orblab_core::OrbParams;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_setup() -> impl Strategy<Value = (OpeningRange, ConsolidationBase, f64)> {
    (
        arb_price(),
        0.0..5.0_f64,
        0.0..10.0_f64,
        prop::option::of(0.0..5.0_f64),
        0.001..3.0_f64,
    )
        .prop_map(|(low, or_width, base_width, distance, atr)| {
            (
                OpeningRange {
                    high: low + or_width,
                    low,
                },
                ConsolidationBase {
                    high: low + base_width,
                    low,
                    mean_vwap_distance: distance,
                },
                atr,
            )
        })
}

/// Random minute bars as (open, high, low, close) steps from a start price.
fn arb_path(len: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((-1.0..1.0_f64, 0.0..0.8_f64, 0.0..0.8_f64), 1..len).prop_map(
        |steps| {
            let start = NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, 46, 0)
                .unwrap();
            let mut close = 100.5;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (step, up, down))| {
                    let open = close;
                    close = (close + step).max(1.0);
                    Bar::new(
                        start + chrono::Duration::minutes(i as i64),
                        open,
                        open.max(close) + up,
                        (open.min(close) - down).max(0.5),
                        close,
                        1000.0,
                    )
                })
                .collect()
        },
    )
}

fn plan_for(side: Side, shares: u64, risk_per_share: f64, first_bar: &Bar) -> EntryPlan {
    let entry_price = 100.5;
    let stop_price = entry_price - side.sign() * risk_per_share;
    EntryPlan {
        side,
        entry_price,
        entry_time: first_bar.timestamp,
        entry_index: 0,
        stop_price,
        vwap_at_entry: stop_price,
        shares,
        risk_per_share,
        target_r1: entry_price + side.sign() * 2.0 * risk_per_share,
        target_r2: entry_price + side.sign() * 3.0 * risk_per_share,
        atr: 0.25,
        opening_range: OpeningRange {
            high: 100.5,
            low: 100.0,
        },
        base: ConsolidationBase {
            high: 100.4,
            low: 100.1,
            mean_vwap_distance: None,
        },
    }
}

// ── 1. Disabled gates never reject ───────────────────────────────────

proptest! {
    #[test]
    fn disabled_gates_never_reject((or, base, atr) in arb_setup()) {
        let setup = SetupContext { opening_range: &or, base: &base, atr };
        let gates: Vec<Box<dyn SetupGate>> = vec![
            Box::new(RangeWidthGate::new(None, None)),
            Box::new(BaseTightnessGate::new(None)),
            Box::new(VwapProximityGate::new(None)),
        ];
        for gate in &gates {
            prop_assert!(gate.evaluate(&setup).is_passed(), "{} rejected", gate.name());
        }
        let chain = GateChain::from_params(&OrbParams::default().without_gates());
        prop_assert!(chain.evaluate(&setup).is_passed());
    }

    /// Disabling one gate leaves the others' verdicts untouched.
    #[test]
    fn disabling_a_gate_only_removes_its_rejections(
        (or, base, atr) in arb_setup(),
        frac in 0.1..3.0_f64,
    ) {
        let setup = SetupContext { opening_range: &or, base: &base, atr };
        let enabled = BaseTightnessGate::new(Some(frac)).evaluate(&setup);
        let disabled = BaseTightnessGate::new(None).evaluate(&setup);
        prop_assert!(disabled.is_passed());
        if enabled.is_passed() {
            prop_assert_eq!(enabled, disabled);
        }
    }
}

// ── 2. Sizing maximality ─────────────────────────────────────────────

proptest! {
    #[test]
    fn position_size_is_largest_within_budget(
        budget in 1.0..10_000.0_f64,
        risk_per_share in 0.01..50.0_f64,
    ) {
        let shares = position_size(budget, risk_per_share);
        prop_assert!(shares as f64 * risk_per_share <= budget);
        prop_assert!((shares + 1) as f64 * risk_per_share > budget);
    }
}

// ── 3. Split invariant ───────────────────────────────────────────────

proptest! {
    #[test]
    fn half_plus_remainder_is_size(shares in 1u64..1_000_000) {
        let bar = Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 46, 0).unwrap(),
            100.5, 100.6, 100.4, 100.5, 1000.0,
        );
        let plan = plan_for(Side::Long, shares, 0.5, &bar);
        prop_assert_eq!(plan.first_scale_shares() + plan.runner_shares(), shares);
        prop_assert!(plan.runner_shares() >= plan.first_scale_shares());
    }
}

// ── 4. R-multiple sign ───────────────────────────────────────────────

proptest! {
    #[test]
    fn r_multiple_sign_matches_pnl(
        bars in arb_path(60),
        long in any::<bool>(),
        shares in 1u64..2000,
        risk_per_share in 0.05..2.0_f64,
    ) {
        let side = if long { Side::Long } else { Side::Short };
        let plan = plan_for(side, shares, risk_per_share, &bars[0]);
        let mut iv = IndicatorValues::new();
        iv.insert(EMA_FAST, Ema::new(3).compute(&bars));

        for rule in [&ScaleOutExit as &dyn ExitRule, &EmaTrailExit] {
            let result = rule.simulate(&plan, &bars, &iv, bars.len());
            prop_assert_eq!(result.pnl > 0.0, result.r_multiple > 0.0);
            prop_assert_eq!(result.pnl < 0.0, result.r_multiple < 0.0);
            prop_assert!(result.r_multiple.is_finite());
            // A loss can never exceed the planned risk: the stop only tightens.
            prop_assert!(result.r_multiple >= -1.0 - 1e-9);
            prop_assert!(result.exit_time >= plan.entry_time);

            let exit_bar = bars
                .iter()
                .find(|b| b.timestamp == result.exit_time)
                .unwrap();
            prop_assert!(result.exit_price <= exit_bar.high + 1e-9);
            prop_assert!(result.exit_price >= exit_bar.low - 1e-9);
        }
    }
}

// ── 5. No look-ahead ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn indicators_ignore_future_bars(bars in arb_path(80), cut in 1usize..80) {
        let cut = cut.min(bars.len());
        let indicators: Vec<Box<dyn Indicator>> =
            vec![Box::new(Atr::new(5)), Box::new(Vwap::new()), Box::new(Ema::new(4))];
        for ind in &indicators {
            let full = ind.compute(&bars);
            let prefix = ind.compute(&bars[..cut]);
            for i in 0..cut {
                prop_assert!(
                    (full[i].is_nan() && prefix[i].is_nan()) || (full[i] - prefix[i]).abs() < 1e-9,
                    "{} differs at {}", ind.name(), i
                );
            }
        }
    }
}
