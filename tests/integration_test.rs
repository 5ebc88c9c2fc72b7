//! End-to-end evaluation tests over a mock data port.
//!
//! Tests cover:
//! - Full refresh across the three reference tracks
//! - Shared indicators computed once and reused by every track
//! - Retrieval failures zeroing only the dependent indicator
//! - Ticker fallback for the breadth series
//! - Per-track manual inputs

mod common;

use approx::assert_relative_eq;
use common::*;
use market_checklist::cli::run_evaluation;
use market_checklist::domain::checklist::Checklist;
use market_checklist::domain::checklist_config::DEFAULT_LOOKBACK_DAYS;
use market_checklist::domain::error::ChecklistError;
use market_checklist::domain::evaluate::Evaluation;
use market_checklist::domain::indicator::{Category, INSUFFICIENT_DATA};
use market_checklist::domain::manual_input::ManualInputs;

fn bullish_inputs() -> ManualInputs {
    let mut inputs = ManualInputs::default();
    inputs.set("surprise_current", "10", None).unwrap();
    inputs.set("surprise_previous", "5", None).unwrap();
    inputs.set("trend_status", "uptrend", None).unwrap();
    inputs.set("momentum_stage", "accelerating", Some("spx")).unwrap();
    inputs
}

fn run(port: &MockDataPort, inputs: &ManualInputs) -> Evaluation {
    run_evaluation(
        port,
        &Checklist::reference(),
        inputs,
        as_of(),
        DEFAULT_LOOKBACK_DAYS,
    )
    .unwrap()
}

mod full_refresh {
    use super::*;

    #[test]
    fn spx_scores_every_point() {
        let port = market_data();
        let eval = run(&port, &bullish_inputs());
        let spx = eval.track("spx").unwrap();

        for outcome in &spx.outcomes {
            assert_eq!(outcome.score, 1.0, "{} scored {}", outcome.id, outcome.score);
            assert!(outcome.failure.is_none());
        }
        assert_eq!(spx.category(Category::Liquidity).unwrap().total, 3.0);
        assert_eq!(spx.category(Category::Sentiment).unwrap().total, 4.0);
        assert_eq!(spx.category(Category::Trend).unwrap().total, 3.0);
        assert_eq!(spx.grand_total, 10.0);
        assert_eq!(spx.grand_max, 10.0);
        // A perfect score maps below the 9-point anchor.
        assert_eq!(spx.position_pct, 90.0);
    }

    #[test]
    fn ndx_missing_index_data_scores_stage_zero() {
        let port = market_data();
        let eval = run(&port, &bullish_inputs());
        let ndx = eval.track("ndx").unwrap();

        let stage = ndx.outcome("index_stage").unwrap();
        assert_eq!(stage.score, 0.0);
        assert_eq!(stage.label, "Error");
        assert_eq!(stage.failure.as_deref(), Some("no data for ^NDX"));
        // Stage 0, default steady momentum 0.5.
        assert_eq!(ndx.category(Category::Trend).unwrap().total, 1.5);
        assert_eq!(ndx.grand_total, 8.5);
        assert_relative_eq!(ndx.position_pct, 90.0);
    }

    #[test]
    fn hsi_uses_its_own_stage_and_rotation_pair() {
        let port = market_data();
        let eval = run(&port, &bullish_inputs());
        let hsi = eval.track("hsi").unwrap();

        let stage = hsi.outcome("index_stage").unwrap();
        assert_eq!(stage.label, "Other/Downtrend");
        assert!(stage.detail("price").unwrap() < stage.detail("MA50").unwrap());

        let rotation = hsi.outcome("sector_rotation").unwrap();
        assert_eq!(rotation.name, "HK Tech/Tracker Ratio");
        assert_eq!(rotation.score, 0.0);
        assert_eq!(rotation.label, "Risk-Off");

        assert_eq!(hsi.grand_total, 7.5);
        assert_relative_eq!(hsi.position_pct, 70.0);
    }

    #[test]
    fn monthly_returns_anchor_to_completed_month() {
        let port = market_data();
        let eval = run(&port, &bullish_inputs());
        assert_eq!(eval.reference_month_end, Some(date(2024, 5, 31)));

        let bond = eval.tracks[0].outcome("bond_vs_bill").unwrap();
        assert_eq!(bond.label, "Outperforming");
        // 5% a year reinvested monthly for three months.
        assert_relative_eq!(
            bond.detail("reference 3m %").unwrap(),
            ((1.0 + 0.05 / 12.0f64).powi(3) - 1.0) * 100.0,
            epsilon = 1e-9
        );
    }
}

mod shared_indicators {
    use super::*;

    #[test]
    fn each_instrument_fetched_once() {
        let port = market_data();
        run(&port, &bullish_inputs());
        for symbol in ["BND", "TIP", "XLY", "XLP", "FFTY", "^GSPC", "^HSI"] {
            assert_eq!(port.close_calls(symbol), 1, "{symbol}");
        }
    }

    #[test]
    fn shared_outcomes_identical_across_tracks() {
        let port = market_data();
        let eval = run(&port, &bullish_inputs());
        let checklist = Checklist::reference();

        for def in checklist.indicators() {
            if !checklist.is_shared(&def.id) {
                continue;
            }
            let first = eval.tracks[0].outcome(&def.id).unwrap();
            for track in &eval.tracks[1..] {
                assert_eq!(track.outcome(&def.id).unwrap(), first);
            }
        }
    }
}

mod failure_isolation {
    use super::*;

    #[test]
    fn failed_retrieval_zeroes_only_dependent_indicator() {
        let port = market_data().with_error("TIP", "connection reset");
        let eval = run(&port, &bullish_inputs());
        let spx = eval.track("spx").unwrap();

        let tip = spx.outcome("inflation_bond_cross").unwrap();
        assert_eq!(tip.score, 0.0);
        assert_eq!(tip.label, INSUFFICIENT_DATA);
        assert_eq!(tip.failure.as_deref(), Some("no data for TIP"));

        let failed: Vec<&str> = spx
            .outcomes
            .iter()
            .filter(|o| o.is_failed())
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(failed, vec!["inflation_bond_cross"]);
        assert_eq!(spx.grand_total, 9.0);
        assert_eq!(spx.position_pct, 100.0);
    }

    #[test]
    fn short_history_is_insufficient_data() {
        let port = market_data().with_series(
            "IBIT",
            daily_series(date(2024, 6, 10), as_of(), |i| 30.0 + i as f64),
        );
        let eval = run(&port, &bullish_inputs());
        let ibit = eval.tracks[0].outcome("crypto_cross").unwrap();
        assert_eq!(ibit.score, 0.0);
        assert_eq!(ibit.label, INSUFFICIENT_DATA);
        assert!(ibit.failure.as_deref().unwrap().contains("insufficient history"));
    }

    #[test]
    fn lookback_outside_calendar_is_config_error() {
        let port = market_data();
        let result = run_evaluation(
            &port,
            &Checklist::reference(),
            &bullish_inputs(),
            as_of(),
            200_000_000,
        );
        assert!(matches!(
            result,
            Err(ChecklistError::ConfigInvalid { ref key, .. }) if key == "lookback_days"
        ));
        assert!(port.calls.borrow().is_empty());
    }

    #[test]
    fn no_data_at_all_still_produces_every_track() {
        let port = MockDataPort::new();
        let eval = run(&port, &ManualInputs::default());
        assert_eq!(eval.tracks.len(), 3);
        for track in &eval.tracks {
            assert_eq!(track.outcomes.len(), 10);
            assert_eq!(track.grand_total, 1.0);
        }
    }
}

mod fallback {
    use super::*;

    #[test]
    fn breadth_resolves_alternative_symbol() {
        let port = MockDataPort::new()
            .with_error("$R3FI", "not found")
            .with_series("^R3FI", flat(42.0));
        let eval = run(&port, &ManualInputs::default());
        let breadth = eval.tracks[0].outcome("breadth").unwrap();
        assert_eq!(breadth.label, "Bearish");
        assert_eq!(breadth.detail("% above 50-day MA"), Some(42.0));
        assert_eq!(port.close_calls("R3FI"), 1);
    }

    #[test]
    fn manual_breadth_when_every_symbol_fails() {
        let port = MockDataPort::new();
        let mut inputs = ManualInputs::default();
        inputs.set("breadth", "58", None).unwrap();
        let eval = run(&port, &inputs);
        let breadth = eval.tracks[0].outcome("breadth").unwrap();
        assert_eq!(breadth.label, "Bullish (manual)");
        assert_eq!(breadth.score, 1.0);
    }
}

mod manual_inputs {
    use super::*;

    #[test]
    fn stage_override_applies_to_one_track() {
        let port = market_data();
        let mut inputs = bullish_inputs();
        inputs.set("stage_override", "strong pullback", Some("hsi")).unwrap();
        let eval = run(&port, &inputs);

        let hsi_stage = eval.track("hsi").unwrap().outcome("index_stage").unwrap();
        assert_eq!(hsi_stage.score, 0.5);
        assert_eq!(hsi_stage.label, "Strong Pullback (manual, computed Other/Downtrend)");

        let spx_stage = eval.track("spx").unwrap().outcome("index_stage").unwrap();
        assert_eq!(spx_stage.label, "Strong Uptrend");
    }

    #[test]
    fn surprise_split_scores_half_points() {
        let port = market_data();
        let mut inputs = bullish_inputs();
        inputs.set("surprise_current", "-2", None).unwrap();
        inputs.set("surprise_previous", "-4", None).unwrap();
        let eval = run(&port, &inputs);
        let surprise = eval.tracks[0].outcome("surprise_index").unwrap();
        assert_eq!(surprise.score, 0.5);
        assert_eq!(surprise.detail("month-over-month %"), Some(50.0));
    }
}
