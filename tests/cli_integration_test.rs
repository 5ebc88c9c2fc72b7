//! CLI integration tests.
//!
//! Tests cover:
//! - Checklist building from INI text (defaults, overrides, invalid values)
//! - Manual input persistence through set-input / show-inputs
//! - The evaluate command over CSV files on disk
//! - Exit codes for configuration and input errors

mod common;

use clap::Parser;
use common::*;
use market_checklist::adapters::csv_adapter::sanitize_symbol;
use market_checklist::adapters::file_config_adapter::FileConfigAdapter;
use market_checklist::adapters::manual_input_adapter::IniManualInputAdapter;
use market_checklist::cli::{self, Cli};
use market_checklist::domain::checklist::IndicatorSpec;
use market_checklist::domain::checklist_config::{build_checklist, lookback_days};
use market_checklist::domain::error::ChecklistError;
use market_checklist::domain::indicator::manual::MomentumStage;
use market_checklist::domain::indicator::AverageKind;
use market_checklist::domain::time_series::TimeSeries;
use market_checklist::ports::manual_input_port::ManualInputPort;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn write_series_csv(dir: &Path, symbol: &str, series: &TimeSeries) {
    let mut content = String::from("date,close\n");
    for p in series.points() {
        writeln!(content, "{},{}", p.date, p.value).unwrap();
    }
    std::fs::write(dir.join(format!("{}.csv", sanitize_symbol(symbol))), content).unwrap();
}

fn run_cli(args: &[&str]) -> ExitCode {
    let mut argv = vec!["market-checklist"];
    argv.extend_from_slice(args);
    cli::run(Cli::parse_from(argv))
}

// ExitCode has no PartialEq; compare through Debug.
fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::from(expected)));
}

const FULL_INI: &str = r#"
[checklist]
lookback_days = 500
horizons = 1,3,6
weights = 0.5,0.3,0.2

[liquidity]
bond = AGG
crypto = ETHA
crypto_periods = 5,10:vwap

[sentiment]
breadth = manual
breadth_threshold = 60
leaders = MTUM

[track.asx]
name = ASX 200
index = ^AXJO
stage_periods = 20,60,120
cyclical = XJO.DISC
defensive = XJO.STAP

[track.spx]
name = S&P 500
"#;

mod config_loading {
    use super::*;

    #[test]
    fn builds_checklist_from_full_config() {
        let adapter = FileConfigAdapter::from_string(FULL_INI).unwrap();
        let checklist = build_checklist(&adapter).unwrap();

        assert_eq!(lookback_days(&adapter).unwrap(), 500);
        assert_eq!(checklist.horizons.as_array(), [1, 3, 6]);
        assert_eq!(checklist.weights.as_array(), [0.5, 0.3, 0.2]);

        let ids: Vec<&str> = checklist.tracks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["asx", "spx"]);

        let crypto = checklist
            .indicators()
            .iter()
            .find(|d| d.id == "crypto_cross")
            .unwrap();
        match &crypto.spec {
            IndicatorSpec::MaCross {
                instrument,
                periods,
            } => {
                assert_eq!(instrument.symbol(), "ETHA");
                assert_eq!((periods.short, periods.long), (5, 10));
                assert_eq!(periods.kind, AverageKind::VolumeWeighted);
            }
            other => panic!("unexpected spec {other:?}"),
        }
        let reqs = checklist.requirements();
        assert!(reqs.iter().any(|(i, volume)| i.symbol() == "ETHA" && *volume));
        assert!(reqs.iter().any(|(i, _)| i.symbol() == "^AXJO"));
        assert!(!reqs.iter().any(|(i, _)| i.symbol() == "$R3FI"));

        let asx = &checklist.tracks()[0];
        assert_eq!(asx.name, "ASX 200");
        match &asx.override_for("index_stage").unwrap().spec {
            IndicatorSpec::Stage { periods, .. } => {
                assert_eq!((periods.short, periods.mid, periods.long), (20, 60, 120));
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_periods() {
        let adapter =
            FileConfigAdapter::from_string("[liquidity]\ninflation_periods = 20,5\n").unwrap();
        let err = build_checklist(&adapter).unwrap_err();
        assert!(matches!(
            err,
            ChecklistError::ConfigInvalid { ref key, .. } if key == "inflation_periods"
        ));
    }

    #[test]
    fn rejects_bad_horizons() {
        let adapter = FileConfigAdapter::from_string("[checklist]\nhorizons = 3,6\n").unwrap();
        let err = build_checklist(&adapter).unwrap_err();
        assert!(matches!(err, ChecklistError::ConfigInvalid { ref key, .. } if key == "horizons"));
    }

    #[test]
    fn validate_command_accepts_full_config() {
        let file = write_temp_ini(FULL_INI);
        assert_exit(run_cli(&["validate", "--config", file.path().to_str().unwrap()]), 0);
    }

    #[test]
    fn validate_command_reports_config_error() {
        let file = write_temp_ini("[checklist]\nweights = 0.2,0.2,0.2\n");
        assert_exit(run_cli(&["validate", "--config", file.path().to_str().unwrap()]), 2);
    }

    #[test]
    fn out_of_range_values_are_config_errors() {
        for content in [
            "[checklist]\nlookback_days = 200000000\n",
            "[checklist]\nlookback_days = abc\n",
            "[checklist]\nhorizons = 3,6,4000000\n",
            "[checklist]\nhorizons = 3,6,2147483648\n",
        ] {
            let file = write_temp_ini(content);
            assert_exit(run_cli(&["validate", "--config", file.path().to_str().unwrap()]), 2);
        }
    }

    #[test]
    fn missing_config_file_is_config_error() {
        assert_exit(run_cli(&["validate", "--config", "/nonexistent/checklist.ini"]), 2);
    }
}

mod manual_inputs {
    use super::*;

    #[test]
    fn set_input_persists_between_runs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inputs.ini");
        let p = path.to_str().unwrap();

        assert_exit(run_cli(&["set-input", "--inputs", p, "surprise_current", "14.2"]), 0);
        assert_exit(run_cli(&["set-input", "--inputs", p, "breadth", "61"]), 0);
        assert_exit(
            run_cli(&["set-input", "--inputs", p, "momentum_stage", "declining", "--track", "NDX"]),
            0,
        );

        let inputs = IniManualInputAdapter::new(path.clone()).load().unwrap();
        assert_eq!(inputs.surprise_current, 14.2);
        assert_eq!(inputs.breadth_pct, 61.0);
        assert_eq!(inputs.track("ndx").momentum_stage, MomentumStage::Declining);

        let shown = cli::format_inputs(&inputs);
        assert!(shown.contains("surprise_current   14.2"));
        assert!(shown.contains("[ndx] stage_override auto, momentum_stage Declining"));
        assert_exit(run_cli(&["show-inputs", "--inputs", p]), 0);
    }

    #[test]
    fn invalid_input_exit_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inputs.ini");
        let p = path.to_str().unwrap();

        assert_exit(run_cli(&["set-input", "--inputs", p, "breadth", "101"]), 4);
        assert_exit(run_cli(&["set-input", "--inputs", p, "stage_override", "strong uptrend"]), 4);
        assert_exit(run_cli(&["set-input", "--inputs", p, "vix", "12"]), 4);
        assert!(!path.exists());
    }
}

mod evaluate_command {
    use super::*;

    fn write_market_data(dir: &Path) {
        let port = market_data();
        for (symbol, series) in &port.closes {
            write_series_csv(dir, symbol, series);
        }
    }

    #[test]
    fn evaluate_writes_reports() {
        let data = TempDir::new().unwrap();
        write_market_data(data.path());
        let out = TempDir::new().unwrap();
        let text = out.path().join("report.txt");
        let csv = out.path().join("report.csv");
        let inputs = out.path().join("inputs.ini");

        let ip = inputs.to_str().unwrap();
        assert_exit(run_cli(&["set-input", "--inputs", ip, "surprise_current", "10"]), 0);
        assert_exit(run_cli(&["set-input", "--inputs", ip, "surprise_previous", "5"]), 0);
        assert_exit(run_cli(&["set-input", "--inputs", ip, "trend_status", "uptrend"]), 0);
        assert_exit(
            run_cli(&[
                "set-input",
                "--inputs",
                ip,
                "momentum_stage",
                "accelerating",
                "--track",
                "spx",
            ]),
            0,
        );

        let code = run_cli(&[
            "evaluate",
            "--data",
            data.path().to_str().unwrap(),
            "--inputs",
            ip,
            "--as-of",
            "2024-06-14",
            "--output",
            text.to_str().unwrap(),
            "--csv",
            csv.to_str().unwrap(),
        ]);
        assert_exit(code, 0);

        let report = std::fs::read_to_string(&text).unwrap();
        assert!(report.contains("=== S&P 500 ==="));
        assert!(report.contains("Total      10.0/10.0  -> recommended position 90%"));
        assert!(report.contains("! no data for ^NDX"));

        let mut rdr = csv::Reader::from_path(&csv).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 30);
        let hsi_total = rows.iter().find(|r| &r[1] == "hsi").unwrap();
        assert_eq!(&hsi_total[10], "7.50");
        assert_eq!(&hsi_total[11], "70.0");
    }

    #[test]
    fn evaluate_with_custom_config_and_empty_data() {
        let data = TempDir::new().unwrap();
        let config = write_temp_ini(FULL_INI);
        let out = TempDir::new().unwrap();
        let csv = out.path().join("report.csv");

        let code = run_cli(&[
            "evaluate",
            "--config",
            config.path().to_str().unwrap(),
            "--data",
            data.path().to_str().unwrap(),
            "--as-of",
            "2024-06-14",
            "--csv",
            csv.to_str().unwrap(),
        ]);
        assert_exit(code, 0);

        let content = std::fs::read_to_string(&csv).unwrap();
        assert!(content.contains("asx,ASX 200"));
        assert!(content.contains("no data for ^AXJO"));
        assert!(content.contains("Bearish (manual)"));
    }

    #[test]
    fn list_symbols_reads_data_directory() {
        let data = TempDir::new().unwrap();
        write_market_data(data.path());
        assert_exit(run_cli(&["list-symbols", "--data", data.path().to_str().unwrap()]), 0);
    }

    #[test]
    fn position_command() {
        assert_exit(run_cli(&["position", "--score", "7.24"]), 0);
        assert_exit(run_cli(&["position", "--score", "-3"]), 0);
    }
}
