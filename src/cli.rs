//! CLI definition and dispatch.

use chrono::{NaiveDate, TimeDelta};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::manual_input_adapter::IniManualInputAdapter;
use crate::adapters::text_report::{render_text, TextReportAdapter};
use crate::domain::checklist::Checklist;
use crate::domain::checklist_config::{build_checklist, lookback_days, DEFAULT_LOOKBACK_DAYS};
use crate::domain::error::ChecklistError;
use crate::domain::evaluate::{evaluate, Evaluation};
use crate::domain::indicator::Category;
use crate::domain::manual_input::ManualInputs;
use crate::domain::scoring::{position_percentage, quantize_half};
use crate::domain::snapshot::load_snapshot;
use crate::ports::data_port::DataPort;
use crate::ports::manual_input_port::ManualInputPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "market-checklist",
    about = "Market indicator checklist and position sizing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the checklist against local market data
    Evaluate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory of per-instrument CSV files
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        inputs: Option<PathBuf>,
        /// Evaluation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Map a total score to a recommended position
    Position {
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
    },
    /// Validate a checklist configuration and list its indicators
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Update one manual input
    SetInput {
        #[arg(short, long)]
        inputs: PathBuf,
        key: String,
        value: String,
        #[arg(long)]
        track: Option<String>,
    },
    /// Show stored manual inputs
    ShowInputs {
        #[arg(short, long)]
        inputs: PathBuf,
    },
    /// List instruments available in a data directory
    ListSymbols {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Evaluate {
            config,
            data,
            inputs,
            as_of,
            output,
            csv,
        } => run_evaluate(
            config.as_ref(),
            &data,
            inputs.as_ref(),
            as_of,
            output.as_ref(),
            csv.as_ref(),
        ),
        Command::Position { score } => run_position(score),
        Command::Validate { config } => run_validate(&config),
        Command::SetInput {
            inputs,
            key,
            value,
            track,
        } => run_set_input(&inputs, &key, &value, track.as_deref()),
        Command::ShowInputs { inputs } => run_show_inputs(&inputs),
        Command::ListSymbols { data } => run_list_symbols(&data),
    }
}

fn fail(err: &ChecklistError) -> ExitCode {
    log::error!("{err}");
    ExitCode::from(err)
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ChecklistError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

/// Checklist and lookback window from `path`, or the reference checklist.
pub fn load_checklist(path: Option<&PathBuf>) -> Result<(Checklist, i64), ExitCode> {
    let Some(path) = path else {
        log::info!("No config given, using the reference checklist");
        return Ok((Checklist::reference(), DEFAULT_LOOKBACK_DAYS));
    };
    log::info!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    let checklist = build_checklist(&adapter).map_err(|e| fail(&e))?;
    let lookback = lookback_days(&adapter).map_err(|e| fail(&e))?;
    Ok((checklist, lookback))
}

fn load_inputs(path: Option<&PathBuf>) -> Result<ManualInputs, ExitCode> {
    match path {
        Some(p) => IniManualInputAdapter::new(p.clone())
            .load()
            .map_err(|e| fail(&e)),
        None => Ok(ManualInputs::default()),
    }
}

/// Snapshot load and evaluation over `[as_of - lookback_days, as_of]`.
pub fn run_evaluation(
    data_port: &dyn DataPort,
    checklist: &Checklist,
    inputs: &ManualInputs,
    as_of: NaiveDate,
    lookback_days: i64,
) -> Result<Evaluation, ChecklistError> {
    let start = TimeDelta::try_days(lookback_days)
        .filter(|_| lookback_days > 0)
        .and_then(|window| as_of.checked_sub_signed(window))
        .ok_or_else(|| ChecklistError::ConfigInvalid {
            section: "checklist".into(),
            key: "lookback_days".into(),
            reason: format!("{lookback_days} days before {as_of} is outside the calendar"),
        })?;
    let requirements = checklist.requirements();
    log::info!(
        "Fetching {} instruments from {} to {}",
        requirements.len(),
        start,
        as_of
    );

    let load = load_snapshot(data_port, &requirements, start, as_of);
    if !load.missing.is_empty() {
        let names: Vec<&str> = load.missing.iter().map(|m| m.instrument.as_str()).collect();
        log::warn!(
            "{} of {} instruments unavailable: {}",
            names.len(),
            requirements.len(),
            names.join(", ")
        );
    }

    Ok(evaluate(checklist, &load.snapshot, inputs, as_of))
}

fn run_evaluate(
    config_path: Option<&PathBuf>,
    data_dir: &PathBuf,
    inputs_path: Option<&PathBuf>,
    as_of: Option<NaiveDate>,
    output_path: Option<&PathBuf>,
    csv_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: checklist definition
    let (checklist, lookback) = match load_checklist(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 2: manual inputs
    let inputs = match load_inputs(inputs_path) {
        Ok(i) => i,
        Err(code) => return code,
    };

    // Stage 3: snapshot and evaluation
    let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
    let data_port = CsvAdapter::new(data_dir.clone());
    let evaluation = match run_evaluation(&data_port, &checklist, &inputs, as_of, lookback) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };

    // Stage 4: reports
    print!("{}", render_text(&evaluation));
    if let Some(path) = output_path {
        if let Err(e) = TextReportAdapter.write(&evaluation, &path.display().to_string()) {
            return fail(&e);
        }
        log::info!("Report written to: {}", path.display());
    }
    if let Some(path) = csv_path {
        if let Err(e) = CsvReportAdapter.write(&evaluation, &path.display().to_string()) {
            return fail(&e);
        }
        log::info!("CSV written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_position(score: f64) -> ExitCode {
    if !score.is_finite() {
        return fail(&ChecklistError::InvalidInput {
            key: "score".into(),
            reason: "expected a finite number".into(),
        });
    }
    println!(
        "score {:.1} (rounded {:.1}) -> position {:.1}%",
        score,
        quantize_half(score.max(0.0)),
        position_percentage(score)
    );
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    log::info!("Validating config: {}", config_path.display());
    let (checklist, lookback) = match load_checklist(Some(config_path)) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let [short, mid, long] = checklist.horizons.as_array();
    let [w_short, w_mid, w_long] = checklist.weights.as_array();
    println!("Horizons: {short}/{mid}/{long} months, lookback {lookback} days");
    println!("Weights: {w_short:.2}/{w_mid:.2}/{w_long:.2}");
    for category in Category::ALL {
        println!("\n{} (max {:.1})", category, checklist.category_max(category));
        for def in checklist.indicators().iter().filter(|d| d.category == category) {
            let scope = if checklist.is_shared(&def.id) {
                "shared"
            } else {
                "per track"
            };
            println!("  {:<22} {:<28} {} [{}]", def.id, def.name, def.spec.describe(), scope);
        }
    }

    println!("\nTracks:");
    for track in checklist.tracks() {
        println!("  {} ({})", track.name, track.id);
        for o in &track.overrides {
            println!("    {} -> {}", o.id, o.spec.describe());
        }
    }

    println!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_set_input(inputs_path: &PathBuf, key: &str, value: &str, track: Option<&str>) -> ExitCode {
    let adapter = IniManualInputAdapter::new(inputs_path.clone());
    let mut inputs = match adapter.load() {
        Ok(i) => i,
        Err(e) => return fail(&e),
    };
    // Section names come back lowercased from the INI parser.
    let track = track.map(|t| t.trim().to_lowercase());
    if let Err(e) = inputs.set(key, value, track.as_deref()) {
        return fail(&e);
    }
    if let Err(e) = adapter.save(&inputs) {
        return fail(&e);
    }
    match &track {
        Some(t) => log::info!("Set {key} = {value} for track {t}"),
        None => log::info!("Set {key} = {value}"),
    }
    ExitCode::SUCCESS
}

pub fn format_inputs(inputs: &ManualInputs) -> String {
    let mut lines = vec![
        format!("surprise_current   {}", inputs.surprise_current),
        format!("surprise_previous  {}", inputs.surprise_previous),
        format!("breadth            {}", inputs.breadth_pct),
        format!("trend_status       {}", inputs.trend_status),
    ];
    for (id, track) in &inputs.tracks {
        let stage = track
            .stage_override
            .map(|s| s.to_string())
            .unwrap_or_else(|| "auto".to_string());
        lines.push(format!(
            "[{}] stage_override {}, momentum_stage {}",
            id, stage, track.momentum_stage
        ));
    }
    lines.join("\n")
}

fn run_show_inputs(inputs_path: &PathBuf) -> ExitCode {
    match IniManualInputAdapter::new(inputs_path.clone()).load() {
        Ok(inputs) => {
            println!("{}", format_inputs(&inputs));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list_symbols(data_dir: &PathBuf) -> ExitCode {
    let symbols = match CsvAdapter::new(data_dir.clone()).list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    if symbols.is_empty() {
        log::warn!("No symbols found in {}", data_dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        log::info!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
