//! INI persistence for manual inputs.
//!
//! ```ini
//! [manual]
//! surprise_current = 12.5
//! surprise_previous = 8
//! breadth = 62
//! trend_status = Uptrend
//!
//! [track.ndx]
//! stage_override = Strong Pullback
//! momentum_stage = Fading
//! ```

use crate::domain::error::ChecklistError;
use crate::domain::manual_input::ManualInputs;
use crate::ports::manual_input_port::ManualInputPort;
use configparser::ini::Ini;
use std::path::PathBuf;

const MANUAL_SECTION: &str = "manual";
const TRACK_PREFIX: &str = "track.";
const SCALAR_KEYS: [&str; 4] = ["surprise_current", "surprise_previous", "breadth", "trend_status"];
const TRACK_KEYS: [&str; 2] = ["stage_override", "momentum_stage"];

pub struct IniManualInputAdapter {
    path: PathBuf,
}

impl IniManualInputAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn parse_error(path: &std::path::Path, reason: impl Into<String>) -> ChecklistError {
    ChecklistError::ConfigParse {
        file: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Apply every stored key through [`ManualInputs::set`] so stored values are
/// validated exactly like interactive ones.
pub fn inputs_from_ini(ini: &Ini) -> Result<ManualInputs, ChecklistError> {
    let mut inputs = ManualInputs::default();
    for key in SCALAR_KEYS {
        if let Some(value) = ini.get(MANUAL_SECTION, key) {
            inputs.set(key, &value, None)?;
        }
    }
    for section in ini.sections() {
        let Some(track) = section.strip_prefix(TRACK_PREFIX) else {
            continue;
        };
        for key in TRACK_KEYS {
            if let Some(value) = ini.get(&section, key) {
                inputs.set(key, &value, Some(track))?;
            }
        }
    }
    Ok(inputs)
}

pub fn inputs_to_ini(inputs: &ManualInputs) -> Ini {
    let mut ini = Ini::new();
    let scalars = [
        ("surprise_current", inputs.surprise_current.to_string()),
        ("surprise_previous", inputs.surprise_previous.to_string()),
        ("breadth", inputs.breadth_pct.to_string()),
        ("trend_status", inputs.trend_status.to_string()),
    ];
    for (key, value) in scalars {
        ini.set(MANUAL_SECTION, key, Some(value));
    }
    for (track, values) in &inputs.tracks {
        let section = format!("{TRACK_PREFIX}{track}");
        let stage = values
            .stage_override
            .map(|s| s.to_string())
            .unwrap_or_else(|| "auto".to_string());
        ini.set(&section, "stage_override", Some(stage));
        ini.set(&section, "momentum_stage", Some(values.momentum_stage.to_string()));
    }
    ini
}

impl ManualInputPort for IniManualInputAdapter {
    fn load(&self) -> Result<ManualInputs, ChecklistError> {
        if !self.path.exists() {
            log::debug!("{} not found, using default inputs", self.path.display());
            return Ok(ManualInputs::default());
        }
        let mut ini = Ini::new();
        ini.load(&self.path).map_err(|e| parse_error(&self.path, e))?;
        inputs_from_ini(&ini)
    }

    fn save(&self, inputs: &ManualInputs) -> Result<(), ChecklistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        inputs_to_ini(inputs).write(&self.path)?;
        log::debug!("saved manual inputs to {}", self.path.display());
        Ok(())
    }
}
