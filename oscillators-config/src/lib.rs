use log::{debug, warn};
use oscillators_core::{ParameterError, ParameterSet, DEFAULT_DT, DEFAULT_DURATION, DEFAULT_WINDOW};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid override '{0}': expected key=value with a numeric value")]
    InvalidOverride(String),

    #[error("Invalid parameters: {0}")]
    Parameters(#[from] ParameterError),
}

// --- Operator input ---

/// Inclusive range an operator field is clamped to, as on the input sliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

pub const POSITION_RANGE: FieldRange = FieldRange::new(-0.1, 0.1);
pub const VELOCITY_RANGE: FieldRange = FieldRange::new(-1.0, 1.0);
pub const MASS_RANGE: FieldRange = FieldRange::new(0.1, 1.0);
pub const SPRING_RANGE: FieldRange = FieldRange::new(1.0, 20.0);

const DEFAULT_POSITION: f64 = 0.0;
const DEFAULT_VELOCITY: f64 = 0.0;
const DEFAULT_MASS: f64 = 0.2;
const DEFAULT_SPRINGS: [f64; 4] = [10.0, 5.0, 5.0, 10.0];

/// The operator-editable fields of a run. Unset fields fall back to the documented defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ParameterInput {
    pub x1: Option<f64>,
    pub x2: Option<f64>,
    pub x3: Option<f64>,
    pub v1: Option<f64>,
    pub v2: Option<f64>,
    pub v3: Option<f64>,
    pub m1: Option<f64>,
    pub m2: Option<f64>,
    pub m3: Option<f64>,
    pub k1: Option<f64>,
    pub k2: Option<f64>,
    pub k3: Option<f64>,
    pub k4: Option<f64>,
    pub dt: Option<f64>,
    pub duration: Option<f64>,
    pub window: Option<f64>,
}

impl ParameterInput {
    fn field_mut(&mut self, key: &str) -> Option<&mut Option<f64>> {
        let field = match key {
            "x1" => &mut self.x1,
            "x2" => &mut self.x2,
            "x3" => &mut self.x3,
            "v1" => &mut self.v1,
            "v2" => &mut self.v2,
            "v3" => &mut self.v3,
            "m1" => &mut self.m1,
            "m2" => &mut self.m2,
            "m3" => &mut self.m3,
            "k1" => &mut self.k1,
            "k2" => &mut self.k2,
            "k3" => &mut self.k3,
            "k4" => &mut self.k4,
            "dt" => &mut self.dt,
            "duration" => &mut self.duration,
            "window" => &mut self.window,
            _ => return None,
        };
        Some(field)
    }

    /// Applies an operator edit of the form `m1=0.5`.
    pub fn apply_override(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidOverride(assignment.to_string());
        let (key, value) = assignment.split_once('=').ok_or_else(invalid)?;
        let value: f64 = value.trim().parse().map_err(|_| invalid())?;
        let field = self.field_mut(key.trim()).ok_or_else(invalid)?;
        *field = Some(value);
        debug!("Parameter override {} = {}", key.trim(), value);
        Ok(())
    }

    /// Returns a copy with every set operator field clamped to its slider range.
    pub fn clamped(&self) -> Self {
        let clamp = |value: Option<f64>, range: FieldRange, name: &str| {
            value.map(|v| {
                let c = range.clamp(v);
                if c != v {
                    warn!("{} = {} is outside [{}, {}], clamped to {}", name, v, range.min, range.max, c);
                }
                c
            })
        };
        Self {
            x1: clamp(self.x1, POSITION_RANGE, "x1"),
            x2: clamp(self.x2, POSITION_RANGE, "x2"),
            x3: clamp(self.x3, POSITION_RANGE, "x3"),
            v1: clamp(self.v1, VELOCITY_RANGE, "v1"),
            v2: clamp(self.v2, VELOCITY_RANGE, "v2"),
            v3: clamp(self.v3, VELOCITY_RANGE, "v3"),
            m1: clamp(self.m1, MASS_RANGE, "m1"),
            m2: clamp(self.m2, MASS_RANGE, "m2"),
            m3: clamp(self.m3, MASS_RANGE, "m3"),
            k1: clamp(self.k1, SPRING_RANGE, "k1"),
            k2: clamp(self.k2, SPRING_RANGE, "k2"),
            k3: clamp(self.k3, SPRING_RANGE, "k3"),
            k4: clamp(self.k4, SPRING_RANGE, "k4"),
            ..self.clone()
        }
    }

    /// Resolves defaults (and optionally clamps) into a validated [`ParameterSet`].
    pub fn to_parameter_set(&self, clamp: bool) -> Result<ParameterSet, ConfigError> {
        let input = if clamp { self.clamped() } else { self.clone() };

        let params = ParameterSet::new(
            [
                input.m1.unwrap_or(DEFAULT_MASS),
                input.m2.unwrap_or(DEFAULT_MASS),
                input.m3.unwrap_or(DEFAULT_MASS),
            ],
            [
                input.k1.unwrap_or(DEFAULT_SPRINGS[0]),
                input.k2.unwrap_or(DEFAULT_SPRINGS[1]),
                input.k3.unwrap_or(DEFAULT_SPRINGS[2]),
                input.k4.unwrap_or(DEFAULT_SPRINGS[3]),
            ],
            [
                input.x1.unwrap_or(DEFAULT_POSITION),
                input.x2.unwrap_or(DEFAULT_POSITION),
                input.x3.unwrap_or(DEFAULT_POSITION),
            ],
            [
                input.v1.unwrap_or(DEFAULT_VELOCITY),
                input.v2.unwrap_or(DEFAULT_VELOCITY),
                input.v3.unwrap_or(DEFAULT_VELOCITY),
            ],
        )?
        .with_timing(
            input.dt.unwrap_or(DEFAULT_DT),
            input.duration.unwrap_or(DEFAULT_DURATION),
            input.window.unwrap_or(DEFAULT_WINDOW),
        )?;
        Ok(params)
    }
}

// --- Run and transport sections ---

fn default_tick_rate() -> u32 { 50 }
fn default_clamp() -> bool { true }
fn default_chart_every() -> u32 { 1 }

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Wall-clock ticks per second, independent of `dt`.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Clamp operator fields to the slider ranges before building parameters.
    #[serde(default = "default_clamp")]
    pub clamp: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            clamp: default_clamp(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializerType {
    #[default]
    Json,
    Binary,
}

/// Where display frames are written.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SenderConfig {
    #[default]
    Stdio,
    File { path: String },
    Null,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TransportConfig {
    #[serde(default)]
    pub serializer: SerializerType,
    #[serde(default)]
    pub sender: SenderConfig,
    /// Send chart frames every N ticks (scene frames go out every tick).
    #[serde(default = "default_chart_every")]
    pub chart_every: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            serializer: SerializerType::default(),
            sender: SenderConfig::default(),
            chart_every: default_chart_every(),
        }
    }
}

// --- Top-Level Config Struct ---

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub parameters: ParameterInput,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl Config {
    pub fn parameter_set(&self) -> Result<ParameterSet, ConfigError> {
        self.parameters.to_parameter_set(self.run.clamp)
    }
}

// Config loader implementation
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a config file, choosing TOML for `.toml` paths and JSON otherwise.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.run.tick_rate == 0 {
            return Err(ConfigError::ValidationError(
                "Tick rate must be greater than 0".to_string(),
            ));
        }

        if config.transport.chart_every == 0 {
            return Err(ConfigError::ValidationError(
                "Chart frame interval must be greater than 0".to_string(),
            ));
        }

        if let SenderConfig::File { path } = &config.transport.sender {
            if path.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "File sender requires an output path".to_string(),
                ));
            }
        }

        // Surface configuration errors to the operator before any run starts
        config.parameter_set()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn unset_fields_take_documented_defaults() {
        let params = ParameterInput::default().to_parameter_set(true).unwrap();
        assert_eq!(params, ParameterSet::default());
    }

    #[test]
    fn load_json_config() {
        let content = r#"{
          "parameters": { "x1": 0.05, "m2": 0.4, "k3": 12.0 },
          "run": { "tick_rate": 25 },
          "transport": {
            "serializer": "binary",
            "sender": { "type": "file", "path": "frames.log" },
            "chart_every": 5
          }
        }"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        let config = ConfigLoader::from_file(file.path()).unwrap();

        assert_eq!(config.run.tick_rate, 25);
        assert!(config.run.clamp);
        assert_eq!(config.transport.serializer, SerializerType::Binary);
        assert_eq!(config.transport.sender, SenderConfig::File { path: "frames.log".to_string() });
        assert_eq!(config.transport.chart_every, 5);

        let params = config.parameter_set().unwrap();
        assert_eq!(params.initial_positions, [0.05, 0.0, 0.0]);
        assert_eq!(params.masses, [0.2, 0.4, 0.2]);
        assert_eq!(params.springs, [10.0, 5.0, 12.0, 10.0]);
    }

    #[test]
    fn load_toml_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("oscillators.toml");
        file.write_str(
            r#"
            [parameters]
            v3 = -0.5
            duration = 4.0

            [transport.sender]
            type = "null"
            "#,
        )
        .unwrap();

        let config = ConfigLoader::from_file(file.path()).unwrap();
        assert_eq!(config.transport.sender, SenderConfig::Null);
        assert_eq!(config.run, RunSettings::default());
        let params = config.parameter_set().unwrap();
        assert_eq!(params.initial_velocities, [0.0, 0.0, -0.5]);
        assert_eq!(params.t_max, 4.0);
        temp.close().unwrap();
    }

    #[test]
    fn clamping_enforces_slider_ranges() {
        let input = ParameterInput {
            x1: Some(0.5),
            v2: Some(-3.0),
            m3: Some(0.0),
            k4: Some(50.0),
            ..ParameterInput::default()
        };
        let params = input.to_parameter_set(true).unwrap();
        assert_eq!(params.initial_positions[0], 0.1);
        assert_eq!(params.initial_velocities[1], -1.0);
        assert_eq!(params.masses[2], 0.1);
        assert_eq!(params.springs[3], 20.0);
    }

    #[test]
    fn zero_mass_without_clamping_is_a_configuration_error() {
        let input = ParameterInput { m1: Some(0.0), ..ParameterInput::default() };
        let result = input.to_parameter_set(false);
        assert!(matches!(
            result,
            Err(ConfigError::Parameters(ParameterError::NonPositiveMass { index: 1, .. }))
        ));
    }

    #[test]
    fn overrides_update_fields() {
        let mut input = ParameterInput::default();
        input.apply_override("k2=7.5").unwrap();
        input.apply_override(" window = 2 ").unwrap();
        assert_eq!(input.k2, Some(7.5));
        assert_eq!(input.window, Some(2.0));

        assert!(matches!(input.apply_override("k9=1"), Err(ConfigError::InvalidOverride(_))));
        assert!(matches!(input.apply_override("m1"), Err(ConfigError::InvalidOverride(_))));
        assert!(matches!(input.apply_override("m1=heavy"), Err(ConfigError::InvalidOverride(_))));
    }

    #[test]
    fn validate_rejects_zero_tick_rate() {
        let mut config = Config::default();
        config.run.tick_rate = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn validate_surfaces_parameter_errors() {
        let mut config = Config::default();
        config.run.clamp = false;
        config.parameters.m2 = Some(-0.2);
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::Parameters(_))));
    }
}
