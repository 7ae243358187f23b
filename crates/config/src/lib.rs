//! Configuration models and loaders for body catalogs and comparison scenarios.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Celestial body entry of a body catalog.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
    pub ephemeris: EphemerisConfig,
}

/// Ephemeris source for a body.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum EphemerisConfig {
    /// Mean-element planet ephemeris; `planet` defaults to the body name.
    #[serde(rename = "approximate")]
    Approximate {
        #[serde(default)]
        planet: Option<String>,
    },
    #[serde(rename = "fixed")]
    Fixed {
        #[serde(default)]
        position_km: [f64; 3],
        #[serde(default)]
        velocity_km_s: [f64; 3],
    },
}

/// Comparison scenario: the mission plus the propagation environment.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    /// Body catalog path, relative to the scenario file.
    #[serde(default)]
    pub body_catalog: Option<PathBuf>,
    /// Inline bodies; these replace catalog entries of the same name.
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
    pub mission: MissionConfig,
    pub acceleration: AccelerationConfig,
    #[serde(default)]
    pub integrator: IntegratorConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MissionConfig {
    /// Defaults to the number of leg types.
    #[serde(default)]
    pub number_of_legs: Option<usize>,
    pub bodies: Vec<String>,
    pub leg_types: Vec<LegTypeConfig>,
    /// `[t0 (days past J2000), leg durations (days), DSM blocks]`.
    pub parameters: Vec<f64>,
    #[serde(default)]
    pub minimum_pericenter_radii_km: Vec<f64>,
    #[serde(default)]
    pub departure_orbit: Option<OrbitShapeConfig>,
    #[serde(default)]
    pub capture_orbit: Option<OrbitShapeConfig>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LegTypeConfig {
    Departure,
    Swingby,
    #[serde(alias = "swingby_with_dsm")]
    SwingbyDsm,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct OrbitShapeConfig {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccelerationConfig {
    pub central_body: String,
    #[serde(default)]
    pub third_bodies: Vec<String>,
    #[serde(default = "default_true")]
    pub exclude_leg_bodies: bool,
}

/// Integrator selection; unspecified fields fall back to the defaults below.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "type")]
pub enum IntegratorConfig {
    #[serde(rename = "rk4")]
    Rk4 {
        #[serde(default = "default_rk4_step")]
        step_s: f64,
    },
    #[serde(rename = "rkf78")]
    Rkf78 {
        #[serde(default = "default_initial_step")]
        initial_step_s: f64,
        #[serde(default = "default_min_step")]
        min_step_s: f64,
        #[serde(default = "default_max_step")]
        max_step_s: f64,
        #[serde(default = "default_relative_tolerance")]
        relative_tolerance: f64,
        #[serde(default = "default_absolute_tolerance")]
        absolute_tolerance: f64,
        #[serde(default = "default_max_steps")]
        max_steps: u64,
    },
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self::Rkf78 {
            initial_step_s: default_initial_step(),
            min_step_s: default_min_step(),
            max_step_s: default_max_step(),
            relative_tolerance: default_relative_tolerance(),
            absolute_tolerance: default_absolute_tolerance(),
            max_steps: default_max_steps(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EpochOriginConfig {
    #[default]
    Shared,
    LegDeparture,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnchorConfig {
    #[default]
    Departure,
    Midpoint,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ComparisonConfig {
    #[serde(default)]
    pub epoch_origin: EpochOriginConfig,
    /// Start epoch of every leg when `epoch_origin` is `shared` (seconds past J2000).
    #[serde(default)]
    pub shared_epoch_s: f64,
    #[serde(default)]
    pub anchor: AnchorConfig,
    #[serde(default = "default_analytic_samples")]
    pub analytic_samples: usize,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            epoch_origin: EpochOriginConfig::default(),
            shared_epoch_s: 0.0,
            anchor: AnchorConfig::default(),
            analytic_samples: default_analytic_samples(),
            parallel: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rk4_step() -> f64 {
    3_600.0
}

fn default_initial_step() -> f64 {
    3_600.0
}

fn default_min_step() -> f64 {
    1e-3
}

fn default_max_step() -> f64 {
    5.0 * 86_400.0
}

fn default_relative_tolerance() -> f64 {
    1e-12
}

fn default_absolute_tolerance() -> f64 {
    1e-9
}

fn default_max_steps() -> u64 {
    1_000_000
}

fn default_analytic_samples() -> usize {
    200
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0} contains no scenario")]
    EmptyScenario(PathBuf),
}

/// Load a body catalog (YAML list, single TOML record, or a directory of TOML records).
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    load_records(path)
}

/// Load a scenario from YAML or TOML; a relative `body_catalog` is resolved
/// against the scenario's directory.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let path = path.as_ref();
    let mut scenario = if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str::<ScenarioConfig>(&contents)?
    } else {
        let reader = File::open(path)?;
        serde_yaml::from_reader::<_, ScenarioConfig>(reader)?
    };

    if let Some(catalog) = scenario.body_catalog.take() {
        let resolved = match path.parent() {
            Some(dir) if catalog.is_relative() => dir.join(catalog),
            _ => catalog,
        };
        scenario.body_catalog = Some(resolved);
    }
    Ok(scenario)
}

/// Load every scenario from a directory of TOML files, sorted by file name.
pub fn load_scenarios<P: AsRef<Path>>(dir: P) -> Result<Vec<ScenarioConfig>, ConfigError> {
    let dir = dir.as_ref();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    if entries.is_empty() {
        return Err(ConfigError::EmptyScenario(dir.to_path_buf()));
    }
    entries.iter().map(load_scenario).collect()
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
