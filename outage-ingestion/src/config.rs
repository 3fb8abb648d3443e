use serde::Deserialize;
use std::{fs, path::PathBuf};

use anyhow::{bail, Context};
use outage_domain::domain::{
    timestamp::{parse_offset, parse_timestamp},
    Aggregation,
};
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::transform::PreprocessOptions;

const DEFAULT_CONFIG_PATH: &str = "outage-config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub plant_type: String,
    pub min_duration_hours: Option<f64>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            plant_type: "Nuclear".to_string(),
            min_duration_hours: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub by: String,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            by: Aggregation::ProductionUnit.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub display_offset: String,
    pub cache_path: Option<PathBuf>,
    pub events_path: Option<PathBuf>,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            display_offset: "+01:00".to_string(),
            cache_path: None,
            events_path: None,
            window_start: None,
            window_end: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub textfile_path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub preprocess: PreprocessConfig,
    pub aggregate: AggregateConfig,
    pub output: OutputConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Loads from `OUTAGE_CONFIG`, falling back to `outage-config.toml`.
    /// Built-in defaults apply when neither is set up.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let (path, explicit) = match env::var("OUTAGE_CONFIG") {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !explicit && !path.exists() {
            tracing::debug!("no config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Checks every derived setting so mistakes surface before any data is read.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.preprocess_options()?;
        self.aggregation()?;
        self.display_offset()?;
        self.window()?;
        Ok(())
    }

    pub fn preprocess_options(&self) -> anyhow::Result<PreprocessOptions> {
        let min_duration = match self.preprocess.min_duration_hours {
            None => None,
            Some(hours) if !hours.is_finite() || hours < 0.0 => {
                bail!("preprocess.min_duration_hours must be a non-negative number, got {hours}")
            }
            Some(hours) => match Duration::checked_seconds_f64(hours * 3600.0) {
                Some(d) => Some(d),
                None => bail!("preprocess.min_duration_hours is out of range, got {hours}"),
            },
        };
        Ok(PreprocessOptions {
            plant_type: self.preprocess.plant_type.clone(),
            min_duration,
        })
    }

    pub fn aggregation(&self) -> anyhow::Result<Aggregation> {
        Ok(self.aggregate.by.parse()?)
    }

    pub fn display_offset(&self) -> anyhow::Result<UtcOffset> {
        parse_offset(&self.output.display_offset).context("output.display_offset")
    }

    /// `[start, end)` restriction, if either bound is configured.
    pub fn window(&self) -> anyhow::Result<Option<(OffsetDateTime, OffsetDateTime)>> {
        let bound = |raw: &Option<String>, name: &str| -> anyhow::Result<Option<OffsetDateTime>> {
            raw.as_deref()
                .map(|s| parse_timestamp(s).with_context(|| format!("output.{name}")))
                .transpose()
        };
        let start = bound(&self.output.window_start, "window_start")?;
        let end = bound(&self.output.window_end, "window_end")?;
        if start.is_none() && end.is_none() {
            return Ok(None);
        }

        let start = start.unwrap_or_else(|| PrimitiveDateTime::MIN.assume_utc());
        let end = end.unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc());
        if start > end {
            bail!("output.window_start is after output.window_end");
        }
        Ok(Some((start, end)))
    }
}
