//! On-disk configuration for bulbmarch.
//!
//! A single TOML document with four optional sections. Every key has a
//! default, so an empty or missing file is a valid configuration:
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//!
//! [animation]
//! time_divisor = 1500.0
//! fps = 30
//! run_for = "5m"
//! track_pointer = true
//!
//! [gpu]
//! power = "high"
//! vsync = true
//!
//! [still]
//! width = 800
//! height = 600
//! timestamp = "45s"
//! pointer = [0.0, 0.0]
//! ```
//!
//! Durations accept either a number of seconds or a humantime string.
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BulbConfig {
    pub window: WindowSection,
    pub animation: AnimationSection,
    pub gpu: GpuSection,
    pub still: StillSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "bulbmarch".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationSection {
    /// Host milliseconds per shader second.
    pub time_divisor: f32,
    /// Frame cap; absent or zero renders once per display refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    /// Stop the loop after this much wall-clock time.
    #[serde(
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub run_for: Option<Duration>,
    /// Feed cursor and touch positions into the pointer uniform.
    pub track_pointer: bool,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            time_divisor: 1500.0,
            fps: None,
            run_for: None,
            track_pointer: true,
        }
    }
}

impl AnimationSection {
    /// Positive frame cap, if any.
    pub fn fps_cap(&self) -> Option<f32> {
        self.fps.filter(|fps| *fps > 0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerPreference {
    Low,
    #[default]
    High,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GpuSection {
    pub power: PowerPreference,
    pub vsync: bool,
}

impl Default for GpuSection {
    fn default() -> Self {
        Self {
            power: PowerPreference::High,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StillSection {
    pub width: u32,
    pub height: u32,
    /// Host timestamp of the exported frame; divided like a live frame.
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timestamp: Duration,
    pub pointer: [f32; 2],
}

impl Default for StillSection {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            timestamp: Duration::ZERO,
            pointer: [0.0, 0.0],
        }
    }
}

impl BulbConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero (got {}x{})",
                self.window.width, self.window.height
            )));
        }
        if self.still.width == 0 || self.still.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "still size must be non-zero (got {}x{})",
                self.still.width, self.still.height
            )));
        }
        let divisor = self.animation.time_divisor;
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_divisor must be a positive number (got {divisor})"
            )));
        }
        if let Some(fps) = self.animation.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "fps must be zero or positive (got {fps})"
                )));
            }
        }
        if self.still.pointer.iter().any(|value| !value.is_finite()) {
            return Err(ConfigError::Invalid(
                "still pointer coordinates must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses a duration from seconds (`"12.5"`) or humantime (`"1m 30s"`).
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_nan() || seconds.is_sign_negative() || seconds.is_infinite() {
            return Err(format!("duration must be non-negative (got '{trimmed}')"));
        }
        return Ok(Duration::from_secs_f64(seconds));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(Option::unwrap_or_default)
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_duration(v).map(Some).map_err(E::custom)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() || v.is_infinite() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serialize_duration(duration, serializer),
        None => serializer.serialize_none(),
    }
}
