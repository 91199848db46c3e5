use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tessera_light::{AoMode, AoOptions};

use crate::error::ConfigError;

/// Renderer settings, read once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    pub ao_mode: AoMode,
    /// Global smooth-lighting switch; off means every quad is flat shaded.
    pub ambient_occlusion: bool,
    pub cull_faces: bool,
    pub center_origin_quirk: bool,
    pub corner_floor: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        let ao = AoOptions::default();
        Self {
            ao_mode: ao.mode,
            ambient_occlusion: true,
            cull_faces: true,
            center_origin_quirk: ao.center_origin_quirk,
            corner_floor: ao.corner_floor,
        }
    }
}

// --- File format ---

// Every key is kept as a raw value so one bad entry only loses itself.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    ambient_occlusion_mode: Option<toml::Value>,
    ambient_occlusion: Option<toml::Value>,
    cull_faces: Option<toml::Value>,
    ao: Option<toml::Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawAo {
    center_origin_quirk: Option<toml::Value>,
    corner_floor: Option<toml::Value>,
}

/// Reads `value` as a `T`, logging and keeping `default` when it does not fit.
fn field<T: DeserializeOwned>(key: &str, value: Option<toml::Value>, default: T) -> T {
    match value.map(|v| v.try_into::<T>()) {
        None => default,
        Some(Ok(v)) => v,
        Some(Err(err)) => {
            log::warn!("renderer config `{key}`: {err}; using default");
            default
        }
    }
}

impl RendererConfig {
    pub fn ao_options(&self) -> AoOptions {
        AoOptions {
            mode: self.ao_mode,
            center_origin_quirk: self.center_origin_quirk,
            corner_floor: self.corner_floor,
        }
    }

    /// Parses a config. Only broken TOML syntax is an error: a key with the
    /// wrong type or an unknown AO mode is logged and falls back to its own
    /// default while the other keys are kept.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(toml_str)?;
        let defaults = Self::default();
        let ao_mode = match field::<Option<String>>("ambient_occlusion_mode", raw.ambient_occlusion_mode, None) {
            None => defaults.ao_mode,
            Some(name) => name.parse().unwrap_or_else(|err| {
                log::warn!("{err}; using {}", defaults.ao_mode);
                defaults.ao_mode
            }),
        };
        let ao: RawAo = field("ao", raw.ao, RawAo::default());
        Ok(Self {
            ao_mode,
            ambient_occlusion: field("ambient_occlusion", raw.ambient_occlusion, defaults.ambient_occlusion),
            cull_faces: field("cull_faces", raw.cull_faces, defaults.cull_faces),
            center_origin_quirk: field("ao.center_origin_quirk", ao.center_origin_quirk, defaults.center_origin_quirk),
            corner_floor: field("ao.corner_floor", ao.corner_floor, defaults.corner_floor),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    /// Like [`from_path`](Self::from_path) but never fails; problems are
    /// logged and defaults used.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(cfg) => {
                log::info!("renderer config loaded from {}", path.display());
                cfg
            }
            Err(err) => {
                log::warn!("{err}; using default renderer config");
                Self::default()
            }
        }
    }
}
