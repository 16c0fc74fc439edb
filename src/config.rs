// Copyright (c) 2026 rezky_nightky

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::keymap::{default_bindings, KeyMap};
use crate::overlay::ArtError;

pub const DEFAULT_CONFIG_PATH: &str = "nimbus.toml";
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 240;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("unknown key binding action: {0}")]
    UnknownAction(String),
    #[error("unrecognized key {key:?} for {action}")]
    UnknownKey { action: String, key: String },
    #[error("key {key:?} is bound to both {first} and {second}")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Art(#[from] ArtError),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "nimbus", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "config",
        default_value = DEFAULT_CONFIG_PATH,
        help_heading = "GENERAL",
        help = "Settings file (created with defaults if missing)"
    )]
    pub config: PathBuf,

    #[arg(
        short = 'f',
        long = "fps",
        help_heading = "GENERAL",
        help = "Override the configured frame rate (min 1 max 240)"
    )]
    pub fps: Option<u32>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,256,24). Default: detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "no-clouds",
        help_heading = "APPEARANCE",
        help = "Start with the cloud overlay hidden"
    )]
    pub no_clouds: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random generator for a repeatable run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with NIMBUS_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "print-config",
        help_heading = "HELP",
        help = "Print the effective settings as TOML and exit"
    )]
    pub print_config: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSettings {
    pub rate: u32,
    pub show_status: bool,
    pub show_clouds: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSettings {
    pub max_count: usize,
    pub spawn_quota: f64,
    pub spawn_charge: i32,
    pub max_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    pub gravitation: f64,
    pub wind: f64,
    pub wind_variation: f64,
    pub temperature_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub frame: FrameSettings,
    pub particles: ParticleSettings,
    pub physics: PhysicsSettings,
    #[serde(default = "default_bindings")]
    pub keys: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame: FrameSettings {
                rate: 30,
                show_status: true,
                show_clouds: true,
                art_dir: None,
            },
            particles: ParticleSettings {
                max_count: 500,
                spawn_quota: 3.0,
                spawn_charge: 1,
                max_speed: 1.4,
            },
            physics: PhysicsSettings {
                gravitation: 0.02,
                wind: 0.0,
                wind_variation: 0.0,
                temperature_delta: 0.0,
            },
            keys: default_bindings(),
        }
    }
}

fn require_finite(field: &'static str, v: f64) -> Result<(), SettingsError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("{v} is not a finite number"),
        })
    }
}

fn require_positive(field: &'static str, v: f64) -> Result<(), SettingsError> {
    require_finite(field, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("{v} must be greater than 0"),
        })
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_FPS..=MAX_FPS).contains(&self.frame.rate) {
            return Err(SettingsError::Invalid {
                field: "frame.rate",
                reason: format!("{} (min {} max {})", self.frame.rate, MIN_FPS, MAX_FPS),
            });
        }
        if self.particles.max_count == 0 {
            return Err(SettingsError::Invalid {
                field: "particles.max_count",
                reason: "must be at least 1".to_string(),
            });
        }
        require_positive("particles.spawn_quota", self.particles.spawn_quota)?;
        require_positive("particles.max_speed", self.particles.max_speed)?;
        require_finite("physics.gravitation", self.physics.gravitation)?;
        require_finite("physics.wind", self.physics.wind)?;
        require_finite("physics.wind_variation", self.physics.wind_variation)?;
        if self.physics.wind_variation < 0.0 {
            return Err(SettingsError::Invalid {
                field: "physics.wind_variation",
                reason: format!("{} must not be negative", self.physics.wind_variation),
            });
        }
        require_finite("physics.temperature_delta", self.physics.temperature_delta)?;
        Ok(())
    }

    pub fn from_toml(path: &Path, text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn resolve(self) -> Result<(Settings, KeyMap), SettingsError> {
        self.validate()?;
        let keymap = KeyMap::resolve(&self.keys)?;
        Ok((self, keymap))
    }
}

#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Settings, SettingsError> {
        let text = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        Settings::from_toml(&self.path, &text)
    }

    pub fn load_or_init(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            let settings = Settings::default();
            self.save(&settings)?;
            info!(path = %self.path.display(), "wrote default settings");
            return Ok(settings);
        }
        self.load()
    }

    /// Writes through a sibling temp file so a failed save leaves the old
    /// file intact.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        let text = settings.to_toml()?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, text).map_err(io_err)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(e));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn scratch_dir(tag: &str) -> PathBuf {
    use std::sync::atomic::{AtomicU32, Ordering};
    static NEXT: AtomicU32 = AtomicU32::new(0);

    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "nimbus-{}-{}-{}",
        tag,
        std::process::id(),
        n
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips_tunables() {
        let dir = scratch_dir("roundtrip");
        let store = SettingsStore::new(dir.join("nimbus.toml"));

        let mut s = Settings::default();
        s.frame.rate = 45;
        s.physics.gravitation = -0.15;
        s.physics.wind = 0.35;
        s.physics.wind_variation = 0.07;
        s.physics.temperature_delta = -1.25;
        s.particles.max_speed = 2.2;
        store.save(&s).unwrap();

        let back = store.load().unwrap();
        assert_eq!(back, s);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = scratch_dir("init");
        let store = SettingsStore::new(dir.join("fresh.toml"));
        let s = store.load_or_init().unwrap();
        assert_eq!(s, Settings::default());
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), s);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn default_file_keeps_short_decimals() {
        let dir = scratch_dir("decimals");
        let store = SettingsStore::new(dir.join("nimbus.toml"));
        store.load_or_init().unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("gravitation = 0.02\n"), "{text}");
        assert!(text.contains("max_speed = 1.4\n"), "{text}");
        assert!(text.contains("spawn_quota = 3.0\n"), "{text}");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_required_key_fails_to_parse() {
        let text = r#"
[frame]
rate = 30
show_status = true
show_clouds = true

[particles]
max_count = 500
spawn_quota = 3.0
spawn_charge = 1

[physics]
gravitation = 0.02
wind = 0.0
wind_variation = 0.0
temperature_delta = 0.0
"#;
        let err = Settings::from_toml(Path::new("x.toml"), text).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn keys_section_is_optional() {
        let text = Settings::default().to_toml().unwrap();
        let without_keys = text.split("[keys]").next().unwrap().to_string();
        let s = Settings::from_toml(Path::new("x.toml"), &without_keys).unwrap();
        assert_eq!(s.keys, default_bindings());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut s = Settings::default();
        s.frame.rate = 0;
        assert!(matches!(
            s.validate(),
            Err(SettingsError::Invalid {
                field: "frame.rate",
                ..
            })
        ));

        let mut s = Settings::default();
        s.physics.wind_variation = -0.1;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.particles.max_speed = f64::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn load_of_missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        let store = SettingsStore::new(dir.join("nope.toml"));
        assert!(matches!(store.load(), Err(SettingsError::Io { .. })));
        let _ = fs::remove_dir_all(dir);
    }
}
