//! Persisted pairing profiles for mowerlink tools.
//!
//! TOML profiles under the platform config directory, merged with
//! `MOWERLINK_*` environment overrides, and translation to
//! `mowerlink_core::MowerConfig`. The pairing flow's output lands here;
//! the CLI and embedding bridges read it back.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mowerlink_core::{BleAddress, MowerConfig, PairedMower};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    /// Timing defaults applied to every profile.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named mower profiles, one per paired device.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: None,
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    #[serde(default = "default_staleness_window")]
    pub staleness_window_secs: u64,

    #[serde(default = "default_link_timeout")]
    pub link_timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            settle_delay_secs: default_settle_delay(),
            staleness_window_secs: default_staleness_window(),
            link_timeout_secs: default_link_timeout(),
        }
    }
}

fn default_poll_interval() -> u64 {
    60
}
fn default_settle_delay() -> u64 {
    2
}
fn default_staleness_window() -> u64 {
    12 * 60
}
fn default_link_timeout() -> u64 {
    30
}

/// One paired mower.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// BLE address, `XX:XX:XX:XX:XX:XX`.
    pub address: String,

    /// Channel id generated at pairing time. The device associates the
    /// pairing with it; regenerating requires re-pairing.
    pub channel_id: u32,

    /// Operator PIN; absent when the device is not PIN-protected.
    pub pin: Option<u32>,

    /// Display name, usually the probed device title.
    pub name: Option<String>,

    /// Per-profile timing overrides.
    pub poll_interval_secs: Option<u64>,
    pub settle_delay_secs: Option<u64>,
    pub staleness_window_secs: Option<u64>,
    pub link_timeout_secs: Option<u64>,
}

impl Profile {
    /// Build a profile from a completed pairing.
    pub fn from_paired(paired: &PairedMower) -> Self {
        Self {
            address: paired.address.to_string(),
            channel_id: paired.channel_id,
            pin: paired.pin,
            name: Some(paired.title.clone()),
            poll_interval_secs: None,
            settle_delay_secs: None,
            staleness_window_secs: None,
            link_timeout_secs: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "mowerlink", "mowerlink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mowerlink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from a specific file + environment.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MOWERLINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning defaults if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to a specific path.
pub fn save_config_to(cfg: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Pick the active profile: explicit name, else the configured
/// default, else the sole profile when exactly one exists.
pub fn active_profile<'a>(
    cfg: &'a Config,
    requested: Option<&'a str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    if let Some(name) = requested {
        let profile = cfg
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.to_owned(),
            })?;
        return Ok((name, profile));
    }

    if let Some(ref name) = cfg.default_profile {
        if let Some(profile) = cfg.profiles.get(name) {
            return Ok((name.as_str(), profile));
        }
    }

    if cfg.profiles.len() == 1 {
        let (name, profile) = cfg
            .profiles
            .iter()
            .next()
            .expect("len == 1 guarantees an entry");
        return Ok((name.as_str(), profile));
    }

    Err(ConfigError::UnknownProfile {
        profile: requested.unwrap_or("<default>").to_owned(),
    })
}

/// Add or replace a profile and make it the default when it is the
/// first one.
pub fn upsert_profile(cfg: &mut Config, name: &str, profile: Profile) {
    let first = cfg.profiles.is_empty();
    cfg.profiles.insert(name.to_owned(), profile);
    if first {
        cfg.default_profile = Some(name.to_owned());
    }
}

/// Translate a profile into a runtime `MowerConfig`, applying the
/// global defaults where the profile has no override.
pub fn profile_to_mower_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<MowerConfig, ConfigError> {
    let address =
        BleAddress::parse(&profile.address).map_err(|e| ConfigError::Validation {
            field: "address".into(),
            reason: e.to_string(),
        })?;

    if profile.channel_id == 0 {
        return Err(ConfigError::Validation {
            field: "channel_id".into(),
            reason: "must be non-zero; re-pair the device".into(),
        });
    }

    let mut config = MowerConfig::for_address(address, profile.channel_id, profile.pin);
    config.poll_interval = Duration::from_secs(
        profile
            .poll_interval_secs
            .unwrap_or(defaults.poll_interval_secs),
    );
    config.settle_delay = Duration::from_secs(
        profile
            .settle_delay_secs
            .unwrap_or(defaults.settle_delay_secs),
    );
    config.staleness_window = Duration::from_secs(
        profile
            .staleness_window_secs
            .unwrap_or(defaults.staleness_window_secs),
    );
    config.link_timeout = Duration::from_secs(
        profile
            .link_timeout_secs
            .unwrap_or(defaults.link_timeout_secs),
    );
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> Profile {
        Profile {
            address: "AA:BB:CC:DD:EE:FF".into(),
            channel_id: 0x1234_5678,
            pin: Some(1234),
            name: Some("Husqvarna Automower 305".into()),
            poll_interval_secs: None,
            settle_delay_secs: None,
            staleness_window_secs: None,
            link_timeout_secs: None,
        }
    }

    #[test]
    fn profile_translates_with_defaults() {
        let config = profile_to_mower_config(&profile(), &Defaults::default()).unwrap();
        assert_eq!(config.address.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(config.channel_id, 0x1234_5678);
        assert_eq!(config.pin, Some(1234));
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.staleness_window, Duration::from_secs(720));
    }

    #[test]
    fn profile_overrides_beat_defaults() {
        let mut p = profile();
        p.poll_interval_secs = Some(120);
        p.link_timeout_secs = Some(10);
        let config = profile_to_mower_config(&p, &Defaults::default()).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(120));
        assert_eq!(config.link_timeout, Duration::from_secs(10));
        assert_eq!(config.settle_delay, Duration::from_secs(2));
    }

    #[test]
    fn bad_address_is_a_validation_error() {
        let mut p = profile();
        p.address = "nope".into();
        let err = profile_to_mower_config(&p, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn zero_channel_id_is_rejected() {
        let mut p = profile();
        p.channel_id = 0;
        let err = profile_to_mower_config(&p, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        upsert_profile(&mut cfg, "garden", profile());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("garden"));
        let p = &loaded.profiles["garden"];
        assert_eq!(p.address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(p.channel_id, 0x1234_5678);
        assert_eq!(p.pin, Some(1234));
    }

    #[test]
    fn first_profile_becomes_the_default() {
        let mut cfg = Config::default();
        upsert_profile(&mut cfg, "garden", profile());
        assert_eq!(cfg.default_profile.as_deref(), Some("garden"));

        let mut other = profile();
        other.address = "11:22:33:44:55:66".into();
        upsert_profile(&mut cfg, "meadow", other);
        assert_eq!(cfg.default_profile.as_deref(), Some("garden"));
    }

    #[test]
    fn active_profile_prefers_the_explicit_name() {
        let mut cfg = Config::default();
        upsert_profile(&mut cfg, "garden", profile());
        let mut other = profile();
        other.address = "11:22:33:44:55:66".into();
        upsert_profile(&mut cfg, "meadow", other);

        let (name, p) = active_profile(&cfg, Some("meadow")).unwrap();
        assert_eq!(name, "meadow");
        assert_eq!(p.address, "11:22:33:44:55:66");
    }

    #[test]
    fn active_profile_falls_back_to_a_sole_profile() {
        let mut cfg = Config {
            default_profile: None,
            ..Config::default()
        };
        cfg.profiles.insert("only".into(), profile());
        let (name, _) = active_profile(&cfg, None).unwrap();
        assert_eq!(name, "only");
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            active_profile(&cfg, Some("missing")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn environment_overrides_the_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    default_profile = "garden"

                    [defaults]
                    poll_interval_secs = 60
                "#,
            )?;
            jail.set_env("MOWERLINK_DEFAULTS__POLL_INTERVAL_SECS", "15");

            let cfg = load_config_from(std::path::Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.poll_interval_secs, 15);
            Ok(())
        });
    }
}
