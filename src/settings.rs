//! Game settings and per-mode configuration
//!
//! Loaded from an optional JSON file. Every field has a default, so a file
//! only needs to name what it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::{LevelError, LevelLayout};
use crate::sim::actor::Loadout;
use crate::sim::state::SimTuning;

/// Errors that can occur when loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in settings '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Which of the two games to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Arena shooter: clear every enemy
    #[default]
    Shooter,
    /// Platform station: open boxes and collect what they hold
    Station,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Shooter => "Shooter",
            GameMode::Station => "Station",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shooter" | "doom" | "fps" => Some(GameMode::Shooter),
            "station" | "platformer" | "space" => Some(GameMode::Station),
            _ => None,
        }
    }
}

/// How a session is won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinCondition {
    /// Every enemy dead
    ClearEnemies,
    /// This many collectibles picked up
    Collect { required: u32 },
}

/// Everything that differs between the two games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub mode: GameMode,
    pub level: LevelLayout,
    pub win: WinCondition,
    /// Countdown in seconds; `None` for no clock
    pub time_limit: Option<f32>,
    pub loadout: Loadout,
    /// Boxes open only while the interact button is held
    pub boxes_require_interact: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::shooter()
    }
}

impl ModeConfig {
    pub fn shooter() -> Self {
        Self {
            mode: GameMode::Shooter,
            level: LevelLayout::shooter_arena(),
            win: WinCondition::ClearEnemies,
            time_limit: Some(180.0),
            loadout: Loadout {
                health: 100,
                armor: 0,
                ammo: 30,
            },
            boxes_require_interact: true,
        }
    }

    pub fn station() -> Self {
        Self {
            mode: GameMode::Station,
            level: LevelLayout::space_station(),
            win: WinCondition::Collect { required: 3 },
            time_limit: Some(90.0),
            loadout: Loadout {
                health: 100,
                armor: 0,
                ammo: 20,
            },
            boxes_require_interact: true,
        }
    }

    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Shooter => Self::shooter(),
            GameMode::Station => Self::station(),
        }
    }

    /// Collectibles needed to win, if this mode wins by collecting
    pub fn required_collectibles(&self) -> Option<u32> {
        match self.win {
            WinCondition::Collect { required } => Some(required),
            WinCondition::ClearEnemies => None,
        }
    }
}

/// Top-level settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: GameMode,
    /// Run seed (effect spread only; gameplay does not roll dice)
    pub seed: u64,
    /// Replaces the mode preset entirely when present
    pub config: Option<ModeConfig>,
    /// Level file replacing the configured level
    pub level_path: Option<PathBuf>,
    pub tuning: SimTuning,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Shooter,
            seed: 0x5eed,
            config: None,
            level_path: None,
            tuning: SimTuning::default(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Read and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Best effort: fall back to defaults when the file is unusable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let m = &self.tuning.movement;
        let positive = [m.move_speed, m.gravity, m.radius, m.height]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        if !positive || !m.jump_impulse.is_finite() || m.jump_impulse < 0.0 {
            return Err(SettingsError::Invalid(format!("bad movement tuning {m:?}")));
        }
        let w = &self.tuning.weapon;
        if !w.range.is_finite() || w.range <= 0.0 || w.fire_interval < 0.0 {
            return Err(SettingsError::Invalid(format!("bad weapon tuning {w:?}")));
        }
        if let Some(config) = &self.config {
            if let Some(limit) = config.time_limit {
                if !limit.is_finite() || limit <= 0.0 {
                    return Err(SettingsError::Invalid(format!("time limit {limit} must be positive")));
                }
            }
            config.level.validate()?;
        }
        Ok(())
    }

    /// Resolve the configuration to run: preset or override, then level file
    pub fn mode_config(&self) -> Result<ModeConfig, SettingsError> {
        let mut config = self
            .config
            .clone()
            .unwrap_or_else(|| ModeConfig::for_mode(self.mode));
        if let Some(path) = &self.level_path {
            config.level = LevelLayout::from_path(path)?;
        }
        config.level.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_aliases() {
        assert_eq!(GameMode::from_str("DOOM"), Some(GameMode::Shooter));
        assert_eq!(GameMode::from_str("fps"), Some(GameMode::Shooter));
        assert_eq!(GameMode::from_str("Platformer"), Some(GameMode::Station));
        assert_eq!(GameMode::from_str("space"), Some(GameMode::Station));
        assert_eq!(GameMode::from_str("chess"), None);
        for mode in [GameMode::Shooter, GameMode::Station] {
            assert_eq!(GameMode::from_str(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn test_presets_differ_where_expected() {
        let shooter = ModeConfig::shooter();
        let station = ModeConfig::station();
        assert_eq!(shooter.win, WinCondition::ClearEnemies);
        assert_eq!(station.required_collectibles(), Some(3));
        assert!(station.level.floor.is_none());
        assert_eq!(ModeConfig::for_mode(GameMode::Station), station);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "mode": "Station", "tuning": { "max_messages": 4 } }"#).unwrap();
        assert_eq!(settings.mode, GameMode::Station);
        assert_eq!(settings.tuning.max_messages, 4);
        assert_eq!(settings.tuning.max_particles, SimTuning::default().max_particles);
        assert_eq!(settings.mode_config().unwrap().mode, GameMode::Station);
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let mut settings = Settings::default();
        settings.tuning.movement.gravity = -1.0;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_override_level_is_validated() {
        let settings: Settings =
            serde_json::from_str(r#"{ "config": { "level": { "player_spawn": [0.0, -50.0, 0.0] } } }"#)
                .unwrap();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Level(LevelError::Invalid(_)))
        ));
        assert!(matches!(
            settings.mode_config(),
            Err(SettingsError::Level(LevelError::Invalid(_)))
        ));

        let path = std::env::temp_dir().join("station_strike_bad_spawn_settings.json");
        std::fs::write(&path, r#"{ "config": { "level": { "player_spawn": [0.0, -50.0, 0.0] } } }"#)
            .unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Level(_))));
        assert_eq!(Settings::load_or_default(&path), Settings::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let settings = Settings::load_or_default("/no/such/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_level_file_surfaces_level_error() {
        let settings = Settings {
            level_path: Some(PathBuf::from("/no/such/level.json")),
            ..Default::default()
        };
        assert!(matches!(
            settings.mode_config(),
            Err(SettingsError::Level(LevelError::Io { .. }))
        ));
    }
}
