//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/nestrs/settings.toml (or platform equivalent)

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
    /// Audio settings
    pub audio: AudioSettings,
    /// Best score
    pub high_score: HighScore,
}

/// Key bindings (stored as strings for easy editing)
/// Each button can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_ccw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_cw: Vec<String>,
    /// Raise the starting level on the start screen
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub up: Vec<String>,
    /// Lower the starting level; soft drop during play
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub down: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    /// Hard drop, and confirm on the start/pause/game over screens
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// A binding as written in the file: one key or a list of keys
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyList {
    One(String),
    Many(Vec<String>),
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match KeyList::deserialize(deserializer)? {
        KeyList::One(key) => vec![key],
        KeyList::Many(keys) => keys,
    })
}

/// A lone key is written back as a plain string
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match keys {
        [key] => serializer.serialize_str(key),
        _ => keys.serialize(serializer),
    }
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Landing outline visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Level preselected on the start screen
    pub start_level: u32,
    /// How long a key counts as held without a new event, for terminals
    /// that do not report releases
    pub key_timeout_ms: u64,
}

/// Audio settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// SFX volume (0-100)
    pub sfx_volume: u32,
}

/// Best score across sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScore {
    pub best: u32,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["a".to_string()],
            move_right: vec!["d".to_string()],
            soft_drop: vec!["s".to_string()],
            rotate_ccw: vec!["Left".to_string()],
            rotate_cw: vec!["Right".to_string()],
            up: vec!["Up".to_string()],
            down: vec!["Down".to_string()],
            pause: vec!["p".to_string()],
            drop: vec!["Space".to_string()],
            quit: vec!["Esc".to_string(), "q".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            start_level: 0,
            key_timeout_ms: 100,
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { sfx_volume: 50 }
    }
}

impl Settings {
    fn settings_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "nestrs", "nestrs")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Read the settings file. Missing or unreadable files give defaults.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("No config directory on this platform, using defaults");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!("Loaded settings from {}", path.display());
                Self::parse(&contents)
            }
            Err(e) => {
                tracing::info!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|e| {
            tracing::warn!("Malformed settings, using defaults: {}", e);
            Self::default()
        })
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::settings_path().ok_or("No config directory on this platform")?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Cannot create {}: {}", dir.display(), e))?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Cannot serialize settings: {}", e))?;
        fs::write(&path, contents).map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;

        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Keep the better of the stored and the given score
    pub fn record_score(&mut self, score: u32) {
        self.high_score.best = self.high_score.best.max(score);
    }
}

impl VisualSettings {
    /// Get the block characters based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}
