use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::genre::{self, DEFAULT_GENRE_SIMILARITY_THRESHOLD};
use crate::model::{Catalog, SongTypeDefinition};
use crate::sources::{SourceKind, TypeMatchPolicy};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration loaded from TOML config file.
/// Every field has a default, so the file itself is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Artist names that contain a separator but must never be split.
    pub known_artists: Vec<String>,
    /// Reference genre list tag genres are resolved against.
    pub genres: Vec<String>,
    /// Song-type catalog, e.g. `[[song_types]] name = "Remix"`.
    pub song_types: Vec<SongTypeDefinition>,
    /// Metadata sources to run, in order.
    pub sources: Vec<SourceKind>,
    pub genre_similarity_threshold: f64,
    pub type_match: TypeMatchPolicy,
    /// Split leading artists on " - " before a bare '-' ("Jay-Z - Song").
    pub prefer_spaced_hyphen: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            known_artists: Vec::new(),
            genres: genre::builtin_genres(),
            song_types: builtin_song_types(),
            sources: vec![SourceKind::Tags, SourceKind::Duration],
            genre_similarity_threshold: DEFAULT_GENRE_SIMILARITY_THRESHOLD,
            type_match: TypeMatchPolicy::default(),
            prefer_spaced_hyphen: false,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/songmeta/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be read or parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("{} ({}). Using defaults.", e, path.display());
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load an explicit config file. Unlike [`AppConfig::load`], errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reference data handed to each `analyse` call.
    pub fn catalog(&self) -> Catalog {
        Catalog {
            song_types: self.song_types.clone(),
            genres: self.genres.clone(),
        }
    }
}

/// Built-in song-type catalog, used when the config does not provide its own.
pub fn builtin_song_types() -> Vec<SongTypeDefinition> {
    vec![
        SongTypeDefinition::new("Remix", "Remix", true, &["Mix", "Extended Remix", "Rework", "Remake"]),
        SongTypeDefinition::new("Extended Mix", "Extended", false, &["Extended", "Extended Version", "Club Mix"]),
        SongTypeDefinition::new("Radio Edit", "Edit", false, &["Radio Mix", "Radio Version"]),
        SongTypeDefinition::new("Edit", "Edit", true, &["Re-Edit", "Club Edit"]),
        SongTypeDefinition::new("Bootleg", "Remix", true, &["Flip"]),
        SongTypeDefinition::new("Mashup", "Remix", true, &["Mash-Up", "Mash Up"]),
        SongTypeDefinition::new("VIP Mix", "Remix", false, &["VIP"]),
        SongTypeDefinition::new("Dub Mix", "Extended", false, &["Dub Version"]),
        SongTypeDefinition::new("Instrumental", "Instrumental", false, &["Instrumental Mix"]),
        SongTypeDefinition::new("Acoustic", "Acoustic", false, &["Acoustic Version", "Unplugged"]),
    ]
}
