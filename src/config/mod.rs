//! Configuration for quickmarks.
//!
//! Configuration comes in two layers:
//!
//! - [`Settings`]: plain data, loaded from `~/.config/quickmarks/config.toml`
//!   and mergeable with a [`PartialSettings`] override at any time.
//! - [`Config`]: the settings plus the item [`Codec`]s attached to lists. A
//!   list gets its codec from a per-list override when one is registered and
//!   from the default codec otherwise.
//!
//! # Example
//!
//! ```
//! use quickmarks::codec::PlainCodec;
//! use quickmarks::config::Config;
//! use std::rc::Rc;
//!
//! let config: Config<String> = Config::new(Rc::new(PlainCodec));
//! assert!(!config.settings.ui_nav_wrap);
//!
//! let options = config.list_config("commands").options;
//! assert!(options.encode);
//! assert!(!options.select_with_nil);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::error::{Error, Result};

/// Per-list behavior switches.
///
/// * `select_with_nil` - Call the codec's select even when the index holds no item (default: false)
/// * `encode` - Include the list in persistence on sync (default: true)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(default)]
    pub select_with_nil: bool,

    #[serde(default = "default_encode")]
    pub encode: bool,
}

fn default_encode() -> bool {
    true
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            select_with_nil: false,
            encode: default_encode(),
        }
    }
}

impl ListOptions {
    /// Returns these options with every field set in `partial` replaced.
    pub fn merge(self, partial: &PartialListOptions) -> Self {
        Self {
            select_with_nil: partial.select_with_nil.unwrap_or(self.select_with_nil),
            encode: partial.encode.unwrap_or(self.encode),
        }
    }
}

/// A sparse override of [`ListOptions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialListOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_with_nil: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encode: Option<bool>,
}

impl PartialListOptions {
    fn overlay(&mut self, other: &PartialListOptions) {
        if other.select_with_nil.is_some() {
            self.select_with_nil = other.select_with_nil;
        }
        if other.encode.is_some() {
            self.encode = other.encode;
        }
    }
}

/// Global settings.
///
/// * `ui_nav_wrap` - Wrap around list ends on next/prev (default: false)
/// * `data_path` - Where list data is persisted (default: platform data dir)
/// * `default` - Options applied to every list
/// * `lists` - Per-list overrides on top of `default`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ui_nav_wrap: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    #[serde(default)]
    pub default: ListOptions,

    #[serde(default)]
    pub lists: IndexMap<String, PartialListOptions>,
}

/// A sparse override of [`Settings`], as accepted by `Registry::setup`.
///
/// There is no `data_path` here: the store is chosen when the registry is
/// built, so the data location can only come from [`Settings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialSettings {
    #[serde(default)]
    pub ui_nav_wrap: Option<bool>,

    #[serde(default)]
    pub default: Option<PartialListOptions>,

    #[serde(default)]
    pub lists: IndexMap<String, PartialListOptions>,
}

impl PartialSettings {
    /// Parses a partial override from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

impl Settings {
    /// Overlays every field present in `partial`.
    pub fn merge(&mut self, partial: &PartialSettings) {
        if let Some(wrap) = partial.ui_nav_wrap {
            self.ui_nav_wrap = wrap;
        }
        if let Some(default) = &partial.default {
            self.default = self.default.merge(default);
        }
        for (name, options) in &partial.lists {
            self.lists.entry(name.clone()).or_default().overlay(options);
        }
    }

    /// Resolves the effective options for the list called `name`.
    pub fn options_for(&self, name: &str) -> ListOptions {
        match self.lists.get(name) {
            Some(partial) => self.default.merge(partial),
            None => self.default,
        }
    }

    /// Rejects settings no list could be looked up by.
    pub fn validate(&self) -> Result<()> {
        if self.lists.keys().any(|name| name.trim().is_empty()) {
            return Err(Error::InvalidConfig("list names must not be empty".to_string()));
        }
        Ok(())
    }

    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/quickmarks/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("quickmarks");
            path.push("config.toml");
            path
        })
    }

    /// Default location of the persisted list data.
    pub fn default_data_path() -> Option<PathBuf> {
        dirs::data_dir().map(|mut path| {
            path.push("quickmarks");
            path.push("data.json");
            path
        })
    }

    /// The configured data path, falling back to [`Settings::default_data_path`].
    pub fn resolved_data_path(&self) -> Option<PathBuf> {
        self.data_path.clone().or_else(Self::default_data_path)
    }

    /// Loads settings from the default config file.
    ///
    /// Returns the default settings if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads settings from `path`, falling back to defaults on any failure.
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Saves settings to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves settings to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}

/// The resolved configuration of one list: its codec and options.
pub struct ListConfig<T> {
    pub codec: Rc<dyn Codec<T>>,
    pub options: ListOptions,
}

impl<T> Clone for ListConfig<T> {
    fn clone(&self) -> Self {
        Self {
            codec: Rc::clone(&self.codec),
            options: self.options,
        }
    }
}

/// Settings plus codecs.
pub struct Config<T> {
    pub settings: Settings,
    default_codec: Rc<dyn Codec<T>>,
    codecs: HashMap<String, Rc<dyn Codec<T>>>,
}

impl<T> Config<T> {
    /// Creates a config with default settings and `default_codec` for every list.
    pub fn new(default_codec: Rc<dyn Codec<T>>) -> Self {
        Self {
            settings: Settings::default(),
            default_codec,
            codecs: HashMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Registers a codec used only by the list called `name`.
    pub fn with_list_codec(mut self, name: impl Into<String>, codec: Rc<dyn Codec<T>>) -> Self {
        self.codecs.insert(name.into(), codec);
        self
    }

    /// Resolves the codec and options for the list called `name`.
    pub fn list_config(&self, name: &str) -> ListConfig<T> {
        let codec = self.codecs.get(name).unwrap_or(&self.default_codec);
        ListConfig {
            codec: Rc::clone(codec),
            options: self.settings.options_for(name),
        }
    }

    /// Overlays `partial` onto this config.
    ///
    /// The result is validated first; on error this config is left unchanged.
    pub fn merge(&mut self, partial: PartialConfig<T>) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.merge(&partial.settings);
        settings.validate()?;
        validate_codec_names(partial.codecs.keys())?;

        self.settings = settings;
        if let Some(codec) = partial.default_codec {
            self.default_codec = codec;
        }
        self.codecs.extend(partial.codecs);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_codec_names(self.codecs.keys())?;
        self.settings.validate()
    }
}

fn validate_codec_names<'a>(mut names: impl Iterator<Item = &'a String>) -> Result<()> {
    if names.any(|name| name.trim().is_empty()) {
        return Err(Error::InvalidConfig("codec overrides need a list name".to_string()));
    }
    Ok(())
}

/// A sparse override of [`Config`].
pub struct PartialConfig<T> {
    pub settings: PartialSettings,
    pub default_codec: Option<Rc<dyn Codec<T>>>,
    pub codecs: HashMap<String, Rc<dyn Codec<T>>>,
}

impl<T> Default for PartialConfig<T> {
    fn default() -> Self {
        Self {
            settings: PartialSettings::default(),
            default_codec: None,
            codecs: HashMap::new(),
        }
    }
}

impl<T> From<PartialSettings> for PartialConfig<T> {
    fn from(settings: PartialSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }
}
