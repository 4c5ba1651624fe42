// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! `kho-rs.toml` discovery and per-binary section loading.
//!
//! One file can hold several `[<binary>]` sections; each binary pulls its
//! own through [`ConfigFile`]. Relative paths inside a section are resolved
//! against the directory of the file they were read from.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "kho-rs.toml";
const CONFIG_DIR_NAME: &str = "kho-rs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config file {} has no [{section}] section", path.display())]
    MissingSection { path: PathBuf, section: &'static str },
}

/// Candidate config files, most specific first:
/// `./kho-rs.toml`, `$XDG_CONFIG_HOME/kho-rs/kho-rs.toml`, `/etc/kho-rs/kho-rs.toml`.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths.push(Path::new("/etc").join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    paths
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn rebase_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// A parsed config file, kept as a raw table until a section is requested.
#[derive(Debug)]
pub struct ConfigDocument {
    path: PathBuf,
    table: toml::Table,
}

impl ConfigDocument {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let table = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative section paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Deserialize `[key]`, with serde defaults filling absent fields.
    /// `Ok(None)` when the section is not present.
    pub fn section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(section) = self.table.get(key) else {
            return Ok(None);
        };
        section
            .clone()
            .try_into()
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }
}

/// A configuration struct stored as one section of `kho-rs.toml`.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Section key in `kho-rs.toml` (e.g. `"kho-server"`).
    fn section_key() -> &'static str;

    /// Rewrite relative filesystem paths so they are relative to `base`
    /// (the directory of the file the section came from).
    fn resolve_relative_paths(&mut self, _base: &Path) {}

    /// Take this binary's section out of an already parsed document.
    fn from_document(doc: &ConfigDocument) -> Result<Option<Self>, ConfigError> {
        let mut cfg = doc.section::<Self>(Self::section_key())?;
        if let Some(ref mut cfg) = cfg {
            cfg.resolve_relative_paths(doc.base_dir());
        }
        Ok(cfg)
    }

    /// Load from an explicit file, which must contain the section.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let doc = ConfigDocument::read(path)?;
        Self::from_document(&doc)?.ok_or_else(|| ConfigError::MissingSection {
            path: path.to_path_buf(),
            section: Self::section_key(),
        })
    }

    /// First file in [`search_paths`] that has the section, or defaults
    /// with `None` when there is none.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in search_paths().into_iter().filter(|p| p.exists()) {
            let doc = ConfigDocument::read(&path)?;
            if let Some(cfg) = Self::from_document(&doc)? {
                return Ok((cfg, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }
}
