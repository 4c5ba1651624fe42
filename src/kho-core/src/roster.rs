// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Reference roster of warehouses (site id → canonical name).
//!
//! Loaded once at startup from a CSV file with `id_kho` and `ten_kho`
//! columns and never mutated afterwards.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

pub const ID_COLUMN: &str = "id_kho";
pub const NAME_COLUMN: &str = "ten_kho";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const SITE_ID_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum RosterLoadError {
    #[error("failed to read roster {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read roster: {0}")]
    Io(#[source] std::io::Error),

    #[error("malformed roster: {0}")]
    Csv(#[from] csv::Error),

    #[error("roster is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("roster contains no usable rows")]
    Empty,
}

/// Immutable mapping of site id to canonical site name, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    sites: BTreeMap<String, String>,
}

impl Roster {
    /// Load the roster from a CSV file on disk.
    pub fn load(path: &Path) -> Result<Self, RosterLoadError> {
        let bytes = std::fs::read(path).map_err(|source| RosterLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(bytes.as_slice())
    }

    /// Parse a roster from any CSV byte source. A leading UTF-8 BOM is
    /// tolerated; rows with an empty id or name are skipped.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, RosterLoadError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(RosterLoadError::Io)?;
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body);

        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(RosterLoadError::MissingColumn(name))
        };
        let id_idx = column(ID_COLUMN)?;
        let name_idx = column(NAME_COLUMN)?;

        let mut sites = BTreeMap::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record?;
            let id = record.get(id_idx).map(str::trim).unwrap_or_default();
            let name = record.get(name_idx).map(str::trim).unwrap_or_default();
            if id.is_empty() || name.is_empty() {
                debug!("roster row {} skipped (empty id or name)", line + 2);
                continue;
            }
            if !is_site_id(id) {
                warn!(
                    "roster id '{}' is not {} digits; reports can never match it",
                    id, SITE_ID_LEN
                );
            }
            if let Some(previous) = sites.insert(id.to_string(), name.to_string()) {
                warn!(
                    "roster id {} listed more than once ('{}' replaced by '{}')",
                    id, previous, name
                );
            }
        }

        if sites.is_empty() {
            return Err(RosterLoadError::Empty);
        }
        Ok(Self { sites })
    }

    /// Build a roster from `(id, name)` pairs without any file involved.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            sites: entries
                .into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        }
    }

    pub fn lookup(&self, site_id: &str) -> Option<&str> {
        self.sites.get(site_id).map(String::as_str)
    }

    pub fn contains(&self, site_id: &str) -> bool {
        self.sites.contains_key(site_id)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Site ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    /// `(id, name)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sites.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }
}

fn is_site_id(id: &str) -> bool {
    id.len() == SITE_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}
