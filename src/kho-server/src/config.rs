// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file support for kho-server.
//!
//! Config is loaded from the `[kho-server]` section of `kho-rs.toml`.
//! Default search order:
//! 1. Path specified via `--config` CLI argument
//! 2. `./kho-rs.toml`
//! 3. `~/.config/kho-rs/kho-rs.toml`
//! 4. `/etc/kho-rs/kho-rs.toml`

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use kho_app::{rebase_path, split_list, ConfigError, ConfigFile};

use crate::schedule::Schedule;
use crate::transport::ChatId;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Top-level server configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub general: GeneralConfig,
    pub telegram: TelegramConfig,
    pub roster: RosterConfig,
    pub report: ReportConfig,
    pub summary: SummaryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
    /// Operating timezone as a fixed UTC offset, e.g. "+07:00"
    pub utc_offset: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            utc_offset: "+07:00".to_string(),
        }
    }
}

/// Bot API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub api_url: String,
    /// Long-poll timeout for getUpdates, in seconds
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// CSV file with `id_kho,ten_kho` columns
    pub path: PathBuf,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("warehouses.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Reject reports whose date line is missing or not today
    pub require_date: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { require_date: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Comma-separated chat ids receiving scheduled summaries
    pub destinations: String,
    /// Local time of the first-pass summary, "HH:MM"
    pub first_pass: String,
    /// Local time of the follow-up summary, "HH:MM"
    pub follow_up: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            destinations: String::new(),
            first_pass: "15:00".to_string(),
            follow_up: "17:00".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_log_level(self.general.log_level.as_deref())?;
        self.utc_offset()?;

        let first_pass = parse_time("[summary].first_pass", &self.summary.first_pass)?;
        let follow_up = parse_time("[summary].follow_up", &self.summary.follow_up)?;
        if first_pass >= follow_up {
            return Err(format!(
                "[summary].first_pass ({}) must be earlier than [summary].follow_up ({})",
                self.summary.first_pass, self.summary.follow_up
            ));
        }

        if self.roster.path.as_os_str().is_empty() {
            return Err("[roster].path must not be empty".to_string());
        }
        if self.telegram.api_url.trim().is_empty() {
            return Err("[telegram].api_url must not be empty".to_string());
        }
        if self.telegram.poll_timeout_secs == 0 {
            return Err("[telegram].poll_timeout_secs must be > 0".to_string());
        }

        self.destination_ids()?;
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, String> {
        parse_utc_offset(&self.general.utc_offset)
    }

    /// Destination chat ids in configured order, duplicates removed.
    pub fn destination_ids(&self) -> Result<Vec<ChatId>, String> {
        let mut ids: Vec<ChatId> = Vec::new();
        for item in split_list(&self.summary.destinations) {
            let id: ChatId = item
                .parse()
                .map_err(|_| format!("[summary].destinations: '{}' is not a chat id", item))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    pub fn schedule(&self) -> Result<Schedule, String> {
        Ok(Schedule {
            first_pass: parse_time("[summary].first_pass", &self.summary.first_pass)?,
            follow_up: parse_time("[summary].follow_up", &self.summary.follow_up)?,
            utc_offset: self.utc_offset()?,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        <Self as ConfigFile>::load_from_file(path)
    }

    /// Load configuration from the default search paths.
    /// Returns default config if no config file is found.
    pub fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        <Self as ConfigFile>::load_from_default_paths()
    }

    /// Example configuration wrapped under the `[kho-server]` section header.
    pub fn example_toml() -> String {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(rename = "kho-server")]
            inner: ServerConfig,
        }
        let example = ServerConfig {
            general: GeneralConfig {
                log_level: Some("info".to_string()),
                ..GeneralConfig::default()
            },
            telegram: TelegramConfig {
                token: Some("123456:REPLACE-ME".to_string()),
                ..TelegramConfig::default()
            },
            roster: RosterConfig::default(),
            report: ReportConfig::default(),
            summary: SummaryConfig {
                destinations: "-1001234567890,-1009876543210".to_string(),
                ..SummaryConfig::default()
            },
        };
        toml::to_string_pretty(&Wrapper { inner: example }).unwrap_or_default()
    }
}

fn validate_log_level(level: Option<&str>) -> Result<(), String> {
    if let Some(level) = level {
        match level {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "[general].log_level '{}' is invalid (expected one of: trace, debug, info, warn, error)",
                    level
                ))
            }
        }
    }
    Ok(())
}

/// Parse a `+HH:MM` / `-HH:MM` offset; `Z` and `UTC` are accepted for zero.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    value
        .parse::<FixedOffset>()
        .map_err(|_| format!("[general].utc_offset '{}' is invalid (expected e.g. +07:00)", value))
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| format!("{} '{}' is invalid (expected HH:MM)", field, value))
}

impl ConfigFile for ServerConfig {
    fn section_key() -> &'static str {
        "kho-server"
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        self.roster.path = rebase_path(&self.roster.path, base);
    }
}
