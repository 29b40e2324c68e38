//! Service configuration: optional TOML file plus a few environment overrides.
//!
//! Every section has defaults, so running without a file is fine.
//!
//! ```toml
//! [store]
//! database_path = "data/problems.db"
//! table_name = "problems"
//!
//! [selector]
//! retry_limit = 10
//! require_complete_day = false
//!
//! [schedule]
//! run_at_utc = "00:00"
//! ```

use chrono::NaiveTime;
use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
  pub server: ServerConfig,
  pub store: StoreConfig,
  pub leetcode: LeetCodeConfig,
  pub selector: SelectorConfig,
  pub schedule: ScheduleConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub port: u16,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { port: 3000 }
  }
}

/// Where and how problem rows are persisted.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  /// SQLite file, or `:memory:`.
  pub database_path: String,
  pub table_name: String,
  /// chrono format of the sort key. Must sort lexicographically in date order.
  pub date_key_format: String,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      database_path: "data/problems.db".into(),
      table_name: "problems".into(),
      date_key_format: "%Y-%m-%d".into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LeetCodeConfig {
  pub graphql_url: String,
  pub problem_base_url: String,
  /// Total attempts before giving up on paid-only results.
  pub max_paid_only_attempts: u32,
  pub timeout_secs: u64,
}

impl Default for LeetCodeConfig {
  fn default() -> Self {
    Self {
      graphql_url: "https://leetcode.com/graphql/".into(),
      problem_base_url: "https://leetcode.com/problems".into(),
      max_paid_only_attempts: 20,
      timeout_secs: 20,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
  /// Fetches per category before the slot is left empty.
  pub retry_limit: u32,
  /// Length of the dedup window in days, ending at (and including) the target date.
  pub window_days: u64,
  /// Fail the whole day instead of saving it with empty slots.
  pub require_complete_day: bool,
}

impl Default for SelectorConfig {
  fn default() -> Self {
    Self { retry_limit: 10, window_days: 7, require_complete_day: false }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
  pub enabled: bool,
  /// UTC time of day, `HH:MM`.
  pub run_at_utc: String,
  pub run_on_startup: bool,
}

impl Default for ScheduleConfig {
  fn default() -> Self {
    Self { enabled: true, run_at_utc: "00:00".into(), run_on_startup: false }
  }
}

impl ScheduleConfig {
  /// Parsed `run_at_utc`; midnight if the value is malformed.
  pub fn run_at(&self) -> NaiveTime {
    NaiveTime::parse_from_str(&self.run_at_utc, "%H:%M").unwrap_or_else(|e| {
      warn!(target: "daily_problems", value = %self.run_at_utc, error = %e, "Invalid schedule.run_at_utc; using 00:00");
      NaiveTime::MIN
    })
  }
}

impl AppConfig {
  /// Parse a TOML document.
  pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(s)
  }

  /// Load from `DAILY_CONFIG_PATH` (if set), then apply environment overrides.
  /// Read or parse failures are logged and the defaults are used.
  pub fn load_from_env() -> Self {
    let mut cfg = load_file_from_env().unwrap_or_default();
    cfg.apply_env_overrides(|key| std::env::var(key).ok());
    cfg
  }

  /// Overrides: `PORT`, `DATABASE_PATH`, `PROBLEM_TABLE_NAME`, `LEETCODE_GRAPHQL_URL`.
  pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
      self.server.port = port;
    }
    if let Some(path) = lookup("DATABASE_PATH") {
      self.store.database_path = path;
    }
    if let Some(table) = lookup("PROBLEM_TABLE_NAME") {
      self.store.table_name = table;
    }
    if let Some(url) = lookup("LEETCODE_GRAPHQL_URL") {
      self.leetcode.graphql_url = url;
    }
  }
}

fn load_file_from_env() -> Option<AppConfig> {
  let path = std::env::var("DAILY_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match AppConfig::from_toml_str(&s) {
      Ok(cfg) => {
        info!(target: "daily_problems", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "daily_problems", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "daily_problems", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
