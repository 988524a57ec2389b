// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Process-wide configuration values.
//!
//! There is no ambient configuration singleton: a [`Settings`] value is
//! constructed once at process start and handed into each component.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// SQLite journal mode for the transactional store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
	/// Write-ahead logging. Required for concurrent readers while an
	/// ingestion writer holds a write transaction.
	Wal,
	Delete,
	Truncate,
	Memory,
}

impl JournalMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			JournalMode::Wal => "WAL",
			JournalMode::Delete => "DELETE",
			JournalMode::Truncate => "TRUNCATE",
			JournalMode::Memory => "MEMORY",
		}
	}
}

/// SQLite synchronous mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynchronousMode {
	Off,
	/// Durability adequate for an append-mostly warehouse; noticeably
	/// faster than `FULL` under WAL.
	Normal,
	Full,
}

impl SynchronousMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			SynchronousMode::Off => "OFF",
			SynchronousMode::Normal => "NORMAL",
			SynchronousMode::Full => "FULL",
		}
	}
}

/// Configuration for the transactional SQLite store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
	pub journal_mode: JournalMode,
	pub synchronous: SynchronousMode,
	/// Page cache ceiling in KiB (applied as a negative `cache_size`).
	pub cache_size_kib: u32,
	/// How long a writer waits on a locked database before giving up.
	pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			journal_mode: JournalMode::Wal,
			synchronous: SynchronousMode::Normal,
			cache_size_kib: 64 * 1024,
			busy_timeout_ms: 5_000,
		}
	}
}

/// Resource limits for the analytical DuckDB engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
	/// Memory ceiling, in DuckDB's own syntax (e.g. `"256MB"`).
	pub memory_limit: String,
	/// Worker threads the engine may use.
	pub threads: u16,
}

impl Default for AnalyticsConfig {
	fn default() -> Self {
		Self {
			memory_limit: "256MB".to_string(),
			threads: 2,
		}
	}
}

/// The explicit configuration value for one warehouse process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
	pub store: StoreConfig,
	pub analytics: AnalyticsConfig,
	/// Directory holding the ordered migration scripts.
	pub migrations_dir: PathBuf,
	/// Directory holding the analytical view definitions.
	pub views_dir: PathBuf,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			store: StoreConfig::default(),
			analytics: AnalyticsConfig::default(),
			migrations_dir: PathBuf::from("migrations"),
			views_dir: PathBuf::from("views"),
		}
	}
}
