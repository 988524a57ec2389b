// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Ingest audit records and reporting types.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one ingestion attempt.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Hash,
	Serialize,
	Deserialize,
)]
pub enum IngestStatus {
	/// Rows were written.
	Success,
	/// The source had nothing for this entity.
	Empty,
	/// The attempt errored; `error_message` carries the cause.
	Failed,
	/// Deliberately not attempted (already current, out of season, ...).
	Skipped,
}

impl IngestStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			IngestStatus::Success => "SUCCESS",
			IngestStatus::Empty => "EMPTY",
			IngestStatus::Failed => "FAILED",
			IngestStatus::Skipped => "SKIPPED",
		}
	}
}

impl fmt::Display for IngestStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A status string that does not name any [`IngestStatus`].
#[derive(Debug, thiserror::Error)]
#[error("unrecognized ingest status `{value}`")]
pub struct InvalidStatus {
	pub value: String,
}

impl FromStr for IngestStatus {
	type Err = InvalidStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"SUCCESS" => Ok(IngestStatus::Success),
			"EMPTY" => Ok(IngestStatus::Empty),
			"FAILED" => Ok(IngestStatus::Failed),
			"SKIPPED" => Ok(IngestStatus::Skipped),
			other => Err(InvalidStatus {
				value: other.to_string(),
			}),
		}
	}
}

/// The latest-known ingestion outcome for one (entity_type, entity_id)
/// pair. The pair is unique; a repeated attempt replaces the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
	pub entity_type: String,
	pub entity_id: String,
	/// Origin system the rows were pulled from.
	pub source: String,
	pub ingested_at: DateTime<Utc>,
	pub status: IngestStatus,
	pub row_count: Option<i64>,
	/// Populated only for [`IngestStatus::Failed`].
	pub error_message: Option<String>,
}

/// Per-(entity_type, status) aggregate used by `get_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusStats {
	pub count: u64,
	pub total_rows: i64,
}
