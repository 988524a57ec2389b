// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The ingestion-job boundary.
//!
//! Concrete scrapers live elsewhere; this module defines the uniform
//! "ingest one entity, return a result" contract they implement and a
//! batch driver that reports every outcome to the audit ledger.

use rusqlite::Connection;
use scorebook_core::IngestStatus;
use tracing::instrument;

use crate::ledger::AuditLedger;

/// The uniform result of one ingestion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
	pub status: IngestStatus,
	/// Rows written on success; `None` when not applicable.
	pub rows: Option<i64>,
	/// Cause, populated for failed attempts.
	pub error: Option<String>,
}

impl IngestReport {
	pub fn success(rows: i64) -> Self {
		Self {
			status: IngestStatus::Success,
			rows: Some(rows),
			error: None,
		}
	}

	pub fn empty() -> Self {
		Self {
			status: IngestStatus::Empty,
			rows: Some(0),
			error: None,
		}
	}

	pub fn skipped() -> Self {
		Self {
			status: IngestStatus::Skipped,
			rows: None,
			error: None,
		}
	}

	pub fn failed(message: impl Into<String>) -> Self {
		Self {
			status: IngestStatus::Failed,
			rows: None,
			error: Some(message.into()),
		}
	}
}

/// One per-entity ingestion job. Implementations write domain rows
/// through the provided handle and describe the outcome; they do not
/// touch the audit ledger themselves.
pub trait IngestJob {
	/// The entity type this job ingests ("game", "player", ...).
	fn entity_type(&self) -> &str;

	/// The origin system rows are pulled from.
	fn source(&self) -> &str;

	fn ingest(&self, entity_id: &str, conn: &Connection) -> IngestReport;
}

/// Per-status counts for one driven batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
	pub succeeded: usize,
	pub empty: usize,
	pub failed: usize,
	pub skipped: usize,
}

impl BatchSummary {
	pub fn total(&self) -> usize {
		self.succeeded + self.empty + self.failed + self.skipped
	}
}

/// Run `job` for every id, logging each outcome to the ledger.
///
/// A failed entity does not stop the batch, and neither does a failed
/// audit write; the summary is the only aggregate signal.
#[instrument(name = "audit::run_batch", level = "info", skip(job, ledger, entity_ids), fields(entity_type = job.entity_type(), batch_size = entity_ids.len()))]
pub fn run_batch(job: &dyn IngestJob, entity_ids: &[String], ledger: &AuditLedger<'_>) -> BatchSummary {
	let mut summary = BatchSummary::default();
	for entity_id in entity_ids {
		let report = job.ingest(entity_id, ledger.connection());
		ledger.log(
			job.entity_type(),
			entity_id,
			job.source(),
			report.status,
			report.rows,
			report.error.as_deref(),
		);
		match report.status {
			IngestStatus::Success => summary.succeeded += 1,
			IngestStatus::Empty => summary.empty += 1,
			IngestStatus::Failed => summary.failed += 1,
			IngestStatus::Skipped => summary.skipped += 1,
		}
	}
	summary
}
