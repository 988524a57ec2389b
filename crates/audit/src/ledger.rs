// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Audit ledger over the transactional store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, Row};
use scorebook_core::{AuditRecord, IngestStatus, StatusStats};
use tracing::{instrument, warn};

use crate::error::Result;

const LEDGER_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS ingest_audit (
	entity_type   TEXT NOT NULL,
	entity_id     TEXT NOT NULL,
	source        TEXT NOT NULL,
	ingested_at   TEXT NOT NULL,
	status        TEXT NOT NULL,
	row_count     INTEGER,
	error_message TEXT,
	PRIMARY KEY (entity_type, entity_id)
)";

const UPSERT: &str = "INSERT INTO ingest_audit
	(entity_type, entity_id, source, ingested_at, status, row_count, error_message)
 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
 ON CONFLICT (entity_type, entity_id) DO UPDATE SET
	source        = excluded.source,
	ingested_at   = excluded.ingested_at,
	status        = excluded.status,
	row_count     = excluded.row_count,
	error_message = excluded.error_message";

const RECORD_COLUMNS: &str =
	"entity_type, entity_id, source, ingested_at, status, row_count, error_message";

/// Records ingestion outcomes keyed by (entity_type, entity_id).
///
/// Borrows a provisioned connection; `log` commits its own write, so it
/// must not be called while the caller holds an open, uncommitted
/// transaction on the same handle.
pub struct AuditLedger<'a> {
	conn: &'a Connection,
}

impl<'a> AuditLedger<'a> {
	/// Wrap a connection, ensuring the audit table exists.
	pub fn new(conn: &'a Connection) -> Result<Self> {
		conn.execute_batch(LEDGER_SCHEMA)?;
		Ok(Self {
			conn,
		})
	}

	/// The underlying transactional-store handle, for ingestion jobs
	/// that share it.
	pub fn connection(&self) -> &Connection {
		self.conn
	}

	/// Record the outcome of one ingestion attempt, replacing any prior
	/// record for the pair and stamping the current UTC time.
	///
	/// Persistence failures (a locked store, typically) are logged and
	/// swallowed: the audit trail is a side channel and must never
	/// abort the ingestion job that reports to it.
	#[instrument(name = "audit::log", level = "debug", skip(self, row_count, error_message))]
	pub fn log(
		&self,
		entity_type: &str,
		entity_id: &str,
		source: &str,
		status: IngestStatus,
		row_count: Option<i64>,
		error_message: Option<&str>,
	) {
		let result = self.conn.execute(
			UPSERT,
			params![
				entity_type,
				entity_id,
				source,
				Utc::now().to_rfc3339(),
				status.as_str(),
				row_count,
				error_message
			],
		);
		if let Err(err) = result {
			warn!(entity_type, entity_id, error = %err, "audit record not persisted");
		}
	}

	/// The current record for a pair, or `None` if it was never logged.
	pub fn get_status(&self, entity_type: &str, entity_id: &str) -> Result<Option<AuditRecord>> {
		let query = format!(
			"SELECT {RECORD_COLUMNS} FROM ingest_audit WHERE entity_type = ?1 AND entity_id = ?2"
		);
		let result = self.conn.query_row(&query, params![entity_type, entity_id], record_from_row);
		match result {
			Ok(record) => Ok(Some(record)),
			Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	/// All records with status FAILED, most recent first, optionally
	/// restricted to one entity type. Drives retry tooling.
	pub fn get_failed_entities(&self, entity_type: Option<&str>) -> Result<Vec<AuditRecord>> {
		let mut records = Vec::new();
		match entity_type {
			Some(entity_type) => {
				let query = format!(
					"SELECT {RECORD_COLUMNS} FROM ingest_audit
					 WHERE status = 'FAILED' AND entity_type = ?1
					 ORDER BY ingested_at DESC"
				);
				let mut stmt = self.conn.prepare(&query)?;
				let rows = stmt.query_map(params![entity_type], record_from_row)?;
				for row in rows {
					records.push(row?);
				}
			}
			None => {
				let query = format!(
					"SELECT {RECORD_COLUMNS} FROM ingest_audit
					 WHERE status = 'FAILED'
					 ORDER BY ingested_at DESC"
				);
				let mut stmt = self.conn.prepare(&query)?;
				let rows = stmt.query_map([], record_from_row)?;
				for row in rows {
					records.push(row?);
				}
			}
		}
		Ok(records)
	}

	/// Counts and summed row counts grouped by (entity_type, status).
	pub fn get_stats(&self) -> Result<BTreeMap<String, BTreeMap<IngestStatus, StatusStats>>> {
		let mut stmt = self.conn.prepare(
			"SELECT entity_type, status, COUNT(*), COALESCE(SUM(row_count), 0)
			 FROM ingest_audit
			 GROUP BY entity_type, status",
		)?;
		let rows = stmt.query_map([], |row| {
			Ok((
				row.get::<_, String>(0)?,
				parse_status(row, 1)?,
				row.get::<_, i64>(2)? as u64,
				row.get::<_, i64>(3)?,
			))
		})?;

		let mut stats: BTreeMap<String, BTreeMap<IngestStatus, StatusStats>> = BTreeMap::new();
		for row in rows {
			let (entity_type, status, count, total_rows) = row?;
			stats.entry(entity_type).or_default().insert(
				status,
				StatusStats {
					count,
					total_rows,
				},
			);
		}
		Ok(stats)
	}
}

fn parse_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<IngestStatus> {
	let text: String = row.get(idx)?;
	text.parse().map_err(|e| {
		rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
	})
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AuditRecord> {
	let ingested_at: String = row.get(3)?;
	let ingested_at = DateTime::parse_from_rfc3339(&ingested_at)
		.map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?
		.with_timezone(&Utc);

	Ok(AuditRecord {
		entity_type: row.get(0)?,
		entity_id: row.get(1)?,
		source: row.get(2)?,
		ingested_at,
		status: parse_status(row, 4)?,
		row_count: row.get(5)?,
		error_message: row.get(6)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ledger(conn: &Connection) -> AuditLedger<'_> {
		AuditLedger::new(conn).unwrap()
	}

	#[test]
	fn repeated_log_keeps_exactly_one_record() {
		let conn = Connection::open_in_memory().unwrap();
		let ledger = ledger(&conn);

		ledger.log("player", "P1", "statsapi", IngestStatus::Failed, None, Some("404"));
		ledger.log("player", "P1", "statsapi", IngestStatus::Success, Some(1), None);

		let count: i64 =
			conn.query_row("SELECT COUNT(*) FROM ingest_audit", [], |row| row.get(0)).unwrap();
		assert_eq!(count, 1);

		let record = ledger.get_status("player", "P1").unwrap().unwrap();
		assert_eq!(record.status, IngestStatus::Success);
		assert_eq!(record.row_count, Some(1));
		assert_eq!(record.error_message, None);
	}

	#[test]
	fn never_logged_pair_is_absent_not_an_error() {
		let conn = Connection::open_in_memory().unwrap();
		let ledger = ledger(&conn);
		assert!(ledger.get_status("game", "G1").unwrap().is_none());
	}

	#[test]
	fn failed_entities_respect_the_type_filter() {
		let conn = Connection::open_in_memory().unwrap();
		let ledger = ledger(&conn);

		ledger.log("player", "P1", "statsapi", IngestStatus::Failed, None, Some("timeout"));
		ledger.log("game", "G1", "statsapi", IngestStatus::Failed, None, Some("500"));
		ledger.log("game", "G2", "statsapi", IngestStatus::Success, Some(40), None);

		let all = ledger.get_failed_entities(None).unwrap();
		assert_eq!(all.len(), 2);
		assert!(all.iter().all(|r| r.status == IngestStatus::Failed));

		let games = ledger.get_failed_entities(Some("game")).unwrap();
		assert_eq!(games.len(), 1);
		assert_eq!(games[0].entity_id, "G1");
	}

	#[test]
	fn stats_group_by_type_and_status() {
		let conn = Connection::open_in_memory().unwrap();
		let ledger = ledger(&conn);

		ledger.log("player", "P1", "statsapi", IngestStatus::Success, Some(3), None);
		ledger.log("player", "P2", "statsapi", IngestStatus::Success, Some(5), None);
		ledger.log("player", "P3", "statsapi", IngestStatus::Failed, None, Some("boom"));
		ledger.log("game", "G1", "statsapi", IngestStatus::Empty, Some(0), None);

		let stats = ledger.get_stats().unwrap();
		let players = &stats["player"];
		assert_eq!(players[&IngestStatus::Success], StatusStats {
			count: 2,
			total_rows: 8,
		});
		assert_eq!(players[&IngestStatus::Failed].count, 1);
		assert_eq!(stats["game"][&IngestStatus::Empty].count, 1);
	}

	#[test]
	fn log_swallows_persistence_failures() {
		let conn = Connection::open_in_memory().unwrap();
		let ledger = ledger(&conn);
		// Sabotage the table so the upsert cannot succeed.
		conn.execute_batch("DROP TABLE ingest_audit").unwrap();

		// Must not panic or propagate.
		ledger.log("player", "P1", "statsapi", IngestStatus::Success, Some(1), None);
	}
}
