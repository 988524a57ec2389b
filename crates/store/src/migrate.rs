// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The migration ledger.
//!
//! Schema changes are ordered, uniquely named scripts discovered from a
//! [`ScriptSource`]. A script named `<id>` is the forward action; an
//! optional script named `<id>.down` is its reverse. The applied set is
//! persisted in the store itself (`schema_migrations`), so it survives
//! restarts and a crash mid-batch leaves the ledger describing exactly
//! the units that actually ran.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rusqlite::{params, Connection};
use scorebook_core::ScriptSource;
use tracing::{debug, info, instrument};

use crate::error::{Result, StoreError};

const LEDGER_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
	id         TEXT PRIMARY KEY,
	applied_at TEXT NOT NULL
)";

const DOWN_SUFFIX: &str = ".down";

/// One ordered schema-change unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationUnit {
	pub id: String,
	pub up: String,
	pub down: Option<String>,
}

/// Applies and reverses migration units against a transactional store.
pub struct Migrator<'a> {
	source: &'a dyn ScriptSource,
}

impl<'a> Migrator<'a> {
	pub fn new(source: &'a dyn ScriptSource) -> Self {
		Self {
			source,
		}
	}

	/// Discover migration units, pairing each forward script with its
	/// `.down` counterpart. Order follows the source's name order.
	pub fn units(&self) -> Result<Vec<MigrationUnit>> {
		let scripts = self.source.scripts()?;

		let mut downs: HashMap<String, String> = HashMap::new();
		let mut units = Vec::new();
		for script in scripts {
			match script.name.strip_suffix(DOWN_SUFFIX) {
				Some(id) => {
					downs.insert(id.to_string(), script.body);
				}
				None => units.push(MigrationUnit {
					id: script.name,
					up: script.body,
					down: None,
				}),
			}
		}
		for unit in &mut units {
			unit.down = downs.remove(&unit.id);
		}

		Ok(units)
	}

	/// Ids of units not yet recorded as applied, in ascending order.
	pub fn pending(&self, conn: &Connection) -> Result<Vec<String>> {
		ensure_ledger(conn)?;
		let applied = applied_ids(conn)?;
		let applied: HashSet<&str> = applied.iter().map(String::as_str).collect();
		Ok(self
			.units()?
			.into_iter()
			.filter(|unit| !applied.contains(unit.id.as_str()))
			.map(|unit| unit.id)
			.collect())
	}

	/// Apply every pending unit in ascending order.
	///
	/// Each unit is recorded as applied immediately after its forward
	/// action succeeds; the first failure aborts the call and leaves
	/// prior units recorded. Calling this again once converged is a
	/// no-op returning 0.
	#[instrument(name = "store::migrate::apply_pending", level = "info", skip(self, conn))]
	pub fn apply_pending(&self, conn: &Connection) -> Result<usize> {
		ensure_ledger(conn)?;

		let applied = applied_ids(conn)?;
		let applied: HashSet<String> = applied.into_iter().collect();

		let mut count = 0;
		for unit in self.units()? {
			if applied.contains(&unit.id) {
				continue;
			}
			debug!(id = %unit.id, "applying migration");
			conn.execute_batch(&unit.up).map_err(|source| StoreError::Migration {
				id: unit.id.clone(),
				source,
			})?;
			conn.execute(
				"INSERT INTO schema_migrations (id, applied_at) VALUES (?1, ?2)",
				params![unit.id, Utc::now().to_rfc3339()],
			)?;
			count += 1;
		}

		if count > 0 {
			info!(count, "applied pending migrations");
		}
		Ok(count)
	}

	/// Reverse the `steps` most recently applied units, newest first.
	///
	/// Requesting more steps than are applied reverses everything and is
	/// not an error; `steps = 0` is a no-op. A unit is removed from the
	/// ledger only strictly after its reverse action returns
	/// successfully, so a failed reverse leaves the unit recorded.
	#[instrument(name = "store::migrate::rollback", level = "info", skip(self, conn))]
	pub fn rollback(&self, conn: &Connection, steps: usize) -> Result<usize> {
		if steps == 0 {
			return Ok(0);
		}
		ensure_ledger(conn)?;

		let applied = applied_ids(conn)?;
		let units: HashMap<String, MigrationUnit> =
			self.units()?.into_iter().map(|unit| (unit.id.clone(), unit)).collect();

		let mut count = 0;
		for id in applied.iter().rev().take(steps) {
			let unit = units.get(id).ok_or_else(|| StoreError::UnknownMigration {
				id: id.clone(),
			})?;
			let down = unit.down.as_deref().ok_or_else(|| StoreError::Irreversible {
				id: id.clone(),
			})?;
			debug!(id = %id, "reversing migration");
			conn.execute_batch(down).map_err(|source| StoreError::Migration {
				id: id.clone(),
				source,
			})?;
			conn.execute("DELETE FROM schema_migrations WHERE id = ?1", params![id])?;
			count += 1;
		}

		info!(count, "rolled back migrations");
		Ok(count)
	}
}

fn ensure_ledger(conn: &Connection) -> Result<()> {
	conn.execute_batch(LEDGER_SCHEMA)?;
	Ok(())
}

/// Applied unit ids in the order they were recorded, oldest first.
fn applied_ids(conn: &Connection) -> Result<Vec<String>> {
	let mut stmt = conn.prepare("SELECT id FROM schema_migrations ORDER BY rowid")?;
	let ids = stmt.query_map([], |row| row.get(0))?.collect::<rusqlite::Result<Vec<String>>>()?;
	Ok(ids)
}
