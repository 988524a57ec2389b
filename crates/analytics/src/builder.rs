// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Building and refreshing the analytical store.
//!
//! The analytical store is fully derived: all rows live in the
//! transactional store and are resolved through a read-only attachment
//! at query time, so a refresh is always a complete rebuild of view
//! definitions and never an incremental diff.

use std::{fs, path::Path};

use duckdb::Connection;
use scorebook_core::{AnalyticsConfig, ScriptSource};
use tracing::{debug, info, instrument, warn};

use crate::error::{BuildError, Result};

/// Alias the transactional store is attached under; view bodies
/// reference it as `warehouse.<table>`.
pub const ATTACH_ALIAS: &str = "warehouse";

/// Definition files are named `view_<name>.sql`; the prefix is stripped
/// to produce the view name.
pub const VIEW_PREFIX: &str = "view_";

/// Creates or replaces the analytical store from the transactional
/// store plus an external set of view definitions.
pub struct ViewBuilder<'a> {
	config: AnalyticsConfig,
	views: &'a dyn ScriptSource,
}

impl<'a> ViewBuilder<'a> {
	pub fn new(config: AnalyticsConfig, views: &'a dyn ScriptSource) -> Self {
		Self {
			config,
			views,
		}
	}

	/// Create (or replace the contents of) the analytical store at
	/// `analytical`, regenerating every view against `transactional`.
	///
	/// Fails without creating any file if the transactional store does
	/// not exist. Returns the number of views created.
	#[instrument(name = "analytics::build", level = "info", skip(self), fields(
		transactional = %transactional.as_ref().display(),
		analytical = %analytical.as_ref().display()
	))]
	pub fn build(&self, transactional: impl AsRef<Path>, analytical: impl AsRef<Path>) -> Result<usize> {
		let transactional = transactional.as_ref();
		let analytical = analytical.as_ref();

		require_transactional(transactional)?;
		if let Some(parent) = analytical.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent).map_err(|source| BuildError::CreateDir {
					path: parent.to_path_buf(),
					source,
				})?;
			}
		}

		self.run(transactional, analytical)
	}

	/// Rebuild the view definitions of an existing analytical store, or
	/// perform a first build if none exists yet.
	#[instrument(name = "analytics::refresh", level = "info", skip(self), fields(
		transactional = %transactional.as_ref().display(),
		analytical = %analytical.as_ref().display()
	))]
	pub fn refresh(&self, transactional: impl AsRef<Path>, analytical: impl AsRef<Path>) -> Result<usize> {
		let transactional = transactional.as_ref();
		let analytical = analytical.as_ref();

		if !analytical.exists() {
			debug!("analytical store absent, performing first build");
			return self.build(transactional, analytical);
		}

		require_transactional(transactional)?;
		self.run(transactional, analytical)
	}

	/// Open the analytical store, configure it, attach the transactional
	/// store read-only and regenerate the views. The connection is
	/// released before any error propagates.
	fn run(&self, transactional: &Path, analytical: &Path) -> Result<usize> {
		let conn = Connection::open(analytical)?;

		let outcome = self.populate(&conn, transactional);

		if let Err((_, close_err)) = conn.close() {
			warn!(error = %close_err, "analytical store did not close cleanly");
			if outcome.is_ok() {
				return Err(close_err.into());
			}
		}
		outcome
	}

	fn populate(&self, conn: &Connection, transactional: &Path) -> Result<usize> {
		conn.execute_batch(&format!(
			"SET memory_limit = '{}'; SET threads = {};",
			self.config.memory_limit, self.config.threads
		))?;

		conn.execute_batch(&format!(
			"ATTACH '{}' AS {ATTACH_ALIAS} (TYPE sqlite, READ_ONLY)",
			transactional.display()
		))
		.map_err(|source| BuildError::Attach {
			path: transactional.to_path_buf(),
			source,
		})?;

		self.refresh_views(conn)
	}

	/// Drop every user view, then recreate from the definition set in
	/// lexical order. Dropping first is what makes a deleted definition
	/// file remove its view.
	fn refresh_views(&self, conn: &Connection) -> Result<usize> {
		for name in existing_views(conn)? {
			debug!(view = %name, "dropping stale analytical view");
			conn.execute_batch(&format!("DROP VIEW IF EXISTS \"{name}\""))?;
		}

		let scripts = self.views.scripts()?;
		if scripts.is_empty() {
			info!("no view definitions found, analytical store has no views");
			return Ok(0);
		}

		let mut created = 0;
		for script in &scripts {
			let name = script.name.strip_prefix(VIEW_PREFIX).unwrap_or(&script.name);
			debug!(view = %name, "creating analytical view");
			conn.execute_batch(&format!("CREATE OR REPLACE VIEW \"{name}\" AS {}", script.body))
				.map_err(|source| BuildError::View {
					name: name.to_string(),
					source,
				})?;
			created += 1;
		}

		info!(created, "analytical views rebuilt");
		Ok(created)
	}
}

fn require_transactional(path: &Path) -> Result<()> {
	if !path.exists() {
		return Err(BuildError::TransactionalStoreNotFound {
			path: path.to_path_buf(),
		});
	}
	Ok(())
}

/// Names of the non-internal views in the analytical store's own main
/// schema. Attached catalogs are excluded.
fn existing_views(conn: &Connection) -> Result<Vec<String>> {
	let mut stmt = conn.prepare(
		"SELECT view_name FROM duckdb_views()
		 WHERE NOT internal
		   AND database_name = current_database()
		   AND schema_name = 'main'",
	)?;
	let names = stmt
		.query_map([], |row| row.get::<_, String>(0))?
		.collect::<duckdb::Result<Vec<_>>>()?;
	Ok(names)
}
