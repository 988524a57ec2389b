// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Connection provisioning for the transactional store.
//!
//! Every handle comes out of [`open`] configured the same way: WAL so
//! audit writers and domain readers can overlap, foreign keys enforced,
//! a bounded page cache, and a busy timeout instead of immediate
//! `SQLITE_BUSY` failures.

use std::{fs, path::Path, time::Duration};

use rusqlite::Connection;
use scorebook_core::{ScriptSource, StoreConfig};
use tracing::{debug, instrument};

use crate::{
	error::{Result, StoreError},
	migrate::Migrator,
};

/// Open the transactional store at `path`, creating parent directories
/// as needed, and configure the handle for concurrent use.
#[instrument(name = "store::open", level = "debug", skip(config), fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Connection> {
	let path = path.as_ref();

	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
				path: parent.to_path_buf(),
				source,
			})?;
		}
	}

	let conn = Connection::open(path)?;

	conn.pragma_update(None, "journal_mode", config.journal_mode.as_str())?;
	conn.pragma_update(None, "synchronous", config.synchronous.as_str())?;
	conn.pragma_update(None, "foreign_keys", "ON")?;
	// Negative cache_size bounds the cache in KiB rather than pages.
	conn.pragma_update(None, "cache_size", -(config.cache_size_kib as i64))?;
	conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

	debug!(journal_mode = config.journal_mode.as_str(), "transactional store opened");
	Ok(conn)
}

/// Open the store, bring its schema up to date, and release the handle.
///
/// Returns the number of migration units applied.
#[instrument(name = "store::init", level = "info", skip(config, migrations), fields(path = %path.as_ref().display()))]
pub fn init(path: impl AsRef<Path>, config: &StoreConfig, migrations: &dyn ScriptSource) -> Result<usize> {
	let conn = open(path, config)?;
	Migrator::new(migrations).apply_pending(&conn)
}
