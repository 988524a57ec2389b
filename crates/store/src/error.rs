// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::PathBuf;

use scorebook_core::DefsError;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("failed to create database directory {path}: {source}")]
	CreateDir {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A forward or reverse migration action failed. Units committed
	/// before this one stay recorded.
	#[error("migration `{id}` failed: {source}")]
	Migration {
		id: String,
		#[source]
		source: rusqlite::Error,
	},

	/// Rollback was requested for a unit that has no reverse action.
	#[error("migration `{id}` has no reverse action")]
	Irreversible { id: String },

	/// The ledger records a unit the definition set no longer contains.
	#[error("applied migration `{id}` is missing from the definition set")]
	UnknownMigration { id: String },

	#[error(transparent)]
	Defs(#[from] DefsError),

	#[error(transparent)]
	Sqlite(#[from] rusqlite::Error),
}
