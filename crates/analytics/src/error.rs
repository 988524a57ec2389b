// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::PathBuf;

use scorebook_core::DefsError;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
	/// A build must never silently produce an empty analytical store.
	#[error("transactional store not found at {path}")]
	TransactionalStoreNotFound { path: PathBuf },

	#[error("failed to create analytical directory {path}: {source}")]
	CreateDir {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to attach transactional store {path}: {source}")]
	Attach {
		path: PathBuf,
		#[source]
		source: duckdb::Error,
	},

	#[error("failed to create view `{name}`: {source}")]
	View {
		name: String,
		#[source]
		source: duckdb::Error,
	},

	#[error(transparent)]
	Defs(#[from] DefsError),

	#[error(transparent)]
	Duckdb(#[from] duckdb::Error),
}
