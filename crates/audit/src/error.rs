// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
	#[error(transparent)]
	Sqlite(#[from] rusqlite::Error),
}
