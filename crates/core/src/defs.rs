// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Discoverable definition sets.
//!
//! Migration units and analytical view definitions are both authored as
//! external SQL scripts. A [`ScriptSource`] yields them in ascending name
//! order; the filesystem provider tolerates a missing directory so that
//! deployments without migrations or without an analytical layer work
//! unchanged.

use std::{
	fs,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// One named script body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptDef {
	/// Name derived from the definition file stem.
	pub name: String,
	/// The SQL body.
	pub body: String,
}

impl ScriptDef {
	pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			body: body.into(),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum DefsError {
	#[error("failed to read definition set at {path}: {source}")]
	List {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to read definition {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// An ordered set of script definitions.
///
/// Implementations must return scripts sorted by name ascending.
pub trait ScriptSource {
	fn scripts(&self) -> Result<Vec<ScriptDef>, DefsError>;
}

/// Filesystem provider: every `*.sql` file in one directory, in lexical
/// filename order. A directory that does not exist yields an empty set.
#[derive(Debug, Clone)]
pub struct DirSource {
	root: PathBuf,
}

impl DirSource {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl ScriptSource for DirSource {
	fn scripts(&self) -> Result<Vec<ScriptDef>, DefsError> {
		if !self.root.is_dir() {
			return Ok(Vec::new());
		}

		let entries = fs::read_dir(&self.root).map_err(|source| DefsError::List {
			path: self.root.clone(),
			source,
		})?;

		let mut scripts = Vec::new();
		for entry in entries {
			let entry = entry.map_err(|source| DefsError::List {
				path: self.root.clone(),
				source,
			})?;
			let path = entry.path();
			if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("sql") {
				continue;
			}
			let name = match path.file_stem().and_then(|s| s.to_str()) {
				Some(stem) => stem.to_string(),
				None => continue,
			};
			let body = fs::read_to_string(&path).map_err(|source| DefsError::Read {
				path: path.clone(),
				source,
			})?;
			scripts.push(ScriptDef {
				name,
				body,
			});
		}

		scripts.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(scripts)
	}
}

/// In-memory provider for tests and embedded definition sets.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	scripts: Vec<ScriptDef>,
}

impl MemorySource {
	pub fn new(scripts: Vec<ScriptDef>) -> Self {
		Self {
			scripts,
		}
	}

	pub fn push(&mut self, script: ScriptDef) {
		self.scripts.push(script);
	}

	pub fn remove(&mut self, name: &str) {
		self.scripts.retain(|s| s.name != name);
	}
}

impl ScriptSource for MemorySource {
	fn scripts(&self) -> Result<Vec<ScriptDef>, DefsError> {
		let mut scripts = self.scripts.clone();
		scripts.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(scripts)
	}
}
