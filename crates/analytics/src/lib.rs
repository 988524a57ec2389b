// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! The analytical side of the warehouse: a disposable DuckDB store whose
//! views are regenerated from external definitions, reading the
//! transactional SQLite store through a read-only attachment.

pub mod builder;
pub mod error;

pub use builder::{ViewBuilder, ATTACH_ALIAS, VIEW_PREFIX};
pub use error::{BuildError, Result};
