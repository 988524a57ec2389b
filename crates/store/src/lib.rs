// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! The transactional side of the warehouse: provisioning a durable,
//! foreign-key-enforcing SQLite handle and keeping its schema evolvable
//! through an ordered, reversible migration ledger.

pub mod connection;
pub mod error;
pub mod migrate;

pub use connection::{init, open};
pub use error::{Result, StoreError};
pub use migrate::{MigrationUnit, Migrator};
