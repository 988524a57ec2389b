// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Shared building blocks for the scorebook warehouse: explicit
//! configuration values, discoverable script/definition sets, and the
//! record types exchanged between the ingest and reporting surfaces.

pub mod config;
pub mod defs;
pub mod record;

pub use config::{AnalyticsConfig, JournalMode, Settings, StoreConfig, SynchronousMode};
pub use defs::{DefsError, DirSource, MemorySource, ScriptDef, ScriptSource};
pub use record::{AuditRecord, IngestStatus, InvalidStatus, StatusStats};
