// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! The ingest audit ledger: one record per (entity_type, entity_id)
//! pair describing the most recent ingestion attempt, written on every
//! attempt regardless of outcome and never allowed to fail an
//! otherwise-successful ingestion job.

pub mod error;
pub mod job;
pub mod ledger;

pub use error::{AuditError, Result};
pub use job::{run_batch, BatchSummary, IngestJob, IngestReport};
pub use ledger::AuditLedger;
