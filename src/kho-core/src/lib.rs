// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Core of the warehouse daily-report tracker.
//!
//! Everything in this crate is synchronous and clock-free: callers pass the
//! current local date (or date-time) into each operation, which keeps the
//! day-boundary behaviour testable without a running transport.

pub mod dates;
pub mod ledger;
pub mod messages;
pub mod report;
pub mod roster;
pub mod summary;
pub mod tracker;
pub mod validate;

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub use ledger::DailyLedger;
pub use report::{parse_report, NotAReport, ParsedReport};
pub use roster::{Roster, RosterLoadError};
pub use summary::{compose_summary, reconcile_day, Summary, SummaryGate, Trigger};
pub use tracker::ComplianceTracker;
pub use validate::{Acceptance, DatePolicy, Rejection, ReportValidator, Verdict};
