// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Per-day record of which sites submitted a valid report.
//!
//! Memory-resident only; a date's entry is created on its first successful
//! submission and kept for the life of the process.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::roster::Roster;

static NO_REPORTS: BTreeSet<String> = BTreeSet::new();

#[derive(Debug, Default)]
pub struct DailyLedger {
    days: HashMap<NaiveDate, BTreeSet<String>>,
}

impl DailyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission. Returns `false` if the site was already
    /// recorded for that date (the ledger is left unchanged).
    pub fn record(&mut self, date: NaiveDate, site_id: &str) -> bool {
        self.days
            .entry(date)
            .or_default()
            .insert(site_id.to_string())
    }

    pub fn reported(&self, date: NaiveDate) -> &BTreeSet<String> {
        self.days.get(&date).unwrap_or(&NO_REPORTS)
    }

    /// Roster sites without a report for `date`, ascending by id.
    pub fn missing(&self, date: NaiveDate, roster: &Roster) -> Vec<String> {
        let reported = self.reported(date);
        roster
            .ids()
            .filter(|id| !reported.contains(*id))
            .map(str::to_string)
            .collect()
    }

    /// Number of roster sites that reported on `date`.
    pub fn reported_in_roster(&self, date: NaiveDate, roster: &Roster) -> usize {
        self.reported(date)
            .iter()
            .filter(|id| roster.contains(id))
            .count()
    }

    /// Number of dates with at least one submission.
    pub fn days_tracked(&self) -> usize {
        self.days.len()
    }
}
