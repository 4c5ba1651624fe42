// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Compliance summary composition and the follow-up suppression gate.
//!
//! Two scheduled runs happen per day. The first pass always announces; the
//! follow-up only announces when the first pass found missing sites. The
//! on-demand trigger shares the message format but never touches the gate.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::dates::{format_date, format_time};
use crate::roster::Roster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    FirstPass,
    FollowUp,
    Manual,
}

impl Trigger {
    fn title(self) -> &'static str {
        match self {
            Trigger::FirstPass => "TỔNG HỢP BÁO CÁO KHO",
            Trigger::FollowUp => "NHẮC LẠI BÁO CÁO KHO",
            Trigger::Manual => "TỔNG HỢP BÁO CÁO KHO (theo yêu cầu)",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::FirstPass => write!(f, "first-pass"),
            Trigger::FollowUp => write!(f, "follow-up"),
            Trigger::Manual => write!(f, "manual"),
        }
    }
}

/// Snapshot of compliance for one day, rendered through `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub trigger: Trigger,
    pub at: NaiveDateTime,
    pub total: usize,
    /// `(site_id, site_name)` ascending by id.
    pub missing: Vec<(String, String)>,
}

impl Summary {
    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }

    pub fn reported(&self) -> usize {
        self.total - self.missing.len()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing_ids(&self) -> Vec<&str> {
        self.missing.iter().map(|(id, _)| id.as_str()).collect()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "📋 {} - {} {}",
            self.trigger.title(),
            format_date(self.date()),
            format_time(self.at.time())
        )?;
        write!(f, "Đã báo cáo: {}/{} kho", self.reported(), self.total)?;
        if self.is_complete() {
            write!(f, "\n✅ TẤT CẢ {} kho đã gửi báo cáo.", self.total)
        } else {
            write!(
                f,
                "\n❌ Còn {} kho CHƯA gửi báo cáo:",
                self.missing.len()
            )?;
            for (id, name) in &self.missing {
                write!(f, "\n- {id} - {name}")?;
            }
            Ok(())
        }
    }
}

/// Build the summary for `at.date()` from the roster and that day's
/// reported set. Ids outside the roster are not counted.
pub fn compose_summary(
    roster: &Roster,
    reported: &BTreeSet<String>,
    trigger: Trigger,
    at: NaiveDateTime,
) -> Summary {
    let missing = roster
        .iter()
        .filter(|(id, _)| !reported.contains(*id))
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect();
    Summary {
        trigger,
        at,
        total: roster.len(),
        missing,
    }
}

/// Day-rollover rule: a new calendar date clears the suppression flag.
pub fn reconcile_day(
    current: NaiveDate,
    last: Option<NaiveDate>,
    suppressed: bool,
) -> (NaiveDate, bool) {
    if last == Some(current) {
        (current, suppressed)
    } else {
        (current, false)
    }
}

/// Process-wide "first pass was already complete" state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryGate {
    last_summary_date: Option<NaiveDate>,
    suppress_follow_up: bool,
}

impl SummaryGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn reconcile(&mut self, today: NaiveDate) {
        let (date, suppressed) =
            reconcile_day(today, self.last_summary_date, self.suppress_follow_up);
        self.last_summary_date = Some(date);
        self.suppress_follow_up = suppressed;
    }

    /// Record the outcome of the first scheduled run of `today`.
    pub fn on_first_pass(&mut self, today: NaiveDate, complete: bool) {
        self.reconcile(today);
        self.suppress_follow_up = complete;
    }

    /// Whether the follow-up run of `today` should announce.
    pub fn allows_follow_up(&mut self, today: NaiveDate) -> bool {
        self.reconcile(today);
        !self.suppress_follow_up
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress_follow_up
    }

    pub fn last_summary_date(&self) -> Option<NaiveDate> {
        self.last_summary_date
    }
}
