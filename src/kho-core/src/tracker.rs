// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Service object owning roster, ledger and summary gate.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::ledger::DailyLedger;
use crate::roster::Roster;
use crate::summary::{compose_summary, Summary, SummaryGate, Trigger};
use crate::validate::{DatePolicy, ReportValidator, Verdict};

/// All mutable compliance state of the process.
///
/// Built once at startup and shared behind a single lock so report handling
/// and scheduled summaries never interleave.
#[derive(Debug)]
pub struct ComplianceTracker {
    roster: Roster,
    ledger: DailyLedger,
    gate: SummaryGate,
    policy: DatePolicy,
}

impl ComplianceTracker {
    pub fn new(roster: Roster, policy: DatePolicy) -> Self {
        Self {
            roster,
            ledger: DailyLedger::new(),
            gate: SummaryGate::new(),
            policy,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ledger(&self) -> &DailyLedger {
        &self.ledger
    }

    pub fn gate(&self) -> &SummaryGate {
        &self.gate
    }

    pub fn policy(&self) -> DatePolicy {
        self.policy
    }

    /// Validate a message and, when accepted, record the site for `today`.
    pub fn handle_report(&mut self, text: &str, today: NaiveDate) -> Verdict {
        let verdict = ReportValidator::new(&self.roster, self.policy).validate(text, today);
        match verdict {
            Verdict::Accepted(mut acceptance) => {
                let inserted = self.ledger.record(acceptance.date, &acceptance.site_id);
                acceptance.already_recorded = !inserted;
                info!(
                    "Report accepted: {} - {} ({}{})",
                    acceptance.site_id,
                    acceptance.site_name,
                    acceptance.date,
                    if inserted { "" } else { ", repeat" }
                );
                Verdict::Accepted(acceptance)
            }
            Verdict::Rejected(rejection) => {
                debug!("Report rejected: {}", rejection);
                Verdict::Rejected(rejection)
            }
            Verdict::Ignored => Verdict::Ignored,
        }
    }

    /// Compose a summary for `at.date()` without touching the gate.
    pub fn summary(&self, trigger: Trigger, at: NaiveDateTime) -> Summary {
        compose_summary(
            &self.roster,
            self.ledger.reported(at.date()),
            trigger,
            at,
        )
    }

    /// Run one summary trigger. Returns `None` when the follow-up is
    /// suppressed because the first pass of the day was already complete.
    pub fn run_trigger(&mut self, trigger: Trigger, at: NaiveDateTime) -> Option<Summary> {
        let today = at.date();
        match trigger {
            Trigger::FirstPass => {
                let summary = self.summary(trigger, at);
                self.gate.on_first_pass(today, summary.is_complete());
                Some(summary)
            }
            Trigger::FollowUp => {
                if !self.gate.allows_follow_up(today) {
                    debug!("Follow-up summary for {} suppressed", today);
                    return None;
                }
                Some(self.summary(trigger, at))
            }
            Trigger::Manual => Some(self.summary(trigger, at)),
        }
    }
}
