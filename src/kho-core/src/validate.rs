// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Ordered validation of a report against the roster.
//!
//! The checks run in a fixed order and stop at the first failure:
//! unknown id, name mismatch, incomplete sections, then (date-aware policy
//! only) missing date line and wrong date.

use chrono::NaiveDate;
use thiserror::Error;

use crate::messages;
use crate::report::{parse_report, ParsedReport, REQUIRED_SECTIONS};
use crate::roster::Roster;

/// Whether a report must carry a `Ngày dd/mm/yyyy` line for today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatePolicy {
    Ignore,
    #[default]
    RequireToday,
}

impl DatePolicy {
    pub fn from_require_date(require_date: bool) -> Self {
        if require_date {
            DatePolicy::RequireToday
        } else {
            DatePolicy::Ignore
        }
    }
}

/// Why a report was refused. The sender is expected to fix and resend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("unknown site id")]
    UnknownSite { site_id: String },

    #[error("name mismatch")]
    NameMismatch {
        site_id: String,
        canonical_name: String,
    },

    #[error("incomplete sections")]
    IncompleteSections { missing: Vec<u32> },

    #[error("missing/invalid date line")]
    MissingDate,

    #[error("wrong date")]
    WrongDate {
        reported: NaiveDate,
        today: NaiveDate,
    },
}

impl Rejection {
    /// Text sent back to the sender.
    pub fn reply_text(&self) -> String {
        messages::rejection_reply(self)
    }
}

/// A report that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    pub site_id: String,
    pub site_name: String,
    pub date: NaiveDate,
    /// Set once the ledger already held this site for the day.
    pub already_recorded: bool,
}

impl Acceptance {
    pub fn reply_text(&self) -> String {
        messages::acceptance_reply(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Not a report; no reply is sent.
    Ignored,
    Rejected(Rejection),
    Accepted(Acceptance),
}

impl Verdict {
    /// Reply for the sender, if any.
    pub fn reply_text(&self) -> Option<String> {
        match self {
            Verdict::Ignored => None,
            Verdict::Rejected(rejection) => Some(rejection.reply_text()),
            Verdict::Accepted(acceptance) => Some(acceptance.reply_text()),
        }
    }
}

pub struct ReportValidator<'a> {
    roster: &'a Roster,
    policy: DatePolicy,
}

impl<'a> ReportValidator<'a> {
    pub fn new(roster: &'a Roster, policy: DatePolicy) -> Self {
        Self { roster, policy }
    }

    /// Parse and check raw message text for the given local date.
    pub fn validate(&self, text: &str, today: NaiveDate) -> Verdict {
        match parse_report(text) {
            Err(_) => Verdict::Ignored,
            Ok(report) => match self.check(&report, today) {
                Ok(acceptance) => Verdict::Accepted(acceptance),
                Err(rejection) => Verdict::Rejected(rejection),
            },
        }
    }

    pub fn check(&self, report: &ParsedReport, today: NaiveDate) -> Result<Acceptance, Rejection> {
        let Some(canonical) = self.roster.lookup(&report.site_id) else {
            return Err(Rejection::UnknownSite {
                site_id: report.site_id.clone(),
            });
        };

        if !names_match(&report.claimed_name, canonical) {
            return Err(Rejection::NameMismatch {
                site_id: report.site_id.clone(),
                canonical_name: canonical.to_string(),
            });
        }

        if !report.has_all_required_sections() {
            let missing = REQUIRED_SECTIONS
                .iter()
                .copied()
                .filter(|n| !report.sections.contains(n))
                .collect();
            return Err(Rejection::IncompleteSections { missing });
        }

        if self.policy == DatePolicy::RequireToday {
            let reported = report.report_date.ok_or(Rejection::MissingDate)?;
            if reported != today {
                return Err(Rejection::WrongDate { reported, today });
            }
        }

        Ok(Acceptance {
            site_id: report.site_id.clone(),
            site_name: canonical.to_string(),
            date: today,
            already_recorded: false,
        })
    }
}

fn names_match(claimed: &str, canonical: &str) -> bool {
    claimed.trim().to_lowercase() == canonical.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::from_entries([
            ("21163000", "Kho Giao Hàng Nặng Ninh Thuận"),
            ("21095000", "Kho B"),
        ])
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    const BODY: &str = "1. a\n2. b\n3. c\n4. d";

    #[test]
    fn test_dateless_report_accepted() {
        let roster = Roster::from_entries([("21163000", "Kho A")]);
        let validator = ReportValidator::new(&roster, DatePolicy::Ignore);
        let verdict = validator.validate("21163000 - Kho A\n1. x\n2. y\n3. z\n4. w", today());
        assert_eq!(
            verdict,
            Verdict::Accepted(Acceptance {
                site_id: "21163000".to_string(),
                site_name: "Kho A".to_string(),
                date: today(),
                already_recorded: false,
            })
        );
    }

    #[test]
    fn test_noise_is_ignored() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::RequireToday);
        assert_eq!(validator.validate("ok anh", today()), Verdict::Ignored);
        assert_eq!(validator.validate("ok anh", today()).reply_text(), None);
    }

    #[test]
    fn test_unknown_site() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::Ignore);
        let verdict = validator.validate(&format!("99999999 - Kho X\n{BODY}"), today());
        let Verdict::Rejected(rejection) = verdict else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.to_string(), "unknown site id");
        assert!(rejection.reply_text().contains("99999999"));
    }

    #[test]
    fn test_name_compared_case_insensitively() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::Ignore);
        let text = format!("21163000 -   KHO GIAO HÀNG NẶNG NINH THUẬN \n{BODY}");
        assert!(matches!(
            validator.validate(&text, today()),
            Verdict::Accepted(_)
        ));
    }

    #[test]
    fn test_name_mismatch_reply_has_canonical_name() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::Ignore);
        let verdict = validator.validate(&format!("21095000 - Kho C\n{BODY}"), today());
        let Verdict::Rejected(rejection) = verdict else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.to_string(), "name mismatch");
        assert!(rejection.reply_text().contains("21095000 - Kho B"));
    }

    #[test]
    fn test_incomplete_sections() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::Ignore);
        let verdict = validator.validate("21095000 - Kho B\n1. a\n2. b\n4. d", today());
        assert_eq!(
            verdict,
            Verdict::Rejected(Rejection::IncompleteSections { missing: vec![3] })
        );
    }

    #[test]
    fn test_sections_checked_before_date() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::RequireToday);
        let verdict = validator.validate("21095000 - Kho B\n1. a", today());
        assert_eq!(
            verdict,
            Verdict::Rejected(Rejection::IncompleteSections {
                missing: vec![2, 3, 4]
            })
        );
    }

    #[test]
    fn test_missing_date_line() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::RequireToday);
        let verdict = validator.validate(&format!("21095000 - Kho B\n{BODY}"), today());
        assert_eq!(verdict, Verdict::Rejected(Rejection::MissingDate));
    }

    #[test]
    fn test_invalid_calendar_date_is_missing_date() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::RequireToday);
        let text = format!("21095000 - Kho B\nNgày 31/9/2026\n{BODY}");
        assert_eq!(
            validator.validate(&text, today()),
            Verdict::Rejected(Rejection::MissingDate)
        );
    }

    #[test]
    fn test_yesterday_is_wrong_date() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::RequireToday);
        let text = format!("21095000 - Kho B\nNgày 15/10/2026\n{BODY}");
        let verdict = validator.validate(&text, today());
        let Verdict::Rejected(rejection) = verdict else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.to_string(), "wrong date");
        let reply = rejection.reply_text();
        assert!(reply.contains("15/10/2026"));
        assert!(reply.contains("16/10/2026"));
    }

    #[test]
    fn test_dated_report_for_today_accepted() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::RequireToday);
        let text = format!("21095000 - Kho B\nNgày 16/10/2026\n{BODY}");
        let Verdict::Accepted(acceptance) = validator.validate(&text, today()) else {
            panic!("expected acceptance");
        };
        assert_eq!(acceptance.site_name, "Kho B");
        let reply = acceptance.reply_text();
        assert!(reply.contains("16/10/2026"));
        assert!(reply.contains("21095000 - Kho B"));
    }

    #[test]
    fn test_date_ignored_when_policy_is_ignore() {
        let roster = roster();
        let validator = ReportValidator::new(&roster, DatePolicy::Ignore);
        let text = format!("21095000 - Kho B\nNgày 01/01/2020\n{BODY}");
        assert!(matches!(
            validator.validate(&text, today()),
            Verdict::Accepted(_)
        ));
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(DatePolicy::from_require_date(true), DatePolicy::RequireToday);
        assert_eq!(DatePolicy::from_require_date(false), DatePolicy::Ignore);
    }
}
