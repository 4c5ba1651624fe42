// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Free-text report parsing.
//!
//! A report looks like:
//!
//! ```text
//! 21163000 - Kho Giao Hàng Nặng Ninh Thuận
//! Ngày 16/10/2026
//! 1. ...
//! 2. ...
//! 3. ...
//! 4. ...
//! ```
//!
//! Messages whose first line does not carry the `<8 digits> - <name>` header
//! are not reports at all and are dropped without a reply.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Section numbers that every report must contain.
pub const REQUIRED_SECTIONS: [u32; 4] = [1, 2, 3, 4];

lazy_static! {
    static ref HEADER_PATTERN: Regex = Regex::new(r"\b([0-9]{8})\s*-\s*(.+)").unwrap();
    static ref SECTION_PATTERN: Regex = Regex::new(r"^([0-9]+)\s*[.)]").unwrap();
    static ref DATE_PATTERN: Regex =
        Regex::new(r"(?i)ngày\s*:?\s*([0-9]{1,2})/+([0-9]{1,2})/+([0-9]{4})").unwrap();
}

/// The message is not a report (no id/name header on the first line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("message is not a report")]
pub struct NotAReport;

/// Structured fields extracted from a report message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReport {
    pub site_id: String,
    pub claimed_name: String,
    /// `None` when the date line is absent or not a real calendar date.
    pub report_date: Option<NaiveDate>,
    /// Every numbered section marker seen anywhere in the text.
    pub sections: BTreeSet<u32>,
}

impl ParsedReport {
    pub fn has_all_required_sections(&self) -> bool {
        REQUIRED_SECTIONS.iter().all(|n| self.sections.contains(n))
    }
}

/// Parse raw message text into a [`ParsedReport`].
pub fn parse_report(text: &str) -> Result<ParsedReport, NotAReport> {
    let first_line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or(NotAReport)?;

    let caps = HEADER_PATTERN.captures(first_line).ok_or(NotAReport)?;
    let site_id = caps[1].to_string();
    let claimed_name = caps[2].trim().to_string();

    Ok(ParsedReport {
        site_id,
        claimed_name,
        report_date: extract_date(text),
        sections: section_markers(text),
    })
}

fn section_markers(text: &str) -> BTreeSet<u32> {
    text.lines()
        .filter_map(|line| SECTION_PATTERN.captures(line.trim()))
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .collect()
}

/// Find the first `Ngày D/M/YYYY` occurrence and turn it into a date.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_PATTERN.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_full_report() {
        let text = "  21163000  - Kho Giao Hàng Nặng Ninh Thuận  \n\
                    Ngày 16/10/2026\n\
                    1. Nhân sự\n2) Xe\n3. Hàng tồn\n4. Khác";
        let report = parse_report(text).unwrap();
        assert_eq!(report.site_id, "21163000");
        assert_eq!(report.claimed_name, "Kho Giao Hàng Nặng Ninh Thuận");
        assert_eq!(report.report_date, Some(date(2026, 10, 16)));
        assert!(report.has_all_required_sections());
    }

    #[test]
    fn test_blank_lines_before_header_are_skipped() {
        let report = parse_report("\n\n   \n21163000-Kho A\n").unwrap();
        assert_eq!(report.site_id, "21163000");
        assert_eq!(report.claimed_name, "Kho A");
    }

    #[test]
    fn test_empty_text_is_not_a_report() {
        assert_eq!(parse_report(""), Err(NotAReport));
        assert_eq!(parse_report(" \n\t\n"), Err(NotAReport));
    }

    #[test]
    fn test_chatter_is_not_a_report() {
        assert_eq!(parse_report("chào mọi người"), Err(NotAReport));
        assert_eq!(parse_report("1234567 - Kho ngắn"), Err(NotAReport));
        assert_eq!(parse_report("21163000 Kho A"), Err(NotAReport));
        assert_eq!(parse_report("21163000 -   "), Err(NotAReport));
    }

    #[test]
    fn test_header_only_checked_on_first_line() {
        assert_eq!(parse_report("xin chào\n21163000 - Kho A"), Err(NotAReport));
    }

    #[test]
    fn test_longer_digit_run_is_not_an_id() {
        assert_eq!(parse_report("121163000 - Kho A"), Err(NotAReport));
    }

    #[test]
    fn test_header_may_have_leading_label() {
        let report = parse_report("Kho: 21163000 - Kho A").unwrap();
        assert_eq!(report.site_id, "21163000");
    }

    #[test]
    fn test_sections_any_order_with_duplicates() {
        let report = parse_report("21163000 - Kho A\n4. d\n2) b\n1. a\n1. again\n3 . c").unwrap();
        let found: Vec<u32> = report.sections.iter().copied().collect();
        assert_eq!(found, vec![1, 2, 3, 4]);
        assert!(report.has_all_required_sections());
    }

    #[test]
    fn test_missing_section_three() {
        let report = parse_report("21163000 - Kho A\n1. a\n2. b\n4. d").unwrap();
        assert!(!report.has_all_required_sections());
    }

    #[test]
    fn test_marker_must_start_the_line() {
        let report = parse_report("21163000 - Kho A\n1. a\n2. b\nxem 3. c\n4. d").unwrap();
        assert!(!report.has_all_required_sections());
    }

    #[test]
    fn test_date_with_repeated_separators() {
        assert_eq!(extract_date("Ngày 5//3///2026"), Some(date(2026, 3, 5)));
        assert_eq!(extract_date("ngày: 05/03/2026"), Some(date(2026, 3, 5)));
    }

    #[test]
    fn test_invalid_calendar_date() {
        assert_eq!(extract_date("Ngày 31/4/2026"), None);
        assert_eq!(extract_date("Ngày 29/2/2026"), None);
        assert_eq!(extract_date("Ngày 29/2/2028"), Some(date(2028, 2, 29)));
    }

    #[test]
    fn test_date_absent() {
        assert_eq!(extract_date("16/10/2026"), None);
        let report = parse_report("21163000 - Kho A\n1. a").unwrap();
        assert_eq!(report.report_date, None);
    }
}
